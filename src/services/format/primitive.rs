// Primitive format
//
// The whole key or value is a single scalar addressed by the bare root path.

use crate::error::{MappingError, MappingResult};
use crate::models::{
    path, EntryMetadata, MappingField, NativeType, QueryPath, QueryTargetDescriptor, TableField,
    UpsertTargetDescriptor,
};
use crate::validation::FieldValidator;

/// Resolve the single field of a primitive side
///
/// Without a user declaration the field is named after the root literal.
/// A user declaration may rename it but must agree on the type.
pub fn resolve_fields(
    native: NativeType,
    is_key: bool,
    user_fields: &[MappingField],
) -> MappingResult<Vec<MappingField>> {
    let user = FieldValidator::extract_fields(user_fields, is_key)?;
    let discovered = native.query_data_type();
    let root = path::root_literal(is_key);

    // Duplicates are already rejected, so any second field is a sub-path
    if let Some((path, _)) = user.iter().find(|(path, _)| !path.is_top()) {
        return Err(MappingError::InvalidAdditionalField(path.to_string()));
    }

    match user.first() {
        None => Ok(vec![MappingField::new(root, discovered, root)]),
        Some((_, field)) => {
            FieldValidator::ensure_type_matches(field, discovered)?;
            Ok(vec![MappingField::new(field.name.clone(), discovered, root)])
        }
    }
}

pub fn resolve_metadata(
    native: NativeType,
    is_key: bool,
    fields: &[MappingField],
) -> MappingResult<EntryMetadata> {
    let discovered = native.query_data_type();
    let table_fields = fields
        .iter()
        .map(|field| {
            FieldValidator::ensure_type_matches(field, discovered)?;
            Ok(TableField::new(field.name.clone(), discovered, QueryPath::root(is_key)))
        })
        .collect::<MappingResult<Vec<_>>>()?;

    Ok(EntryMetadata::new(
        table_fields,
        QueryTargetDescriptor::Generic,
        UpsertTargetDescriptor::Primitive,
    ))
}
