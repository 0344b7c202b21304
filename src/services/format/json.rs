// JSON format
//
// Schemaless JSON documents. Nothing can be discovered, so every column has
// to be declared and has to address a member of the document.

use crate::error::{MappingError, MappingResult};
use crate::models::{
    EntryMetadata, MappingField, QueryPath, QueryTargetDescriptor, TableField,
    UpsertTargetDescriptor, JSON_FORMAT,
};
use crate::validation::FieldValidator;

pub fn resolve_fields(is_key: bool, user_fields: &[MappingField]) -> MappingResult<Vec<MappingField>> {
    let user = FieldValidator::extract_fields(user_fields, is_key)?;
    if user.is_empty() {
        return Err(MappingError::ColumnListRequired(JSON_FORMAT.to_string()));
    }

    user.into_iter()
        .map(|(path, field)| {
            FieldValidator::ensure_not_top(&path, "JSON")?;
            Ok(MappingField::new(field.name.clone(), field.data_type, path.to_string()))
        })
        .collect()
}

pub fn resolve_metadata(fields: &[MappingField]) -> MappingResult<EntryMetadata> {
    let table_fields = fields
        .iter()
        .map(|field| {
            let path = QueryPath::parse(&field.external_name)?;
            Ok(TableField::new(field.name.clone(), field.data_type, path))
        })
        .collect::<MappingResult<Vec<_>>>()?;

    Ok(EntryMetadata::new(
        table_fields,
        QueryTargetDescriptor::Json,
        UpsertTargetDescriptor::Json,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryDataType;

    #[test]
    fn test_columns_are_required() {
        assert_eq!(
            resolve_fields(false, &[]).unwrap_err(),
            MappingError::ColumnListRequired("json".to_string())
        );
    }

    #[test]
    fn test_declared_columns_are_kept_in_order() {
        let user = vec![
            MappingField::new("name", QueryDataType::Varchar, "this.name"),
            MappingField::new("city", QueryDataType::Varchar, "this.address.city"),
        ];
        assert_eq!(resolve_fields(false, &user).unwrap(), user);
    }

    #[test]
    fn test_bare_root_and_duplicates_are_rejected() {
        let user = vec![MappingField::new("doc", QueryDataType::Object, "__key")];
        assert!(matches!(
            resolve_fields(true, &user),
            Err(MappingError::InvalidExternalName(_))
        ));

        let user = vec![
            MappingField::new("a", QueryDataType::Int, "__key.id"),
            MappingField::new("b", QueryDataType::Int, "__key.id"),
        ];
        assert!(matches!(
            resolve_fields(true, &user),
            Err(MappingError::DuplicateExternalName(_))
        ));
    }

    #[test]
    fn test_resolve_metadata() {
        let fields = vec![MappingField::new("id", QueryDataType::BigInt, "__key.id")];
        let metadata = resolve_metadata(&fields).unwrap();
        assert!(metadata.fields[0].is_key);
        assert_eq!(metadata.query_target_descriptor, QueryTargetDescriptor::Json);
        assert_eq!(metadata.upsert_target_descriptor, UpsertTargetDescriptor::Json);
    }
}
