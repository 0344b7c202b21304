// Object format
//
// A structured key or value whose members are described by an ObjectClass.

use std::collections::BTreeMap;

use crate::error::MappingResult;
use crate::models::{
    EntryMetadata, MappingField, NativeType, ObjectClass, QueryDataType, QueryPath,
    QueryTargetDescriptor, TableField, UpsertTargetDescriptor,
};
use crate::validation::FieldValidator;

/// Resolve the fields of an object side
pub fn resolve_fields(
    class: &ObjectClass,
    is_key: bool,
    user_fields: &[MappingField],
) -> MappingResult<Vec<MappingField>> {
    let user = FieldValidator::extract_fields(user_fields, is_key)?;
    for (path, _) in &user {
        FieldValidator::ensure_not_top(path, "object")?;
    }

    let discovered = class
        .members
        .iter()
        .map(|member| {
            let path = QueryPath::member(is_key, &member.name)?;
            Ok(MappingField::new(
                member.name.clone(),
                member.native_type.query_data_type(),
                path.to_string(),
            ))
        })
        .collect::<MappingResult<Vec<_>>>()?;

    merge_fields(discovered, user, |_| None)
}

/// Merge user-declared fields into the discovered ones
///
/// A user field addressing a discovered path renames that entry in place and
/// must agree on its type. Any other user field is appended in declaration
/// order; `nested_type` may report a type for it, which it must then match.
pub(super) fn merge_fields<F>(
    mut fields: Vec<MappingField>,
    user: Vec<(QueryPath, &MappingField)>,
    nested_type: F,
) -> MappingResult<Vec<MappingField>>
where
    F: Fn(&QueryPath) -> Option<QueryDataType>,
{
    for (path, user_field) in user {
        let external_name = path.to_string();
        match fields.iter_mut().find(|field| field.external_name == external_name) {
            Some(discovered) => {
                FieldValidator::ensure_type_matches(user_field, discovered.data_type)?;
                discovered.name = user_field.name.clone();
            }
            None => {
                if let Some(resolved) = nested_type(&path) {
                    FieldValidator::ensure_type_matches(user_field, resolved)?;
                }
                fields.push(MappingField::new(
                    user_field.name.clone(),
                    user_field.data_type,
                    external_name,
                ));
            }
        }
    }

    FieldValidator::ensure_unique_external_names(&fields)?;
    Ok(fields)
}

pub fn resolve_metadata(class: &ObjectClass, fields: &[MappingField]) -> MappingResult<EntryMetadata> {
    let mut table_fields = Vec::with_capacity(fields.len());
    let mut field_types = BTreeMap::new();

    for field in fields {
        let path = QueryPath::parse(&field.external_name)?;

        // Only direct members can be set when constructing a new object
        if let [member] = path.steps() {
            let native = class
                .member(member)
                .map(|m| m.native_type)
                .unwrap_or_else(|| NativeType::for_query_type(field.data_type));
            field_types.insert(member.clone(), native.name().to_string());
        }

        table_fields.push(TableField::new(field.name.clone(), field.data_type, path));
    }

    tracing::debug!("Resolved {} fields of class {}", table_fields.len(), class.name);

    Ok(EntryMetadata::new(
        table_fields,
        QueryTargetDescriptor::Generic,
        UpsertTargetDescriptor::Object {
            class_name: class.name.clone(),
            field_types,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;

    const PREFIXES: [(bool, &str); 2] = [(true, "__key"), (false, "this")];

    fn type_class() -> ObjectClass {
        ObjectClass::new("Type").with_member("field", NativeType::Int)
    }

    #[test]
    fn test_discovers_members_in_order() {
        let class = ObjectClass::new("Person")
            .with_member("name", NativeType::String)
            .with_member("age", NativeType::Int)
            .with_member("born", NativeType::Date);

        let fields = resolve_fields(&class, false, &[]).unwrap();
        assert_eq!(
            fields,
            vec![
                MappingField::new("name", QueryDataType::Varchar, "this.name"),
                MappingField::new("age", QueryDataType::Int, "this.age"),
                MappingField::new("born", QueryDataType::Date, "this.born"),
            ]
        );
    }

    #[test]
    fn test_resolve_object_fields() {
        for (is_key, prefix) in PREFIXES {
            let fields = resolve_fields(&type_class(), is_key, &[]).unwrap();
            assert_eq!(
                fields,
                vec![MappingField::new("field", QueryDataType::Int, format!("{}.field", prefix))]
            );
        }
    }

    #[test]
    fn test_user_field_renames_in_place() {
        let class = ObjectClass::new("Pair")
            .with_member("a", NativeType::Int)
            .with_member("b", NativeType::Long);
        let user = vec![MappingField::new("renamed", QueryDataType::Int, "this.a")];

        let fields = resolve_fields(&class, false, &user).unwrap();
        assert_eq!(
            fields,
            vec![
                MappingField::new("renamed", QueryDataType::Int, "this.a"),
                MappingField::new("b", QueryDataType::BigInt, "this.b"),
            ]
        );
    }

    #[test]
    fn test_user_fields_are_appended_in_declaration_order() {
        for (is_key, prefix) in PREFIXES {
            let user = vec![
                MappingField::new("field3", QueryDataType::Boolean, format!("{}.field3", prefix)),
                MappingField::new("field2", QueryDataType::Varchar, format!("{}.field2", prefix)),
            ];
            let fields = resolve_fields(&type_class(), is_key, &user).unwrap();
            assert_eq!(
                fields,
                vec![
                    MappingField::new("field", QueryDataType::Int, format!("{}.field", prefix)),
                    MappingField::new("field3", QueryDataType::Boolean, format!("{}.field3", prefix)),
                    MappingField::new("field2", QueryDataType::Varchar, format!("{}.field2", prefix)),
                ]
            );
        }
    }

    #[test]
    fn test_type_mismatch() {
        for (is_key, prefix) in PREFIXES {
            let user = vec![MappingField::new("field", QueryDataType::Varchar, format!("{}.field", prefix))];
            assert!(matches!(
                resolve_fields(&type_class(), is_key, &user),
                Err(MappingError::TypeMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_external_name() {
        for (is_key, _) in PREFIXES {
            let user = vec![MappingField::new(
                "field",
                QueryDataType::Varchar,
                "does_not_start_with_key_or_value",
            )];
            assert!(matches!(
                resolve_fields(&type_class(), is_key, &user),
                Err(MappingError::InvalidExternalName(_))
            ));
        }
    }

    #[test]
    fn test_bare_root_is_rejected() {
        let user = vec![MappingField::new("whole", QueryDataType::Object, "this")];
        assert!(matches!(
            resolve_fields(&type_class(), false, &user),
            Err(MappingError::InvalidExternalName(_))
        ));
    }

    #[test]
    fn test_duplicate_external_name() {
        for (is_key, prefix) in PREFIXES {
            let user = vec![
                MappingField::new("field1", QueryDataType::Int, format!("{}.field", prefix)),
                MappingField::new("field2", QueryDataType::Varchar, format!("{}.field", prefix)),
            ];
            assert!(matches!(
                resolve_fields(&type_class(), is_key, &user),
                Err(MappingError::DuplicateExternalName(_))
            ));

            let reversed: Vec<MappingField> = user.into_iter().rev().collect();
            assert!(matches!(
                resolve_fields(&type_class(), is_key, &reversed),
                Err(MappingError::DuplicateExternalName(_))
            ));
        }
    }

    #[test]
    fn test_resolve_metadata() {
        for (is_key, prefix) in PREFIXES {
            let user = vec![
                MappingField::new("field", QueryDataType::Int, format!("{}.field", prefix)),
                MappingField::new("extra", QueryDataType::Varchar, format!("{}.extra", prefix)),
            ];
            let fields = resolve_fields(&type_class(), is_key, &user).unwrap();
            let metadata = resolve_metadata(&type_class(), &fields).unwrap();

            assert_eq!(
                metadata.fields,
                vec![
                    TableField::new(
                        "field",
                        QueryDataType::Int,
                        QueryPath::parse(&format!("{}.field", prefix)).unwrap()
                    ),
                    TableField::new(
                        "extra",
                        QueryDataType::Varchar,
                        QueryPath::parse(&format!("{}.extra", prefix)).unwrap()
                    ),
                ]
            );
            assert_eq!(metadata.query_target_descriptor, QueryTargetDescriptor::Generic);
            assert_eq!(
                metadata.upsert_target_descriptor,
                UpsertTargetDescriptor::Object {
                    class_name: "Type".to_string(),
                    field_types: BTreeMap::from([
                        ("extra".to_string(), "string".to_string()),
                        ("field".to_string(), "i32".to_string()),
                    ]),
                }
            );
        }
    }
}
