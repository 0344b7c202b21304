use std::collections::HashSet;

use crate::error::{MappingError, MappingResult};
use crate::models::{path, MappingField, QueryDataType, QueryPath};

/// Validation service shared by every format resolver
pub struct FieldValidator;

impl FieldValidator {
    /// Parse the external names of the user-declared fields for one side
    ///
    /// Every path must parse and be rooted at the side's literal (`__key` for
    /// the key, `this` for the value); two fields may not address the same
    /// path. Declaration order is preserved.
    pub fn extract_fields(
        user_fields: &[MappingField],
        is_key: bool,
    ) -> MappingResult<Vec<(QueryPath, &MappingField)>> {
        let mut seen = HashSet::with_capacity(user_fields.len());
        let mut extracted = Vec::with_capacity(user_fields.len());

        for field in user_fields {
            let path = QueryPath::parse(&field.external_name)?;
            if path.is_key() != is_key {
                return Err(MappingError::InvalidExternalName(format!(
                    "{} (expected a path starting with '{}')",
                    field.external_name,
                    path::root_literal(is_key)
                )));
            }
            if !seen.insert(path.clone()) {
                return Err(MappingError::DuplicateExternalName(path.to_string()));
            }
            extracted.push((path, field));
        }

        Ok(extracted)
    }

    /// Declared types must equal the resolved type exactly; no implicit casts
    pub fn ensure_type_matches(field: &MappingField, resolved: QueryDataType) -> MappingResult<()> {
        if field.data_type != resolved {
            return Err(MappingError::TypeMismatch {
                field: field.name.clone(),
                declared: field.data_type,
                resolved,
            });
        }
        Ok(())
    }

    /// No two fields of the final list may share an external name
    pub fn ensure_unique_external_names(fields: &[MappingField]) -> MappingResult<()> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in fields {
            if !seen.insert(field.external_name.as_str()) {
                return Err(MappingError::DuplicateExternalName(field.external_name.clone()));
            }
        }
        Ok(())
    }

    /// Formats that address members need a sub-path below the root
    pub fn ensure_not_top(path: &QueryPath, format: &str) -> MappingResult<()> {
        if path.is_top() {
            return Err(MappingError::InvalidExternalName(format!(
                "Cannot use the '{}' field with {} serialization",
                path, format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, data_type: QueryDataType, external_name: &str) -> MappingField {
        MappingField::new(name, data_type, external_name)
    }

    #[test]
    fn test_extract_fields_keeps_order() {
        let fields = vec![
            field("b", QueryDataType::Int, "this.b"),
            field("a", QueryDataType::Int, "this.a"),
        ];
        let extracted = FieldValidator::extract_fields(&fields, false).unwrap();
        let paths: Vec<String> = extracted.iter().map(|(path, _)| path.to_string()).collect();
        assert_eq!(paths, vec!["this.b", "this.a"]);
    }

    #[test]
    fn test_extract_fields_rejects_wrong_side() {
        let fields = vec![field("id", QueryDataType::Int, "this.id")];
        assert!(matches!(
            FieldValidator::extract_fields(&fields, true),
            Err(MappingError::InvalidExternalName(_))
        ));
    }

    #[test]
    fn test_extract_fields_rejects_unparsable_name() {
        let fields = vec![field("id", QueryDataType::Int, "does_not_start_with_key_or_value")];
        assert!(matches!(
            FieldValidator::extract_fields(&fields, false),
            Err(MappingError::InvalidExternalName(_))
        ));
    }

    #[test]
    fn test_extract_fields_rejects_duplicates() {
        let fields = vec![
            field("field1", QueryDataType::Int, "__key.field"),
            field("field2", QueryDataType::Varchar, "__key.field"),
        ];
        assert_eq!(
            FieldValidator::extract_fields(&fields, true).unwrap_err(),
            MappingError::DuplicateExternalName("__key.field".to_string())
        );
    }

    #[test]
    fn test_ensure_type_matches() {
        let declared = field("id", QueryDataType::Varchar, "__key");
        assert!(FieldValidator::ensure_type_matches(&declared, QueryDataType::Varchar).is_ok());
        assert!(matches!(
            FieldValidator::ensure_type_matches(&declared, QueryDataType::Int),
            Err(MappingError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_ensure_unique_external_names() {
        let fields = vec![
            field("a", QueryDataType::Int, "this.a"),
            field("b", QueryDataType::Int, "this.a"),
        ];
        assert!(matches!(
            FieldValidator::ensure_unique_external_names(&fields),
            Err(MappingError::DuplicateExternalName(_))
        ));
    }
}
