// Metadata Resolver
//
// Front door of mapping resolution: selects the format of each side from the
// connector options, reconciles discovered and declared fields, and builds
// the metadata the planner and the execution engine consume.

use std::collections::HashSet;

use crate::error::MappingResult;
use crate::models::{
    EntryMetadata, FormatOptions, FormatSchema, MappingDefinition, MappingField, QueryPath,
    ResolvedMapping, JAVA_FORMAT,
};
use crate::services::format::EntryFormat;
use crate::validation::FieldValidator;

/// Metadata resolution service
pub struct MetadataResolver;

impl MetadataResolver {
    /// Resolve the fields of one side
    ///
    /// # Arguments
    /// * `is_key` - Whether the key or the value side is being resolved
    /// * `user_fields` - Columns declared for this side
    /// * `options` - Connector options
    /// * `sample` - Native shape of the side, if known
    pub fn resolve_fields(
        is_key: bool,
        user_fields: &[MappingField],
        options: &FormatOptions,
        sample: Option<&FormatSchema>,
    ) -> MappingResult<Vec<MappingField>> {
        let format = EntryFormat::from_options(is_key, options, sample)?;
        format.resolve_fields(is_key, user_fields)
    }

    /// Resolve the fields of one side and build its metadata
    pub fn resolve_metadata(
        is_key: bool,
        user_fields: &[MappingField],
        options: &FormatOptions,
        sample: Option<&FormatSchema>,
    ) -> MappingResult<EntryMetadata> {
        let format = EntryFormat::from_options(is_key, options, sample)?;
        let fields = format.resolve_fields(is_key, user_fields)?;
        format.resolve_metadata(is_key, &fields)
    }

    /// Resolve both sides of a mapping
    ///
    /// User fields are split by the root of their external name. Column
    /// names are unique across the mapping: when both sides resolve a field
    /// of the same name, the key side keeps it. Nothing is returned unless
    /// both sides resolve.
    pub fn resolve_mapping(
        user_fields: &[MappingField],
        options: &FormatOptions,
        key_sample: Option<&FormatSchema>,
        value_sample: Option<&FormatSchema>,
    ) -> MappingResult<ResolvedMapping> {
        let mut key_fields = Vec::new();
        let mut value_fields = Vec::new();
        for field in user_fields {
            if QueryPath::parse(&field.external_name)?.is_key() {
                key_fields.push(field.clone());
            } else {
                value_fields.push(field.clone());
            }
        }

        let key_format = EntryFormat::from_options(true, options, key_sample)?;
        let value_format = EntryFormat::from_options(false, options, value_sample)?;

        let mut names = HashSet::new();
        let resolved_key = Self::retain_new_names(key_format.resolve_fields(true, &key_fields)?, &mut names);
        let resolved_value =
            Self::retain_new_names(value_format.resolve_fields(false, &value_fields)?, &mut names);

        let key = key_format.resolve_metadata(true, &resolved_key)?;
        let value = value_format.resolve_metadata(false, &resolved_value)?;

        let mut fields = resolved_key;
        fields.extend(resolved_value);
        FieldValidator::ensure_unique_external_names(&fields)?;

        tracing::info!(
            "Resolved mapping: {} key field(s) as {}, {} value field(s) as {}",
            key.fields.len(),
            key_format.name(),
            value.fields.len(),
            value_format.name()
        );

        Ok(ResolvedMapping { fields, key, value })
    }

    /// Resolve a mapping definition, using its declared classes as the
    /// object samples the class options refer to
    pub fn resolve(definition: &MappingDefinition) -> MappingResult<ResolvedMapping> {
        let key_sample = Self::declared_class(definition, true);
        let value_sample = Self::declared_class(definition, false);

        if let Some(name) = &definition.name {
            tracing::debug!("Resolving mapping {}", name);
        }

        Self::resolve_mapping(
            &definition.fields,
            &definition.options,
            key_sample.as_ref(),
            value_sample.as_ref(),
        )
    }

    fn retain_new_names(fields: Vec<MappingField>, names: &mut HashSet<String>) -> Vec<MappingField> {
        fields
            .into_iter()
            .filter(|field| {
                let new = names.insert(field.name.clone());
                if !new {
                    tracing::debug!("Dropping field {} ({}): name already mapped", field.name, field.external_name);
                }
                new
            })
            .collect()
    }

    fn declared_class(definition: &MappingDefinition, is_key: bool) -> Option<FormatSchema> {
        if !definition.options.format(is_key).eq_ignore_ascii_case(JAVA_FORMAT) {
            return None;
        }
        definition
            .options
            .get(FormatOptions::class_option(is_key))
            .and_then(|name| definition.class(name))
            .map(|class| FormatSchema::Object(class.clone()))
    }
}
