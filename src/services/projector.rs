// Row Projector
//
// Binds an extractor to every field of a resolved mapping and turns one
// key/value record into a row of canonical values.

use crate::error::MappingResult;
use crate::models::{EntryMetadata, QueryValue, ResolvedMapping};
use crate::services::extract::{QueryExtractor, QueryTarget};

#[derive(Debug, Clone)]
struct ProjectedField {
    name: String,
    is_key: bool,
    extractor: QueryExtractor,
}

/// Projects records of one mapping into rows
///
/// Columns come out key side first, in the order of the resolved fields.
#[derive(Debug, Clone)]
pub struct RowProjector {
    fields: Vec<ProjectedField>,
}

impl RowProjector {
    pub fn new(key: &EntryMetadata, value: &EntryMetadata) -> MappingResult<Self> {
        let mut fields = Vec::with_capacity(key.fields.len() + value.fields.len());

        for metadata in [key, value] {
            for field in &metadata.fields {
                let extractor = metadata
                    .query_target_descriptor
                    .create_extractor(field.path.clone(), field.data_type)?;
                fields.push(ProjectedField {
                    name: field.name.clone(),
                    is_key: field.is_key,
                    extractor,
                });
            }
        }

        Ok(Self { fields })
    }

    pub fn for_mapping(mapping: &ResolvedMapping) -> MappingResult<Self> {
        Self::new(&mapping.key, &mapping.value)
    }

    /// Column names, in projection order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Extract every column from one record
    ///
    /// The first failing column fails the whole row.
    pub fn project(&self, key: &QueryTarget<'_>, value: &QueryTarget<'_>) -> MappingResult<Vec<QueryValue>> {
        let row = self
            .fields
            .iter()
            .map(|field| {
                let target = if field.is_key { key } else { value };
                field.extractor.get(target)
            })
            .collect::<MappingResult<Vec<_>>>()?;

        tracing::trace!("Projected row of {} columns", row.len());
        Ok(row)
    }
}
