// Query extraction
//
// Per-column readers bound to one path and one canonical type. A reader is
// immutable and can be shared between threads; the record it reads is
// borrowed for the duration of a single call through a QueryTarget.

pub mod avro;
pub mod generic;
pub mod json;

pub use avro::AvroExtractor;
pub use generic::GenericExtractor;
pub use json::JsonExtractor;

use crate::error::{MappingError, MappingResult};
use crate::models::{NativeValue, QueryDataType, QueryPath, QueryTargetDescriptor, QueryValue};

/// One side (key or value) of a physical record, in its native format
#[derive(Debug, Clone, Copy)]
pub enum QueryTarget<'a> {
    Generic(&'a NativeValue),
    Avro(&'a apache_avro::types::Value),
    Json(&'a serde_json::Value),
}

impl QueryTarget<'_> {
    pub fn format_name(&self) -> &'static str {
        match self {
            QueryTarget::Generic(_) => "generic",
            QueryTarget::Avro(_) => "avro",
            QueryTarget::Json(_) => "json",
        }
    }
}

/// Reader of one column
#[derive(Debug, Clone)]
pub enum QueryExtractor {
    Generic(GenericExtractor),
    Avro(AvroExtractor),
    Json(JsonExtractor),
}

impl QueryExtractor {
    /// Read and coerce the column from one record
    ///
    /// # Errors
    /// * `UnsupportedType` - the record is not in this extractor's format
    /// * conversion errors when the value cannot be coerced
    pub fn get(&self, target: &QueryTarget<'_>) -> MappingResult<QueryValue> {
        match (self, target) {
            (QueryExtractor::Generic(extractor), QueryTarget::Generic(value)) => extractor.get(value),
            (QueryExtractor::Avro(extractor), QueryTarget::Avro(value)) => extractor.get(value),
            (QueryExtractor::Json(extractor), QueryTarget::Json(value)) => extractor.get(value),
            _ => Err(MappingError::UnsupportedType(format!(
                "Cannot read a {} record with a {} extractor",
                target.format_name(),
                self.format_name()
            ))),
        }
    }

    pub fn format_name(&self) -> &'static str {
        match self {
            QueryExtractor::Generic(_) => "generic",
            QueryExtractor::Avro(_) => "avro",
            QueryExtractor::Json(_) => "json",
        }
    }

    pub fn path(&self) -> &QueryPath {
        match self {
            QueryExtractor::Generic(extractor) => extractor.path(),
            QueryExtractor::Avro(extractor) => extractor.path(),
            QueryExtractor::Json(extractor) => extractor.path(),
        }
    }

    pub fn data_type(&self) -> QueryDataType {
        match self {
            QueryExtractor::Generic(extractor) => extractor.data_type(),
            QueryExtractor::Avro(extractor) => extractor.data_type(),
            QueryExtractor::Json(extractor) => extractor.data_type(),
        }
    }
}

impl QueryTargetDescriptor {
    /// Create the extractor reading `path` as `data_type` from records this
    /// descriptor describes
    pub fn create_extractor(&self, path: QueryPath, data_type: QueryDataType) -> MappingResult<QueryExtractor> {
        let extractor = match self {
            QueryTargetDescriptor::Generic => QueryExtractor::Generic(GenericExtractor::new(path, data_type)),
            QueryTargetDescriptor::Avro { decimal_scales } => {
                let scale = decimal_scales.get(&path.to_string()).copied();
                QueryExtractor::Avro(AvroExtractor::new(path, data_type)?.with_decimal_scale(scale))
            }
            QueryTargetDescriptor::Json => QueryExtractor::Json(JsonExtractor::new(path, data_type)?),
        };
        Ok(extractor)
    }
}

/// Structured formats can only hand out the whole record as an object
fn ensure_whole_record_is_object(path: &QueryPath, data_type: QueryDataType) -> MappingResult<()> {
    if path.is_top() && data_type != QueryDataType::Object {
        return Err(MappingError::UnsupportedType(format!(
            "'{}' can only be read as {}, not {}",
            path,
            QueryDataType::Object,
            data_type
        )));
    }
    Ok(())
}
