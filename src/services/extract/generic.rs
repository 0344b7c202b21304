use crate::error::{MappingError, MappingResult};
use crate::models::{NativeValue, QueryDataType, QueryPath, QueryValue};
use crate::services::converter::ValueConverter;

/// Reads primitive and object records held as native values
#[derive(Debug, Clone)]
pub struct GenericExtractor {
    path: QueryPath,
    data_type: QueryDataType,
}

impl GenericExtractor {
    pub fn new(path: QueryPath, data_type: QueryDataType) -> Self {
        Self { path, data_type }
    }

    /// Walk the path through object members; anything missing on the way
    /// reads as null
    ///
    /// Only the addressed value is cloned, and a structured value only when
    /// the column is OBJECT.
    pub fn get(&self, record: &NativeValue) -> MappingResult<QueryValue> {
        let mut current = record;
        for step in self.path.steps() {
            match current.member(step) {
                Some(next) => current = next,
                None => return Ok(QueryValue::Null),
            }
        }

        match current {
            NativeValue::Null => Ok(QueryValue::Null),
            NativeValue::List(_) | NativeValue::Object(_) if self.data_type != QueryDataType::Object => {
                Err(MappingError::CannotConvert {
                    from: current.kind().to_string(),
                    to: self.data_type,
                })
            }
            leaf => ValueConverter::convert(leaf.clone(), self.data_type),
        }
    }

    pub fn path(&self) -> &QueryPath {
        &self.path
    }

    pub fn data_type(&self) -> QueryDataType {
        self.data_type
    }
}
