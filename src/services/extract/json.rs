use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::error::MappingResult;
use crate::models::{NativeValue, ObjectValue, QueryDataType, QueryPath, QueryValue};
use crate::services::converter::ValueConverter;

/// Reads JSON documents
#[derive(Debug, Clone)]
pub struct JsonExtractor {
    path: QueryPath,
    data_type: QueryDataType,
}

impl JsonExtractor {
    pub fn new(path: QueryPath, data_type: QueryDataType) -> MappingResult<Self> {
        super::ensure_whole_record_is_object(&path, data_type)?;
        Ok(Self { path, data_type })
    }

    pub fn get(&self, document: &Value) -> MappingResult<QueryValue> {
        let mut current = document;
        for step in self.path.steps() {
            match current.get(step.as_str()) {
                Some(next) => current = next,
                None => return Ok(QueryValue::Null),
            }
        }
        ValueConverter::convert(to_native(current), self.data_type)
    }

    pub fn path(&self) -> &QueryPath {
        &self.path
    }

    pub fn data_type(&self) -> QueryDataType {
        self.data_type
    }
}

fn to_native(value: &Value) -> NativeValue {
    match value {
        Value::Null => NativeValue::Null,
        Value::Bool(b) => NativeValue::Boolean(*b),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                NativeValue::Long(v)
            } else if let Some(v) = n.as_u64() {
                NativeValue::Decimal(BigDecimal::from(v))
            } else {
                n.as_f64().map(NativeValue::Double).unwrap_or(NativeValue::Null)
            }
        }
        Value::String(s) => NativeValue::String(s.clone()),
        Value::Array(items) => NativeValue::List(items.iter().map(to_native).collect()),
        Value::Object(members) => NativeValue::Object(ObjectValue::anonymous(
            members
                .iter()
                .map(|(name, value)| (name.clone(), to_native(value)))
                .collect(),
        )),
    }
}
