// Native and canonical values
//
// NativeValue is the normalized in-memory form of a value read from a record
// of any supported format. QueryValue is what an extractor hands back to the
// execution engine after coercion.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// A native record value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NativeValue {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(BigDecimal),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    Time(NaiveTime),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
    List(Vec<NativeValue>),
    Object(ObjectValue),
}

impl NativeValue {
    /// Short description of the native kind, used in conversion errors
    pub fn kind(&self) -> &'static str {
        match self {
            NativeValue::Null => "NULL",
            NativeValue::Boolean(_) => "BOOLEAN",
            NativeValue::Byte(_) => "TINYINT",
            NativeValue::Short(_) => "SMALLINT",
            NativeValue::Int(_) => "INT",
            NativeValue::Long(_) => "BIGINT",
            NativeValue::Float(_) => "REAL",
            NativeValue::Double(_) => "DOUBLE",
            NativeValue::Decimal(_) => "DECIMAL",
            NativeValue::Char(_) => "VARCHAR_CHARACTER",
            NativeValue::String(_) => "VARCHAR",
            NativeValue::Bytes(_) => "BYTES",
            NativeValue::Time(_) => "TIME",
            NativeValue::Date(_) => "DATE",
            NativeValue::Timestamp(_) => "TIMESTAMP",
            NativeValue::TimestampTz(_) => "TIMESTAMP_WITH_TZ",
            NativeValue::List(_) => "LIST",
            NativeValue::Object(_) => "OBJECT",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }

    /// Member lookup on an object value; `None` for absent members and
    /// non-object values
    pub fn member(&self, name: &str) -> Option<&NativeValue> {
        match self {
            NativeValue::Object(object) => object.get(name),
            _ => None,
        }
    }
}

/// A structured value with ordered, named members
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectValue {
    /// Name of the class the value is an instance of, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub fields: Vec<(String, NativeValue)>,
}

impl ObjectValue {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            fields: Vec::new(),
        }
    }

    /// Anonymous object (e.g. a JSON document or an Avro record)
    pub fn anonymous(fields: Vec<(String, NativeValue)>) -> Self {
        Self {
            class_name: None,
            fields,
        }
    }

    /// Builder: append a member
    pub fn with(mut self, name: impl Into<String>, value: NativeValue) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&NativeValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

/// A value coerced to its canonical type
///
/// Every TIMESTAMP_WITH_TZ_* kind is represented by `TimestampTz` normalized
/// to the UTC offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Decimal(BigDecimal),
    Varchar(String),
    Time(NaiveTime),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
    Object(NativeValue),
}

impl QueryValue {
    pub fn is_null(&self) -> bool {
        matches!(self, QueryValue::Null)
    }
}
