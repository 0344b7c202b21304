// Canonical and native types
//
// QueryDataType is the closed set of SQL scalar types every extracted value is
// coerced into. NativeType is the closed set of native scalar classes a
// record format may expose, each with a fixed canonical counterpart.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MappingError;

/// Canonical SQL scalar type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryDataType {
    #[serde(rename = "BOOLEAN")]
    Boolean,
    #[serde(rename = "TINYINT")]
    TinyInt,
    #[serde(rename = "SMALLINT")]
    SmallInt,
    #[serde(rename = "INT", alias = "INTEGER")]
    Int,
    #[serde(rename = "BIGINT")]
    BigInt,
    #[serde(rename = "REAL")]
    Real,
    #[serde(rename = "DOUBLE")]
    Double,
    #[serde(rename = "DECIMAL")]
    Decimal,
    #[serde(rename = "DECIMAL_BIG_INTEGER")]
    DecimalBigInteger,
    #[serde(rename = "VARCHAR")]
    Varchar,
    #[serde(rename = "VARCHAR_CHARACTER")]
    VarcharCharacter,
    #[serde(rename = "TIME")]
    Time,
    #[serde(rename = "DATE")]
    Date,
    #[serde(rename = "TIMESTAMP")]
    Timestamp,
    #[serde(rename = "TIMESTAMP_WITH_TZ_DATE")]
    TimestampWithTzDate,
    #[serde(rename = "TIMESTAMP_WITH_TZ_CALENDAR")]
    TimestampWithTzCalendar,
    #[serde(rename = "TIMESTAMP_WITH_TZ_INSTANT")]
    TimestampWithTzInstant,
    #[serde(rename = "TIMESTAMP_WITH_TZ_ZONED_DATE_TIME")]
    TimestampWithTzZonedDateTime,
    #[serde(rename = "TIMESTAMP_WITH_TZ_OFFSET_DATE_TIME")]
    TimestampWithTzOffsetDateTime,
    #[serde(rename = "OBJECT")]
    Object,
}

impl QueryDataType {
    pub const ALL: [QueryDataType; 20] = [
        QueryDataType::Boolean,
        QueryDataType::TinyInt,
        QueryDataType::SmallInt,
        QueryDataType::Int,
        QueryDataType::BigInt,
        QueryDataType::Real,
        QueryDataType::Double,
        QueryDataType::Decimal,
        QueryDataType::DecimalBigInteger,
        QueryDataType::Varchar,
        QueryDataType::VarcharCharacter,
        QueryDataType::Time,
        QueryDataType::Date,
        QueryDataType::Timestamp,
        QueryDataType::TimestampWithTzDate,
        QueryDataType::TimestampWithTzCalendar,
        QueryDataType::TimestampWithTzInstant,
        QueryDataType::TimestampWithTzZonedDateTime,
        QueryDataType::TimestampWithTzOffsetDateTime,
        QueryDataType::Object,
    ];

    /// Get the SQL name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryDataType::Boolean => "BOOLEAN",
            QueryDataType::TinyInt => "TINYINT",
            QueryDataType::SmallInt => "SMALLINT",
            QueryDataType::Int => "INT",
            QueryDataType::BigInt => "BIGINT",
            QueryDataType::Real => "REAL",
            QueryDataType::Double => "DOUBLE",
            QueryDataType::Decimal => "DECIMAL",
            QueryDataType::DecimalBigInteger => "DECIMAL_BIG_INTEGER",
            QueryDataType::Varchar => "VARCHAR",
            QueryDataType::VarcharCharacter => "VARCHAR_CHARACTER",
            QueryDataType::Time => "TIME",
            QueryDataType::Date => "DATE",
            QueryDataType::Timestamp => "TIMESTAMP",
            QueryDataType::TimestampWithTzDate => "TIMESTAMP_WITH_TZ_DATE",
            QueryDataType::TimestampWithTzCalendar => "TIMESTAMP_WITH_TZ_CALENDAR",
            QueryDataType::TimestampWithTzInstant => "TIMESTAMP_WITH_TZ_INSTANT",
            QueryDataType::TimestampWithTzZonedDateTime => "TIMESTAMP_WITH_TZ_ZONED_DATE_TIME",
            QueryDataType::TimestampWithTzOffsetDateTime => "TIMESTAMP_WITH_TZ_OFFSET_DATE_TIME",
            QueryDataType::Object => "OBJECT",
        }
    }

    /// All "with timezone" kinds share one canonical offset-date-time value;
    /// they only differ in the host type the engine boxes the value into.
    pub fn is_timestamp_with_tz(&self) -> bool {
        matches!(
            self,
            QueryDataType::TimestampWithTzDate
                | QueryDataType::TimestampWithTzCalendar
                | QueryDataType::TimestampWithTzInstant
                | QueryDataType::TimestampWithTzZonedDateTime
                | QueryDataType::TimestampWithTzOffsetDateTime
        )
    }
}

impl fmt::Display for QueryDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryDataType {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if upper == "INTEGER" {
            return Ok(QueryDataType::Int);
        }

        QueryDataType::ALL
            .iter()
            .copied()
            .find(|ty| ty.as_str() == upper)
            .ok_or_else(|| MappingError::UnsupportedType(format!("Unknown SQL type: {}", s)))
    }
}

/// Native scalar class exposed by a primitive or reflected-object format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NativeType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    BigInteger,
    Char,
    String,
    Time,
    Date,
    Timestamp,
    DateTz,
    Calendar,
    Instant,
    ZonedDateTime,
    OffsetDateTime,
    Object,
}

impl NativeType {
    /// Canonical name, as carried in connector options and write descriptors
    pub fn name(&self) -> &'static str {
        match self {
            NativeType::Boolean => "bool",
            NativeType::Byte => "i8",
            NativeType::Short => "i16",
            NativeType::Int => "i32",
            NativeType::Long => "i64",
            NativeType::Float => "f32",
            NativeType::Double => "f64",
            NativeType::Decimal => "decimal",
            NativeType::BigInteger => "big_integer",
            NativeType::Char => "char",
            NativeType::String => "string",
            NativeType::Time => "time",
            NativeType::Date => "date",
            NativeType::Timestamp => "timestamp",
            NativeType::DateTz => "date_tz",
            NativeType::Calendar => "calendar",
            NativeType::Instant => "instant",
            NativeType::ZonedDateTime => "zoned_date_time",
            NativeType::OffsetDateTime => "offset_date_time",
            NativeType::Object => "object",
        }
    }

    /// Look a native type up by its name or one of the common aliases.
    ///
    /// Returns `None` for anything else, which callers treat as an object
    /// class name.
    pub fn from_name(name: &str) -> Option<Self> {
        let native = match name.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => NativeType::Boolean,
            "i8" | "byte" => NativeType::Byte,
            "i16" | "short" => NativeType::Short,
            "i32" | "int" | "integer" => NativeType::Int,
            "i64" | "long" => NativeType::Long,
            "f32" | "float" => NativeType::Float,
            "f64" | "double" => NativeType::Double,
            "decimal" | "bigdecimal" => NativeType::Decimal,
            "big_integer" | "biginteger" => NativeType::BigInteger,
            "char" | "character" => NativeType::Char,
            "string" | "str" => NativeType::String,
            "time" | "naive_time" | "local_time" => NativeType::Time,
            "date" | "naive_date" | "local_date" => NativeType::Date,
            "timestamp" | "naive_date_time" | "local_date_time" => NativeType::Timestamp,
            "date_tz" => NativeType::DateTz,
            "calendar" => NativeType::Calendar,
            "instant" => NativeType::Instant,
            "zoned_date_time" => NativeType::ZonedDateTime,
            "offset_date_time" => NativeType::OffsetDateTime,
            "object" => NativeType::Object,
            _ => return None,
        };
        Some(native)
    }

    /// The canonical type a value of this native type is discovered as
    pub fn query_data_type(&self) -> QueryDataType {
        match self {
            NativeType::Boolean => QueryDataType::Boolean,
            NativeType::Byte => QueryDataType::TinyInt,
            NativeType::Short => QueryDataType::SmallInt,
            NativeType::Int => QueryDataType::Int,
            NativeType::Long => QueryDataType::BigInt,
            NativeType::Float => QueryDataType::Real,
            NativeType::Double => QueryDataType::Double,
            NativeType::Decimal => QueryDataType::Decimal,
            NativeType::BigInteger => QueryDataType::DecimalBigInteger,
            NativeType::Char => QueryDataType::VarcharCharacter,
            NativeType::String => QueryDataType::Varchar,
            NativeType::Time => QueryDataType::Time,
            NativeType::Date => QueryDataType::Date,
            NativeType::Timestamp => QueryDataType::Timestamp,
            NativeType::DateTz => QueryDataType::TimestampWithTzDate,
            NativeType::Calendar => QueryDataType::TimestampWithTzCalendar,
            NativeType::Instant => QueryDataType::TimestampWithTzInstant,
            NativeType::ZonedDateTime => QueryDataType::TimestampWithTzZonedDateTime,
            NativeType::OffsetDateTime => QueryDataType::TimestampWithTzOffsetDateTime,
            NativeType::Object => QueryDataType::Object,
        }
    }

    /// The native type a value of the canonical type is written back as
    pub fn for_query_type(ty: QueryDataType) -> Self {
        match ty {
            QueryDataType::Boolean => NativeType::Boolean,
            QueryDataType::TinyInt => NativeType::Byte,
            QueryDataType::SmallInt => NativeType::Short,
            QueryDataType::Int => NativeType::Int,
            QueryDataType::BigInt => NativeType::Long,
            QueryDataType::Real => NativeType::Float,
            QueryDataType::Double => NativeType::Double,
            QueryDataType::Decimal => NativeType::Decimal,
            QueryDataType::DecimalBigInteger => NativeType::BigInteger,
            QueryDataType::Varchar => NativeType::String,
            QueryDataType::VarcharCharacter => NativeType::Char,
            QueryDataType::Time => NativeType::Time,
            QueryDataType::Date => NativeType::Date,
            QueryDataType::Timestamp => NativeType::Timestamp,
            QueryDataType::TimestampWithTzDate => NativeType::DateTz,
            QueryDataType::TimestampWithTzCalendar => NativeType::Calendar,
            QueryDataType::TimestampWithTzInstant => NativeType::Instant,
            QueryDataType::TimestampWithTzZonedDateTime => NativeType::ZonedDateTime,
            QueryDataType::TimestampWithTzOffsetDateTime => NativeType::OffsetDateTime,
            QueryDataType::Object => NativeType::Object,
        }
    }

    /// Primitive natives map the whole key/value to a single column
    pub fn is_primitive(&self) -> bool {
        !matches!(self, NativeType::Object)
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for NativeType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NativeType::from_name(&value).ok_or_else(|| format!("Unknown native type: {}", value))
    }
}

impl From<NativeType> for String {
    fn from(value: NativeType) -> String {
        value.name().to_string()
    }
}
