// Value Converter
//
// Coerces native record values into their canonical SQL representation.
// This is the single coercion table shared by every record format: each
// format first normalizes what it reads into a NativeValue, then hands it
// here together with the column's requested type.

use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use crate::error::{MappingError, MappingResult};
use crate::models::{NativeValue, QueryDataType, QueryValue};

const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Converts native values to canonical query values
///
/// Null converts to null for every type and OBJECT passes the native value
/// through untouched. Everything else follows a fixed table; there is no
/// rounding and no lenient fallback.
pub struct ValueConverter;

impl ValueConverter {
    /// Convert a native value to the requested canonical type
    ///
    /// # Errors
    /// * `CannotConvert` - no rule exists for the native kind and target type
    /// * `CannotParse` - a string did not parse as the target type
    /// * `NumericOverflow` - the value does not fit the target type
    pub fn convert(value: NativeValue, target: QueryDataType) -> MappingResult<QueryValue> {
        if value.is_null() {
            return Ok(QueryValue::Null);
        }

        match target {
            QueryDataType::Object => Ok(QueryValue::Object(value)),
            QueryDataType::Boolean => Self::to_boolean(value),
            QueryDataType::TinyInt
            | QueryDataType::SmallInt
            | QueryDataType::Int
            | QueryDataType::BigInt => Self::to_integer(value, target),
            QueryDataType::Real => Self::to_real(value),
            QueryDataType::Double => Self::to_double(value),
            QueryDataType::Decimal | QueryDataType::DecimalBigInteger => {
                Self::to_decimal(value, target).map(QueryValue::Decimal)
            }
            QueryDataType::Varchar | QueryDataType::VarcharCharacter => {
                Self::to_varchar(value, target).map(QueryValue::Varchar)
            }
            QueryDataType::Time => Self::to_time(value),
            QueryDataType::Date => Self::to_date(value),
            QueryDataType::Timestamp => Self::to_timestamp(value),
            QueryDataType::TimestampWithTzDate
            | QueryDataType::TimestampWithTzCalendar
            | QueryDataType::TimestampWithTzInstant
            | QueryDataType::TimestampWithTzZonedDateTime
            | QueryDataType::TimestampWithTzOffsetDateTime => Self::to_timestamp_tz(value, target),
        }
    }

    fn to_boolean(value: NativeValue) -> MappingResult<QueryValue> {
        match value {
            NativeValue::Boolean(b) => Ok(QueryValue::Boolean(b)),
            NativeValue::String(s) => {
                if s.eq_ignore_ascii_case("true") {
                    Ok(QueryValue::Boolean(true))
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(QueryValue::Boolean(false))
                } else {
                    Err(cannot_parse(s, QueryDataType::Boolean))
                }
            }
            other => Err(cannot_convert(&other, QueryDataType::Boolean)),
        }
    }

    fn to_integer(value: NativeValue, target: QueryDataType) -> MappingResult<QueryValue> {
        let from = value.kind();
        let wide: i128 = match value {
            NativeValue::Byte(v) => i128::from(v),
            NativeValue::Short(v) => i128::from(v),
            NativeValue::Int(v) => i128::from(v),
            NativeValue::Long(v) => i128::from(v),
            NativeValue::Float(v) => truncate_float(f64::from(v), from, target)?,
            NativeValue::Double(v) => truncate_float(v, from, target)?,
            NativeValue::Decimal(d) => d.with_scale(0).to_i128().ok_or_else(|| overflow(from, target))?,
            NativeValue::String(s) => match s.parse::<i64>() {
                Ok(v) => i128::from(v),
                Err(_) => return Err(cannot_parse(s, target)),
            },
            other => return Err(cannot_convert(&other, target)),
        };

        let narrowed = match target {
            QueryDataType::TinyInt => i8::try_from(wide).map(QueryValue::TinyInt).ok(),
            QueryDataType::SmallInt => i16::try_from(wide).map(QueryValue::SmallInt).ok(),
            QueryDataType::Int => i32::try_from(wide).map(QueryValue::Int).ok(),
            _ => i64::try_from(wide).map(QueryValue::BigInt).ok(),
        };
        narrowed.ok_or_else(|| overflow(from, target))
    }

    fn to_real(value: NativeValue) -> MappingResult<QueryValue> {
        let target = QueryDataType::Real;
        let real = match value {
            NativeValue::Byte(v) => f32::from(v),
            NativeValue::Short(v) => f32::from(v),
            NativeValue::Int(v) => v as f32,
            NativeValue::Long(v) => v as f32,
            NativeValue::Float(v) => v,
            NativeValue::Double(v) => v as f32,
            NativeValue::Decimal(d) => d.to_f32().ok_or_else(|| overflow("DECIMAL", target))?,
            NativeValue::String(s) => match s.parse::<f32>() {
                Ok(v) => v,
                Err(_) => return Err(cannot_parse(s, target)),
            },
            other => return Err(cannot_convert(&other, target)),
        };
        Ok(QueryValue::Real(real))
    }

    fn to_double(value: NativeValue) -> MappingResult<QueryValue> {
        let target = QueryDataType::Double;
        let double = match value {
            NativeValue::Byte(v) => f64::from(v),
            NativeValue::Short(v) => f64::from(v),
            NativeValue::Int(v) => f64::from(v),
            NativeValue::Long(v) => v as f64,
            NativeValue::Float(v) => f64::from(v),
            NativeValue::Double(v) => v,
            NativeValue::Decimal(d) => d.to_f64().ok_or_else(|| overflow("DECIMAL", target))?,
            NativeValue::String(s) => match s.parse::<f64>() {
                Ok(v) => v,
                Err(_) => return Err(cannot_parse(s, target)),
            },
            other => return Err(cannot_convert(&other, target)),
        };
        Ok(QueryValue::Double(double))
    }

    fn to_decimal(value: NativeValue, target: QueryDataType) -> MappingResult<BigDecimal> {
        match value {
            NativeValue::Byte(v) => Ok(BigDecimal::from(v)),
            NativeValue::Short(v) => Ok(BigDecimal::from(v)),
            NativeValue::Int(v) => Ok(BigDecimal::from(v)),
            NativeValue::Long(v) => Ok(BigDecimal::from(v)),
            NativeValue::Float(v) if v.is_finite() => {
                parse_decimal(&v.to_string()).ok_or_else(|| overflow("REAL", target))
            }
            NativeValue::Double(v) if v.is_finite() => {
                parse_decimal(&v.to_string()).ok_or_else(|| overflow("DOUBLE", target))
            }
            NativeValue::Decimal(d) => Ok(d),
            NativeValue::String(s) => parse_decimal(&s).ok_or_else(|| cannot_parse(s, target)),
            other => Err(cannot_convert(&other, target)),
        }
    }

    fn to_varchar(value: NativeValue, target: QueryDataType) -> MappingResult<String> {
        let text = match value {
            NativeValue::String(s) => s,
            NativeValue::Char(c) => c.to_string(),
            NativeValue::Boolean(b) => b.to_string(),
            NativeValue::Byte(v) => v.to_string(),
            NativeValue::Short(v) => v.to_string(),
            NativeValue::Int(v) => v.to_string(),
            NativeValue::Long(v) => v.to_string(),
            NativeValue::Float(v) => v.to_string(),
            NativeValue::Double(v) => v.to_string(),
            NativeValue::Decimal(d) => d.to_string(),
            NativeValue::Time(t) => t.format(TIME_FORMAT).to_string(),
            NativeValue::Date(d) => d.format(DATE_FORMAT).to_string(),
            NativeValue::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
            NativeValue::TimestampTz(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            other => return Err(cannot_convert(&other, target)),
        };
        Ok(text)
    }

    fn to_time(value: NativeValue) -> MappingResult<QueryValue> {
        let target = QueryDataType::Time;
        let time = match value {
            NativeValue::Time(t) => t,
            NativeValue::Timestamp(ts) => ts.time(),
            NativeValue::TimestampTz(dt) => dt.naive_utc().time(),
            NativeValue::String(s) => NaiveTime::parse_from_str(&s, TIME_FORMAT)
                .map_err(|_| cannot_parse(s, target))?,
            other => return Err(cannot_convert(&other, target)),
        };
        Ok(QueryValue::Time(time))
    }

    fn to_date(value: NativeValue) -> MappingResult<QueryValue> {
        let target = QueryDataType::Date;
        let date = match value {
            NativeValue::Date(d) => d,
            NativeValue::Timestamp(ts) => ts.date(),
            NativeValue::TimestampTz(dt) => dt.naive_utc().date(),
            NativeValue::String(s) => NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map_err(|_| cannot_parse(s, target))?,
            other => return Err(cannot_convert(&other, target)),
        };
        Ok(QueryValue::Date(date))
    }

    fn to_timestamp(value: NativeValue) -> MappingResult<QueryValue> {
        let target = QueryDataType::Timestamp;
        let timestamp = match value {
            NativeValue::Timestamp(ts) => ts,
            NativeValue::Date(d) => d.and_time(NaiveTime::MIN),
            NativeValue::TimestampTz(dt) => dt.naive_utc(),
            NativeValue::String(s) => NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
                .map_err(|_| cannot_parse(s, target))?,
            other => return Err(cannot_convert(&other, target)),
        };
        Ok(QueryValue::Timestamp(timestamp))
    }

    /// All "with timezone" kinds produce the same offset-date-time, normalized
    /// to UTC. Values without an offset are taken to be UTC.
    fn to_timestamp_tz(value: NativeValue, target: QueryDataType) -> MappingResult<QueryValue> {
        let instant = match value {
            NativeValue::TimestampTz(dt) => dt.with_timezone(&Utc),
            NativeValue::Timestamp(ts) => ts.and_utc(),
            NativeValue::Date(d) => d.and_time(NaiveTime::MIN).and_utc(),
            NativeValue::String(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(_) => return Err(cannot_parse(s, target)),
            },
            other => return Err(cannot_convert(&other, target)),
        };
        Ok(QueryValue::TimestampTz(instant.fixed_offset()))
    }
}

/// Exact decimal parsing, plain or scientific; precision is unbounded
fn parse_decimal(text: &str) -> Option<BigDecimal> {
    BigDecimal::from_str(text).ok()
}

fn truncate_float(value: f64, from: &str, target: QueryDataType) -> MappingResult<i128> {
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return Err(overflow(from, target));
    }
    Ok(truncated as i128)
}

fn cannot_convert(value: &NativeValue, to: QueryDataType) -> MappingError {
    MappingError::CannotConvert {
        from: value.kind().to_string(),
        to,
    }
}

fn cannot_parse(value: String, to: QueryDataType) -> MappingError {
    MappingError::CannotParse { value, to }
}

fn overflow(from: &str, to: QueryDataType) -> MappingError {
    MappingError::NumericOverflow {
        from: from.to_string(),
        to,
    }
}
