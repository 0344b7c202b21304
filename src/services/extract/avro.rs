use apache_avro::types::Value;
use apache_avro::{Decimal, Duration};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveTime};
use num_bigint::BigInt;

use crate::error::{MappingError, MappingResult};
use crate::models::{NativeValue, ObjectValue, QueryDataType, QueryPath, QueryValue};
use crate::services::converter::ValueConverter;

/// Reads Avro generic records
#[derive(Debug, Clone)]
pub struct AvroExtractor {
    path: QueryPath,
    data_type: QueryDataType,
    decimal_scale: Option<u32>,
}

impl AvroExtractor {
    pub fn new(path: QueryPath, data_type: QueryDataType) -> MappingResult<Self> {
        super::ensure_whole_record_is_object(&path, data_type)?;
        Ok(Self {
            path,
            data_type,
            decimal_scale: None,
        })
    }

    /// Scale of the `decimal` logical type declared at this path
    pub fn with_decimal_scale(mut self, scale: Option<u32>) -> Self {
        self.decimal_scale = scale;
        self
    }

    /// Walk the path through records and maps; unions are unwrapped on the
    /// way and anything missing reads as null
    pub fn get(&self, record: &Value) -> MappingResult<QueryValue> {
        let mut current = unwrap_union(record);
        for step in self.path.steps() {
            let next = match current {
                Value::Record(fields) => fields
                    .iter()
                    .find(|(name, _)| name == step)
                    .map(|(_, value)| value),
                Value::Map(entries) => entries.get(step),
                _ => None,
            };
            match next {
                Some(value) => current = unwrap_union(value),
                None => return Ok(QueryValue::Null),
            }
        }

        tracing::trace!("Read {} from Avro record", self.path);
        let native = match (current, self.decimal_scale) {
            (Value::Decimal(decimal), Some(scale)) => {
                NativeValue::Decimal(scaled_decimal(decimal, scale, self.data_type)?)
            }
            _ => to_native(current, self.data_type)?,
        };
        ValueConverter::convert(native, self.data_type)
    }

    pub fn path(&self) -> &QueryPath {
        &self.path
    }

    pub fn data_type(&self) -> QueryDataType {
        self.data_type
    }
}

fn unwrap_union(value: &Value) -> &Value {
    match value {
        Value::Union(_, inner) => unwrap_union(inner),
        other => other,
    }
}

/// Normalize an Avro value, including its logical types, to a native value
///
/// A `decimal` without a known scale is kept as its unscaled two's-complement
/// bytes and a `duration` as its three components.
fn to_native(value: &Value, target: QueryDataType) -> MappingResult<NativeValue> {
    let native = match value {
        Value::Null => NativeValue::Null,
        Value::Boolean(b) => NativeValue::Boolean(*b),
        Value::Int(v) => NativeValue::Int(*v),
        Value::Long(v) => NativeValue::Long(*v),
        Value::Float(v) => NativeValue::Float(*v),
        Value::Double(v) => NativeValue::Double(*v),
        Value::String(s) => NativeValue::String(s.clone()),
        Value::Enum(_, symbol) => NativeValue::String(symbol.clone()),
        Value::Uuid(uuid) => NativeValue::String(uuid.to_string()),
        Value::Bytes(bytes) | Value::Fixed(_, bytes) => NativeValue::Bytes(bytes.clone()),
        Value::Union(_, inner) => return to_native(inner, target),
        Value::Date(days) => DateTime::from_timestamp(i64::from(*days) * 86_400, 0)
            .map(|dt| NativeValue::Date(dt.date_naive()))
            .ok_or_else(|| out_of_range("AVRO_DATE", target))?,
        Value::TimeMillis(millis) => time_of_day(i64::from(*millis) * 1_000)
            .ok_or_else(|| out_of_range("AVRO_TIME_MILLIS", target))?,
        Value::TimeMicros(micros) => {
            time_of_day(*micros).ok_or_else(|| out_of_range("AVRO_TIME_MICROS", target))?
        }
        Value::TimestampMillis(millis) => DateTime::from_timestamp_millis(*millis)
            .map(|dt| NativeValue::TimestampTz(dt.fixed_offset()))
            .ok_or_else(|| out_of_range("AVRO_TIMESTAMP_MILLIS", target))?,
        Value::TimestampMicros(micros) => DateTime::from_timestamp_micros(*micros)
            .map(|dt| NativeValue::TimestampTz(dt.fixed_offset()))
            .ok_or_else(|| out_of_range("AVRO_TIMESTAMP_MICROS", target))?,
        Value::LocalTimestampMillis(millis) => DateTime::from_timestamp_millis(*millis)
            .map(|dt| NativeValue::Timestamp(dt.naive_utc()))
            .ok_or_else(|| out_of_range("AVRO_LOCAL_TIMESTAMP_MILLIS", target))?,
        Value::LocalTimestampMicros(micros) => DateTime::from_timestamp_micros(*micros)
            .map(|dt| NativeValue::Timestamp(dt.naive_utc()))
            .ok_or_else(|| out_of_range("AVRO_LOCAL_TIMESTAMP_MICROS", target))?,
        Value::Array(items) => NativeValue::List(
            items
                .iter()
                .map(|item| to_native(item, target))
                .collect::<MappingResult<Vec<_>>>()?,
        ),
        Value::Map(entries) => {
            let mut fields = entries
                .iter()
                .map(|(name, value)| Ok((name.clone(), to_native(value, target)?)))
                .collect::<MappingResult<Vec<_>>>()?;
            fields.sort_by(|(a, _), (b, _)| a.cmp(b));
            NativeValue::Object(ObjectValue::anonymous(fields))
        }
        Value::Record(fields) => NativeValue::Object(ObjectValue::anonymous(
            fields
                .iter()
                .map(|(name, value)| Ok((name.clone(), to_native(value, target)?)))
                .collect::<MappingResult<Vec<_>>>()?,
        )),
        Value::Decimal(decimal) => NativeValue::Bytes(
            Vec::<u8>::try_from(decimal).map_err(|_| cannot_convert("AVRO_DECIMAL", target))?,
        ),
        Value::BigDecimal(decimal) => NativeValue::Decimal(decimal.clone()),
        Value::Duration(duration) => duration_components(duration),
        _ => return Err(cannot_convert("AVRO", target)),
    };
    Ok(native)
}

fn scaled_decimal(decimal: &Decimal, scale: u32, target: QueryDataType) -> MappingResult<BigDecimal> {
    let unscaled = Vec::<u8>::try_from(decimal).map_err(|_| cannot_convert("AVRO_DECIMAL", target))?;
    Ok(BigDecimal::new(BigInt::from_signed_bytes_be(&unscaled), i64::from(scale)))
}

fn duration_components(duration: &Duration) -> NativeValue {
    NativeValue::Object(ObjectValue::anonymous(vec![
        ("months".to_string(), NativeValue::Long(i64::from(u32::from(duration.months())))),
        ("days".to_string(), NativeValue::Long(i64::from(u32::from(duration.days())))),
        ("millis".to_string(), NativeValue::Long(i64::from(u32::from(duration.millis())))),
    ]))
}

fn time_of_day(micros: i64) -> Option<NativeValue> {
    let seconds = u32::try_from(micros.div_euclid(1_000_000)).ok()?;
    let nanos = u32::try_from(micros.rem_euclid(1_000_000) * 1_000).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos).map(NativeValue::Time)
}

fn cannot_convert(from: &str, to: QueryDataType) -> MappingError {
    MappingError::CannotConvert {
        from: from.to_string(),
        to,
    }
}

fn out_of_range(from: &str, to: QueryDataType) -> MappingError {
    MappingError::NumericOverflow {
        from: from.to_string(),
        to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apache_avro::types::Record;
    use apache_avro::Schema;
    use apache_avro::{Days, Millis, Months};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::str::FromStr;

    fn extractor(field: &str, data_type: QueryDataType) -> AvroExtractor {
        AvroExtractor::new(QueryPath::member(false, field).unwrap(), data_type).unwrap()
    }

    fn schema() -> Schema {
        let string_fields = [
            "string",
            "character",
            "bigDecimal",
            "bigInteger",
            "localTime",
            "localDate",
            "localDateTime",
            "date",
            "calendar",
            "instant",
            "zonedDateTime",
            "offsetDateTime",
        ];
        let mut fields = vec![
            serde_json::json!({"name": "null", "type": ["null", {"type": "record", "name": "nested", "fields": []}]}),
            serde_json::json!({"name": "boolean", "type": "boolean"}),
            serde_json::json!({"name": "byte", "type": "int"}),
            serde_json::json!({"name": "short", "type": "int"}),
            serde_json::json!({"name": "int", "type": "int"}),
            serde_json::json!({"name": "long", "type": "long"}),
            serde_json::json!({"name": "float", "type": "float"}),
            serde_json::json!({"name": "double", "type": "double"}),
        ];
        fields.extend(
            string_fields
                .iter()
                .map(|name| serde_json::json!({"name": name, "type": "string"})),
        );
        Schema::parse(&serde_json::json!({"type": "record", "name": "name", "fields": fields})).unwrap()
    }

    fn record(schema: &Schema) -> Value {
        let mut record = Record::new(schema).unwrap();
        record.put("null", Value::Union(0, Box::new(Value::Null)));
        record.put("string", "string");
        record.put("character", "a");
        record.put("boolean", true);
        record.put("byte", 127);
        record.put("short", 32767);
        record.put("int", 2147483647);
        record.put("long", 9223372036854775807_i64);
        record.put("float", 1234567890.1_f32);
        record.put("double", 123451234567890.1_f64);
        record.put("bigDecimal", "9223372036854775.123");
        record.put("bigInteger", "9223372036854775222");
        record.put("localTime", "12:23:34");
        record.put("localDate", "2020-09-09");
        record.put("localDateTime", "2020-09-09T12:23:34.1");
        record.put("date", "2020-09-09T12:23:34.2Z");
        record.put("calendar", "2020-09-09T12:23:34.3Z");
        record.put("instant", "2020-09-09T12:23:34.4Z");
        record.put("zonedDateTime", "2020-09-09T12:23:34.5Z");
        record.put("offsetDateTime", "2020-09-09T12:23:34.6Z");
        record.into()
    }

    fn utc(millis: u32) -> QueryValue {
        let ts = NaiveDate::from_ymd_opt(2020, 9, 9)
            .unwrap()
            .and_hms_milli_opt(12, 23, 34, millis)
            .unwrap();
        QueryValue::TimestampTz(ts.and_utc().fixed_offset())
    }

    #[test]
    fn test_get() {
        let schema = schema();
        let record = record(&schema);
        let get = |field: &str, data_type: QueryDataType| extractor(field, data_type).get(&record).unwrap();

        assert_eq!(get("null", QueryDataType::Object), QueryValue::Null);
        assert_eq!(get("string", QueryDataType::Varchar), QueryValue::Varchar("string".to_string()));
        assert_eq!(get("character", QueryDataType::VarcharCharacter), QueryValue::Varchar("a".to_string()));
        assert_eq!(get("boolean", QueryDataType::Boolean), QueryValue::Boolean(true));
        assert_eq!(get("byte", QueryDataType::TinyInt), QueryValue::TinyInt(127));
        assert_eq!(get("short", QueryDataType::SmallInt), QueryValue::SmallInt(32767));
        assert_eq!(get("int", QueryDataType::Int), QueryValue::Int(2147483647));
        assert_eq!(get("long", QueryDataType::BigInt), QueryValue::BigInt(9223372036854775807));
        assert_eq!(get("float", QueryDataType::Real), QueryValue::Real(1234567890.1));
        assert_eq!(get("double", QueryDataType::Double), QueryValue::Double(123451234567890.1));
        assert_eq!(
            get("bigDecimal", QueryDataType::Decimal),
            QueryValue::Decimal(BigDecimal::from_str("9223372036854775.123").unwrap())
        );
        assert_eq!(
            get("bigInteger", QueryDataType::DecimalBigInteger),
            QueryValue::Decimal(BigDecimal::from_str("9223372036854775222").unwrap())
        );
        assert_eq!(
            get("localTime", QueryDataType::Time),
            QueryValue::Time(NaiveTime::from_hms_opt(12, 23, 34).unwrap())
        );
        assert_eq!(
            get("localDate", QueryDataType::Date),
            QueryValue::Date(NaiveDate::from_ymd_opt(2020, 9, 9).unwrap())
        );
        assert_eq!(
            get("localDateTime", QueryDataType::Timestamp),
            QueryValue::Timestamp(
                NaiveDateTime::parse_from_str("2020-09-09T12:23:34.1", "%Y-%m-%dT%H:%M:%S%.f").unwrap()
            )
        );
        assert_eq!(get("date", QueryDataType::TimestampWithTzDate), utc(200));
        assert_eq!(get("calendar", QueryDataType::TimestampWithTzCalendar), utc(300));
        assert_eq!(get("instant", QueryDataType::TimestampWithTzInstant), utc(400));
        assert_eq!(get("zonedDateTime", QueryDataType::TimestampWithTzZonedDateTime), utc(500));
        assert_eq!(get("offsetDateTime", QueryDataType::TimestampWithTzOffsetDateTime), utc(600));
    }

    #[test]
    fn test_null_reads_as_null_for_every_type() {
        let schema = schema();
        let record = record(&schema);
        for data_type in QueryDataType::ALL {
            assert_eq!(extractor("null", data_type).get(&record).unwrap(), QueryValue::Null);
        }
    }

    #[test]
    fn test_missing_field_is_null() {
        let schema = schema();
        let record = record(&schema);
        assert_eq!(extractor("absent", QueryDataType::Int).get(&record).unwrap(), QueryValue::Null);

        let nested = AvroExtractor::new(QueryPath::parse("this.int.deeper").unwrap(), QueryDataType::Int).unwrap();
        assert_eq!(nested.get(&record).unwrap(), QueryValue::Null);
    }

    #[test]
    fn test_nested_records_and_logical_types() {
        let record = Value::Record(vec![
            (
                "address".to_string(),
                Value::Union(
                    1,
                    Box::new(Value::Record(vec![("zip".to_string(), Value::Int(2139))])),
                ),
            ),
            ("born".to_string(), Value::Date(18_514)),
            ("seen".to_string(), Value::TimestampMillis(1_599_654_214_600)),
            ("at".to_string(), Value::TimeMillis(44_614_000)),
            ("local".to_string(), Value::LocalTimestampMicros(1_599_654_214_100_000)),
        ]);

        let read = |path: &str, data_type: QueryDataType| {
            AvroExtractor::new(QueryPath::parse(path).unwrap(), data_type)
                .unwrap()
                .get(&record)
                .unwrap()
        };

        assert_eq!(read("this.address.zip", QueryDataType::BigInt), QueryValue::BigInt(2139));
        assert_eq!(
            read("this.born", QueryDataType::Date),
            QueryValue::Date(NaiveDate::from_ymd_opt(2020, 9, 9).unwrap())
        );
        assert_eq!(read("this.seen", QueryDataType::TimestampWithTzInstant), utc(600));
        assert_eq!(
            read("this.at", QueryDataType::Time),
            QueryValue::Time(NaiveTime::from_hms_opt(12, 23, 34).unwrap())
        );
        assert_eq!(
            read("this.local", QueryDataType::Varchar),
            QueryValue::Varchar("2020-09-09T12:23:34.100".to_string())
        );
        assert_eq!(
            read("this.address", QueryDataType::Object),
            QueryValue::Object(NativeValue::Object(ObjectValue::anonymous(vec![(
                "zip".to_string(),
                NativeValue::Int(2139)
            )])))
        );
    }

    #[test]
    fn test_object_keeps_nested_decimal_and_duration() {
        let record = Value::Record(vec![
            (
                "price".to_string(),
                Value::Record(vec![
                    ("amount".to_string(), Value::Decimal(Decimal::from(vec![0x04, 0xD2]))),
                    ("currency".to_string(), Value::String("EUR".to_string())),
                ]),
            ),
            (
                "term".to_string(),
                Value::Duration(Duration::new(Months::new(1), Days::new(2), Millis::new(3))),
            ),
        ]);
        let read = |path: &str| {
            AvroExtractor::new(QueryPath::parse(path).unwrap(), QueryDataType::Object)
                .unwrap()
                .get(&record)
                .unwrap()
        };

        assert_eq!(
            read("this.price"),
            QueryValue::Object(NativeValue::Object(ObjectValue::anonymous(vec![
                ("amount".to_string(), NativeValue::Bytes(vec![0x04, 0xD2])),
                ("currency".to_string(), NativeValue::String("EUR".to_string())),
            ])))
        );
        assert_eq!(
            read("this.term"),
            QueryValue::Object(NativeValue::Object(ObjectValue::anonymous(vec![
                ("months".to_string(), NativeValue::Long(1)),
                ("days".to_string(), NativeValue::Long(2)),
                ("millis".to_string(), NativeValue::Long(3)),
            ])))
        );
    }

    #[test]
    fn test_decimal_logical_type_uses_declared_scale() {
        let record = Value::Record(vec![
            ("price".to_string(), Value::Decimal(Decimal::from(vec![0xFB, 0x2E]))),
            (
                "exact".to_string(),
                Value::BigDecimal(BigDecimal::from_str("123456789012345678901234567890.5").unwrap()),
            ),
        ]);
        let price = |data_type: QueryDataType| {
            AvroExtractor::new(QueryPath::parse("this.price").unwrap(), data_type)
                .unwrap()
                .with_decimal_scale(Some(2))
                .get(&record)
        };

        // 0xFB2E is -1234 unscaled
        assert_eq!(
            price(QueryDataType::Decimal).unwrap(),
            QueryValue::Decimal(BigDecimal::from_str("-12.34").unwrap())
        );
        assert_eq!(price(QueryDataType::Varchar).unwrap(), QueryValue::Varchar("-12.34".to_string()));
        assert_eq!(price(QueryDataType::Int).unwrap(), QueryValue::Int(-12));

        // Without a scale the unscaled bytes cannot be read as a number
        assert!(matches!(
            extractor("price", QueryDataType::Decimal).get(&record),
            Err(MappingError::CannotConvert { .. })
        ));

        assert_eq!(
            extractor("exact", QueryDataType::Decimal).get(&record).unwrap(),
            QueryValue::Decimal(BigDecimal::from_str("123456789012345678901234567890.5").unwrap())
        );
    }

    #[test]
    fn test_whole_record_only_as_object() {
        assert!(matches!(
            AvroExtractor::new(QueryPath::root(false), QueryDataType::Varchar),
            Err(MappingError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_malformed_values_fail() {
        let schema = schema();
        let record = record(&schema);
        assert!(matches!(
            extractor("string", QueryDataType::Decimal).get(&record),
            Err(MappingError::CannotParse { .. })
        ));
        assert!(matches!(
            extractor("int", QueryDataType::TinyInt).get(&record),
            Err(MappingError::NumericOverflow { .. })
        ));
    }
}
