// Avro format
//
// Generic Avro records. Top-level record fields are discovered from the
// schema; deeper user paths are checked against nested records.

use std::collections::BTreeMap;

use apache_avro::schema::RecordField;
use apache_avro::Schema;
use serde_json::json;

use super::object::merge_fields;
use crate::error::{MappingError, MappingResult};
use crate::models::{
    EntryMetadata, MappingField, QueryDataType, QueryPath, QueryTargetDescriptor, TableField,
    UpsertTargetDescriptor, AVRO_FORMAT,
};
use crate::validation::FieldValidator;

/// Name of the record schema generated when no schema is supplied
const GENERATED_RECORD_NAME: &str = "sql";

/// Canonical type of values declared with the given Avro schema
pub fn avro_type(schema: &Schema) -> QueryDataType {
    match schema {
        Schema::Boolean => QueryDataType::Boolean,
        Schema::Int => QueryDataType::Int,
        Schema::Long => QueryDataType::BigInt,
        Schema::Float => QueryDataType::Real,
        Schema::Double => QueryDataType::Double,
        Schema::String | Schema::Uuid => QueryDataType::Varchar,
        Schema::Date => QueryDataType::Date,
        Schema::TimeMillis | Schema::TimeMicros => QueryDataType::Time,
        Schema::TimestampMillis | Schema::TimestampMicros => {
            QueryDataType::TimestampWithTzOffsetDateTime
        }
        Schema::LocalTimestampMillis | Schema::LocalTimestampMicros => QueryDataType::Timestamp,
        Schema::Decimal(_) | Schema::BigDecimal => QueryDataType::Decimal,
        Schema::Union(_) => match unwrap_nullable(schema) {
            Some(inner) => avro_type(inner),
            None => QueryDataType::Object,
        },
        _ => QueryDataType::Object,
    }
}

/// The non-null branch of a `["null", T]` union
fn unwrap_nullable(schema: &Schema) -> Option<&Schema> {
    match schema {
        Schema::Union(union) => match union.variants() {
            [Schema::Null, inner] | [inner, Schema::Null] => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn record_fields(schema: &Schema) -> Option<&[RecordField]> {
    match schema {
        Schema::Record(record) => Some(record.fields.as_slice()),
        _ => unwrap_nullable(schema).and_then(record_fields),
    }
}

/// Schema of the value a path addresses, if the schema declares it
fn nested_schema<'a>(schema: &'a Schema, path: &QueryPath) -> Option<&'a Schema> {
    let mut current = schema;
    for step in path.steps() {
        let field = record_fields(current)?.iter().find(|field| &field.name == step)?;
        current = &field.schema;
    }
    Some(current)
}

fn nested_type(schema: &Schema, path: &QueryPath) -> Option<QueryDataType> {
    nested_schema(schema, path).map(avro_type)
}

fn decimal_scale(schema: &Schema) -> Option<u32> {
    match schema {
        Schema::Decimal(decimal) => u32::try_from(decimal.scale).ok(),
        _ => unwrap_nullable(schema).and_then(decimal_scale),
    }
}

/// Resolve the fields of an Avro side
pub fn resolve_fields(
    schema: Option<&Schema>,
    is_key: bool,
    user_fields: &[MappingField],
) -> MappingResult<Vec<MappingField>> {
    let user = FieldValidator::extract_fields(user_fields, is_key)?;
    for (path, _) in &user {
        FieldValidator::ensure_not_top(path, "Avro")?;
    }

    let schema = match schema {
        Some(schema) => schema,
        None => {
            if user.is_empty() {
                return Err(MappingError::ColumnListRequired(AVRO_FORMAT.to_string()));
            }
            return merge_fields(Vec::new(), user, |_| None);
        }
    };

    let fields = record_fields(schema).ok_or_else(|| {
        MappingError::UnsupportedType(format!(
            "Avro schema must describe a record: {}",
            schema.canonical_form()
        ))
    })?;

    let discovered = fields
        .iter()
        .map(|field| {
            let path = QueryPath::member(is_key, &field.name)?;
            Ok(MappingField::new(field.name.clone(), avro_type(&field.schema), path.to_string()))
        })
        .collect::<MappingResult<Vec<_>>>()?;

    merge_fields(discovered, user, |path| nested_type(schema, path))
}

pub fn resolve_metadata(schema: Option<&Schema>, fields: &[MappingField]) -> MappingResult<EntryMetadata> {
    let table_fields = fields
        .iter()
        .map(|field| {
            let path = QueryPath::parse(&field.external_name)?;
            Ok(TableField::new(field.name.clone(), field.data_type, path))
        })
        .collect::<MappingResult<Vec<_>>>()?;

    let (schema_text, decimal_scales) = match schema {
        Some(schema) => {
            let scales: BTreeMap<String, u32> = table_fields
                .iter()
                .filter_map(|field| {
                    let scale = nested_schema(schema, &field.path).and_then(decimal_scale)?;
                    Some((field.path.to_string(), scale))
                })
                .collect();
            (schema.canonical_form(), scales)
        }
        None => (generate_schema(&table_fields)?.canonical_form(), BTreeMap::new()),
    };

    Ok(EntryMetadata::new(
        table_fields,
        QueryTargetDescriptor::Avro { decimal_scales },
        UpsertTargetDescriptor::Avro { schema: schema_text },
    ))
}

/// Nullable record schema covering the direct members among the fields
fn generate_schema(fields: &[TableField]) -> MappingResult<Schema> {
    let members: Vec<serde_json::Value> = fields
        .iter()
        .filter_map(|field| match field.path.steps() {
            [member] => Some(json!({
                "name": member,
                "type": ["null", avro_type_name(field.data_type)],
                "default": null,
            })),
            _ => None,
        })
        .collect();

    let schema = Schema::parse(&json!({
        "type": "record",
        "name": GENERATED_RECORD_NAME,
        "fields": members,
    }))?;
    Ok(schema)
}

fn avro_type_name(data_type: QueryDataType) -> &'static str {
    match data_type {
        QueryDataType::Boolean => "boolean",
        QueryDataType::TinyInt | QueryDataType::SmallInt | QueryDataType::Int => "int",
        QueryDataType::BigInt => "long",
        QueryDataType::Real => "float",
        QueryDataType::Double => "double",
        // Text carries everything else, as the extractors parse it back exactly
        _ => "string",
    }
}
