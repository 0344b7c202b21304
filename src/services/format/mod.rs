// Record format support
//
// One variant per supported key/value serialization format. Each variant
// knows how to discover the fields of its format, reconcile them with the
// user-declared columns and describe how records are read and written.

pub mod avro;
pub mod json;
pub mod object;
pub mod primitive;

use apache_avro::Schema;

use crate::error::{MappingError, MappingResult};
use crate::models::{
    EntryMetadata, FormatOptions, FormatSchema, MappingField, NativeType, ObjectClass,
    AVRO_FORMAT, JAVA_FORMAT, JSON_FORMAT, OPTION_KEY_FORMAT,
    OPTION_VALUE_FORMAT,
};

/// Format of one side (key or value) of a record
#[derive(Debug, Clone)]
pub enum EntryFormat {
    /// The whole side is a single scalar
    Primitive(NativeType),
    /// A structured object with named members
    Object(ObjectClass),
    /// Avro generic records; the schema is optional when columns are declared
    Avro(Option<Schema>),
    /// Schemaless JSON documents
    Json,
}

impl EntryFormat {
    /// Select the format of one side from the connector options
    ///
    /// A sample schema, when supplied, takes precedence over the schema-related
    /// options but must agree with the selected format.
    ///
    /// # Arguments
    /// * `is_key` - Whether the key or the value side is being resolved
    /// * `options` - Connector options
    /// * `sample` - Native shape of the side, if known
    pub fn from_options(
        is_key: bool,
        options: &FormatOptions,
        sample: Option<&FormatSchema>,
    ) -> MappingResult<Self> {
        let format = options.format(is_key);
        let selected = match format.to_lowercase().as_str() {
            JAVA_FORMAT => Self::java(is_key, options, sample)?,
            AVRO_FORMAT => Self::avro(is_key, options, sample)?,
            JSON_FORMAT => match sample {
                None => EntryFormat::Json,
                Some(_) => return Err(sample_mismatch(is_key, format)),
            },
            _ => {
                return Err(MappingError::InvalidOption {
                    key: format_option(is_key).to_string(),
                    message: format!("Unsupported serialization format: {}", format),
                })
            }
        };

        tracing::debug!(
            "Selected {} format for the {} side",
            selected.name(),
            if is_key { "key" } else { "value" }
        );
        Ok(selected)
    }

    fn java(is_key: bool, options: &FormatOptions, sample: Option<&FormatSchema>) -> MappingResult<Self> {
        let class_option = FormatOptions::class_option(is_key);

        match sample {
            Some(FormatSchema::Primitive(native)) => Ok(EntryFormat::Primitive(*native)),
            Some(FormatSchema::Object(class)) => {
                if let Some(name) = options.get(class_option) {
                    if name != class.name {
                        return Err(MappingError::InvalidOption {
                            key: class_option.to_string(),
                            message: format!(
                                "Class '{}' does not match the supplied class '{}'",
                                name, class.name
                            ),
                        });
                    }
                }
                Ok(EntryFormat::Object(class.clone()))
            }
            Some(FormatSchema::Avro(_)) => Err(sample_mismatch(is_key, JAVA_FORMAT)),
            None => {
                let name = options.require(class_option)?;
                match NativeType::from_name(name) {
                    Some(native) if native.is_primitive() => Ok(EntryFormat::Primitive(native)),
                    // A plain object exposes no members of its own
                    Some(_) => Ok(EntryFormat::Object(ObjectClass::new(name))),
                    None => Err(MappingError::InvalidOption {
                        key: class_option.to_string(),
                        message: format!("Unknown class '{}'; declare its members", name),
                    }),
                }
            }
        }
    }

    fn avro(is_key: bool, options: &FormatOptions, sample: Option<&FormatSchema>) -> MappingResult<Self> {
        match sample {
            Some(FormatSchema::Avro(schema)) => Ok(EntryFormat::Avro(Some(schema.clone()))),
            Some(_) => Err(sample_mismatch(is_key, AVRO_FORMAT)),
            None => {
                let schema_option = FormatOptions::avro_schema_option(is_key);
                let schema = options
                    .get(schema_option)
                    .map(|text| {
                        Schema::parse_str(text).map_err(|e| MappingError::InvalidOption {
                            key: schema_option.to_string(),
                            message: e.to_string(),
                        })
                    })
                    .transpose()?;
                Ok(EntryFormat::Avro(schema))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntryFormat::Primitive(_) => "primitive",
            EntryFormat::Object(_) => "object",
            EntryFormat::Avro(_) => AVRO_FORMAT,
            EntryFormat::Json => JSON_FORMAT,
        }
    }

    /// Reconcile the discovered fields of this format with the user-declared
    /// columns of one side
    pub fn resolve_fields(&self, is_key: bool, user_fields: &[MappingField]) -> MappingResult<Vec<MappingField>> {
        match self {
            EntryFormat::Primitive(native) => primitive::resolve_fields(*native, is_key, user_fields),
            EntryFormat::Object(class) => object::resolve_fields(class, is_key, user_fields),
            EntryFormat::Avro(schema) => avro::resolve_fields(schema.as_ref(), is_key, user_fields),
            EntryFormat::Json => json::resolve_fields(is_key, user_fields),
        }
    }

    /// Build the metadata of one side from its resolved fields
    pub fn resolve_metadata(&self, is_key: bool, fields: &[MappingField]) -> MappingResult<EntryMetadata> {
        match self {
            EntryFormat::Primitive(native) => primitive::resolve_metadata(*native, is_key, fields),
            EntryFormat::Object(class) => object::resolve_metadata(class, fields),
            EntryFormat::Avro(schema) => avro::resolve_metadata(schema.as_ref(), fields),
            EntryFormat::Json => json::resolve_metadata(fields),
        }
    }
}

fn format_option(is_key: bool) -> &'static str {
    if is_key {
        OPTION_KEY_FORMAT
    } else {
        OPTION_VALUE_FORMAT
    }
}

fn sample_mismatch(is_key: bool, format: &str) -> MappingError {
    MappingError::InvalidOption {
        key: format_option(is_key).to_string(),
        message: format!("The supplied schema cannot be used with {} serialization", format),
    }
}
