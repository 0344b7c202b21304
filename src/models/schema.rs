// Format schemas and connector options
//
// The native description of a record's shape, as supplied by the caller, and
// the string-keyed connector options that select a format per side.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::data_type::NativeType;
use crate::error::{MappingError, MappingResult};

pub const OPTION_KEY_FORMAT: &str = "keyFormat";
pub const OPTION_VALUE_FORMAT: &str = "valueFormat";
pub const OPTION_KEY_CLASS: &str = "keyJavaClass";
pub const OPTION_VALUE_CLASS: &str = "valueJavaClass";
pub const OPTION_KEY_AVRO_SCHEMA: &str = "keyAvroSchema";
pub const OPTION_VALUE_AVRO_SCHEMA: &str = "valueAvroSchema";

pub const JAVA_FORMAT: &str = "java";
pub const AVRO_FORMAT: &str = "avro";
pub const JSON_FORMAT: &str = "json";

/// A member exposed by an object class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMember {
    pub name: String,
    #[serde(rename = "type")]
    pub native_type: NativeType,
}

impl ClassMember {
    pub fn new(name: impl Into<String>, native_type: NativeType) -> Self {
        Self {
            name: name.into(),
            native_type,
        }
    }
}

/// Description of a reflected object class: its name and its exposed members
/// in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectClass {
    pub name: String,
    #[serde(default)]
    pub members: Vec<ClassMember>,
}

impl ObjectClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Builder: append a member
    pub fn with_member(mut self, name: impl Into<String>, native_type: NativeType) -> Self {
        self.members.push(ClassMember::new(name, native_type));
        self
    }

    pub fn member(&self, name: &str) -> Option<&ClassMember> {
        self.members.iter().find(|member| member.name == name)
    }
}

/// Native shape of one side of a record
#[derive(Debug, Clone)]
pub enum FormatSchema {
    /// A single scalar class
    Primitive(NativeType),
    /// A structured object class
    Object(ObjectClass),
    /// An Avro schema, typically taken from a sampled record
    Avro(apache_avro::Schema),
}

/// Connector options consumed by the resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatOptions {
    options: HashMap<String, String>,
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set an option
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Get a required option
    pub fn require(&self, key: &str) -> MappingResult<&str> {
        self.get(key)
            .ok_or_else(|| MappingError::MissingOption(key.to_string()))
    }

    /// Format name for one side; `java` when not set
    pub fn format(&self, is_key: bool) -> &str {
        let key = if is_key { OPTION_KEY_FORMAT } else { OPTION_VALUE_FORMAT };
        self.get(key).unwrap_or(JAVA_FORMAT)
    }

    pub fn class_option(is_key: bool) -> &'static str {
        if is_key {
            OPTION_KEY_CLASS
        } else {
            OPTION_VALUE_CLASS
        }
    }

    pub fn avro_schema_option(is_key: bool) -> &'static str {
        if is_key {
            OPTION_KEY_AVRO_SCHEMA
        } else {
            OPTION_VALUE_AVRO_SCHEMA
        }
    }
}

impl From<HashMap<String, String>> for FormatOptions {
    fn from(options: HashMap<String, String>) -> Self {
        Self { options }
    }
}
