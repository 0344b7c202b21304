// Target descriptors
//
// Opaque, format-specific tokens telling the execution engine how to read
// from (query target) or construct (upsert target) a record of a format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-side target descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryTargetDescriptor {
    /// Primitive and reflected-object records
    Generic,
    /// Avro generic records
    #[serde(rename_all = "camelCase")]
    Avro {
        /// Path -> scale of the columns declared with the `decimal` logical
        /// type; the records only carry the unscaled value
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        decimal_scales: BTreeMap<String, u32>,
    },
    Json,
}

impl QueryTargetDescriptor {
    /// Avro descriptor with no decimal columns
    pub fn avro() -> Self {
        QueryTargetDescriptor::Avro {
            decimal_scales: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QueryTargetDescriptor::Generic => "generic",
            QueryTargetDescriptor::Avro { .. } => "avro",
            QueryTargetDescriptor::Json => "json",
        }
    }
}

/// Write-side target descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UpsertTargetDescriptor {
    /// The column value is the key/value itself
    Primitive,
    /// An object of `class_name`, members set by name
    #[serde(rename_all = "camelCase")]
    Object {
        class_name: String,
        /// Member name -> native type name
        field_types: BTreeMap<String, String>,
    },
    /// An Avro generic record of the given schema (JSON text)
    Avro { schema: String },
    Json,
}
