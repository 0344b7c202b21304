use serde::{Deserialize, Serialize};

use super::data_type::QueryDataType;
use super::descriptor::{QueryTargetDescriptor, UpsertTargetDescriptor};
use super::path::QueryPath;
use super::schema::{FormatOptions, ObjectClass};
use crate::error::MappingResult;

/// A named, typed column bound to an external name (the textual field path)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingField {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: QueryDataType,
    pub external_name: String,
}

impl MappingField {
    pub fn new(name: impl Into<String>, data_type: QueryDataType, external_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type,
            external_name: external_name.into(),
        }
    }
}

/// A resolved column as consumed by the planner and the execution engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableField {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: QueryDataType,
    pub is_key: bool,
    pub path: QueryPath,
}

impl TableField {
    pub fn new(name: impl Into<String>, data_type: QueryDataType, path: QueryPath) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_key: path.is_key(),
            path,
        }
    }
}

/// Resolved, validated metadata for one side of a mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    pub fields: Vec<TableField>,
    pub query_target_descriptor: QueryTargetDescriptor,
    pub upsert_target_descriptor: UpsertTargetDescriptor,
}

impl EntryMetadata {
    pub fn new(
        fields: Vec<TableField>,
        query_target_descriptor: QueryTargetDescriptor,
        upsert_target_descriptor: UpsertTargetDescriptor,
    ) -> Self {
        Self {
            fields,
            query_target_descriptor,
            upsert_target_descriptor,
        }
    }
}

/// Resolved key and value halves of a mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMapping {
    /// Key-side columns first, then value-side columns
    pub fields: Vec<MappingField>,
    pub key: EntryMetadata,
    pub value: EntryMetadata,
}

impl ResolvedMapping {
    /// All table fields, key side first
    pub fn table_fields(&self) -> impl Iterator<Item = &TableField> {
        self.key.fields.iter().chain(self.value.fields.iter())
    }
}

/// A mapping as declared by a user: connector options, the declared columns
/// and the object classes the options may refer to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub options: FormatOptions,
    #[serde(default)]
    pub fields: Vec<MappingField>,
    #[serde(default)]
    pub classes: Vec<ObjectClass>,
}

impl MappingDefinition {
    /// Parse a definition from its JSON text
    pub fn from_json(text: &str) -> MappingResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn class(&self, name: &str) -> Option<&ObjectClass> {
        self.classes.iter().find(|class| class.name == name)
    }
}
