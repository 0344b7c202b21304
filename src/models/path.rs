use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MappingError, MappingResult};

/// Root literal addressing the record key
pub const KEY: &str = "__key";

/// Root literal addressing the record value
pub const VALUE: &str = "this";

/// Validated address into a key/value record
///
/// The textual form is `__key` or `this`, optionally followed by dotted
/// sub-field segments. Two paths are equal iff their textual forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueryPath {
    is_key: bool,
    steps: Vec<String>,
}

impl QueryPath {
    /// Parse and validate a textual path
    pub fn parse(text: &str) -> MappingResult<Self> {
        let mut parts = text.split('.');
        let is_key = match parts.next() {
            Some(KEY) => true,
            Some(VALUE) => false,
            _ => return Err(MappingError::InvalidExternalName(text.to_string())),
        };

        let steps = parts
            .map(|segment| {
                if is_valid_segment(segment) {
                    Ok(segment.to_string())
                } else {
                    Err(MappingError::InvalidExternalName(text.to_string()))
                }
            })
            .collect::<MappingResult<Vec<_>>>()?;

        Ok(Self { is_key, steps })
    }

    /// Path addressing the whole key or the whole value
    pub fn root(is_key: bool) -> Self {
        Self {
            is_key,
            steps: Vec::new(),
        }
    }

    /// Path addressing a direct member of the key or value
    pub fn member(is_key: bool, name: &str) -> MappingResult<Self> {
        Self::root(is_key).child(name)
    }

    /// Extend this path with one more segment
    pub fn child(&self, segment: &str) -> MappingResult<Self> {
        if !is_valid_segment(segment) {
            return Err(MappingError::InvalidExternalName(format!("{}.{}", self, segment)));
        }
        let mut steps = self.steps.clone();
        steps.push(segment.to_string());
        Ok(Self {
            is_key: self.is_key,
            steps,
        })
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    /// Whether the path is the bare root (no sub-field segments)
    pub fn is_top(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Root literal for the side this path addresses
    pub fn root_literal(&self) -> &'static str {
        root_literal(self.is_key)
    }
}

/// Root literal for the key (`__key`) or value (`this`) side
pub fn root_literal(is_key: bool) -> &'static str {
    if is_key {
        KEY
    } else {
        VALUE
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_literal())?;
        for step in &self.steps {
            write!(f, ".{}", step)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for QueryPath {
    type Error = MappingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        QueryPath::parse(&value)
    }
}

impl From<QueryPath> for String {
    fn from(value: QueryPath) -> String {
        value.to_string()
    }
}
