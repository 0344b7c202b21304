pub mod converter; // Canonical value coercion
pub mod extract;
pub mod format; // Per-format field discovery and metadata
pub mod projector;
pub mod resolver;

pub use converter::*;
pub use extract::{AvroExtractor, GenericExtractor, JsonExtractor, QueryExtractor, QueryTarget};
pub use format::EntryFormat;
pub use projector::*;
pub use resolver::*;
