pub mod field_validator;

pub use field_validator::*;
