pub mod data_type;
pub mod descriptor;
pub mod mapping;
pub mod path;
pub mod schema;
pub mod value;

pub use data_type::*;
pub use descriptor::*;
pub use mapping::*;
pub use path::{QueryPath, KEY, VALUE};
pub use schema::*;
pub use value::*;
