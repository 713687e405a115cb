//! Schema subsystem for LumaDB
//!
//! Per SCHEMA.md, a collection schema declares the primary key, the
//! typed field tree and the indexes. Schemas are validated and
//! normalized once at collection creation; everything downstream
//! (codec, planner, query normalization) reads them as plain data.
//!
//! # Design Principles
//!
//! - Primary key is a bounded string
//! - Every index ends on the primary key
//! - Index fields carry the bounds the codec needs
//! - No coercion, no defaults

mod errors;
mod path;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use path::FieldPath;
pub use types::{CollectionSchema, FieldType, IndexDef};
