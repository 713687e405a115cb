//! Document wrapper subsystem for LumaDB
//!
//! Per SCHEMA.md §5, documents stay plain JSON values. The capabilities
//! a host attaches to them (field accessors, user methods, primary-key
//! extraction) live in a per-collection [`DocumentVtable`] composed
//! once at collection creation, never mutated afterwards.

mod errors;
mod vtable;

pub use errors::{DocumentError, DocumentErrorCode, DocumentResult};
pub use vtable::{DocumentMethod, DocumentRef, DocumentVtable, BASE_DOCUMENT_PROPERTIES};
