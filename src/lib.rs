//! lumadb - The query core of an embedded, reactive document database
//!
//! Plans declarative queries over typed JSON collections, encodes
//! order-preserving index keys for string-ordered storages, shares
//! live queries through a bounded cache and maintains their result
//! windows incrementally from change events.

pub mod cache;
pub mod collection;
pub mod document;
pub mod events;
pub mod index;
pub mod observability;
pub mod planner;
pub mod query;
pub mod reduce;
pub mod schema;
