//! Collection subsystem for LumaDB
//!
//! The composition surface of the query core. A collection is built
//! once from [`CollectionOptions`] with every strategy injected at
//! construction; afterwards it hands out shared cached queries,
//! produces plans, accepts executed results and feeds change events
//! into the incremental path.
//!
//! # Design Principles
//!
//! 1. Explicit dependency injection, no global registries
//! 2. Storage execution stays outside the crate
//! 3. Destroy is idempotent and implied by Drop

mod errors;
mod handle;
mod options;

pub use errors::{CollectionError, CollectionResult};
pub use handle::Collection;
pub use options::CollectionOptions;
