//! Index string codec subsystem for LumaDB
//!
//! Per INDEX.md, every index key is one fixed-layout string assembled
//! from the document's indexed fields. Keys compare with plain string
//! ordering, so any ordered storage can hold them without knowing the
//! schema.
//!
//! # Design Principles
//!
//! - Order preserving: key order equals document order under the index
//! - Fixed layout: every field occupies the same width in every key
//! - Schema checked: a codec is only built for encodable field types
//!
//! # Invariants
//!
//! - Encoding never fails for a document; missing fields get neutral
//!   defaults and out-of-range numbers clamp to the schema bounds
//! - Lower and upper bound strings for the same plan bracket exactly
//!   the documents inside the scan range

mod codec;
mod errors;

pub use codec::{shift_by_one_quantum, IndexCodec, INDEX_MAX_CHAR};
pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
