//! Change event subsystem for LumaDB
//!
//! One event per committed document write. Events flow from the write
//! path into every cached query of the collection, where the event
//! reduce layer applies them incrementally.

mod event;

pub use event::{ChangeEvent, EventType};
