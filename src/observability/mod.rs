//! Observability subsystem for LumaDB
//!
//! Per OBSERVABILITY.md, this module provides:
//! - Structured logging (JSON)
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use lumadb::observability::{Event, Logger};
//!
//! let logger = Logger::scoped("heroes");
//! logger.event(Event::QueryNew, &[("queries", "3")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

impl Logger {
    /// Log a lifecycle event at its default severity
    pub fn event(&self, event: Event, fields: &[(&str, &str)]) {
        self.log(event.severity(), event.as_str(), fields);
    }
}
