//! Stability primitives gating every interaction with the app under test.
//!
//! The UI animates, virtualizes and lazy-loads; these waits make the rest
//! of the suite deterministic against that. Soft waits (spinner, stability)
//! swallow their timeouts with a warning; hard lookups surface absence as
//! `None` and leave the severity decision to the caller.

pub mod config;

mod locator;
mod waiter;

pub use config::WaitConfig;
pub use locator::{ElementHandle, ElementLocator};
pub use waiter::{StabilityWaiter, WaitOutcome};

/// CSS selector addressing an element by its `id` attribute. Attribute
/// syntax rather than `#` so ids with dots or colons keep working.
pub fn id_selector(id: &str) -> String {
    format!("[id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""))
}
