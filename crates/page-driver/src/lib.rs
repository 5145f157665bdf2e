//! Browser page boundary for the Planboard E2E suite.
//!
//! Everything above this crate talks to the application under test through
//! the [`PageDriver`] trait: one production implementation backed by
//! chromiumoxide ([`ChromiumDriver`]) and one in-memory fake
//! ([`StubDriver`]) that the deterministic tests run against.

pub mod config;
pub mod util;

mod chromium;
mod driver;
mod error;
mod event;
mod stub;

pub use chromium::ChromiumDriver;
pub use config::DriverConfig;
pub use driver::{BoundingBox, PageDriver};
pub use error::DriverError;
pub use event::ResponseEvent;
pub use stub::{StubAction, StubDriver, StubElement};
