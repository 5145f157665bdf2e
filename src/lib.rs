//! End-to-end UI test suite for the Planboard scheduling application.
//!
//! The suite drives one Chromium page per test run. Scenario code composes
//! three core pieces: the stability waits and element lookup in [`ui_wait`],
//! the asynchronous backend-failure listener in [`response_watch`], and the
//! canvas grid bridge in [`grid_bridge`]. This crate adds the glue those
//! scenarios run on: configuration, logging, the element-id catalog and the
//! [`TestHarness`] fixture.

pub mod config;
pub mod fixture;
pub mod ids;
pub mod logging;

pub use config::SuiteConfig;
pub use fixture::TestHarness;

pub use grid_bridge::{
    BridgeConfig, BridgeError, CanvasGridBridge, CellPosition, GridCellInfo, GridStrategy,
};
pub use page_driver::{ChromiumDriver, DriverConfig, PageDriver, ResponseEvent, StubDriver};
pub use response_watch::{ListenerConfig, ResponseErrorListener, SettleOutcome};
pub use ui_wait::{ElementLocator, StabilityWaiter, WaitConfig, WaitOutcome};
