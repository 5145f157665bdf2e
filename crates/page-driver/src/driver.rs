//! The page boundary trait every higher layer is written against.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::{DriverError, ResponseEvent};

/// Viewport-relative rectangle of a rendered element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Center point, the default target for raw pointer dispatch.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Uniform surface over one browser page.
///
/// Selector-addressed operations act on the first match. Lookups report
/// absence through their return value; only protocol-level faults become
/// [`DriverError`]s, and callers at the locator/bridge boundary are
/// expected to absorb those into null results.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the load to finish, bounded by `timeout`.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Whether any element currently matches `selector`.
    async fn exists(&self, selector: &str) -> Result<bool, DriverError>;

    /// Whether the first match is rendered with a non-empty box.
    async fn is_visible(&self, selector: &str) -> Result<bool, DriverError>;

    async fn inner_text(&self, selector: &str) -> Result<Option<String>, DriverError>;

    async fn attribute(&self, selector: &str, name: &str)
        -> Result<Option<String>, DriverError>;

    async fn click(&self, selector: &str) -> Result<(), DriverError>;

    /// Focus the first match and type `text` into it.
    async fn fill(&self, selector: &str, text: &str) -> Result<(), DriverError>;

    async fn press_key(&self, selector: &str, key: &str) -> Result<(), DriverError>;

    async fn bounding_box(&self, selector: &str) -> Result<Option<BoundingBox>, DriverError>;

    /// Dispatch a raw pointer click at viewport coordinates.
    /// `clicks` of 2 produces a double click.
    async fn mouse_click(&self, x: f64, y: f64, clicks: u8) -> Result<(), DriverError>;

    /// Dispatch a mouse wheel event at viewport coordinates.
    async fn mouse_wheel(&self, x: f64, y: f64, delta_y: f64) -> Result<(), DriverError>;

    /// Evaluate a script expression in the page, returning its value by
    /// serialization. An undefined result comes back as `Value::Null`.
    async fn evaluate(&self, expression: &str) -> Result<Value, DriverError>;

    /// Resolve once the page has had no network activity for `quiet`,
    /// bounded by `timeout` (which maps to [`DriverError::Timeout`]).
    async fn wait_for_network_idle(
        &self,
        quiet: Duration,
        timeout: Duration,
    ) -> Result<(), DriverError>;

    /// Subscribe to the page's response stream. The subscription observes
    /// every response in arrival order from the moment it is created.
    fn responses(&self) -> broadcast::Receiver<ResponseEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_center() {
        let bbox = BoundingBox {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 40.0,
        };
        assert_eq!(bbox.center(), (60.0, 40.0));
    }
}
