//! In-memory [`PageDriver`] for deterministic tests.
//!
//! Holds a flat selector → element map, records every interaction, answers
//! `evaluate` from canned results, and lets tests inject response events as
//! if the page had produced them.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::driver::{BoundingBox, PageDriver};
use crate::{DriverError, ResponseEvent};

/// State of one fake element.
#[derive(Clone, Debug, Default)]
pub struct StubElement {
    pub visible: bool,
    pub text: String,
    pub attributes: HashMap<String, String>,
    pub bbox: Option<BoundingBox>,
}

impl StubElement {
    pub fn visible() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// One recorded interaction, in dispatch order.
#[derive(Clone, Debug, PartialEq)]
pub enum StubAction {
    Goto { url: String },
    Click { selector: String },
    Fill { selector: String, text: String },
    PressKey { selector: String, key: String },
    MouseClick { x: f64, y: f64, clicks: u8 },
    MouseWheel { x: f64, y: f64, delta_y: f64 },
}

pub struct StubDriver {
    elements: DashMap<String, StubElement>,
    eval_results: DashMap<String, Value>,
    actions: Mutex<Vec<StubAction>>,
    events: broadcast::Sender<ResponseEvent>,
}

impl Default for StubDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl StubDriver {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            elements: DashMap::new(),
            eval_results: DashMap::new(),
            actions: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn insert_element(&self, selector: impl Into<String>, element: StubElement) {
        self.elements.insert(selector.into(), element);
    }

    pub fn remove_element(&self, selector: &str) {
        self.elements.remove(selector);
    }

    pub fn set_visible(&self, selector: &str, visible: bool) {
        if let Some(mut element) = self.elements.get_mut(selector) {
            element.visible = visible;
        }
    }

    /// Canned result for an exact `evaluate` expression. Unregistered
    /// expressions evaluate to `Value::Null`, mirroring an undefined
    /// result in the page.
    pub fn set_eval_result(&self, expression: impl Into<String>, result: Value) {
        self.eval_results.insert(expression.into(), result);
    }

    pub fn clear_eval_results(&self) {
        self.eval_results.clear();
    }

    /// Inject a response event as if the page had observed it.
    pub fn emit_response(&self, event: ResponseEvent) {
        let _ = self.events.send(event);
    }

    pub fn actions(&self) -> Vec<StubAction> {
        self.actions.lock().clone()
    }

    pub fn clear_actions(&self) {
        self.actions.lock().clear();
    }

    fn record(&self, action: StubAction) {
        self.actions.lock().push(action);
    }

    fn require(&self, selector: &str) -> Result<StubElement, DriverError> {
        self.elements
            .get(selector)
            .map(|entry| entry.clone())
            .ok_or_else(|| DriverError::NotFound(selector.to_string()))
    }
}

#[async_trait]
impl PageDriver for StubDriver {
    async fn goto(&self, url: &str, _timeout: Duration) -> Result<(), DriverError> {
        self.record(StubAction::Goto {
            url: url.to_string(),
        });
        Ok(())
    }

    async fn exists(&self, selector: &str) -> Result<bool, DriverError> {
        Ok(self.elements.contains_key(selector))
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, DriverError> {
        Ok(self
            .elements
            .get(selector)
            .map(|element| element.visible)
            .unwrap_or(false))
    }

    async fn inner_text(&self, selector: &str) -> Result<Option<String>, DriverError> {
        Ok(self.elements.get(selector).map(|element| element.text.clone()))
    }

    async fn attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        Ok(self
            .elements
            .get(selector)
            .and_then(|element| element.attributes.get(name).cloned()))
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        self.require(selector)?;
        self.record(StubAction::Click {
            selector: selector.to_string(),
        });
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.require(selector)?;
        self.record(StubAction::Fill {
            selector: selector.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn press_key(&self, selector: &str, key: &str) -> Result<(), DriverError> {
        self.require(selector)?;
        self.record(StubAction::PressKey {
            selector: selector.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    async fn bounding_box(&self, selector: &str) -> Result<Option<BoundingBox>, DriverError> {
        Ok(self.elements.get(selector).and_then(|element| element.bbox))
    }

    async fn mouse_click(&self, x: f64, y: f64, clicks: u8) -> Result<(), DriverError> {
        self.record(StubAction::MouseClick { x, y, clicks });
        Ok(())
    }

    async fn mouse_wheel(&self, x: f64, y: f64, delta_y: f64) -> Result<(), DriverError> {
        self.record(StubAction::MouseWheel { x, y, delta_y });
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, DriverError> {
        Ok(self
            .eval_results
            .get(expression)
            .map(|entry| entry.clone())
            .unwrap_or(Value::Null))
    }

    async fn wait_for_network_idle(
        &self,
        _quiet: Duration,
        _timeout: Duration,
    ) -> Result<(), DriverError> {
        Ok(())
    }

    fn responses(&self) -> broadcast::Receiver<ResponseEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_interactions_in_order() {
        let driver = StubDriver::new();
        driver.insert_element("#save-button", StubElement::visible());

        driver.goto("https://app.local/login", Duration::from_secs(5))
            .await
            .expect("goto");
        driver.click("#save-button").await.expect("click");
        driver.mouse_wheel(100.0, 200.0, -120.0).await.expect("wheel");

        assert_eq!(
            driver.actions(),
            vec![
                StubAction::Goto {
                    url: "https://app.local/login".into()
                },
                StubAction::Click {
                    selector: "#save-button".into()
                },
                StubAction::MouseWheel {
                    x: 100.0,
                    y: 200.0,
                    delta_y: -120.0
                },
            ]
        );
    }

    #[tokio::test]
    async fn click_on_absent_element_is_not_found() {
        let driver = StubDriver::new();
        let err = driver.click("#missing").await.expect_err("must fail");
        assert!(matches!(err, DriverError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_expression_evaluates_to_null() {
        let driver = StubDriver::new();
        let value = driver.evaluate("window.__whatever").await.expect("eval");
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn injected_responses_reach_subscribers() {
        let driver = StubDriver::new();
        let mut rx = driver.responses();
        driver.emit_response(ResponseEvent::new("https://app.local/api/shifts", 500));
        let event = rx.recv().await.expect("event");
        assert_eq!(event.status, 500);
        assert!(event.is_error());
    }
}
