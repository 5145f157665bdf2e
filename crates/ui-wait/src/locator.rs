//! Identifier → live handle resolution that never throws on absence.
//!
//! Plenty of the app's elements are conditionally rendered (permissions,
//! feature flags), so scenario code must be able to branch on "not there"
//! without a failed test. Absence and automation faults both collapse to
//! `None` here; only the interactions on a resolved handle report errors.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use page_driver::{BoundingBox, DriverError, PageDriver};

use crate::waiter::{StabilityWaiter, WaitOutcome};
use crate::{id_selector, WaitConfig};

/// Pure query layer turning logical identifiers into [`ElementHandle`]s.
pub struct ElementLocator {
    driver: Arc<dyn PageDriver>,
    waiter: StabilityWaiter,
}

impl ElementLocator {
    pub fn new(driver: Arc<dyn PageDriver>, config: WaitConfig) -> Self {
        let waiter = StabilityWaiter::new(Arc::clone(&driver), config);
        Self { driver, waiter }
    }

    /// Bounded wait for the element with this id; `None` when it never
    /// attaches. Absence is an expected branch, not a failure.
    pub async fn find_by_id(&self, id: &str) -> Option<ElementHandle> {
        self.find_by_css(&id_selector(id)).await
    }

    /// Same contract, arbitrary CSS selector.
    pub async fn find_by_css(&self, selector: &str) -> Option<ElementHandle> {
        let timeout = Duration::from_millis(self.waiter.config().attach_timeout_ms);
        match self.waiter.wait_for_attached(selector, timeout).await {
            WaitOutcome::Satisfied => Some(ElementHandle {
                driver: Arc::clone(&self.driver),
                selector: selector.to_string(),
            }),
            WaitOutcome::TimedOut => {
                debug!(target: "ui-wait", selector, "element not present");
                None
            }
        }
    }

    /// Best-effort visibility; any fault collapses to `false`.
    pub async fn is_visible(&self, id: &str) -> bool {
        match self.driver.is_visible(&id_selector(id)).await {
            Ok(visible) => visible,
            Err(err) => {
                warn!(target: "ui-wait", %err, id, "visibility probe failed");
                false
            }
        }
    }
}

/// A resolved element, addressed by the selector that found it.
///
/// The grid virtualizes and recycles nodes, so handles are used promptly
/// and re-resolved rather than stored across steps.
#[derive(Clone)]
pub struct ElementHandle {
    driver: Arc<dyn PageDriver>,
    selector: String,
}

impl ElementHandle {
    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub async fn click(&self) -> Result<(), DriverError> {
        self.driver.click(&self.selector).await
    }

    pub async fn fill(&self, text: &str) -> Result<(), DriverError> {
        self.driver.fill(&self.selector, text).await
    }

    pub async fn press_key(&self, key: &str) -> Result<(), DriverError> {
        self.driver.press_key(&self.selector, key).await
    }

    pub async fn inner_text(&self) -> Result<Option<String>, DriverError> {
        self.driver.inner_text(&self.selector).await
    }

    pub async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        self.driver.attribute(&self.selector, name).await
    }

    pub async fn is_visible(&self) -> bool {
        self.driver.is_visible(&self.selector).await.unwrap_or(false)
    }

    pub async fn bounding_box(&self) -> Result<Option<BoundingBox>, DriverError> {
        self.driver.bounding_box(&self.selector).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_driver::{StubAction, StubDriver, StubElement};

    fn fast_config() -> WaitConfig {
        WaitConfig {
            attach_timeout_ms: 80,
            poll_interval_ms: 10,
            ..WaitConfig::default()
        }
    }

    #[tokio::test]
    async fn find_by_id_resolves_present_element() {
        let driver = Arc::new(StubDriver::new());
        driver.insert_element(
            "[id=\"client-name-input\"]",
            StubElement::visible().with_text("Acme"),
        );
        let locator = ElementLocator::new(Arc::clone(&driver) as _, fast_config());

        let handle = locator
            .find_by_id("client-name-input")
            .await
            .expect("present element resolves");
        assert_eq!(handle.selector(), "[id=\"client-name-input\"]");
        assert_eq!(handle.inner_text().await.unwrap().as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn find_by_id_absorbs_absence() {
        let driver = Arc::new(StubDriver::new());
        let locator = ElementLocator::new(driver, fast_config());
        assert!(locator.find_by_id("feature-flagged-button").await.is_none());
    }

    #[tokio::test]
    async fn handle_interactions_reach_the_driver() {
        let driver = Arc::new(StubDriver::new());
        driver.insert_element("[id=\"save-button\"]", StubElement::visible());
        let locator = ElementLocator::new(Arc::clone(&driver) as _, fast_config());

        let handle = locator.find_by_id("save-button").await.expect("resolves");
        handle.click().await.expect("click");

        assert_eq!(
            driver.actions(),
            vec![StubAction::Click {
                selector: "[id=\"save-button\"]".into()
            }]
        );
    }

    #[tokio::test]
    async fn is_visible_collapses_absence_to_false() {
        let driver = Arc::new(StubDriver::new());
        let locator = ElementLocator::new(driver, fast_config());
        assert!(!locator.is_visible("hidden-or-missing").await);
    }
}
