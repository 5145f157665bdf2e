//! Bounded polling waits over the page driver.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use page_driver::PageDriver;

use crate::WaitConfig;

/// How a bounded wait ended. Timeouts are data, not errors; the caller
/// decides whether absence is fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Satisfied,
    TimedOut,
}

impl WaitOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, WaitOutcome::Satisfied)
    }
}

enum Probe {
    Attached,
    Visible,
    Gone,
}

/// Polls page conditions with bounded budgets.
pub struct StabilityWaiter {
    driver: Arc<dyn PageDriver>,
    config: WaitConfig,
}

impl StabilityWaiter {
    pub fn new(driver: Arc<dyn PageDriver>, config: WaitConfig) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Wait until some element matches `selector`.
    pub async fn wait_for_attached(&self, selector: &str, timeout: Duration) -> WaitOutcome {
        self.poll(selector, Probe::Attached, timeout).await
    }

    /// Wait until the first match of `selector` is rendered visibly.
    pub async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> WaitOutcome {
        self.poll(selector, Probe::Visible, timeout).await
    }

    /// Soft wait for the loading indicator to disappear. Some pages never
    /// show it, so a timeout is logged and swallowed.
    pub async fn wait_for_spinner_gone(&self, timeout: Duration) {
        let selector = self.config.spinner_selector.clone();
        if let WaitOutcome::TimedOut = self.poll(&selector, Probe::Gone, timeout).await {
            warn!(
                target: "ui-wait",
                selector,
                "loading indicator still visible after {timeout:?}; continuing"
            );
        }
    }

    /// Visible + network idle + a fixed settle delay.
    ///
    /// A fixed-budget heuristic against animation and layout-shift races,
    /// not a proof of stability: the settle delay is simply long enough for
    /// the app's transitions in practice.
    pub async fn wait_for_element_stable(&self, selector: &str) -> WaitOutcome {
        let visible = self
            .wait_for_visible(
                selector,
                Duration::from_millis(self.config.visible_timeout_ms),
            )
            .await;
        if !visible.is_satisfied() {
            return WaitOutcome::TimedOut;
        }

        if let Err(err) = self
            .driver
            .wait_for_network_idle(
                Duration::from_millis(self.config.network_quiet_ms),
                Duration::from_millis(self.config.network_idle_timeout_ms),
            )
            .await
        {
            warn!(target: "ui-wait", %err, selector, "network not idle; continuing");
        }

        self.sleep_for(Duration::from_millis(self.config.settle_delay_ms))
            .await;
        WaitOutcome::Satisfied
    }

    /// The escape hatch for steps with no observable completion signal
    /// (CSS transitions and the like). Used sparingly.
    pub async fn sleep_for(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn poll(&self, selector: &str, probe: Probe, timeout: Duration) -> WaitOutcome {
        let deadline = Instant::now() + timeout;
        let interval = Duration::from_millis(self.config.poll_interval_ms.max(10));
        loop {
            // Driver faults collapse to "condition not met"; a flaky poll
            // round must not abort the whole wait.
            let satisfied = match probe {
                Probe::Attached => self.driver.exists(selector).await.unwrap_or(false),
                Probe::Visible => self.driver.is_visible(selector).await.unwrap_or(false),
                Probe::Gone => !self.driver.is_visible(selector).await.unwrap_or(false),
            };
            if satisfied {
                return WaitOutcome::Satisfied;
            }
            if Instant::now() >= deadline {
                debug!(target: "ui-wait", selector, "wait deadline elapsed");
                return WaitOutcome::TimedOut;
            }
            tokio::time::sleep(interval).await;
        }
    }
}
