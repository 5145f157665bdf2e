//! Per-test fixture wiring the core together.
//!
//! One harness per test run: one browser page, one response listener
//! subscription, the waits/locator/bridge on top. Scenario code brackets
//! every interaction that may hit the backend between [`begin_step`] and
//! [`finish_step`], which is where the listener's reset boundary lives.
//!
//! [`begin_step`]: TestHarness::begin_step
//! [`finish_step`]: TestHarness::finish_step

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info};
use uuid::Uuid;

use grid_bridge::CanvasGridBridge;
use page_driver::{ChromiumDriver, PageDriver};
use response_watch::ResponseErrorListener;
use ui_wait::{ElementLocator, StabilityWaiter};

use crate::config::SuiteConfig;
use crate::{ids, logging};

pub struct TestHarness {
    run_id: Uuid,
    config: SuiteConfig,
    chromium: Arc<ChromiumDriver>,
    driver: Arc<dyn PageDriver>,
    pub listener: ResponseErrorListener,
    pub waiter: StabilityWaiter,
    pub locator: ElementLocator,
    pub bridge: CanvasGridBridge,
}

impl TestHarness {
    /// Launch the browser and arm the response listener. The subscription
    /// is established here, once, and lives for the whole run.
    pub async fn launch(config: SuiteConfig) -> Result<Self> {
        logging::init();
        let run_id = Uuid::new_v4();
        info!(%run_id, base_url = %config.base_url, "launching test harness");

        let chromium = Arc::new(
            ChromiumDriver::launch(config.driver.clone())
                .await
                .context("launching chromium")?,
        );
        let driver: Arc<dyn PageDriver> = Arc::clone(&chromium) as _;

        let listener = ResponseErrorListener::new(config.listener.clone());
        listener.recognize_errors(driver.as_ref());

        let waiter = StabilityWaiter::new(Arc::clone(&driver), config.wait.clone());
        let locator = ElementLocator::new(Arc::clone(&driver), config.wait.clone());
        let bridge = CanvasGridBridge::new(
            Arc::clone(&driver),
            config.wait.clone(),
            config.bridge.clone(),
        );

        Ok(Self {
            run_id,
            config,
            chromium,
            driver,
            listener,
            waiter,
            locator,
            bridge,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn driver(&self) -> Arc<dyn PageDriver> {
        Arc::clone(&self.driver)
    }

    /// Navigate to a path under the configured base url and let the page
    /// settle.
    pub async fn open(&self, path: &str) -> Result<()> {
        let url = self
            .config
            .base_url
            .join(path)
            .with_context(|| format!("joining path {path}"))?;
        self.driver
            .goto(
                url.as_str(),
                Duration::from_millis(self.config.driver.nav_timeout_ms),
            )
            .await
            .with_context(|| format!("opening {url}"))?;
        self.waiter
            .wait_for_spinner_gone(Duration::from_millis(self.config.wait.spinner_timeout_ms))
            .await;
        Ok(())
    }

    /// Log in with the configured credentials and wait for the app shell.
    pub async fn login(&self) -> Result<()> {
        self.open("login").await?;

        let username = self
            .locator
            .find_by_id(ids::login::USERNAME_INPUT)
            .await
            .ok_or_else(|| anyhow!("login form did not render"))?;
        username.fill(&self.config.username).await?;

        let password = self
            .locator
            .find_by_id(ids::login::PASSWORD_INPUT)
            .await
            .ok_or_else(|| anyhow!("password field missing"))?;
        password.fill(&self.config.password).await?;

        self.begin_step();
        let submit = self
            .locator
            .find_by_id(ids::login::SUBMIT_BUTTON)
            .await
            .ok_or_else(|| anyhow!("login submit button missing"))?;
        submit.click().await?;
        self.finish_step("login").await?;

        if self.locator.is_visible(ids::login::ERROR_BANNER).await {
            bail!("login rejected for {}", self.config.username);
        }
        Ok(())
    }

    /// Open the schedule page and wait until the sidebar and toolbar are
    /// stable.
    pub async fn goto_schedule(&self) -> Result<()> {
        let link = self
            .locator
            .find_by_id(ids::nav::SCHEDULE_LINK)
            .await
            .ok_or_else(|| anyhow!("schedule navigation entry missing"))?;

        self.begin_step();
        link.click().await?;
        self.finish_step("open schedule").await?;

        self.waiter
            .wait_for_element_stable(&ui_wait::id_selector(ids::schedule::TOOLBAR))
            .await;
        Ok(())
    }

    /// Start a logical step: clear the error latch and re-arm the settle
    /// signal.
    pub fn begin_step(&self) {
        self.listener.reset();
    }

    /// Finish a logical step: wait for the backend to settle and fail the
    /// test if the listener latched an error meanwhile.
    pub async fn finish_step(&self, description: &str) -> Result<()> {
        let outcome = self.listener.wait_for_settled().await;
        debug!(?outcome, description, "step settled");
        if self.listener.has_errors() {
            bail!(
                "backend error during {description}: {}",
                self.listener.last_message()
            );
        }
        Ok(())
    }

    /// Tear down the listener subscription and the browser.
    pub async fn shutdown(self) {
        self.listener.shutdown();
        self.chromium.shutdown().await;
        info!(run_id = %self.run_id, "harness shut down");
    }
}
