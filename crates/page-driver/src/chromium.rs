//! Production [`PageDriver`] backed by chromiumoxide.
//!
//! One browser process, one page. The CDP handler stream and the network
//! event pump each run on their own task and are torn down through a shared
//! [`CancellationToken`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
    EventResponseReceived, GetResponseBodyParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::driver::{BoundingBox, PageDriver};
use crate::util::{js_string, truncate_excerpt};
use crate::{DriverConfig, DriverError, ResponseEvent};

const IDLE_POLL: Duration = Duration::from_millis(50);
const BODY_EXCERPT_MAX: usize = 512;

/// Inflight request bookkeeping behind `wait_for_network_idle`.
#[derive(Debug)]
struct NetActivity {
    inflight: AtomicU64,
    last_activity: Mutex<Instant>,
}

impl NetActivity {
    fn new() -> Self {
        Self {
            inflight: AtomicU64::new(0),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    fn begin(&self) {
        self.inflight.fetch_add(1, Ordering::SeqCst);
        self.touch();
    }

    fn end(&self) {
        let _ = self
            .inflight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1));
        self.touch();
    }

    fn is_quiet(&self, quiet: Duration) -> bool {
        self.inflight.load(Ordering::SeqCst) == 0 && self.last_activity.lock().elapsed() >= quiet
    }
}

pub struct ChromiumDriver {
    page: Page,
    browser: AsyncMutex<Browser>,
    events: broadcast::Sender<ResponseEvent>,
    net: Arc<NetActivity>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    _profile_dir: tempfile::TempDir,
}

impl ChromiumDriver {
    /// Launch a Chromium instance with a throwaway profile and open the
    /// single page this driver owns.
    pub async fn launch(config: DriverConfig) -> Result<Self, DriverError> {
        let profile_dir =
            tempfile::tempdir().map_err(|err| DriverError::Internal(err.to_string()))?;

        let mut builder = BrowserConfig::builder()
            .window_size(config.window_width, config.window_height)
            .user_data_dir(profile_dir.path());
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }
        let browser_config = builder.build().map_err(DriverError::Internal)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|err| DriverError::Io(err.to_string()))?;

        let cancel = CancellationToken::new();
        let handler_cancel = cancel.clone();
        let handler_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = handler_cancel.cancelled() => break,
                    item = handler.next() => match item {
                        Some(Ok(())) => {}
                        Some(Err(err)) => {
                            warn!(target: "page-driver", %err, "cdp handler error");
                        }
                        None => break,
                    },
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|err| DriverError::Io(err.to_string()))?;
        page.execute(EnableParams::default())
            .await
            .map_err(|err| DriverError::Io(err.to_string()))?;

        let (events, _) = broadcast::channel(config.event_buffer.max(16));
        let net = Arc::new(NetActivity::new());
        let pump_task = tokio::spawn(pump_network(
            page.clone(),
            events.clone(),
            Arc::clone(&net),
            cancel.clone(),
        ));

        Ok(Self {
            page,
            browser: AsyncMutex::new(browser),
            events,
            net,
            cancel,
            tasks: Mutex::new(vec![handler_task, pump_task]),
            _profile_dir: profile_dir,
        })
    }

    /// Stop the event pumps and close the browser process.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        let mut browser = self.browser.lock().await;
        if let Err(err) = browser.close().await {
            warn!(target: "page-driver", %err, "browser close failed");
        }
        let _ = browser.wait().await;
    }

    async fn element(&self, selector: &str) -> Result<Element, DriverError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|_| DriverError::NotFound(selector.to_string()))
    }

    async fn dispatch_mouse(
        &self,
        kind: DispatchMouseEventType,
        x: f64,
        y: f64,
        button: Option<MouseButton>,
        click_count: i64,
    ) -> Result<(), DriverError> {
        let mut builder = DispatchMouseEventParams::builder().r#type(kind).x(x).y(y);
        if let Some(button) = button {
            builder = builder.button(button).click_count(click_count);
        }
        let params = builder.build().map_err(DriverError::Internal)?;
        self.page
            .execute(params)
            .await
            .map_err(|err| DriverError::Io(err.to_string()))?;
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError> {
        debug!(target: "page-driver", url, "navigating");
        let navigation = async {
            self.page
                .goto(url)
                .await
                .map_err(|err| DriverError::Io(err.to_string()))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|err| DriverError::Io(err.to_string()))?;
            Ok(())
        };
        match tokio::time::timeout(timeout, navigation).await {
            Ok(result) => result,
            Err(_) => Err(DriverError::NavTimeout(format!(
                "{url} did not finish loading within {timeout:?}"
            ))),
        }
    }

    async fn exists(&self, selector: &str) -> Result<bool, DriverError> {
        let expression = format!(
            "document.querySelector({}) !== null",
            js_string(selector)
        );
        Ok(self.evaluate(&expression).await?.as_bool().unwrap_or(false))
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, DriverError> {
        let expression = format!(
            "(() => {{ \
               const el = document.querySelector({sel}); \
               if (!el) return false; \
               const style = window.getComputedStyle(el); \
               if (style.display === 'none' || style.visibility === 'hidden') return false; \
               const rect = el.getBoundingClientRect(); \
               return rect.width > 0 && rect.height > 0; \
             }})()",
            sel = js_string(selector)
        );
        Ok(self.evaluate(&expression).await?.as_bool().unwrap_or(false))
    }

    async fn inner_text(&self, selector: &str) -> Result<Option<String>, DriverError> {
        match self.element(selector).await {
            Ok(element) => element
                .inner_text()
                .await
                .map_err(|err| DriverError::Io(err.to_string())),
            Err(_) => Ok(None),
        }
    }

    async fn attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        match self.element(selector).await {
            Ok(element) => element
                .attribute(name)
                .await
                .map_err(|err| DriverError::Io(err.to_string())),
            Err(_) => Ok(None),
        }
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        self.element(selector)
            .await?
            .click()
            .await
            .map_err(|err| DriverError::Io(err.to_string()))?;
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        let element = self.element(selector).await?;
        element
            .click()
            .await
            .map_err(|err| DriverError::Io(err.to_string()))?;
        element
            .type_str(text)
            .await
            .map_err(|err| DriverError::Io(err.to_string()))?;
        Ok(())
    }

    async fn press_key(&self, selector: &str, key: &str) -> Result<(), DriverError> {
        self.element(selector)
            .await?
            .press_key(key)
            .await
            .map_err(|err| DriverError::Io(err.to_string()))?;
        Ok(())
    }

    async fn bounding_box(&self, selector: &str) -> Result<Option<BoundingBox>, DriverError> {
        let expression = format!(
            "(() => {{ \
               const el = document.querySelector({sel}); \
               if (!el) return null; \
               const rect = el.getBoundingClientRect(); \
               return {{ x: rect.x, y: rect.y, width: rect.width, height: rect.height }}; \
             }})()",
            sel = js_string(selector)
        );
        let value = self.evaluate(&expression).await?;
        serde_json::from_value(value).map_err(|err| DriverError::Eval(err.to_string()))
    }

    async fn mouse_click(&self, x: f64, y: f64, clicks: u8) -> Result<(), DriverError> {
        self.dispatch_mouse(DispatchMouseEventType::MouseMoved, x, y, None, 0)
            .await?;
        for count in 1..=i64::from(clicks.max(1)) {
            self.dispatch_mouse(
                DispatchMouseEventType::MousePressed,
                x,
                y,
                Some(MouseButton::Left),
                count,
            )
            .await?;
            self.dispatch_mouse(
                DispatchMouseEventType::MouseReleased,
                x,
                y,
                Some(MouseButton::Left),
                count,
            )
            .await?;
        }
        Ok(())
    }

    async fn mouse_wheel(&self, x: f64, y: f64, delta_y: f64) -> Result<(), DriverError> {
        let params = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseWheel)
            .x(x)
            .y(y)
            .delta_x(0.0)
            .delta_y(delta_y)
            .build()
            .map_err(DriverError::Internal)?;
        self.page
            .execute(params)
            .await
            .map_err(|err| DriverError::Io(err.to_string()))?;
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, DriverError> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|err| DriverError::Eval(err.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn wait_for_network_idle(
        &self,
        quiet: Duration,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.net.is_quiet(quiet) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout(format!(
                    "network not idle within {timeout:?}"
                )));
            }
            tokio::time::sleep(IDLE_POLL).await;
        }
    }

    fn responses(&self) -> broadcast::Receiver<ResponseEvent> {
        self.events.subscribe()
    }
}

/// Republish the page's network lifecycle onto the driver's broadcast
/// channel and keep the inflight counters current.
async fn pump_network(
    page: Page,
    events: broadcast::Sender<ResponseEvent>,
    net: Arc<NetActivity>,
    cancel: CancellationToken,
) {
    let mut requests = match page.event_listener::<EventRequestWillBeSent>().await {
        Ok(stream) => stream,
        Err(err) => {
            warn!(target: "page-driver", %err, "request event subscription failed");
            return;
        }
    };
    let mut responses = match page.event_listener::<EventResponseReceived>().await {
        Ok(stream) => stream,
        Err(err) => {
            warn!(target: "page-driver", %err, "response event subscription failed");
            return;
        }
    };
    let mut finished = match page.event_listener::<EventLoadingFinished>().await {
        Ok(stream) => stream,
        Err(err) => {
            warn!(target: "page-driver", %err, "loading-finished subscription failed");
            return;
        }
    };
    let mut failed = match page.event_listener::<EventLoadingFailed>().await {
        Ok(stream) => stream,
        Err(err) => {
            warn!(target: "page-driver", %err, "loading-failed subscription failed");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = requests.next() => match event {
                Some(_) => net.begin(),
                None => break,
            },
            event = responses.next() => match event {
                Some(event) => {
                    let status = u16::try_from(event.response.status).unwrap_or(0);
                    let mut response = ResponseEvent::new(event.response.url.clone(), status);
                    if response.is_error() {
                        // Body fetch is best-effort: it races loadingFinished
                        // and legitimately fails for streamed responses.
                        match page
                            .execute(GetResponseBodyParams::new(event.request_id.clone()))
                            .await
                        {
                            Ok(body) if !body.result.base64_encoded => {
                                response = response.with_body(truncate_excerpt(
                                    &body.result.body,
                                    BODY_EXCERPT_MAX,
                                ));
                            }
                            Ok(_) => {
                                trace!(target: "page-driver", "binary error body skipped");
                            }
                            Err(err) => {
                                trace!(target: "page-driver", %err, "response body unavailable");
                            }
                        }
                    }
                    net.touch();
                    if events.send(response).is_err() {
                        trace!(target: "page-driver", "no response subscribers");
                    }
                }
                None => break,
            },
            event = finished.next() => match event {
                Some(_) => net.end(),
                None => break,
            },
            event = failed.next() => match event {
                Some(_) => net.end(),
                None => break,
            },
        }
    }
}
