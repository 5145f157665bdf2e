//! Backend-failure capture racing the test driver.
//!
//! UI steps run synchronously while the backend fails asynchronously; the
//! listener latches every 4xx/5xx response it observes on the page's
//! network stream and offers a one-shot "a response settled" signal so a
//! step can wait for *some* backend reaction without hanging on steps that
//! trigger no traffic at all.

pub mod config;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use crate::config::ListenerConfig;
use page_driver::{PageDriver, ResponseEvent};

/// How a [`ResponseErrorListener::wait_for_settled`] call resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettleOutcome {
    /// At least one response has been observed since the last reset.
    Response,
    /// The step produced no observable traffic inside the grace window.
    GraceElapsed,
    /// The race primitive itself overran the hard backstop.
    Backstop,
}

/// Observable lifecycle of the listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerPhase {
    Idle,
    Armed,
    Settled,
}

/// Latched error state plus the replaceable settle signal.
///
/// The signal is re-armed by swapping in a fresh `Notify`, never by
/// mutating the old one; a handler still holding the previous signal can
/// then resolve it twice without racing the next step.
struct Latch {
    has_error: AtomicBool,
    settled: AtomicBool,
    last_message: Mutex<String>,
    settle: Mutex<Arc<Notify>>,
}

impl Latch {
    fn new() -> Self {
        Self {
            has_error: AtomicBool::new(false),
            settled: AtomicBool::new(false),
            last_message: Mutex::new(String::new()),
            settle: Mutex::new(Arc::new(Notify::new())),
        }
    }

    fn observe(&self, event: &ResponseEvent) {
        if event.is_error() {
            let mut message = format!("HTTP {} on {}", event.status, event.url);
            if let Some(body) = &event.body_excerpt {
                message.push_str(": ");
                message.push_str(body);
            }
            warn!(target: "response-watch", %message, "backend error response");
            self.has_error.store(true, Ordering::SeqCst);
            *self.last_message.lock() = message;
        }
        // Every response settles the wait, success included; otherwise a
        // step whose only traffic succeeded would block until the grace
        // window on a signal that can never re-arm.
        self.settled.store(true, Ordering::SeqCst);
        let signal = self.settle.lock().clone();
        signal.notify_one();
    }

    fn reset(&self) {
        self.has_error.store(false, Ordering::SeqCst);
        self.settled.store(false, Ordering::SeqCst);
        self.last_message.lock().clear();
        *self.settle.lock() = Arc::new(Notify::new());
    }
}

/// Latches backend failures observed during UI interactions.
///
/// Subscribe once per test session with [`recognize_errors`]; reset at step
/// boundaries with [`reset`]. The error flag reflects *every* response
/// since the last reset, while [`wait_for_settled`] only guarantees that
/// the *first* response (or the grace window) has passed; callers that
/// must correlate a specific request inspect [`last_message`].
///
/// [`recognize_errors`]: ResponseErrorListener::recognize_errors
/// [`reset`]: ResponseErrorListener::reset
/// [`wait_for_settled`]: ResponseErrorListener::wait_for_settled
/// [`last_message`]: ResponseErrorListener::last_message
pub struct ResponseErrorListener {
    latch: Arc<Latch>,
    config: ListenerConfig,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Default for ResponseErrorListener {
    fn default() -> Self {
        Self::new(ListenerConfig::default())
    }
}

impl ResponseErrorListener {
    pub fn new(config: ListenerConfig) -> Self {
        Self {
            latch: Arc::new(Latch::new()),
            config,
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    /// Attach the response handler to the page's stream. Established once
    /// per session; repeated calls are ignored.
    pub fn recognize_errors(&self, driver: &dyn PageDriver) {
        let mut slot = self.task.lock();
        if slot.is_some() {
            debug!(target: "response-watch", "already subscribed");
            return;
        }

        let latch = Arc::clone(&self.latch);
        let cancel = self.cancel.clone();
        let mut responses = driver.responses();
        *slot = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = responses.recv() => match received {
                        Ok(event) => latch.observe(&event),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(
                                target: "response-watch",
                                missed,
                                "response stream lagged; diagnostics may be incomplete"
                            );
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        }));
    }

    /// Race the one-shot settle signal against the grace window, all inside
    /// the hard backstop. Never hangs: a step with zero network traffic
    /// resolves as [`SettleOutcome::GraceElapsed`] after the grace window.
    pub async fn wait_for_settled(&self) -> SettleOutcome {
        let signal = self.latch.settle.lock().clone();
        let grace = Duration::from_millis(self.config.grace_window_ms);
        let backstop = Duration::from_millis(self.config.settle_timeout_ms);

        let race = async {
            tokio::select! {
                _ = signal.notified() => SettleOutcome::Response,
                _ = tokio::time::sleep(grace) => {
                    debug!(
                        target: "response-watch",
                        grace_ms = self.config.grace_window_ms,
                        "no response inside grace window; treating step as settled"
                    );
                    SettleOutcome::GraceElapsed
                }
            }
        };

        match tokio::time::timeout(backstop, race).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(target: "response-watch", "settle race overran the hard backstop");
                SettleOutcome::Backstop
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        self.latch.has_error.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> String {
        self.latch.last_message.lock().clone()
    }

    pub fn phase(&self) -> ListenerPhase {
        if self.task.lock().is_none() {
            ListenerPhase::Idle
        } else if self.latch.settled.load(Ordering::SeqCst) {
            ListenerPhase::Settled
        } else {
            ListenerPhase::Armed
        }
    }

    /// Clear the latch and re-arm the settle signal for the next step.
    /// Safe to call even when a previous wait never settled.
    pub fn reset(&self) {
        self.latch.reset();
    }

    /// Detach the handler. The listener is unusable afterwards.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

impl Drop for ResponseErrorListener {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_clean() {
        let listener = ResponseErrorListener::default();
        assert_eq!(listener.phase(), ListenerPhase::Idle);
        assert!(!listener.has_errors());
        assert!(listener.last_message().is_empty());
    }

    #[test]
    fn reset_clears_latched_state() {
        let listener = ResponseErrorListener::default();
        listener.latch.observe(&ResponseEvent::new("https://app/api/x", 500));
        assert!(listener.has_errors());

        listener.reset();
        assert!(!listener.has_errors());
        assert!(listener.last_message().is_empty());
    }

    #[test]
    fn message_carries_status_url_and_body() {
        let listener = ResponseErrorListener::default();
        listener.latch.observe(
            &ResponseEvent::new("https://app/api/shifts/9", 404).with_body("shift not found"),
        );
        let message = listener.last_message();
        assert!(message.contains("404"));
        assert!(message.contains("https://app/api/shifts/9"));
        assert!(message.contains("shift not found"));
    }
}
