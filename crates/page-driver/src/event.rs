//! Network response events republished by the driver.

use serde::{Deserialize, Serialize};

/// One observed HTTP response on the page.
///
/// The driver publishes these for every response on the page's network
/// stream, in arrival order, for the lifetime of the page. The body excerpt
/// is captured best-effort and only for error statuses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseEvent {
    pub url: String,
    pub status: u16,
    pub body_excerpt: Option<String>,
}

impl ResponseEvent {
    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status,
            body_excerpt: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body_excerpt = Some(body.into());
        self
    }

    /// Backend failure classification: every status in `[400, 600)`.
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.status)
    }
}
