//! Configuration for the Chromium driver.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverConfig {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Explicit Chromium binary; `None` lets chromiumoxide discover one.
    pub executable: Option<PathBuf>,
    pub nav_timeout_ms: u64,
    /// Capacity of the response broadcast channel.
    pub event_buffer: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1600,
            window_height: 900,
            executable: None,
            nav_timeout_ms: 30_000,
            event_buffer: 256,
        }
    }
}
