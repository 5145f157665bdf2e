//! Wait budgets. All values are milliseconds.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaitConfig {
    pub attach_timeout_ms: u64,
    pub visible_timeout_ms: u64,
    pub spinner_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Fixed settle delay appended by `wait_for_element_stable`.
    pub settle_delay_ms: u64,
    pub network_quiet_ms: u64,
    pub network_idle_timeout_ms: u64,
    /// The app's global loading indicator. Styling detail, not a contract,
    /// hence configurable.
    pub spinner_selector: String,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            attach_timeout_ms: 10_000,
            visible_timeout_ms: 10_000,
            spinner_timeout_ms: 15_000,
            poll_interval_ms: 100,
            settle_delay_ms: 300,
            network_quiet_ms: 500,
            network_idle_timeout_ms: 10_000,
            spinner_selector: "#loading-indicator".to_string(),
        }
    }
}
