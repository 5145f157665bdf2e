//! Bridge error types.

use thiserror::Error;

use page_driver::DriverError;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Every strategy was unavailable or failed for a mutating operation.
    #[error("no grid access strategy could perform {operation}")]
    StrategiesExhausted { operation: &'static str },

    /// Typing was requested while no inline editor is open. The active
    /// cell most likely edits through a dialog; that is scenario-level
    /// territory, not a bridge fallback.
    #[error("no active cell editor (dialog-based cell?)")]
    NoActiveEditor,

    #[error(transparent)]
    Driver(#[from] DriverError),
}
