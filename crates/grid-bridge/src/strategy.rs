//! The strategy seam: one capability-checked interface, three fidelities.

use async_trait::async_trait;

use page_driver::DriverError;

use crate::model::{CellPosition, GridCellInfo};

/// The three access channels, in falling order of reliability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridStrategy {
    /// The application's injected scripting object. Structured and
    /// authoritative when present.
    ScriptApi,
    /// Invisible test-mode DOM mirror of the rendered cells.
    GhostOverlay,
    /// Raw pointer arithmetic against the canvas bounding box.
    /// Mutation-only and explicitly approximate.
    Pointer,
}

impl GridStrategy {
    pub const fn name(self) -> &'static str {
        match self {
            GridStrategy::ScriptApi => "script-api",
            GridStrategy::GhostOverlay => "ghost-overlay",
            GridStrategy::Pointer => "pointer",
        }
    }
}

impl std::fmt::Display for GridStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a strategy did not produce a result.
#[derive(Debug)]
pub(crate) enum StrategyError {
    /// The operation is not expressible at this fidelity; fall through
    /// silently.
    Unsupported,
    /// The strategy attempted the operation and failed; log and fall
    /// through.
    Failed(String),
}

impl From<DriverError> for StrategyError {
    fn from(err: DriverError) -> Self {
        StrategyError::Failed(err.to_string())
    }
}

/// One access channel. Availability is re-probed on every bridge call:
/// the page can flip between test-mode and production rendering across
/// navigations, so caching capability would poison the chain.
#[async_trait]
pub(crate) trait GridAccess: Send + Sync {
    fn kind(&self) -> GridStrategy;

    async fn is_available(&self) -> bool;

    async fn all_cells(&self) -> Result<Vec<GridCellInfo>, StrategyError>;

    async fn cell_at(&self, row: u32, column: u32)
        -> Result<Option<GridCellInfo>, StrategyError>;

    async fn selected_cell(&self) -> Result<Option<CellPosition>, StrategyError>;

    async fn editing_cell(&self) -> Result<Option<CellPosition>, StrategyError>;

    async fn select_cell(&self, row: u32, column: u32) -> Result<(), StrategyError>;

    async fn start_edit(&self, row: u32, column: u32) -> Result<(), StrategyError>;

    async fn scroll_to_row(&self, row: u32) -> Result<(), StrategyError>;
}
