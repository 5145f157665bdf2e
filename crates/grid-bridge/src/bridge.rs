//! One coherent cell contract over three access fidelities.
//!
//! Every operation walks the strategy chain in fixed priority order
//! (script api, then ghost overlay, then pointer arithmetic), re-probing
//! availability each time and short-circuiting on the first success. Reads surface
//! absence as `None`/empty and absorb strategy faults; mutations report the
//! strategy that carried them and fail only when the whole chain is
//! exhausted.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use page_driver::PageDriver;
use ui_wait::{ElementLocator, StabilityWaiter, WaitConfig};

use crate::error::BridgeError;
use crate::ghost::GhostOverlayStrategy;
use crate::input::{self, ActiveCellInput};
use crate::model::{CellPosition, GridCellInfo};
use crate::pointer::{GridGeometry, PointerStrategy, CANVAS_SELECTOR};
use crate::script_api::ScriptApiStrategy;
use crate::strategy::{GridAccess, GridStrategy, StrategyError};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub geometry: GridGeometry,
    /// Retry budget for the inline editor after `start_edit`.
    pub input_retry_attempts: u32,
    pub input_retry_delay_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            geometry: GridGeometry::default(),
            input_retry_attempts: 10,
            input_retry_delay_ms: 100,
        }
    }
}

pub struct CanvasGridBridge {
    driver: Arc<dyn PageDriver>,
    waiter: StabilityWaiter,
    locator: ElementLocator,
    script: ScriptApiStrategy,
    ghost: GhostOverlayStrategy,
    pointer: PointerStrategy,
    /// Mirror of the last selection this bridge performed; the observation
    /// channel of last resort when only the pointer strategy is available.
    last_selected: Mutex<Option<CellPosition>>,
    config: BridgeConfig,
}

impl CanvasGridBridge {
    pub fn new(driver: Arc<dyn PageDriver>, wait: WaitConfig, config: BridgeConfig) -> Self {
        Self {
            waiter: StabilityWaiter::new(Arc::clone(&driver), wait.clone()),
            locator: ElementLocator::new(Arc::clone(&driver), wait),
            script: ScriptApiStrategy::new(Arc::clone(&driver)),
            ghost: GhostOverlayStrategy::new(Arc::clone(&driver)),
            pointer: PointerStrategy::new(Arc::clone(&driver), config.geometry),
            last_selected: Mutex::new(None),
            config,
            driver,
        }
    }

    /// Runtime probe: has the app published its injected scripting object?
    pub async fn is_script_api_available(&self) -> bool {
        self.script.is_available().await
    }

    /// Runtime probe: is the test-mode ghost overlay rendered?
    pub async fn has_ghost_overlay(&self) -> bool {
        self.ghost.is_available().await
    }

    fn strategies(&self) -> [&dyn GridAccess; 3] {
        [&self.script, &self.ghost, &self.pointer]
    }

    /// Reads stop at the overlay: coordinates cannot answer semantic
    /// queries.
    fn read_strategies(&self) -> [&dyn GridAccess; 2] {
        [&self.script, &self.ghost]
    }

    /// Soft pre-interaction gate: spinner gone, canvas stable. Timeouts
    /// are logged, not fatal; the interaction itself will tell.
    async fn stabilize(&self) {
        let spinner_budget =
            Duration::from_millis(self.waiter.config().spinner_timeout_ms);
        self.waiter.wait_for_spinner_gone(spinner_budget).await;
        if !self
            .waiter
            .wait_for_element_stable(CANVAS_SELECTOR)
            .await
            .is_satisfied()
        {
            warn!(target: "grid-bridge", "canvas never stabilized; interacting anyway");
        }
    }

    /// Drop duplicate `(row, column)` records and enforce policy flags.
    fn sanitize(cells: Vec<GridCellInfo>) -> Vec<GridCellInfo> {
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::with_capacity(cells.len());
        for cell in cells {
            let position = cell.position();
            if !seen.insert(position) {
                warn!(
                    target: "grid-bridge",
                    row = position.row,
                    column = position.column,
                    "duplicate cell record dropped"
                );
                continue;
            }
            result.push(cell.normalized());
        }
        result
    }

    /// Snapshot of every currently rendered cell. Empty when no
    /// read-capable strategy is available; absence of instrumentation is
    /// an expected environment, not an error.
    pub async fn get_all_cells(&self) -> Vec<GridCellInfo> {
        for strategy in self.read_strategies() {
            if !strategy.is_available().await {
                continue;
            }
            match strategy.all_cells().await {
                Ok(cells) => return Self::sanitize(cells),
                Err(StrategyError::Unsupported) => continue,
                Err(StrategyError::Failed(reason)) => {
                    warn!(target: "grid-bridge", strategy = %strategy.kind(), reason, "read failed");
                }
            }
        }
        debug!(target: "grid-bridge", "no read-capable grid strategy available");
        Vec::new()
    }

    pub async fn get_cell_at(&self, row: u32, column: u32) -> Option<GridCellInfo> {
        for strategy in self.read_strategies() {
            if !strategy.is_available().await {
                continue;
            }
            match strategy.cell_at(row, column).await {
                Ok(cell) => return cell.map(GridCellInfo::normalized),
                Err(StrategyError::Unsupported) => continue,
                Err(StrategyError::Failed(reason)) => {
                    warn!(target: "grid-bridge", strategy = %strategy.kind(), reason, "read failed");
                }
            }
        }
        None
    }

    pub async fn find_cell_by_value(&self, value: &str) -> Option<GridCellInfo> {
        if self.script.is_available().await {
            match self.script.cell_by_value(value).await {
                Ok(cell) => return cell.map(GridCellInfo::normalized),
                Err(StrategyError::Unsupported) => {}
                Err(StrategyError::Failed(reason)) => {
                    warn!(target: "grid-bridge", reason, "script finder failed; filtering snapshot");
                }
            }
        }
        self.get_all_cells()
            .await
            .into_iter()
            .find(|cell| cell.value == value)
    }

    pub async fn find_cells_by_client(&self, client_id: &str) -> Vec<GridCellInfo> {
        if self.script.is_available().await {
            match self.script.cells_by_client(client_id).await {
                Ok(cells) => return Self::sanitize(cells),
                Err(StrategyError::Unsupported) => {}
                Err(StrategyError::Failed(reason)) => {
                    warn!(target: "grid-bridge", reason, "script finder failed; filtering snapshot");
                }
            }
        }
        self.get_all_cells()
            .await
            .into_iter()
            .filter(|cell| cell.client_id.as_deref() == Some(client_id))
            .collect()
    }

    pub async fn find_cell_by_client_and_date(
        &self,
        client_id: &str,
        date: chrono::NaiveDate,
    ) -> Option<GridCellInfo> {
        if self.script.is_available().await {
            match self.script.cell_by_client_and_date(client_id, date).await {
                Ok(cell) => return cell.map(GridCellInfo::normalized),
                Err(StrategyError::Unsupported) => {}
                Err(StrategyError::Failed(reason)) => {
                    warn!(target: "grid-bridge", reason, "script finder failed; filtering snapshot");
                }
            }
        }
        self.get_all_cells()
            .await
            .into_iter()
            .find(|cell| cell.client_id.as_deref() == Some(client_id) && cell.date == Some(date))
    }

    /// The current selection, from the best strategy that can answer; the
    /// bridge's own selection mirror is the fallback of last resort.
    pub async fn get_selected_cell(&self) -> Option<CellPosition> {
        for strategy in self.strategies() {
            if !strategy.is_available().await {
                continue;
            }
            match strategy.selected_cell().await {
                Ok(selection) => return selection,
                Err(StrategyError::Unsupported) => continue,
                Err(StrategyError::Failed(reason)) => {
                    warn!(target: "grid-bridge", strategy = %strategy.kind(), reason, "selection query failed");
                }
            }
        }
        *self.last_selected.lock()
    }

    pub async fn get_editing_cell(&self) -> Option<CellPosition> {
        for strategy in self.strategies() {
            if !strategy.is_available().await {
                continue;
            }
            match strategy.editing_cell().await {
                Ok(editing) => return editing,
                Err(StrategyError::Unsupported) => continue,
                Err(StrategyError::Failed(reason)) => {
                    warn!(target: "grid-bridge", strategy = %strategy.kind(), reason, "editing query failed");
                }
            }
        }
        // The inline editor node betrays the editing cell even with no
        // instrumentation rendered at all.
        input::editing_position(&self.driver).await
    }

    /// Select a cell via the first strategy that can. Returns the strategy
    /// that carried the interaction.
    pub async fn select_cell(&self, row: u32, column: u32) -> Result<GridStrategy, BridgeError> {
        self.stabilize().await;
        for strategy in self.strategies() {
            if !strategy.is_available().await {
                debug!(target: "grid-bridge", strategy = %strategy.kind(), "select: unavailable");
                continue;
            }
            match strategy.select_cell(row, column).await {
                Ok(()) => {
                    info!(target: "grid-bridge", strategy = %strategy.kind(), row, column, "cell selected");
                    *self.last_selected.lock() = Some(CellPosition { row, column });
                    return Ok(strategy.kind());
                }
                Err(StrategyError::Unsupported) => continue,
                Err(StrategyError::Failed(reason)) => {
                    warn!(
                        target: "grid-bridge",
                        strategy = %strategy.kind(),
                        reason,
                        "select failed; falling back"
                    );
                }
            }
        }
        Err(BridgeError::StrategiesExhausted {
            operation: "select_cell",
        })
    }

    /// Open an edit session on a cell. For dialog-based cells this still
    /// succeeds; the dialog simply opens instead of an inline editor, and
    /// [`active_cell_input`](Self::active_cell_input) reports `None`.
    pub async fn start_edit(&self, row: u32, column: u32) -> Result<GridStrategy, BridgeError> {
        self.stabilize().await;
        for strategy in self.strategies() {
            if !strategy.is_available().await {
                debug!(target: "grid-bridge", strategy = %strategy.kind(), "edit: unavailable");
                continue;
            }
            match strategy.start_edit(row, column).await {
                Ok(()) => {
                    info!(target: "grid-bridge", strategy = %strategy.kind(), row, column, "edit session opened");
                    *self.last_selected.lock() = Some(CellPosition { row, column });
                    return Ok(strategy.kind());
                }
                Err(StrategyError::Unsupported) => continue,
                Err(StrategyError::Failed(reason)) => {
                    warn!(
                        target: "grid-bridge",
                        strategy = %strategy.kind(),
                        reason,
                        "start_edit failed; falling back"
                    );
                }
            }
        }
        Err(BridgeError::StrategiesExhausted {
            operation: "start_edit",
        })
    }

    /// Bring a row into view. The pointer fallback scrolls by assumed row
    /// heights and is explicitly approximate.
    pub async fn scroll_to_row(&self, row: u32) -> Result<GridStrategy, BridgeError> {
        self.stabilize().await;
        for strategy in self.strategies() {
            if !strategy.is_available().await {
                continue;
            }
            match strategy.scroll_to_row(row).await {
                Ok(()) => {
                    info!(target: "grid-bridge", strategy = %strategy.kind(), row, "scrolled");
                    return Ok(strategy.kind());
                }
                Err(StrategyError::Unsupported) => continue,
                Err(StrategyError::Failed(reason)) => {
                    warn!(target: "grid-bridge", strategy = %strategy.kind(), reason, "scroll failed");
                }
            }
        }
        Err(BridgeError::StrategiesExhausted {
            operation: "scroll_to_row",
        })
    }

    /// The inline editor over the active cell, after a bounded retry.
    /// `None` means the cell edits through a dialog (or no edit session is
    /// open); an expected branch for scenario code, never an error here.
    pub async fn active_cell_input(&self) -> Option<ActiveCellInput> {
        input::resolve(
            &self.driver,
            &self.locator,
            self.config.input_retry_attempts,
            Duration::from_millis(self.config.input_retry_delay_ms),
        )
        .await
    }

    /// Type into the inline editor. Calling this without an open inline
    /// edit session is a programming error and the one condition the
    /// bridge refuses loudly.
    pub async fn type_in_active_cell(&self, text: &str) -> Result<(), BridgeError> {
        let editor = self
            .active_cell_input()
            .await
            .ok_or(BridgeError::NoActiveEditor)?;
        editor.type_text(text).await?;
        Ok(())
    }

    /// Close the inline edit session with `key` ("Enter", "Escape", ...).
    pub async fn confirm_active_cell(&self, key: &str) -> Result<(), BridgeError> {
        let editor = self
            .active_cell_input()
            .await
            .ok_or(BridgeError::NoActiveEditor)?;
        editor.press_key(key).await?;
        Ok(())
    }
}
