//! The transient inline cell editor.
//!
//! While an inline edit session is open the grid positions exactly one DOM
//! input over the active cell. Cells that edit through a modal dialog never
//! produce it; that case is reported as absence, not failure, and handled
//! by scenario code.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use page_driver::{DriverError, PageDriver};
use ui_wait::{ElementHandle, ElementLocator};

use crate::model::CellPosition;

/// The single inline editor node, present only during an edit session.
pub const CELL_INPUT_SELECTOR: &str = "[data-testid=\"cell-input\"]";

/// A resolved inline editor.
pub struct ActiveCellInput {
    handle: ElementHandle,
    /// Which cell the editor is positioned over, when the node carries
    /// parsable `data-row`/`data-column` attributes.
    pub position: Option<CellPosition>,
}

impl ActiveCellInput {
    pub async fn type_text(&self, text: &str) -> Result<(), DriverError> {
        self.handle.fill(text).await
    }

    pub async fn press_key(&self, key: &str) -> Result<(), DriverError> {
        self.handle.press_key(key).await
    }

    pub async fn value(&self) -> Result<Option<String>, DriverError> {
        self.handle.attribute("value").await
    }
}

/// Single probe for the editor node's cell position.
pub(crate) async fn editing_position(driver: &Arc<dyn PageDriver>) -> Option<CellPosition> {
    if !driver.exists(CELL_INPUT_SELECTOR).await.unwrap_or(false) {
        return None;
    }
    let row = driver
        .attribute(CELL_INPUT_SELECTOR, "data-row")
        .await
        .ok()
        .flatten()
        .and_then(|raw| raw.parse().ok());
    let column = driver
        .attribute(CELL_INPUT_SELECTOR, "data-column")
        .await
        .ok()
        .flatten()
        .and_then(|raw| raw.parse().ok());
    match (row, column) {
        (Some(row), Some(column)) => Some(CellPosition { row, column }),
        _ => {
            debug!(target: "grid-bridge", "cell-input present without parsable position");
            None
        }
    }
}

/// Bounded retry for the inline editor. `None` after the retry budget
/// means "this cell edits differently", not "the page is broken".
pub(crate) async fn resolve(
    driver: &Arc<dyn PageDriver>,
    locator: &ElementLocator,
    attempts: u32,
    delay: Duration,
) -> Option<ActiveCellInput> {
    for attempt in 0..attempts.max(1) {
        if driver.exists(CELL_INPUT_SELECTOR).await.unwrap_or(false) {
            let handle = locator.find_by_css(CELL_INPUT_SELECTOR).await?;
            let position = editing_position(driver).await;
            return Some(ActiveCellInput { handle, position });
        }
        if attempt + 1 < attempts {
            tokio::time::sleep(delay).await;
        }
    }
    debug!(target: "grid-bridge", "no inline editor appeared; dialog-based cell?");
    None
}
