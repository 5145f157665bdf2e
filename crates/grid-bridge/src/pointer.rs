//! Strategy 3: raw pointer arithmetic against the canvas.
//!
//! The last resort when the app exposes neither test hooks nor an overlay:
//! compute where a cell *should* be from assumed fixed cell sizes plus the
//! tracked scroll offsets, and dispatch pointer events at that point.
//! Best-effort by construction: the geometry is an assumption, not a
//! measurement, and read operations are out of reach entirely.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use page_driver::PageDriver;

use crate::model::{CellPosition, GridCellInfo};
use crate::strategy::{GridAccess, GridStrategy, StrategyError};

/// The rendering surface, addressed by its id prefix.
pub const CANVAS_SELECTOR: &str = "canvas[id^=\"template-canvas\"]";

/// Assumed pixel sizes of the rendered grid.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GridGeometry {
    pub cell_width: f64,
    pub cell_height: f64,
    pub header_height: f64,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            cell_width: 160.0,
            cell_height: 28.0,
            header_height: 32.0,
        }
    }
}

/// Scroll offsets accumulated by this strategy's own scrolling. The canvas
/// reports nothing back, so this mirror is the only offset source the
/// coordinate math has.
#[derive(Debug, Default)]
pub(crate) struct ScrollTracker {
    offsets: Mutex<(f64, f64)>,
}

impl ScrollTracker {
    fn get(&self) -> (f64, f64) {
        *self.offsets.lock()
    }

    fn set_vertical(&self, y: f64) {
        self.offsets.lock().1 = y.max(0.0);
    }
}

pub struct PointerStrategy {
    driver: Arc<dyn PageDriver>,
    geometry: GridGeometry,
    scroll: ScrollTracker,
}

impl PointerStrategy {
    pub fn new(driver: Arc<dyn PageDriver>, geometry: GridGeometry) -> Self {
        Self {
            driver,
            geometry,
            scroll: ScrollTracker::default(),
        }
    }

    /// Viewport target for a cell, or `Failed` when the cell falls outside
    /// the currently visible canvas area.
    async fn cell_point(&self, row: u32, column: u32) -> Result<(f64, f64), StrategyError> {
        let bbox = self
            .driver
            .bounding_box(CANVAS_SELECTOR)
            .await?
            .ok_or_else(|| StrategyError::Failed("canvas has no bounding box".to_string()))?;
        let (scroll_x, scroll_y) = self.scroll.get();

        let x = bbox.x + f64::from(column) * self.geometry.cell_width
            + self.geometry.cell_width / 2.0
            - scroll_x;
        let y = bbox.y
            + self.geometry.header_height
            + f64::from(row) * self.geometry.cell_height
            + self.geometry.cell_height / 2.0
            - scroll_y;

        let inside_x = x >= bbox.x && x <= bbox.x + bbox.width;
        let inside_y = y >= bbox.y + self.geometry.header_height && y <= bbox.y + bbox.height;
        if !inside_x || !inside_y {
            return Err(StrategyError::Failed(format!(
                "cell ({row}, {column}) is outside the visible canvas; scroll first"
            )));
        }
        Ok((x, y))
    }
}

#[async_trait]
impl GridAccess for PointerStrategy {
    fn kind(&self) -> GridStrategy {
        GridStrategy::Pointer
    }

    async fn is_available(&self) -> bool {
        self.driver.exists(CANVAS_SELECTOR).await.unwrap_or(false)
    }

    async fn all_cells(&self) -> Result<Vec<GridCellInfo>, StrategyError> {
        // Pixels cannot answer semantic queries.
        Err(StrategyError::Unsupported)
    }

    async fn cell_at(
        &self,
        _row: u32,
        _column: u32,
    ) -> Result<Option<GridCellInfo>, StrategyError> {
        Err(StrategyError::Unsupported)
    }

    async fn selected_cell(&self) -> Result<Option<CellPosition>, StrategyError> {
        Err(StrategyError::Unsupported)
    }

    async fn editing_cell(&self) -> Result<Option<CellPosition>, StrategyError> {
        Err(StrategyError::Unsupported)
    }

    async fn select_cell(&self, row: u32, column: u32) -> Result<(), StrategyError> {
        let (x, y) = self.cell_point(row, column).await?;
        debug!(target: "grid-bridge", row, column, x, y, "coordinate click");
        self.driver
            .mouse_click(x, y, 1)
            .await
            .map_err(StrategyError::from)
    }

    async fn start_edit(&self, row: u32, column: u32) -> Result<(), StrategyError> {
        let (x, y) = self.cell_point(row, column).await?;
        debug!(target: "grid-bridge", row, column, x, y, "coordinate double click");
        self.driver
            .mouse_click(x, y, 2)
            .await
            .map_err(StrategyError::from)
    }

    async fn scroll_to_row(&self, row: u32) -> Result<(), StrategyError> {
        let bbox = self
            .driver
            .bounding_box(CANVAS_SELECTOR)
            .await?
            .ok_or_else(|| StrategyError::Failed("canvas has no bounding box".to_string()))?;
        let (center_x, center_y) = bbox.center();

        let target = f64::from(row) * self.geometry.cell_height;
        let (_, current) = self.scroll.get();
        let delta = target - current;
        if delta.abs() < f64::EPSILON {
            return Ok(());
        }

        // Wheel deltas against an assumed row height; inexact on purpose.
        self.driver.mouse_wheel(center_x, center_y, delta).await?;
        self.scroll.set_vertical(target);
        Ok(())
    }
}
