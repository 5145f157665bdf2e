//! Strategy 2: the invisible "ghost" overlay.
//!
//! In test mode the app mirrors every rendered cell as an invisible DOM
//! node carrying `data-testid="cell-{row}-{col}"`, `data-value`,
//! `data-client-id` and `data-date`. That re-opens standard element queries
//! over the canvas, at lower fidelity: the overlay carries no policy
//! metadata, so editability is unknown (reported `false`) and headers are
//! inferred from row 0.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use page_driver::PageDriver;

use crate::model::{CellPosition, GridCellInfo};
use crate::strategy::{GridAccess, GridStrategy, StrategyError};

/// Ghost cells, excluding the transient editor node (which has a
/// `cell-` testid prefix too but never a `data-value`).
pub const GHOST_CELL_SELECTOR: &str = "[data-testid^=\"cell-\"][data-value]";

pub(crate) fn ghost_cell_selector(row: u32, column: u32) -> String {
    format!("[data-testid=\"cell-{row}-{column}\"]")
}

/// One round trip collecting every ghost cell from the overlay.
pub(crate) fn collect_cells_expr() -> String {
    "(() => Array.from(document.querySelectorAll('[data-testid^=\"cell-\"][data-value]')) \
       .map(el => { \
         const m = /^cell-(\\d+)-(\\d+)$/.exec(el.getAttribute('data-testid')); \
         if (!m) return null; \
         return { \
           row: Number(m[1]), \
           column: Number(m[2]), \
           testId: el.getAttribute('data-testid'), \
           value: el.getAttribute('data-value') || '', \
           clientId: el.getAttribute('data-client-id'), \
           date: el.getAttribute('data-date') \
         }; \
       }) \
       .filter(cell => cell !== null))()"
        .to_string()
}

/// Raw overlay record before policy-flag inference.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhostCell {
    row: u32,
    column: u32,
    #[serde(default)]
    test_id: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl GhostCell {
    fn into_cell_info(self) -> GridCellInfo {
        let date = self
            .date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok());
        GridCellInfo {
            row: self.row,
            column: self.column,
            value: self.value,
            test_id: self.test_id,
            // Overlay nodes carry no policy metadata.
            is_editable: false,
            is_visible: true,
            is_header: self.row == 0,
            client_id: self.client_id,
            client_name: None,
            date,
            entry_type: None,
            shift_id: None,
        }
    }
}

pub struct GhostOverlayStrategy {
    driver: Arc<dyn PageDriver>,
}

impl GhostOverlayStrategy {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl GridAccess for GhostOverlayStrategy {
    fn kind(&self) -> GridStrategy {
        GridStrategy::GhostOverlay
    }

    async fn is_available(&self) -> bool {
        self.driver
            .exists(GHOST_CELL_SELECTOR)
            .await
            .unwrap_or(false)
    }

    async fn all_cells(&self) -> Result<Vec<GridCellInfo>, StrategyError> {
        let payload = self.driver.evaluate(&collect_cells_expr()).await?;
        let cells: Vec<GhostCell> = serde_json::from_value(payload)
            .map_err(|err| StrategyError::Failed(format!("malformed overlay payload: {err}")))?;
        Ok(cells.into_iter().map(GhostCell::into_cell_info).collect())
    }

    async fn cell_at(
        &self,
        row: u32,
        column: u32,
    ) -> Result<Option<GridCellInfo>, StrategyError> {
        let cells = self.all_cells().await?;
        Ok(cells
            .into_iter()
            .find(|cell| cell.row == row && cell.column == column))
    }

    async fn selected_cell(&self) -> Result<Option<CellPosition>, StrategyError> {
        // The overlay mirrors positions, not selection state.
        Err(StrategyError::Unsupported)
    }

    async fn editing_cell(&self) -> Result<Option<CellPosition>, StrategyError> {
        Ok(crate::input::editing_position(&self.driver).await)
    }

    async fn select_cell(&self, row: u32, column: u32) -> Result<(), StrategyError> {
        self.driver
            .click(&ghost_cell_selector(row, column))
            .await
            .map_err(StrategyError::from)
    }

    async fn start_edit(&self, row: u32, column: u32) -> Result<(), StrategyError> {
        let selector = ghost_cell_selector(row, column);
        let bbox = self
            .driver
            .bounding_box(&selector)
            .await?
            .ok_or_else(|| StrategyError::Failed(format!("{selector} has no bounding box")))?;
        let (x, y) = bbox.center();
        self.driver
            .mouse_click(x, y, 2)
            .await
            .map_err(StrategyError::from)
    }

    async fn scroll_to_row(&self, row: u32) -> Result<(), StrategyError> {
        // Any ghost cell of the target row will do as a scroll anchor.
        let expression = format!(
            "(() => {{ \
               const el = document.querySelector('[data-testid^=\"cell-{row}-\"]'); \
               if (!el) return false; \
               el.scrollIntoView({{ block: 'center' }}); \
               return true; \
             }})()"
        );
        let scrolled = self.driver.evaluate(&expression).await?;
        if scrolled.as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(StrategyError::Failed(format!(
                "no ghost cell rendered for row {row}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::CELL_INPUT_SELECTOR;
    use page_driver::{BoundingBox, StubAction, StubDriver, StubElement};
    use serde_json::json;

    fn overlay_driver() -> Arc<StubDriver> {
        let driver = Arc::new(StubDriver::new());
        driver.insert_element(GHOST_CELL_SELECTOR, StubElement::hidden());
        driver
    }

    #[tokio::test]
    async fn availability_follows_the_overlay_probe() {
        let bare = Arc::new(StubDriver::new());
        assert!(!GhostOverlayStrategy::new(bare as _).is_available().await);

        let driver = overlay_driver();
        assert!(GhostOverlayStrategy::new(driver as _).is_available().await);
    }

    #[tokio::test]
    async fn all_cells_infers_policy_flags() {
        let driver = overlay_driver();
        driver.set_eval_result(
            collect_cells_expr(),
            json!([
                { "row": 0, "column": 1, "testId": "cell-0-1", "value": "Mo 03.08." },
                { "row": 2, "column": 1, "testId": "cell-2-1", "value": "Früh",
                  "clientId": "client-9", "date": "2026-08-03" }
            ]),
        );
        let strategy = GhostOverlayStrategy::new(driver as _);

        let cells = strategy.all_cells().await.expect("overlay parses");
        assert_eq!(cells.len(), 2);
        assert!(cells[0].is_header);
        assert!(!cells[0].is_editable);
        assert!(!cells[1].is_header);
        assert_eq!(
            cells[1].date,
            NaiveDate::from_ymd_opt(2026, 8, 3)
        );
    }

    #[tokio::test]
    async fn editing_cell_reads_the_input_position() {
        let driver = overlay_driver();
        driver.insert_element(
            CELL_INPUT_SELECTOR,
            StubElement::visible()
                .with_attribute("data-row", "5")
                .with_attribute("data-column", "3"),
        );
        let strategy = GhostOverlayStrategy::new(driver as _);

        assert_eq!(
            strategy.editing_cell().await.expect("query succeeds"),
            Some(CellPosition { row: 5, column: 3 })
        );
    }

    #[tokio::test]
    async fn editing_cell_absent_is_none() {
        let driver = overlay_driver();
        let strategy = GhostOverlayStrategy::new(driver as _);
        assert_eq!(strategy.editing_cell().await.expect("query succeeds"), None);
    }

    #[tokio::test]
    async fn select_clicks_the_ghost_node() {
        let driver = overlay_driver();
        driver.insert_element("[data-testid=\"cell-2-4\"]", StubElement::visible());
        let strategy = GhostOverlayStrategy::new(Arc::clone(&driver) as _);

        strategy.select_cell(2, 4).await.expect("click lands");
        assert_eq!(
            driver.actions(),
            vec![StubAction::Click {
                selector: "[data-testid=\"cell-2-4\"]".into()
            }]
        );
    }

    #[tokio::test]
    async fn start_edit_double_clicks_the_cell_center() {
        let driver = overlay_driver();
        driver.insert_element(
            "[data-testid=\"cell-2-4\"]",
            StubElement::visible().with_bbox(BoundingBox {
                x: 100.0,
                y: 200.0,
                width: 160.0,
                height: 28.0,
            }),
        );
        let strategy = GhostOverlayStrategy::new(Arc::clone(&driver) as _);

        strategy.start_edit(2, 4).await.expect("double click lands");
        assert_eq!(
            driver.actions(),
            vec![StubAction::MouseClick {
                x: 180.0,
                y: 214.0,
                clicks: 2
            }]
        );
    }

    #[tokio::test]
    async fn select_on_missing_ghost_cell_fails_over() {
        let driver = overlay_driver();
        let strategy = GhostOverlayStrategy::new(driver as _);
        assert!(matches!(
            strategy.select_cell(9, 9).await,
            Err(StrategyError::Failed(_))
        ));
    }
}
