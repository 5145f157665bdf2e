//! Strategy 1: the application's injected scripting object.
//!
//! When the app runs with test support enabled it exposes
//! `window.__planboardTestApi`, a namespaced object for querying and
//! mutating grid state directly. Structured and reliable, therefore always
//! tried first; but strictly optional, so presence is probed per call.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use page_driver::util::js_string;
use page_driver::PageDriver;

use crate::model::{CellPosition, GridCellInfo};
use crate::strategy::{GridAccess, GridStrategy, StrategyError};

/// Global property the app publishes its test hooks under.
pub const SCRIPT_API_GLOBAL: &str = "__planboardTestApi";

pub(crate) fn availability_expr() -> String {
    format!("typeof window.{SCRIPT_API_GLOBAL} !== 'undefined'")
}

pub(crate) fn call_expr(call: &str) -> String {
    format!("window.{SCRIPT_API_GLOBAL}.{call}")
}

/// `scrollToRow` is an optional member of the contract; probe and call in
/// one round trip.
pub(crate) fn scroll_expr(row: u32) -> String {
    format!(
        "typeof window.{g}.scrollToRow === 'function' \
         ? (window.{g}.scrollToRow({row}), true) : false",
        g = SCRIPT_API_GLOBAL
    )
}

pub struct ScriptApiStrategy {
    driver: Arc<dyn PageDriver>,
}

impl ScriptApiStrategy {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self { driver }
    }

    async fn call(&self, call: &str) -> Result<Value, StrategyError> {
        Ok(self.driver.evaluate(&call_expr(call)).await?)
    }

    fn parse<T: serde::de::DeserializeOwned>(
        value: Value,
        what: &str,
    ) -> Result<T, StrategyError> {
        serde_json::from_value(value)
            .map_err(|err| StrategyError::Failed(format!("malformed {what} payload: {err}")))
    }

    fn parse_optional<T: serde::de::DeserializeOwned>(
        value: Value,
        what: &str,
    ) -> Result<Option<T>, StrategyError> {
        if value.is_null() {
            return Ok(None);
        }
        Self::parse(value, what).map(Some)
    }

    /// Direct semantic finders the contract offers beyond the uniform
    /// strategy surface; the bridge prefers these over filtering a full
    /// snapshot.
    pub(crate) async fn cell_by_value(
        &self,
        value: &str,
    ) -> Result<Option<GridCellInfo>, StrategyError> {
        let result = self
            .call(&format!("getCellByValue({})", js_string(value)))
            .await?;
        Self::parse_optional(result, "getCellByValue")
    }

    pub(crate) async fn cells_by_client(
        &self,
        client_id: &str,
    ) -> Result<Vec<GridCellInfo>, StrategyError> {
        let result = self
            .call(&format!("findCellsByClient({})", js_string(client_id)))
            .await?;
        Self::parse(result, "findCellsByClient")
    }

    pub(crate) async fn cell_by_client_and_date(
        &self,
        client_id: &str,
        date: NaiveDate,
    ) -> Result<Option<GridCellInfo>, StrategyError> {
        let result = self
            .call(&format!(
                "getCellByClientAndDate({}, {})",
                js_string(client_id),
                js_string(&date.format("%Y-%m-%d").to_string())
            ))
            .await?;
        Self::parse_optional(result, "getCellByClientAndDate")
    }
}

#[async_trait]
impl GridAccess for ScriptApiStrategy {
    fn kind(&self) -> GridStrategy {
        GridStrategy::ScriptApi
    }

    async fn is_available(&self) -> bool {
        match self.driver.evaluate(&availability_expr()).await {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(err) => {
                debug!(target: "grid-bridge", %err, "script api probe failed");
                false
            }
        }
    }

    async fn all_cells(&self) -> Result<Vec<GridCellInfo>, StrategyError> {
        let result = self.call("getAllCells()").await?;
        Self::parse(result, "getAllCells")
    }

    async fn cell_at(
        &self,
        row: u32,
        column: u32,
    ) -> Result<Option<GridCellInfo>, StrategyError> {
        let result = self.call(&format!("getCellAt({row}, {column})")).await?;
        Self::parse_optional(result, "getCellAt")
    }

    async fn selected_cell(&self) -> Result<Option<CellPosition>, StrategyError> {
        let result = self.call("getSelectedCell()").await?;
        Self::parse_optional(result, "getSelectedCell")
    }

    async fn editing_cell(&self) -> Result<Option<CellPosition>, StrategyError> {
        let result = self.call("getEditingCell()").await?;
        Self::parse_optional(result, "getEditingCell")
    }

    async fn select_cell(&self, row: u32, column: u32) -> Result<(), StrategyError> {
        self.call(&format!("selectCell({row}, {column})")).await?;
        Ok(())
    }

    async fn start_edit(&self, row: u32, column: u32) -> Result<(), StrategyError> {
        self.call(&format!("startEdit({row}, {column})")).await?;
        Ok(())
    }

    async fn scroll_to_row(&self, row: u32) -> Result<(), StrategyError> {
        let result = self.driver.evaluate(&scroll_expr(row)).await?;
        if result.as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(StrategyError::Unsupported)
        }
    }
}
