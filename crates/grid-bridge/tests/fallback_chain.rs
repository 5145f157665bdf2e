//! The strategy chain end to end against the stub page driver.

use std::sync::Arc;

use serde_json::{json, Value};

use grid_bridge::{
    BridgeConfig, BridgeError, CanvasGridBridge, CellPosition, GridStrategy, CANVAS_SELECTOR,
    CELL_INPUT_SELECTOR,
};
use page_driver::{BoundingBox, StubAction, StubDriver, StubElement};
use ui_wait::WaitConfig;

const SCRIPT_PROBE: &str = "typeof window.__planboardTestApi !== 'undefined'";
const GHOST_PROBE: &str = "[data-testid^=\"cell-\"][data-value]";

fn fast_wait() -> WaitConfig {
    WaitConfig {
        attach_timeout_ms: 100,
        visible_timeout_ms: 50,
        spinner_timeout_ms: 50,
        poll_interval_ms: 10,
        settle_delay_ms: 10,
        network_quiet_ms: 10,
        network_idle_timeout_ms: 50,
        ..WaitConfig::default()
    }
}

fn fast_bridge_config() -> BridgeConfig {
    BridgeConfig {
        input_retry_attempts: 2,
        input_retry_delay_ms: 10,
        ..BridgeConfig::default()
    }
}

fn bridge(driver: &Arc<StubDriver>) -> CanvasGridBridge {
    CanvasGridBridge::new(
        Arc::clone(driver) as _,
        fast_wait(),
        fast_bridge_config(),
    )
}

fn with_canvas(driver: &StubDriver) {
    driver.insert_element(
        CANVAS_SELECTOR,
        StubElement::visible().with_bbox(BoundingBox {
            x: 0.0,
            y: 0.0,
            width: 1280.0,
            height: 720.0,
        }),
    );
}

#[tokio::test]
async fn script_api_wins_when_available() {
    let driver = Arc::new(StubDriver::new());
    with_canvas(&driver);
    driver.set_eval_result(SCRIPT_PROBE, json!(true));
    driver.set_eval_result(
        "window.__planboardTestApi.getSelectedCell()",
        json!({ "row": 2, "column": 3 }),
    );
    let bridge = bridge(&driver);

    assert!(bridge.is_script_api_available().await);
    let used = bridge.select_cell(2, 3).await.expect("select succeeds");
    assert_eq!(used, GridStrategy::ScriptApi);

    // Selection is observable through the same channel.
    assert_eq!(
        bridge.get_selected_cell().await,
        Some(CellPosition { row: 2, column: 3 })
    );

    // No pixel-level interaction happened.
    assert!(!driver
        .actions()
        .iter()
        .any(|action| matches!(action, StubAction::MouseClick { .. })));
}

#[tokio::test]
async fn ghost_overlay_carries_select_when_script_is_gone() {
    let driver = Arc::new(StubDriver::new());
    with_canvas(&driver);
    driver.insert_element(GHOST_PROBE, StubElement::hidden());
    driver.insert_element("[data-testid=\"cell-4-1\"]", StubElement::hidden());
    let bridge = bridge(&driver);

    assert!(!bridge.is_script_api_available().await);
    assert!(bridge.has_ghost_overlay().await);

    let used = bridge.select_cell(4, 1).await.expect("select succeeds");
    assert_eq!(used, GridStrategy::GhostOverlay);
    assert!(driver.actions().contains(&StubAction::Click {
        selector: "[data-testid=\"cell-4-1\"]".into()
    }));
}

#[tokio::test]
async fn pointer_fallback_still_updates_observable_selection() {
    let driver = Arc::new(StubDriver::new());
    with_canvas(&driver);
    let bridge = bridge(&driver);

    assert!(!bridge.is_script_api_available().await);
    assert!(!bridge.has_ghost_overlay().await);

    let used = bridge.select_cell(1, 2).await.expect("select succeeds");
    assert_eq!(used, GridStrategy::Pointer);
    assert!(driver
        .actions()
        .iter()
        .any(|action| matches!(action, StubAction::MouseClick { clicks: 1, .. })));

    // Lowest-fidelity observation channel: the bridge's own mirror.
    assert_eq!(
        bridge.get_selected_cell().await,
        Some(CellPosition { row: 1, column: 2 })
    );
}

#[tokio::test]
async fn select_with_no_strategy_at_all_is_exhausted() {
    let driver = Arc::new(StubDriver::new());
    let bridge = bridge(&driver);

    let err = bridge.select_cell(0, 0).await.expect_err("must fail");
    assert!(matches!(
        err,
        BridgeError::StrategiesExhausted {
            operation: "select_cell"
        }
    ));
}

#[tokio::test]
async fn reads_without_instrumentation_are_empty_not_errors() {
    let driver = Arc::new(StubDriver::new());
    with_canvas(&driver);
    let bridge = bridge(&driver);

    assert!(bridge.get_all_cells().await.is_empty());
    assert!(bridge.get_cell_at(1, 1).await.is_none());
    assert!(bridge.find_cell_by_value("Früh").await.is_none());
    assert!(bridge.find_cells_by_client("client-1").await.is_empty());
}

#[tokio::test]
async fn snapshot_pairs_are_unique_and_headers_read_only() {
    let driver = Arc::new(StubDriver::new());
    driver.set_eval_result(SCRIPT_PROBE, json!(true));
    driver.set_eval_result(
        "window.__planboardTestApi.getAllCells()",
        json!([
            { "row": 0, "column": 0, "isHeader": true, "isEditable": true },
            { "row": 1, "column": 0, "value": "Früh", "isEditable": true },
            { "row": 1, "column": 0, "value": "stale duplicate" }
        ]),
    );
    let bridge = bridge(&driver);

    let cells = bridge.get_all_cells().await;
    assert_eq!(cells.len(), 2);

    let mut seen = std::collections::HashSet::new();
    for cell in &cells {
        assert!(seen.insert((cell.row, cell.column)), "duplicate pair");
        assert!(
            !(cell.is_editable && cell.is_header),
            "header cell marked editable"
        );
    }
    assert_eq!(cells[1].value, "Früh");
}

#[tokio::test]
async fn repeated_cell_lookup_is_stable() {
    let driver = Arc::new(StubDriver::new());
    driver.set_eval_result(SCRIPT_PROBE, json!(true));
    driver.set_eval_result(
        "window.__planboardTestApi.getCellAt(3, 2)",
        json!({ "row": 3, "column": 2, "value": "Spät", "isEditable": true }),
    );
    let bridge = bridge(&driver);

    let first = bridge.get_cell_at(3, 2).await.expect("cell found");
    let second = bridge.get_cell_at(3, 2).await.expect("cell found");
    assert_eq!(first, second);
}

#[tokio::test]
async fn dialog_based_cell_reports_no_inline_editor() {
    let driver = Arc::new(StubDriver::new());
    with_canvas(&driver);
    let bridge = bridge(&driver);

    // No cell-input node ever appears: the cell edits through a dialog.
    assert!(bridge.active_cell_input().await.is_none());

    // Typing anyway is the caller's mistake and the one loud failure.
    let err = bridge
        .type_in_active_cell("08:00-16:00")
        .await
        .expect_err("must refuse");
    assert!(matches!(err, BridgeError::NoActiveEditor));
}

#[tokio::test]
async fn inline_editor_typing_and_confirm() {
    let driver = Arc::new(StubDriver::new());
    with_canvas(&driver);
    driver.insert_element(
        CELL_INPUT_SELECTOR,
        StubElement::visible()
            .with_attribute("data-row", "6")
            .with_attribute("data-column", "2"),
    );
    let bridge = bridge(&driver);

    // The editor node alone reveals the editing cell, instrumentation or not.
    assert_eq!(
        bridge.get_editing_cell().await,
        Some(CellPosition { row: 6, column: 2 })
    );

    bridge.type_in_active_cell("Nacht").await.expect("typing works");
    bridge.confirm_active_cell("Enter").await.expect("confirm works");

    let actions = driver.actions();
    assert!(actions.contains(&StubAction::Fill {
        selector: CELL_INPUT_SELECTOR.into(),
        text: "Nacht".into()
    }));
    assert!(actions.contains(&StubAction::PressKey {
        selector: CELL_INPUT_SELECTOR.into(),
        key: "Enter".into()
    }));
}

#[tokio::test]
async fn scroll_prefers_script_api_and_reports_pointer_fallback() {
    let driver = Arc::new(StubDriver::new());
    with_canvas(&driver);

    // Script api present but without the optional scrollToRow member.
    driver.set_eval_result(SCRIPT_PROBE, json!(true));
    driver.set_eval_result(
        "typeof window.__planboardTestApi.scrollToRow === 'function' \
         ? (window.__planboardTestApi.scrollToRow(30), true) : false",
        json!(false),
    );
    let bridge = bridge(&driver);

    let used = bridge.scroll_to_row(30).await.expect("scroll succeeds");
    assert_eq!(used, GridStrategy::Pointer);
    assert!(driver
        .actions()
        .iter()
        .any(|action| matches!(action, StubAction::MouseWheel { .. })));
}

#[tokio::test]
async fn capability_flips_are_picked_up_per_call() {
    let driver = Arc::new(StubDriver::new());
    with_canvas(&driver);
    let bridge = bridge(&driver);

    // Production rendering: pointer only.
    assert_eq!(
        bridge.select_cell(0, 1).await.expect("pointer select"),
        GridStrategy::Pointer
    );

    // "Navigation" into test mode: the api appears, no new bridge needed.
    driver.set_eval_result(SCRIPT_PROBE, json!(true));
    assert_eq!(
        bridge.select_cell(0, 1).await.expect("script select"),
        GridStrategy::ScriptApi
    );
}
