//! Cell snapshots and positions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Immutable snapshot of one grid cell, produced on demand.
///
/// The grid virtualizes and recycles rows, so a snapshot is only valid for
/// the call that produced it; holding one across interactions is a
/// correctness hazard, not just a staleness issue. Field names serialize
/// camelCase to line up with the injected scripting object's payloads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCellInfo {
    pub row: u32,
    pub column: u32,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub test_id: String,
    #[serde(default)]
    pub is_editable: bool,
    #[serde(default = "visible_default")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_header: bool,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub entry_type: Option<String>,
    #[serde(default)]
    pub shift_id: Option<String>,
}

fn visible_default() -> bool {
    true
}

impl GridCellInfo {
    pub fn position(&self) -> CellPosition {
        CellPosition {
            row: self.row,
            column: self.column,
        }
    }

    /// Enforce the policy invariant: header cells are never editable.
    /// Instrumentation claiming otherwise loses the editable flag.
    pub(crate) fn normalized(mut self) -> Self {
        if self.is_header && self.is_editable {
            warn!(
                target: "grid-bridge",
                row = self.row,
                column = self.column,
                "header cell reported as editable; clearing the flag"
            );
            self.is_editable = false;
        }
        self
    }
}

/// The currently selected or currently edited cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPosition {
    pub row: u32,
    pub column: u32,
}
