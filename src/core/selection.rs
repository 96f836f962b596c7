//! Bounded capture of the active editor selection.

use serde::{Deserialize, Serialize};

/// Lines kept from a selection; anything beyond is dropped.
pub const MAX_SELECTION_LINES: usize = 100;

/// Selection text capped at [`MAX_SELECTION_LINES`] lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    pub text: String,
    /// Number of retained lines, never more than the cap.
    pub line_count: usize,
}

impl SelectionSnapshot {
    /// Capture a snapshot of raw selection text. Empty text means no selection.
    pub fn capture(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let lines: Vec<&str> = raw.split('\n').take(MAX_SELECTION_LINES).collect();
        Some(Self {
            line_count: lines.len(),
            text: lines.join("\n"),
        })
    }
}
