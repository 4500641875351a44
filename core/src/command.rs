use serde::{Deserialize, Serialize};

/// All player-issued commands.
/// Variants are only ever appended, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,

    // ── Estate controls ───────────────────────────
    /// Write a registered number, e.g. `slFeedRt` or `lnToSew`.
    SetControl { symbol: String, value: f64 },
}

impl PlayerCommand {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::SetControl { .. } => "set_control",
        }
    }
}
