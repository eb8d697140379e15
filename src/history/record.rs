//! Persisted match summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::format_display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    Timeout,
    ManualEnd,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Timeout => "timeout",
            EndReason::ManualEnd => "manualEnd",
        }
    }

    /// Label shown in the history list. A manual end is how players finish
    /// a decided game, so it reads as a checkmate.
    pub fn label(&self) -> &'static str {
        match self {
            EndReason::Timeout => "Timeout",
            EndReason::ManualEnd => "Checkmate",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: Uuid,
    pub top_player_name: String,
    pub bottom_player_name: String,
    pub top_time_used_seconds: u32,
    pub bottom_time_used_seconds: u32,
    /// Wall-clock seconds from the first move to the end of the match,
    /// pauses included.
    pub total_duration_seconds: u64,
    pub end_reason: EndReason,
    pub occurred_at: DateTime<Utc>,
    /// Time control the match was played at. Absent in older documents.
    #[serde(default)]
    pub initial_seconds: u32,
}

impl MatchRecord {
    pub fn top_time_display(&self) -> String {
        format_display(self.top_time_used_seconds)
    }

    pub fn bottom_time_display(&self) -> String {
        format_display(self.bottom_time_used_seconds)
    }

    pub fn total_duration_display(&self) -> String {
        format_display(u32::try_from(self.total_duration_seconds).unwrap_or(u32::MAX))
    }

    /// Calendar date of the match, `YYYY-MM-DD`.
    pub fn date(&self) -> String {
        self.occurred_at.format("%Y-%m-%d").to_string()
    }
}
