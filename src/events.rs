use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    clock::{Clock, DualClock, MatchPhase, PlayerNames, PracticeClock, Side},
    history::MatchRecord,
};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClockView {
    pub remaining_seconds: u32,
    pub display: String,
    pub is_running: bool,
    pub is_expired: bool,
}

impl From<&Clock> for ClockView {
    fn from(clock: &Clock) -> Self {
        Self {
            remaining_seconds: clock.remaining_seconds(),
            display: clock.display(),
            is_running: clock.is_running(),
            is_expired: clock.is_expired(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub phase: MatchPhase,
    pub active_side: Option<Side>,
    pub game_over: bool,
    pub top: ClockView,
    pub bottom: ClockView,
    pub initial_seconds: u32,
    pub players: PlayerNames,
    pub match_started_at: Option<DateTime<Utc>>,
}

impl From<&DualClock> for GameSnapshot {
    fn from(clock: &DualClock) -> Self {
        Self {
            phase: clock.phase(),
            active_side: clock.active_side(),
            game_over: clock.is_game_over(),
            top: clock.clock(Side::Top).into(),
            bottom: clock.clock(Side::Bottom).into(),
            initial_seconds: clock.initial_seconds(),
            players: clock.players().clone(),
            match_started_at: clock.match_started_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSnapshot {
    pub clock: ClockView,
    pub initial_seconds: u32,
}

impl From<&PracticeClock> for PracticeSnapshot {
    fn from(practice: &PracticeClock) -> Self {
        Self {
            clock: practice.clock().into(),
            initial_seconds: practice.clock().initial_seconds(),
        }
    }
}

/// User-facing message, shown once.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "payload")]
pub enum ClockEvent {
    GameChanged(GameSnapshot),
    PracticeChanged(PracticeSnapshot),
    MatchSaved(MatchRecord),
    Notice(Notice),
}
