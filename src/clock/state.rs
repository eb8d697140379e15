use serde::{Deserialize, Serialize};

pub const DEFAULT_INITIAL_SECONDS: u32 = 300;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TickOutcome {
    /// The clock was not running; nothing changed.
    Ignored,
    Counted { remaining_seconds: u32 },
    Expired,
}

/// A single countdown in whole seconds.
///
/// A clock that reaches zero stops itself and refuses to start again until
/// it is reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Clock {
    remaining_seconds: u32,
    initial_seconds: u32,
    is_running: bool,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_SECONDS)
    }
}

impl Clock {
    pub fn new(initial_seconds: u32) -> Self {
        Self {
            remaining_seconds: initial_seconds,
            initial_seconds,
            is_running: false,
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn initial_seconds(&self) -> u32 {
        self.initial_seconds
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_seconds == 0
    }

    pub fn time_used(&self) -> u32 {
        self.initial_seconds.saturating_sub(self.remaining_seconds)
    }

    /// Returns `false` without changing anything when the clock has no time left.
    pub fn start(&mut self) -> bool {
        if self.remaining_seconds == 0 {
            return false;
        }
        self.is_running = true;
        true
    }

    pub fn stop(&mut self) {
        self.is_running = false;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running {
            return TickOutcome::Ignored;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.is_running = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Counted {
                remaining_seconds: self.remaining_seconds,
            }
        }
    }

    pub fn reset(&mut self, to_seconds: u32) {
        *self = Self::new(to_seconds);
    }

    pub fn display(&self) -> String {
        format_display(self.remaining_seconds)
    }
}

/// Format whole seconds as "MM:SS". Minutes are not capped at 59 or 99.
pub fn format_display(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
