use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{Clock, TickOutcome, DEFAULT_INITIAL_SECONDS};

pub const DEFAULT_TOP_NAME: &str = "Player A";
pub const DEFAULT_BOTTOM_NAME: &str = "Player B";
pub const MAX_PLAYER_NAME_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind", content = "side")]
pub enum MatchPhase {
    Idle,
    Running(Side),
    Paused,
    /// The given side ran out of time.
    Expired(Side),
    Ended,
}

impl Default for MatchPhase {
    fn default() -> Self {
        MatchPhase::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// First move of the match (or first move after a pause); `started` is now running.
    Started { started: Side, first_move: bool },
    Switched { to: Side },
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DualTick {
    /// Stale generation, paused, or finished match.
    Ignored,
    Counted { side: Side, remaining_seconds: u32 },
    Expired { side: Side },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerNames {
    pub top: String,
    pub bottom: String,
}

impl Default for PlayerNames {
    fn default() -> Self {
        Self {
            top: DEFAULT_TOP_NAME.into(),
            bottom: DEFAULT_BOTTOM_NAME.into(),
        }
    }
}

impl PlayerNames {
    /// Blank names fall back to the defaults; long names are cut at
    /// [`MAX_PLAYER_NAME_CHARS`].
    pub fn new(top: &str, bottom: &str) -> Self {
        Self {
            top: clean_name(top, DEFAULT_TOP_NAME),
            bottom: clean_name(bottom, DEFAULT_BOTTOM_NAME),
        }
    }

    pub fn get(&self, side: Side) -> &str {
        match side {
            Side::Top => &self.top,
            Side::Bottom => &self.bottom,
        }
    }
}

fn clean_name(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    trimmed.chars().take(MAX_PLAYER_NAME_CHARS).collect()
}

/// Two alternating clocks and the match around them.
///
/// All methods are synchronous and take the current time as an argument so
/// the async controller owns scheduling and wall-clock reads.
#[derive(Debug, Clone)]
pub struct DualClock {
    top: Clock,
    bottom: Clock,
    initial_seconds: u32,
    phase: MatchPhase,
    match_started_at: Option<DateTime<Utc>>,
    players: PlayerNames,
    /// Bumped whenever a scheduled tick must stop applying.
    generation: u64,
}

impl Default for DualClock {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_SECONDS)
    }
}

impl DualClock {
    pub fn new(initial_seconds: u32) -> Self {
        Self {
            top: Clock::new(initial_seconds),
            bottom: Clock::new(initial_seconds),
            initial_seconds,
            phase: MatchPhase::Idle,
            match_started_at: None,
            players: PlayerNames::default(),
            generation: 0,
        }
    }

    pub fn clock(&self, side: Side) -> &Clock {
        match side {
            Side::Top => &self.top,
            Side::Bottom => &self.bottom,
        }
    }

    fn clock_mut(&mut self, side: Side) -> &mut Clock {
        match side {
            Side::Top => &mut self.top,
            Side::Bottom => &mut self.bottom,
        }
    }

    pub fn initial_seconds(&self) -> u32 {
        self.initial_seconds
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn match_started_at(&self) -> Option<DateTime<Utc>> {
        self.match_started_at
    }

    pub fn players(&self) -> &PlayerNames {
        &self.players
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_side(&self) -> Option<Side> {
        match self.phase {
            MatchPhase::Running(side) => Some(side),
            _ => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, MatchPhase::Expired(_))
    }

    pub fn tap(&mut self, side: Side, now: DateTime<Utc>) -> TapOutcome {
        match self.phase {
            MatchPhase::Idle | MatchPhase::Paused => {
                let starting = side.opposite();
                if !self.clock_mut(starting).start() {
                    return TapOutcome::Ignored;
                }
                let first_move = self.match_started_at.is_none();
                if first_move {
                    self.match_started_at = Some(now);
                }
                self.phase = MatchPhase::Running(starting);
                self.generation += 1;
                TapOutcome::Started {
                    started: starting,
                    first_move,
                }
            }
            MatchPhase::Running(active) if active == side => {
                let next = side.opposite();
                self.clock_mut(active).stop();
                // A clock at zero always ends the match, so the waiting side has time left.
                self.clock_mut(next).start();
                self.phase = MatchPhase::Running(next);
                self.generation += 1;
                TapOutcome::Switched { to: next }
            }
            MatchPhase::Running(_) | MatchPhase::Expired(_) | MatchPhase::Ended => {
                TapOutcome::Ignored
            }
        }
    }

    /// Apply one scheduled tick. Ticks spawned for an older generation are ignored.
    pub fn tick(&mut self, generation: u64) -> DualTick {
        if generation != self.generation {
            return DualTick::Ignored;
        }
        let MatchPhase::Running(side) = self.phase else {
            return DualTick::Ignored;
        };

        match self.clock_mut(side).tick() {
            TickOutcome::Ignored => DualTick::Ignored,
            TickOutcome::Counted { remaining_seconds } => DualTick::Counted {
                side,
                remaining_seconds,
            },
            TickOutcome::Expired => {
                self.top.stop();
                self.bottom.stop();
                self.phase = MatchPhase::Expired(side);
                self.generation += 1;
                DualTick::Expired { side }
            }
        }
    }

    /// Returns `true` if a running match was paused.
    pub fn pause(&mut self) -> bool {
        let MatchPhase::Running(side) = self.phase else {
            return false;
        };
        self.clock_mut(side).stop();
        self.phase = MatchPhase::Paused;
        self.generation += 1;
        true
    }

    /// Mark the match as ended by the players.
    ///
    /// Returns `true` when the match still needs a manual-end record: it was
    /// started and has not already been recorded through expiry.
    pub fn end_match(&mut self) -> bool {
        if self.match_started_at.is_none() {
            return false;
        }
        match self.phase {
            MatchPhase::Running(_) | MatchPhase::Paused => {
                self.top.stop();
                self.bottom.stop();
                self.phase = MatchPhase::Ended;
                self.generation += 1;
                true
            }
            MatchPhase::Idle | MatchPhase::Expired(_) | MatchPhase::Ended => false,
        }
    }

    pub fn reset(&mut self) {
        self.top.reset(self.initial_seconds);
        self.bottom.reset(self.initial_seconds);
        self.phase = MatchPhase::Idle;
        self.match_started_at = None;
        self.generation += 1;
    }

    /// Any match in progress is discarded without a record.
    pub fn change_initial_duration(&mut self, seconds: u32) {
        self.initial_seconds = seconds;
        self.reset();
    }

    pub fn set_players(&mut self, players: PlayerNames) {
        self.players = players;
    }

    pub fn display(&self, side: Side) -> String {
        self.clock(side).display()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    fn running_count(clock: &DualClock) -> usize {
        [Side::Top, Side::Bottom]
            .into_iter()
            .filter(|side| clock.clock(*side).is_running())
            .count()
    }

    #[test]
    fn test_first_tap_starts_opposite_clock() {
        let mut clock = DualClock::new(300);
        assert_eq!(clock.phase(), MatchPhase::Idle);

        let outcome = clock.tap(Side::Top, at(0));
        assert_eq!(
            outcome,
            TapOutcome::Started {
                started: Side::Bottom,
                first_move: true
            }
        );
        assert_eq!(clock.active_side(), Some(Side::Bottom));
        assert!(clock.clock(Side::Bottom).is_running());
        assert!(!clock.clock(Side::Top).is_running());
        assert_eq!(clock.match_started_at(), Some(at(0)));
    }

    #[test]
    fn test_tap_on_inactive_side_is_ignored() {
        let mut clock = DualClock::new(300);
        clock.tap(Side::Top, at(0));
        let generation = clock.generation();

        assert_eq!(clock.tap(Side::Top, at(1)), TapOutcome::Ignored);
        assert_eq!(clock.active_side(), Some(Side::Bottom));
        assert_eq!(clock.generation(), generation);
    }

    #[test]
    fn test_active_tap_switches_sides() {
        let mut clock = DualClock::new(300);
        clock.tap(Side::Top, at(0));
        assert_eq!(
            clock.tap(Side::Bottom, at(1)),
            TapOutcome::Switched { to: Side::Top }
        );
        assert_eq!(clock.active_side(), Some(Side::Top));
        assert!(!clock.clock(Side::Bottom).is_running());
        assert_eq!(clock.match_started_at(), Some(at(0)));
    }

    #[test]
    fn test_at_most_one_clock_runs_for_any_tap_sequence() {
        let mut clock = DualClock::new(30);
        let taps = [
            Side::Top,
            Side::Top,
            Side::Bottom,
            Side::Bottom,
            Side::Top,
            Side::Bottom,
            Side::Top,
            Side::Top,
        ];
        for (i, side) in taps.into_iter().enumerate() {
            clock.tap(side, at(i as i64));
            let generation = clock.generation();
            clock.tick(generation);
            assert!(running_count(&clock) <= 1);
            match clock.active_side() {
                Some(active) => assert!(clock.clock(active).is_running()),
                None => assert_eq!(running_count(&clock), 0),
            }
        }
    }

    #[test]
    fn test_stale_generation_tick_is_ignored() {
        let mut clock = DualClock::new(300);
        clock.tap(Side::Top, at(0));
        let stale = clock.generation();
        clock.tap(Side::Bottom, at(1));

        assert_eq!(clock.tick(stale), DualTick::Ignored);
        assert_eq!(clock.clock(Side::Top).remaining_seconds(), 300);
        assert_eq!(clock.clock(Side::Bottom).remaining_seconds(), 300);

        let current = clock.generation();
        assert_eq!(
            clock.tick(current),
            DualTick::Counted {
                side: Side::Top,
                remaining_seconds: 299
            }
        );
    }

    #[test]
    fn test_expiry_ends_match() {
        let mut clock = DualClock::new(300);
        clock.tap(Side::Top, at(0));
        let generation = clock.generation();

        for _ in 0..299 {
            assert!(matches!(clock.tick(generation), DualTick::Counted { .. }));
        }
        assert_eq!(clock.tick(generation), DualTick::Expired { side: Side::Bottom });

        assert_eq!(clock.phase(), MatchPhase::Expired(Side::Bottom));
        assert!(clock.is_game_over());
        assert_eq!(clock.active_side(), None);
        assert_eq!(running_count(&clock), 0);
        assert_eq!(clock.clock(Side::Bottom).time_used(), 300);
        assert_eq!(clock.clock(Side::Top).time_used(), 0);

        // Nothing moves once expired
        assert_eq!(clock.tap(Side::Bottom, at(400)), TapOutcome::Ignored);
        assert_eq!(clock.tap(Side::Top, at(400)), TapOutcome::Ignored);
        assert_eq!(clock.tick(generation), DualTick::Ignored);
        // Expiry is already recorded, so ending does not ask for another record
        assert!(!clock.end_match());
    }

    #[test]
    fn test_pause_and_resume() {
        let mut clock = DualClock::new(300);
        assert!(!clock.pause());

        clock.tap(Side::Top, at(0));
        assert!(clock.pause());
        assert_eq!(clock.phase(), MatchPhase::Paused);
        assert_eq!(running_count(&clock), 0);
        assert!(!clock.pause());

        let outcome = clock.tap(Side::Bottom, at(10));
        assert_eq!(
            outcome,
            TapOutcome::Started {
                started: Side::Top,
                first_move: false
            }
        );
        assert_eq!(clock.match_started_at(), Some(at(0)));
    }

    #[test]
    fn test_end_match_on_idle_needs_no_record() {
        let mut clock = DualClock::new(300);
        assert!(!clock.end_match());
        assert_eq!(clock.phase(), MatchPhase::Idle);
    }

    #[test]
    fn test_end_then_reset_returns_to_idle() {
        let mut clock = DualClock::new(300);
        clock.tap(Side::Top, at(0));
        let generation = clock.generation();
        clock.tick(generation);

        assert!(clock.end_match());
        assert_eq!(clock.phase(), MatchPhase::Ended);
        assert_eq!(clock.tap(Side::Top, at(2)), TapOutcome::Ignored);

        clock.reset();
        assert_eq!(clock.phase(), MatchPhase::Idle);
        assert_eq!(clock.match_started_at(), None);
        assert_eq!(clock.clock(Side::Top).remaining_seconds(), 300);
        assert_eq!(clock.clock(Side::Bottom).remaining_seconds(), 300);
    }

    #[test]
    fn test_change_initial_duration_discards_match() {
        let mut clock = DualClock::new(300);
        clock.tap(Side::Top, at(0));
        let generation = clock.generation();
        clock.tick(generation);

        clock.change_initial_duration(600);
        assert_eq!(clock.phase(), MatchPhase::Idle);
        assert_eq!(clock.match_started_at(), None);
        assert_eq!(clock.initial_seconds(), 600);
        assert_eq!(clock.display(Side::Top), "10:00");
        assert_eq!(clock.display(Side::Bottom), "10:00");
        assert_eq!(clock.tick(generation), DualTick::Ignored);
    }

    #[test]
    fn test_zero_duration_cannot_start() {
        let mut clock = DualClock::new(0);
        assert_eq!(clock.tap(Side::Top, at(0)), TapOutcome::Ignored);
        assert_eq!(clock.phase(), MatchPhase::Idle);
        assert_eq!(clock.match_started_at(), None);
    }

    #[test]
    fn test_player_names_fallback_and_truncation() {
        let names = PlayerNames::new("   ", "A very long player name indeed");
        assert_eq!(names.top, DEFAULT_TOP_NAME);
        assert_eq!(names.bottom.chars().count(), MAX_PLAYER_NAME_CHARS);
        assert_eq!(names.bottom, "A very long player n");
        assert_eq!(PlayerNames::new(" Magnus ", "Hikaru").get(Side::Top), "Magnus");
    }
}
