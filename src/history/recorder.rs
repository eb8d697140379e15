use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;
use uuid::Uuid;

use crate::clock::{DualClock, Side};

use super::{
    record::{EndReason, MatchRecord},
    store::HistoryStore,
};

/// Turns a finished match into a [`MatchRecord`] and stores it.
#[derive(Clone)]
pub struct MatchRecorder {
    history: HistoryStore,
}

impl MatchRecorder {
    pub fn new(history: HistoryStore) -> Self {
        Self { history }
    }

    /// `None` when the match never started.
    pub fn build(clock: &DualClock, reason: EndReason, now: DateTime<Utc>) -> Option<MatchRecord> {
        let started_at = clock.match_started_at()?;
        let total_duration_seconds = (now - started_at).num_seconds().max(0) as u64;

        Some(MatchRecord {
            id: Uuid::new_v4(),
            top_player_name: clock.players().top.clone(),
            bottom_player_name: clock.players().bottom.clone(),
            top_time_used_seconds: clock.clock(Side::Top).time_used(),
            bottom_time_used_seconds: clock.clock(Side::Bottom).time_used(),
            total_duration_seconds,
            end_reason: reason,
            occurred_at: now,
            initial_seconds: clock.initial_seconds(),
        })
    }

    /// Build and prepend to history. Nothing is written for a match that never started.
    pub async fn record(
        &self,
        clock: &DualClock,
        reason: EndReason,
        now: DateTime<Utc>,
    ) -> Result<Option<MatchRecord>> {
        let Some(record) = Self::build(clock, reason, now) else {
            return Ok(None);
        };

        info!(
            "Recording match {} vs {} ({})",
            record.top_player_name,
            record.bottom_player_name,
            reason.as_str()
        );
        self.history.append(record.clone()).await?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    fn recorder() -> (MatchRecorder, HistoryStore) {
        let history = HistoryStore::new(Database::in_memory().unwrap());
        (MatchRecorder::new(history.clone()), history)
    }

    #[tokio::test]
    async fn test_never_started_match_is_not_recorded() {
        let (recorder, history) = recorder();
        let clock = DualClock::new(300);

        let recorded = recorder
            .record(&clock, EndReason::ManualEnd, at(5))
            .await
            .unwrap();
        assert!(recorded.is_none());
        assert!(history.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_scenario() {
        let (recorder, history) = recorder();
        let mut clock = DualClock::new(300);
        clock.tap(Side::Top, at(0));
        let generation = clock.generation();
        for _ in 0..300 {
            clock.tick(generation);
        }
        assert!(clock.is_game_over());

        let record = recorder
            .record(&clock, EndReason::Timeout, at(300))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.bottom_time_used_seconds, 300);
        assert_eq!(record.top_time_used_seconds, 0);
        assert_eq!(record.end_reason, EndReason::Timeout);
        assert_eq!(record.total_duration_seconds, 300);

        assert_eq!(history.read_all().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_manual_end_scenario() {
        let (recorder, history) = recorder();
        let mut clock = DualClock::new(300);

        clock.tap(Side::Top, at(0));
        let generation = clock.generation();
        for _ in 0..5 {
            clock.tick(generation);
        }
        clock.tap(Side::Bottom, at(5));
        let generation = clock.generation();
        for _ in 0..5 {
            clock.tick(generation);
        }

        assert!(clock.end_match());
        let record = recorder
            .record(&clock, EndReason::ManualEnd, at(10))
            .await
            .unwrap()
            .unwrap();
        clock.reset();

        assert_eq!(record.end_reason, EndReason::ManualEnd);
        assert_eq!(record.total_duration_seconds, 10);
        assert_eq!(record.top_time_used_seconds, 5);
        assert_eq!(record.bottom_time_used_seconds, 5);

        assert_eq!(clock.phase(), crate::clock::MatchPhase::Idle);
        assert_eq!(clock.clock(Side::Top).remaining_seconds(), 300);
        assert_eq!(clock.clock(Side::Bottom).remaining_seconds(), 300);
        assert_eq!(history.read_all().await.unwrap().len(), 1);
    }

    #[test]
    fn test_clock_skew_never_goes_negative() {
        let mut clock = DualClock::new(60);
        clock.tap(Side::Bottom, at(100));
        let record = MatchRecorder::build(&clock, EndReason::ManualEnd, at(90)).unwrap();
        assert_eq!(record.total_duration_seconds, 0);
    }
}
