use std::{ops::ControlFlow, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{error, info};
use tokio::sync::{broadcast, Mutex};

use crate::{
    audio::{SoundBoard, SoundId},
    events::{ClockEvent, GameSnapshot, Notice},
    history::{EndReason, MatchRecord, MatchRecorder},
};

use super::{
    dual::{DualClock, DualTick, PlayerNames, Side, TapOutcome},
    ticker::{Ticker, TickerSlot},
};

/// Source of wall-clock time for match start stamps and record durations.
pub type WallClock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// State the tick task needs. Kept apart from the ticker slot so the
/// running task never keeps its own handle alive.
struct GameShared {
    clock: Mutex<DualClock>,
    recorder: MatchRecorder,
    sounds: Arc<SoundBoard>,
    events: broadcast::Sender<ClockEvent>,
    now: WallClock,
}

impl GameShared {
    fn emit(&self, event: ClockEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn emit_snapshot(&self, clock: &DualClock) -> GameSnapshot {
        let snapshot = GameSnapshot::from(clock);
        self.emit(ClockEvent::GameChanged(snapshot.clone()));
        snapshot
    }

    async fn on_tick(&self, generation: u64) -> ControlFlow<()> {
        let finished = {
            let mut clock = self.clock.lock().await;
            match clock.tick(generation) {
                DualTick::Ignored => return ControlFlow::Break(()),
                DualTick::Counted { .. } => {
                    self.emit_snapshot(&clock);
                    return ControlFlow::Continue(());
                }
                DualTick::Expired { side } => {
                    info!("{} clock ran out of time", side.as_str());
                    self.emit_snapshot(&clock);
                    clock.clone()
                }
            }
        };

        self.sounds.play(SoundId::TimerEnd);

        match self
            .recorder
            .record(&finished, EndReason::Timeout, (self.now)())
            .await
        {
            Ok(Some(record)) => self.announce_saved(record),
            Ok(None) => {}
            Err(err) => {
                error!("Error saving game data: {err:#}");
                self.emit(ClockEvent::Notice(Notice::new(
                    "Save Error",
                    "Failed to save game data.",
                )));
            }
        }

        ControlFlow::Break(())
    }

    fn announce_saved(&self, record: MatchRecord) {
        self.emit(ClockEvent::MatchSaved(record));
        self.emit(ClockEvent::Notice(Notice::new(
            "Game Saved",
            "Game data has been saved to history.",
        )));
    }
}

/// Drives the two-player screen: taps, the one-second schedule, sounds and
/// match recording around a [`DualClock`].
///
/// Every method that changes the ticker does so while holding the clock
/// lock, and the slot lock is always taken second. The slot therefore
/// follows clock transitions in the order they happened.
#[derive(Clone)]
pub struct GameController {
    shared: Arc<GameShared>,
    ticker: Arc<Mutex<TickerSlot>>,
    tick_interval: Duration,
}

impl GameController {
    pub fn new(
        initial_seconds: u32,
        tick_interval: Duration,
        recorder: MatchRecorder,
        sounds: Arc<SoundBoard>,
        events: broadcast::Sender<ClockEvent>,
    ) -> Self {
        Self::with_wall_clock(
            initial_seconds,
            tick_interval,
            recorder,
            sounds,
            events,
            Arc::new(Utc::now),
        )
    }

    pub fn with_wall_clock(
        initial_seconds: u32,
        tick_interval: Duration,
        recorder: MatchRecorder,
        sounds: Arc<SoundBoard>,
        events: broadcast::Sender<ClockEvent>,
        now: WallClock,
    ) -> Self {
        Self {
            shared: Arc::new(GameShared {
                clock: Mutex::new(DualClock::new(initial_seconds)),
                recorder,
                sounds,
                events,
                now,
            }),
            ticker: Arc::new(Mutex::new(TickerSlot::default())),
            tick_interval,
        }
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        let clock = self.shared.clock.lock().await;
        GameSnapshot::from(&*clock)
    }

    pub async fn tap(&self, side: Side) -> GameSnapshot {
        let mut clock = self.shared.clock.lock().await;
        let outcome = clock.tap(side, (self.shared.now)());

        match outcome {
            TapOutcome::Started { started, first_move } => {
                if first_move {
                    info!("Match started, {} to move", started.as_str());
                }
                self.shared.sounds.play(SoundId::TimerStart);
                self.restart_ticker(clock.generation()).await;
            }
            TapOutcome::Switched { .. } => {
                self.shared.sounds.play(SoundId::SwitchPlayer);
                self.restart_ticker(clock.generation()).await;
            }
            TapOutcome::Ignored => return GameSnapshot::from(&*clock),
        }

        self.shared.emit_snapshot(&clock)
    }

    pub async fn pause(&self) -> GameSnapshot {
        let mut clock = self.shared.clock.lock().await;
        if self.pause_locked(&mut clock).await {
            self.shared.emit_snapshot(&clock)
        } else {
            GameSnapshot::from(&*clock)
        }
    }

    /// End the match by hand. A started match that has not already timed
    /// out is recorded as a manual end; both clocks are reset either way.
    ///
    /// A failed history write is returned to the caller after the reset.
    pub async fn end_match(&self) -> Result<Option<MatchRecord>> {
        let finished = {
            let mut clock = self.shared.clock.lock().await;
            self.cancel_ticker().await;
            let needs_record = clock.end_match();
            let finished = needs_record.then(|| clock.clone());
            clock.reset();
            self.shared.emit_snapshot(&clock);
            finished
        };

        let Some(finished) = finished else {
            return Ok(None);
        };

        let record = self
            .shared
            .recorder
            .record(&finished, EndReason::ManualEnd, (self.shared.now)())
            .await?;
        if let Some(record) = record.clone() {
            self.shared.announce_saved(record);
        }
        Ok(record)
    }

    /// Applies a new time control immediately. A match in progress is
    /// dropped without a history record.
    pub async fn change_initial_duration(&self, seconds: u32) -> GameSnapshot {
        let mut clock = self.shared.clock.lock().await;
        self.cancel_ticker().await;
        if clock.match_started_at().is_some() {
            info!("Discarding match in progress for new time control");
        }
        clock.change_initial_duration(seconds);
        self.shared.emit_snapshot(&clock)
    }

    /// Renaming players pauses a running match first.
    pub async fn set_player_names(&self, top: &str, bottom: &str) -> GameSnapshot {
        let mut clock = self.shared.clock.lock().await;
        self.pause_locked(&mut clock).await;
        clock.set_players(PlayerNames::new(top, bottom));
        self.shared.emit_snapshot(&clock)
    }

    /// Screen teardown: stop ticking and release sounds. The controller can
    /// still be used afterwards.
    pub async fn close(&self) {
        {
            let mut clock = self.shared.clock.lock().await;
            if self.pause_locked(&mut clock).await {
                self.shared.emit_snapshot(&clock);
            }
            self.cancel_ticker().await;
        }
        self.shared.sounds.unload_all();
    }

    /// True while a schedule for the clock's current generation is running.
    pub async fn is_ticking(&self) -> bool {
        let clock = self.shared.clock.lock().await;
        self.ticker.lock().await.is_live_for(clock.generation())
    }

    async fn pause_locked(&self, clock: &mut DualClock) -> bool {
        let paused = clock.pause();
        if paused {
            self.cancel_ticker().await;
        }
        paused
    }

    async fn restart_ticker(&self, generation: u64) {
        let shared = self.shared.clone();
        let ticker = Ticker::spawn(self.tick_interval, generation, move |generation| {
            let shared = shared.clone();
            async move { shared.on_tick(generation).await }
        });
        self.ticker.lock().await.replace(ticker);
    }

    async fn cancel_ticker(&self) {
        self.ticker.lock().await.clear();
    }
}
