use std::{ops::ControlFlow, sync::Arc, time::Duration};

use log::debug;
use tokio::sync::{broadcast, Mutex};

use crate::events::{ClockEvent, PracticeSnapshot};

use super::{
    practice::PracticeClock,
    state::TickOutcome,
    ticker::{Ticker, TickerSlot},
};

/// Single-timer screen. Nothing here touches history.
///
/// The ticker slot is only changed under the clock lock, slot lock second.
#[derive(Clone)]
pub struct PracticeController {
    clock: Arc<Mutex<PracticeClock>>,
    events: broadcast::Sender<ClockEvent>,
    ticker: Arc<Mutex<TickerSlot>>,
    tick_interval: Duration,
}

impl PracticeController {
    pub fn new(
        initial_seconds: u32,
        tick_interval: Duration,
        events: broadcast::Sender<ClockEvent>,
    ) -> Self {
        Self {
            clock: Arc::new(Mutex::new(PracticeClock::new(initial_seconds))),
            events,
            ticker: Arc::new(Mutex::new(TickerSlot::default())),
            tick_interval,
        }
    }

    pub async fn snapshot(&self) -> PracticeSnapshot {
        let clock = self.clock.lock().await;
        PracticeSnapshot::from(&*clock)
    }

    /// Tap on the timer: start when stopped, pause when running.
    pub async fn toggle(&self) -> PracticeSnapshot {
        let mut clock = self.clock.lock().await;
        if clock.toggle() {
            self.start_ticker(clock.generation()).await;
        } else {
            self.cancel_ticker().await;
        }
        self.emit_snapshot(&clock)
    }

    pub async fn pause(&self) -> PracticeSnapshot {
        let mut clock = self.clock.lock().await;
        self.cancel_ticker().await;
        clock.pause();
        self.emit_snapshot(&clock)
    }

    /// The "End" button: stop and go back to the configured duration.
    pub async fn reset(&self) -> PracticeSnapshot {
        let mut clock = self.clock.lock().await;
        self.cancel_ticker().await;
        clock.reset();
        self.emit_snapshot(&clock)
    }

    pub async fn change_initial_duration(&self, seconds: u32) -> PracticeSnapshot {
        let mut clock = self.clock.lock().await;
        self.cancel_ticker().await;
        clock.change_initial_duration(seconds);
        self.emit_snapshot(&clock)
    }

    pub async fn close(&self) {
        self.pause().await;
    }

    pub async fn is_ticking(&self) -> bool {
        let clock = self.clock.lock().await;
        self.ticker.lock().await.is_live_for(clock.generation())
    }

    async fn cancel_ticker(&self) {
        self.ticker.lock().await.clear();
    }

    fn emit_snapshot(&self, clock: &PracticeClock) -> PracticeSnapshot {
        let snapshot = PracticeSnapshot::from(clock);
        let _ = self
            .events
            .send(ClockEvent::PracticeChanged(snapshot.clone()));
        snapshot
    }

    async fn start_ticker(&self, generation: u64) {
        let clock = self.clock.clone();
        let events = self.events.clone();
        let ticker = Ticker::spawn(self.tick_interval, generation, move |generation| {
            let clock = clock.clone();
            let events = events.clone();
            async move {
                let mut clock = clock.lock().await;
                let outcome = clock.tick(generation);
                if outcome != TickOutcome::Ignored {
                    let _ = events.send(ClockEvent::PracticeChanged(PracticeSnapshot::from(
                        &*clock,
                    )));
                }
                match outcome {
                    TickOutcome::Counted { .. } => ControlFlow::Continue(()),
                    TickOutcome::Expired => {
                        debug!("Practice timer finished");
                        ControlFlow::Break(())
                    }
                    TickOutcome::Ignored => ControlFlow::Break(()),
                }
            }
        });
        self.ticker.lock().await.replace(ticker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time;

    fn controller(initial_seconds: u32) -> PracticeController {
        let (tx, _rx) = broadcast::channel(16);
        PracticeController::new(initial_seconds, Duration::from_secs(1), tx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_and_expires() {
        let practice = controller(3);
        let snapshot = practice.toggle().await;
        assert!(snapshot.clock.is_running);

        time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(practice.snapshot().await.clock.remaining_seconds, 2);

        time::sleep(Duration::from_secs(5)).await;
        let snapshot = practice.snapshot().await;
        assert_eq!(snapshot.clock.display, "00:00");
        assert!(snapshot.clock.is_expired);
        assert!(!snapshot.clock.is_running);
        assert!(!practice.is_ticking().await);

        // An expired clock cannot be restarted until reset
        assert!(!practice.toggle().await.clock.is_running);
        let snapshot = practice.reset().await;
        assert_eq!(snapshot.clock.remaining_seconds, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_pauses() {
        let practice = controller(60);
        practice.toggle().await;
        time::sleep(Duration::from_millis(2_500)).await;
        let snapshot = practice.toggle().await;
        assert!(!snapshot.clock.is_running);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(practice.snapshot().await.clock.remaining_seconds, 58);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_change_while_running() {
        let practice = controller(60);
        practice.toggle().await;
        time::sleep(Duration::from_millis(1_500)).await;

        let snapshot = practice.change_initial_duration(1_800).await;
        assert_eq!(snapshot.clock.display, "30:00");
        assert!(!snapshot.clock.is_running);

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(practice.snapshot().await.clock.remaining_seconds, 1_800);
        assert_eq!(practice.reset().await.initial_seconds, 1_800);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_toggles_keep_ticker_in_step() {
        let practice = controller(600);
        for _ in 0..200 {
            let handles: Vec<_> = (0..3)
                .map(|_| {
                    let practice = practice.clone();
                    tokio::spawn(async move {
                        practice.toggle().await;
                    })
                })
                .collect();
            for handle in handles {
                handle.await.unwrap();
            }

            let running = practice.snapshot().await.clock.is_running;
            assert_eq!(practice.is_ticking().await, running);
        }
        practice.close().await;
        assert!(!practice.is_ticking().await);
    }
}
