use std::{future::Future, ops::ControlFlow, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;

/// Handle to a recurring tick task.
///
/// The first tick fires one full period after spawning. Cancelling (or
/// dropping) the handle stops the task before its next tick; the callback
/// can also stop the schedule itself by returning `ControlFlow::Break`.
pub struct Ticker {
    generation: u64,
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn<F, Fut>(period: Duration, generation: u64, mut on_tick: F) -> Self
    where
        F: FnMut(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                if token.is_cancelled() {
                    break;
                }
                if on_tick(generation).await.is_break() {
                    break;
                }
            }
        });

        Self {
            generation,
            cancel_token,
            handle,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// Holds at most one live [`Ticker`]. Replacing or clearing the slot cancels
/// whatever was there before.
#[derive(Default)]
pub struct TickerSlot {
    current: Option<Ticker>,
}

impl TickerSlot {
    pub fn replace(&mut self, ticker: Ticker) {
        if let Some(previous) = self.current.replace(ticker) {
            previous.cancel();
        }
    }

    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
    }

    /// A schedule is live for `generation` when it was spawned for that
    /// generation and is neither cancelled nor finished.
    pub fn is_live_for(&self, generation: u64) -> bool {
        self.current
            .as_ref()
            .map(|ticker| {
                ticker.generation() == generation
                    && !ticker.is_finished()
                    && !ticker.cancel_token.is_cancelled()
            })
            .unwrap_or(false)
    }
}
