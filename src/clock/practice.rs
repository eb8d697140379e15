use super::state::{Clock, TickOutcome, DEFAULT_INITIAL_SECONDS};

/// Single countdown used on the practice screen. Practice sessions never
/// produce history records.
#[derive(Debug, Clone)]
pub struct PracticeClock {
    clock: Clock,
    generation: u64,
}

impl Default for PracticeClock {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_SECONDS)
    }
}

impl PracticeClock {
    pub fn new(initial_seconds: u32) -> Self {
        Self {
            clock: Clock::new(initial_seconds),
            generation: 0,
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Start when stopped, pause when running. Returns the new running state.
    pub fn toggle(&mut self) -> bool {
        if self.clock.is_running() {
            self.pause();
        } else if self.clock.start() {
            self.generation += 1;
        }
        self.clock.is_running()
    }

    pub fn pause(&mut self) {
        if self.clock.is_running() {
            self.clock.stop();
            self.generation += 1;
        }
    }

    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        if generation != self.generation {
            return TickOutcome::Ignored;
        }
        let outcome = self.clock.tick();
        if outcome == TickOutcome::Expired {
            self.generation += 1;
        }
        outcome
    }

    pub fn reset(&mut self) {
        let initial = self.clock.initial_seconds();
        self.clock.reset(initial);
        self.generation += 1;
    }

    pub fn change_initial_duration(&mut self, seconds: u32) {
        self.clock.reset(seconds);
        self.generation += 1;
    }
}
