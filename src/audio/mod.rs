pub mod engine;
pub mod tone;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex,
};

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::settings::SettingsStore;
use engine::AudioEngine;
use tone::Note;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SoundId {
    Click,
    TimerStart,
    TimerEnd,
    SwitchPlayer,
}

static CLICK: [Note; 1] = [Note::new(1_200.0, 30)];
static TIMER_START: [Note; 2] = [Note::new(660.0, 90), Note::new(990.0, 120)];
static TIMER_END: [Note; 3] = [
    Note::new(880.0, 200),
    Note::new(660.0, 200),
    Note::new(440.0, 400),
];
static SWITCH_PLAYER: [Note; 1] = [Note::new(800.0, 60)];

impl SoundId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundId::Click => "click",
            SoundId::TimerStart => "timer_start",
            SoundId::TimerEnd => "timer_end",
            SoundId::SwitchPlayer => "switch_player",
        }
    }

    pub fn notes(&self) -> &'static [Note] {
        match self {
            SoundId::Click => &CLICK,
            SoundId::TimerStart => &TIMER_START,
            SoundId::TimerEnd => &TIMER_END,
            SoundId::SwitchPlayer => &SWITCH_PLAYER,
        }
    }
}

/// Sound effects for one app instance.
///
/// The audio engine is acquired on the first sound and released by
/// [`SoundBoard::unload_all`] or when the board is dropped.
pub struct SoundBoard {
    settings: SettingsStore,
    engine: Mutex<Option<AudioEngine>>,
    dispatched: AtomicU64,
}

impl SoundBoard {
    pub fn new(settings: SettingsStore) -> Self {
        Self {
            settings,
            engine: Mutex::new(None),
            dispatched: AtomicU64::new(0),
        }
    }

    /// Does nothing while sound is disabled in settings. Playback failures
    /// are logged and otherwise ignored.
    pub fn play(&self, sound: SoundId) {
        if !self.settings.sound_enabled() {
            return;
        }

        let mut guard = match self.engine.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if guard.is_none() {
            match AudioEngine::start() {
                Ok(engine) => *guard = Some(engine),
                Err(err) => {
                    error!("Error playing sound {}: {}", sound.as_str(), err);
                    return;
                }
            }
        }

        if let Some(engine) = guard.as_ref() {
            match engine.play(sound) {
                Ok(()) => {
                    self.dispatched.fetch_add(1, Ordering::SeqCst);
                }
                Err(err) => error!("Error playing sound {}: {}", sound.as_str(), err),
            }
        }
    }

    /// Number of sounds handed to the engine so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        match self.engine.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    /// Safe to call any number of times.
    pub fn unload_all(&self) {
        let engine = match self.engine.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if engine.is_some() {
            info!("Unloading sounds");
        }
        drop(engine);
    }
}

impl Drop for SoundBoard {
    fn drop(&mut self) {
        self.unload_all();
    }
}
