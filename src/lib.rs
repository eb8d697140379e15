pub mod audio;
pub mod clock;
pub mod config;
pub mod db;
pub mod events;
pub mod history;
pub mod presets;
pub mod settings;
pub mod utils;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use log::info;
use tokio::sync::broadcast;

use audio::{SoundBoard, SoundId};
use clock::{GameController, PracticeController};
use config::AppConfig;
use db::Database;
use events::{ClockEvent, Notice};
use history::{HistoryStore, MatchRecord, MatchRecorder};
use presets::{PresetSelection, PresetSource};
use settings::SettingsStore;

pub use utils::logging::init_logging;

/// Everything one running app needs: storage, settings, sounds and the two
/// timer screens. Hosts keep one instance and forward UI actions to it.
pub struct ChessClockApp {
    config: AppConfig,
    db: Database,
    settings: SettingsStore,
    history: HistoryStore,
    sounds: Arc<SoundBoard>,
    events: broadcast::Sender<ClockEvent>,
    game: GameController,
    practice: PracticeController,
}

impl ChessClockApp {
    /// Load config from `data_dir`, set up logging and open the database there.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let config = AppConfig::load(data_dir)?;
        init_logging(&config.log_level);
        info!("Chess clock starting up...");

        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("failed to create data directory {}", config.data_dir.display())
        })?;
        let database = Database::new(config.database_path())?;
        Self::with_database(config, database).await
    }

    pub async fn with_database(config: AppConfig, db: Database) -> Result<Self> {
        let settings = SettingsStore::load(db.clone()).await?;
        let history = HistoryStore::new(db.clone());
        let sounds = Arc::new(SoundBoard::new(settings.clone()));
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let game = GameController::new(
            config.initial_seconds,
            config.tick_interval(),
            MatchRecorder::new(history.clone()),
            sounds.clone(),
            events.clone(),
        );
        let practice = PracticeController::new(
            config.initial_seconds,
            config.tick_interval(),
            events.clone(),
        );

        Ok(Self {
            config,
            db,
            settings,
            history,
            sounds,
            events,
            game,
            practice,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClockEvent> {
        self.events.subscribe()
    }

    pub fn game(&self) -> &GameController {
        &self.game
    }

    pub fn practice(&self) -> &PracticeController {
        &self.practice
    }

    pub fn sounds(&self) -> &SoundBoard {
        &self.sounds
    }

    /// Route a preset picked on the preset screen back to the screen that
    /// opened it.
    pub async fn apply_preset(&self, selection: &PresetSelection) -> Result<u32> {
        let seconds = selection.seconds()?;
        match selection.source {
            PresetSource::Game => {
                self.game.change_initial_duration(seconds).await;
            }
            PresetSource::Practice => {
                self.practice.change_initial_duration(seconds).await;
            }
        }
        info!(
            "Preset {} applied to {:?}",
            selection.selected_time, selection.source
        );
        Ok(seconds)
    }

    pub async fn match_history(&self) -> Result<Vec<MatchRecord>> {
        self.history.read_all().await.map_err(|err| {
            self.notify("Error", "Failed to load match history.");
            err
        })
    }

    pub async fn clear_history(&self) -> Result<()> {
        match self.history.clear_all().await {
            Ok(()) => {
                self.notify("Success", "Match history cleared successfully.");
                Ok(())
            }
            Err(err) => {
                self.notify("Error", "Failed to clear match history.");
                Err(err)
            }
        }
    }

    pub fn sound_enabled(&self) -> bool {
        self.settings.sound_enabled()
    }

    pub async fn set_sound_enabled(&self, enabled: bool) -> Result<()> {
        self.settings.set_sound_enabled(enabled).await
    }

    /// The settings screen's test button.
    pub fn play_test_sound(&self) {
        if !self.settings.sound_enabled() {
            self.notify("Sound is disabled", "Enable sound to hear the test.");
            return;
        }
        self.sounds.play(SoundId::Click);
    }

    /// Stop both screens and release audio.
    pub async fn shutdown(&self) {
        self.game.close().await;
        self.practice.close().await;
        self.sounds.unload_all();
        info!("Chess clock shut down");
    }

    fn notify(&self, title: &str, message: &str) {
        let _ = self
            .events
            .send(ClockEvent::Notice(Notice::new(title, message)));
    }
}
