use anyhow::{Context, Result};
use log::warn;
use std::sync::{Arc, RwLock};

use crate::db::Database;

pub const SOUND_ENABLED_KEY: &str = "soundEnabled";

#[derive(Debug, Clone, Copy)]
struct UserSettings {
    sound_enabled: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
        }
    }
}

/// User preferences cached in memory and written through to the key-value
/// store on every change.
#[derive(Clone)]
pub struct SettingsStore {
    db: Database,
    data: Arc<RwLock<UserSettings>>,
}

impl SettingsStore {
    pub async fn load(db: Database) -> Result<Self> {
        let data = read_settings(&db).await?;
        Ok(Self {
            db,
            data: Arc::new(RwLock::new(data)),
        })
    }

    pub fn sound_enabled(&self) -> bool {
        match self.data.read() {
            Ok(guard) => guard.sound_enabled,
            Err(poisoned) => poisoned.into_inner().sound_enabled,
        }
    }

    pub async fn set_sound_enabled(&self, enabled: bool) -> Result<()> {
        let serialized = serde_json::to_string(&enabled)?;
        self.db
            .set_item(SOUND_ENABLED_KEY, serialized)
            .await
            .context("failed to save sound setting")?;

        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.sound_enabled = enabled;
        Ok(())
    }

    pub async fn reload(&self) -> Result<()> {
        let data = read_settings(&self.db).await?;
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = data;
        Ok(())
    }
}

async fn read_settings(db: &Database) -> Result<UserSettings> {
    let mut settings = UserSettings::default();
    if let Some(raw) = db
        .get_item(SOUND_ENABLED_KEY)
        .await
        .context("failed to read sound setting")?
    {
        match serde_json::from_str::<bool>(&raw) {
            Ok(enabled) => settings.sound_enabled = enabled,
            Err(err) => warn!("Ignoring unreadable sound setting {raw:?}: {err}"),
        }
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sound_defaults_to_enabled() {
        let settings = SettingsStore::load(Database::in_memory().unwrap())
            .await
            .unwrap();
        assert!(settings.sound_enabled());
    }

    #[tokio::test]
    async fn test_set_persists_as_json_boolean() {
        let db = Database::in_memory().unwrap();
        let settings = SettingsStore::load(db.clone()).await.unwrap();

        settings.set_sound_enabled(false).await.unwrap();
        assert!(!settings.sound_enabled());
        assert_eq!(
            db.get_item(SOUND_ENABLED_KEY).await.unwrap().as_deref(),
            Some("false")
        );

        let reloaded = SettingsStore::load(db).await.unwrap();
        assert!(!reloaded.sound_enabled());
    }

    #[tokio::test]
    async fn test_unreadable_value_falls_back_to_default() {
        let db = Database::in_memory().unwrap();
        db.set_item(SOUND_ENABLED_KEY, "\"loud\"".into()).await.unwrap();
        let settings = SettingsStore::load(db.clone()).await.unwrap();
        assert!(settings.sound_enabled());

        db.set_item(SOUND_ENABLED_KEY, "false".into()).await.unwrap();
        settings.reload().await.unwrap();
        assert!(!settings.sound_enabled());
    }
}
