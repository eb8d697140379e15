use anyhow::{Context, Result};
use log::info;

use crate::db::Database;

use super::record::MatchRecord;

pub const HISTORY_KEY: &str = "chessTimerHistory";

/// Most-recent-first list of finished matches, stored as one JSON document.
#[derive(Clone)]
pub struct HistoryStore {
    db: Database,
}

impl HistoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn read_all(&self) -> Result<Vec<MatchRecord>> {
        match self.db.get_item(HISTORY_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).context("stored match history is malformed"),
            None => Ok(Vec::new()),
        }
    }

    /// Prepends `record` and rewrites the whole list.
    pub async fn append(&self, record: MatchRecord) -> Result<()> {
        let mut records = self.read_all().await?;
        let record_id = record.id;
        records.insert(0, record);

        let serialized = serde_json::to_string(&records)?;
        self.db
            .set_item(HISTORY_KEY, serialized)
            .await
            .context("failed to save match history")?;

        info!("Saved match {} ({} in history)", record_id, records.len());
        Ok(())
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.db
            .remove_item(HISTORY_KEY)
            .await
            .context("failed to clear match history")?;
        info!("Match history cleared");
        Ok(())
    }
}
