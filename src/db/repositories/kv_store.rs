use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::Database;

/// Whole-document key-value access. Each `set_item` replaces the stored
/// value in one statement, so a failed write leaves the previous document.
impl Database {
    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .with_context(|| format!("failed to read key {key}"))?;
            Ok(value)
        })
        .await
    }

    pub async fn set_item(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write key {key}"))?;
            Ok(())
        })
        .await
    }

    /// Removing a missing key is not an error.
    pub async fn remove_item(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])
                .with_context(|| format!("failed to remove key {key}"))?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.get_item("soundEnabled").await.unwrap(), None);

        db.set_item("soundEnabled", "false".into()).await.unwrap();
        assert_eq!(
            db.get_item("soundEnabled").await.unwrap().as_deref(),
            Some("false")
        );

        db.set_item("soundEnabled", "true".into()).await.unwrap();
        assert_eq!(
            db.get_item("soundEnabled").await.unwrap().as_deref(),
            Some("true")
        );

        db.remove_item("soundEnabled").await.unwrap();
        db.remove_item("soundEnabled").await.unwrap();
        assert_eq!(db.get_item("soundEnabled").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chessclock.sqlite3");

        {
            let db = Database::new(path.clone()).unwrap();
            assert_eq!(db.path(), Some(path.as_path()));
            db.set_item("chessTimerHistory", "[]".into()).await.unwrap();
        }

        let reopened = Database::new(path).unwrap();
        assert_eq!(
            reopened.get_item("chessTimerHistory").await.unwrap().as_deref(),
            Some("[]")
        );
    }
}
