use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::assets::error::AssetError;
use crate::assets::types::AssetResponse;

/// Key under which the live version name is kept in `asset_meta`
const LIVE_VERSION_KEY: &str = "live_version";

/// Trait for storing cache versions and their entries
pub trait AssetStorage: Send + Sync + 'static {
    /// Names of all stored versions, oldest first
    fn versions(&self) -> Result<Vec<String>, AssetError>;

    /// Stores `entries` as version `name`, replacing any previous content
    /// of that version in one transaction
    fn put_version(&self, name: &str, entries: &[AssetResponse]) -> Result<(), AssetError>;

    /// Deletes a version and its entries; returns false if it did not exist
    fn delete_version(&self, name: &str) -> Result<bool, AssetError>;

    /// Looks up `url` in version `name`
    fn lookup(&self, name: &str, url: &str) -> Result<Option<AssetResponse>, AssetError>;

    fn live_version(&self) -> Result<Option<String>, AssetError>;

    fn set_live_version(&self, name: &str) -> Result<(), AssetError>;
}

pub struct SqliteAssetStorage {
    conn: Mutex<Connection>,
}

impl SqliteAssetStorage {
    pub fn new(db_path: &Path) -> Result<Self, AssetError> {
        info!("Initializing asset cache database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.create_schema()?;

        Ok(storage)
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, AssetError> {
        self.conn.lock().map_err(|_| AssetError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), AssetError> {
        debug!("Creating asset cache schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS asset_versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS asset_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                version_id INTEGER NOT NULL,
                url TEXT NOT NULL,
                status INTEGER NOT NULL,
                content_type TEXT,
                body BLOB NOT NULL,
                FOREIGN KEY (version_id) REFERENCES asset_versions(id) ON DELETE CASCADE,
                UNIQUE(version_id, url)
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS asset_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Ok(())
    }
}

impl AssetStorage for SqliteAssetStorage {
    fn versions(&self) -> Result<Vec<String>, AssetError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT name FROM asset_versions ORDER BY id")?;

        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    fn put_version(&self, name: &str, entries: &[AssetResponse]) -> Result<(), AssetError> {
        debug!("Storing {} entries for cache version {}", entries.len(), name);

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO asset_versions (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            [name],
        )?;

        let version_id: i64 = tx.query_row(
            "SELECT id FROM asset_versions WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;

        tx.execute(
            "DELETE FROM asset_entries WHERE version_id = ?1",
            [version_id],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO asset_entries (version_id, url, status, content_type, body)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for entry in entries {
                stmt.execute((
                    version_id,
                    &entry.url,
                    entry.status,
                    &entry.content_type,
                    &entry.body,
                ))?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_version(&self, name: &str) -> Result<bool, AssetError> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            DELETE FROM asset_entries
            WHERE version_id IN (SELECT id FROM asset_versions WHERE name = ?1)
            "#,
            [name],
        )?;
        let deleted = tx.execute("DELETE FROM asset_versions WHERE name = ?1", [name])?;

        tx.commit()?;
        Ok(deleted > 0)
    }

    fn lookup(&self, name: &str, url: &str) -> Result<Option<AssetResponse>, AssetError> {
        let conn = self.lock_conn()?;
        let response = conn
            .query_row(
                r#"
                SELECT e.status, e.content_type, e.body FROM asset_entries e
                JOIN asset_versions v ON e.version_id = v.id
                WHERE v.name = ?1 AND e.url = ?2
                "#,
                (name, url),
                |row| {
                    Ok(AssetResponse {
                        url: url.to_string(),
                        status: row.get(0)?,
                        content_type: row.get(1)?,
                        body: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(response)
    }

    fn live_version(&self) -> Result<Option<String>, AssetError> {
        let conn = self.lock_conn()?;
        let live = conn
            .query_row(
                "SELECT value FROM asset_meta WHERE key = ?1",
                [LIVE_VERSION_KEY],
                |row| row.get(0),
            )
            .optional()?;

        Ok(live)
    }

    fn set_live_version(&self, name: &str) -> Result<(), AssetError> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO asset_meta (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            (LIVE_VERSION_KEY, name),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, SqliteAssetStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteAssetStorage::new(&temp_dir.path().join("assets.db")).unwrap();
        (temp_dir, storage)
    }

    fn entry(url: &str, body: &str) -> AssetResponse {
        AssetResponse {
            url: url.to_string(),
            status: 200,
            content_type: Some("text/plain".to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn put_version_then_lookup_returns_entry() {
        let (_temp_dir, storage) = storage();

        storage
            .put_version("v1", &[entry("https://example.com/app.js", "v1 code")])
            .unwrap();

        assert_eq!(
            storage.lookup("v1", "https://example.com/app.js").unwrap(),
            Some(entry("https://example.com/app.js", "v1 code"))
        );
        assert_eq!(storage.lookup("v1", "https://example.com/other.js").unwrap(), None);
        assert_eq!(storage.lookup("v2", "https://example.com/app.js").unwrap(), None);
    }

    #[test]
    fn put_version_replaces_previous_entries_of_same_version() {
        let (_temp_dir, storage) = storage();

        storage
            .put_version(
                "v1",
                &[
                    entry("https://example.com/app.js", "old"),
                    entry("https://example.com/old.css", "old"),
                ],
            )
            .unwrap();
        storage
            .put_version("v1", &[entry("https://example.com/app.js", "new")])
            .unwrap();

        assert_eq!(storage.versions().unwrap(), vec!["v1".to_string()]);
        assert_eq!(
            storage.lookup("v1", "https://example.com/app.js").unwrap(),
            Some(entry("https://example.com/app.js", "new"))
        );
        assert_eq!(storage.lookup("v1", "https://example.com/old.css").unwrap(), None);
    }

    #[test]
    fn versions_are_listed_in_creation_order() {
        let (_temp_dir, storage) = storage();

        storage.put_version("v2", &[]).unwrap();
        storage.put_version("v1", &[]).unwrap();

        assert_eq!(
            storage.versions().unwrap(),
            vec!["v2".to_string(), "v1".to_string()]
        );
    }

    #[test]
    fn delete_version_removes_entries() {
        let (_temp_dir, storage) = storage();
        storage
            .put_version("v1", &[entry("https://example.com/", "index")])
            .unwrap();

        assert!(storage.delete_version("v1").unwrap());
        assert!(!storage.delete_version("v1").unwrap());
        assert!(storage.versions().unwrap().is_empty());
        assert_eq!(storage.lookup("v1", "https://example.com/").unwrap(), None);
    }

    #[test]
    fn live_version_round_trips_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("assets.db");

        {
            let storage = SqliteAssetStorage::new(&db_path).unwrap();
            assert_eq!(storage.live_version().unwrap(), None);
            storage.set_live_version("v1").unwrap();
            storage.set_live_version("v2").unwrap();
        }

        let storage = SqliteAssetStorage::new(&db_path).unwrap();
        assert_eq!(storage.live_version().unwrap(), Some("v2".to_string()));
    }
}
