//! SQLite-backed history store

use crate::history::{HistoryRecord, NewHistoryRecord};
use crate::Result;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS download_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_url TEXT NOT NULL,
    title TEXT NOT NULL,
    file_path TEXT NOT NULL,
    downloaded_at INTEGER NOT NULL,
    file_size INTEGER,
    thumbnail_url TEXT
);
CREATE INDEX IF NOT EXISTS idx_download_history_downloaded_at
    ON download_history(downloaded_at DESC);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, source_url, title, file_path, downloaded_at, file_size, thumbnail_url FROM download_history";

/// Download history persisted in SQLite.
///
/// Every write publishes a fresh newest-first snapshot to subscribers.
#[derive(Debug)]
pub struct HistoryStore {
    conn: Mutex<Connection>,
    snapshots: watch::Sender<Vec<HistoryRecord>>,
}

impl HistoryStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!("Opening history database {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    /// Database that lives only as long as this store
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        let initial = query_all(&conn)?;
        let (snapshots, _) = watch::channel(initial);
        Ok(Self {
            conn: Mutex::new(conn),
            snapshots,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, conn: &Connection) -> Result<()> {
        let records = query_all(conn)?;
        self.snapshots.send_replace(records);
        Ok(())
    }

    /// Store a record and return its id
    pub fn insert(&self, record: &NewHistoryRecord) -> Result<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO download_history (source_url, title, file_path, downloaded_at, file_size, thumbnail_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.source_url,
                record.title,
                record.file_path.to_string_lossy(),
                record.downloaded_at.timestamp_millis(),
                record.file_size.map(|size| size as i64),
                record.thumbnail_url,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Recorded download {} as history entry {}", record.source_url, id);
        self.publish(&conn)?;
        Ok(id)
    }

    /// All records, newest first
    pub fn list(&self) -> Result<Vec<HistoryRecord>> {
        query_all(&self.lock())
    }

    pub fn get(&self, id: i64) -> Result<Option<HistoryRecord>> {
        let conn = self.lock();
        let record = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), params![id], from_row)
            .optional()?;
        Ok(record)
    }

    /// Delete one record; returns false if it did not exist
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.lock();
        let removed = conn.execute("DELETE FROM download_history WHERE id = ?1", params![id])?;
        if removed > 0 {
            self.publish(&conn)?;
        }
        Ok(removed > 0)
    }

    /// Delete every record, returning how many were removed
    pub fn clear(&self) -> Result<usize> {
        let conn = self.lock();
        let removed = conn.execute("DELETE FROM download_history", [])?;
        self.publish(&conn)?;
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM download_history", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Observe the record list; the receiver always holds the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<Vec<HistoryRecord>> {
        self.snapshots.subscribe()
    }
}

fn query_all(conn: &Connection) -> Result<Vec<HistoryRecord>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY downloaded_at DESC, id DESC", SELECT_COLUMNS))?;
    let records = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let file_path: String = row.get(3)?;
    let downloaded_at: i64 = row.get(4)?;
    let file_size: Option<i64> = row.get(5)?;

    Ok(HistoryRecord {
        id: row.get(0)?,
        source_url: row.get(1)?,
        title: row.get(2)?,
        file_path: PathBuf::from(file_path),
        downloaded_at: millis_to_datetime(downloaded_at),
        file_size: file_size.and_then(|size| u64::try_from(size).ok()),
        thumbnail_url: row.get(6)?,
    })
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn new_record(url: &str, minutes_ago: i64) -> NewHistoryRecord {
        NewHistoryRecord {
            source_url: url.to_string(),
            title: "Clip".to_string(),
            file_path: PathBuf::from(format!("/dl/{}.mp4", minutes_ago)),
            downloaded_at: Utc::now() - Duration::minutes(minutes_ago),
            file_size: Some(1024),
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = HistoryStore::open_in_memory().unwrap();
        let id = store.insert(&new_record("https://youtu.be/a", 0)).unwrap();

        let record = store.get(id).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.source_url, "https://youtu.be/a");
        assert_eq!(record.file_size, Some(1024));
        assert_eq!(record.thumbnail_url, None);
        assert!(store.get(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_list_is_newest_first() {
        let store = HistoryStore::open_in_memory().unwrap();
        store.insert(&new_record("https://youtu.be/old", 30)).unwrap();
        store.insert(&new_record("https://youtu.be/new", 1)).unwrap();
        store.insert(&new_record("https://youtu.be/mid", 10)).unwrap();

        let urls: Vec<_> = store.list().unwrap().into_iter().map(|r| r.source_url).collect();
        assert_eq!(
            urls,
            vec!["https://youtu.be/new", "https://youtu.be/mid", "https://youtu.be/old"]
        );
    }

    #[test]
    fn test_same_timestamp_orders_by_id() {
        let store = HistoryStore::open_in_memory().unwrap();
        let mut first = new_record("https://youtu.be/first", 0);
        let mut second = new_record("https://youtu.be/second", 0);
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        first.downloaded_at = at;
        second.downloaded_at = at;
        store.insert(&first).unwrap();
        store.insert(&second).unwrap();

        let list = store.list().unwrap();
        assert_eq!(list[0].source_url, "https://youtu.be/second");
        assert_eq!(list[0].downloaded_at, at);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let store = HistoryStore::open_in_memory().unwrap();
        let a = store.insert(&new_record("https://youtu.be/a", 2)).unwrap();
        let b = store.insert(&new_record("https://youtu.be/b", 1)).unwrap();

        assert!(assert_ok!(store.delete(a)));
        assert!(!assert_ok!(store.delete(a)));
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.list().unwrap()[0].id, b);
    }

    #[test]
    fn test_clear() {
        let store = HistoryStore::open_in_memory().unwrap();
        store.insert(&new_record("https://youtu.be/a", 2)).unwrap();
        store.insert(&new_record("https://youtu.be/b", 1)).unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn test_subscribers_see_every_write() {
        let store = HistoryStore::open_in_memory().unwrap();
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        let id = store.insert(&new_record("https://youtu.be/a", 0)).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update()[0].id, id);

        store.delete(id).unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");
        std::fs::write(dir.path().join("blocker"), b"").unwrap();
        assert_err!(HistoryStore::open(&dir.path().join("blocker").join("history.db")));

        let id = {
            let store = HistoryStore::open(&path).unwrap();
            store.insert(&new_record("https://youtu.be/a", 0)).unwrap()
        };

        let store = HistoryStore::open(&path).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().source_url, "https://youtu.be/a");
        assert_eq!(store.subscribe().borrow().len(), 1);
    }
}
