use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use abacus_core::{AbacusError, AbacusResult, HistoryStore, HISTORY_CAPACITY};

use crate::schema::init_db;

pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    pub fn new(path: &Path) -> AbacusResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| db_error(format!("cannot create db directory: {e}")))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| db_error(format!("cannot open database: {e}")))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| db_error(e.to_string()))?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> AbacusResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| db_error(format!("cannot open in-memory db: {e}")))?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> AbacusResult<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM results", [], |row| {
                row.get::<_, usize>(0)
            })
            .map_err(|e| db_error(e.to_string()))
    }

    pub fn stats(&self) -> AbacusResult<HistoryStats> {
        let total_results = self.count()?;

        let last_saved: Option<DateTime<Utc>> = self
            .conn
            .query_row("SELECT MAX(saved_at) FROM results", [], |row| {
                row.get::<_, Option<String>>(0)
            })
            .map_err(|e| db_error(e.to_string()))?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|d| d.with_timezone(&Utc));

        Ok(HistoryStats {
            total_results,
            last_saved,
        })
    }
}

fn db_error(message: String) -> AbacusError {
    AbacusError::Persistence(message)
}

#[derive(Debug, Clone)]
pub struct HistoryStats {
    pub total_results: usize,
    pub last_saved: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// HistoryStore impl
// ---------------------------------------------------------------------------

impl HistoryStore for SqliteHistoryStore {
    fn load(&mut self) -> AbacusResult<Vec<f64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM results ORDER BY position ASC LIMIT ?1")
            .map_err(|e| db_error(e.to_string()))?;
        let values = stmt
            .query_map(params![HISTORY_CAPACITY], |row| row.get::<_, f64>(0))
            .map_err(|e| db_error(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| db_error(e.to_string()))?;
        debug!(count = values.len(), "loaded history");
        Ok(values)
    }

    fn save(&mut self, values: &[f64]) -> AbacusResult<()> {
        let saved_at = Utc::now().to_rfc3339();
        let tx = self
            .conn
            .transaction()
            .map_err(|e| db_error(e.to_string()))?;
        tx.execute("DELETE FROM results", [])
            .map_err(|e| db_error(e.to_string()))?;
        {
            let mut stmt = tx
                .prepare("INSERT INTO results (position, value, saved_at) VALUES (?1, ?2, ?3)")
                .map_err(|e| db_error(e.to_string()))?;
            for (position, value) in values.iter().enumerate() {
                stmt.execute(params![position, value, saved_at])
                    .map_err(|e| db_error(e.to_string()))?;
            }
        }
        tx.commit().map_err(|e| db_error(e.to_string()))?;
        Ok(())
    }

    fn clear(&mut self) -> AbacusResult<()> {
        self.conn
            .execute("DELETE FROM results", [])
            .map_err(|e| db_error(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abacus_core::Calculator;

    fn test_store() -> SqliteHistoryStore {
        SqliteHistoryStore::in_memory().unwrap()
    }

    #[test]
    fn test_empty_load() {
        let mut store = test_store();
        assert!(store.load().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_load_keeps_order() {
        let mut store = test_store();
        store.save(&[3.5, -2.0, 1e-12]).unwrap();
        assert_eq!(store.load().unwrap(), vec![3.5, -2.0, 1e-12]);
    }

    #[test]
    fn test_save_replaces_snapshot() {
        let mut store = test_store();
        store.save(&[1.0, 2.0, 3.0]).unwrap();
        store.save(&[9.0]).unwrap();
        assert_eq!(store.load().unwrap(), vec![9.0]);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_clear() {
        let mut store = test_store();
        store.save(&[1.0, 2.0]).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let mut store = test_store();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total_results, 0);
        assert!(stats.last_saved.is_none());

        store.save(&[1.0, 2.0]).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total_results, 2);
        assert!(stats.last_saved.is_some());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");

        {
            let mut store = SqliteHistoryStore::new(&path).unwrap();
            store.save(&[42.0, 7.0]).unwrap();
        }

        let mut store = SqliteHistoryStore::new(&path).unwrap();
        assert_eq!(store.load().unwrap(), vec![42.0, 7.0]);
    }

    #[test]
    fn test_engine_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");

        {
            let store = SqliteHistoryStore::new(&path).unwrap();
            let mut calc = Calculator::with_store(Box::new(store), Box::new(|_| {})).unwrap();
            calc.press_keys("6*7=").unwrap();
            calc.press_keys("+8=").unwrap();
        }

        let store = SqliteHistoryStore::new(&path).unwrap();
        let calc = Calculator::with_store(Box::new(store), Box::new(|_| {})).unwrap();
        assert_eq!(calc.history().to_vec(), vec![50.0, 42.0]);
    }
}
