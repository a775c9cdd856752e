use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::sample::{Sample, SampleRepository};
use crate::shared::errors::StoreError;
use crate::shared::types::CalendarDate;

pub type DbPool = Pool<SqliteConnectionManager>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS prices(
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    price REAL NOT NULL,
    date TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    currency TEXT NOT NULL,
    name TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_prices_date ON prices(date, id);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Append-only `prices` table behind an r2d2 connection pool.
///
/// Writers are serialized by SQLite itself (WAL journal, busy timeout), so
/// overlapping ingestion cycles and request-path backfills need no
/// application-side lock.
#[derive(Clone)]
pub struct SqliteSampleStore {
    pool: DbPool,
}

impl SqliteSampleStore {
    /// Open (or create) the database file. With `reset` the previous file is
    /// removed first so every process starts with an empty history.
    pub fn open(path: &Path, pool_size: u32, reset: bool) -> Result<Self, StoreError> {
        if reset {
            remove_database_files(path)?;
        }

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
            conn.pragma_update(None, "synchronous", "NORMAL")
        });
        let pool = Pool::builder().max_size(pool_size).build(manager)?;

        let store = Self { pool };
        store.setup_tables()?;
        info!("Sample store ready at {}", path.display());
        Ok(store)
    }

    /// Private in-memory database. A single pooled connection keeps every
    /// caller on the same database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .max_lifetime(None)
            .idle_timeout(None)
            .build(manager)?;

        let store = Self { pool };
        store.setup_tables()?;
        Ok(store)
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn setup_tables(&self) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::Open(format!("schema setup failed: {}", e)))?;
        debug!("prices table created");
        Ok(())
    }

    async fn with_conn<T, F>(&self, f: F, wrap: fn(String) -> StoreError) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| wrap(e.to_string()))?;
            f(&*conn).map_err(|e| wrap(e.to_string()))
        })
        .await
        .map_err(|e| wrap(format!("storage task failed: {}", e)))?
    }
}

#[async_trait]
impl SampleRepository for SqliteSampleStore {
    async fn insert(&self, sample: &Sample) -> Result<(), StoreError> {
        let sample = sample.clone();
        self.with_conn(
            move |conn| {
                conn.execute(
                    "INSERT INTO prices(price, date, currency, name, timestamp) VALUES(?1, ?2, ?3, ?4, ?5)",
                    params![
                        sample.price,
                        sample.date.to_string(),
                        sample.currency,
                        sample.asset,
                        sample.timestamp
                    ],
                )
                .map(|_| ())
            },
            StoreError::Write,
        )
        .await
    }

    async fn count_by_date(&self, date: CalendarDate) -> Result<u64, StoreError> {
        let date = date.to_string();
        self.with_conn(
            move |conn| {
                conn.query_row(
                    "SELECT count(*) FROM prices WHERE date = ?1",
                    params![date],
                    |row| row.get::<_, i64>(0),
                )
                .map(|n| n.max(0) as u64)
            },
            StoreError::Read,
        )
        .await
    }

    async fn query_by_date(
        &self,
        date: CalendarDate,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Sample>, StoreError> {
        let date = date.to_string();
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        self.with_conn(
            move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT timestamp, price, date, currency, name
                     FROM prices
                     WHERE date = ?1
                     ORDER BY id ASC
                     LIMIT ?2 OFFSET ?3",
                )?;

                let rows = stmt
                    .query_map(params![date, limit, offset], |row| {
                        let raw_date: String = row.get(2)?;
                        let date = raw_date.parse::<CalendarDate>().map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                        })?;
                        Ok(Sample {
                            timestamp: row.get(0)?,
                            price: row.get(1)?,
                            date,
                            currency: row.get(3)?,
                            asset: row.get(4)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            },
            StoreError::Read,
        )
        .await
    }
}

fn remove_database_files(path: &Path) -> Result<(), StoreError> {
    let base = path.as_os_str().to_os_string();
    for suffix in ["", "-wal", "-shm"] {
        let mut candidate = base.clone();
        candidate.push(suffix);
        match fs::remove_file(&candidate) {
            Ok(()) => debug!("removed {:?}", candidate),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::Open(format!("cannot reset {:?}: {}", candidate, e))),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::AssetPair;
    use std::sync::Arc;

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn sample(day: &str, price: f64, timestamp: i64) -> Sample {
        Sample::new(&AssetPair::default(), price, date(day), timestamp)
    }

    #[tokio::test]
    async fn test_insert_then_query_returns_rows_in_insertion_order() {
        let store = SqliteSampleStore::open_in_memory().unwrap();
        let inserted: Vec<Sample> = (0..5)
            .map(|i| sample("02-01-2024", 40_000.0 + i as f64, 1_000 + i))
            .collect();
        for s in &inserted {
            store.insert(s).await.unwrap();
        }

        let rows = store.query_by_date(date("02-01-2024"), 5, 0).await.unwrap();
        assert_eq!(rows, inserted);
    }

    #[tokio::test]
    async fn test_identical_samples_are_both_kept() {
        let store = SqliteSampleStore::open_in_memory().unwrap();
        let s = sample("03-01-2024", 41_000.0, 1_704_240_000_000);
        store.insert(&s).await.unwrap();
        store.insert(&s).await.unwrap();

        assert_eq!(store.count_by_date(date("03-01-2024")).await.unwrap(), 2);
        let rows = store.query_by_date(date("03-01-2024"), 10, 0).await.unwrap();
        assert_eq!(rows, vec![s.clone(), s]);
    }

    #[tokio::test]
    async fn test_query_filters_by_date_and_pages() {
        let store = SqliteSampleStore::open_in_memory().unwrap();
        for i in 0..7 {
            store.insert(&sample("04-01-2024", 1.0 + i as f64, i)).await.unwrap();
            store.insert(&sample("05-01-2024", 100.0, i)).await.unwrap();
        }

        assert_eq!(store.count_by_date(date("04-01-2024")).await.unwrap(), 7);
        assert_eq!(store.count_by_date(date("06-01-2024")).await.unwrap(), 0);

        let page = store.query_by_date(date("04-01-2024"), 3, 2).await.unwrap();
        assert_eq!(page.len(), 3);
        assert!(page.iter().all(|s| s.date == date("04-01-2024")));
        assert_eq!(page.iter().map(|s| s.timestamp).collect::<Vec<_>>(), vec![2, 3, 4]);

        let tail = store.query_by_date(date("04-01-2024"), 3, 6).await.unwrap();
        assert_eq!(tail.len(), 1);

        let past_end = store.query_by_date(date("04-01-2024"), 3, 50).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_on_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteSampleStore::open(&dir.path().join("prices.db"), 4, true).unwrap());

        let writes = (0..40).map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.insert(&sample("06-01-2024", 30_000.0, i)).await })
        });
        for result in futures::future::join_all(writes).await {
            result.unwrap().unwrap();
        }

        assert_eq!(store.count_by_date(date("06-01-2024")).await.unwrap(), 40);
        let rows = store.query_by_date(date("06-01-2024"), 100, 0).await.unwrap();
        assert_eq!(rows.len(), 40);
        assert!(rows.iter().all(|s| s.price == 30_000.0 && s.asset == "bitcoin"));
    }

    #[tokio::test]
    async fn test_reset_on_start_drops_previous_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.db");

        {
            let store = SqliteSampleStore::open(&path, 2, true).unwrap();
            store.insert(&sample("07-01-2024", 1.0, 1)).await.unwrap();
        }

        let kept = SqliteSampleStore::open(&path, 2, false).unwrap();
        assert_eq!(kept.count_by_date(date("07-01-2024")).await.unwrap(), 1);
        drop(kept);

        let fresh = SqliteSampleStore::open(&path, 2, true).unwrap();
        assert_eq!(fresh.count_by_date(date("07-01-2024")).await.unwrap(), 0);
    }
}
