/*!
 * SQLite handle shared by every classroom request.
 *
 * One connection backs the whole service. Assignment and submission writes are
 * serialized through its lock, and async callers hop onto the blocking pool
 * before touching it.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;

const STORE_DIRNAME: &str = "readtogether";
const STORE_FILENAME: &str = "readtogether.db";
const IN_MEMORY_PATH: &str = ":memory:";

/// Shared SQLite handle for the classroom store
#[derive(Clone)]
pub struct DatabaseConnection {
    db_path: PathBuf,
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the store under the user's data directory
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_database_path()?)
    }

    /// Open (or create) the store at `db_path`, creating missing parent directories
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening classroom store at {:?}", db_path);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        Self::ready(db_path, conn)
    }

    /// Throwaway store for tests
    pub fn new_in_memory() -> Result<Self> {
        debug!("Opening in-memory classroom store");
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;

        Self::ready(PathBuf::from(IN_MEMORY_PATH), conn)
    }

    fn ready(db_path: PathBuf, conn: Connection) -> Result<Self> {
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/readtogether/readtogether.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(STORE_DIRNAME).join(STORE_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY_PATH
    }

    /// Run `f` while holding the lock. Blocks the calling thread.
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connection.lock();
        f(&*conn)
    }

    /// Run `f` on the blocking pool so handlers never stall the runtime
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || f(&*conn.lock()))
            .await
            .context("Database task panicked")?
    }

    /// Row counts for the startup log line
    pub fn stats(&self) -> Result<DatabaseStats> {
        self.execute(|conn| {
            let (assignment_count, submission_count) = conn.query_row(
                "SELECT (SELECT COUNT(*) FROM assignments), (SELECT COUNT(*) FROM submissions)",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            Ok(DatabaseStats {
                assignment_count,
                submission_count,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub assignment_count: i64,
    pub submission_count: i64,
}

impl fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} assignments, {} submissions",
            self.assignment_count, self.submission_count
        )
    }
}
