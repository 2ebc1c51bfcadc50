mod error;
mod goals;
mod helpers;
mod migrations;
mod settings;
mod store;
mod tracking;
mod usage_records;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

pub use error::{DbError, Result};
pub use settings::DEFAULT_DAILY_LIMIT_MINUTES;
pub use store::{LiveQuery, TrackingRegistry, UsageStore};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One SQLite connection to the usage database.
pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "cache_size", -20_000)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }
}
