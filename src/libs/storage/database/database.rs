use std::sync::OnceLock;

use crate::libs::storage::database::storage_sqllite::{SqliteStore, SqliteTransaction};
use crate::libs::storage::storage_traits::{StoreError, Transactional};
use tracing::{info, warn};

pub static DATABASE: OnceLock<SqliteStore> = OnceLock::new();

pub fn database() -> Result<&'static SqliteStore, StoreError> {
    DATABASE.get().ok_or(StoreError::NotInitialised)
}

/// Open the process-wide database at `path`, creating the schema on first
/// use. Later calls only check that the existing pool still answers.
pub fn initialize_database(path: &str) -> Result<(), StoreError> {
    if let Some(db_store) = DATABASE.get() {
        let mut connection = db_store.new_connection()?;
        let sqlite_transaction = SqliteTransaction::new(&mut connection)?;
        sqlite_transaction
            .inner()
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        info!("Database already initialised");
        return Ok(());
    }

    let db_store = SqliteStore::new(path)?;
    db_migration(&db_store)?;
    if DATABASE.set(db_store).is_err() {
        warn!("Database was initialised concurrently, keeping the first pool");
    }
    info!("Database initialised at {path}");
    Ok(())
}

pub fn db_migration(db_store: &SqliteStore) -> Result<(), StoreError> {
    let mut connection = db_store.new_connection()?;
    let sqlite_transaction = SqliteTransaction::new(&mut connection)?;

    // wallet-connect session storage
    sqlite_transaction.inner().execute(
        "CREATE TABLE IF NOT EXISTS kv_entries (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
        [],
    )?;

    sqlite_transaction.inner().execute(
        "CREATE TABLE IF NOT EXISTS app_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
        [],
    )?;

    sqlite_transaction
        .commit()
        .map_err(|err| StoreError::Initialisation(format!("Could not commit initial db: {err}")))
}
