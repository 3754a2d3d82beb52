use crate::libs::storage::storage_traits::{
    decode_value, encode_value, KeyValueStore, SettingsStore, StoreError, Transactional,
};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Result, Transaction};
use serde_json::Value;

pub struct SqliteTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> SqliteTransaction<'conn> {
    pub fn new(
        conn: &'conn mut PooledConnection<SqliteConnectionManager>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            tx: conn.transaction()?,
        })
    }

    pub fn inner(&self) -> &Transaction<'conn> {
        &self.tx
    }
}

impl<'conn> Transactional for SqliteTransaction<'conn> {
    fn commit(self) -> Result<(), StoreError> {
        Ok(self.tx.commit()?)
    }

    fn rollback(self) -> Result<(), StoreError> {
        Ok(self.tx.rollback()?)
    }
}

#[derive(Debug)]
pub struct SqliteStore {
    conn_pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::new(manager)?;
        Ok(Self { conn_pool: pool })
    }

    pub fn new_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.conn_pool.get()?)
    }
}

impl<'conn> KeyValueStore for SqliteTransaction<'conn> {
    fn get_keys(&mut self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.tx.prepare("SELECT key FROM kv_entries ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>>>()?;
        Ok(keys)
    }

    fn get_entries(&mut self) -> Result<Vec<(String, Value)>, StoreError> {
        let mut stmt = self
            .tx
            .prepare("SELECT key, value FROM kv_entries ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows
            .into_iter()
            .map(|(key, raw)| (key, decode_value(&raw)))
            .collect())
    }

    fn get_item(&mut self, key: &str) -> Result<Option<Value>, StoreError> {
        let raw = self
            .tx
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(raw.as_deref().map(decode_value))
    }

    fn set_item(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.tx.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, encode_value(value)],
        )?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.tx
            .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl<'conn> SettingsStore for SqliteTransaction<'conn> {
    fn load_settings(&mut self) -> Result<Vec<(String, String)>, StoreError> {
        let mut stmt = self
            .tx
            .prepare("SELECT key, value FROM app_settings ORDER BY key")?;
        let settings = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>>>()?;
        Ok(settings)
    }

    fn store_setting(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.tx.execute(
            "INSERT INTO app_settings (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_setting(&mut self, key: &str) -> Result<(), StoreError> {
        self.tx
            .execute("DELETE FROM app_settings WHERE key = ?1", params![key])?;
        Ok(())
    }
}
