use serde_json::Value;
use thiserror::Error;

pub trait Transactional {
    fn commit(self) -> Result<(), StoreError>;
    fn rollback(self) -> Result<(), StoreError>;
}

/// Persistent key-value storage backing the wallet-connect session.
///
/// Values are JSON. Strings are stored raw and anything else JSON-encoded;
/// on read, text that is not valid JSON comes back as a JSON string.
pub trait KeyValueStore {
    fn get_keys(&mut self) -> Result<Vec<String>, StoreError>;
    fn get_entries(&mut self) -> Result<Vec<(String, Value)>, StoreError>;
    fn get_item(&mut self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set_item(&mut self, key: &str, value: &Value) -> Result<(), StoreError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Rows of the `app_settings` table, applied on top of the built-in config.
pub trait SettingsStore {
    fn load_settings(&mut self) -> Result<Vec<(String, String)>, StoreError>;
    fn store_setting(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_setting(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Sqlite Error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("ConnectionPool Error: {0}")]
    ConnectionPool(#[from] r2d2::Error),
    #[error("Database not initialised")]
    NotInitialised,
    #[error("Initialisation Error: {0}")]
    Initialisation(String),
}

pub fn encode_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn decode_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
