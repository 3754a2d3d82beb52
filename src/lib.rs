pub mod libs;

use crate::libs::commands::composer::ComposeError;
use crate::libs::commands::hints::matching_commands;
use crate::libs::commands::pay::parse_pay_command;
use crate::libs::commands::receipt::parse_receipt;
use crate::libs::commands::{CommandError, TransferError};
use crate::libs::config::AppConfig;
use crate::libs::conversations::NewChatError;
use crate::libs::core::models::ConversationKind;
use crate::libs::profile::display_name;
use crate::libs::profile::registry::RegistryError;
use crate::libs::sdk::messaging_traits::SdkError;
use crate::libs::sdk::wallet_traits::WalletError;
use crate::libs::storage::database::database::{database, initialize_database};
use crate::libs::storage::database::storage_sqllite::SqliteTransaction;
use crate::libs::storage::storage_traits::{
    decode_value, KeyValueStore, SettingsStore, StoreError, Transactional,
};
use crate::libs::uniffi::models::{
    AppConfigRecord, PaymentReceiptRecord, SearchResultRecord, SlashCommandHintRecord,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

uniffi::setup_scaffolding!();

#[derive(Error, Debug, uniffi::Error)]
#[uniffi(flat_error)]
pub enum ChatError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Sdk(#[from] SdkError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    NewChat(#[from] NewChatError),
}

impl From<ComposeError> for ChatError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::Command(err) => ChatError::Command(err),
            ComposeError::Send(err) => ChatError::Sdk(err),
            ComposeError::Transfer(err) => ChatError::Transfer(err),
        }
    }
}

/// Install the global `tracing` subscriber. `filter` uses `RUST_LOG`
/// syntax; without one `RUST_LOG` is read, falling back to `info`. Calling
/// this again is a no-op.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let env_filter = filter
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

#[uniffi::export]
pub fn init_database(path: String) -> Result<(), ChatError> {
    Ok(initialize_database(&path)?)
}

/// Built-in preset, then environment overrides, then persisted
/// `app_settings` rows when the database is open.
pub fn load_config(development: bool) -> AppConfig {
    let mut config = if development {
        AppConfig::development()
    } else {
        AppConfig::production()
    }
    .with_env_overrides();

    match with_transaction(|tx| tx.load_settings()) {
        Ok(settings) => config.apply_settings(&settings),
        Err(StoreError::NotInitialised) => {}
        Err(err) => tracing::warn!("Could not read app settings: {err}"),
    }
    config
}

#[uniffi::export]
pub fn app_config(development: bool) -> AppConfigRecord {
    AppConfigRecord::from(&load_config(development))
}

#[uniffi::export]
pub fn store_setting(key: String, value: String) -> Result<(), ChatError> {
    Ok(with_transaction(|tx| tx.store_setting(&key, &value))?)
}

#[uniffi::export]
pub fn kv_get_keys() -> Result<Vec<String>, ChatError> {
    Ok(with_transaction(|tx| tx.get_keys())?)
}

/// Stored value as JSON text, or `None` when the key is absent.
#[uniffi::export]
pub fn kv_get_item(key: String) -> Result<Option<String>, ChatError> {
    let value = with_transaction(|tx| tx.get_item(&key))?;
    Ok(value.map(|value| value.to_string()))
}

/// `value_json` is the JSON encoding of the value; plain text is stored as a
/// string.
#[uniffi::export]
pub fn kv_set_item(key: String, value_json: String) -> Result<(), ChatError> {
    let value = decode_value(&value_json);
    Ok(with_transaction(|tx| tx.set_item(&key, &value))?)
}

#[uniffi::export]
pub fn kv_remove_item(key: String) -> Result<(), ChatError> {
    Ok(with_transaction(|tx| tx.remove_item(&key))?)
}

#[uniffi::export]
pub fn format_address(address: String) -> String {
    libs::core::format::format_address(&address)
}

#[uniffi::export]
pub fn slash_command_hints(input: String) -> Vec<SlashCommandHintRecord> {
    matching_commands(&input)
        .into_iter()
        .map(SlashCommandHintRecord::from)
        .collect()
}

#[uniffi::export]
pub fn parse_payment_receipt(text: String) -> Option<PaymentReceiptRecord> {
    parse_receipt(&text).map(|receipt| PaymentReceiptRecord::from(&receipt))
}

#[uniffi::export]
pub fn format_search_result(result: SearchResultRecord) -> String {
    display_name::format_search_result(&result.into())
}

/// Check a `/pay` command without touching any conversation. Returns the
/// amount in the token's base units as a decimal string.
#[uniffi::export]
pub fn validate_pay_command(text: String, is_group: bool) -> Result<String, ChatError> {
    let kind = if is_group {
        ConversationKind::Group { name: None }
    } else {
        ConversationKind::Direct
    };
    let command = parse_pay_command(&text, &kind)?;
    Ok(command.base_units.to_string())
}

fn with_transaction<T>(
    operation: impl FnOnce(&mut SqliteTransaction<'_>) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let mut connection = database()?.new_connection()?;
    let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
    let result = operation(&mut sqlite_transaction)?;
    sqlite_transaction.commit()?;
    Ok(result)
}
