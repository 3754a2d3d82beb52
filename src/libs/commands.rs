//! Slash commands typed into the message composer.

pub mod composer;
pub mod hints;
pub mod pay;
pub mod receipt;
pub mod tokens;
pub mod transfer;

use crate::libs::sdk::messaging_traits::SdkError;
use crate::libs::sdk::wallet_traits::WalletError;
use thiserror::Error;

/// Rejections of a typed command. The composer stays in `Composing` and keeps
/// the typed text so the user can correct it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("/pay <amount> <token>\nExample: /pay 0.01 ETH")]
    Usage,
    #[error("Supported tokens: {supported}")]
    UnsupportedToken { symbol: String, supported: String },
    #[error("Please enter a positive number.")]
    InvalidAmount(String),
    #[error("/pay is only available in direct messages.")]
    GroupConversation,
    #[error("Could not resolve recipient wallet address.")]
    RecipientUnresolved,
}

impl CommandError {
    pub fn title(&self) -> &'static str {
        match self {
            CommandError::Usage => "Usage",
            CommandError::UnsupportedToken { .. } => "Unsupported token",
            CommandError::InvalidAmount(_) => "Invalid amount",
            CommandError::GroupConversation => "Not supported",
            CommandError::RecipientUnresolved => "Error",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Wallet not connected.")]
    WalletNotConnected,
    #[error("No payment is awaiting confirmation.")]
    NothingToConfirm,
    #[error("{}", transfer_failure_message(.0))]
    Wallet(#[from] WalletError),
    #[error("Payment {tx_hash} was sent but the receipt could not be posted: {source}")]
    ReceiptNotPosted { tx_hash: String, source: SdkError },
    #[error("Could not encode payment receipt: {0}")]
    Encoding(String),
}

impl TransferError {
    pub fn title(&self) -> &'static str {
        match self {
            TransferError::WalletNotConnected | TransferError::NothingToConfirm => "Error",
            TransferError::Wallet(_) | TransferError::Encoding(_) => "Transaction failed",
            TransferError::ReceiptNotPosted { .. } => "Receipt not posted",
        }
    }

    /// Whether the payment preview survives this failure for a retry.
    pub fn keeps_preview(&self) -> bool {
        matches!(self, TransferError::Wallet(_) | TransferError::WalletNotConnected)
    }
}

fn transfer_failure_message(err: &WalletError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        "Transaction failed".to_string()
    } else {
        message
    }
}
