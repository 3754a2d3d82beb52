use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Eip155,
    Other(String),
}

/// Snapshot of the wallet-connect session as the wallet SDK reports it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletConnection {
    pub address: Option<Address>,
    pub is_connected: bool,
    pub provider: Option<ProviderKind>,
}

impl WalletConnection {
    pub fn disconnected() -> Self {
        Self {
            address: None,
            is_connected: false,
            provider: None,
        }
    }

    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
            is_connected: true,
            provider: Some(ProviderKind::Eip155),
        }
    }

    /// Connected with an address and an EVM provider ready to sign.
    pub fn is_ready(&self) -> bool {
        self.is_connected
            && self.address.is_some()
            && matches!(self.provider, Some(ProviderKind::Eip155))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet not connected.")]
    NotConnected,
    #[error("{0}")]
    Rejected(String),
    #[error("{reason}")]
    Reverted { reason: String },
    #[error("Signing failed: {0}")]
    Signing(String),
    #[error("{0}")]
    Provider(String),
}

#[async_trait]
pub trait WalletSession: Send + Sync {
    fn connection(&self) -> WalletConnection;

    async fn sign_message(&self, message: &str) -> Result<Vec<u8>, WalletError>;
    /// Sign and broadcast. Resolves with the transaction hash once the wallet
    /// has submitted it; confirmation is not awaited.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256, WalletError>;
    async fn disconnect(&self) -> Result<(), WalletError>;
}
