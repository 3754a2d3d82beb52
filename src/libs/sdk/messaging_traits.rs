//! Seams to the end-to-end encrypted messaging SDK.
//!
//! Everything behind these traits (key management, ordering, transport) is
//! owned by the SDK; the core only consumes the operations below.

use crate::libs::config::XmtpEnv;
use crate::libs::core::models::{
    ConversationId, ConversationKind, Identity, InboxId, Member, Message, MessageId,
};
use crate::libs::sdk::wallet_traits::WalletSession;
use alloy_primitives::Address;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub type MessageCallback = Box<dyn Fn(Message) + Send + Sync>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    #[error("Sync failed: {0}")]
    Sync(String),
    #[error("Fetch failed: {0}")]
    Fetch(String),
    #[error("Send failed: {0}")]
    Send(String),
    #[error("Stream setup failed: {0}")]
    Stream(String),
    #[error("Client creation failed: {0}")]
    ClientBuild(String),
    #[error("{0}")]
    Other(String),
}

/// Teardown hook returned by a message subscription. The hook runs exactly
/// once, either through [`StreamCloser::close`] or when the closer is dropped.
pub struct StreamCloser {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl StreamCloser {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn close(mut self) {
        self.run_teardown();
    }

    fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for StreamCloser {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

impl fmt::Debug for StreamCloser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamCloser")
            .field("open", &self.teardown.is_some())
            .finish()
    }
}

#[async_trait]
pub trait ConversationHandle: Send + Sync {
    fn id(&self) -> &ConversationId;
    fn kind(&self) -> ConversationKind;

    async fn sync(&self) -> Result<(), SdkError>;
    /// All messages currently known locally, in no guaranteed order.
    async fn messages(&self) -> Result<Vec<Message>, SdkError>;
    async fn members(&self) -> Result<Vec<Member>, SdkError>;
    /// Direct conversations only. Groups return `Ok(None)`.
    async fn peer_inbox_id(&self) -> Result<Option<InboxId>, SdkError>;
    async fn send(&self, payload: &str) -> Result<MessageId, SdkError>;
    async fn stream_messages(&self, on_message: MessageCallback) -> Result<StreamCloser, SdkError>;
}

#[async_trait]
pub trait MessagingClient: Send + Sync {
    fn inbox_id(&self) -> &InboxId;
    fn installation_id(&self) -> &str;

    /// Ask the user's other installations to share their message history.
    async fn send_sync_request(&self) -> Result<(), SdkError>;
    async fn sync_all(&self) -> Result<(), SdkError>;
    async fn list_conversations(&self) -> Result<Vec<Arc<dyn ConversationHandle>>, SdkError>;
    async fn conversation_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Arc<dyn ConversationHandle>>, SdkError>;
    async fn find_dm_by_inbox_id(
        &self,
        inbox_id: &InboxId,
    ) -> Result<Option<Arc<dyn ConversationHandle>>, SdkError>;
    async fn find_or_create_dm(
        &self,
        inbox_id: &InboxId,
    ) -> Result<Arc<dyn ConversationHandle>, SdkError>;
    async fn find_or_create_dm_with_address(
        &self,
        address: Address,
    ) -> Result<Arc<dyn ConversationHandle>, SdkError>;
    async fn new_group(
        &self,
        members: Vec<InboxId>,
        name: Option<String>,
    ) -> Result<Arc<dyn ConversationHandle>, SdkError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientOptions {
    pub env: XmtpEnv,
    pub identity: Identity,
    pub db_encryption_key: [u8; 32],
}

#[async_trait]
pub trait MessagingClientFactory: Send + Sync {
    /// Build (or reopen) the messaging client for the wallet's identity. The
    /// wallet signs the identity registration challenge when needed.
    async fn create(
        &self,
        wallet: Arc<dyn WalletSession>,
        options: ClientOptions,
    ) -> Result<Arc<dyn MessagingClient>, SdkError>;
}
