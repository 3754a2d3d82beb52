//! Conversation list, new-chat creation and recipient search.

use crate::libs::commands::receipt::parse_receipt;
use crate::libs::core::format::{format_message_time, normalize_preview_text};
use crate::libs::core::models::{ConversationId, ConversationKind, InboxId, Message};
use crate::libs::profile::display_name::resolve_display_name;
use crate::libs::profile::models::{RegisterGroupRequest, SearchResult};
use crate::libs::profile::registry::ProfileRegistry;
use crate::libs::reconciler::is_displayable;
use crate::libs::sdk::messaging_traits::{ConversationHandle, MessagingClient, SdkError};
use alloy_primitives::Address;
use chrono::{DateTime, Local, TimeZone, Utc};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const EMPTY_PREVIEW: &str = "Encrypted chat";
pub const MIN_SEARCH_QUERY_CHARS: usize = 2;
const INBOX_ID_HEX_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub kind: ConversationKind,
    pub display_name: String,
    /// Latest displayable message, if the conversation has one.
    pub preview: Option<String>,
    pub last_activity_ns: Option<i64>,
}

impl ConversationSummary {
    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }

    pub fn preview_text(&self) -> &str {
        self.preview.as_deref().unwrap_or(EMPTY_PREVIEW)
    }

    /// Two-letter avatar placeholder.
    pub fn initials(&self) -> String {
        self.display_name.chars().take(2).collect::<String>().to_uppercase()
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity_ns.map(|ns| Utc.timestamp_nanos(ns))
    }

    pub fn last_activity_label(&self) -> String {
        self.last_activity()
            .map(|time| format_message_time(&time.with_timezone(&Local)))
            .unwrap_or_default()
    }
}

/// Preview line for a message: receipts show their summary, everything else
/// its collapsed text.
pub fn preview_for(message: &Message) -> String {
    let text = message.text();
    match parse_receipt(&text) {
        Some(receipt) => receipt.summary(),
        None => normalize_preview_text(&text),
    }
}

/// Sync, then build one summary per conversation, newest activity first.
/// Per-conversation failures only degrade that row.
pub async fn load_conversation_summaries(
    client: &dyn MessagingClient,
    registry: &dyn ProfileRegistry,
) -> Result<Vec<ConversationSummary>, SdkError> {
    client.sync_all().await?;
    let conversations = client.list_conversations().await?;
    debug!("Summarizing {} conversations", conversations.len());

    let local_inbox_id = client.inbox_id();
    let mut summaries = join_all(
        conversations
            .iter()
            .map(|conversation| summarize(conversation.as_ref(), local_inbox_id, registry)),
    )
    .await;

    sort_by_activity(&mut summaries);
    Ok(summaries)
}

/// Newest first; conversations without any activity go last.
pub fn sort_by_activity(summaries: &mut [ConversationSummary]) {
    summaries.sort_by(|a, b| b.last_activity_ns.cmp(&a.last_activity_ns));
}

async fn summarize(
    conversation: &dyn ConversationHandle,
    local_inbox_id: &InboxId,
    registry: &dyn ProfileRegistry,
) -> ConversationSummary {
    if !conversation.kind().is_group() {
        if let Err(err) = conversation.sync().await {
            warn!("Failed to sync {}: {err}", conversation.id());
        }
    }
    let display_name = resolve_display_name(conversation, local_inbox_id, registry).await;

    let latest = match conversation.messages().await {
        Ok(messages) => messages
            .into_iter()
            .filter(is_displayable)
            .max_by_key(|message| message.sent_at_ns),
        Err(err) => {
            warn!("Failed to load preview for {}: {err}", conversation.id());
            None
        }
    };

    ConversationSummary {
        id: conversation.id().clone(),
        kind: conversation.kind(),
        display_name,
        preview: latest.as_ref().map(preview_for),
        last_activity_ns: latest.map(|message| message.sent_at_ns),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NewChatRequest {
    /// Recipient is a 64-character hex inbox id or an Ethereum address.
    Direct { recipient: String },
    Group { name: Option<String> },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NewChatError {
    #[error("Enter a username, address or inbox ID.")]
    EmptyRecipient,
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("{0}")]
    Sdk(#[from] SdkError),
}

pub fn is_inbox_id(value: &str) -> bool {
    value.len() == INBOX_ID_HEX_LEN && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Open (or create) the conversation a new-chat request asks for.
///
/// Named groups are also published to the registry when the owner's wallet is
/// known; that step is best effort and never fails the creation.
pub async fn create_chat(
    client: &dyn MessagingClient,
    registry: &dyn ProfileRegistry,
    owner_wallet: Option<&Address>,
    request: NewChatRequest,
) -> Result<Arc<dyn ConversationHandle>, NewChatError> {
    match request {
        NewChatRequest::Direct { recipient } => {
            let recipient = recipient.trim();
            if recipient.is_empty() {
                return Err(NewChatError::EmptyRecipient);
            }
            client.sync_all().await?;
            if is_inbox_id(recipient) {
                let inbox_id = InboxId::from(recipient);
                if let Some(existing) = client.find_dm_by_inbox_id(&inbox_id).await? {
                    return Ok(existing);
                }
                Ok(client.find_or_create_dm(&inbox_id).await?)
            } else {
                let address: Address = recipient
                    .to_lowercase()
                    .parse()
                    .map_err(|_| NewChatError::InvalidAddress(recipient.to_string()))?;
                Ok(client.find_or_create_dm_with_address(address).await?)
            }
        }
        NewChatRequest::Group { name } => {
            let name = name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty());
            let group = client.new_group(Vec::new(), name.clone()).await?;
            info!("Created group {}", group.id());

            if let (Some(name), Some(owner)) = (name, owner_wallet) {
                let request = RegisterGroupRequest {
                    conversation_id: group.id().to_string(),
                    name,
                    description: None,
                    image_url: None,
                    owner_inbox_id: client.inbox_id().to_string(),
                    owner_wallet: format!("{owner:#x}"),
                };
                if let Err(err) = registry.register_group(&request).await {
                    warn!("Failed to register group {}: {err}", group.id());
                }
            }
            Ok(group)
        }
    }
}

/// Registry search backing the recipient field. Short queries and lookup
/// failures yield no suggestions.
pub async fn search_recipients(registry: &dyn ProfileRegistry, query: &str) -> Vec<SearchResult> {
    if query.chars().count() < MIN_SEARCH_QUERY_CHARS {
        return Vec::new();
    }
    match registry.search_profiles(query).await {
        Ok(results) => results,
        Err(err) => {
            warn!("Recipient search failed: {err}");
            Vec::new()
        }
    }
}
