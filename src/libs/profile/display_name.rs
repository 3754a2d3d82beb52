//! Human-readable titles for conversations and registry search hits.

use crate::libs::core::format::{format_address, truncate_identifier};
use crate::libs::core::models::{ConversationKind, InboxId};
use crate::libs::profile::models::SearchResult;
use crate::libs::profile::registry::ProfileRegistry;
use crate::libs::sdk::messaging_traits::{ConversationHandle, SdkError};
use tracing::warn;

pub const GROUP_FALLBACK_NAME: &str = "Group Chat";
pub const DIRECT_FALLBACK_NAME: &str = "DM";

pub fn group_display_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => GROUP_FALLBACK_NAME.to_string(),
    }
}

/// Pick the title for a direct conversation from the registry's answer for
/// `peer`: `@username`, then the short wallet address, then the truncated
/// inbox id.
pub fn direct_display_name(peer: &InboxId, results: &[SearchResult]) -> String {
    let matched = results.iter().find(|result| result.inbox_id == peer.as_str());
    if let Some(result) = matched {
        if let Some(username) = result.username.as_deref().filter(|u| !u.is_empty()) {
            return format!("@{username}");
        }
        if !result.wallet_address.is_empty() {
            return format_address(&result.wallet_address);
        }
    }
    truncate_identifier(peer.as_str(), 8)
}

/// `@username`, else the display name, else the short wallet address.
pub fn format_search_result(result: &SearchResult) -> String {
    if let Some(username) = result.username.as_deref().filter(|u| !u.is_empty()) {
        return format!("@{username}");
    }
    if let Some(name) = result.display_name.as_deref().filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    format_address(&result.wallet_address)
}

/// The other participant of a direct conversation. Falls back to the
/// member list when the SDK does not report a peer directly.
pub async fn peer_inbox_id(
    conversation: &dyn ConversationHandle,
    local_inbox_id: &InboxId,
) -> Result<Option<InboxId>, SdkError> {
    if let Some(peer) = conversation.peer_inbox_id().await? {
        return Ok(Some(peer));
    }
    let members = conversation.members().await?;
    Ok(members
        .into_iter()
        .map(|member| member.inbox_id)
        .find(|inbox_id| inbox_id != local_inbox_id))
}

/// Title for a conversation. Never fails: lookup errors degrade to
/// [`DIRECT_FALLBACK_NAME`], and a direct conversation without a resolvable
/// peer shows its truncated conversation id.
pub async fn resolve_display_name(
    conversation: &dyn ConversationHandle,
    local_inbox_id: &InboxId,
    registry: &dyn ProfileRegistry,
) -> String {
    if let ConversationKind::Group { name } = conversation.kind() {
        return group_display_name(name.as_deref());
    }

    let peer = match peer_inbox_id(conversation, local_inbox_id).await {
        Ok(Some(peer)) => peer,
        Ok(None) => return truncate_identifier(conversation.id().as_str(), 12),
        Err(err) => {
            warn!("Could not resolve peer of {}: {err}", conversation.id());
            return DIRECT_FALLBACK_NAME.to_string();
        }
    };

    match registry.search_profiles(peer.as_str()).await {
        Ok(results) => direct_display_name(&peer, &results),
        Err(err) => {
            warn!("Profile lookup for {peer} failed: {err}");
            DIRECT_FALLBACK_NAME.to_string()
        }
    }
}
