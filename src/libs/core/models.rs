use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// Opaque identifiers handed out by the messaging SDK. They are compared and
// hashed as plain strings, never parsed.
macro_rules! string_id {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(InboxId);
string_id!(ConversationId);
string_id!(MessageId);

/// Decided once when a conversation crosses the SDK boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversationKind {
    Direct,
    Group { name: Option<String> },
}

impl ConversationKind {
    pub fn is_group(&self) -> bool {
        matches!(self, ConversationKind::Group { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityKind {
    Ethereum,
    Passkey,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub identifier: String,
    pub kind: IdentityKind,
}

impl Identity {
    pub fn ethereum(address: impl Into<String>) -> Self {
        Self {
            identifier: address.into(),
            kind: IdentityKind::Ethereum,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub inbox_id: InboxId,
    pub identities: Vec<Identity>,
}

impl Member {
    pub fn new(inbox_id: InboxId, identities: Vec<Identity>) -> Self {
        Self {
            inbox_id,
            identities,
        }
    }

    /// The wallet address bound to this inbox, if it has one.
    pub fn wallet_address(&self) -> Option<&str> {
        self.identities
            .iter()
            .find(|identity| identity.kind == IdentityKind::Ethereum)
            .map(|identity| identity.identifier.as_str())
            .filter(|address| !address.is_empty())
    }
}

/// Result of the SDK's primary content decoder.
#[derive(Clone, Debug, PartialEq)]
pub enum MessageContent {
    Text(String),
    Structured { text: Option<String> },
    Undecodable,
}

/// Raw payload as the SDK reports it. Group administration messages carry at
/// least one of the membership/metadata markers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiated_by_inbox_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_inboxes: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_inboxes: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_field_changes: Option<Vec<serde_json::Value>>,
}

impl NativeContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn has_admin_marker(&self) -> bool {
        self.initiated_by_inbox_id.is_some()
            || self.added_inboxes.is_some()
            || self.removed_inboxes.is_some()
            || self.metadata_field_changes.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub sender_inbox_id: InboxId,
    pub sent_at_ns: i64,
    pub content: MessageContent,
    pub native: NativeContent,
}

impl Message {
    pub fn new(
        id: MessageId,
        sender_inbox_id: InboxId,
        sent_at_ns: i64,
        content: MessageContent,
        native: NativeContent,
    ) -> Self {
        Self {
            id,
            sender_inbox_id,
            sent_at_ns,
            content,
            native,
        }
    }

    pub fn from_text(
        id: impl Into<MessageId>,
        sender_inbox_id: impl Into<InboxId>,
        sent_at_ns: i64,
        text: &str,
    ) -> Self {
        Self::new(
            id.into(),
            sender_inbox_id.into(),
            sent_at_ns,
            MessageContent::Text(text.to_string()),
            NativeContent::text(text),
        )
    }

    /// Decoded text of the message. The primary decoding wins when it yields
    /// text, otherwise the native payload's text is used. Empty when neither
    /// has any.
    pub fn text(&self) -> String {
        let primary = match &self.content {
            MessageContent::Text(text) => Some(text.as_str()),
            MessageContent::Structured { text } => text.as_deref(),
            MessageContent::Undecodable => None,
        };
        primary
            .or(self.native.text.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.sent_at_ns)
    }

    pub fn is_from(&self, inbox_id: &InboxId) -> bool {
        &self.sender_inbox_id == inbox_id
    }
}
