//! Single ordered, deduplicated view of one conversation's messages, fed by a
//! bulk fetch and by incremental pushes.
//!
//! Messages are held newest first, ordered by `(sent_at_ns, id)` descending,
//! and keyed by [`MessageId`]. Because every insert goes through the same
//! filter and the same total order, the final view does not depend on whether
//! a message arrived through the fetch or the stream, nor in which order.

use crate::libs::core::models::{Message, MessageId};
use crate::libs::feed::FeedEvent;
use crate::libs::sdk::messaging_traits::{ConversationHandle, SdkError};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

const EMPTY_OBJECT_MARKER: &str = "{}";

/// Whether a message belongs in the displayed thread. Empty bodies, the
/// literal `{}` and group administration messages are hidden.
pub fn is_displayable(message: &Message) -> bool {
    let text = message.text();
    if text.trim().is_empty() || text == EMPTY_OBJECT_MARKER {
        return false;
    }
    !message.native.has_admin_marker()
}

fn newest_first(a: &Message, b: &Message) -> Ordering {
    b.sent_at_ns
        .cmp(&a.sent_at_ns)
        .then_with(|| b.id.cmp(&a.id))
}

#[derive(Clone, Debug, Default)]
pub struct MessageView {
    messages: Vec<Message>,
    ids: HashSet<MessageId>,
}

impl MessageView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(fetched: Vec<Message>) -> Self {
        let mut view = Self::new();
        view.apply_snapshot(fetched);
        view
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    pub fn latest(&self) -> Option<&Message> {
        self.messages.first()
    }

    /// Merge a bulk fetch into the view. Returns how many messages were new.
    pub fn apply_snapshot(&mut self, fetched: Vec<Message>) -> usize {
        let mut added = 0;
        for message in fetched {
            if self.insert(message) {
                added += 1;
            }
        }
        debug!("Snapshot merged, {added} new, {} held", self.messages.len());
        added
    }

    /// Insert one streamed message. Returns false when it was already held or
    /// is not displayable.
    pub fn apply_pushed(&mut self, message: Message) -> bool {
        self.insert(message)
    }

    pub fn apply_event(&mut self, event: FeedEvent) -> bool {
        match event {
            FeedEvent::Pushed(message) => self.apply_pushed(message),
            FeedEvent::Snapshot(fetched) => self.apply_snapshot(fetched) > 0,
        }
    }

    fn insert(&mut self, message: Message) -> bool {
        if self.ids.contains(&message.id) || !is_displayable(&message) {
            return false;
        }
        let position = self
            .messages
            .partition_point(|held| newest_first(held, &message) == Ordering::Less);
        self.ids.insert(message.id.clone());
        self.messages.insert(position, message);
        true
    }
}

/// Sync the conversation with the network, then fetch everything held
/// locally. The caller keeps its previous view when this fails.
pub async fn load_snapshot(conversation: &dyn ConversationHandle) -> Result<Vec<Message>, SdkError> {
    conversation.sync().await?;
    conversation.messages().await
}
