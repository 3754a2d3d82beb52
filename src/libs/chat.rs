//! An open chat thread: reconciled message view, live feed and composer.

use crate::libs::commands::composer::{ComposeError, Composer, ComposerState, SubmitOutcome};
use crate::libs::commands::hints::SlashCommand;
use crate::libs::commands::pay::PaymentPreview;
use crate::libs::commands::receipt::{parse_receipt, PaymentReceipt};
use crate::libs::core::format::{format_address, format_message_time};
use crate::libs::core::models::{ConversationId, InboxId, Message};
use crate::libs::feed::{FeedSource, MessageFeed};
use crate::libs::profile::display_name::resolve_display_name;
use crate::libs::profile::registry::ProfileRegistry;
use crate::libs::reconciler::{load_snapshot, MessageView};
use crate::libs::sdk::messaging_traits::{ConversationHandle, SdkError};
use crate::libs::sdk::wallet_traits::WalletSession;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayBody {
    Text(String),
    Payment {
        summary: String,
        short_tx_hash: String,
        receipt: PaymentReceipt,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMessage {
    pub id: String,
    pub is_mine: bool,
    pub body: DisplayBody,
    pub sent_at_ns: i64,
    pub time_label: String,
}

impl DisplayMessage {
    pub fn from_message(message: &Message, local_inbox_id: &InboxId) -> Self {
        let text = message.text();
        let body = match parse_receipt(&text) {
            Some(receipt) => DisplayBody::Payment {
                summary: receipt.summary(),
                short_tx_hash: format_address(&receipt.tx_hash),
                receipt,
            },
            None => DisplayBody::Text(text),
        };
        Self {
            id: message.id.to_string(),
            is_mine: message.is_from(local_inbox_id),
            body,
            sent_at_ns: message.sent_at_ns,
            time_label: format_message_time(&message.sent_at().with_timezone(&Local)),
        }
    }
}

pub struct ChatThread {
    conversation: Arc<dyn ConversationHandle>,
    local_inbox_id: InboxId,
    title: String,
    view: MessageView,
    feed: MessageFeed,
    composer: Composer,
}

impl ChatThread {
    /// Subscribe to new messages, then load the thread. A failed initial load
    /// leaves the thread empty; the feed fills it in as messages arrive.
    pub async fn open(
        conversation: Arc<dyn ConversationHandle>,
        local_inbox_id: InboxId,
        registry: &dyn ProfileRegistry,
        poll_interval: Duration,
    ) -> Self {
        let feed = MessageFeed::start(conversation.clone(), poll_interval).await;
        let title = resolve_display_name(conversation.as_ref(), &local_inbox_id, registry).await;

        let mut thread = Self {
            composer: Composer::new(local_inbox_id.clone()),
            conversation,
            local_inbox_id,
            title,
            view: MessageView::new(),
            feed,
        };
        if let Err(err) = thread.reload().await {
            error!("Failed to load messages: {err}");
        }
        thread
    }

    pub fn id(&self) -> &ConversationId {
        self.conversation.id()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_group(&self) -> bool {
        self.conversation.kind().is_group()
    }

    pub fn feed_source(&self) -> FeedSource {
        self.feed.source()
    }

    pub fn view(&self) -> &MessageView {
        &self.view
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_state(&self) -> &ComposerState {
        self.composer.state()
    }

    pub fn payment_preview(&self) -> Option<&PaymentPreview> {
        self.composer.preview()
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.composer.set_input(text);
    }

    pub fn command_hints(&self) -> Vec<&'static SlashCommand> {
        self.composer.hints()
    }

    /// Sync and merge a fresh fetch. On error the view is left as it was.
    pub async fn reload(&mut self) -> Result<usize, SdkError> {
        let fetched = load_snapshot(self.conversation.as_ref()).await?;
        Ok(self.view.apply_snapshot(fetched))
    }

    /// Wait for the next feed event and merge it. Returns `false` once the
    /// feed has shut down.
    pub async fn next_update(&mut self) -> bool {
        match self.feed.next_event().await {
            Some(event) => {
                self.view.apply_event(event);
                true
            }
            None => false,
        }
    }

    /// Merge everything already queued without waiting. Returns how many
    /// events were applied.
    pub fn drain_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.feed.try_next_event() {
            self.view.apply_event(event);
            applied += 1;
        }
        applied
    }

    pub async fn submit(&mut self) -> Result<SubmitOutcome, ComposeError> {
        let outcome = self.composer.submit(self.conversation.as_ref()).await?;
        if matches!(outcome, SubmitOutcome::Sent(_)) {
            self.reload_quietly().await;
        }
        Ok(outcome)
    }

    pub fn cancel_payment(&mut self) -> Option<PaymentPreview> {
        self.composer.cancel()
    }

    pub async fn confirm_payment(
        &mut self,
        wallet: &dyn WalletSession,
    ) -> Result<PaymentReceipt, ComposeError> {
        let receipt = self
            .composer
            .confirm(wallet, self.conversation.as_ref())
            .await?;
        self.reload_quietly().await;
        Ok(receipt)
    }

    pub fn display_messages(&self) -> Vec<DisplayMessage> {
        self.view
            .messages()
            .iter()
            .map(|message| DisplayMessage::from_message(message, &self.local_inbox_id))
            .collect()
    }

    pub fn close(&mut self) {
        debug!("Closing thread {}", self.conversation.id());
        self.feed.close();
    }

    async fn reload_quietly(&mut self) {
        if let Err(err) = self.reload().await {
            error!("Failed to load messages: {err}");
        }
    }
}
