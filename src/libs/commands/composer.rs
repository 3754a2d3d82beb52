//! Composer state machine: free text, `/pay` preview, transfer execution.

use crate::libs::commands::hints::{matching_commands, SlashCommand};
use crate::libs::commands::pay::{
    is_pay_command, parse_pay_command, resolve_counterparty, PaymentPreview,
};
use crate::libs::commands::receipt::PaymentReceipt;
use crate::libs::commands::transfer::execute_transfer;
use crate::libs::commands::{CommandError, TransferError};
use crate::libs::core::models::{InboxId, MessageId};
use crate::libs::sdk::messaging_traits::{ConversationHandle, SdkError};
use crate::libs::sdk::wallet_traits::WalletSession;
use std::mem;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComposerState {
    Composing,
    PreviewPending(PaymentPreview),
    Executing(PaymentPreview),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input or a transfer in flight.
    Ignored,
    Sent(MessageId),
    PreviewReady(PaymentPreview),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Failed to send message. Please try again.")]
    Send(#[from] SdkError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl ComposeError {
    /// Alert title shown above the error message.
    pub fn title(&self) -> &'static str {
        match self {
            ComposeError::Command(err) => err.title(),
            ComposeError::Send(_) => "Error",
            ComposeError::Transfer(err) => err.title(),
        }
    }
}

pub struct Composer {
    local_inbox_id: InboxId,
    input: String,
    state: ComposerState,
}

impl Composer {
    pub fn new(local_inbox_id: InboxId) -> Self {
        Self {
            local_inbox_id,
            input: String::new(),
            state: ComposerState::Composing,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn preview(&self) -> Option<&PaymentPreview> {
        match &self.state {
            ComposerState::PreviewPending(preview) | ComposerState::Executing(preview) => {
                Some(preview)
            }
            ComposerState::Composing => None,
        }
    }

    /// Slash-command suggestions for the current input. Hidden while a
    /// payment preview is shown.
    pub fn hints(&self) -> Vec<&'static SlashCommand> {
        match self.state {
            ComposerState::Composing => matching_commands(&self.input),
            _ => Vec::new(),
        }
    }

    /// Send the typed text, or turn a `/pay` command into a payment preview.
    /// On any error the typed text is left untouched for correction.
    pub async fn submit(
        &mut self,
        conversation: &dyn ConversationHandle,
    ) -> Result<SubmitOutcome, ComposeError> {
        let trimmed = self.input.trim();
        if trimmed.is_empty() || matches!(self.state, ComposerState::Executing(_)) {
            return Ok(SubmitOutcome::Ignored);
        }

        if is_pay_command(trimmed) {
            let command = parse_pay_command(trimmed, &conversation.kind())?;
            let recipient = resolve_counterparty(conversation, &self.local_inbox_id).await?;
            let preview = PaymentPreview::new(command, recipient);
            info!(
                "Payment preview: {} {} to {}",
                preview.amount,
                preview.token_symbol(),
                preview.recipient_hex()
            );
            self.input.clear();
            self.state = ComposerState::PreviewPending(preview.clone());
            return Ok(SubmitOutcome::PreviewReady(preview));
        }

        match conversation.send(&self.input).await {
            Ok(message_id) => {
                self.input.clear();
                Ok(SubmitOutcome::Sent(message_id))
            }
            Err(err) => {
                error!("Failed to send message in {}: {err}", conversation.id());
                Err(ComposeError::Send(err))
            }
        }
    }

    /// Discard the pending preview. Returns it when there was one.
    pub fn cancel(&mut self) -> Option<PaymentPreview> {
        match mem::replace(&mut self.state, ComposerState::Composing) {
            ComposerState::PreviewPending(preview) => Some(preview),
            // A transfer in flight cannot be called back.
            executing @ ComposerState::Executing(_) => {
                self.state = executing;
                None
            }
            ComposerState::Composing => None,
        }
    }

    /// Execute the pending payment and post its receipt into `conversation`.
    ///
    /// A failed transfer returns to `PreviewPending` so the user can retry,
    /// as does dropping this future before the wallet answers.
    /// Once the transfer went through the preview is dropped even if the
    /// receipt cannot be posted, since a retry would send the funds twice.
    pub async fn confirm(
        &mut self,
        wallet: &dyn WalletSession,
        conversation: &dyn ConversationHandle,
    ) -> Result<PaymentReceipt, ComposeError> {
        let preview = match mem::replace(&mut self.state, ComposerState::Composing) {
            ComposerState::PreviewPending(preview) => preview,
            other => {
                self.state = other;
                return Err(TransferError::NothingToConfirm.into());
            }
        };
        let executing = ExecutingGuard::enter(&mut self.state, preview.clone());

        let receipt = match execute_transfer(wallet, &preview).await {
            Ok(receipt) => {
                executing.settle(|_| ComposerState::Composing);
                receipt
            }
            Err(err) => {
                let keep = err.keeps_preview();
                executing.settle(|preview| {
                    if keep {
                        ComposerState::PreviewPending(preview)
                    } else {
                        ComposerState::Composing
                    }
                });
                return Err(err.into());
            }
        };

        let payload = receipt
            .encode()
            .map_err(|err| TransferError::Encoding(err.to_string()))?;
        if let Err(err) = conversation.send(&payload).await {
            warn!(
                "Payment {} went through but the receipt was not posted: {err}",
                receipt.tx_hash
            );
            return Err(TransferError::ReceiptNotPosted {
                tx_hash: receipt.tx_hash,
                source: err,
            }
            .into());
        }
        Ok(receipt)
    }
}

/// Holds the composer in `Executing` while the wallet works. Dropped without
/// being settled (the `confirm` future was cancelled), it restores the
/// preview so the composer is not left stuck.
struct ExecutingGuard<'a> {
    state: &'a mut ComposerState,
    preview: Option<PaymentPreview>,
}

impl<'a> ExecutingGuard<'a> {
    fn enter(state: &'a mut ComposerState, preview: PaymentPreview) -> Self {
        *state = ComposerState::Executing(preview.clone());
        Self {
            state,
            preview: Some(preview),
        }
    }

    fn settle(mut self, next: impl FnOnce(PaymentPreview) -> ComposerState) {
        if let Some(preview) = self.preview.take() {
            *self.state = next(preview);
        }
    }
}

impl Drop for ExecutingGuard<'_> {
    fn drop(&mut self) {
        if let Some(preview) = self.preview.take() {
            warn!("Payment confirmation interrupted, restoring the preview");
            *self.state = ComposerState::PreviewPending(preview);
        }
    }
}
