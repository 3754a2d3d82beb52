//! `/pay <amount> <token>` grammar and validation.

use crate::libs::commands::tokens::{lookup_token, supported_symbols, TokenInfo};
use crate::libs::commands::CommandError;
use crate::libs::core::models::{ConversationKind, InboxId};
use crate::libs::sdk::messaging_traits::ConversationHandle;
use alloy_primitives::{Address, U256};
use tracing::warn;

pub const PAY_COMMAND: &str = "/pay";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayCommand {
    /// Amount exactly as typed, e.g. `"0.01"`.
    pub amount: String,
    pub token: &'static TokenInfo,
    pub base_units: U256,
}

/// A validated payment waiting for the user to confirm or cancel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentPreview {
    pub amount: String,
    pub token: &'static TokenInfo,
    pub base_units: U256,
    pub recipient: Address,
}

impl PaymentPreview {
    pub fn new(command: PayCommand, recipient: Address) -> Self {
        Self {
            amount: command.amount,
            token: command.token,
            base_units: command.base_units,
            recipient,
        }
    }

    pub fn token_symbol(&self) -> &'static str {
        self.token.symbol
    }

    /// Lowercase `0x` hex, the form wallet identities are reported in.
    pub fn recipient_hex(&self) -> String {
        format!("{:#x}", self.recipient)
    }
}

/// Composer text that must be intercepted instead of sent.
pub fn is_pay_command(text: &str) -> bool {
    text.trim().to_lowercase().starts_with(PAY_COMMAND)
}

/// Parse and validate a `/pay` command. Checks run in a fixed order: shape,
/// token, amount, then whether the conversation allows payments at all.
pub fn parse_pay_command(text: &str, kind: &ConversationKind) -> Result<PayCommand, CommandError> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let [command, amount, symbol] = parts.as_slice() else {
        return Err(CommandError::Usage);
    };
    if !command.eq_ignore_ascii_case(PAY_COMMAND) {
        return Err(CommandError::Usage);
    }

    let token = lookup_token(symbol).ok_or_else(|| CommandError::UnsupportedToken {
        symbol: symbol.to_uppercase(),
        supported: supported_symbols(),
    })?;

    let base_units = validate_amount(amount, token)?;

    if kind.is_group() {
        return Err(CommandError::GroupConversation);
    }

    Ok(PayCommand {
        amount: amount.to_string(),
        token,
        base_units,
    })
}

fn validate_amount(amount: &str, token: &TokenInfo) -> Result<U256, CommandError> {
    let invalid = || CommandError::InvalidAmount(amount.to_string());
    let value: f64 = amount.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value <= 0.0 || !token.fits_precision(amount) {
        return Err(invalid());
    }
    let base_units = token.scale_amount(amount).map_err(|_| invalid())?;
    if base_units.is_zero() {
        return Err(invalid());
    }
    Ok(base_units)
}

/// Wallet address of the one participant that is not the local inbox.
pub async fn resolve_counterparty(
    conversation: &dyn ConversationHandle,
    local_inbox_id: &InboxId,
) -> Result<Address, CommandError> {
    let members = conversation.members().await.map_err(|err| {
        warn!("Failed to list members of {}: {err}", conversation.id());
        CommandError::RecipientUnresolved
    })?;

    members
        .iter()
        .find(|member| &member.inbox_id != local_inbox_id)
        .and_then(|member| member.wallet_address())
        .and_then(|address| address.parse::<Address>().ok())
        .ok_or(CommandError::RecipientUnresolved)
}
