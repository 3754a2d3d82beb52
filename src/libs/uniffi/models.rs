// Rust models for the types exposed to the mobile front-end

use crate::libs::chat::{DisplayBody, DisplayMessage};
use crate::libs::commands::hints::SlashCommand;
use crate::libs::commands::pay::PaymentPreview;
use crate::libs::commands::receipt::PaymentReceipt;
use crate::libs::config::AppConfig;
use crate::libs::conversations::ConversationSummary;
use crate::libs::profile::models::SearchResult;
use crate::libs::session::Screen;

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum ScreenRecord {
    WalletConnect,
    ConversationList,
    Chat { conversation_id: String },
}

impl From<Screen> for ScreenRecord {
    fn from(screen: Screen) -> Self {
        match screen {
            Screen::WalletConnect => ScreenRecord::WalletConnect,
            Screen::ConversationList => ScreenRecord::ConversationList,
            Screen::Chat(id) => ScreenRecord::Chat {
                conversation_id: id.to_string(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct AppConfigRecord {
    pub api_base_url: String,
    pub xmtp_env: String,
    pub chain_id: u64,
    pub poll_interval_ms: u64,
    pub wallet_connect_project_id: String,
}

impl From<&AppConfig> for AppConfigRecord {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_base_url: config.api_base_url.clone(),
            xmtp_env: config.xmtp_env.to_string(),
            chain_id: config.chain_id,
            poll_interval_ms: u64::try_from(config.poll_interval.as_millis()).unwrap_or(u64::MAX),
            wallet_connect_project_id: config.wallet_connect_project_id.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct ConversationSummaryRecord {
    pub conversation_id: String,
    pub display_name: String,
    pub initials: String,
    pub is_group: bool,
    pub preview: String,
    pub last_activity_ns: Option<i64>,
    pub last_activity_label: String,
}

impl From<&ConversationSummary> for ConversationSummaryRecord {
    fn from(summary: &ConversationSummary) -> Self {
        Self {
            conversation_id: summary.id.to_string(),
            display_name: summary.display_name.clone(),
            initials: summary.initials(),
            is_group: summary.is_group(),
            preview: summary.preview_text().to_string(),
            last_activity_ns: summary.last_activity_ns,
            last_activity_label: summary.last_activity_label(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct PaymentReceiptRecord {
    pub amount: String,
    pub token: String,
    pub tx_hash: String,
    pub from: String,
    pub to: String,
    pub summary: String,
}

impl From<&PaymentReceipt> for PaymentReceiptRecord {
    fn from(receipt: &PaymentReceipt) -> Self {
        Self {
            amount: receipt.amount.clone(),
            token: receipt.token.clone(),
            tx_hash: receipt.tx_hash.clone(),
            from: receipt.from.clone(),
            to: receipt.to.clone(),
            summary: receipt.summary(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct DisplayMessageRecord {
    pub message_id: String,
    pub is_mine: bool,
    pub text: String,
    pub payment: Option<PaymentReceiptRecord>,
    pub short_tx_hash: Option<String>,
    pub sent_at_ns: i64,
    pub time_label: String,
}

impl From<&DisplayMessage> for DisplayMessageRecord {
    fn from(message: &DisplayMessage) -> Self {
        let (text, payment, short_tx_hash) = match &message.body {
            DisplayBody::Text(text) => (text.clone(), None, None),
            DisplayBody::Payment {
                summary,
                short_tx_hash,
                receipt,
            } => (
                summary.clone(),
                Some(PaymentReceiptRecord::from(receipt)),
                Some(short_tx_hash.clone()),
            ),
        };
        Self {
            message_id: message.id.clone(),
            is_mine: message.is_mine,
            text,
            payment,
            short_tx_hash,
            sent_at_ns: message.sent_at_ns,
            time_label: message.time_label.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct PaymentPreviewRecord {
    pub amount: String,
    pub token: String,
    pub recipient_address: String,
    pub short_recipient: String,
}

impl From<&PaymentPreview> for PaymentPreviewRecord {
    fn from(preview: &PaymentPreview) -> Self {
        let recipient_address = preview.recipient_hex();
        Self {
            amount: preview.amount.clone(),
            token: preview.token_symbol().to_string(),
            short_recipient: crate::libs::core::format::format_address(&recipient_address),
            recipient_address,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct SlashCommandHintRecord {
    pub command: String,
    pub template: String,
    pub syntax: String,
    pub description: String,
    pub example: String,
    pub icon: String,
}

impl From<&SlashCommand> for SlashCommandHintRecord {
    fn from(command: &SlashCommand) -> Self {
        Self {
            command: command.command.to_string(),
            template: command.template.to_string(),
            syntax: command.syntax.to_string(),
            description: command.description.to_string(),
            example: command.example.to_string(),
            icon: command.icon.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct SearchResultRecord {
    pub wallet_address: String,
    pub inbox_id: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<SearchResultRecord> for SearchResult {
    fn from(record: SearchResultRecord) -> Self {
        Self {
            wallet_address: record.wallet_address,
            inbox_id: record.inbox_id,
            username: record.username,
            display_name: record.display_name,
            avatar_url: record.avatar_url,
        }
    }
}

impl From<SearchResult> for SearchResultRecord {
    fn from(result: SearchResult) -> Self {
        Self {
            wallet_address: result.wallet_address,
            inbox_id: result.inbox_id,
            username: result.username,
            display_name: result.display_name,
            avatar_url: result.avatar_url,
        }
    }
}
