//! Structured payment receipts posted into a thread after a transfer.
//!
//! On the wire a receipt is an ordinary text message: the payment glyph, a
//! space, then a JSON object whose first field is `"type":"payment"`. Other
//! clients that do not understand it still show something readable.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const PAYMENT_GLYPH: &str = "\u{1F4B8}";
const PAYMENT_TYPE_MARKER: &str = r#"{"type":"payment""#;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptKind {
    Payment,
}

/// Field order matters: `type` must serialize first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    #[serde(rename = "type")]
    pub kind: ReceiptKind,
    pub amount: String,
    pub token: String,
    pub tx_hash: String,
    pub from: String,
    pub to: String,
}

impl PaymentReceipt {
    pub fn new(
        amount: impl Into<String>,
        token: impl Into<String>,
        tx_hash: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            kind: ReceiptKind::Payment,
            amount: amount.into(),
            token: token.into(),
            tx_hash: tx_hash.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        Ok(format!("{PAYMENT_GLYPH} {}", serde_json::to_string(self)?))
    }

    /// Bubble text, e.g. `💸 Sent 0.01 ETH`.
    pub fn summary(&self) -> String {
        format!("{PAYMENT_GLYPH} Sent {} {}", self.amount, self.token)
    }
}

/// Recognise a receipt in a message body. Returns `None` for ordinary text
/// and for receipts whose payload does not parse, which render as plain text.
pub fn parse_receipt(text: &str) -> Option<PaymentReceipt> {
    if !text.contains(PAYMENT_GLYPH) || !text.contains(PAYMENT_TYPE_MARKER) {
        return None;
    }
    let start = text.find('{')?;
    match serde_json::from_str(&text[start..]) {
        Ok(receipt) => Some(receipt),
        Err(err) => {
            debug!("Malformed payment receipt, showing as text: {err}");
            None
        }
    }
}
