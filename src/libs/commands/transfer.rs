use crate::libs::commands::pay::PaymentPreview;
use crate::libs::commands::receipt::PaymentReceipt;
use crate::libs::commands::tokens::TokenKind;
use crate::libs::commands::TransferError;
use crate::libs::sdk::wallet_traits::{TransactionRequest, WalletSession};
use alloy_primitives::{Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use tracing::{error, info};

sol! {
    function transfer(address to, uint256 amount) returns (bool);
}

/// Native value transfer to the recipient, or an ERC-20 `transfer` call on
/// the token contract carrying the recipient and amount as calldata.
pub fn build_transfer_request(preview: &PaymentPreview) -> TransactionRequest {
    match preview.token.kind {
        TokenKind::Native => TransactionRequest {
            to: preview.recipient,
            value: preview.base_units,
            data: Bytes::new(),
        },
        TokenKind::Erc20 { contract } => {
            let call = transferCall {
                to: preview.recipient,
                amount: preview.base_units,
            };
            TransactionRequest {
                to: contract,
                value: U256::ZERO,
                data: Bytes::from(call.abi_encode()),
            }
        }
    }
}

/// Sign and broadcast the payment, returning the receipt to post.
pub async fn execute_transfer(
    wallet: &dyn WalletSession,
    preview: &PaymentPreview,
) -> Result<PaymentReceipt, TransferError> {
    let connection = wallet.connection();
    let from = match connection.address {
        Some(address) if connection.is_connected => address,
        _ => return Err(TransferError::WalletNotConnected),
    };

    let request = build_transfer_request(preview);
    let tx_hash = wallet.send_transaction(request).await.map_err(|err| {
        error!(
            "Transfer of {} {} failed: {err}",
            preview.amount,
            preview.token_symbol()
        );
        TransferError::from(err)
    })?;
    info!(
        "Sent {} {} to {:#x}, tx {tx_hash:#x}",
        preview.amount,
        preview.token_symbol(),
        preview.recipient
    );

    Ok(PaymentReceipt::new(
        preview.amount.clone(),
        preview.token_symbol(),
        format!("{tx_hash:#x}"),
        format!("{from:#x}"),
        preview.recipient_hex(),
    ))
}
