use crate::libs::config::USDC_BASE_ADDRESS;
use alloy_primitives::utils::{parse_units, UnitsError};
use alloy_primitives::{Address, U256};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Native,
    Erc20 { contract: Address },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub decimals: u8,
    pub kind: TokenKind,
}

pub const ETH: TokenInfo = TokenInfo {
    symbol: "ETH",
    decimals: 18,
    kind: TokenKind::Native,
};

pub const USDC: TokenInfo = TokenInfo {
    symbol: "USDC",
    decimals: 6,
    kind: TokenKind::Erc20 {
        contract: USDC_BASE_ADDRESS,
    },
};

pub const SUPPORTED_TOKENS: &[TokenInfo] = &[ETH, USDC];

impl TokenInfo {
    pub fn is_native(&self) -> bool {
        matches!(self.kind, TokenKind::Native)
    }

    /// Whether `amount` has no more fractional digits than the token can
    /// represent. `parse_units` silently drops the excess.
    pub fn fits_precision(&self, amount: &str) -> bool {
        amount
            .split_once('.')
            .map_or(true, |(_, fraction)| fraction.len() <= usize::from(self.decimals))
    }

    /// `amount` in the token's smallest unit (wei for ETH).
    pub fn scale_amount(&self, amount: &str) -> Result<U256, UnitsError> {
        Ok(parse_units(amount, self.decimals)?.get_absolute())
    }
}

pub fn lookup_token(symbol: &str) -> Option<&'static TokenInfo> {
    SUPPORTED_TOKENS
        .iter()
        .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
}

pub fn supported_symbols() -> String {
    SUPPORTED_TOKENS
        .iter()
        .map(|token| token.symbol)
        .collect::<Vec<_>>()
        .join(", ")
}
