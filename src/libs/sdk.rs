pub mod messaging_traits;
pub mod wallet_traits;
