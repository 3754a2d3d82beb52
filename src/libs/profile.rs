pub mod display_name;
pub mod models;
pub mod registry;

use crate::libs::core::models::InboxId;
use crate::libs::profile::models::{ClaimUsernameRequest, InitProfileRequest, UserProfile};
use crate::libs::profile::registry::{ProfileRegistry, RegistryError};
use std::sync::Arc;
use tracing::{error, info};

pub const ANONYMOUS_FOOTER_LABEL: &str = "Wallet identity";

/// The local user's registry profile. Lives in memory only and is dropped
/// when the wallet disconnects.
pub struct ProfileState {
    registry: Arc<dyn ProfileRegistry>,
    profile: Option<UserProfile>,
    last_error: Option<String>,
}

impl ProfileState {
    pub fn new(registry: Arc<dyn ProfileRegistry>) -> Self {
        Self {
            registry,
            profile: None,
            last_error: None,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `@username` once claimed, otherwise a generic label.
    pub fn footer_label(&self) -> String {
        self.profile
            .as_ref()
            .and_then(|profile| profile.username.as_deref())
            .map(|username| format!("@{username}"))
            .unwrap_or_else(|| ANONYMOUS_FOOTER_LABEL.to_string())
    }

    /// Create or fetch the registry record for a freshly initialised client.
    /// Does nothing when a profile is already held. Failures are kept in
    /// [`ProfileState::last_error`] rather than returned.
    pub async fn initialize(&mut self, wallet_address: &str, inbox_id: &InboxId) {
        if self.profile.is_some() {
            return;
        }
        let request = InitProfileRequest {
            wallet_address: wallet_address.to_lowercase(),
            inbox_id: inbox_id.to_string(),
        };
        let result = self.registry.init_profile(&request).await;
        self.store("initialize", result);
    }

    pub async fn refresh(&mut self, wallet_address: &str) {
        let result = self
            .registry
            .get_profile(&wallet_address.to_lowercase())
            .await;
        self.store("refresh", result);
    }

    /// Unlike the other operations the error is returned, so the caller can
    /// show why the claim was refused.
    pub async fn claim_username(
        &mut self,
        wallet_address: &str,
        inbox_id: &InboxId,
        username: &str,
    ) -> Result<&UserProfile, RegistryError> {
        let request = ClaimUsernameRequest {
            wallet_address: wallet_address.to_lowercase(),
            inbox_id: inbox_id.to_string(),
            username: username.to_string(),
        };
        let profile = self.registry.claim_username(&request).await?;
        info!("Claimed username {username}");
        Ok(self.profile.insert(profile))
    }

    pub fn clear(&mut self) {
        self.profile = None;
        self.last_error = None;
    }

    fn store(&mut self, operation: &str, result: Result<UserProfile, RegistryError>) {
        match result {
            Ok(profile) => {
                self.profile = Some(profile);
                self.last_error = None;
            }
            Err(err) => {
                error!("Failed to {operation} profile: {err}");
                self.last_error = Some(err.to_string());
            }
        }
    }
}
