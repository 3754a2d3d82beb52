//! Client for the remote profile and group registry.

use crate::libs::profile::models::{
    ClaimUsernameRequest, GroupRecord, InitProfileRequest, RegisterGroupRequest, SearchResult,
    UpdateGroupRequest, UpdateProfileRequest, UserProfile, UsernameAvailability,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use urlencoding::encode;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Unexpected registry response: {0}")]
    Decode(String),
}

impl RegistryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::Status { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
    }
}

/// Registry operations the chat core depends on.
#[async_trait]
pub trait ProfileRegistry: Send + Sync {
    async fn search_profiles(&self, query: &str) -> Result<Vec<SearchResult>, RegistryError>;
    async fn init_profile(&self, request: &InitProfileRequest) -> Result<UserProfile, RegistryError>;
    async fn get_profile(&self, wallet_address: &str) -> Result<UserProfile, RegistryError>;
    async fn claim_username(
        &self,
        request: &ClaimUsernameRequest,
    ) -> Result<UserProfile, RegistryError>;
    async fn register_group(&self, request: &RegisterGroupRequest) -> Result<(), RegistryError>;
}

/// URL table of the registry REST API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn health(&self) -> String {
        format!("{}/api/health", self.base)
    }

    pub fn init_profile(&self) -> String {
        format!("{}/api/profiles/init", self.base)
    }

    pub fn profile_by_wallet(&self, wallet_address: &str) -> String {
        format!("{}/api/profiles/{}", self.base, encode(wallet_address))
    }

    pub fn profile_by_username(&self, username: &str) -> String {
        format!("{}/api/profiles/username/{}", self.base, encode(username))
    }

    pub fn claim_username(&self) -> String {
        format!("{}/api/profiles/claim", self.base)
    }

    pub fn update_profile(&self) -> String {
        format!("{}/api/profiles/update", self.base)
    }

    pub fn search_profiles(&self, query: &str) -> String {
        format!("{}/api/profiles/search?q={}", self.base, encode(query))
    }

    pub fn check_username(&self, username: &str) -> String {
        format!("{}/api/profiles/check/{}", self.base, encode(username))
    }

    pub fn register_group(&self) -> String {
        format!("{}/api/groups", self.base)
    }

    pub fn search_groups(&self, query: &str) -> String {
        format!("{}/api/groups/search?q={}", self.base, encode(query))
    }

    /// Get, update and delete share one resource URL.
    pub fn group(&self, conversation_id: &str) -> String {
        format!("{}/api/groups/{}", self.base, encode(conversation_id))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct RegistryClient {
    http: Client,
    endpoints: Endpoints,
}

impl RegistryClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            endpoints: Endpoints::new(base_url),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn health(&self) -> bool {
        match self.http.get(self.endpoints.health()).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                warn!("Registry health check failed: {err}");
                false
            }
        }
    }

    pub async fn get_profile_by_username(&self, username: &str) -> Result<UserProfile, RegistryError> {
        let response = self
            .http
            .get(self.endpoints.profile_by_username(username))
            .send()
            .await?;
        read_json(response, "Failed to fetch profile").await
    }

    pub async fn update_profile(
        &self,
        request: &UpdateProfileRequest,
    ) -> Result<UserProfile, RegistryError> {
        let response = self
            .http
            .post(self.endpoints.update_profile())
            .json(request)
            .send()
            .await?;
        read_json(response, "Failed to update profile").await
    }

    pub async fn check_username(&self, username: &str) -> Result<UsernameAvailability, RegistryError> {
        let response = self
            .http
            .get(self.endpoints.check_username(username))
            .send()
            .await?;
        read_json(response, "Failed to check username").await
    }

    pub async fn search_groups(&self, query: &str) -> Result<Vec<GroupRecord>, RegistryError> {
        let response = self.http.get(self.endpoints.search_groups(query)).send().await?;
        read_json(response, "Failed to search groups").await
    }

    pub async fn get_group(&self, conversation_id: &str) -> Result<GroupRecord, RegistryError> {
        let response = self.http.get(self.endpoints.group(conversation_id)).send().await?;
        read_json(response, "Failed to fetch group").await
    }

    pub async fn update_group(
        &self,
        conversation_id: &str,
        request: &UpdateGroupRequest,
    ) -> Result<GroupRecord, RegistryError> {
        let response = self
            .http
            .put(self.endpoints.group(conversation_id))
            .json(request)
            .send()
            .await?;
        read_json(response, "Failed to update group").await
    }

    pub async fn delete_group(&self, conversation_id: &str) -> Result<(), RegistryError> {
        let response = self
            .http
            .delete(self.endpoints.group(conversation_id))
            .send()
            .await?;
        ensure_success(response, "Failed to delete group").await
    }
}

#[async_trait]
impl ProfileRegistry for RegistryClient {
    async fn search_profiles(&self, query: &str) -> Result<Vec<SearchResult>, RegistryError> {
        debug!("Searching profiles for {query:?}");
        let response = self.http.get(self.endpoints.search_profiles(query)).send().await?;
        read_json(response, "Failed to search profiles").await
    }

    async fn init_profile(&self, request: &InitProfileRequest) -> Result<UserProfile, RegistryError> {
        let response = self
            .http
            .post(self.endpoints.init_profile())
            .json(request)
            .send()
            .await?;
        read_json(response, "Failed to initialize profile").await
    }

    async fn get_profile(&self, wallet_address: &str) -> Result<UserProfile, RegistryError> {
        let response = self
            .http
            .get(self.endpoints.profile_by_wallet(wallet_address))
            .send()
            .await?;
        read_json(response, "Failed to fetch profile").await
    }

    async fn claim_username(
        &self,
        request: &ClaimUsernameRequest,
    ) -> Result<UserProfile, RegistryError> {
        let response = self
            .http
            .post(self.endpoints.claim_username())
            .json(request)
            .send()
            .await?;
        read_json(response, "Failed to update username").await
    }

    async fn register_group(&self, request: &RegisterGroupRequest) -> Result<(), RegistryError> {
        let response = self
            .http
            .post(self.endpoints.register_group())
            .json(request)
            .send()
            .await?;
        ensure_success(response, "Failed to register group").await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, RegistryError> {
    let status = response.status();
    let body = response.text().await?;
    decode_body(status, &body, fallback)
}

async fn ensure_success(response: Response, fallback: &str) -> Result<(), RegistryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body, fallback))
}

/// Non-2xx responses become [`RegistryError::Status`], carrying the server's
/// `error` field when the body has one.
fn decode_body<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    fallback: &str,
) -> Result<T, RegistryError> {
    if !status.is_success() {
        return Err(status_error(status, body, fallback));
    }
    serde_json::from_str(body).map_err(|err| RegistryError::Decode(err.to_string()))
}

fn status_error(status: StatusCode, body: &str, fallback: &str) -> RegistryError {
    RegistryError::Status {
        status: status.as_u16(),
        message: error_message(body, fallback),
    }
}

fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
