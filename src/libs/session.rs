//! Client-session context: the wallet connection and, once initialised, the
//! messaging client bound to that wallet's identity.
//!
//! Screens receive a shared [`ClientSession`] instead of reaching for global
//! state. The session is created at wallet connect and torn down on
//! disconnect.

use crate::libs::config::AppConfig;
use crate::libs::core::models::{ConversationId, Identity};
use crate::libs::sdk::messaging_traits::{
    ClientOptions, MessagingClient, MessagingClientFactory, SdkError,
};
use crate::libs::sdk::wallet_traits::{WalletConnection, WalletError, WalletSession};
use alloy_primitives::{keccak256, Address};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Offline,
    Connecting,
    Ready,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Offline => "Offline",
            SessionStatus::Connecting => "Connecting",
            SessionStatus::Ready => "Ready",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    WalletConnect,
    ConversationList,
    Chat(ConversationId),
}

#[derive(Default)]
struct SessionState {
    client: Option<Arc<dyn MessagingClient>>,
    initializing: bool,
    last_error: Option<String>,
}

pub struct ClientSession {
    config: AppConfig,
    wallet: Arc<dyn WalletSession>,
    factory: Arc<dyn MessagingClientFactory>,
    state: Mutex<SessionState>,
}

/// Local database encryption key: keccak-256 of the lowercase `0x` address,
/// so the same wallet reopens the same local store on every launch.
pub fn database_encryption_key(address: &Address) -> [u8; 32] {
    keccak256(format!("{address:#x}").as_bytes()).0
}

impl ClientSession {
    pub fn new(
        config: AppConfig,
        wallet: Arc<dyn WalletSession>,
        factory: Arc<dyn MessagingClientFactory>,
    ) -> Self {
        Self {
            config,
            wallet,
            factory,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn wallet(&self) -> Arc<dyn WalletSession> {
        self.wallet.clone()
    }

    pub fn connection(&self) -> WalletConnection {
        self.wallet.connection()
    }

    pub fn client(&self) -> Option<Arc<dyn MessagingClient>> {
        self.lock().client.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn status(&self) -> SessionStatus {
        let state = self.lock();
        if state.initializing {
            SessionStatus::Connecting
        } else if state.client.is_some() {
            SessionStatus::Ready
        } else {
            SessionStatus::Offline
        }
    }

    pub fn status_label(&self) -> &'static str {
        self.status().label()
    }

    /// Create the messaging client for the connected wallet.
    ///
    /// Returns `Ok(None)` without doing anything when the wallet is not ready
    /// to sign or a client exists or is being created. History sync after
    /// creation is best effort and never fails initialisation.
    pub async fn initialize(&self) -> Result<Option<Arc<dyn MessagingClient>>, SdkError> {
        let connection = self.wallet.connection();
        let Some(address) = connection.address.filter(|_| connection.is_connected) else {
            return Ok(None);
        };
        if !connection.is_ready() {
            warn!("No EVM provider available yet, waiting");
            return Ok(None);
        }
        {
            let mut state = self.lock();
            if state.initializing || state.client.is_some() {
                return Ok(None);
            }
            state.initializing = true;
            state.last_error = None;
        }

        info!("Initializing messaging client for {address:#x}");
        let options = ClientOptions {
            env: self.config.xmtp_env,
            identity: Identity::ethereum(format!("{address:#x}")),
            db_encryption_key: database_encryption_key(&address),
        };
        let created = self.factory.create(self.wallet.clone(), options).await;

        let client = match created {
            Ok(client) => client,
            Err(err) => {
                error!("Failed to initialize messaging client: {err}");
                let mut state = self.lock();
                state.initializing = false;
                state.last_error = Some(err.to_string());
                return Err(err);
            }
        };

        if let Err(err) = client.send_sync_request().await {
            warn!("Could not send history sync request: {err}");
        }
        if let Err(err) = client.sync_all().await {
            warn!("Initial conversation sync failed: {err}");
        }
        info!(
            "Messaging client ready, inbox {} installation {}",
            client.inbox_id(),
            client.installation_id()
        );

        let mut state = self.lock();
        state.initializing = false;
        state.client = Some(client.clone());
        Ok(Some(client))
    }

    /// React to the wallet SDK reporting a new connection state: initialise
    /// on connect, drop the client on disconnect.
    pub async fn handle_connection_change(&self) -> Result<(), SdkError> {
        if self.wallet.connection().is_connected {
            self.initialize().await.map(|_| ())
        } else {
            self.teardown();
            Ok(())
        }
    }

    pub async fn disconnect(&self) -> Result<(), WalletError> {
        let result = self.wallet.disconnect().await;
        self.teardown();
        result
    }

    /// Pull new conversations and messages from the network.
    pub async fn refresh(&self) -> Result<(), SdkError> {
        match self.client() {
            Some(client) => client.sync_all().await,
            None => Ok(()),
        }
    }

    pub fn route(&self, selected: Option<&ConversationId>) -> Screen {
        if !self.wallet.connection().is_connected {
            return Screen::WalletConnect;
        }
        match selected {
            Some(id) => Screen::Chat(id.clone()),
            None => Screen::ConversationList,
        }
    }

    fn teardown(&self) {
        let mut state = self.lock();
        if state.client.take().is_some() {
            info!("Wallet disconnected, dropping messaging client");
        }
        state.initializing = false;
        state.last_error = None;
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
