#![allow(dead_code)]

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use blocchat_core::init_database;
use blocchat_core::libs::core::models::{
    ConversationId, ConversationKind, Identity, InboxId, Member, Message, MessageId,
};
use blocchat_core::libs::profile::models::{
    ClaimUsernameRequest, InitProfileRequest, RegisterGroupRequest, SearchResult, UserProfile,
};
use blocchat_core::libs::profile::registry::{ProfileRegistry, RegistryError};
use blocchat_core::libs::sdk::messaging_traits::{
    ClientOptions, ConversationHandle, MessageCallback, MessagingClient, MessagingClientFactory,
    SdkError, StreamCloser,
};
use blocchat_core::libs::sdk::wallet_traits::{
    TransactionRequest, WalletConnection, WalletError, WalletSession,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once, OnceLock};
use tempfile::TempDir;
use uuid::Uuid;

pub const LOCAL_INBOX: &str = "local-inbox";
pub const PEER_INBOX: &str = "peer-inbox";
pub const LOCAL_WALLET: &str = "0x00000000000000000000000000000000000000a1";
pub const PEER_WALLET: &str = "0x00000000000000000000000000000000000000b2";

static TEST_DB_DIR: OnceLock<TempDir> = OnceLock::new();

/// Open the process-wide database once per test binary.
pub fn aaa_init(init: &Once, prefix: &str) {
    init.call_once(|| {
        let dir = TEST_DB_DIR.get_or_init(|| TempDir::new().expect("Failed to create test directory"));
        let db_path = dir.path().join(format!("{prefix}_{}.db", Uuid::now_v7()));
        let db_path = db_path.to_str().expect("utf-8 path").to_string();

        init_database(db_path.clone()).expect("Failed to initialise database");
        assert!(
            Path::new(&db_path).exists(),
            "Database file should exist after initialization"
        );
    });
}

pub fn local_inbox() -> InboxId {
    InboxId::from(LOCAL_INBOX)
}

pub fn peer_inbox() -> InboxId {
    InboxId::from(PEER_INBOX)
}

pub fn local_wallet() -> Address {
    LOCAL_WALLET.parse().expect("valid address")
}

pub fn peer_wallet() -> Address {
    PEER_WALLET.parse().expect("valid address")
}

pub fn text(id: &str, sender: &str, ns: i64, body: &str) -> Message {
    Message::from_text(id, sender, ns, body)
}

pub fn ids(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.id.to_string()).collect()
}

pub struct FakeConversation {
    id: ConversationId,
    kind: ConversationKind,
    pub members: Mutex<Vec<Member>>,
    pub peer: Mutex<Option<InboxId>>,
    pub messages: Mutex<Vec<Message>>,
    pub sent: Mutex<Vec<String>>,
    pub fail_sync: AtomicBool,
    pub fail_send: AtomicBool,
    pub fail_stream: AtomicBool,
    pub fail_members: AtomicBool,
    pub sync_calls: AtomicUsize,
    pub stream_closes: Arc<AtomicUsize>,
    stream_open: Arc<AtomicBool>,
    callback: Mutex<Option<MessageCallback>>,
    clock: AtomicI64,
}

impl FakeConversation {
    pub fn new(id: &str, kind: ConversationKind) -> Self {
        Self {
            id: ConversationId::from(id),
            kind,
            members: Mutex::new(Vec::new()),
            peer: Mutex::new(None),
            messages: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            fail_sync: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
            fail_stream: AtomicBool::new(false),
            fail_members: AtomicBool::new(false),
            sync_calls: AtomicUsize::new(0),
            stream_closes: Arc::new(AtomicUsize::new(0)),
            stream_open: Arc::new(AtomicBool::new(false)),
            callback: Mutex::new(None),
            clock: AtomicI64::new(1_000),
        }
    }

    /// Direct conversation between the local inbox and a peer bound to
    /// [`PEER_WALLET`].
    pub fn direct(id: &str) -> Self {
        let conversation = Self::new(id, ConversationKind::Direct);
        conversation.set_members(vec![
            Member::new(local_inbox(), vec![Identity::ethereum(LOCAL_WALLET)]),
            Member::new(peer_inbox(), vec![Identity::ethereum(PEER_WALLET)]),
        ]);
        *conversation.peer.lock().unwrap() = Some(peer_inbox());
        conversation
    }

    pub fn group(id: &str, name: Option<&str>) -> Self {
        let conversation = Self::new(
            id,
            ConversationKind::Group {
                name: name.map(str::to_string),
            },
        );
        conversation.set_members(vec![
            Member::new(local_inbox(), vec![Identity::ethereum(LOCAL_WALLET)]),
            Member::new(peer_inbox(), vec![Identity::ethereum(PEER_WALLET)]),
        ]);
        conversation
    }

    pub fn set_members(&self, members: Vec<Member>) {
        *self.members.lock().unwrap() = members;
    }

    pub fn with_messages(self, messages: Vec<Message>) -> Self {
        *self.messages.lock().unwrap() = messages;
        self
    }

    /// Make a message visible to the next fetch.
    pub fn store(&self, message: Message) {
        self.messages.lock().unwrap().push(message);
    }

    /// Deliver a message through the live subscription, if one is open.
    pub fn push(&self, message: Message) {
        if !self.stream_open.load(Ordering::SeqCst) {
            return;
        }
        if let Some(callback) = self.callback.lock().unwrap().as_ref() {
            callback(message);
        }
    }

    pub fn sent_payloads(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.stream_open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConversationHandle for FakeConversation {
    fn id(&self) -> &ConversationId {
        &self.id
    }

    fn kind(&self) -> ConversationKind {
        self.kind.clone()
    }

    async fn sync(&self) -> Result<(), SdkError> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sync.load(Ordering::SeqCst) {
            return Err(SdkError::Sync("network unreachable".to_string()));
        }
        Ok(())
    }

    async fn messages(&self) -> Result<Vec<Message>, SdkError> {
        Ok(self.messages.lock().unwrap().clone())
    }

    async fn members(&self) -> Result<Vec<Member>, SdkError> {
        if self.fail_members.load(Ordering::SeqCst) {
            return Err(SdkError::Fetch("members unavailable".to_string()));
        }
        Ok(self.members.lock().unwrap().clone())
    }

    async fn peer_inbox_id(&self) -> Result<Option<InboxId>, SdkError> {
        Ok(self.peer.lock().unwrap().clone())
    }

    async fn send(&self, payload: &str) -> Result<MessageId, SdkError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(SdkError::Send("publish failed".to_string()));
        }
        let ns = self.clock.fetch_add(1, Ordering::SeqCst) + 1_000_000;
        let id = format!("sent-{ns}");
        self.sent.lock().unwrap().push(payload.to_string());
        self.store(Message::from_text(id.as_str(), LOCAL_INBOX, ns, payload));
        Ok(MessageId::from(id))
    }

    async fn stream_messages(&self, on_message: MessageCallback) -> Result<StreamCloser, SdkError> {
        if self.fail_stream.load(Ordering::SeqCst) {
            return Err(SdkError::Stream("subscription refused".to_string()));
        }
        *self.callback.lock().unwrap() = Some(on_message);
        self.stream_open.store(true, Ordering::SeqCst);

        let open = self.stream_open.clone();
        let closes = self.stream_closes.clone();
        Ok(StreamCloser::new(move || {
            open.store(false, Ordering::SeqCst);
            closes.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

pub struct FakeClient {
    inbox_id: InboxId,
    pub conversations: Mutex<Vec<Arc<FakeConversation>>>,
    pub fail_sync_all: AtomicBool,
    pub fail_sync_request: AtomicBool,
    pub sync_all_calls: AtomicUsize,
    pub sync_requests: AtomicUsize,
    pub created_dms: Mutex<Vec<String>>,
    pub created_groups: Mutex<Vec<Option<String>>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            inbox_id: local_inbox(),
            conversations: Mutex::new(Vec::new()),
            fail_sync_all: AtomicBool::new(false),
            fail_sync_request: AtomicBool::new(false),
            sync_all_calls: AtomicUsize::new(0),
            sync_requests: AtomicUsize::new(0),
            created_dms: Mutex::new(Vec::new()),
            created_groups: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, conversation: Arc<FakeConversation>) {
        self.conversations.lock().unwrap().push(conversation);
    }

    fn find(&self, id: &ConversationId) -> Option<Arc<FakeConversation>> {
        self.conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned()
    }
}

#[async_trait]
impl MessagingClient for FakeClient {
    fn inbox_id(&self) -> &InboxId {
        &self.inbox_id
    }

    fn installation_id(&self) -> &str {
        "installation-1"
    }

    async fn send_sync_request(&self) -> Result<(), SdkError> {
        self.sync_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_sync_request.load(Ordering::SeqCst) {
            return Err(SdkError::Other("no other installations".to_string()));
        }
        Ok(())
    }

    async fn sync_all(&self) -> Result<(), SdkError> {
        self.sync_all_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sync_all.load(Ordering::SeqCst) {
            return Err(SdkError::Sync("network unreachable".to_string()));
        }
        Ok(())
    }

    async fn list_conversations(&self) -> Result<Vec<Arc<dyn ConversationHandle>>, SdkError> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.clone() as Arc<dyn ConversationHandle>)
            .collect())
    }

    async fn conversation_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Arc<dyn ConversationHandle>>, SdkError> {
        Ok(self.find(id).map(|c| c as Arc<dyn ConversationHandle>))
    }

    async fn find_dm_by_inbox_id(
        &self,
        inbox_id: &InboxId,
    ) -> Result<Option<Arc<dyn ConversationHandle>>, SdkError> {
        Ok(self
            .find(&ConversationId::new(format!("dm-{inbox_id}")))
            .map(|c| c as Arc<dyn ConversationHandle>))
    }

    async fn find_or_create_dm(
        &self,
        inbox_id: &InboxId,
    ) -> Result<Arc<dyn ConversationHandle>, SdkError> {
        self.created_dms.lock().unwrap().push(inbox_id.to_string());
        let conversation = Arc::new(FakeConversation::new(
            &format!("dm-{inbox_id}"),
            ConversationKind::Direct,
        ));
        self.add(conversation.clone());
        Ok(conversation)
    }

    async fn find_or_create_dm_with_address(
        &self,
        address: Address,
    ) -> Result<Arc<dyn ConversationHandle>, SdkError> {
        let key = format!("{address:#x}");
        self.created_dms.lock().unwrap().push(key.clone());
        let conversation = Arc::new(FakeConversation::new(
            &format!("dm-{key}"),
            ConversationKind::Direct,
        ));
        self.add(conversation.clone());
        Ok(conversation)
    }

    async fn new_group(
        &self,
        _members: Vec<InboxId>,
        name: Option<String>,
    ) -> Result<Arc<dyn ConversationHandle>, SdkError> {
        let mut groups = self.created_groups.lock().unwrap();
        groups.push(name.clone());
        let conversation = Arc::new(FakeConversation::new(
            &format!("group-{}", groups.len()),
            ConversationKind::Group { name },
        ));
        drop(groups);
        self.add(conversation.clone());
        Ok(conversation)
    }
}

pub struct FakeFactory {
    pub client: Arc<FakeClient>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
    pub options: Mutex<Option<ClientOptions>>,
}

impl FakeFactory {
    pub fn new(client: Arc<FakeClient>) -> Self {
        Self {
            client,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            options: Mutex::new(None),
        }
    }
}

#[async_trait]
impl MessagingClientFactory for FakeFactory {
    async fn create(
        &self,
        _wallet: Arc<dyn WalletSession>,
        options: ClientOptions,
    ) -> Result<Arc<dyn MessagingClient>, SdkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.options.lock().unwrap() = Some(options);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SdkError::ClientBuild("signature rejected".to_string()));
        }
        Ok(self.client.clone())
    }
}

pub struct FakeWallet {
    pub connection: Mutex<WalletConnection>,
    pub transactions: Mutex<Vec<TransactionRequest>>,
    pub failure: Mutex<Option<WalletError>>,
    pub disconnects: AtomicUsize,
    /// Never answer `send_transaction`, like a wallet prompt left open.
    pub stall: AtomicBool,
}

impl FakeWallet {
    pub fn connected() -> Self {
        Self::with_connection(WalletConnection::connected(local_wallet()))
    }

    pub fn with_connection(connection: WalletConnection) -> Self {
        Self {
            connection: Mutex::new(connection),
            transactions: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            disconnects: AtomicUsize::new(0),
            stall: AtomicBool::new(false),
        }
    }

    pub fn fail_with(&self, err: WalletError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.transactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletSession for FakeWallet {
    fn connection(&self) -> WalletConnection {
        self.connection.lock().unwrap().clone()
    }

    async fn sign_message(&self, message: &str) -> Result<Vec<u8>, WalletError> {
        Ok(message.as_bytes().to_vec())
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256, WalletError> {
        if self.stall.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        let mut transactions = self.transactions.lock().unwrap();
        transactions.push(request);
        Ok(B256::with_last_byte(transactions.len() as u8))
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        *self.connection.lock().unwrap() = WalletConnection::disconnected();
        Ok(())
    }
}

pub struct FakeRegistry {
    pub profiles: Mutex<Vec<SearchResult>>,
    pub fail: AtomicBool,
    pub searches: Mutex<Vec<String>>,
    pub registered_groups: Mutex<Vec<RegisterGroupRequest>>,
    pub claimed: Mutex<Vec<ClaimUsernameRequest>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            searches: Mutex::new(Vec::new()),
            registered_groups: Mutex::new(Vec::new()),
            claimed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_profile(self, inbox_id: &str, username: Option<&str>, wallet: &str) -> Self {
        self.profiles.lock().unwrap().push(SearchResult {
            wallet_address: wallet.to_string(),
            inbox_id: inbox_id.to_string(),
            username: username.map(str::to_string),
            display_name: None,
            avatar_url: None,
        });
        self
    }

    fn check(&self) -> Result<(), RegistryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RegistryError::Status {
                status: 503,
                message: "Service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn to_profile(result: &SearchResult) -> UserProfile {
        UserProfile {
            wallet_address: result.wallet_address.clone(),
            inbox_id: result.inbox_id.clone(),
            username: result.username.clone(),
            display_name: result.display_name.clone(),
            avatar_url: result.avatar_url.clone(),
            bio: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }
}

#[async_trait]
impl ProfileRegistry for FakeRegistry {
    async fn search_profiles(&self, query: &str) -> Result<Vec<SearchResult>, RegistryError> {
        self.searches.lock().unwrap().push(query.to_string());
        self.check()?;
        let query = query.to_lowercase();
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                p.inbox_id.to_lowercase().contains(&query)
                    || p.wallet_address.to_lowercase().contains(&query)
                    || p.username
                        .as_deref()
                        .is_some_and(|u| u.to_lowercase().contains(&query))
            })
            .cloned()
            .collect())
    }

    async fn init_profile(&self, request: &InitProfileRequest) -> Result<UserProfile, RegistryError> {
        self.check()?;
        let existing = self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.wallet_address == request.wallet_address)
            .map(Self::to_profile);
        Ok(existing.unwrap_or_else(|| UserProfile {
            wallet_address: request.wallet_address.clone(),
            inbox_id: request.inbox_id.clone(),
            username: None,
            display_name: None,
            avatar_url: None,
            bio: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }))
    }

    async fn get_profile(&self, wallet_address: &str) -> Result<UserProfile, RegistryError> {
        self.check()?;
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.wallet_address == wallet_address)
            .map(Self::to_profile)
            .ok_or(RegistryError::Status {
                status: 404,
                message: "Profile not found".to_string(),
            })
    }

    async fn claim_username(
        &self,
        request: &ClaimUsernameRequest,
    ) -> Result<UserProfile, RegistryError> {
        self.check()?;
        let mut profiles = self.profiles.lock().unwrap();
        if profiles
            .iter()
            .any(|p| p.username.as_deref() == Some(request.username.as_str()))
        {
            return Err(RegistryError::Status {
                status: 409,
                message: "Username taken".to_string(),
            });
        }
        self.claimed.lock().unwrap().push(request.clone());
        let result = SearchResult {
            wallet_address: request.wallet_address.clone(),
            inbox_id: request.inbox_id.clone(),
            username: Some(request.username.clone()),
            display_name: None,
            avatar_url: None,
        };
        profiles.push(result.clone());
        Ok(Self::to_profile(&result))
    }

    async fn register_group(&self, request: &RegisterGroupRequest) -> Result<(), RegistryError> {
        self.check()?;
        self.registered_groups.lock().unwrap().push(request.clone());
        Ok(())
    }
}
