mod common;

use crate::common::*;
use blocchat_core::libs::conversations::{
    create_chat, load_conversation_summaries, search_recipients, NewChatError, NewChatRequest,
    EMPTY_PREVIEW,
};
use blocchat_core::libs::core::models::{ConversationId, InboxId};
use blocchat_core::libs::profile::display_name::{resolve_display_name, DIRECT_FALLBACK_NAME};
use blocchat_core::libs::profile::ProfileState;
use blocchat_core::libs::sdk::messaging_traits::ConversationHandle;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const PEER_ADDRESS_LONG: &str = "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913";

#[tokio::test]
async fn claimed_username_is_preferred() {
    let conversation = FakeConversation::direct("dm-1");
    let registry = FakeRegistry::new().with_profile(PEER_INBOX, Some("alice"), PEER_ADDRESS_LONG);

    let name = resolve_display_name(&conversation, &local_inbox(), &registry).await;
    assert_eq!(name, "@alice");
}

#[tokio::test]
async fn wallet_address_is_used_without_username() {
    let conversation = FakeConversation::direct("dm-1");
    let registry = FakeRegistry::new().with_profile(PEER_INBOX, None, PEER_ADDRESS_LONG);

    let name = resolve_display_name(&conversation, &local_inbox(), &registry).await;
    assert_eq!(name, "0x8335...2913");
}

#[tokio::test]
async fn registry_failure_reads_dm() {
    let conversation = FakeConversation::direct("dm-1");
    let registry = FakeRegistry::new().with_profile(PEER_INBOX, Some("alice"), PEER_ADDRESS_LONG);
    registry.fail.store(true, Ordering::SeqCst);

    let name = resolve_display_name(&conversation, &local_inbox(), &registry).await;
    assert_eq!(name, DIRECT_FALLBACK_NAME);
}

#[tokio::test]
async fn unknown_peer_shows_truncated_inbox() {
    let conversation = FakeConversation::direct("dm-1");
    let registry = FakeRegistry::new();

    let name = resolve_display_name(&conversation, &local_inbox(), &registry).await;
    assert_eq!(name, "peer-inb...");
}

#[tokio::test]
async fn peer_is_found_through_members_when_not_reported() {
    let conversation = FakeConversation::direct("dm-1");
    *conversation.peer.lock().unwrap() = None;
    let registry = FakeRegistry::new().with_profile(PEER_INBOX, Some("alice"), PEER_ADDRESS_LONG);

    let name = resolve_display_name(&conversation, &local_inbox(), &registry).await;
    assert_eq!(name, "@alice");
}

#[tokio::test]
async fn direct_conversation_without_peer_shows_its_id() {
    let conversation = FakeConversation::direct("0123456789abcdef0123");
    *conversation.peer.lock().unwrap() = None;
    conversation.set_members(Vec::new());
    let registry = FakeRegistry::new();

    let name = resolve_display_name(&conversation, &local_inbox(), &registry).await;
    assert_eq!(name, "0123456789ab...");
    assert!(registry.searches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn groups_use_their_own_name() {
    let registry = FakeRegistry::new();
    let named = FakeConversation::group("g-1", Some("Builders"));
    let unnamed = FakeConversation::group("g-2", Some(""));

    assert_eq!(
        resolve_display_name(&named, &local_inbox(), &registry).await,
        "Builders"
    );
    assert_eq!(
        resolve_display_name(&unnamed, &local_inbox(), &registry).await,
        "Group Chat"
    );
}

#[tokio::test]
async fn summaries_are_sorted_by_latest_activity() {
    let client = FakeClient::new();
    client.add(Arc::new(FakeConversation::direct("dm-old").with_messages(vec![
        text("o1", PEER_INBOX, 10, "old news"),
    ])));
    client.add(Arc::new(FakeConversation::group("g-new", Some("Builders")).with_messages(vec![
        text("n1", PEER_INBOX, 50, "first"),
        text("n2", PEER_INBOX, 90, "latest   line"),
        text("n3", PEER_INBOX, 95, "{}"),
    ])));
    client.add(Arc::new(FakeConversation::group("g-empty", None)));
    let registry = FakeRegistry::new().with_profile(PEER_INBOX, Some("alice"), PEER_ADDRESS_LONG);

    let summaries = load_conversation_summaries(&client, &registry).await.unwrap();

    let order: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(order, vec!["g-new", "dm-old", "g-empty"]);
    assert_eq!(summaries[0].display_name, "Builders");
    assert_eq!(summaries[0].preview_text(), "latest line");
    assert_eq!(summaries[0].last_activity_ns, Some(90));
    assert_eq!(summaries[1].display_name, "@alice");
    assert_eq!(summaries[2].display_name, "Group Chat");
    assert_eq!(summaries[2].preview_text(), EMPTY_PREVIEW);
    assert_eq!(client.sync_all_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn summaries_fail_when_the_list_cannot_sync() {
    let client = FakeClient::new();
    client.fail_sync_all.store(true, Ordering::SeqCst);
    let registry = FakeRegistry::new();

    assert!(load_conversation_summaries(&client, &registry).await.is_err());
}

#[tokio::test]
async fn inbox_id_recipient_reuses_existing_dm() {
    let client = FakeClient::new();
    let inbox = "ab".repeat(32);
    client.add(Arc::new(FakeConversation::direct(&format!("dm-{inbox}"))));
    let registry = FakeRegistry::new();

    let conversation = create_chat(
        &client,
        &registry,
        None,
        NewChatRequest::Direct {
            recipient: inbox.clone(),
        },
    )
    .await
    .unwrap();

    assert_eq!(conversation.id(), &ConversationId::new(format!("dm-{inbox}")));
    assert!(client.created_dms.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_inbox_id_creates_dm() {
    let client = FakeClient::new();
    let inbox = "cd".repeat(32);
    let registry = FakeRegistry::new();

    create_chat(
        &client,
        &registry,
        None,
        NewChatRequest::Direct {
            recipient: inbox.clone(),
        },
    )
    .await
    .unwrap();

    assert_eq!(*client.created_dms.lock().unwrap(), vec![inbox]);
}

#[tokio::test]
async fn address_recipient_is_lowercased() {
    let client = FakeClient::new();
    let registry = FakeRegistry::new();

    create_chat(
        &client,
        &registry,
        None,
        NewChatRequest::Direct {
            recipient: " 0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913 ".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(
        *client.created_dms.lock().unwrap(),
        vec![PEER_ADDRESS_LONG.to_string()]
    );
}

#[tokio::test]
async fn invalid_recipients_are_rejected() {
    let client = FakeClient::new();
    let registry = FakeRegistry::new();

    let empty = create_chat(
        &client,
        &registry,
        None,
        NewChatRequest::Direct {
            recipient: "  ".to_string(),
        },
    )
    .await;
    assert!(matches!(empty, Err(NewChatError::EmptyRecipient)));

    let garbage = create_chat(
        &client,
        &registry,
        None,
        NewChatRequest::Direct {
            recipient: "@alice".to_string(),
        },
    )
    .await;
    assert!(matches!(garbage, Err(NewChatError::InvalidAddress(_))));
}

#[tokio::test]
async fn named_group_is_registered_best_effort() {
    let client = FakeClient::new();
    let registry = FakeRegistry::new();

    let group = create_chat(
        &client,
        &registry,
        Some(&local_wallet()),
        NewChatRequest::Group {
            name: Some("  Builders ".to_string()),
        },
    )
    .await
    .unwrap();

    let registered = registry.registered_groups.lock().unwrap().clone();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].conversation_id, group.id().to_string());
    assert_eq!(registered[0].name, "Builders");
    assert_eq!(registered[0].owner_inbox_id, LOCAL_INBOX);
    assert_eq!(registered[0].owner_wallet, LOCAL_WALLET);

    registry.fail.store(true, Ordering::SeqCst);
    let second = create_chat(
        &client,
        &registry,
        Some(&local_wallet()),
        NewChatRequest::Group {
            name: Some("Other".to_string()),
        },
    )
    .await;
    assert!(second.is_ok());
}

#[tokio::test]
async fn unnamed_group_is_not_registered() {
    let client = FakeClient::new();
    let registry = FakeRegistry::new();

    create_chat(
        &client,
        &registry,
        Some(&local_wallet()),
        NewChatRequest::Group { name: None },
    )
    .await
    .unwrap();

    assert!(registry.registered_groups.lock().unwrap().is_empty());
    assert_eq!(*client.created_groups.lock().unwrap(), vec![None]);
}

#[tokio::test]
async fn recipient_search_needs_two_characters() {
    let registry = FakeRegistry::new().with_profile(PEER_INBOX, Some("alice"), PEER_ADDRESS_LONG);

    assert!(search_recipients(&registry, "a").await.is_empty());
    assert!(registry.searches.lock().unwrap().is_empty());

    let hits = search_recipients(&registry, "al").await;
    assert_eq!(hits.len(), 1);

    registry.fail.store(true, Ordering::SeqCst);
    assert!(search_recipients(&registry, "al").await.is_empty());
}

#[tokio::test]
async fn profile_lifecycle() {
    let registry = Arc::new(FakeRegistry::new());
    let mut state = ProfileState::new(registry.clone());
    let inbox = InboxId::from(LOCAL_INBOX);

    state.initialize("0x00000000000000000000000000000000000000A1", &inbox).await;
    assert_eq!(
        state.profile().map(|p| p.wallet_address.as_str()),
        Some(LOCAL_WALLET)
    );
    assert_eq!(state.footer_label(), "Wallet identity");

    state.claim_username(LOCAL_WALLET, &inbox, "me").await.unwrap();
    assert_eq!(state.footer_label(), "@me");

    let taken = state.claim_username(LOCAL_WALLET, &inbox, "me").await;
    assert_eq!(taken.unwrap_err().to_string(), "Username taken");

    registry.fail.store(true, Ordering::SeqCst);
    state.refresh(LOCAL_WALLET).await;
    assert_eq!(state.last_error(), Some("Service unavailable"));
    assert_eq!(state.footer_label(), "@me");

    state.clear();
    assert!(state.profile().is_none());
    assert!(state.last_error().is_none());
}
