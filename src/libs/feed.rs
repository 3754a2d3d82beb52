//! Message-arrival producers for an open conversation.
//!
//! The push subscription is preferred. When it cannot be set up the feed
//! degrades to periodic sync + fetch. Either way the consumer receives
//! [`FeedEvent`]s from one channel and hands them to
//! [`MessageView::apply_event`](crate::libs::reconciler::MessageView::apply_event).

use crate::libs::core::models::Message;
use crate::libs::reconciler::load_snapshot;
use crate::libs::sdk::messaging_traits::{ConversationHandle, MessageCallback, StreamCloser};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    Pushed(Message),
    Snapshot(Vec<Message>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedSource {
    Stream,
    Polling,
}

enum FeedTeardown {
    Stream(StreamCloser),
    Polling(JoinHandle<()>),
}

pub struct MessageFeed {
    source: FeedSource,
    events: mpsc::UnboundedReceiver<FeedEvent>,
    teardown: Option<FeedTeardown>,
}

impl MessageFeed {
    pub async fn start(conversation: Arc<dyn ConversationHandle>, poll_interval: Duration) -> Self {
        let (tx, events) = mpsc::unbounded_channel();

        let push_tx = tx.clone();
        let on_message: MessageCallback = Box::new(move |message| {
            // The receiver is gone once the feed is closed.
            let _ = push_tx.send(FeedEvent::Pushed(message));
        });

        match conversation.stream_messages(on_message).await {
            Ok(closer) => {
                info!("Streaming messages for conversation {}", conversation.id());
                Self {
                    source: FeedSource::Stream,
                    events,
                    teardown: Some(FeedTeardown::Stream(closer)),
                }
            }
            Err(err) => {
                warn!(
                    "Stream error for conversation {}: {err}. Polling every {:?}",
                    conversation.id(),
                    poll_interval
                );
                let handle = spawn_polling(conversation, poll_interval, tx);
                Self {
                    source: FeedSource::Polling,
                    events,
                    teardown: Some(FeedTeardown::Polling(handle)),
                }
            }
        }
    }

    pub fn source(&self) -> FeedSource {
        self.source
    }

    /// Next arrival, or `None` once the producer has shut down.
    pub async fn next_event(&mut self) -> Option<FeedEvent> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<FeedEvent> {
        self.events.try_recv().ok()
    }

    pub fn is_open(&self) -> bool {
        self.teardown.is_some()
    }

    /// Release the subscription. Safe to call more than once.
    pub fn close(&mut self) {
        match self.teardown.take() {
            Some(FeedTeardown::Stream(closer)) => closer.close(),
            Some(FeedTeardown::Polling(handle)) => handle.abort(),
            None => {}
        }
        self.events.close();
    }
}

impl Drop for MessageFeed {
    fn drop(&mut self) {
        self.close();
    }
}

fn spawn_polling(
    conversation: Arc<dyn ConversationHandle>,
    poll_interval: Duration,
    tx: mpsc::UnboundedSender<FeedEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        // The first tick fires immediately and the thread was just loaded.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match load_snapshot(conversation.as_ref()).await {
                Ok(messages) => {
                    if tx.send(FeedEvent::Snapshot(messages)).is_err() {
                        break;
                    }
                }
                Err(err) => error!("Failed to load messages: {err}"),
            }
        }
    })
}
