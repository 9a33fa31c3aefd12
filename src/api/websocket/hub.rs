//! Broadcast hub for live subscribers
//!
//! # Design
//!
//! Every subscriber owns its sink and a ticket turnstile. A broadcast
//! serialises the envelope once, snapshots the subscriber list, draws one
//! ticket per subscriber and spawns one send task per subscriber, so the
//! subscriber map lock is never held across a send. A send task waits until
//! its ticket is served, which keeps the sends of one subscriber in broadcast
//! order; different subscribers are independent.
//!
//! A failed send removes the subscriber and closes its sink once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::SinkExt;
use parking_lot::RwLock;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::events::LiveEvent;
use crate::error::DeliveryError;

/// Outbound half of a live connection
#[async_trait]
pub trait LiveSink: Send {
    async fn send_text(&mut self, text: String) -> Result<(), DeliveryError>;

    async fn close(&mut self);
}

/// Sink half of an axum WebSocket
pub type WsSink = SplitSink<WebSocket, Message>;

#[async_trait]
impl LiveSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), DeliveryError> {
        self.send(Message::Text(text))
            .await
            .map_err(|e| DeliveryError::Send(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = SinkExt::close(self).await;
    }
}

/// Identifier handed out by [`BroadcastHub::subscribe`]
pub type SubscriberId = u64;

/// One live connection and its send guard
pub struct Subscriber {
    id: SubscriberId,
    sink: Mutex<Box<dyn LiveSink>>,
    next_ticket: AtomicU64,
    serving: watch::Sender<u64>,
    closed: AtomicBool,
}

impl Subscriber {
    fn new(id: SubscriberId, sink: Box<dyn LiveSink>) -> Self {
        let (serving, _) = watch::channel(0);
        Self {
            id,
            sink: Mutex::new(sink),
            next_ticket: AtomicU64::new(0),
            serving,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    fn take_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst)
    }

    /// Wait for `ticket` to be served, send, then serve the next ticket
    async fn send_in_turn(&self, ticket: u64, text: String) -> Result<(), DeliveryError> {
        let mut turn = self.serving.subscribe();
        // The sender lives in `self`, so waiting cannot fail
        let _ = turn.wait_for(|serving| *serving == ticket).await;

        let result = if self.closed.load(Ordering::SeqCst) {
            Err(DeliveryError::Closed)
        } else {
            self.sink.lock().await.send_text(text).await
        };

        self.serving.send_modify(|serving| *serving += 1);
        result
    }

    /// Mark closed and close the sink; only the first call does anything
    async fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.sink.lock().await.close().await;
        true
    }
}

/// Set of live subscribers with concurrent fan-out
#[derive(Default)]
pub struct BroadcastHub {
    subscribers: Arc<RwLock<HashMap<SubscriberId, Arc<Subscriber>>>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink and return its id
    pub fn subscribe(&self, sink: Box<dyn LiveSink>) -> SubscriberId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let subscriber = Arc::new(Subscriber::new(id, sink));
        self.subscribers.write().insert(id, subscriber);
        debug!(subscriber = id, "live subscriber connected");
        id
    }

    /// Remove a subscriber without closing it
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().remove(&id).is_some();
        if removed {
            debug!(subscriber = id, "live subscriber disconnected");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Send `event` to every current subscriber.
    ///
    /// Must be called inside a tokio runtime. The returned handles complete
    /// once the corresponding send finished or the subscriber was dropped;
    /// callers are free to ignore them.
    pub fn broadcast(&self, event: &LiveEvent) -> Vec<JoinHandle<()>> {
        let text = match event.envelope().and_then(|env| serde_json::to_string(&env)) {
            Ok(text) => text,
            Err(e) => {
                error!(event = event.event_type(), error = %e, "failed to encode live event");
                return Vec::new();
            }
        };

        let targets: Vec<Arc<Subscriber>> = self.subscribers.read().values().cloned().collect();

        targets
            .into_iter()
            .map(|subscriber| {
                let ticket = subscriber.take_ticket();
                let text = text.clone();
                let subscribers = Arc::clone(&self.subscribers);
                tokio::spawn(async move {
                    if let Err(e) = subscriber.send_in_turn(ticket, text).await {
                        subscribers.write().remove(&subscriber.id);
                        if subscriber.close().await {
                            debug!(subscriber = subscriber.id, error = %e, "dropped live subscriber");
                        }
                    }
                })
            })
            .collect()
    }

    /// Close and remove every subscriber
    pub async fn close_all(&self) {
        let drained: Vec<Arc<Subscriber>> =
            self.subscribers.write().drain().map(|(_, s)| s).collect();
        for subscriber in drained {
            subscriber.close().await;
        }
    }
}
