use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use log::{debug, warn};
use tokio::sync::broadcast::{self, error::{RecvError, TryRecvError}};

use crate::backend::{BackendError, MessageStore, Result};
use crate::core::ChatMessage;

/// Full list of messages, oldest first, as pushed to listeners.
pub type Snapshot = Arc<Vec<ChatMessage>>;

const DEFAULT_CAPACITY: usize = 64;

/// Shared chat backed by the store's message collection.
///
/// Every successful post pushes a fresh snapshot of the whole list to all
/// live subscriptions.
pub struct ChatRoom<S> {
    store: Arc<S>,
    sender: broadcast::Sender<Snapshot>,
    listeners: Arc<AtomicUsize>,
    /// Held from a post's append until its snapshot is pushed
    posting: Mutex<()>
}

impl<S: MessageStore> ChatRoom<S> {
    pub fn new(store: Arc<S>) -> ChatRoom<S> {
        ChatRoom::with_capacity(store, DEFAULT_CAPACITY)
    }

    /// `capacity` bounds how many snapshots a slow listener may fall behind.
    pub fn with_capacity(store: Arc<S>, capacity: usize) -> ChatRoom<S> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        ChatRoom {
            store,
            sender,
            listeners: Arc::new(AtomicUsize::new(0)),
            posting: Mutex::new(())
        }
    }

    pub fn messages(&self) -> Result<Vec<ChatMessage>> {
        self.store.read_messages()
    }

    /// Posts `text`. Blank text is ignored and yields `None`.
    pub fn send(&self, text: &str) -> Result<Option<ChatMessage>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        // snapshots must reach listeners in the order the posts landed
        let _posting = self.posting.lock().map_err(|_| BackendError::Poisoned)?;
        let message = ChatMessage::new(text, Utc::now());
        self.store.append_message(&message)?;
        debug!("chat message {} posted", message.id);

        match self.store.read_messages() {
            // no receivers is not an error
            Ok(messages) => { let _ = self.sender.send(Arc::new(messages)); },
            Err(err) => warn!("message saved but listeners not notified: {}", err)
        }
        return Ok(Some(message));
    }

    /// Starts listening. The first snapshot yielded is the current list.
    pub fn subscribe(&self) -> Result<Subscription> {
        let _posting = self.posting.lock().map_err(|_| BackendError::Poisoned)?;
        let receiver = self.sender.subscribe();
        let initial = Arc::new(self.store.read_messages()?);

        let count = self.listeners.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("chat listener added, {} live", count);

        return Ok(Subscription {
            initial: Some(initial),
            receiver,
            listeners: Arc::clone(&self.listeners)
        });
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.load(Ordering::SeqCst)
    }
}

/// A live listener on a `ChatRoom`. Dropping it unsubscribes.
pub struct Subscription {
    initial: Option<Snapshot>,
    receiver: broadcast::Receiver<Snapshot>,
    listeners: Arc<AtomicUsize>
}

impl Subscription {
    /// Waits for the next snapshot. `None` once the room is gone.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        loop {
            match self.receiver.recv().await {
                Ok(snapshot) => return Some(snapshot),
                // each snapshot is complete, skipping ahead loses nothing
                Err(RecvError::Lagged(skipped)) => debug!("chat listener skipped {} snapshots", skipped),
                Err(RecvError::Closed) => return None
            }
        }
    }

    /// The next snapshot if one is already waiting.
    pub fn try_next(&mut self) -> Option<Snapshot> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => return Some(snapshot),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None
            }
        }
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let left = self.listeners.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!("chat listener released, {} live", left);
    }
}
