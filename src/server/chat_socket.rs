use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::{ws::{Message, WebSocket, WebSocketUpgrade}, State},
    response::Response
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use log::{debug, warn};

use smokefree::{ChatRoom, Snapshot, Subscription};
use smokefree::backend::JsonStore;

use crate::routes::AppState;

pub(crate) async fn chat_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let chat = Arc::clone(&state.chat);
    ws.on_upgrade(move |socket| stream_snapshots(socket, chat))
}

async fn stream_snapshots(socket: WebSocket, chat: Arc<ChatRoom<JsonStore>>) {
    let subscription = match chat.subscribe() {
        Ok(subscription) => subscription,
        Err(err) => {
            warn!("could not subscribe to chat: {}", err);
            return;
        }
    };
    let (sender, receiver) = socket.split();
    forward_snapshots(sender, receiver, subscription).await;
}

/// Pushes the message list to `sender` until either side goes away.
/// The subscription is released when this returns.
async fn forward_snapshots<Tx, Rx, E>(mut sender: Tx, mut receiver: Rx, mut subscription: Subscription)
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: std::error::Error + Send + Sync + 'static,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: Display
{
    loop {
        tokio::select! {
            snapshot = subscription.next() => {
                let Some(snapshot) = snapshot else { break };
                if let Err(err) = send_snapshot(&mut sender, &snapshot).await {
                    debug!("chat socket send failed: {:#}", err);
                    break;
                }
            },
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        debug!("chat socket error: {}", err);
                        break;
                    },
                    // posting goes through the http endpoint
                    Some(Ok(_)) => ()
                }
            }
        }
    }
    subscription.unsubscribe();
}

async fn send_snapshot<Tx>(sender: &mut Tx, snapshot: &Snapshot) -> anyhow::Result<()>
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: std::error::Error + Send + Sync + 'static
{
    let text = serde_json::to_string(snapshot.as_ref())?;
    sender.send(Message::Text(text)).await?;
    return Ok(());
}


#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use futures_util::{sink, stream};
    use serde_json::Value;
    use smokefree::backend::MemoryStore;
    use tokio::sync::mpsc;

    type Incoming = mpsc::UnboundedSender<Result<Message, Infallible>>;
    type Outgoing = mpsc::UnboundedReceiver<Message>;

    /// Runs the forwarding loop over in-memory channels standing in for a socket.
    fn open_socket(chat: &ChatRoom<MemoryStore>) -> (Incoming, Outgoing, tokio::task::JoinHandle<()>) {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();

        let sender = Box::pin(sink::unfold(outgoing_tx, |tx: mpsc::UnboundedSender<Message>, message: Message| async move {
            let _ = tx.send(message);
            Ok::<_, Infallible>(tx)
        }));
        let receiver = Box::pin(stream::unfold(incoming_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        }));

        let subscription = chat.subscribe().unwrap();
        let task = tokio::spawn(forward_snapshots(sender, receiver, subscription));
        (incoming_tx, outgoing_rx, task)
    }

    async fn next_texts(outgoing: &mut Outgoing) -> Vec<String> {
        let Some(Message::Text(text)) = outgoing.recv().await else {
            panic!("expected a text frame");
        };
        let list: Value = serde_json::from_str(&text).unwrap();
        list.as_array().unwrap()
            .iter()
            .map(|m| m["text"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn close_frame_releases_listener() {
        let chat = ChatRoom::new(Arc::new(MemoryStore::new()));
        chat.send("day one").unwrap();

        let (incoming, mut outgoing, task) = open_socket(&chat);
        assert_eq!(chat.listener_count(), 1);
        assert_eq!(next_texts(&mut outgoing).await, vec!["day one"]);

        chat.send("day two").unwrap();
        assert_eq!(next_texts(&mut outgoing).await, vec!["day one", "day two"]);

        incoming.send(Ok(Message::Close(None))).unwrap();
        task.await.unwrap();
        assert_eq!(chat.listener_count(), 0);
    }

    #[tokio::test]
    async fn vanished_peer_releases_listener() {
        let chat = ChatRoom::new(Arc::new(MemoryStore::new()));
        let (incoming, mut outgoing, task) = open_socket(&chat);
        assert!(next_texts(&mut outgoing).await.is_empty());

        incoming.send(Ok(Message::Text("ignored".to_string()))).unwrap();
        drop(incoming);
        task.await.unwrap();

        assert_eq!(chat.listener_count(), 0);
        assert!(chat.messages().unwrap().is_empty());
    }
}
