//! Table lock sessions over WebSocket
//!
//! One connection is one session. Clients claim and free tables; every
//! session sees every lock change. When the socket goes away, every lock
//! taken through it is released with reason `disconnect`.
//!
//! ```text
//! client -> {"type":"table_selected","table_id":"t-5","holder_id":"w-2","holder_name":"Aziza"}
//! server <- {"type":"table_lock_success","lock":{...}}
//! all    <- {"type":"table_locked","lock":{...}}
//! ```

use std::collections::BTreeSet;

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use futures::{Sink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use shared::models::{LockHolder, TableLock, UnlockReason};
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;
use crate::table_lock::{LockError, TableLockRegistry};

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws/tables", get(upgrade))
}

/// Client -> server
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    TableSelected {
        table_id: String,
        holder_id: String,
        #[serde(default)]
        holder_name: String,
    },
    TableFreed {
        table_id: String,
        holder_id: String,
    },
}

/// Direct reply to the session that sent a [`ClientMessage`]
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionReply {
    TableLockSuccess {
        lock: TableLock,
    },
    TableConflict {
        table_id: String,
        current: TableLock,
    },
    TableReleased {
        table_id: String,
    },
    TableReleaseDenied {
        table_id: String,
        holder_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        current: Option<TableLock>,
    },
    Error {
        message: String,
    },
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, state))
}

/// Holders that claimed a table through one connection
#[derive(Debug, Default)]
pub struct Session {
    holders: BTreeSet<String>,
}

impl Session {
    pub fn holders(&self) -> impl Iterator<Item = &str> {
        self.holders.iter().map(String::as_str)
    }

    /// Apply one raw client frame and produce the reply
    pub async fn handle_text(&mut self, locks: &TableLockRegistry, text: &str) -> SessionReply {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => self.handle(locks, message).await,
            Err(e) => SessionReply::Error {
                message: format!("Invalid message: {e}"),
            },
        }
    }

    pub async fn handle(&mut self, locks: &TableLockRegistry, message: ClientMessage) -> SessionReply {
        match message {
            ClientMessage::TableSelected {
                table_id,
                holder_id,
                holder_name,
            } => {
                if holder_id.trim().is_empty() {
                    return SessionReply::Error {
                        message: "holder_id is required".into(),
                    };
                }
                let holder = LockHolder {
                    holder_id: holder_id.clone(),
                    holder_name,
                };
                match locks.acquire(&table_id, holder).await {
                    Ok(lock) => {
                        self.holders.insert(holder_id);
                        SessionReply::TableLockSuccess { lock }
                    }
                    Err(LockError::Conflict { current }) => {
                        SessionReply::TableConflict { table_id, current }
                    }
                    Err(e) => SessionReply::Error {
                        message: e.to_string(),
                    },
                }
            }
            ClientMessage::TableFreed {
                table_id,
                holder_id,
            } => match locks.release(&table_id, &holder_id).await {
                Ok(()) => SessionReply::TableReleased { table_id },
                Err(LockError::Denied {
                    table_id,
                    holder_id,
                    current,
                }) => SessionReply::TableReleaseDenied {
                    table_id,
                    holder_id,
                    current,
                },
                Err(e) => SessionReply::Error {
                    message: e.to_string(),
                },
            },
        }
    }

    /// Release everything this session's holders own
    pub async fn close(self, locks: &TableLockRegistry) {
        for holder_id in &self.holders {
            match locks.release_all(holder_id, UnlockReason::Disconnect).await {
                Ok(freed) if !freed.is_empty() => {
                    tracing::info!(holder_id = %holder_id, tables = ?freed, "Released table locks on disconnect");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(holder_id = %holder_id, error = %e, "Failed to release table locks on disconnect");
                }
            }
        }
    }
}

async fn run_session(socket: WebSocket, state: ServerState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.locks.subscribe();
    let mut session = Session::default();
    tracing::debug!("Table lock session opened");

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => break,
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let reply = session.handle_text(&state.locks, text.as_str()).await;
                    if send_json(&mut sender, &reply).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "Table lock session read failed");
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if send_json(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Table lock session lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    session.close(&state.locks).await;
    tracing::debug!("Table lock session closed");
}

async fn send_json<S, T>(sender: &mut S, value: &T) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
    T: Serialize,
{
    let text = match serde_json::to_string(value) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize session message");
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(table: &str, holder: &str) -> String {
        format!(
            r#"{{"type":"table_selected","table_id":"{table}","holder_id":"{holder}","holder_name":"{holder}"}}"#
        )
    }

    #[tokio::test]
    async fn test_select_and_conflict() {
        let locks = TableLockRegistry::spawn();
        let mut first = Session::default();
        let mut second = Session::default();

        let reply = first.handle_text(&locks, &select("t-5", "w-1")).await;
        assert!(matches!(reply, SessionReply::TableLockSuccess { ref lock } if lock.holder_id == "w-1"));

        let reply = second.handle_text(&locks, &select("t-5", "w-2")).await;
        match reply {
            SessionReply::TableConflict { table_id, current } => {
                assert_eq!(table_id, "t-5");
                assert_eq!(current.holder_id, "w-1");
            }
            other => panic!("unexpected reply: {other:?}"),
        }
        assert_eq!(second.holders().count(), 0);
    }

    #[tokio::test]
    async fn test_free_by_other_holder_denied() {
        let locks = TableLockRegistry::spawn();
        let mut session = Session::default();
        session.handle_text(&locks, &select("t-5", "w-1")).await;

        let reply = session
            .handle_text(&locks, r#"{"type":"table_freed","table_id":"t-5","holder_id":"w-2"}"#)
            .await;
        assert!(matches!(reply, SessionReply::TableReleaseDenied { .. }));

        let reply = session
            .handle_text(&locks, r#"{"type":"table_freed","table_id":"t-5","holder_id":"w-1"}"#)
            .await;
        assert_eq!(
            reply,
            SessionReply::TableReleased {
                table_id: "t-5".into()
            }
        );
    }

    #[tokio::test]
    async fn test_close_releases_with_disconnect_reason() {
        let locks = TableLockRegistry::spawn();
        let mut events = locks.subscribe();
        let mut session = Session::default();
        session.handle_text(&locks, &select("t-1", "w-1")).await;
        session.handle_text(&locks, &select("t-2", "w-1")).await;

        session.close(&locks).await;
        assert!(locks.list_locked().await.unwrap().is_empty());

        let mut reasons = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let shared::models::LockEvent::TableUnlocked { reason, .. } = event {
                reasons.push(reason);
            }
        }
        assert_eq!(reasons, vec![UnlockReason::Disconnect, UnlockReason::Disconnect]);
    }

    #[tokio::test]
    async fn test_blank_holder_is_rejected() {
        let locks = TableLockRegistry::spawn();
        let mut session = Session::default();

        let reply = session.handle_text(&locks, &select("t-3", "  ")).await;
        assert_eq!(
            reply,
            SessionReply::Error {
                message: "holder_id is required".into()
            }
        );
        assert_eq!(session.holders().count(), 0);
        assert!(locks.list_locked().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_garbage_frame_gets_error_reply() {
        let locks = TableLockRegistry::spawn();
        let mut session = Session::default();
        let reply = session.handle_text(&locks, r#"{"type":"dance"}"#).await;
        assert!(matches!(reply, SessionReply::Error { .. }));
    }

    #[test]
    fn test_reply_wire_format() {
        let json = serde_json::to_value(SessionReply::TableReleased {
            table_id: "t-5".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "table_released");
        assert_eq!(json["table_id"], "t-5");
    }
}
