//! Dialog client that talks to players over their WebSocket connections.
//!
//! Each request gets a fresh `request_id`; the matching `DialogResponse` from
//! the client resolves the waiting call through a oneshot channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use iobj_domain::PlayerId;
use iobj_shared::ServerMessage;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::api::connections::ConnectionManager;
use crate::infrastructure::ports::{
    ChoiceReply, DialogError, DialogPort, MultichoiceDialog, PromptDialog, PromptReply,
};

/// Raw answer from a client before it is shaped into a port reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogAnswer {
    pub token: Option<String>,
    pub msg: Option<String>,
}

struct PendingDialog {
    player_id: PlayerId,
    reply: oneshot::Sender<DialogAnswer>,
}

pub struct WsDialogClient {
    connections: Arc<ConnectionManager>,
    pending: DashMap<Uuid, PendingDialog>,
}

impl WsDialogClient {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self {
            connections,
            pending: DashMap::new(),
        }
    }

    /// Deliver a client's answer to the waiting request.
    ///
    /// Answers for unknown or expired requests, or from a player other than the
    /// one asked, are dropped and `false` is returned.
    pub fn resolve(&self, player_id: &PlayerId, request_id: Uuid, answer: DialogAnswer) -> bool {
        let Some((_, pending)) = self
            .pending
            .remove_if(&request_id, |_, pending| &pending.player_id == player_id)
        else {
            tracing::debug!(
                player_id = %player_id,
                request_id = %request_id,
                "Dropping answer for unknown dialog"
            );
            return false;
        };
        pending.reply.send(answer).is_ok()
    }

    /// Number of dialogs still waiting for an answer.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    async fn request(
        &self,
        player_id: &PlayerId,
        timeout: Duration,
        build: impl FnOnce(Uuid, u64) -> ServerMessage,
    ) -> Result<DialogAnswer, DialogError> {
        let request_id = Uuid::new_v4();
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(
            request_id,
            PendingDialog {
                player_id: player_id.clone(),
                reply: tx,
            },
        );
        // Removes the entry however this future ends, including being dropped.
        let _pending = PendingGuard {
            pending: &self.pending,
            request_id,
        };

        let delivered = self
            .connections
            .send_to_player(player_id, build(request_id, timeout_ms))
            .await;
        if delivered == 0 {
            return Err(DialogError::NotConnected(player_id.to_string()));
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(_)) => Err(DialogError::Transport(
                "dialog reply channel closed".to_string(),
            )),
            Err(_) => Err(DialogError::Timeout(timeout_ms)),
        }
    }
}

struct PendingGuard<'a> {
    pending: &'a DashMap<Uuid, PendingDialog>,
    request_id: Uuid,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.request_id);
    }
}

#[async_trait]
impl DialogPort for WsDialogClient {
    async fn show_multichoice(
        &self,
        player_id: &PlayerId,
        dialog: MultichoiceDialog,
    ) -> Result<ChoiceReply, DialogError> {
        let MultichoiceDialog {
            timeout,
            title,
            body,
            choices,
        } = dialog;
        let answer = self
            .request(player_id, timeout, |request_id, timeout_ms| {
                ServerMessage::ShowDialogWithMultichoice {
                    request_id,
                    timeout_ms,
                    title,
                    body,
                    choices,
                }
            })
            .await?;
        Ok(ChoiceReply {
            token: answer.token,
        })
    }

    async fn show_prompt(
        &self,
        player_id: &PlayerId,
        dialog: PromptDialog,
    ) -> Result<PromptReply, DialogError> {
        let PromptDialog {
            timeout,
            title,
            body,
            button_text,
        } = dialog;
        let answer = self
            .request(player_id, timeout, |request_id, timeout_ms| {
                ServerMessage::ShowDialogWithPrompt {
                    request_id,
                    timeout_ms,
                    title,
                    body,
                    button_text,
                }
            })
            .await?;
        Ok(PromptReply { msg: answer.msg })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iobj_shared::DialogChoice;
    use tokio::sync::mpsc;

    async fn connected(player: &str) -> (Arc<ConnectionManager>, mpsc::Receiver<ServerMessage>) {
        let connections = Arc::new(ConnectionManager::new());
        let (tx, rx) = mpsc::channel(8);
        let conn = Uuid::new_v4();
        connections.register(conn, tx).await;
        connections
            .identify(conn, PlayerId::from(player))
            .await
            .expect("identify");
        (connections, rx)
    }

    fn multichoice(timeout: Duration) -> MultichoiceDialog {
        MultichoiceDialog {
            timeout,
            title: "Guard".to_string(),
            body: "Halt!".to_string(),
            choices: vec![DialogChoice::new("s_leave", "Leave")],
        }
    }

    #[tokio::test]
    async fn answer_resolves_waiting_multichoice() {
        let (connections, mut rx) = connected("alice").await;
        let client = Arc::new(WsDialogClient::new(connections));
        let player = PlayerId::from("alice");

        let answering = {
            let client = client.clone();
            let player = player.clone();
            tokio::spawn(async move {
                let Some(ServerMessage::ShowDialogWithMultichoice {
                    request_id, title, ..
                }) = rx.recv().await
                else {
                    panic!("expected multichoice dialog");
                };
                assert_eq!(title, "Guard");
                client.resolve(
                    &player,
                    request_id,
                    DialogAnswer {
                        token: Some("s_leave".to_string()),
                        msg: None,
                    },
                )
            })
        };

        let reply = client
            .show_multichoice(&player, multichoice(Duration::from_secs(5)))
            .await
            .expect("reply");
        assert_eq!(reply.token.as_deref(), Some("s_leave"));
        assert!(answering.await.expect("join"));
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test]
    async fn unanswered_dialog_times_out() {
        let (connections, _rx) = connected("alice").await;
        let client = WsDialogClient::new(connections);

        let err = client
            .show_prompt(
                &PlayerId::from("alice"),
                PromptDialog {
                    timeout: Duration::from_millis(20),
                    title: "t".to_string(),
                    body: "b".to_string(),
                    button_text: None,
                },
            )
            .await
            .expect_err("timeout");
        assert_eq!(err, DialogError::Timeout(20));
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test]
    async fn disconnected_player_is_reported() {
        let client = WsDialogClient::new(Arc::new(ConnectionManager::new()));
        let err = client
            .show_multichoice(&PlayerId::from("nobody"), multichoice(Duration::from_secs(1)))
            .await
            .expect_err("not connected");
        assert!(matches!(err, DialogError::NotConnected(_)));
    }

    #[tokio::test]
    async fn answer_from_other_player_is_ignored() {
        let (connections, mut rx) = connected("alice").await;
        let client = Arc::new(WsDialogClient::new(connections));

        let waiting = {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .show_multichoice(&PlayerId::from("alice"), multichoice(Duration::from_millis(100)))
                    .await
            })
        };
        let Some(ServerMessage::ShowDialogWithMultichoice { request_id, .. }) = rx.recv().await
        else {
            panic!("expected multichoice dialog");
        };

        let accepted = client.resolve(
            &PlayerId::from("mallory"),
            request_id,
            DialogAnswer {
                token: Some("s_leave".to_string()),
                msg: None,
            },
        );
        assert!(!accepted);
        let result = waiting.await.expect("join");
        assert!(matches!(result, Err(DialogError::Timeout(_))));
    }

    #[tokio::test]
    async fn abandoned_dialogs_leave_nothing_pending() {
        let (connections, _rx) = connected("alice").await;
        let client = WsDialogClient::new(connections);
        let player = PlayerId::from("alice");

        for _ in 0..5 {
            let abandoned = tokio::time::timeout(
                Duration::from_millis(10),
                client.show_prompt(
                    &player,
                    PromptDialog {
                        timeout: Duration::from_secs(60),
                        title: "t".to_string(),
                        body: "b".to_string(),
                        button_text: None,
                    },
                ),
            )
            .await;
            assert!(abandoned.is_err());
        }

        assert_eq!(client.pending_count(), 0);
    }
}
