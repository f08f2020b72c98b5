//! Per-connection handler: WebSocket upgrade, lobby join, and message
//! routing.
//!
//! Each accepted socket gets its own Tokio task running this handler.
//! The flow is:
//!   1. Upgrade, capturing the request URI for its query string
//!   2. Join the lobby named by `?lobby=...` (created on first join)
//!   3. Spawn a writer task that drains the lobby's outbound channel
//!   4. Loop: read frames, parse, forward to the lobby actor
//!   5. On any exit path, leave the lobby so empty lobbies get deleted

use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};

use quizbrawl_lobby::{LobbyHandle, PlayerSender};
use quizbrawl_protocol::{OutgoingMessage, PlayerId, encode_outgoing, parse_incoming};
use quizbrawl_questions::QuestionSource;

use crate::error::ServerError;
use crate::server::ServerState;

type WsWriter = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsReader = SplitStream<WebSocketStream<TcpStream>>;

/// Connection parameters carried in the URL query string.
struct ConnectParams {
    lobby: Option<String>,
    name: String,
}

fn parse_params(uri: &str) -> ConnectParams {
    let query = uri.split_once('?').map(|(_, q)| q).unwrap_or("");
    let mut lobby = None;
    let mut name = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "lobby" => lobby = Some(value.into_owned()),
            "name" => name = Some(value.into_owned()),
            _ => {}
        }
    }
    ConnectParams {
        lobby: lobby.filter(|code| !code.trim().is_empty()),
        name: name.unwrap_or_default(),
    }
}

/// Handles a single connection from upgrade to close.
pub(crate) async fn handle_connection<Q: QuestionSource>(
    stream: TcpStream,
    state: Arc<ServerState<Q>>,
) -> Result<(), ServerError> {
    // The callback runs during the HTTP upgrade; capture the request URI
    // so the query string is available afterwards.
    let mut uri = None;
    let ws = tokio_tungstenite::accept_hdr_async(stream, |req: &Request, resp: Response| {
        uri = Some(req.uri().to_string());
        Ok(resp)
    })
    .await?;
    let (mut writer, mut reader) = ws.split();

    let params = match uri.as_deref() {
        Some(uri) => parse_params(uri),
        None => ConnectParams {
            lobby: None,
            name: String::new(),
        },
    };
    let Some(code) = params.lobby else {
        refuse(&mut writer, "No lobby provided").await?;
        return Ok(());
    };

    let player_id = PlayerId::random();
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = match state
        .lobbies
        .join(&code, player_id, &params.name, tx.clone())
        .await
    {
        Ok(handle) => handle,
        Err(err) => {
            tracing::info!(lobby = %code, %err, "join refused");
            refuse(&mut writer, err.to_string()).await?;
            return Ok(());
        }
    };
    tracing::info!(lobby = %code, %player_id, name = %params.name, "player connected");

    // Writer task: everything the lobby sends this player goes through
    // `rx`, so socket writes never block the lobby actor.
    let writer_task = tokio::spawn(write_loop(writer, rx));

    let result = read_loop(&mut reader, &handle, player_id, &tx).await;

    // Unbinds the player's sender and deletes the lobby if it is now
    // empty. Runs on every exit path, clean close or not.
    state.lobbies.leave(&code, player_id).await;
    tracing::info!(lobby = %code, %player_id, "player disconnected");

    // Dropping our channel half lets the writer drain and close the socket.
    drop(tx);
    let _ = writer_task.await;

    result
}

/// Sends one error message and closes, for connections refused before
/// they join a lobby.
async fn refuse(writer: &mut WsWriter, error: impl Into<String>) -> Result<(), ServerError> {
    let text = encode_outgoing(&OutgoingMessage::Error {
        error: error.into(),
    })?;
    writer.send(Message::Text(text.into())).await?;
    writer.close().await?;
    Ok(())
}

/// Drains the player's outbound channel into the socket.
async fn write_loop(mut writer: WsWriter, mut rx: mpsc::UnboundedReceiver<OutgoingMessage>) {
    while let Some(msg) = rx.recv().await {
        let text = match encode_outgoing(&msg) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(%err, "failed to encode outbound message");
                continue;
            }
        };
        if writer.send(Message::Text(text.into())).await.is_err() {
            break;
        }
    }
    let _ = writer.close().await;
}

/// Reads frames until the client disconnects or commits a fatal
/// protocol violation.
async fn read_loop(
    reader: &mut WsReader,
    handle: &LobbyHandle,
    player_id: PlayerId,
    tx: &PlayerSender,
) -> Result<(), ServerError> {
    while let Some(frame) = reader.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                tracing::debug!(%player_id, %err, "socket error");
                break;
            }
        };
        let text = match frame {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Binary payloads and control frames are not part of the
            // protocol; tungstenite answers pings itself.
            _ => continue,
        };

        match parse_incoming(&text) {
            Ok(msg) => handle.handle_message(player_id, msg).await?,
            Err(err) if err.is_fatal() => {
                tracing::warn!(%player_id, %err, "closing connection");
                let _ = tx.send(OutgoingMessage::Error {
                    error: err.to_string(),
                });
                break;
            }
            Err(err) => {
                tracing::debug!(%player_id, %err, "rejected message");
                let _ = tx.send(OutgoingMessage::Error {
                    error: err.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params_extracts_lobby_and_name() {
        let params = parse_params("/?lobby=ROOM1&name=alice");
        assert_eq!(params.lobby.as_deref(), Some("ROOM1"));
        assert_eq!(params.name, "alice");
    }

    #[test]
    fn test_parse_params_decodes_percent_encoding() {
        let params = parse_params("/?lobby=ROOM1&name=Big%20Al");
        assert_eq!(params.name, "Big Al");
    }

    #[test]
    fn test_parse_params_missing_lobby() {
        let params = parse_params("/?name=alice");
        assert!(params.lobby.is_none());

        let params = parse_params("/");
        assert!(params.lobby.is_none());
        assert!(params.name.is_empty());
    }

    #[test]
    fn test_parse_params_blank_lobby_counts_as_missing() {
        let params = parse_params("/?lobby=%20%20&name=alice");
        assert!(params.lobby.is_none());
    }
}
