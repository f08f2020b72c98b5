//! `QuizbrawlServer`: the TCP accept loop and shared server state.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use quizbrawl_game::Rules;
use quizbrawl_lobby::LobbyManager;
use quizbrawl_questions::{HttpQuestionSource, QuestionSource};

use crate::config::AppConfig;
use crate::connection::handle_connection;
use crate::error::ServerError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The lobby
/// manager locks its registry internally and only around map access, so
/// no connection ever waits on another lobby's work. In-game traffic
/// bypasses the manager entirely through per-lobby handles.
pub(crate) struct ServerState<Q: QuestionSource> {
    pub(crate) lobbies: LobbyManager<Q>,
}

/// A running Quizbrawl server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuizbrawlServer<Q: QuestionSource> {
    listener: TcpListener,
    state: Arc<ServerState<Q>>,
}

impl QuizbrawlServer<HttpQuestionSource> {
    /// Builds a server from configuration, backed by the HTTP question
    /// service.
    pub async fn from_config(config: &AppConfig) -> Result<Self, ServerError> {
        let source = HttpQuestionSource::new(
            &config.question_service.url,
            Duration::from_secs(config.question_service.timeout_secs),
        )?;
        Self::bind(&config.bind_addr, source, config.rules.clone()).await
    }
}

impl<Q: QuestionSource> QuizbrawlServer<Q> {
    /// Binds the listener with an explicit question source. Tests use
    /// this to swap in a stub source.
    pub async fn bind(addr: &str, source: Q, rules: Rules) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr, "quizbrawl server listening");

        let state = Arc::new(ServerState {
            lobbies: LobbyManager::new(source, rules),
        });

        Ok(Self { listener, state })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, state).await {
                            tracing::debug!(
                                %addr,
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
