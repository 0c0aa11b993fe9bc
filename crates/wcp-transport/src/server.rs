//! WebSocket transport server using Axum.
//!
//! Handles the HTTP upgrade, the token handshake, and message routing to
//! the WCP server. Notifications from the broadcast channel are forwarded
//! to every authenticated connection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use serde_json::{Value, json};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use wcp_protocol::{
    HandlerResult, Methods, Notifications, WCPNotification, WCPRequest, WCPResponse,
    auth::{AuthConfig, AuthErrorCode, HandshakeParams, HandshakeResult},
};

use crate::client::ClientConnection;

pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Implemented by the WCP server; called for every authenticated request.
pub trait RequestHandler: Send + Sync + 'static {
    fn handle_request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> impl std::future::Future<Output = HandlerResult> + Send;

    /// Name of the active workspace, reported in the welcome message.
    fn active_workspace(&self) -> Option<String> {
        None
    }

    /// Sent to each client right after its welcome message.
    fn connect_notifications(&self) -> Vec<WCPNotification> {
        Vec::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid bind address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("failed to bind: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Port to listen on (0 for OS-assigned)
    pub port: u16,
    pub hostname: String,
    /// `None` accepts every connection without a handshake
    pub auth: Option<AuthConfig>,
    pub max_connections: Option<usize>,
    /// Log every request at info level
    pub verbose_logging: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: 7071,
            hostname: "127.0.0.1".into(),
            auth: None,
            max_connections: Some(32),
            verbose_logging: false,
        }
    }
}

struct AppState<H: RequestHandler> {
    handler: Arc<H>,
    config: TransportConfig,
    notification_tx: broadcast::Sender<String>,
    client_count: Arc<AtomicUsize>,
}

/// A running listener. Dropping it does not stop the server; call [`stop`](Self::stop).
pub struct TransportServer {
    notification_tx: broadcast::Sender<String>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
    port: u16,
    client_count: Arc<AtomicUsize>,
}

impl TransportServer {
    pub async fn start<H: RequestHandler>(config: TransportConfig, handler: H) -> Result<Self, TransportError> {
        let (notification_tx, _) = broadcast::channel(1024);
        Self::start_with_sender(config, Arc::new(handler), notification_tx).await
    }

    /// Start with a channel the handler already publishes on.
    pub async fn start_with_sender<H: RequestHandler>(
        config: TransportConfig,
        handler: Arc<H>,
        notification_tx: broadcast::Sender<String>,
    ) -> Result<Self, TransportError> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let client_count = Arc::new(AtomicUsize::new(0));

        let state = Arc::new(AppState {
            handler,
            config: config.clone(),
            notification_tx: notification_tx.clone(),
            client_count: client_count.clone(),
        });

        let app = Router::new()
            .route("/ws", get(ws_upgrade_handler::<H>))
            .route("/health", get(health_handler::<H>))
            .with_state(state);

        let addr: SocketAddr = format!("{}:{}", config.hostname, config.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let actual_port = listener.local_addr()?.port();

        info!("WCP transport listening on ws://{}:{}/ws", config.hostname, actual_port);

        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await;
            if let Err(e) = served {
                error!("Transport server failed: {e}");
            }
        });

        Ok(Self {
            notification_tx,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            port: actual_port,
            client_count,
        })
    }

    pub fn broadcast(&self, notification: WCPNotification) {
        let _ = self.notification_tx.send(notification.to_json());
    }

    pub fn notification_sender(&self) -> broadcast::Sender<String> {
        self.notification_tx.clone()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn client_count(&self) -> usize {
        self.client_count.load(Ordering::Relaxed)
    }

    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("WCP transport server stopped");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn ws_upgrade_handler<H: RequestHandler>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<H>>>,
) -> impl IntoResponse {
    if let Some(max) = state.config.max_connections {
        if state.client_count.load(Ordering::Relaxed) >= max {
            warn!("Connection rejected: max connections reached ({max})");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    }

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
        .into_response()
}

async fn health_handler<H: RequestHandler>(State(state): State<Arc<AppState<H>>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": SERVER_VERSION,
        "clients": state.client_count.load(Ordering::Relaxed),
        "workspace": state.handler.active_workspace(),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// WebSocket Connection Handler
// ─────────────────────────────────────────────────────────────────────────────

async fn handle_ws_connection<H: RequestHandler>(socket: WebSocket, state: Arc<AppState<H>>) {
    state.client_count.fetch_add(1, Ordering::Relaxed);

    let client_id = uuid::Uuid::new_v4().to_string();
    info!("Client connected: {client_id}");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut notification_rx = state.notification_tx.subscribe();

    let mut client = match &state.config.auth {
        Some(auth) => {
            let params = serde_json::to_value(auth.greeting(SERVER_VERSION)).ok();
            let required = WCPNotification::new(Notifications::AUTH_REQUIRED, params);
            if let Err(e) = ws_tx.send(Message::Text(required.to_json().into())).await {
                error!("Failed to send auth/required: {e}");
                state.client_count.fetch_sub(1, Ordering::Relaxed);
                return;
            }
            ClientConnection::new(client_id.clone())
        }
        None => {
            send_welcome(&mut ws_tx, &client_id, state.handler.as_ref()).await;
            ClientConnection::new_authenticated(client_id.clone())
        }
    };

    let auth_deadline = state
        .config
        .auth
        .as_ref()
        .map(|a| tokio::time::Instant::now() + a.handshake_timeout());

    loop {
        let auth_sleep = async {
            match auth_deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        let authenticated = client.is_authenticated();

        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        client.touch();
                        if !authenticated {
                            match handle_handshake(&text, &state.config, &mut client, state.handler.as_ref()) {
                                HandshakeOutcome::Authenticated(response) => {
                                    let _ = ws_tx.send(Message::Text(response.into())).await;
                                    send_welcome(&mut ws_tx, &client_id, state.handler.as_ref()).await;
                                    debug!("Client authenticated: {client_id}");
                                }
                                HandshakeOutcome::Rejected(response) => {
                                    let _ = ws_tx.send(Message::Text(response.into())).await;
                                    warn!("Client auth failed: {client_id}");
                                    break;
                                }
                                HandshakeOutcome::NotHandshake(response) => {
                                    let _ = ws_tx.send(Message::Text(response.into())).await;
                                }
                            }
                            continue;
                        }

                        let response = handle_message(&text, state.handler.as_ref(), state.config.verbose_logging).await;
                        client.requests += 1;
                        if let Err(e) = ws_tx.send(Message::Text(response.into())).await {
                            error!("Failed to send response to {client_id}: {e}");
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_tx.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("WebSocket error for {client_id}: {e}");
                        break;
                    }
                    _ => {}
                }
            }

            notification = notification_rx.recv() => {
                match notification {
                    Ok(msg) if authenticated => {
                        if let Err(e) = ws_tx.send(Message::Text(msg.into())).await {
                            error!("Failed to broadcast to {client_id}: {e}");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Client {client_id} missed {skipped} notification(s)");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Ok(_) => {}
                }
            }

            _ = auth_sleep, if !authenticated => {
                warn!("Auth timeout for client {client_id}");
                let err = WCPResponse::error(None, AuthErrorCode::HandshakeTimeout.into());
                let _ = ws_tx.send(Message::Text(err.to_json().into())).await;
                break;
            }
        }
    }

    state.client_count.fetch_sub(1, Ordering::Relaxed);
    info!(
        "Client disconnected: {client_id} after {:?}, {} request(s) (total: {})",
        client.age(),
        client.requests,
        state.client_count.load(Ordering::Relaxed)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn send_welcome<H: RequestHandler>(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    client_id: &str,
    handler: &H,
) {
    let welcome = WCPNotification::new(
        Notifications::SERVER_CONNECTED,
        Some(json!({
            "clientId": client_id,
            "serverVersion": SERVER_VERSION,
            "workspace": handler.active_workspace(),
        })),
    );
    let _ = ws_tx.send(Message::Text(welcome.to_json().into())).await;
    for notification in handler.connect_notifications() {
        let _ = ws_tx.send(Message::Text(notification.to_json().into())).await;
    }
}

enum HandshakeOutcome {
    Authenticated(String),
    Rejected(String),
    NotHandshake(String),
}

fn handle_handshake<H: RequestHandler>(
    text: &str,
    config: &TransportConfig,
    client: &mut ClientConnection,
    handler: &H,
) -> HandshakeOutcome {
    let request = match WCPRequest::parse(text) {
        Ok(request) => request,
        Err(err) => return HandshakeOutcome::NotHandshake(WCPResponse::from(err).to_json()),
    };
    if request.method != Methods::AUTH_HANDSHAKE {
        let err = WCPResponse::error(
            Some(request.id),
            AuthErrorCode::NotAuthenticated.into(),
        );
        return HandshakeOutcome::NotHandshake(err.to_json());
    }

    let params: Option<HandshakeParams> = request.params.and_then(|v| serde_json::from_value(v).ok());

    match params {
        Some(p) if config.auth.as_ref().is_none_or(|auth| auth.accepts(&p.token)) => {
            let session_id = uuid::Uuid::new_v4().to_string();
            let result = HandshakeResult {
                client_id: client.id.clone(),
                session_id: session_id.clone(),
                server_version: SERVER_VERSION.into(),
                workspace: handler.active_workspace(),
            };
            client.authenticate(session_id, p.client);
            let value = serde_json::to_value(result).unwrap_or(Value::Null);
            HandshakeOutcome::Authenticated(WCPResponse::success(request.id, value).to_json())
        }
        _ => {
            client.reject();
            let err = WCPResponse::error(Some(request.id), AuthErrorCode::InvalidToken.into());
            HandshakeOutcome::Rejected(err.to_json())
        }
    }
}

async fn handle_message<H: RequestHandler>(text: &str, handler: &H, verbose: bool) -> String {
    let request = match WCPRequest::parse(text) {
        Ok(request) => request,
        Err(err) => return WCPResponse::from(err).to_json(),
    };
    if verbose {
        info!("Request {:?} {}", request.id, request.method);
    }
    let result = handler.handle_request(&request.method, request.params).await;
    WCPResponse::from_result(request.id, result).to_json()
}

