//! WCP Server Router: dispatches JSON-RPC requests to services.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::info;
use wcp_protocol::{notifications, HandlerResult, WCPError, WCPNotification};
use wcp_services::{BuildService, ConfigService, FsService, Service, TabService, WorkspaceService};
use wcp_transport::server::RequestHandler;
use wcp_vfs::Subscription;

use crate::context::ServerContext;
use crate::middleware::{LoggingMiddleware, Middleware, MiddlewareChain};
use crate::notify::bridge_events;

/// The WCP Server: owns services and routes requests.
pub struct WCPServer {
    context: ServerContext,
    /// One per namespace
    services: Vec<Box<dyn ErasedService>>,
    middleware: MiddlewareChain,
    state: ServerState,
    notification_tx: Option<broadcast::Sender<String>>,
    /// Bus subscription feeding `notification_tx`
    bridge: Option<Subscription>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServerState {
    Uninitialized,
    Running,
    Shutdown,
}

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Dyn-compatible face of [`Service`] so one server can hold every namespace.
trait ErasedService: Send + Sync {
    fn namespace(&self) -> &str;
    fn init(&self) -> BoxFuture<'_, InitResult>;
    fn handle<'a>(&'a self, method: &'a str, params: Option<Value>) -> BoxFuture<'a, HandlerResult>;
    fn shutdown(&self) -> BoxFuture<'_, ()>;
}

impl<S: Service> ErasedService for S {
    fn namespace(&self) -> &str {
        Service::namespace(self)
    }

    fn init(&self) -> BoxFuture<'_, InitResult> {
        Box::pin(Service::init(self))
    }

    fn handle<'a>(&'a self, method: &'a str, params: Option<Value>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(Service::handle(self, method, params))
    }

    fn shutdown(&self) -> BoxFuture<'_, ()> {
        Box::pin(Service::shutdown(self))
    }
}

impl WCPServer {
    pub fn new(context: ServerContext) -> Self {
        Self {
            context,
            services: Vec::new(),
            middleware: MiddlewareChain::new(),
            state: ServerState::Uninitialized,
            notification_tx: None,
            bridge: None,
        }
    }

    /// A server with every standard service and request logging.
    pub fn with_default_services(context: ServerContext) -> Self {
        let registry = context.registry.clone();
        let settings = context.settings.clone();
        let data_dir = context.data_dir.clone();

        let mut server = Self::new(context);
        server.register_service(FsService::new(registry.clone()));
        server.register_service(WorkspaceService::new(registry.clone(), settings.clone()));
        server.register_service(TabService::new(registry.clone()));
        server.register_service(BuildService::new(registry.clone()));
        server.register_service(ConfigService::new(settings, registry, data_dir));
        server.add_middleware(LoggingMiddleware);
        server
    }

    pub fn register_service<S: Service + 'static>(&mut self, service: S) {
        info!("Registering service: {}", Service::namespace(&service));
        self.services.push(Box::new(service));
    }

    pub fn add_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middleware.add(middleware);
    }

    /// Broadcast core events, and anything passed to
    /// [`emit_notification`](Self::emit_notification), on `tx`.
    pub fn set_notification_sender(&mut self, tx: broadcast::Sender<String>) {
        if let Some(previous) = self.bridge.take() {
            previous.dispose();
        }
        self.bridge = Some(bridge_events(self.context.bus(), tx.clone()));
        self.notification_tx = Some(tx);
    }

    pub async fn initialize(&mut self) -> InitResult {
        info!("Initializing WCP server {}", self.context.id);

        for service in &self.services {
            service.init().await?;
        }

        self.state = ServerState::Running;
        info!(
            "WCP server initialized ({} services, {} middleware)",
            self.services.len(),
            self.middleware.len()
        );
        Ok(())
    }

    /// Shut down every service. Pending edits are flushed by the fs service.
    pub async fn shutdown(&mut self) {
        if self.state == ServerState::Shutdown {
            return;
        }

        info!("Shutting down WCP server...");
        self.state = ServerState::Shutdown;

        for service in &self.services {
            service.shutdown().await;
        }
        if let Some(bridge) = self.bridge.take() {
            bridge.dispose();
        }

        info!("WCP server shutdown complete");
    }

    pub fn emit_notification(&self, method: &str, params: Option<Value>) {
        if let Some(tx) = &self.notification_tx {
            let _ = tx.send(WCPNotification::new(method, params).to_json());
        }
    }

    pub fn context(&self) -> &ServerContext {
        &self.context
    }

    pub fn is_running(&self) -> bool {
        self.state == ServerState::Running
    }

    async fn route_request(&self, method: &str, params: Option<Value>) -> HandlerResult {
        let namespace = method.split('/').next().unwrap_or("");
        match self.services.iter().find(|s| s.namespace() == namespace) {
            Some(service) => service.handle(method, params).await,
            None => Err(WCPError::method_not_found(method)),
        }
    }
}

impl RequestHandler for WCPServer {
    async fn handle_request(&self, method: &str, params: Option<Value>) -> HandlerResult {
        match self.state {
            ServerState::Shutdown => return Err(WCPError::shutting_down()),
            ServerState::Uninitialized => return Err(WCPError::not_initialized()),
            ServerState::Running => {}
        }

        let params = self
            .middleware
            .run_before(method, params)
            .await
            .map_err(WCPError::server_error)?;

        let result = self.route_request(method, params).await;
        if let Ok(value) = &result {
            self.middleware.observe(method, value).await;
        }
        result
    }

    fn active_workspace(&self) -> Option<String> {
        self.context.registry.lock().current_name().map(str::to_string)
    }

    /// `workspace/didInitialize` with the registry's current state. The
    /// event `init` published fired before any client could listen.
    fn connect_notifications(&self) -> Vec<WCPNotification> {
        let event = self.context.registry.lock().initialized_event();
        vec![notifications::from_event(&event)]
    }
}
