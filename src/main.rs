//! Playground WCP: Workspace Command Protocol Server
//!
//! Serves the playground's virtual workspaces (file trees, tabs, debounced
//! edits, build inputs) over JSON-RPC 2.0 via WebSocket. State lives in a
//! SQLite file under the data directory, or in memory with `--in-memory`.
//!
//! Usage:
//!   playground-wcp                          # Default port 7071, ~/.playground-wcp
//!   playground-wcp --port 8080              # Custom port
//!   playground-wcp --in-memory              # Nothing touches disk
//!   playground-wcp --token mysecret         # Custom auth token

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wcp_protocol::auth::AuthConfig;
use wcp_server::autosave::DEFAULT_TICK;
use wcp_server::{AutoSaveTicker, ServerContext, WCPServer};
use wcp_transport::server::{TransportConfig, TransportServer};
use wcp_vfs::{MemoryStore, RegistryConfig, SqliteStore, Store};

const DATABASE_FILE: &str = "workspaces.db";
const TOKEN_FILE: &str = "auth-token";
const SERVER_INFO_FILE: &str = "server.json";

#[derive(Parser, Debug)]
#[command(name = "playground-wcp", about = "Playground WCP Server: Workspace Command Protocol")]
struct Cli {
    /// Port to listen on (0 for OS-assigned)
    #[arg(long, default_value = "7071")]
    port: u16,

    /// Hostname to bind to
    #[arg(long, default_value = "127.0.0.1")]
    hostname: String,

    /// Directory for the workspace database, settings, and token
    /// (default: ~/.playground-wcp)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep all workspace state in memory; nothing is written to disk
    #[arg(long, conflicts_with = "data_dir")]
    in_memory: bool,

    /// Authentication token (persisted random token if not provided)
    #[arg(long)]
    token: Option<String>,

    /// Maximum concurrent connections
    #[arg(long, default_value = "32")]
    max_connections: usize,

    /// Auto-save debounce in milliseconds (overrides files.autoSaveDelay)
    #[arg(long)]
    autosave_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Write logs to a file (defaults to <data-dir>/logs/wcp.log if no path given)
    #[arg(long, default_missing_value = "DEFAULT", num_args = 0..=1)]
    log_file: Option<String>,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".playground-wcp")
}

fn init_tracing(cli: &Cli, data_dir: Option<&Path>) -> Result<(), String> {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let Some(log_file_arg) = &cli.log_file else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(());
    };

    let log_path = if log_file_arg == "DEFAULT" {
        data_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(default_data_dir)
            .join("logs/wcp.log")
    } else {
        PathBuf::from(log_file_arg)
    };
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| format!("Failed to open log file {}: {e}", log_path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    eprintln!("Logging to {}", log_path.display());
    Ok(())
}

/// Reuse the persisted token, or generate and persist a new one.
/// Without a data directory the token lives only as long as the process.
fn resolve_token(explicit: Option<String>, data_dir: Option<&Path>) -> String {
    if let Some(token) = explicit {
        return token;
    }
    let token_path = data_dir.map(|dir| dir.join(TOKEN_FILE));

    if let Some(path) = &token_path {
        if let Ok(existing) = std::fs::read_to_string(path) {
            let trimmed = existing.trim();
            if trimmed.len() >= 32 {
                return trimmed.to_string();
            }
        }
    }

    use rand::Rng;
    let bytes: [u8; 32] = rand::rng().random();
    let token = hex::encode(bytes);

    if let Some(path) = &token_path {
        if let Err(e) = std::fs::write(path, &token) {
            warn!("Could not persist auth token to {}: {e}", path.display());
        }
        restrict_permissions(path);
    }
    token
}

/// Owner-only read/write.
fn restrict_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    #[cfg(not(unix))]
    let _ = path;
}

fn open_store(data_dir: Option<&Path>) -> Result<Arc<dyn Store>, String> {
    match data_dir {
        Some(dir) => {
            let path = dir.join(DATABASE_FILE);
            let store = SqliteStore::open(&path)
                .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
            info!("Workspace store: {}", path.display());
            Ok(Arc::new(store))
        }
        None => {
            info!("Workspace store: in memory");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let data_dir = if cli.in_memory {
        None
    } else {
        Some(cli.data_dir.clone().unwrap_or_else(default_data_dir))
    };
    if let Some(dir) = &data_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Failed to create data directory {}: {e}", dir.display());
            std::process::exit(1);
        }
    }

    if let Err(e) = init_tracing(&cli, data_dir.as_deref()) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let token_was_explicit = cli.token.is_some();
    let auth_token = resolve_token(cli.token.clone(), data_dir.as_deref());

    let store = match open_store(data_dir.as_deref()) {
        Ok(store) => store,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let context = match ServerContext::open(store, RegistryConfig::default(), data_dir.clone()) {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to load workspaces: {e}");
            std::process::exit(1);
        }
    };

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Playground WCP Server                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match &data_dir {
        Some(dir) => println!("  Data:       {}", dir.display()),
        None => println!("  Data:       in memory (--in-memory)"),
    }
    {
        let registry = context.registry.lock();
        println!(
            "  Workspaces: {} (active: {})",
            registry.names().len(),
            registry.current_name().unwrap_or("none")
        );
    }
    println!("  Binding:    {}:{} (localhost only)", cli.hostname, cli.port);
    println!();

    let (notification_tx, _) = broadcast::channel::<String>(1024);

    let mut server = WCPServer::with_default_services(context.clone());
    server.set_notification_sender(notification_tx.clone());

    if let Err(e) = server.initialize().await {
        error!("Failed to initialize WCP server: {e}");
        std::process::exit(1);
    }
    if let Some(ms) = cli.autosave_ms {
        context
            .registry
            .lock()
            .set_autosave_debounce(Duration::from_millis(ms));
    }

    let ticker = AutoSaveTicker::spawn(context.registry.clone(), DEFAULT_TICK);
    let server = Arc::new(server);

    let transport_config = TransportConfig {
        port: cli.port,
        hostname: cli.hostname.clone(),
        auth: Some(AuthConfig::new(auth_token.clone())),
        max_connections: Some(cli.max_connections),
        verbose_logging: cli.verbose,
    };

    let mut transport =
        match TransportServer::start_with_sender(transport_config, server.clone(), notification_tx).await {
            Ok(t) => t,
            Err(e) => {
                error!("Failed to start transport: {e}");
                std::process::exit(1);
            }
        };

    let actual_port = transport.port();
    let ws_url = format!("ws://{}:{}/ws", cli.hostname, actual_port);

    // Connection info for client discovery
    let server_info_path = data_dir.as_ref().map(|dir| dir.join(SERVER_INFO_FILE));
    if let Some(path) = &server_info_path {
        let server_info = serde_json::json!({
            "host": cli.hostname,
            "port": actual_port,
            "token": auth_token,
            "serverVersion": env!("CARGO_PKG_VERSION"),
            "pid": std::process::id(),
        });
        if let Ok(json_str) = serde_json::to_string_pretty(&server_info) {
            let _ = std::fs::write(path, &json_str);
            restrict_permissions(path);
        }
    }

    println!("────────────────────────────────────────────────────────────────");
    println!();
    println!("  WebSocket endpoint:");
    println!("    {ws_url}");
    println!();
    println!("  Auth token:");
    if auth_token.len() > 16 {
        println!("    {}...{}", &auth_token[..8], &auth_token[auth_token.len() - 8..]);
    } else {
        println!("    {auth_token}");
    }
    if !token_was_explicit {
        match &data_dir {
            Some(dir) => println!("    (persisted to {})", dir.join(TOKEN_FILE).display()),
            None => println!("    (not persisted)"),
        }
    }
    println!();
    println!("  Press Ctrl+C to stop.");
    println!();

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {e}");
    }

    println!();
    println!("  Shutting down...");
    transport.stop().await;
    ticker.stop();

    match Arc::try_unwrap(server) {
        Ok(mut server) => server.shutdown().await,
        Err(_) => {
            // A connection task still holds the server; flush directly.
            let flushed = context.registry.lock().flush_all();
            info!("Flushed {} pending edit(s)", flushed);
        }
    }

    if let Some(path) = &server_info_path {
        let _ = std::fs::remove_file(path);
    }
    println!("  Server stopped.");
}
