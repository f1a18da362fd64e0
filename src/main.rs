use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use clap::Parser;
use reqwest::Client;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

mod auth;
mod config;
mod db;
mod middleware;
mod models;
pub mod observability;
mod routes;
pub mod services;

#[cfg(test)]
mod tests;

/// Config file looked up in the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "warehouse-hooks.toml";

#[derive(Clone)]
pub struct AppState {
    pub http_client: Client,
    pub config: Arc<config::HooksConfig>,
    pub db: Arc<db::DbPool>,
    pub services: services::Services,
}

impl AppState {
    pub async fn new(config: config::HooksConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // One client for both the hub and the identity provider; reqwest pools
        // connections per host internally.
        let http_client = config
            .server
            .http_client
            .build_client()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        tracing::debug!(
            timeout_secs = config.server.http_client.timeout_secs,
            connect_timeout_secs = config.server.http_client.connect_timeout_secs,
            pool_max_idle_per_host = config.server.http_client.pool_max_idle_per_host,
            "HTTP client configured"
        );

        let pool = db::DbPool::from_config(&config.database).await?;
        if config.database.run_migrations() {
            pool.run_migrations().await?;
        }

        Ok(Self::from_parts(config, pool, http_client))
    }

    /// Assemble state from an already-connected database.
    pub fn from_parts(config: config::HooksConfig, db: db::DbPool, http_client: Client) -> Self {
        let services = services::Services::new(&db, &config, http_client.clone());

        Self {
            http_client,
            config: Arc::new(config),
            db: Arc::new(db),
            services,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Supplier-invoice and SSO bootstrap webhooks", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./warehouse-hooks.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the webhook server (default)
    Serve,
    /// Initialize a new configuration file
    Init {
        /// Path to create the config file (defaults to ./warehouse-hooks.toml)
        #[arg(short, long)]
        output: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run database migrations and exit
    ///
    /// Useful for Kubernetes init containers or CI/CD pipelines.
    Migrate,
}

/// Starter configuration written by `init`.
fn default_config_toml() -> &'static str {
    r#"# Warehouse webhooks configuration
# Values of the form ${VAR} are read from the environment at startup.

[server]
host = "127.0.0.1"
port = 8080

# SQLite database for local development
[database]
type = "sqlite"
path = "warehouse-hooks.db"

[invoices]
# Shared secret expected in x-api-key or Authorization: Bearer.
# Every invoice request is rejected while this is empty.
api_key = ""
default_currency = "SEK"

[sso]
hub_url = "http://localhost:8000/api/verify-signature"
auth_url = "http://localhost:9999"
# service_key = "${AUTH_SERVICE_KEY}"

[observability.logging]
level = "info"
format = "pretty"
"#
}

/// Resolve the config path from `--config` or the working directory.
fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf, String> {
    if let Some(path) = explicit_path {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()));
        }
        return Ok(path);
    }

    let cwd_config = PathBuf::from(DEFAULT_CONFIG_FILE);
    if cwd_config.exists() {
        return Ok(cwd_config);
    }

    Err(format!(
        "No config file found. Pass --config or run `warehouse-hooks init` to create {DEFAULT_CONFIG_FILE}"
    ))
}

/// Load the config or exit with a readable message.
fn load_config(explicit_path: Option<&str>) -> (PathBuf, config::HooksConfig) {
    let config_path = match resolve_config_path(explicit_path) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match config::HooksConfig::from_file(&config_path) {
        Ok(config) => (config_path, config),
        Err(e) => {
            eprintln!(
                "Failed to load config from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(1);
        }
    }
}

pub fn build_app(config: &config::HooksConfig, state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/live", get(routes::health::liveness))
        .route("/health/ready", get(routes::health::readiness))
        .merge(routes::webhook_routes());

    if let Some(cors_layer) = config.server.cors.clone().into_layer() {
        app = app.layer(cors_layer);
    }

    // Request IDs wrap CORS and the body limit so preflights and 413s carry one.
    app.layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Init { output, force }) => run_init_default(output, force),
        Some(Command::Migrate) => run_migrate(args.config.as_deref()).await,
        Some(Command::Serve) | None => run_server(args.config.as_deref()).await,
    }
}

fn run_init_default(output: Option<String>, force: bool) {
    let output_path = PathBuf::from(output.unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()));

    if output_path.exists() && !force {
        eprintln!(
            "Config file already exists: {}\nUse --force to overwrite.",
            output_path.display()
        );
        std::process::exit(1);
    }

    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!("Failed to create directory {}: {}", parent.display(), e);
        std::process::exit(1);
    }

    if let Err(e) = std::fs::write(&output_path, default_config_toml()) {
        eprintln!("Failed to write config file: {}", e);
        std::process::exit(1);
    }

    println!("Created config file: {}", output_path.display());
    println!();
    println!("Set invoices.api_key and the [sso] endpoints, then run:");
    println!("  warehouse-hooks serve --config {}", output_path.display());
}

async fn run_server(explicit_config_path: Option<&str>) {
    let (config_path, config) = load_config(explicit_config_path);

    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    tracing::info!(
        config_file = %config_path.display(),
        "Starting warehouse webhooks"
    );

    if config.sso.service_key.is_empty() {
        tracing::warn!("sso.service_key is not set; identity provider calls will be unauthenticated");
    }

    let state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize application state");
            std::process::exit(1);
        }
    };

    let app = build_app(&config, state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, address = %bind_addr, "Failed to bind to address");
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}

async fn run_migrate(explicit_config_path: Option<&str>) {
    let (config_path, config) = load_config(explicit_config_path);

    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    tracing::info!(
        config_file = %config_path.display(),
        "Running database migrations"
    );

    match db::DbPool::from_config(&config.database).await {
        Ok(pool) => match pool.run_migrations().await {
            Ok(()) => {
                tracing::info!("Database migrations completed successfully");
                std::process::exit(0);
            }
            Err(e) => {
                tracing::error!(error = %e, "Database migrations failed");
                eprintln!("Error: Database migrations failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = config::HooksConfig::from_str(default_config_toml()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.invoices.api_key.is_empty());
        assert_eq!(config.invoices.default_currency, "SEK");
    }

    #[test]
    fn test_resolve_missing_explicit_path() {
        let err = resolve_config_path(Some("/nonexistent/hooks.toml")).unwrap_err();
        assert!(err.contains("not found"), "{err}");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["warehouse-hooks", "init", "--force", "-o", "x.toml"]);
        assert!(matches!(
            args.command,
            Some(Command::Init { force: true, ref output }) if output.as_deref() == Some("x.toml")
        ));

        let args = Args::parse_from(["warehouse-hooks", "--config", "c.toml"]);
        assert!(args.command.is_none());
        assert_eq!(args.config.as_deref(), Some("c.toml"));
    }
}
