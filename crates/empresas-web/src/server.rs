use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use empresas_core::RecordService;
use empresas_store::{migrate_file, JsonFileStore};

use crate::auth::AdminSecret;
use crate::{assets, handlers};

/// Everything the server needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub admin_password: String,
    /// Normalize the data file before accepting requests.
    pub migrate_on_start: bool,
}

pub struct AppState {
    pub service: RecordService<JsonFileStore>,
    pub admin: AdminSecret,
}

impl AppState {
    pub fn new(store: JsonFileStore, admin_password: &str) -> Self {
        Self {
            service: RecordService::new(store),
            admin: AdminSecret::new(admin_password),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/records",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route(
            "/dados",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route("/records/status/{id}", put(handlers::update_status))
        .route("/admin", get(assets::admin_page))
        .route("/admin/password", post(handlers::admin_login))
        .route("/admin/replace-all", post(handlers::replace_all))
        .route("/admin/add-multiple", post(handlers::add_multiple))
        .route("/admin/clear-all", post(handlers::clear_all))
        .route("/admin/edit/{index}", put(handlers::edit_record))
        .route("/admin/delete/{index}", delete(handlers::delete_record))
        .route("/admin/upload-json", post(handlers::upload_json))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server on a fresh runtime. Blocks until Ctrl-C.
pub fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(serve(config))
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&config.data_path);
    if config.migrate_on_start {
        // Requests on an unreadable file fail individually; keep serving.
        if let Err(e) = migrate_file(&store) {
            error!("data migration failed: {e}");
        }
    }

    let state = Arc::new(AppState::new(store, &config.admin_password));
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot listen on {addr}"))?;

    info!(data = %config.data_path.display(), "server running on http://{addr}");
    info!("admin interface: http://{addr}/admin");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
