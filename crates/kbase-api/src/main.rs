//! kbase API server.

use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kbase_api::{app, services, ApiConfig, StoreKind, Stores};
use kbase_convert::GotenbergBackend;
use kbase_core::ConversionBackend;
use kbase_db::{Database, PoolConfig};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str =
    "kbase_api=debug,kbase_content=debug,kbase_db=info,kbase_convert=info,tower_http=debug";

/// Log output settings.
///
/// - `LOG_FORMAT`: "json" or "text" (default "text")
/// - `LOG_FILE`: write to a daily-rotated file instead of stdout
/// - `LOG_ANSI`: force colors on or off; files default to off
/// - `RUST_LOG`: filter directives, see [`DEFAULT_LOG_FILTER`]
struct LogSettings {
    json: bool,
    file: Option<PathBuf>,
    ansi: Option<bool>,
}

impl LogSettings {
    fn from_env() -> Self {
        Self {
            json: std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json"),
            file: std::env::var_os("LOG_FILE").map(PathBuf::from),
            ansi: std::env::var("LOG_ANSI")
                .ok()
                .map(|v| v == "true" || v == "1"),
        }
    }
}

/// Install the global subscriber. The returned guard flushes the file
/// writer and must live until shutdown.
fn init_tracing(settings: &LogSettings) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (writer, guard) = match &settings.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path.file_name().unwrap_or(OsStr::new("kbase-api.log"));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(settings.ansi.unwrap_or(settings.file.is_none()));
    let registry = tracing_subscriber::registry().with(filter);
    if settings.json {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }
    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_settings = LogSettings::from_env();
    let _log_guard = init_tracing(&log_settings);
    info!(
        json = log_settings.json,
        log_file = ?log_settings.file,
        "Logging initialized"
    );

    let config = ApiConfig::from_env()?;
    config.converter.validate()?;

    let stores = match config.store {
        StoreKind::Postgres => {
            let db = Database::connect_with_config(&config.database_url, PoolConfig::from_env()?)
                .await?;
            db.migrate().await?;
            info!(subsystem = "db", "Migrations applied");
            Stores::postgres(&db)
        }
        StoreKind::Memory => {
            info!(subsystem = "db", "Using in-memory stores; contents are lost on restart");
            Stores::memory()
        }
    };

    let converter: Arc<dyn ConversionBackend> =
        Arc::new(GotenbergBackend::new(config.converter.clone()));
    info!(
        subsystem = "convert",
        backend = converter.name(),
        url = %config.converter.convert_url(),
        "Conversion backend configured"
    );

    let (state, docs) = services(stores, converter, config.doc_scope);
    let app = app(state, docs, &config)?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(doc_scope = ?config.doc_scope, %addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
