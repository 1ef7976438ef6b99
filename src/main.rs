//! Automerch
//!
//! Print-on-demand mockup service using Rust + Actix-Web.
//! Hosts a design, creates a draft product on Printify and waits for the
//! rendered mockup.

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod domain;
mod engine;
mod history;
mod mockup;
mod providers;
mod storage;

use crate::config::{LoggingSettings, Settings};
use crate::domain::ProductCatalog;
use crate::history::HistoryStore;
use crate::mockup::MockupOrchestrator;
use crate::providers::{FulfillmentProvider, PrintifyProvider};
use crate::storage::{ImageHost, ImgbbHost, UploadAdapter};

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub catalog: ProductCatalog,
    pub provider: Arc<dyn FulfillmentProvider>,
    pub uploads: Arc<UploadAdapter>,
    pub orchestrator: MockupOrchestrator,
    pub history: HistoryStore,
    pub started_at: Instant,
}

/// RUST_LOG wins over the configured directive
fn init_tracing(logging: &LoggingSettings) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)
            .with_context(|| format!("invalid logging.level directive '{}'", logging.level))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    init_tracing(&settings.logging)?;

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Starting Automerch v{} on {}", env!("CARGO_PKG_VERSION"), bind_addr);

    // Fulfillment provider
    let provider: Arc<dyn FulfillmentProvider> = Arc::new(
        PrintifyProvider::new(&settings.printify).context("Failed to initialize Printify client")?,
    );
    if settings.printify.api_token.is_none() || settings.printify.shop_id.is_empty() {
        warn!("Printify token or shop ID missing, product calls will fail until configured");
    }

    // Image host is optional, hosted designs and inline uploads work without it
    let host: Option<Arc<dyn ImageHost>> = match ImgbbHost::new(&settings.image_host) {
        Ok(host) => Some(Arc::new(host)),
        Err(e) => {
            warn!("Image host disabled: {}", e);
            None
        }
    };
    let uploads = Arc::new(
        UploadAdapter::new(host, &settings.image_host).context("Failed to initialize upload adapter")?,
    );

    let orchestrator = MockupOrchestrator::new(provider.clone(), uploads.clone(), settings.mockup.clone());
    info!(
        max_attempts = orchestrator.poll_policy().max_attempts,
        budget_secs = orchestrator.poll_policy().budget().as_secs(),
        "Mockup polling configured"
    );

    let history = HistoryStore::open(&settings.history)
        .await
        .context("Failed to open history store")?;

    let catalog = ProductCatalog::builtin();
    info!("Loaded {} product templates", catalog.all().len());

    let workers = settings.server.workers.unwrap_or_else(|| num_cpus::get() * 2);

    // Create shared application state
    let app_state = web::Data::new(AppState {
        settings,
        catalog,
        provider,
        uploads,
        orchestrator,
        history,
        started_at: Instant::now(),
    });

    // Base64 designs can be large, allow JSON bodies up to the upload limit plus encoding overhead
    let json_limit = app_state.settings.image_host.max_upload_bytes / 3 * 4 + 64 * 1024;

    // Configure and start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::JsonConfig::default().limit(json_limit))
            // Middleware (order matters)
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "automerch"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION")))
            )
            // Routes
            .configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
