//! Reflens API Server
//!
//! Main entry point for the referral lookup service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reflens_api::{AppState, create_router};
use reflens_db::{SchemaCapabilities, connect};
use reflens_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reflens=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Probe optional host-schema surface once; the flags ride in app state
    let capabilities = SchemaCapabilities::detect(&db).await?;
    info!(
        legacy_referrer_column = capabilities.legacy_referrer_column,
        referrer_entries = capabilities.referrer_entries,
        affiliate_history = capabilities.affiliate_history,
        custom_fields = capabilities.custom_fields,
        ticket_replies = capabilities.ticket_replies,
        "Schema capabilities probed"
    );

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        capabilities,
        lookup: Arc::new(config.lookup.clone()),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
