use std::sync::Arc;

use contacts_gate::AccessGate;
use contacts_gate::config::Config;
use contacts_gate::db::ContactsStorage;
use contacts_gate::middleware::cors::cors_layer;
use contacts_gate::router::{ContactsState, contacts_router};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        auth_mode = ?cfg.auth_mode,
        gate_policy = ?cfg.gate_policy,
        secret_header = %cfg.secret_header.as_deref().unwrap_or("<none>"),
        allowed_origin = %cfg.allowed_origin.as_deref().unwrap_or("*"),
        database_url = %cfg.database_url,
        loglevel = %cfg.loglevel
    );

    // No fallback credential: a gate that cannot be built stops the process.
    let gate = AccessGate::from_config(&cfg).inspect_err(|e| {
        error!(error = %e, "refusing to start: access gate misconfigured");
    })?;
    let cors = cors_layer(&cfg)?;

    let storage = ContactsStorage::connect(&cfg.database_url).await?;

    let state = ContactsState::new(storage, Arc::new(gate));
    let app = contacts_router(state).layer(cors);

    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
