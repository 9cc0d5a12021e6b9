//! House Rental API Server
//!
//! Starts the Axum REST server over the Sled-backed store.
//! - Storage: Sled KV with one tree per table (users, properties, bookings, ratings)
//! - Auth: bcrypt + HS256 bearer tokens
//! - Side channels: SMTP notifications and an LLM chatbot proxy, both best-effort
//!
//! Usage:
//!   cargo run --bin seed_data       # bootstrap admin + sample data
//!   cargo run --bin house_rental    # start the server
//!   # Then drive it with rental-cli or curl (see README)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use house_rental::chatbot::Chatbot;
use house_rental::config::Config;
use house_rental::email::Mailer;
use house_rental::rest::{create_router, AppState};
use house_rental::storage::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Console logs plus a daily-rolling JSON file under logs/.
    let file_appender = tracing_appender::rolling::daily("logs", "house_rental.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().json().with_writer(file_writer))
        .init();

    let config = Config::load();
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("🏠 House Rental API starting...");
    info!("Storage: Sled at {}", config.data_dir);
    info!(
        "Email notifications: {}",
        if config.smtp.is_some() { "enabled" } else { "disabled" }
    );
    info!(
        "Chatbot proxy: {}",
        if config.openrouter_api_key.is_some() { "enabled" } else { "disabled" }
    );

    let store = Store::open(&config.data_dir)?;
    let mailer = Arc::new(Mailer::from_config(&config));
    let chatbot = Arc::new(Chatbot::new(config.openrouter_api_key.clone()));
    let state = AppState {
        store,
        config: Arc::new(config),
        mailer,
        chatbot,
    };

    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!("REST (Axum) listening on {addr}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
