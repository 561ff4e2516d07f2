use std::sync::Arc;

use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use warden_app::app::api::routes;
use warden_app::config::ConfigHandler;
use warden_app::middleware::protection::ProtectionMiddleware;
use warden_core::config::load_config;
use warden_service::auth::{AccessControl, Authenticator, SystemIdentityNaming};
use warden_service::group::GroupRegistry;
use warden_service::protection::ProtectionRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting warden access-control server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    tracing::info!(rules = config.access.rules.len(), "Protection rules loaded");

    let access = AccessControl::new(
        Authenticator::default(),
        Arc::new(GroupRegistry::new()),
        Arc::new(SystemIdentityNaming),
    );
    let protection = ProtectionMiddleware::new(Arc::new(ProtectionRegistry::new()), access);

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(ConfigHandler {
            settings: Arc::new(config),
        })
        .hoop(protection)
        .push(routes());

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
