use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use hh_core::config::AppConfig;
use api::app::{build_app, server_addr};
use api::observability::init_tracing;
use api::shutdown::shutdown_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Arc::new(AppConfig::load()?);
    init_tracing(&cfg);

    let addr = server_addr(&cfg)?;
    // An invalid header policy aborts here, before any port is bound.
    let app = build_app(cfg.clone())?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, env = %cfg.app.env, "starting server");

    let make_svc = app.router.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_svc)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
