use std::{net::SocketAddr, sync::Arc};

use stockwatch::{
    build_notifier, config, logging, routes,
    services::alert_monitor::spawn_price_alert_monitor, AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::load();
    logging::setup_logging(&settings.log_level, settings.log_json);

    let state = AppState::new(settings.clone());

    let monitor = Arc::new(state.alert_monitor(build_notifier(&settings)));
    let monitor_task = spawn_price_alert_monitor(monitor, settings.alert_check_interval);

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    monitor_task.abort();
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
