use std::sync::Arc;
use std::time::Duration;

use clap::Parser as _;
use color_eyre::eyre::{Result, WrapErr as _};
use mm_exporter::{
    Cfg, Exporter, ModemManager as _, ModemManagerDbus, server, setup_signal_refresh,
    telemetry,
};
use tokio::net::TcpListener;
use tokio::signal::unix::{self, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    telemetry::init()?;

    let cfg = Cfg::parse();
    cfg.validate()?;

    let conn = zbus::Connection::system()
        .await
        .wrap_err("failed to connect to the system bus")?;
    let manager = Arc::new(ModemManagerDbus::new(conn));

    match manager.version().await {
        Ok(version) => info!("ModemManager {version}"),
        Err(err) => warn!("ModemManager not reachable yet: {err:#}"),
    }

    if cfg.signal_rate > 0 {
        setup_signal_refresh(manager.as_ref(), Duration::from_secs(cfg.signal_rate))
            .await;
    }

    let listener = TcpListener::bind(cfg.listen_address)
        .await
        .wrap_err_with(|| format!("failed to bind {}", cfg.listen_address))?;

    let shutdown = CancellationToken::new();
    let mut sigterm = unix::signal(SignalKind::terminate())?;
    let mut sigint = unix::signal(SignalKind::interrupt())?;
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tokio::select! {
                _ = sigterm.recv() => warn!("received SIGTERM"),
                _ = sigint.recv()  => warn!("received SIGINT"),
            }
            shutdown.cancel();
        }
    });

    let deps = server::Deps {
        exporter: Arc::new(Exporter::new(manager)),
        metrics_path: cfg.metrics_path,
        signal_rate_secs: cfg.signal_rate,
    };
    server::run(listener, deps, shutdown).await
}
