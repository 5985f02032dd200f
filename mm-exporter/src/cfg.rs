//! Command-line and environment configuration.

use std::net::SocketAddr;

use clap::Parser;
use color_eyre::eyre::{Result, ensure};

#[derive(Debug, Parser)]
#[command(about, version)]
pub struct Cfg {
    /// Address the HTTP server binds to.
    #[arg(
        long,
        env = "MM_EXPORTER_LISTEN_ADDRESS",
        default_value = "0.0.0.0:9539"
    )]
    pub listen_address: SocketAddr,

    /// URL path the metrics are exposed under.
    #[arg(long, env = "MM_EXPORTER_METRICS_PATH", default_value = "/metrics")]
    pub metrics_path: String,

    /// Extended-signal refresh rate in seconds, requested from ModemManager
    /// once at startup. 0 disables the request.
    #[arg(long, env = "MM_EXPORTER_SIGNAL_RATE", default_value_t = 5)]
    pub signal_rate: u64,
}

impl Cfg {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.metrics_path.starts_with('/'),
            "metrics path must start with '/', got {:?}",
            self.metrics_path
        );
        ensure!(
            self.metrics_path != "/",
            "metrics path must not shadow the landing page"
        );
        Ok(())
    }
}
