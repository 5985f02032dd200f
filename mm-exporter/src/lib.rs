//! Prometheus exporter for the ModemManager daemon.
//!
//! One scrape polls the full device tree (manager, modems, and each modem's
//! optional facets) over D-Bus and renders the result as text exposition.
//! Per-facet failures are isolated and counted; only a failure to list the
//! modems marks the scrape unsuccessful.

use std::time::Duration;

use tracing::{info, warn};

pub mod cfg;
pub mod exporter;
pub mod modem_manager;
pub mod server;
pub mod telemetry;

pub use cfg::Cfg;
pub use exporter::Exporter;
pub use modem_manager::{ModemManager, ModemManagerDbus};

/// Ask every currently visible modem to refresh extended signal data every
/// `rate`. Best effort: a modem that refuses is logged and skipped, and
/// modems appearing later simply run at their default rate.
pub async fn setup_signal_refresh(manager: &dyn ModemManager, rate: Duration) {
    let modems = match manager.list_modems().await {
        Ok(modems) => modems,
        Err(err) => {
            warn!("cannot set up signal refresh, listing modems failed: {err:#}");
            return;
        }
    };

    for modem in modems {
        match modem.setup_signal_refresh(rate).await {
            Ok(()) => info!("signal refresh every {}s requested", rate.as_secs()),
            Err(err) => warn!("signal refresh setup failed: {err:#}"),
        }
    }
}
