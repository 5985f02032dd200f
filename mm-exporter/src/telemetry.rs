//! Tracing setup: journald when running under systemd, stderr otherwise.

use std::io::IsTerminal as _;

use color_eyre::eyre::Result;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

pub const SYSLOG_IDENTIFIER: &str = "mm-exporter";

/// Call once, before anything logs. `RUST_LOG` overrides the INFO default.
pub fn init() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    // A terminal on stderr means an interactive run, not systemd.
    let journald_layer = if !std::io::stderr().is_terminal() {
        tracing_journald::layer()
            .inspect_err(|err| {
                eprintln!("failed connecting to journald socket, using stderr: {err}");
            })
            .map(|layer| layer.with_syslog_identifier(SYSLOG_IDENTIFIER.to_owned()))
            .ok()
    } else {
        None
    };
    let stderr_layer = journald_layer
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(journald_layer)
        .with(filter)
        .try_init()?;
    Ok(())
}
