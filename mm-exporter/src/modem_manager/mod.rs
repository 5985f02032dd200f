//! Accessor traits over the ModemManager object tree, plus the per-facet
//! snapshot types one scrape pulls out of it.
//!
//! Every facet of a modem (signal, bearers, SIM, 3GPP registration,
//! messaging, location) is optional: whether it exists depends on the
//! hardware and the protocol the modem speaks. The traits therefore return a
//! `Result` per facet so callers must consciously handle the unsupported
//! case instead of tripping over an implicit null. Snapshots are plain data,
//! built fresh on every scrape and thrown away afterwards.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre::Result;

pub mod dbus;

pub use dbus::ModemManagerDbus;

/// Top-level device registry: the ModemManager daemon itself.
#[async_trait]
pub trait ModemManager: Send + Sync + 'static {
    /// Version string of the manager daemon.
    async fn version(&self) -> Result<String>;

    /// The currently visible modems. An empty list is a legitimate answer
    /// (no hardware present), not an error.
    async fn list_modems(&self) -> Result<Vec<Arc<dyn ModemDevice>>>;
}

/// One managed modem. Each getter pulls a single facet and is independently
/// fallible; a failure never implies anything about the other facets.
#[async_trait]
pub trait ModemDevice: Send + Sync {
    /// Stable device identifier, unique within one scrape.
    async fn device_id(&self) -> Result<String>;

    async fn info(&self) -> Result<ModemInfo>;

    async fn status(&self) -> Result<ModemStatus>;

    async fn signal(&self) -> Result<SignalSnapshot>;

    /// One-time side effect: ask ModemManager to refresh extended signal
    /// data every `rate`. Not part of the scrape path.
    async fn setup_signal_refresh(&self, rate: Duration) -> Result<()>;

    async fn bearers(&self) -> Result<Vec<BearerSnapshot>>;

    async fn sim(&self) -> Result<SimSnapshot>;

    async fn registration(&self) -> Result<RegistrationSnapshot>;

    async fn messaging(&self) -> Result<MessagingSnapshot>;

    async fn location(&self) -> Result<LocationSnapshot>;
}

/// Static device information.
///
/// The string fields default to empty when the modem does not report them;
/// the bearer limits are `None` in that case so no gauge is synthesized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModemInfo {
    pub manufacturer: String,
    pub model: String,
    pub revision: String,
    pub equipment_id: String,
    pub device: String,
    pub plugin: String,
    pub primary_port: String,
    pub max_bearers: Option<u32>,
    pub max_active_bearers: Option<u32>,
}

/// Dynamic modem state. Raw enumeration values are kept as reported and only
/// turned into labels by the normalizer; `None` means the attribute was not
/// obtainable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModemStatus {
    /// Raw `MMModemState` (-1 = failed).
    pub state: Option<i32>,
    /// Raw `MMModemPowerState`.
    pub power_state: Option<u32>,
    /// Signal quality percentage, 0-100.
    pub signal_quality: Option<u32>,
    /// Raw `MMModemAccessTechnology` bitmask.
    pub access_technologies: Option<u32>,
    /// Raw `MMModemLock`.
    pub unlock_required: Option<u32>,
}

/// Extended signal measurements, one optional block per technology.
///
/// Within a block a value of exactly `0.0` means "not reported" and is
/// suppressed from emission. That sentinel convention comes from the wire
/// format and could in principle swallow a legitimately-zero reading; it is
/// kept for compatibility.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSnapshot {
    pub lte: Option<LteSignal>,
    pub umts: Option<UmtsSignal>,
    pub gsm: Option<GsmSignal>,
    pub cdma: Option<CdmaSignal>,
    pub evdo: Option<EvdoSignal>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LteSignal {
    pub rssi: f64,
    pub rsrq: f64,
    pub rsrp: f64,
    pub snr: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UmtsSignal {
    pub rssi: f64,
    pub ecio: f64,
    pub rscp: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GsmSignal {
    pub rssi: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CdmaSignal {
    pub rssi: f64,
    pub ecio: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvdoSignal {
    pub rssi: f64,
    pub ecio: f64,
    pub sinr: f64,
    pub io: f64,
}

/// One packet-data bearer. `path` is the sub-key under the owning modem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BearerSnapshot {
    pub path: String,
    pub interface: String,
    pub connected: bool,
    pub apn: String,
    pub ip_method: String,
    pub ip_address: String,
    pub stats: Option<BearerStats>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BearerStats {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimSnapshot {
    pub path: String,
    pub imsi: String,
    pub operator_name: String,
}

/// 3GPP registration facet. Operator code/name are empty when the network
/// has not reported them, and then omitted from emission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationSnapshot {
    /// Raw `MMModem3gppRegistrationState`.
    pub state: u32,
    pub operator_code: String,
    pub operator_name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagingSnapshot {
    /// Number of SMS messages currently stored on the modem.
    pub message_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationSnapshot {
    pub enabled: bool,
    pub gps: Option<GpsFix>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}
