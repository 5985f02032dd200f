//! Client-side zbus proxies for the `org.freedesktop.ModemManager1` D-Bus API.
//!
//! Only the interfaces and members the exporter reads are declared here; see
//! the ModemManager D-Bus reference for the full API. All proxies default to
//! the well-known `org.freedesktop.ModemManager1` service on the system bus.
//! Modems, bearers and SIMs are discovered at runtime, so those proxies carry
//! no default path and must be built with `.path(..)`.

#![forbid(unsafe_code)]

use std::collections::HashMap;

use zbus::proxy;
use zbus::zvariant::{OwnedObjectPath, OwnedValue};

/// Well-known bus name of the ModemManager daemon.
pub const MM_SERVICE: &str = "org.freedesktop.ModemManager1";

/// Object path of the manager itself (also the ObjectManager root under
/// which all modems are exported).
pub const MM_PATH: &str = "/org/freedesktop/ModemManager1";

/// Interface name carried by every modem object; used to recognize modems in
/// the ObjectManager listing.
pub const MODEM_INTERFACE: &str = "org.freedesktop.ModemManager1.Modem";

#[proxy(
    interface = "org.freedesktop.ModemManager1",
    default_service = "org.freedesktop.ModemManager1",
    default_path = "/org/freedesktop/ModemManager1"
)]
pub trait ModemManager1 {
    fn scan_devices(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn version(&self) -> zbus::Result<String>;
}

#[proxy(
    interface = "org.freedesktop.ModemManager1.Modem",
    default_service = "org.freedesktop.ModemManager1"
)]
pub trait Modem {
    #[zbus(property)]
    fn device_identifier(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn manufacturer(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn model(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn revision(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn equipment_identifier(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn device(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn plugin(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn primary_port(&self) -> zbus::Result<String>;

    /// Raw `MMModemState`; -1 is "failed".
    #[zbus(property)]
    fn state(&self) -> zbus::Result<i32>;

    /// Raw `MMModemPowerState`.
    #[zbus(property)]
    fn power_state(&self) -> zbus::Result<u32>;

    /// Percentage plus a "recent" flag.
    #[zbus(property)]
    fn signal_quality(&self) -> zbus::Result<(u32, bool)>;

    /// Raw `MMModemAccessTechnology` bitmask.
    #[zbus(property)]
    fn access_technologies(&self) -> zbus::Result<u32>;

    /// Raw `MMModemLock`.
    #[zbus(property)]
    fn unlock_required(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn max_bearers(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn max_active_bearers(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn bearers(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    #[zbus(property)]
    fn sim(&self) -> zbus::Result<OwnedObjectPath>;
}

#[proxy(
    interface = "org.freedesktop.ModemManager1.Modem.Signal",
    default_service = "org.freedesktop.ModemManager1"
)]
pub trait ModemSignal {
    /// Enable periodic extended-signal refresh every `rate` seconds
    /// (0 disables it).
    fn setup(&self, rate: u32) -> zbus::Result<()>;

    #[zbus(property)]
    fn rate(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn lte(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    #[zbus(property)]
    fn umts(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    #[zbus(property)]
    fn gsm(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    #[zbus(property)]
    fn cdma(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    #[zbus(property)]
    fn evdo(&self) -> zbus::Result<HashMap<String, OwnedValue>>;
}

#[proxy(
    interface = "org.freedesktop.ModemManager1.Modem.Modem3gpp",
    default_service = "org.freedesktop.ModemManager1"
)]
pub trait Modem3gpp {
    /// Raw `MMModem3gppRegistrationState`.
    #[zbus(property)]
    fn registration_state(&self) -> zbus::Result<u32>;

    /// MCC+MNC of the registered network, empty when unregistered.
    #[zbus(property)]
    fn operator_code(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn operator_name(&self) -> zbus::Result<String>;
}

#[proxy(
    interface = "org.freedesktop.ModemManager1.Modem.Messaging",
    default_service = "org.freedesktop.ModemManager1"
)]
pub trait ModemMessaging {
    #[zbus(property)]
    fn messages(&self) -> zbus::Result<Vec<OwnedObjectPath>>;
}

#[proxy(
    interface = "org.freedesktop.ModemManager1.Modem.Location",
    default_service = "org.freedesktop.ModemManager1"
)]
pub trait ModemLocation {
    /// Keyed by `MMModemLocationSource`; GPS raw fixes live under source 2.
    fn get_location(&self) -> zbus::Result<HashMap<u32, OwnedValue>>;

    /// Bitmask of currently enabled location sources.
    #[zbus(property)]
    fn enabled(&self) -> zbus::Result<u32>;

    /// Whether location updates are emitted via property changes.
    #[zbus(property)]
    fn signals_location(&self) -> zbus::Result<bool>;
}

#[proxy(
    interface = "org.freedesktop.ModemManager1.Bearer",
    default_service = "org.freedesktop.ModemManager1"
)]
pub trait Bearer {
    #[zbus(property)]
    fn interface(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn connected(&self) -> zbus::Result<bool>;

    /// Bearer settings; includes the "apn" entry.
    #[zbus(property)]
    fn properties(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    /// IPv4 configuration: "method" (raw `MMBearerIpMethod`), "address", ...
    #[zbus(property)]
    fn ip4_config(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    /// Traffic counters: "rx-bytes"/"tx-bytes" (u64) and "duration" (u32).
    #[zbus(property)]
    fn stats(&self) -> zbus::Result<HashMap<String, OwnedValue>>;
}

#[proxy(
    interface = "org.freedesktop.ModemManager1.Sim",
    default_service = "org.freedesktop.ModemManager1"
)]
pub trait Sim {
    #[zbus(property)]
    fn sim_identifier(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn imsi(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn operator_name(&self) -> zbus::Result<String>;
}
