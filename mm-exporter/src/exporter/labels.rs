//! Normalization of raw ModemManager enumeration values into stable,
//! lowercase label strings.
//!
//! One static table per domain feeds a single entry point, so totality and
//! the full label set are testable on their own. Values without an explicit
//! mapping fall back to `"unknown"`; `normalize` never fails and never
//! returns an empty label.

/// Enumeration domains the exporter knows how to label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// `MMModemState`
    ModemState,
    /// `MMModemPowerState`
    PowerState,
    /// `MMModemAccessTechnology` (bitmask)
    AccessTechnology,
    /// `MMModemLock`
    LockType,
    /// `MMModem3gppRegistrationState`
    RegistrationState,
}

pub const UNKNOWN: &str = "unknown";

static MODEM_STATES: &[(i64, &str)] = &[
    (-1, "failed"),
    (0, "unknown"),
    (1, "initializing"),
    (2, "locked"),
    (3, "disabled"),
    (4, "disabling"),
    (5, "enabling"),
    (6, "enabled"),
    (7, "searching"),
    (8, "registered"),
    (9, "disconnecting"),
    (10, "connecting"),
    (11, "connected"),
];

static POWER_STATES: &[(i64, &str)] = &[
    (0, "unknown"),
    (1, "off"),
    (2, "low"),
    (3, "on"),
];

static LOCK_TYPES: &[(i64, &str)] = &[
    (0, "unknown"),
    (1, "none"),
    (2, "sim-pin"),
    (3, "sim-pin2"),
    (4, "sim-puk"),
    (5, "sim-puk2"),
    (6, "ph-sp-pin"),
    (7, "ph-sp-puk"),
    (8, "ph-net-pin"),
    (9, "ph-net-puk"),
    (10, "ph-sim-pin"),
    (11, "ph-corp-pin"),
    (12, "ph-corp-puk"),
    (13, "ph-fsim-pin"),
    (14, "ph-fsim-puk"),
    (15, "ph-netsub-pin"),
    (16, "ph-netsub-puk"),
];

static REGISTRATION_STATES: &[(i64, &str)] = &[
    (0, "idle"),
    (1, "home"),
    (2, "searching"),
    (3, "denied"),
    (4, "unknown"),
    (5, "roaming"),
];

/// Access technologies are a bitmask; a modem may report several at once.
/// The first matching entry wins, so keep this ordered newest-first.
static ACCESS_TECHS: &[(i64, &str)] = &[
    (1 << 15, "5gnr"),
    (1 << 14, "lte"),
    (1 << 9, "hspa_plus"),
    (1 << 8, "hspa"),
    (1 << 7, "hsupa"),
    (1 << 6, "hsdpa"),
    (1 << 5, "umts"),
    (1 << 4, "edge"),
    (1 << 3, "gprs"),
    (1 << 2, "gsm_compact"),
    (1 << 1, "gsm"),
    (1 << 13, "evdob"),
    (1 << 12, "evdoa"),
    (1 << 11, "evdo0"),
    (1 << 10, "1xrtt"),
    (1 << 0, "pots"),
];

/// Map a raw enumeration value to its label. Total over `i64`.
pub fn normalize(domain: Domain, raw: i64) -> &'static str {
    let table = match domain {
        Domain::ModemState => MODEM_STATES,
        Domain::PowerState => POWER_STATES,
        Domain::LockType => LOCK_TYPES,
        Domain::RegistrationState => REGISTRATION_STATES,
        Domain::AccessTechnology => {
            return ACCESS_TECHS
                .iter()
                .find(|(mask, _)| raw & mask != 0)
                .map(|(_, label)| *label)
                .unwrap_or(UNKNOWN);
        }
    };

    table
        .iter()
        .find(|(value, _)| *value == raw)
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN)
}
