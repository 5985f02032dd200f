//! Metric descriptors, the per-scrape sample buffer, and the text exposition
//! renderer.
//!
//! The catalog is the single source of truth for metric names, help strings
//! and label schemas. It is built once at startup and shared by `Arc`; only
//! samples are rebuilt per scrape. Rendering walks the catalog in declaration
//! order, so the output is stable across scrapes regardless of collection
//! order.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use tracing::error;

/// Exposition content type served alongside the rendered text.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// One metric family: name, help text and the label schema every sample of
/// this family must carry.
#[derive(Debug)]
pub struct Desc {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
    pub kind: MetricKind,
}

const fn gauge(
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
) -> Desc {
    Desc {
        name,
        help,
        labels,
        kind: MetricKind::Gauge,
    }
}

const fn counter(
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
) -> Desc {
    Desc {
        name,
        help,
        labels,
        kind: MetricKind::Counter,
    }
}

/// Every metric family the exporter can emit.
pub struct Catalog {
    pub info: Desc,

    pub modem_info: Desc,
    pub modem_state: Desc,
    pub modem_power_state: Desc,
    pub modem_signal_quality: Desc,
    pub modem_access_technology: Desc,
    pub modem_unlock_required: Desc,
    pub modem_max_bearers: Desc,
    pub modem_max_active_bearers: Desc,

    pub signal_lte_rssi: Desc,
    pub signal_lte_rsrq: Desc,
    pub signal_lte_rsrp: Desc,
    pub signal_lte_snr: Desc,
    pub signal_umts_rssi: Desc,
    pub signal_umts_ecio: Desc,
    pub signal_umts_rscp: Desc,
    pub signal_gsm_rssi: Desc,
    pub signal_cdma_rssi: Desc,
    pub signal_cdma_ecio: Desc,
    pub signal_evdo_rssi: Desc,
    pub signal_evdo_ecio: Desc,
    pub signal_evdo_sinr: Desc,
    pub signal_evdo_io: Desc,

    pub bearer_info: Desc,
    pub bearer_connected: Desc,
    pub bearer_rx_bytes: Desc,
    pub bearer_tx_bytes: Desc,
    pub bearer_duration: Desc,

    pub sim_info: Desc,

    pub registration_state: Desc,
    pub operator_code: Desc,
    pub operator_name: Desc,

    pub messaging_supported: Desc,
    pub messaging_sms_count: Desc,

    pub location_enabled: Desc,
    pub location_latitude: Desc,
    pub location_longitude: Desc,
    pub location_altitude: Desc,

    pub scrape_duration: Desc,
    pub scrape_success: Desc,
    pub scrape_errors: Desc,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            info: gauge(
                "modemmanager_info",
                "ModemManager daemon information.",
                &["version"],
            ),
            modem_info: gauge(
                "modemmanager_modem_info",
                "Static modem hardware and driver information.",
                &[
                    "device_id",
                    "manufacturer",
                    "model",
                    "revision",
                    "equipment_id",
                    "device",
                    "plugin",
                    "primary_port",
                ],
            ),
            modem_state: gauge(
                "modemmanager_modem_state",
                "Current modem state; the state label carries the decoded value.",
                &["device_id", "state"],
            ),
            modem_power_state: gauge(
                "modemmanager_modem_power_state",
                "Current modem power state.",
                &["device_id", "power_state"],
            ),
            modem_signal_quality: gauge(
                "modemmanager_modem_signal_quality_percent",
                "Signal quality in percent, 0-100.",
                &["device_id"],
            ),
            modem_access_technology: gauge(
                "modemmanager_modem_access_technology",
                "Best access technology currently in use.",
                &["device_id", "technology"],
            ),
            modem_unlock_required: gauge(
                "modemmanager_modem_unlock_required",
                "Lock the modem currently requires to be unlocked, if any.",
                &["device_id", "lock"],
            ),
            modem_max_bearers: gauge(
                "modemmanager_modem_max_bearers",
                "Maximum number of bearers the modem supports.",
                &["device_id"],
            ),
            modem_max_active_bearers: gauge(
                "modemmanager_modem_max_active_bearers",
                "Maximum number of simultaneously active bearers.",
                &["device_id"],
            ),
            signal_lte_rssi: gauge(
                "modemmanager_signal_lte_rssi_dbm",
                "LTE received signal strength indication, dBm.",
                &["device_id"],
            ),
            signal_lte_rsrq: gauge(
                "modemmanager_signal_lte_rsrq_db",
                "LTE reference signal received quality, dB.",
                &["device_id"],
            ),
            signal_lte_rsrp: gauge(
                "modemmanager_signal_lte_rsrp_dbm",
                "LTE reference signal received power, dBm.",
                &["device_id"],
            ),
            signal_lte_snr: gauge(
                "modemmanager_signal_lte_snr_db",
                "LTE signal to noise ratio, dB.",
                &["device_id"],
            ),
            signal_umts_rssi: gauge(
                "modemmanager_signal_umts_rssi_dbm",
                "UMTS received signal strength indication, dBm.",
                &["device_id"],
            ),
            signal_umts_ecio: gauge(
                "modemmanager_signal_umts_ecio_db",
                "UMTS Ec/Io, dB.",
                &["device_id"],
            ),
            signal_umts_rscp: gauge(
                "modemmanager_signal_umts_rscp_dbm",
                "UMTS received signal code power, dBm.",
                &["device_id"],
            ),
            signal_gsm_rssi: gauge(
                "modemmanager_signal_gsm_rssi_dbm",
                "GSM received signal strength indication, dBm.",
                &["device_id"],
            ),
            signal_cdma_rssi: gauge(
                "modemmanager_signal_cdma_rssi_dbm",
                "CDMA1x received signal strength indication, dBm.",
                &["device_id"],
            ),
            signal_cdma_ecio: gauge(
                "modemmanager_signal_cdma_ecio_db",
                "CDMA1x Ec/Io, dB.",
                &["device_id"],
            ),
            signal_evdo_rssi: gauge(
                "modemmanager_signal_evdo_rssi_dbm",
                "EV-DO received signal strength indication, dBm.",
                &["device_id"],
            ),
            signal_evdo_ecio: gauge(
                "modemmanager_signal_evdo_ecio_db",
                "EV-DO Ec/Io, dB.",
                &["device_id"],
            ),
            signal_evdo_sinr: gauge(
                "modemmanager_signal_evdo_sinr_db",
                "EV-DO signal to interference-plus-noise ratio, dB.",
                &["device_id"],
            ),
            signal_evdo_io: gauge(
                "modemmanager_signal_evdo_io_dbm",
                "EV-DO Io, dBm.",
                &["device_id"],
            ),
            bearer_info: gauge(
                "modemmanager_bearer_info",
                "Bearer configuration and addressing information.",
                &[
                    "device_id",
                    "bearer_path",
                    "interface",
                    "apn",
                    "ip_method",
                    "ip_address",
                ],
            ),
            bearer_connected: gauge(
                "modemmanager_bearer_connected",
                "Whether the bearer is connected (1) or not (0).",
                &["device_id", "bearer_path"],
            ),
            bearer_rx_bytes: gauge(
                "modemmanager_bearer_rx_bytes",
                "Bytes received over the bearer in the ongoing connection.",
                &["device_id", "bearer_path"],
            ),
            bearer_tx_bytes: gauge(
                "modemmanager_bearer_tx_bytes",
                "Bytes transmitted over the bearer in the ongoing connection.",
                &["device_id", "bearer_path"],
            ),
            bearer_duration: gauge(
                "modemmanager_bearer_duration_seconds",
                "Duration of the ongoing bearer connection.",
                &["device_id", "bearer_path"],
            ),
            sim_info: gauge(
                "modemmanager_sim_info",
                "SIM card information.",
                &["device_id", "sim_path", "imsi", "operator_name"],
            ),
            registration_state: gauge(
                "modemmanager_modem_3gpp_registration_state",
                "3GPP network registration state.",
                &["device_id", "state"],
            ),
            operator_code: gauge(
                "modemmanager_modem_3gpp_operator_code",
                "MCC and MNC of the registered 3GPP network.",
                &["device_id", "operator_code"],
            ),
            operator_name: gauge(
                "modemmanager_modem_3gpp_operator_name",
                "Name of the registered 3GPP network.",
                &["device_id", "operator_name"],
            ),
            messaging_supported: gauge(
                "modemmanager_messaging_supported",
                "Whether the modem exposes the messaging facet.",
                &["device_id"],
            ),
            messaging_sms_count: gauge(
                "modemmanager_messaging_sms_count",
                "Number of SMS messages currently stored on the modem.",
                &["device_id"],
            ),
            location_enabled: gauge(
                "modemmanager_location_enabled",
                "Whether location reporting is enabled on the modem.",
                &["device_id"],
            ),
            location_latitude: gauge(
                "modemmanager_location_latitude_degrees",
                "GPS latitude of the last fix, degrees.",
                &["device_id"],
            ),
            location_longitude: gauge(
                "modemmanager_location_longitude_degrees",
                "GPS longitude of the last fix, degrees.",
                &["device_id"],
            ),
            location_altitude: gauge(
                "modemmanager_location_altitude_meters",
                "GPS altitude of the last fix, meters.",
                &["device_id"],
            ),
            scrape_duration: gauge(
                "modemmanager_scrape_duration_seconds",
                "Wall-clock duration of the last scrape.",
                &[],
            ),
            scrape_success: gauge(
                "modemmanager_scrape_success",
                "Whether the modem listing succeeded on the last scrape.",
                &[],
            ),
            scrape_errors: counter(
                "modemmanager_scrape_errors_total",
                "Number of collection errors encountered during the scrape.",
                &[],
            ),
        }
    }

    /// Descriptors in exposition order.
    pub fn all(&self) -> [&Desc; 41] {
        [
            &self.info,
            &self.modem_info,
            &self.modem_state,
            &self.modem_power_state,
            &self.modem_signal_quality,
            &self.modem_access_technology,
            &self.modem_unlock_required,
            &self.modem_max_bearers,
            &self.modem_max_active_bearers,
            &self.signal_lte_rssi,
            &self.signal_lte_rsrq,
            &self.signal_lte_rsrp,
            &self.signal_lte_snr,
            &self.signal_umts_rssi,
            &self.signal_umts_ecio,
            &self.signal_umts_rscp,
            &self.signal_gsm_rssi,
            &self.signal_cdma_rssi,
            &self.signal_cdma_ecio,
            &self.signal_evdo_rssi,
            &self.signal_evdo_ecio,
            &self.signal_evdo_sinr,
            &self.signal_evdo_io,
            &self.bearer_info,
            &self.bearer_connected,
            &self.bearer_rx_bytes,
            &self.bearer_tx_bytes,
            &self.bearer_duration,
            &self.sim_info,
            &self.registration_state,
            &self.operator_code,
            &self.operator_name,
            &self.messaging_supported,
            &self.messaging_sms_count,
            &self.location_enabled,
            &self.location_latitude,
            &self.location_longitude,
            &self.location_altitude,
            &self.scrape_duration,
            &self.scrape_success,
            &self.scrape_errors,
        ]
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// One emitted sample: family name, label values in schema order, value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: &'static str,
    pub labels: Vec<String>,
    pub value: f64,
}

/// Per-scrape accumulator. Rejects a second sample for the same
/// (family, label values) series within one scrape.
#[derive(Default)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
    seen: HashSet<(&'static str, Vec<String>)>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, desc: &Desc, labels: Vec<String>, value: f64) {
        debug_assert_eq!(
            labels.len(),
            desc.labels.len(),
            "label arity mismatch for {}",
            desc.name
        );

        if !self.seen.insert((desc.name, labels.clone())) {
            debug_assert!(false, "duplicate series pushed for {}", desc.name);
            error!(metric = desc.name, "duplicate series in one scrape, dropping");
            return;
        }

        self.samples.push(Sample {
            name: desc.name,
            labels,
            value,
        });
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

/// Render samples as Prometheus text exposition, families in catalog order.
/// Families without samples produce no output at all.
pub fn render(catalog: &Catalog, samples: &[Sample]) -> String {
    let mut by_family: HashMap<&'static str, Vec<&Sample>> = HashMap::new();
    for sample in samples {
        by_family.entry(sample.name).or_default().push(sample);
    }

    let mut out = String::new();
    for desc in catalog.all() {
        let Some(family) = by_family.get(desc.name) else {
            continue;
        };

        let _ = writeln!(out, "# HELP {} {}", desc.name, desc.help);
        let _ = writeln!(out, "# TYPE {} {}", desc.name, desc.kind.as_str());
        for sample in family {
            if sample.labels.is_empty() {
                let _ = writeln!(out, "{} {}", desc.name, sample.value);
            } else {
                let pairs = desc
                    .labels
                    .iter()
                    .zip(&sample.labels)
                    .map(|(name, value)| format!("{name}=\"{}\"", escape_label(value)))
                    .collect::<Vec<_>>()
                    .join(",");
                let _ = writeln!(out, "{}{{{pairs}}} {}", desc.name, sample.value);
            }
        }
    }
    out
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_declares_unique_metric_names() {
        let catalog = Catalog::new();

        let mut names = HashSet::new();
        for desc in catalog.all() {
            assert!(names.insert(desc.name), "{} declared twice", desc.name);
            assert!(desc.name.starts_with("modemmanager_"));
            assert!(!desc.help.is_empty());
        }
    }

    #[test]
    fn it_renders_help_and_type_once_per_populated_family() {
        let catalog = Catalog::new();
        let mut buf = SampleBuffer::new();
        buf.push(&catalog.modem_signal_quality, vec!["abc".into()], 80.0);
        buf.push(&catalog.modem_signal_quality, vec!["def".into()], 55.0);
        buf.push(&catalog.scrape_success, vec![], 1.0);

        let text = render(&catalog, &buf.into_samples());

        assert_eq!(
            text.matches("# HELP modemmanager_modem_signal_quality_percent")
                .count(),
            1
        );
        assert_eq!(
            text.matches("# TYPE modemmanager_modem_signal_quality_percent gauge")
                .count(),
            1
        );
        assert!(text.contains(
            "modemmanager_modem_signal_quality_percent{device_id=\"abc\"} 80"
        ));
        assert!(text.contains(
            "modemmanager_modem_signal_quality_percent{device_id=\"def\"} 55"
        ));
        assert!(text.contains("modemmanager_scrape_success 1"));
    }

    #[test]
    fn it_omits_families_without_samples() {
        let catalog = Catalog::new();
        let mut buf = SampleBuffer::new();
        buf.push(&catalog.scrape_success, vec![], 1.0);

        let text = render(&catalog, &buf.into_samples());

        assert!(!text.contains("modemmanager_modem_state"));
        assert!(!text.contains("modemmanager_messaging_sms_count"));
    }

    #[test]
    fn it_escapes_label_values() {
        let catalog = Catalog::new();
        let mut buf = SampleBuffer::new();
        buf.push(
            &catalog.modem_state,
            vec!["dev\"1\\x\n".into(), "connected".into()],
            1.0,
        );

        let text = render(&catalog, &buf.into_samples());

        assert!(text.contains(r#"device_id="dev\"1\\x\n""#));
    }

    #[test]
    fn it_renders_counters_with_the_counter_type() {
        let catalog = Catalog::new();
        let mut buf = SampleBuffer::new();
        buf.push(&catalog.scrape_errors, vec![], 3.0);

        let text = render(&catalog, &buf.into_samples());

        assert!(text.contains("# TYPE modemmanager_scrape_errors_total counter"));
        assert!(text.contains("modemmanager_scrape_errors_total 3"));
    }

    #[test]
    #[should_panic(expected = "duplicate series")]
    fn it_rejects_duplicate_series_within_one_scrape() {
        let catalog = Catalog::new();
        let mut buf = SampleBuffer::new();

        buf.push(&catalog.modem_signal_quality, vec!["abc".into()], 80.0);
        buf.push(&catalog.modem_signal_quality, vec!["abc".into()], 81.0);
    }

    #[test]
    fn it_allows_the_same_family_with_distinct_labels() {
        let catalog = Catalog::new();
        let mut buf = SampleBuffer::new();

        buf.push(&catalog.bearer_connected, vec!["abc".into(), "/b/0".into()], 1.0);
        buf.push(&catalog.bearer_connected, vec!["abc".into(), "/b/1".into()], 0.0);

        assert_eq!(buf.into_samples().len(), 2);
    }
}
