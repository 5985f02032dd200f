//! End-to-end scrape semantics against the fake device tree.


use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use fixture::{FakeManager, FakeModem, find, meta, value};
use mm_exporter::modem_manager::{
    BearerSnapshot, BearerStats, GpsFix, LocationSnapshot, LteSignal,
    MessagingSnapshot, ModemStatus, RegistrationSnapshot, SignalSnapshot,
};
use mm_exporter::{Exporter, setup_signal_refresh};

#[tokio::test]
async fn it_marks_the_scrape_failed_when_modem_listing_fails() {
    let exporter = Exporter::new(Arc::new(FakeManager::broken()));

    let samples = exporter.scrape().await;

    assert_eq!(meta(&samples, "modemmanager_scrape_success"), Some(0.0));
    assert!(meta(&samples, "modemmanager_scrape_errors_total").unwrap() >= 1.0);
    assert!(meta(&samples, "modemmanager_scrape_duration_seconds").is_some());
    // No modems were reachable, so nothing modem-scoped may appear.
    assert!(find(&samples, "modemmanager_modem_info").is_empty());
    assert!(find(&samples, "modemmanager_modem_state").is_empty());
    // The manager version itself was still readable.
    assert_eq!(find(&samples, "modemmanager_info").len(), 1);
}

#[tokio::test]
async fn it_succeeds_with_zero_modems() {
    let exporter = Exporter::new(Arc::new(FakeManager::with_modems(vec![])));

    let samples = exporter.scrape().await;

    assert_eq!(meta(&samples, "modemmanager_scrape_success"), Some(1.0));
    assert_eq!(meta(&samples, "modemmanager_scrape_errors_total"), Some(0.0));
}

#[tokio::test]
async fn it_isolates_a_facet_failure_from_the_other_facets() {
    let modem = FakeModem {
        status: None,
        ..FakeModem::healthy("modem-a")
    };
    let exporter = Exporter::new(Arc::new(FakeManager::with_modems(vec![modem])));

    let samples = exporter.scrape().await;

    // Status failed: its families are absent, everything else is intact.
    assert!(find(&samples, "modemmanager_modem_state").is_empty());
    assert!(value(&samples, "modemmanager_modem_info", "modem-a").is_some());
    assert_eq!(value(&samples, "modemmanager_sim_info", "modem-a"), Some(1.0));
    assert_eq!(meta(&samples, "modemmanager_scrape_success"), Some(1.0));
    assert_eq!(meta(&samples, "modemmanager_scrape_errors_total"), Some(1.0));
}

#[tokio::test]
async fn it_skips_a_modem_without_a_device_identifier() {
    let anonymous = FakeModem {
        device_id: None,
        ..FakeModem::healthy("ignored")
    };
    let named = FakeModem::healthy("modem-b");
    let exporter =
        Exporter::new(Arc::new(FakeManager::with_modems(vec![anonymous, named])));

    let samples = exporter.scrape().await;

    assert_eq!(find(&samples, "modemmanager_modem_info").len(), 1);
    assert!(value(&samples, "modemmanager_modem_info", "modem-b").is_some());
    assert_eq!(meta(&samples, "modemmanager_scrape_errors_total"), Some(1.0));
    assert_eq!(meta(&samples, "modemmanager_scrape_success"), Some(1.0));
}

#[tokio::test]
async fn it_emits_identical_samples_for_identical_state() {
    let manager = Arc::new(FakeManager::with_modems(vec![FakeModem::healthy(
        "modem-a",
    )]));
    let exporter = Exporter::new(manager);

    let strip_duration = |mut samples: Vec<mm_exporter::exporter::Sample>| {
        samples.retain(|s| s.name != "modemmanager_scrape_duration_seconds");
        samples
    };
    let first = strip_duration(exporter.scrape().await);
    let second = strip_duration(exporter.scrape().await);

    assert_eq!(first, second);
}

#[tokio::test]
async fn it_exports_bearer_configuration_and_traffic_counters() {
    let modem = FakeModem {
        bearers: Some(vec![BearerSnapshot {
            path: "/org/freedesktop/ModemManager1/Bearer/0".to_owned(),
            interface: "wwan0".to_owned(),
            connected: true,
            apn: "internet".to_owned(),
            ip_method: "dhcp".to_owned(),
            ip_address: "10.0.0.2".to_owned(),
            stats: Some(BearerStats {
                rx_bytes: 1_024_000,
                tx_bytes: 512_000,
                duration_secs: 3600,
            }),
        }]),
        ..FakeModem::healthy("modem-a")
    };
    let exporter = Exporter::new(Arc::new(FakeManager::with_modems(vec![modem])));

    let samples = exporter.scrape().await;

    let info = find(&samples, "modemmanager_bearer_info");
    assert_eq!(info.len(), 1);
    assert_eq!(
        info[0].labels,
        vec![
            "modem-a",
            "/org/freedesktop/ModemManager1/Bearer/0",
            "wwan0",
            "internet",
            "dhcp",
            "10.0.0.2",
        ]
    );
    assert_eq!(
        value(&samples, "modemmanager_bearer_connected", "modem-a"),
        Some(1.0)
    );
    assert_eq!(
        value(&samples, "modemmanager_bearer_rx_bytes", "modem-a"),
        Some(1_024_000.0)
    );
    assert_eq!(
        value(&samples, "modemmanager_bearer_tx_bytes", "modem-a"),
        Some(512_000.0)
    );
    assert_eq!(
        value(&samples, "modemmanager_bearer_duration_seconds", "modem-a"),
        Some(3600.0)
    );
}

#[tokio::test]
async fn it_reports_messaging_unsupported_without_an_sms_count() {
    let modem = FakeModem {
        messaging: None,
        ..FakeModem::healthy("modem-a")
    };
    let exporter = Exporter::new(Arc::new(FakeManager::with_modems(vec![modem])));

    let samples = exporter.scrape().await;

    assert_eq!(
        value(&samples, "modemmanager_messaging_supported", "modem-a"),
        Some(0.0)
    );
    assert!(find(&samples, "modemmanager_messaging_sms_count").is_empty());
    assert_eq!(meta(&samples, "modemmanager_scrape_errors_total"), Some(1.0));
}

#[tokio::test]
async fn it_reports_a_stored_message_count_when_messaging_works() {
    let modem = FakeModem {
        messaging: Some(MessagingSnapshot { message_count: 3 }),
        ..FakeModem::healthy("modem-a")
    };
    let exporter = Exporter::new(Arc::new(FakeManager::with_modems(vec![modem])));

    let samples = exporter.scrape().await;

    assert_eq!(
        value(&samples, "modemmanager_messaging_supported", "modem-a"),
        Some(1.0)
    );
    assert_eq!(
        value(&samples, "modemmanager_messaging_sms_count", "modem-a"),
        Some(3.0)
    );
}

#[tokio::test]
async fn it_suppresses_unreported_signal_fields_individually() {
    let modem = FakeModem {
        signal: Some(SignalSnapshot {
            lte: Some(LteSignal {
                rssi: -65.0,
                rsrq: -9.0,
                rsrp: 0.0,
                snr: 12.5,
            }),
            ..SignalSnapshot::default()
        }),
        ..FakeModem::healthy("modem-a")
    };
    let exporter = Exporter::new(Arc::new(FakeManager::with_modems(vec![modem])));

    let samples = exporter.scrape().await;

    assert_eq!(
        value(&samples, "modemmanager_signal_lte_rssi_dbm", "modem-a"),
        Some(-65.0)
    );
    assert_eq!(
        value(&samples, "modemmanager_signal_lte_rsrq_db", "modem-a"),
        Some(-9.0)
    );
    assert_eq!(
        value(&samples, "modemmanager_signal_lte_snr_db", "modem-a"),
        Some(12.5)
    );
    assert!(find(&samples, "modemmanager_signal_lte_rsrp_dbm").is_empty());
    // A reading of zero is never a signal failure.
    assert_eq!(meta(&samples, "modemmanager_scrape_errors_total"), Some(0.0));
}

#[tokio::test]
async fn it_labels_state_and_lock_with_normalized_values() {
    let modem = FakeModem {
        status: Some(ModemStatus {
            state: Some(11),
            power_state: Some(3),
            signal_quality: Some(80),
            access_technologies: Some((1 << 14) | (1 << 1)),
            unlock_required: Some(2),
        }),
        ..FakeModem::healthy("modem-a")
    };
    let exporter = Exporter::new(Arc::new(FakeManager::with_modems(vec![modem])));

    let samples = exporter.scrape().await;

    // The decoded label carries the fact; the sample value is always 1.
    let state = find(&samples, "modemmanager_modem_state");
    assert_eq!(state[0].labels, vec!["modem-a", "connected"]);
    assert_eq!(state[0].value, 1.0);
    let power = find(&samples, "modemmanager_modem_power_state");
    assert_eq!(power[0].labels, vec!["modem-a", "on"]);
    assert_eq!(power[0].value, 1.0);
    let tech = find(&samples, "modemmanager_modem_access_technology");
    assert_eq!(tech[0].labels, vec!["modem-a", "lte"]);
    assert_eq!(tech[0].value, 1.0);
    let lock = find(&samples, "modemmanager_modem_unlock_required");
    assert_eq!(lock[0].labels, vec!["modem-a", "sim-pin"]);
    assert_eq!(lock[0].value, 1.0);
    assert_eq!(
        value(&samples, "modemmanager_modem_signal_quality_percent", "modem-a"),
        Some(80.0)
    );
}

#[tokio::test]
async fn it_exports_registration_and_omits_empty_operator_fields() {
    let modem = FakeModem {
        registration: Some(RegistrationSnapshot {
            state: 5,
            operator_code: "26201".to_owned(),
            operator_name: String::new(),
        }),
        ..FakeModem::healthy("modem-a")
    };
    let exporter = Exporter::new(Arc::new(FakeManager::with_modems(vec![modem])));

    let samples = exporter.scrape().await;

    let reg = find(&samples, "modemmanager_modem_3gpp_registration_state");
    assert_eq!(reg[0].labels, vec!["modem-a", "roaming"]);
    assert_eq!(reg[0].value, 1.0);
    let code = find(&samples, "modemmanager_modem_3gpp_operator_code");
    assert_eq!(code[0].labels, vec!["modem-a", "26201"]);
    assert!(find(&samples, "modemmanager_modem_3gpp_operator_name").is_empty());
}

#[tokio::test]
async fn it_reports_location_disabled_when_the_facet_fails() {
    let modem = FakeModem {
        location: None,
        ..FakeModem::healthy("modem-a")
    };
    let exporter = Exporter::new(Arc::new(FakeManager::with_modems(vec![modem])));

    let samples = exporter.scrape().await;

    assert_eq!(
        value(&samples, "modemmanager_location_enabled", "modem-a"),
        Some(0.0)
    );
    assert!(find(&samples, "modemmanager_location_latitude_degrees").is_empty());
    assert_eq!(meta(&samples, "modemmanager_scrape_errors_total"), Some(1.0));
}

#[tokio::test]
async fn it_exports_a_gps_fix_only_when_coordinates_are_present() {
    let with_fix = FakeModem {
        location: Some(LocationSnapshot {
            enabled: true,
            gps: Some(GpsFix {
                latitude: 52.52,
                longitude: 13.405,
                altitude: 0.0,
            }),
        }),
        ..FakeModem::healthy("modem-a")
    };
    let without_fix = FakeModem {
        location: Some(LocationSnapshot {
            enabled: true,
            gps: Some(GpsFix::default()),
        }),
        ..FakeModem::healthy("modem-b")
    };
    let exporter = Exporter::new(Arc::new(FakeManager::with_modems(vec![
        with_fix,
        without_fix,
    ])));

    let samples = exporter.scrape().await;

    assert_eq!(
        value(&samples, "modemmanager_location_latitude_degrees", "modem-a"),
        Some(52.52)
    );
    assert_eq!(
        value(&samples, "modemmanager_location_longitude_degrees", "modem-a"),
        Some(13.405)
    );
    // Altitude of exactly zero is treated as unreported.
    assert!(find(&samples, "modemmanager_location_altitude_meters").is_empty());
    assert!(
        value(&samples, "modemmanager_location_latitude_degrees", "modem-b").is_none()
    );
    assert_eq!(
        value(&samples, "modemmanager_location_enabled", "modem-b"),
        Some(1.0)
    );
}

#[tokio::test]
async fn it_emits_identical_samples_when_a_facet_keeps_failing() {
    let modem = FakeModem {
        sim: None,
        ..FakeModem::healthy("modem-a")
    };
    let exporter = Exporter::new(Arc::new(FakeManager::with_modems(vec![modem])));

    let strip_duration = |mut samples: Vec<mm_exporter::exporter::Sample>| {
        samples.retain(|s| s.name != "modemmanager_scrape_duration_seconds");
        samples
    };
    let first = strip_duration(exporter.scrape().await);
    let second = strip_duration(exporter.scrape().await);

    // No state carries over between scrapes: the error count is per scrape.
    assert_eq!(meta(&first, "modemmanager_scrape_errors_total"), Some(1.0));
    assert_eq!(first, second);
}

#[tokio::test]
async fn it_counts_a_version_failure_without_flipping_success() {
    let manager = FakeManager {
        version: None,
        modems: Some(vec![]),
    };
    let exporter = Exporter::new(Arc::new(manager));

    let samples = exporter.scrape().await;

    assert!(find(&samples, "modemmanager_info").is_empty());
    assert_eq!(meta(&samples, "modemmanager_scrape_success"), Some(1.0));
    assert_eq!(meta(&samples, "modemmanager_scrape_errors_total"), Some(1.0));
}

#[tokio::test]
async fn it_requests_signal_refresh_on_every_modem() {
    let willing = Arc::new(FakeModem::healthy("modem-a"));
    let refusing = Arc::new(FakeModem {
        fail_signal_setup: true,
        ..FakeModem::healthy("modem-b")
    });
    let manager = FakeManager {
        version: Some("1.20.6".to_owned()),
        modems: Some(vec![Arc::clone(&willing), Arc::clone(&refusing)]),
    };

    setup_signal_refresh(&manager, Duration::from_secs(5)).await;

    assert_eq!(willing.signal_setup_calls.load(Ordering::Relaxed), 1);
    assert_eq!(refusing.signal_setup_calls.load(Ordering::Relaxed), 1);
}
