//! Per-modem attribute collection.
//!
//! Each facet is pulled independently; a failure is logged at debug level,
//! counted, and omits that facet's metric families without touching the
//! others. The messaging and location facets additionally emit their
//! supported/enabled flag as 0 on failure so their absence stays visible.

use tracing::debug;

use crate::exporter::catalog::{Catalog, Desc, SampleBuffer};
use crate::exporter::labels::{self, Domain};
use crate::modem_manager::ModemDevice;

/// Collect every facet of one modem into `buf`. Returns the number of facet
/// failures encountered.
pub async fn collect_modem(
    modem: &dyn ModemDevice,
    catalog: &Catalog,
    buf: &mut SampleBuffer,
) -> u64 {
    // Without a device identifier there is no label to hang anything on.
    let device_id = match modem.device_id().await {
        Ok(id) => id,
        Err(err) => {
            debug!("skipping modem without device identifier: {err:#}");
            return 1;
        }
    };

    let mut errors = 0;
    errors += collect_info(modem, catalog, buf, &device_id).await;
    errors += collect_status(modem, catalog, buf, &device_id).await;
    errors += collect_signal(modem, catalog, buf, &device_id).await;
    errors += collect_bearers(modem, catalog, buf, &device_id).await;
    errors += collect_sim(modem, catalog, buf, &device_id).await;
    errors += collect_registration(modem, catalog, buf, &device_id).await;
    errors += collect_messaging(modem, catalog, buf, &device_id).await;
    errors += collect_location(modem, catalog, buf, &device_id).await;
    errors
}

async fn collect_info(
    modem: &dyn ModemDevice,
    catalog: &Catalog,
    buf: &mut SampleBuffer,
    device_id: &str,
) -> u64 {
    let info = match modem.info().await {
        Ok(info) => info,
        Err(err) => {
            debug!(device_id, "info unavailable: {err:#}");
            return 1;
        }
    };

    buf.push(
        &catalog.modem_info,
        vec![
            device_id.to_owned(),
            info.manufacturer,
            info.model,
            info.revision,
            info.equipment_id,
            info.device,
            info.plugin,
            info.primary_port,
        ],
        1.0,
    );
    if let Some(max) = info.max_bearers {
        buf.push(
            &catalog.modem_max_bearers,
            vec![device_id.to_owned()],
            f64::from(max),
        );
    }
    if let Some(max) = info.max_active_bearers {
        buf.push(
            &catalog.modem_max_active_bearers,
            vec![device_id.to_owned()],
            f64::from(max),
        );
    }
    0
}

async fn collect_status(
    modem: &dyn ModemDevice,
    catalog: &Catalog,
    buf: &mut SampleBuffer,
    device_id: &str,
) -> u64 {
    let status = match modem.status().await {
        Ok(status) => status,
        Err(err) => {
            debug!(device_id, "status unavailable: {err:#}");
            return 1;
        }
    };

    // Labeled state metrics always read 1; the decoded label is the fact.
    if let Some(state) = status.state {
        buf.push(
            &catalog.modem_state,
            vec![
                device_id.to_owned(),
                labels::normalize(Domain::ModemState, i64::from(state)).to_owned(),
            ],
            1.0,
        );
    }
    if let Some(power) = status.power_state {
        buf.push(
            &catalog.modem_power_state,
            vec![
                device_id.to_owned(),
                labels::normalize(Domain::PowerState, i64::from(power)).to_owned(),
            ],
            1.0,
        );
    }
    if let Some(quality) = status.signal_quality {
        buf.push(
            &catalog.modem_signal_quality,
            vec![device_id.to_owned()],
            f64::from(quality),
        );
    }
    if let Some(tech) = status.access_technologies {
        buf.push(
            &catalog.modem_access_technology,
            vec![
                device_id.to_owned(),
                labels::normalize(Domain::AccessTechnology, i64::from(tech)).to_owned(),
            ],
            1.0,
        );
    }
    if let Some(lock) = status.unlock_required {
        buf.push(
            &catalog.modem_unlock_required,
            vec![
                device_id.to_owned(),
                labels::normalize(Domain::LockType, i64::from(lock)).to_owned(),
            ],
            1.0,
        );
    }
    0
}

async fn collect_signal(
    modem: &dyn ModemDevice,
    catalog: &Catalog,
    buf: &mut SampleBuffer,
    device_id: &str,
) -> u64 {
    let signal = match modem.signal().await {
        Ok(signal) => signal,
        Err(err) => {
            debug!(device_id, "signal facet unavailable: {err:#}");
            return 1;
        }
    };

    if let Some(lte) = signal.lte {
        signal_field(buf, &catalog.signal_lte_rssi, device_id, lte.rssi);
        signal_field(buf, &catalog.signal_lte_rsrq, device_id, lte.rsrq);
        signal_field(buf, &catalog.signal_lte_rsrp, device_id, lte.rsrp);
        signal_field(buf, &catalog.signal_lte_snr, device_id, lte.snr);
    }
    if let Some(umts) = signal.umts {
        signal_field(buf, &catalog.signal_umts_rssi, device_id, umts.rssi);
        signal_field(buf, &catalog.signal_umts_ecio, device_id, umts.ecio);
        signal_field(buf, &catalog.signal_umts_rscp, device_id, umts.rscp);
    }
    if let Some(gsm) = signal.gsm {
        signal_field(buf, &catalog.signal_gsm_rssi, device_id, gsm.rssi);
    }
    if let Some(cdma) = signal.cdma {
        signal_field(buf, &catalog.signal_cdma_rssi, device_id, cdma.rssi);
        signal_field(buf, &catalog.signal_cdma_ecio, device_id, cdma.ecio);
    }
    if let Some(evdo) = signal.evdo {
        signal_field(buf, &catalog.signal_evdo_rssi, device_id, evdo.rssi);
        signal_field(buf, &catalog.signal_evdo_ecio, device_id, evdo.ecio);
        signal_field(buf, &catalog.signal_evdo_sinr, device_id, evdo.sinr);
        signal_field(buf, &catalog.signal_evdo_io, device_id, evdo.io);
    }
    0
}

/// Extended-signal fields report exactly 0.0 when the modem has no reading;
/// such fields are suppressed rather than emitted as a bogus measurement.
fn signal_field(buf: &mut SampleBuffer, desc: &Desc, device_id: &str, value: f64) {
    if value != 0.0 {
        buf.push(desc, vec![device_id.to_owned()], value);
    }
}

async fn collect_bearers(
    modem: &dyn ModemDevice,
    catalog: &Catalog,
    buf: &mut SampleBuffer,
    device_id: &str,
) -> u64 {
    let bearers = match modem.bearers().await {
        Ok(bearers) => bearers,
        Err(err) => {
            debug!(device_id, "bearers unavailable: {err:#}");
            return 1;
        }
    };

    for bearer in bearers {
        buf.push(
            &catalog.bearer_info,
            vec![
                device_id.to_owned(),
                bearer.path.clone(),
                bearer.interface,
                bearer.apn,
                bearer.ip_method,
                bearer.ip_address,
            ],
            1.0,
        );
        buf.push(
            &catalog.bearer_connected,
            vec![device_id.to_owned(), bearer.path.clone()],
            if bearer.connected { 1.0 } else { 0.0 },
        );
        if let Some(stats) = bearer.stats {
            buf.push(
                &catalog.bearer_rx_bytes,
                vec![device_id.to_owned(), bearer.path.clone()],
                stats.rx_bytes as f64,
            );
            buf.push(
                &catalog.bearer_tx_bytes,
                vec![device_id.to_owned(), bearer.path.clone()],
                stats.tx_bytes as f64,
            );
            buf.push(
                &catalog.bearer_duration,
                vec![device_id.to_owned(), bearer.path],
                stats.duration_secs as f64,
            );
        }
    }
    0
}

async fn collect_sim(
    modem: &dyn ModemDevice,
    catalog: &Catalog,
    buf: &mut SampleBuffer,
    device_id: &str,
) -> u64 {
    let sim = match modem.sim().await {
        Ok(sim) => sim,
        Err(err) => {
            debug!(device_id, "sim unavailable: {err:#}");
            return 1;
        }
    };

    buf.push(
        &catalog.sim_info,
        vec![device_id.to_owned(), sim.path, sim.imsi, sim.operator_name],
        1.0,
    );
    0
}

async fn collect_registration(
    modem: &dyn ModemDevice,
    catalog: &Catalog,
    buf: &mut SampleBuffer,
    device_id: &str,
) -> u64 {
    let reg = match modem.registration().await {
        Ok(reg) => reg,
        Err(err) => {
            debug!(device_id, "3gpp registration unavailable: {err:#}");
            return 1;
        }
    };

    buf.push(
        &catalog.registration_state,
        vec![
            device_id.to_owned(),
            labels::normalize(Domain::RegistrationState, i64::from(reg.state)).to_owned(),
        ],
        1.0,
    );
    if !reg.operator_code.is_empty() {
        buf.push(
            &catalog.operator_code,
            vec![device_id.to_owned(), reg.operator_code],
            1.0,
        );
    }
    if !reg.operator_name.is_empty() {
        buf.push(
            &catalog.operator_name,
            vec![device_id.to_owned(), reg.operator_name],
            1.0,
        );
    }
    0
}

async fn collect_messaging(
    modem: &dyn ModemDevice,
    catalog: &Catalog,
    buf: &mut SampleBuffer,
    device_id: &str,
) -> u64 {
    match modem.messaging().await {
        Ok(messaging) => {
            buf.push(
                &catalog.messaging_supported,
                vec![device_id.to_owned()],
                1.0,
            );
            buf.push(
                &catalog.messaging_sms_count,
                vec![device_id.to_owned()],
                messaging.message_count as f64,
            );
            0
        }
        Err(err) => {
            debug!(device_id, "messaging unavailable: {err:#}");
            // A zero count would be indistinguishable from an empty inbox.
            buf.push(
                &catalog.messaging_supported,
                vec![device_id.to_owned()],
                0.0,
            );
            1
        }
    }
}

async fn collect_location(
    modem: &dyn ModemDevice,
    catalog: &Catalog,
    buf: &mut SampleBuffer,
    device_id: &str,
) -> u64 {
    let location = match modem.location().await {
        Ok(location) => location,
        Err(err) => {
            debug!(device_id, "location unavailable: {err:#}");
            buf.push(&catalog.location_enabled, vec![device_id.to_owned()], 0.0);
            return 1;
        }
    };

    buf.push(
        &catalog.location_enabled,
        vec![device_id.to_owned()],
        if location.enabled { 1.0 } else { 0.0 },
    );
    if let Some(gps) = location.gps {
        // (0, 0) is the no-fix sentinel, not a place off the coast of Ghana.
        if gps.latitude != 0.0 || gps.longitude != 0.0 {
            buf.push(
                &catalog.location_latitude,
                vec![device_id.to_owned()],
                gps.latitude,
            );
            buf.push(
                &catalog.location_longitude,
                vec![device_id.to_owned()],
                gps.longitude,
            );
            if gps.altitude != 0.0 {
                buf.push(
                    &catalog.location_altitude,
                    vec![device_id.to_owned()],
                    gps.altitude,
                );
            }
        }
    }
    0
}
