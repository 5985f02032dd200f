//! zbus-backed implementation of the accessor traits, talking to the real
//! ModemManager daemon on the system bus.
//!
//! Proxies are built per call against the modem's object path; property reads
//! that the modem legitimately does not answer degrade to defaults or `None`,
//! while a missing facet interface surfaces as the facet-scoped `Err` the
//! collector expects.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre::{Result, WrapErr as _, bail};
use mm_exporter_dbus::{
    BearerProxy, MM_PATH, MM_SERVICE, MODEM_INTERFACE, Modem3gppProxy,
    ModemLocationProxy, ModemManager1Proxy, ModemMessagingProxy, ModemProxy,
    ModemSignalProxy, SimProxy,
};
use zbus::Connection;
use zbus::fdo::ObjectManagerProxy;
use zbus::zvariant::{OwnedObjectPath, OwnedValue};

use super::{
    BearerSnapshot, BearerStats, CdmaSignal, EvdoSignal, GpsFix, GsmSignal,
    LocationSnapshot, LteSignal, MessagingSnapshot, ModemDevice, ModemInfo,
    ModemManager, ModemStatus, RegistrationSnapshot, SignalSnapshot, SimSnapshot,
    UmtsSignal,
};

/// `MMModemLocationSource` value under which raw GPS fixes are reported.
const LOCATION_SOURCE_GPS_RAW: u32 = 2;

pub struct ModemManagerDbus {
    conn: Connection,
}

impl ModemManagerDbus {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ModemManager for ModemManagerDbus {
    async fn version(&self) -> Result<String> {
        let proxy = ModemManager1Proxy::new(&self.conn).await?;
        let version = proxy
            .version()
            .await
            .wrap_err("failed to read ModemManager version")?;
        Ok(version)
    }

    async fn list_modems(&self) -> Result<Vec<Arc<dyn ModemDevice>>> {
        let om = ObjectManagerProxy::builder(&self.conn)
            .destination(MM_SERVICE)?
            .path(MM_PATH)?
            .build()
            .await?;
        let objects = om
            .get_managed_objects()
            .await
            .wrap_err("failed to list modems")?;

        let mut paths: Vec<OwnedObjectPath> = objects
            .into_iter()
            .filter(|(_, interfaces)| {
                interfaces.keys().any(|i| i.as_str() == MODEM_INTERFACE)
            })
            .map(|(path, _)| path)
            .collect();
        // deterministic modem order across scrapes
        paths.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        Ok(paths
            .into_iter()
            .map(|path| {
                Arc::new(ModemDbus {
                    conn: self.conn.clone(),
                    path,
                }) as Arc<dyn ModemDevice>
            })
            .collect())
    }
}

struct ModemDbus {
    conn: Connection,
    path: OwnedObjectPath,
}

impl ModemDbus {
    async fn modem(&self) -> Result<ModemProxy<'_>> {
        let proxy = ModemProxy::builder(&self.conn)
            .path(self.path.clone())?
            .build()
            .await?;
        Ok(proxy)
    }

    async fn signal_facet(&self) -> Result<ModemSignalProxy<'_>> {
        let proxy = ModemSignalProxy::builder(&self.conn)
            .path(self.path.clone())?
            .build()
            .await?;
        Ok(proxy)
    }
}

#[async_trait]
impl ModemDevice for ModemDbus {
    async fn device_id(&self) -> Result<String> {
        let id = self
            .modem()
            .await?
            .device_identifier()
            .await
            .wrap_err_with(|| format!("no device identifier on {}", self.path))?;
        Ok(id)
    }

    async fn info(&self) -> Result<ModemInfo> {
        let m = self.modem().await?;
        Ok(ModemInfo {
            manufacturer: m.manufacturer().await.unwrap_or_default(),
            model: m.model().await.unwrap_or_default(),
            revision: m.revision().await.unwrap_or_default(),
            equipment_id: m.equipment_identifier().await.unwrap_or_default(),
            device: m.device().await.unwrap_or_default(),
            plugin: m.plugin().await.unwrap_or_default(),
            primary_port: m.primary_port().await.unwrap_or_default(),
            max_bearers: m.max_bearers().await.ok(),
            max_active_bearers: m.max_active_bearers().await.ok(),
        })
    }

    async fn status(&self) -> Result<ModemStatus> {
        let m = self.modem().await?;
        Ok(ModemStatus {
            state: m.state().await.ok(),
            power_state: m.power_state().await.ok(),
            signal_quality: m.signal_quality().await.ok().map(|(pct, _recent)| pct),
            access_technologies: m.access_technologies().await.ok(),
            unlock_required: m.unlock_required().await.ok(),
        })
    }

    async fn signal(&self) -> Result<SignalSnapshot> {
        let s = self.signal_facet().await?;

        let lte = s.lte().await.ok().map(|d| LteSignal {
            rssi: dict_f64(&d, "rssi"),
            rsrq: dict_f64(&d, "rsrq"),
            rsrp: dict_f64(&d, "rsrp"),
            snr: dict_f64(&d, "snr"),
        });
        let umts = s.umts().await.ok().map(|d| UmtsSignal {
            rssi: dict_f64(&d, "rssi"),
            ecio: dict_f64(&d, "ecio"),
            rscp: dict_f64(&d, "rscp"),
        });
        let gsm = s.gsm().await.ok().map(|d| GsmSignal {
            rssi: dict_f64(&d, "rssi"),
        });
        let cdma = s.cdma().await.ok().map(|d| CdmaSignal {
            rssi: dict_f64(&d, "rssi"),
            ecio: dict_f64(&d, "ecio"),
        });
        let evdo = s.evdo().await.ok().map(|d| EvdoSignal {
            rssi: dict_f64(&d, "rssi"),
            ecio: dict_f64(&d, "ecio"),
            sinr: dict_f64(&d, "sinr"),
            io: dict_f64(&d, "io"),
        });

        if lte.is_none()
            && umts.is_none()
            && gsm.is_none()
            && cdma.is_none()
            && evdo.is_none()
        {
            bail!("signal facet unavailable on {}", self.path);
        }

        Ok(SignalSnapshot {
            lte,
            umts,
            gsm,
            cdma,
            evdo,
        })
    }

    async fn setup_signal_refresh(&self, rate: Duration) -> Result<()> {
        self.signal_facet()
            .await?
            .setup(rate.as_secs() as u32)
            .await
            .wrap_err_with(|| format!("signal setup failed on {}", self.path))?;
        Ok(())
    }

    async fn bearers(&self) -> Result<Vec<BearerSnapshot>> {
        let paths = self.modem().await?.bearers().await?;

        let mut bearers = Vec::with_capacity(paths.len());
        for path in paths {
            let b = BearerProxy::builder(&self.conn)
                .path(path.clone())?
                .build()
                .await?;

            let ip4 = b.ip4_config().await.unwrap_or_default();
            let props = b.properties().await.unwrap_or_default();
            let stats = b.stats().await.ok().map(|d| BearerStats {
                rx_bytes: dict_u64(&d, "rx-bytes"),
                tx_bytes: dict_u64(&d, "tx-bytes"),
                duration_secs: dict_u64(&d, "duration"),
            });

            bearers.push(BearerSnapshot {
                path: path.to_string(),
                interface: b.interface().await.unwrap_or_default(),
                connected: b.connected().await.unwrap_or_default(),
                apn: dict_string(&props, "apn"),
                ip_method: ip_method_label(dict_u64(&ip4, "method") as u32),
                ip_address: dict_string(&ip4, "address"),
                stats,
            });
        }
        Ok(bearers)
    }

    async fn sim(&self) -> Result<SimSnapshot> {
        let path = self.modem().await?.sim().await?;
        if path.as_str() == "/" {
            bail!("no SIM on {}", self.path);
        }

        let sim = SimProxy::builder(&self.conn)
            .path(path.clone())?
            .build()
            .await?;
        Ok(SimSnapshot {
            path: path.to_string(),
            imsi: sim.imsi().await.unwrap_or_default(),
            operator_name: sim.operator_name().await.unwrap_or_default(),
        })
    }

    async fn registration(&self) -> Result<RegistrationSnapshot> {
        let p = Modem3gppProxy::builder(&self.conn)
            .path(self.path.clone())?
            .build()
            .await?;
        // the state read doubles as the facet-availability probe
        let state = p.registration_state().await?;
        Ok(RegistrationSnapshot {
            state,
            operator_code: p.operator_code().await.unwrap_or_default(),
            operator_name: p.operator_name().await.unwrap_or_default(),
        })
    }

    async fn messaging(&self) -> Result<MessagingSnapshot> {
        let p = ModemMessagingProxy::builder(&self.conn)
            .path(self.path.clone())?
            .build()
            .await?;
        let messages = p.messages().await?;
        Ok(MessagingSnapshot {
            message_count: messages.len(),
        })
    }

    async fn location(&self) -> Result<LocationSnapshot> {
        let p = ModemLocationProxy::builder(&self.conn)
            .path(self.path.clone())?
            .build()
            .await?;
        let enabled = p.signals_location().await?;

        let gps = if enabled {
            p.get_location().await.ok().and_then(|sources| {
                let raw = sources.get(&LOCATION_SOURCE_GPS_RAW)?;
                let fix: HashMap<String, OwnedValue> =
                    raw.try_clone().ok().and_then(|v| v.try_into().ok())?;
                Some(GpsFix {
                    latitude: dict_f64(&fix, "latitude"),
                    longitude: dict_f64(&fix, "longitude"),
                    altitude: dict_f64(&fix, "altitude"),
                })
            })
        } else {
            None
        };

        Ok(LocationSnapshot { enabled, gps })
    }
}

/// Missing or mistyped entries read as 0.0, which downstream means
/// "not reported".
fn dict_f64(dict: &HashMap<String, OwnedValue>, key: &str) -> f64 {
    dict.get(key)
        .and_then(|v| v.downcast_ref().ok())
        .unwrap_or_default()
}

fn dict_u64(dict: &HashMap<String, OwnedValue>, key: &str) -> u64 {
    dict.get(key)
        .and_then(|v| {
            v.downcast_ref::<u64>()
                .ok()
                .or_else(|| v.downcast_ref::<u32>().ok().map(u64::from))
        })
        .unwrap_or_default()
}

fn dict_string(dict: &HashMap<String, OwnedValue>, key: &str) -> String {
    dict.get(key)
        .and_then(|v| v.downcast_ref::<String>().ok())
        .unwrap_or_default()
}

/// Raw `MMBearerIpMethod` to label.
fn ip_method_label(method: u32) -> String {
    match method {
        1 => "ppp",
        2 => "static",
        3 => "dhcp",
        _ => "unknown",
    }
    .to_owned()
}
