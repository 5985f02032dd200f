//! Scrape orchestration: one call produces the full sample set for one
//! Prometheus exposition.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::modem_manager::ModemManager;

pub mod catalog;
pub mod collect;
pub mod labels;

pub use catalog::{Catalog, EXPOSITION_CONTENT_TYPE, Sample, SampleBuffer};

pub struct Exporter {
    manager: Arc<dyn ModemManager>,
    catalog: Arc<Catalog>,
    /// Overlapping scrapes are serialized, not interleaved.
    scrape_lock: Mutex<()>,
}

impl Exporter {
    pub fn new(manager: Arc<dyn ModemManager>) -> Self {
        Self {
            manager,
            catalog: Arc::new(Catalog::new()),
            scrape_lock: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Manager daemon version for the landing page; never fails.
    pub async fn manager_version(&self) -> String {
        match self.manager.version().await {
            Ok(version) => version,
            Err(err) => {
                debug!("manager version unavailable: {err:#}");
                "unknown".to_owned()
            }
        }
    }

    /// Run one scrape and return every sample it produced. The success flag
    /// reflects only whether the modem listing worked; facet failures are
    /// counted but do not flip it.
    pub async fn scrape(&self) -> Vec<Sample> {
        let _guard = self.scrape_lock.lock().await;
        let started = Instant::now();

        let mut buf = SampleBuffer::new();
        let mut errors = 0u64;

        match self.manager.version().await {
            Ok(version) => buf.push(&self.catalog.info, vec![version], 1.0),
            Err(err) => {
                debug!("manager version unavailable: {err:#}");
                errors += 1;
            }
        }

        let success = match self.manager.list_modems().await {
            Ok(modems) => {
                for modem in &modems {
                    errors +=
                        collect::collect_modem(modem.as_ref(), &self.catalog, &mut buf)
                            .await;
                }
                true
            }
            Err(err) => {
                warn!("failed to list modems: {err:#}");
                errors += 1;
                false
            }
        };

        buf.push(
            &self.catalog.scrape_duration,
            vec![],
            started.elapsed().as_secs_f64(),
        );
        buf.push(
            &self.catalog.scrape_success,
            vec![],
            if success { 1.0 } else { 0.0 },
        );
        buf.push(&self.catalog.scrape_errors, vec![], errors as f64);

        buf.into_samples()
    }

    /// One scrape, rendered as text exposition.
    pub async fn scrape_text(&self) -> String {
        let samples = self.scrape().await;
        catalog::render(&self.catalog, &samples)
    }
}
