//! Async wrapper around [`KioskMetrics`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every operation on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], since fetches use a blocking HTTP client.
//!
//! # Example
//!
//! ```no_run
//! use kiosk_metrics::AsyncKioskMetrics;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let kiosk = AsyncKioskMetrics::builder()
//!         .base_url("https://billing.example.com")
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let (activation, charts) = kiosk.activate("metrics").await.unwrap();
//!     println!("{activation:?}: {} charts", charts.len());
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::chart::{ChartId, ChartPayload};
use crate::error::{KioskError, Result};
use crate::presenter::{Activation, MetricsSummary};
use crate::{config, KioskMetrics};

// ---------------------------------------------------------------------------
// AsyncKioskMetricsBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncKioskMetrics`] instance.
pub struct AsyncKioskMetricsBuilder {
    base_url: String,
    snapshot_dir: Option<PathBuf>,
    timeout: Duration,
    tab: String,
    currency_symbol: String,
}

impl Default for AsyncKioskMetricsBuilder {
    fn default() -> Self {
        Self {
            base_url: config::DEFAULT_BASE_URL.to_string(),
            snapshot_dir: None,
            timeout: config::DEFAULT_TIMEOUT,
            tab: config::DEFAULT_TAB.to_string(),
            currency_symbol: config::DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl AsyncKioskMetricsBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn snapshot_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.snapshot_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn tab(mut self, tab: &str) -> Self {
        self.tab = tab.to_string();
        self
    }

    pub fn currency_symbol(mut self, symbol: &str) -> Self {
        self.currency_symbol = symbol.to_string();
        self
    }

    /// Build the async wrapper.
    ///
    /// Construction runs on the blocking thread pool because the blocking
    /// HTTP client must not be created inside the async runtime.
    pub async fn build(self) -> Result<AsyncKioskMetrics> {
        tokio::task::spawn_blocking(move || {
            let mut builder = KioskMetrics::builder()
                .base_url(&self.base_url)
                .timeout(self.timeout)
                .tab(&self.tab)
                .currency_symbol(&self.currency_symbol);
            if let Some(dir) = self.snapshot_dir {
                builder = builder.snapshot_dir(dir);
            }
            let kiosk = builder.build()?;
            Ok(AsyncKioskMetrics {
                inner: Arc::new(Mutex::new(kiosk)),
            })
        })
        .await
        .map_err(|e| KioskError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncKioskMetrics
// ---------------------------------------------------------------------------

/// Async wrapper around [`KioskMetrics`].
///
/// The wrapped instance sits behind a [`Mutex`] so activations from
/// different tasks are serialised, preserving the load-once behaviour.
pub struct AsyncKioskMetrics {
    inner: Arc<Mutex<KioskMetrics>>,
}

impl AsyncKioskMetrics {
    pub fn builder() -> AsyncKioskMetricsBuilder {
        AsyncKioskMetricsBuilder::default()
    }

    /// Run a sync operation against the wrapped [`KioskMetrics`] on the
    /// blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut KioskMetrics) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let kiosk = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = kiosk
                .lock()
                .map_err(|_| KioskError::InvalidArgument("Kiosk lock poisoned".into()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| KioskError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Forward a tab-selection signal and collect any charts drawn by it.
    pub async fn activate(
        &self,
        tab: &str,
    ) -> Result<(Activation, BTreeMap<ChartId, ChartPayload>)> {
        let tab = tab.to_string();
        self.run(move |k| {
            let mut charts = BTreeMap::new();
            let activation = k.activate(&tab, &mut charts);
            Ok((activation, charts))
        })
        .await
    }

    pub async fn summary(&self) -> Result<MetricsSummary> {
        self.run(|k| Ok(k.summary())).await
    }

    pub async fn charts(&self) -> Result<Vec<(ChartId, ChartPayload)>> {
        self.run(|k| Ok(k.charts())).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.run(|k| {
            k.reset();
            Ok(())
        })
        .await
    }
}
