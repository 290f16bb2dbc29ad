//! Kiosk metrics for Rust.
//!
//! Fetches recurring-revenue and user-growth figures from a subscription
//! billing kiosk, derives period-over-period comparisons, and builds
//! chart-ready datasets from the trailing window of daily indicators.
//!
//! # Quick start
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use kiosk_metrics::{ChartId, ChartPayload, KioskMetrics};
//!
//! let mut kiosk = KioskMetrics::builder()
//!     .base_url("https://billing.example.com")
//!     .build()
//!     .unwrap();
//!
//! // Selecting the metrics tab loads data once and draws the charts
//! let mut charts: BTreeMap<ChartId, ChartPayload> = BTreeMap::new();
//! kiosk.activate("metrics", &mut charts);
//!
//! println!("{}", kiosk.presenter().monthly_change_in_monthly_recurring_revenue());
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod chart;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod presenter;
pub mod source;
pub mod stats;

#[cfg(feature = "async")]
pub use async_client::AsyncKioskMetrics;
pub use chart::{ChartId, ChartPayload, ChartSpec, ChartSurface, ScaleLabelFormatter};
pub use error::{KioskError, Result};
pub use presenter::{Activation, LoadReport, MetricsPresenter, MetricsSummary};
pub use source::{HttpSource, MetricsSource, SnapshotSource};
pub use stats::PercentChange;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// KioskMetricsBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`KioskMetrics`] instance.
///
/// Use [`KioskMetrics::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](KioskMetricsBuilder::build).
pub struct KioskMetricsBuilder {
    base_url: String,
    snapshot_dir: Option<PathBuf>,
    source: Option<Box<dyn MetricsSource>>,
    timeout: Duration,
    tab: String,
    currency_symbol: String,
}

impl Default for KioskMetricsBuilder {
    fn default() -> Self {
        Self {
            base_url: config::DEFAULT_BASE_URL.to_string(),
            snapshot_dir: None,
            source: None,
            timeout: config::DEFAULT_TIMEOUT,
            tab: config::DEFAULT_TAB.to_string(),
            currency_symbol: config::DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl KioskMetricsBuilder {
    /// Host serving the kiosk endpoints, e.g. `https://billing.example.com`.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Read captured JSON responses from `path` instead of fetching over HTTP.
    pub fn snapshot_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.snapshot_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Fetch through a custom [`MetricsSource`]. Takes precedence over
    /// [`snapshot_dir`](Self::snapshot_dir) and [`base_url`](Self::base_url).
    pub fn source<S: MetricsSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Tab identifier this widget reacts to. Defaults to `"metrics"`.
    pub fn tab(mut self, tab: &str) -> Self {
        self.tab = tab.to_string();
        self
    }

    /// Symbol used on currency axes. Defaults to `"$"`.
    pub fn currency_symbol(mut self, symbol: &str) -> Self {
        self.currency_symbol = symbol.to_string();
        self
    }

    /// Validate the configuration and build the widget. Nothing is fetched
    /// until the first activation.
    pub fn build(self) -> Result<KioskMetrics> {
        if self.tab.trim().is_empty() {
            return Err(KioskError::InvalidArgument(
                "Tab identifier must not be empty".into(),
            ));
        }

        let source: Box<dyn MetricsSource> = match (self.source, self.snapshot_dir) {
            (Some(source), _) => source,
            (None, Some(dir)) => Box::new(SnapshotSource::new(dir)?),
            (None, None) => {
                if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
                    return Err(KioskError::InvalidArgument(format!(
                        "Base URL must start with http:// or https://: {}",
                        self.base_url
                    )));
                }
                Box::new(HttpSource::new(&self.base_url, self.timeout)?)
            }
        };

        Ok(KioskMetrics {
            presenter: MetricsPresenter::new(source, &self.tab, &self.currency_symbol),
        })
    }
}

// ---------------------------------------------------------------------------
// KioskMetrics
// ---------------------------------------------------------------------------

/// The main entry point: a [`MetricsPresenter`] over whichever source the
/// builder selected.
pub struct KioskMetrics {
    presenter: MetricsPresenter<Box<dyn MetricsSource>>,
}

impl KioskMetrics {
    pub fn builder() -> KioskMetricsBuilder {
        KioskMetricsBuilder::default()
    }

    /// Forward a tab-selection signal from the hosting shell.
    ///
    /// See [`MetricsPresenter::activate`].
    pub fn activate(&mut self, tab: &str, surface: &mut dyn ChartSurface) -> Activation {
        self.presenter.activate(tab, surface)
    }

    /// Forget loaded data so the next activation fetches again.
    pub fn reset(&mut self) {
        self.presenter.reset();
    }

    pub fn summary(&self) -> MetricsSummary {
        self.presenter.summary()
    }

    pub fn charts(&self) -> Vec<(ChartId, ChartPayload)> {
        self.presenter.charts()
    }

    pub fn presenter(&self) -> &MetricsPresenter<Box<dyn MetricsSource>> {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut MetricsPresenter<Box<dyn MetricsSource>> {
        &mut self.presenter
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for KioskMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KioskMetrics(tab={}, loaded={}, currency={})",
            self.presenter.tab(),
            self.presenter.is_loaded(),
            self.presenter.currency_symbol()
        )
    }
}
