//! Fetch collaborators for kiosk metrics.
//!
//! [`HttpSource`] talks to the kiosk's JSON endpoints; [`SnapshotSource`]
//! reads the same payloads from files on disk (offline mode). Both implement
//! [`MetricsSource`], the seam the presenter fetches through.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config;
use crate::error::{KioskError, Result};
use crate::models::{PerformanceIndicators, Plan, RevenueSummary, TrialUsers};

/// The four independent fetches backing the metrics tab.
///
/// Implementations must be shareable across threads: the presenter issues
/// all four requests concurrently.
pub trait MetricsSource: Send + Sync {
    fn revenue(&self) -> Result<RevenueSummary>;

    fn plans(&self) -> Result<Vec<Plan>>;

    /// Users trialing without being attached to any plan.
    fn trial_users(&self) -> Result<u64>;

    fn performance_indicators(&self) -> Result<PerformanceIndicators>;
}

impl<S: MetricsSource + ?Sized> MetricsSource for Box<S> {
    fn revenue(&self) -> Result<RevenueSummary> {
        (**self).revenue()
    }

    fn plans(&self) -> Result<Vec<Plan>> {
        (**self).plans()
    }

    fn trial_users(&self) -> Result<u64> {
        (**self).trial_users()
    }

    fn performance_indicators(&self) -> Result<PerformanceIndicators> {
        (**self).performance_indicators()
    }
}

fn lookup<V: Clone>(table: &HashMap<&'static str, V>, name: &str) -> Result<V> {
    table
        .get(name)
        .cloned()
        .ok_or_else(|| KioskError::NotFound(format!("Unknown kiosk resource: {}", name)))
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

/// Fetches kiosk payloads over HTTP with a blocking [`reqwest`] client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: Client,
}

impl HttpSource {
    /// Create a source rooted at `base_url` (scheme and host, optionally a
    /// path prefix).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a logical endpoint name (`"revenue"`, `"plans"`, ...).
    pub fn url(&self, name: &str) -> Result<String> {
        let path = lookup(&config::endpoints(), name)?;
        Ok(format!("{}{}", self.base_url, path))
    }

    fn get_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let url = self.url(name)?;
        debug!(%url, "fetching kiosk metrics");
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?
            .error_for_status()?;
        Ok(resp.json()?)
    }
}

impl MetricsSource for HttpSource {
    fn revenue(&self) -> Result<RevenueSummary> {
        self.get_json("revenue")
    }

    fn plans(&self) -> Result<Vec<Plan>> {
        self.get_json("plans")
    }

    fn trial_users(&self) -> Result<u64> {
        self.get_json::<TrialUsers>("trialing").map(|t| t.0)
    }

    fn performance_indicators(&self) -> Result<PerformanceIndicators> {
        self.get_json("indicators")
    }
}

// ---------------------------------------------------------------------------
// SnapshotSource
// ---------------------------------------------------------------------------

/// Reads previously captured kiosk responses from a directory.
///
/// Expects `revenue.json`, `plans.json`, `trialing.json` and
/// `performance-indicators.json`; a missing file fails only its own fetch.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    dir: PathBuf,
}

impl SnapshotSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(KioskError::NotFound(format!(
                "Snapshot directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let filename = lookup(&config::snapshot_files(), name)?;
        let path = self.dir.join(filename);
        debug!(path = %path.display(), "reading kiosk snapshot");
        if !path.exists() {
            return Err(KioskError::NotFound(format!(
                "Snapshot file {} not found",
                path.display()
            )));
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl MetricsSource for SnapshotSource {
    fn revenue(&self) -> Result<RevenueSummary> {
        self.load("revenue")
    }

    fn plans(&self) -> Result<Vec<Plan>> {
        self.load("plans")
    }

    fn trial_users(&self) -> Result<u64> {
        self.load::<TrialUsers>("trialing").map(|t| t.0)
    }

    fn performance_indicators(&self) -> Result<PerformanceIndicators> {
        self.load("indicators")
    }
}
