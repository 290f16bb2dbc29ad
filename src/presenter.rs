//! The metrics tab: activation gate, fetch orchestration, derived figures and
//! chart drawing.

use std::fmt;
use std::sync::mpsc;
use std::thread;

use serde::Serialize;
use tracing::{info, warn};

use crate::chart::{build_spec_chart, ChartId, ChartPayload, ChartSpec, ChartSurface};
use crate::config;
use crate::error::{KioskError, Result};
use crate::models::{IndicatorRecord, PerformanceIndicators, PeriodSnapshot, Plan, RevenueSummary};
use crate::source::MetricsSource;
use crate::stats::{self, PercentChange};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Everything fetched for the metrics tab. Fields stay at their defaults
/// until the corresponding fetch succeeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsState {
    pub revenue: RevenueSummary,
    pub generic_trial_users: u64,
    pub plans: Vec<Plan>,
    pub indicators: Vec<IndicatorRecord>,
    pub last_months_indicators: Option<PeriodSnapshot>,
    pub last_years_indicators: Option<PeriodSnapshot>,
}

impl MetricsState {
    fn apply_indicators(&mut self, response: PerformanceIndicators) {
        self.indicators = response.indicators;
        self.last_months_indicators = response.last_month;
        self.last_years_indicators = response.last_year;
    }
}

/// One of the four requests issued on activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fetch {
    Revenue,
    Plans,
    TrialUsers,
    PerformanceIndicators,
}

impl Fetch {
    pub fn as_str(self) -> &'static str {
        match self {
            Fetch::Revenue => "revenue",
            Fetch::Plans => "plans",
            Fetch::TrialUsers => "trialing",
            Fetch::PerformanceIndicators => "indicators",
        }
    }
}

impl fmt::Display for Fetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one load: which fetches landed and whether charts were drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub succeeded: Vec<Fetch>,
    pub failed: Vec<(Fetch, String)>,
    pub charts_drawn: bool,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn record<T>(&mut self, fetch: Fetch, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.succeeded.push(fetch);
                Some(value)
            }
            Err(e) => {
                warn!(endpoint = fetch.as_str(), error = %e, "kiosk metrics fetch failed");
                self.failed.push((fetch, e.to_string()));
                None
            }
        }
    }
}

/// What an activation signal did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The signal named another tab.
    Ignored,
    /// Data was already loaded; nothing was fetched.
    AlreadyLoaded,
    Loaded(LoadReport),
}

/// Headline figures shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub monthly_recurring_revenue: f64,
    pub yearly_recurring_revenue: f64,
    pub total_volume: f64,
    pub total_trial_users: u64,
    pub total_subscribers: u64,
    pub monthly_change_in_monthly_recurring_revenue: PercentChange,
    pub yearly_change_in_monthly_recurring_revenue: PercentChange,
    pub monthly_change_in_yearly_recurring_revenue: PercentChange,
    pub yearly_change_in_yearly_recurring_revenue: PercentChange,
}

// ---------------------------------------------------------------------------
// MetricsPresenter
// ---------------------------------------------------------------------------

/// Owns fetched kiosk state for the lifetime of the metrics view.
///
/// Data is loaded on the first activation for this presenter's tab and kept
/// until [`reset()`](Self::reset); later activations are no-ops.
pub struct MetricsPresenter<S> {
    source: S,
    tab: String,
    currency_symbol: String,
    state: MetricsState,
    loaded: bool,
}

impl<S: MetricsSource> MetricsPresenter<S> {
    pub fn new(source: S, tab: &str, currency_symbol: &str) -> Self {
        Self {
            source,
            tab: tab.to_string(),
            currency_symbol: currency_symbol.to_string(),
            state: MetricsState::default(),
            loaded: false,
        }
    }

    /// Presenter for the default `"metrics"` tab with a `$` currency axis.
    pub fn with_defaults(source: S) -> Self {
        Self::new(source, config::DEFAULT_TAB, config::DEFAULT_CURRENCY_SYMBOL)
    }

    // -- Activation --------------------------------------------------------

    /// Handle a tab-selection signal.
    ///
    /// Fetches only when `tab` is this presenter's tab and nothing has been
    /// loaded yet. Charts are drawn onto `surface` once the indicator series
    /// arrives.
    pub fn activate(&mut self, tab: &str, surface: &mut dyn ChartSurface) -> Activation {
        if tab != self.tab {
            return Activation::Ignored;
        }
        if self.loaded {
            return Activation::AlreadyLoaded;
        }
        Activation::Loaded(self.load(surface))
    }

    /// Issue all four fetches concurrently and apply each result as it
    /// arrives.
    ///
    /// Failures are logged and reported but never roll back the other
    /// fetches. Charts are drawn as soon as the indicator series lands,
    /// whether or not the other fetches have finished. The presenter counts
    /// as loaded once the revenue totals land.
    fn load(&mut self, surface: &mut dyn ChartSurface) -> LoadReport {
        let Self {
            source,
            tab,
            currency_symbol,
            state,
            loaded,
        } = self;
        let source: &S = source;
        let mut report = LoadReport::default();

        thread::scope(|s| {
            let (tx, rx) = mpsc::channel();
            let handles = [
                (
                    Fetch::Revenue,
                    spawn_fetch(s, &tx, move || Fetched::Revenue(source.revenue())),
                ),
                (
                    Fetch::Plans,
                    spawn_fetch(s, &tx, move || Fetched::Plans(source.plans())),
                ),
                (
                    Fetch::TrialUsers,
                    spawn_fetch(s, &tx, move || Fetched::TrialUsers(source.trial_users())),
                ),
                (
                    Fetch::PerformanceIndicators,
                    spawn_fetch(s, &tx, move || {
                        Fetched::PerformanceIndicators(source.performance_indicators())
                    }),
                ),
            ];
            drop(tx);

            for fetched in rx {
                match fetched {
                    Fetched::Revenue(result) => {
                        if let Some(revenue) = report.record(Fetch::Revenue, result) {
                            state.revenue = revenue;
                            *loaded = true;
                        }
                    }
                    Fetched::Plans(result) => {
                        if let Some(plans) = report.record(Fetch::Plans, result) {
                            state.plans = plans;
                        }
                    }
                    Fetched::TrialUsers(result) => {
                        if let Some(count) = report.record(Fetch::TrialUsers, result) {
                            state.generic_trial_users = count;
                        }
                    }
                    Fetched::PerformanceIndicators(result) => {
                        if let Some(response) = report.record(Fetch::PerformanceIndicators, result) {
                            state.apply_indicators(response);
                            draw_all(&state.indicators, currency_symbol, surface);
                            report.charts_drawn = true;
                        }
                    }
                }
            }

            // A panicking fetch drops its sender without reporting.
            for (fetch, handle) in handles {
                if handle.join().is_err() {
                    report.record::<()>(
                        fetch,
                        Err(KioskError::Fetch(format!("{fetch} fetch thread panicked"))),
                    );
                }
            }
        });

        info!(
            tab = %tab,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            indicators = state.indicators.len(),
            "kiosk metrics loaded"
        );
        report
    }

    /// Drop all fetched state so the next activation loads again.
    pub fn reset(&mut self) {
        self.state = MetricsState::default();
        self.loaded = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn state(&self) -> &MetricsState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn tab(&self) -> &str {
        &self.tab
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    // -- Derived figures ---------------------------------------------------

    fn compare(
        &self,
        baseline: Option<&PeriodSnapshot>,
        current: impl Fn(&IndicatorRecord) -> f64,
        previous: impl Fn(&PeriodSnapshot) -> f64,
    ) -> PercentChange {
        stats::percent_change(
            self.state.indicators.last().map(current),
            baseline.map(previous),
        )
    }

    pub fn monthly_change_in_monthly_recurring_revenue(&self) -> PercentChange {
        self.compare(
            self.state.last_months_indicators.as_ref(),
            |r| r.monthly_recurring_revenue,
            |s| s.monthly_recurring_revenue,
        )
    }

    pub fn yearly_change_in_monthly_recurring_revenue(&self) -> PercentChange {
        self.compare(
            self.state.last_years_indicators.as_ref(),
            |r| r.monthly_recurring_revenue,
            |s| s.monthly_recurring_revenue,
        )
    }

    pub fn monthly_change_in_yearly_recurring_revenue(&self) -> PercentChange {
        self.compare(
            self.state.last_months_indicators.as_ref(),
            |r| r.yearly_recurring_revenue,
            |s| s.yearly_recurring_revenue,
        )
    }

    pub fn yearly_change_in_yearly_recurring_revenue(&self) -> PercentChange {
        self.compare(
            self.state.last_years_indicators.as_ref(),
            |r| r.yearly_recurring_revenue,
            |s| s.yearly_recurring_revenue,
        )
    }

    pub fn total_trial_users(&self) -> u64 {
        stats::total_trial_users(self.state.generic_trial_users, &self.state.plans)
    }

    pub fn total_subscribers(&self) -> u64 {
        stats::total_subscribers(&self.state.plans)
    }

    pub fn chart_dates(&self) -> Vec<String> {
        stats::chart_dates(&self.state.indicators)
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            monthly_recurring_revenue: self.state.revenue.monthly_recurring_revenue,
            yearly_recurring_revenue: self.state.revenue.yearly_recurring_revenue,
            total_volume: self.state.revenue.total_volume,
            total_trial_users: self.total_trial_users(),
            total_subscribers: self.total_subscribers(),
            monthly_change_in_monthly_recurring_revenue: self
                .monthly_change_in_monthly_recurring_revenue(),
            yearly_change_in_monthly_recurring_revenue: self
                .yearly_change_in_monthly_recurring_revenue(),
            monthly_change_in_yearly_recurring_revenue: self
                .monthly_change_in_yearly_recurring_revenue(),
            yearly_change_in_yearly_recurring_revenue: self
                .yearly_change_in_yearly_recurring_revenue(),
        }
    }

    // -- Charts ------------------------------------------------------------

    pub fn chart(&self, id: ChartId) -> ChartPayload {
        chart_for(&self.state.indicators, id, &self.currency_symbol)
    }

    /// All four charts in drawing order.
    pub fn charts(&self) -> Vec<(ChartId, ChartPayload)> {
        ChartId::ALL.iter().map(|&id| (id, self.chart(id))).collect()
    }

    pub fn draw_charts(&self, surface: &mut dyn ChartSurface) {
        draw_all(&self.state.indicators, &self.currency_symbol, surface);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A completed fetch, sent back from its worker thread.
enum Fetched {
    Revenue(Result<RevenueSummary>),
    Plans(Result<Vec<Plan>>),
    TrialUsers(Result<u64>),
    PerformanceIndicators(Result<PerformanceIndicators>),
}

fn spawn_fetch<'scope, 'env, F>(
    scope: &'scope thread::Scope<'scope, 'env>,
    tx: &mpsc::Sender<Fetched>,
    fetch: F,
) -> thread::ScopedJoinHandle<'scope, ()>
where
    F: FnOnce() -> Fetched + Send + 'scope,
{
    let tx = tx.clone();
    scope.spawn(move || {
        // The receiver lives until every sender is dropped.
        let _ = tx.send(fetch());
    })
}

fn chart_for(indicators: &[IndicatorRecord], id: ChartId, currency_symbol: &str) -> ChartPayload {
    build_spec_chart(indicators, &ChartSpec::for_chart(id), currency_symbol)
}

fn draw_all(indicators: &[IndicatorRecord], currency_symbol: &str, surface: &mut dyn ChartSurface) {
    for id in ChartId::ALL {
        surface.draw(id, &chart_for(indicators, id, currency_symbol));
    }
}

impl<S> fmt::Display for MetricsPresenter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MetricsPresenter(tab={}, loaded={}, indicators={}, plans={})",
            self.tab,
            self.loaded,
            self.state.indicators.len(),
            self.state.plans.len()
        )
    }
}
