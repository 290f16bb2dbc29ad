//! Presenter integration tests: activation gating, partial failures,
//! derived figures and chart drawing.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{RecordingSurface, StubSource};
use kiosk_metrics::models::{PerformanceIndicators, Plan, RevenueSummary};
use kiosk_metrics::presenter::Fetch;
use kiosk_metrics::{
    Activation, ChartId, ChartPayload, ChartSurface, MetricsPresenter, MetricsSource,
    PercentChange, Result,
};

// ---------------------------------------------------------------------------
// Activation gate
// ---------------------------------------------------------------------------

#[test]
fn other_tab_never_fetches() {
    let mut presenter = MetricsPresenter::with_defaults(StubSource::healthy());
    let mut surface = RecordingSurface::default();

    for tab in ["users", "announcements", "Metrics", ""] {
        assert_eq!(presenter.activate(tab, &mut surface), Activation::Ignored);
    }
    assert_eq!(presenter.source().calls.total(), 0);
    assert!(!presenter.is_loaded());
    assert!(surface.draws.is_empty());
}

#[test]
fn matching_tab_fetches_all_four_once() {
    let mut presenter = MetricsPresenter::with_defaults(StubSource::healthy());
    let mut surface = RecordingSurface::default();

    let Activation::Loaded(report) = presenter.activate("metrics", &mut surface) else {
        panic!("expected a load");
    };
    assert!(report.is_complete());
    assert!(report.charts_drawn);
    assert_eq!(report.succeeded.len(), 4);

    let calls = &presenter.source().calls;
    assert_eq!(calls.revenue.load(Ordering::SeqCst), 1);
    assert_eq!(calls.plans.load(Ordering::SeqCst), 1);
    assert_eq!(calls.trial_users.load(Ordering::SeqCst), 1);
    assert_eq!(calls.indicators.load(Ordering::SeqCst), 1);
}

#[test]
fn second_activation_is_a_no_op() {
    let mut presenter = MetricsPresenter::with_defaults(StubSource::healthy());
    let mut surface = RecordingSurface::default();

    presenter.activate("metrics", &mut surface);
    assert_eq!(presenter.activate("metrics", &mut surface), Activation::AlreadyLoaded);
    assert_eq!(presenter.activate("metrics", &mut surface), Activation::AlreadyLoaded);

    assert_eq!(presenter.source().calls.total(), 4);
    assert_eq!(surface.draws.len(), 4);
}

#[test]
fn custom_tab_identifier() {
    let mut presenter = MetricsPresenter::new(StubSource::healthy(), "kiosk-metrics", "$");
    let mut surface = RecordingSurface::default();

    assert_eq!(presenter.activate("metrics", &mut surface), Activation::Ignored);
    assert!(matches!(
        presenter.activate("kiosk-metrics", &mut surface),
        Activation::Loaded(_)
    ));
}

#[test]
fn zero_revenue_still_counts_as_loaded() {
    let mut source = StubSource::healthy();
    source.revenue = Some(RevenueSummary::default());
    let mut presenter = MetricsPresenter::with_defaults(source);
    let mut surface = RecordingSurface::default();

    presenter.activate("metrics", &mut surface);
    assert!(presenter.is_loaded());
    assert_eq!(presenter.activate("metrics", &mut surface), Activation::AlreadyLoaded);
    assert_eq!(presenter.source().calls.total(), 4);
}

#[test]
fn failed_revenue_fetch_allows_another_load() {
    let mut source = StubSource::healthy();
    source.revenue = None;
    let mut presenter = MetricsPresenter::with_defaults(source);
    let mut surface = RecordingSurface::default();

    presenter.activate("metrics", &mut surface);
    assert!(!presenter.is_loaded());
    assert!(matches!(
        presenter.activate("metrics", &mut surface),
        Activation::Loaded(_)
    ));
    assert_eq!(presenter.source().calls.revenue.load(Ordering::SeqCst), 2);
}

#[test]
fn reset_clears_state_and_reloads() {
    let mut presenter = MetricsPresenter::with_defaults(StubSource::healthy());
    let mut surface = RecordingSurface::default();

    presenter.activate("metrics", &mut surface);
    presenter.reset();
    assert!(!presenter.is_loaded());
    assert!(presenter.state().indicators.is_empty());
    assert_eq!(presenter.total_trial_users(), 0);

    assert!(matches!(
        presenter.activate("metrics", &mut surface),
        Activation::Loaded(_)
    ));
    assert_eq!(presenter.source().calls.total(), 8);
}

// ---------------------------------------------------------------------------
// Partial failures
// ---------------------------------------------------------------------------

#[test]
fn failure_of_one_fetch_keeps_the_others() {
    let mut source = StubSource::healthy();
    source.plans = None;
    let mut presenter = MetricsPresenter::with_defaults(source);
    let mut surface = RecordingSurface::default();

    let Activation::Loaded(report) = presenter.activate("metrics", &mut surface) else {
        panic!("expected a load");
    };
    assert!(!report.is_complete());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, Fetch::Plans);
    assert!(report.failed[0].1.contains("plans"));

    let state = presenter.state();
    assert!(state.plans.is_empty());
    assert_eq!(state.generic_trial_users, 4);
    assert_eq!(state.revenue.yearly_recurring_revenue, 1668.0);
    assert_eq!(state.indicators.len(), 40);
    assert_eq!(presenter.total_trial_users(), 4);
}

#[test]
fn charts_wait_for_indicator_fetch() {
    let mut source = StubSource::healthy();
    source.indicators = None;
    let mut presenter = MetricsPresenter::with_defaults(source);
    let mut surface = RecordingSurface::default();

    let Activation::Loaded(report) = presenter.activate("metrics", &mut surface) else {
        panic!("expected a load");
    };
    assert!(!report.charts_drawn);
    assert!(surface.draws.is_empty());
    assert_eq!(
        presenter.monthly_change_in_monthly_recurring_revenue(),
        PercentChange::Unavailable
    );
}

#[test]
fn everything_failing_degrades_to_defaults() {
    let mut presenter = MetricsPresenter::with_defaults(StubSource::default());
    let mut surface = RecordingSurface::default();

    let Activation::Loaded(report) = presenter.activate("metrics", &mut surface) else {
        panic!("expected a load");
    };
    assert!(report.succeeded.is_empty());
    assert_eq!(report.failed.len(), 4);

    let summary = presenter.summary();
    assert_eq!(summary.total_trial_users, 0);
    assert_eq!(summary.monthly_recurring_revenue, 0.0);
    assert_eq!(summary.yearly_change_in_yearly_recurring_revenue, PercentChange::Unavailable);
    for (_, chart) in presenter.charts() {
        assert!(chart.labels.is_empty());
        assert!(chart.data().is_empty());
    }
}

// ---------------------------------------------------------------------------
// Derived figures
// ---------------------------------------------------------------------------

#[test]
fn monthly_change_against_last_month() {
    let mut source = StubSource::healthy();
    source.indicators = Some(PerformanceIndicators {
        indicators: vec![
            common::record("2024-05-01", 100.0, 1200.0, 0.0, 0),
            common::record("2024-05-02", 110.0, 1320.0, 0.0, 0),
        ],
        last_month: Some(common::snapshot(100.0, 1200.0)),
        last_year: None,
    });
    let mut presenter = MetricsPresenter::with_defaults(source);
    presenter.activate("metrics", &mut RecordingSurface::default());

    assert_eq!(
        presenter.monthly_change_in_monthly_recurring_revenue().to_string(),
        "+10"
    );
    assert_eq!(
        presenter.monthly_change_in_yearly_recurring_revenue().to_string(),
        "+10"
    );
    assert_eq!(
        presenter.yearly_change_in_monthly_recurring_revenue(),
        PercentChange::Unavailable
    );
    assert_eq!(
        presenter.yearly_change_in_yearly_recurring_revenue(),
        PercentChange::Unavailable
    );
}

#[test]
fn yearly_changes_use_last_year_baseline() {
    let mut presenter = MetricsPresenter::with_defaults(StubSource::healthy());
    presenter.activate("metrics", &mut RecordingSurface::default());

    // Latest day: MRR 139, ARR 1668; last year: MRR 50, ARR 600.
    assert_eq!(presenter.yearly_change_in_monthly_recurring_revenue().value(), Some(178));
    assert_eq!(presenter.yearly_change_in_yearly_recurring_revenue().value(), Some(178));
    assert_eq!(presenter.monthly_change_in_monthly_recurring_revenue().value(), Some(39));
}

#[test]
fn zero_baseline_is_unavailable_not_infinite() {
    let mut source = StubSource::healthy();
    if let Some(indicators) = source.indicators.as_mut() {
        indicators.last_month = Some(common::snapshot(0.0, 0.0));
    }
    let mut presenter = MetricsPresenter::with_defaults(source);
    presenter.activate("metrics", &mut RecordingSurface::default());

    assert_eq!(
        presenter.monthly_change_in_monthly_recurring_revenue(),
        PercentChange::Unavailable
    );
    assert_eq!(
        presenter.monthly_change_in_yearly_recurring_revenue(),
        PercentChange::Unavailable
    );
}

#[test]
fn empty_series_with_baseline_is_unavailable() {
    let mut source = StubSource::healthy();
    if let Some(indicators) = source.indicators.as_mut() {
        indicators.indicators.clear();
    }
    let mut presenter = MetricsPresenter::with_defaults(source);
    let mut surface = RecordingSurface::default();
    presenter.activate("metrics", &mut surface);

    assert_eq!(
        presenter.monthly_change_in_monthly_recurring_revenue(),
        PercentChange::Unavailable
    );
    assert_eq!(surface.draws.len(), 4);
    assert!(surface.draws.iter().all(|(_, chart)| chart.is_empty()));
}

#[test]
fn summary_collects_headline_figures() {
    let mut presenter = MetricsPresenter::with_defaults(StubSource::healthy());
    presenter.activate("metrics", &mut RecordingSurface::default());

    let summary = presenter.summary();
    assert_eq!(summary.total_trial_users, 9);
    assert_eq!(summary.total_subscribers, 15);
    assert_eq!(summary.total_volume, 7800.0);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["monthlyChangeInMonthlyRecurringRevenue"], "+39");
    assert_eq!(json["totalTrialUsers"], 9);
}

// ---------------------------------------------------------------------------
// Chart drawing
// ---------------------------------------------------------------------------

#[test]
fn charts_are_drawn_in_kiosk_order() {
    let mut presenter = MetricsPresenter::with_defaults(StubSource::healthy());
    let mut surface = RecordingSurface::default();
    presenter.activate("metrics", &mut surface);

    assert_eq!(surface.ids(), ChartId::ALL.to_vec());

    let lengths: Vec<usize> = surface.draws.iter().map(|(_, c)| c.labels.len()).collect();
    assert_eq!(lengths, vec![30, 30, 14, 14]);

    let (_, mrr) = &surface.draws[0];
    assert_eq!(mrr.options.scale_label(1234.0), "$1,234.00");
    let (_, users) = &surface.draws[3];
    assert_eq!(users.options.scale_label(1234.0), "1234");
}

#[test]
fn currency_symbol_flows_to_axes() {
    let mut presenter = MetricsPresenter::new(StubSource::healthy(), "metrics", "€");
    let mut surface = RecordingSurface::default();
    presenter.activate("metrics", &mut surface);

    let (_, volume) = &surface.draws[2];
    assert_eq!(volume.options.scale_label(50.0), "€50.00");
}

#[test]
fn chart_dates_cover_whole_series() {
    let mut presenter = MetricsPresenter::with_defaults(StubSource::healthy());
    presenter.activate("metrics", &mut RecordingSurface::default());

    let dates = presenter.chart_dates();
    assert_eq!(dates.len(), 40);
    assert_eq!(dates[0], "1/1");
    assert_eq!(dates[39], "2/9");
}

#[test]
fn display_reports_state() {
    let presenter = MetricsPresenter::with_defaults(StubSource::healthy());
    assert_eq!(
        presenter.to_string(),
        "MetricsPresenter(tab=metrics, loaded=false, indicators=0, plans=0)"
    );
}

// ---------------------------------------------------------------------------
// Fetch ordering
// ---------------------------------------------------------------------------

/// Holds the revenue response back until charts have been drawn (or a
/// second has passed).
struct RevenueAfterCharts {
    inner: StubSource,
    drawn: Arc<AtomicBool>,
}

impl MetricsSource for RevenueAfterCharts {
    fn revenue(&self) -> Result<RevenueSummary> {
        let deadline = Instant::now() + Duration::from_secs(1);
        while !self.drawn.load(Ordering::SeqCst) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        self.inner.revenue()
    }

    fn plans(&self) -> Result<Vec<Plan>> {
        self.inner.plans()
    }

    fn trial_users(&self) -> Result<u64> {
        self.inner.trial_users()
    }

    fn performance_indicators(&self) -> Result<PerformanceIndicators> {
        self.inner.performance_indicators()
    }
}

struct FlagSurface {
    drawn: Arc<AtomicBool>,
    count: usize,
}

impl ChartSurface for FlagSurface {
    fn draw(&mut self, _id: ChartId, _payload: &ChartPayload) {
        self.count += 1;
        self.drawn.store(true, Ordering::SeqCst);
    }
}

#[test]
fn charts_drawn_before_slow_revenue_lands() {
    let drawn = Arc::new(AtomicBool::new(false));
    let source = RevenueAfterCharts {
        inner: StubSource::healthy(),
        drawn: Arc::clone(&drawn),
    };
    let mut presenter = MetricsPresenter::with_defaults(source);
    let mut surface = FlagSurface {
        drawn: Arc::clone(&drawn),
        count: 0,
    };

    let started = Instant::now();
    let Activation::Loaded(report) = presenter.activate("metrics", &mut surface) else {
        panic!("expected a load");
    };
    assert!(started.elapsed() < Duration::from_millis(900));
    assert!(report.is_complete());
    assert!(report.charts_drawn);
    assert_eq!(surface.count, 4);
    assert!(presenter.is_loaded());
}

struct PanickingPlans(StubSource);

impl MetricsSource for PanickingPlans {
    fn revenue(&self) -> Result<RevenueSummary> {
        self.0.revenue()
    }

    fn plans(&self) -> Result<Vec<Plan>> {
        panic!("plans backend exploded");
    }

    fn trial_users(&self) -> Result<u64> {
        self.0.trial_users()
    }

    fn performance_indicators(&self) -> Result<PerformanceIndicators> {
        self.0.performance_indicators()
    }
}

#[test]
fn panicked_fetch_is_reported_as_fetch_failure() {
    let mut presenter = MetricsPresenter::with_defaults(PanickingPlans(StubSource::healthy()));
    let mut surface = RecordingSurface::default();

    let Activation::Loaded(report) = presenter.activate("metrics", &mut surface) else {
        panic!("expected a load");
    };
    assert_eq!(report.succeeded.len(), 3);
    assert_eq!(report.failed.len(), 1);
    let (fetch, message) = &report.failed[0];
    assert_eq!(*fetch, Fetch::Plans);
    assert_eq!(message, "Fetch failed: plans fetch thread panicked");
    assert!(report.charts_drawn);
    assert!(presenter.state().plans.is_empty());
    assert_eq!(presenter.total_trial_users(), 4);
}
