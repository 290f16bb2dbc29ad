//! Shared fixtures for the kiosk metrics integration tests.
//!
//! Provides indicator series builders, a [`StubSource`] that counts fetches
//! and can fail individual endpoints, and a recording chart surface.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use kiosk_metrics::models::{
    IndicatorRecord, PerformanceIndicators, PeriodSnapshot, Plan, RevenueSummary,
};
use kiosk_metrics::{ChartId, ChartPayload, ChartSurface, KioskError, MetricsSource, Result};

/// One indicator day at midnight of `date` (`YYYY-MM-DD`).
pub fn record(date: &str, mrr: f64, arr: f64, volume: f64, new_users: u64) -> IndicatorRecord {
    IndicatorRecord {
        created_at: NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        monthly_recurring_revenue: mrr,
        yearly_recurring_revenue: arr,
        daily_volume: volume,
        new_users,
    }
}

/// `days` consecutive records starting 2024-01-01. Day `i` has
/// MRR `100 + i`, ARR `1200 + 12 * i`, volume `10 * i` and `i` new users.
pub fn daily_series(days: usize) -> Vec<IndicatorRecord> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..days)
        .map(|i| IndicatorRecord {
            created_at: (start + Duration::days(i as i64)).and_hms_opt(0, 0, 0).unwrap(),
            monthly_recurring_revenue: 100.0 + i as f64,
            yearly_recurring_revenue: 1200.0 + 12.0 * i as f64,
            daily_volume: 10.0 * i as f64,
            new_users: i as u64,
        })
        .collect()
}

pub fn snapshot(mrr: f64, arr: f64) -> PeriodSnapshot {
    PeriodSnapshot {
        monthly_recurring_revenue: mrr,
        yearly_recurring_revenue: arr,
        ..PeriodSnapshot::default()
    }
}

pub fn plan(name: &str, subscribers: u64, trialing: u64) -> Plan {
    Plan {
        id: Some(name.to_lowercase()),
        name: name.to_string(),
        price: 10.0,
        interval: "monthly".to_string(),
        subscriber_count: subscribers,
        trialing_count: trialing,
    }
}

// ---------------------------------------------------------------------------
// StubSource
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CallCounts {
    pub revenue: AtomicUsize,
    pub plans: AtomicUsize,
    pub trial_users: AtomicUsize,
    pub indicators: AtomicUsize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.revenue.load(Ordering::SeqCst)
            + self.plans.load(Ordering::SeqCst)
            + self.trial_users.load(Ordering::SeqCst)
            + self.indicators.load(Ordering::SeqCst)
    }
}

/// In-memory [`MetricsSource`]. A `None` field makes that fetch fail.
#[derive(Debug, Default)]
pub struct StubSource {
    pub revenue: Option<RevenueSummary>,
    pub plans: Option<Vec<Plan>>,
    pub trial_users: Option<u64>,
    pub indicators: Option<PerformanceIndicators>,
    pub calls: Arc<CallCounts>,
}

impl StubSource {
    /// Every fetch succeeds with a 40-day series and both baselines.
    pub fn healthy() -> Self {
        Self {
            revenue: Some(RevenueSummary {
                monthly_recurring_revenue: 139.0,
                yearly_recurring_revenue: 1668.0,
                total_volume: 7800.0,
            }),
            plans: Some(vec![plan("Basic", 10, 2), plan("Pro", 5, 3)]),
            trial_users: Some(4),
            indicators: Some(PerformanceIndicators {
                indicators: daily_series(40),
                last_month: Some(snapshot(100.0, 1200.0)),
                last_year: Some(snapshot(50.0, 600.0)),
            }),
            calls: Arc::new(CallCounts::default()),
        }
    }

    fn fail(endpoint: &str) -> KioskError {
        KioskError::NotFound(format!("stub {} unavailable", endpoint))
    }
}

impl MetricsSource for StubSource {
    fn revenue(&self) -> Result<RevenueSummary> {
        self.calls.revenue.fetch_add(1, Ordering::SeqCst);
        self.revenue.ok_or_else(|| Self::fail("revenue"))
    }

    fn plans(&self) -> Result<Vec<Plan>> {
        self.calls.plans.fetch_add(1, Ordering::SeqCst);
        self.plans.clone().ok_or_else(|| Self::fail("plans"))
    }

    fn trial_users(&self) -> Result<u64> {
        self.calls.trial_users.fetch_add(1, Ordering::SeqCst);
        self.trial_users.ok_or_else(|| Self::fail("trialing"))
    }

    fn performance_indicators(&self) -> Result<PerformanceIndicators> {
        self.calls.indicators.fetch_add(1, Ordering::SeqCst);
        self.indicators.clone().ok_or_else(|| Self::fail("indicators"))
    }
}

// ---------------------------------------------------------------------------
// RecordingSurface
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub draws: Vec<(ChartId, ChartPayload)>,
}

impl RecordingSurface {
    pub fn ids(&self) -> Vec<ChartId> {
        self.draws.iter().map(|(id, _)| *id).collect()
    }
}

impl ChartSurface for RecordingSurface {
    fn draw(&mut self, id: ChartId, payload: &ChartPayload) {
        self.draws.push((id, payload.clone()));
    }
}
