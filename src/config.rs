use std::collections::HashMap;
use std::time::Duration;

/// Path prefix under which the kiosk serves every performance-indicator endpoint.
pub const KIOSK_PREFIX: &str = "/spark/kiosk/performance-indicators";

pub const DEFAULT_BASE_URL: &str = "http://localhost";
pub const DEFAULT_TAB: &str = "metrics";
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trailing window for the recurring-revenue charts.
pub const REVENUE_WINDOW_DAYS: usize = 30;
/// Trailing window for the daily volume and new-user charts.
pub const ACTIVITY_WINDOW_DAYS: usize = 14;

pub fn endpoints() -> HashMap<&'static str, String> {
    HashMap::from([
        ("revenue", format!("{KIOSK_PREFIX}/revenue")),
        ("plans", format!("{KIOSK_PREFIX}/plans")),
        ("trialing", format!("{KIOSK_PREFIX}/trialing")),
        ("indicators", KIOSK_PREFIX.to_string()),
    ])
}

pub fn snapshot_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("revenue", "revenue.json"),
        ("plans", "plans.json"),
        ("trialing", "trialing.json"),
        ("indicators", "performance-indicators.json"),
    ])
}
