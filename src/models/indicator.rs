use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::de;

// ---------------------------------------------------------------------------
// IndicatorRecord - One calendar day of aggregate business metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IndicatorRecord {
    #[serde(deserialize_with = "de::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default, deserialize_with = "de::amount")]
    pub monthly_recurring_revenue: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub yearly_recurring_revenue: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub daily_volume: f64,
    #[serde(default, deserialize_with = "de::count")]
    pub new_users: u64,
}

// ---------------------------------------------------------------------------
// PeriodSnapshot - Comparison baseline ("last month", "last year")
// ---------------------------------------------------------------------------

/// A single indicator-shaped row used as a comparison baseline.
///
/// Unlike [`IndicatorRecord`], the timestamp is optional: a baseline is only
/// ever read for its revenue figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PeriodSnapshot {
    #[serde(default, deserialize_with = "de::optional_timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "de::amount")]
    pub monthly_recurring_revenue: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub yearly_recurring_revenue: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub daily_volume: f64,
    #[serde(default, deserialize_with = "de::count")]
    pub new_users: u64,
}

impl From<&IndicatorRecord> for PeriodSnapshot {
    fn from(record: &IndicatorRecord) -> Self {
        Self {
            created_at: Some(record.created_at),
            monthly_recurring_revenue: record.monthly_recurring_revenue,
            yearly_recurring_revenue: record.yearly_recurring_revenue,
            daily_volume: record.daily_volume,
            new_users: record.new_users,
        }
    }
}

// ---------------------------------------------------------------------------
// PerformanceIndicators - Response of the indicator series endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceIndicators {
    #[serde(default)]
    pub indicators: Vec<IndicatorRecord>,
    #[serde(default)]
    pub last_month: Option<PeriodSnapshot>,
    #[serde(default)]
    pub last_year: Option<PeriodSnapshot>,
}
