use serde::{Deserialize, Serialize};

use super::de;

/// Point-in-time revenue totals, independent of the daily indicator series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    #[serde(default, deserialize_with = "de::amount")]
    pub monthly_recurring_revenue: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub yearly_recurring_revenue: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub total_volume: f64,
}
