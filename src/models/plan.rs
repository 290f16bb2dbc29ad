use serde::{Deserialize, Serialize};

use super::de;

/// A subscription plan as listed by the kiosk, with its subscriber counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    pub id: Option<String>,
    pub name: String,
    #[serde(deserialize_with = "de::amount")]
    pub price: f64,
    pub interval: String,
    #[serde(rename = "count", deserialize_with = "de::count")]
    pub subscriber_count: u64,
    #[serde(
        rename = "trialing",
        alias = "trialingCount",
        deserialize_with = "de::count"
    )]
    pub trialing_count: u64,
}

/// Generic (plan-less) trial user count as returned by the trialing endpoint.
///
/// Accepts the same loose encodings as plan counts: `5`, `5.0` or `"5"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TrialUsers(#[serde(deserialize_with = "de::count")] pub u64);
