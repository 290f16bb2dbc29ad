//! Chart-ready datasets built from the daily indicator series.
//!
//! Payloads follow the `{labels, datasets, options}` shape line-chart
//! renderers consume. Plotted values are always raw numbers; an optional
//! [`ScaleLabelFormatter`] only changes axis text.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::config;
use crate::format::{format_currency, format_plain};
use crate::models::IndicatorRecord;
use crate::stats::chart_date;

// ---------------------------------------------------------------------------
// ChartId / IndicatorField / ChartSpec
// ---------------------------------------------------------------------------

/// The four charts drawn on the metrics tab, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartId {
    MonthlyRecurringRevenue,
    YearlyRecurringRevenue,
    DailyVolume,
    NewUsers,
}

impl ChartId {
    pub const ALL: [ChartId; 4] = [
        ChartId::MonthlyRecurringRevenue,
        ChartId::YearlyRecurringRevenue,
        ChartId::DailyVolume,
        ChartId::NewUsers,
    ];

    /// Element id the rendering surface draws into.
    pub fn as_str(self) -> &'static str {
        match self {
            ChartId::MonthlyRecurringRevenue => "monthlyRecurringRevenueChart",
            ChartId::YearlyRecurringRevenue => "yearlyRecurringRevenueChart",
            ChartId::DailyVolume => "dailyVolumeChart",
            ChartId::NewUsers => "newUsersChart",
        }
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ChartId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Which column of an [`IndicatorRecord`] a chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorField {
    MonthlyRecurringRevenue,
    YearlyRecurringRevenue,
    DailyVolume,
    NewUsers,
}

impl IndicatorField {
    pub fn extract(self, record: &IndicatorRecord) -> f64 {
        match self {
            IndicatorField::MonthlyRecurringRevenue => record.monthly_recurring_revenue,
            IndicatorField::YearlyRecurringRevenue => record.yearly_recurring_revenue,
            IndicatorField::DailyVolume => record.daily_volume,
            IndicatorField::NewUsers => record.new_users as f64,
        }
    }
}

/// Window, plotted field and axis formatting for one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub id: ChartId,
    pub days: usize,
    pub field: IndicatorField,
    pub currency_axis: bool,
}

impl ChartSpec {
    pub fn for_chart(id: ChartId) -> Self {
        match id {
            ChartId::MonthlyRecurringRevenue => Self {
                id,
                days: config::REVENUE_WINDOW_DAYS,
                field: IndicatorField::MonthlyRecurringRevenue,
                currency_axis: true,
            },
            ChartId::YearlyRecurringRevenue => Self {
                id,
                days: config::REVENUE_WINDOW_DAYS,
                field: IndicatorField::YearlyRecurringRevenue,
                currency_axis: true,
            },
            ChartId::DailyVolume => Self {
                id,
                days: config::ACTIVITY_WINDOW_DAYS,
                field: IndicatorField::DailyVolume,
                currency_axis: true,
            },
            ChartId::NewUsers => Self {
                id,
                days: config::ACTIVITY_WINDOW_DAYS,
                field: IndicatorField::NewUsers,
                currency_axis: false,
            },
        }
    }

    pub fn all() -> [ChartSpec; 4] {
        ChartId::ALL.map(Self::for_chart)
    }
}

// ---------------------------------------------------------------------------
// ScaleLabelFormatter
// ---------------------------------------------------------------------------

/// Axis-label formatter handed to the renderer alongside the payload.
#[derive(Clone)]
pub struct ScaleLabelFormatter(Arc<dyn Fn(f64) -> String + Send + Sync>);

impl ScaleLabelFormatter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Currency axis using [`format_currency`].
    pub fn currency(symbol: &str) -> Self {
        let symbol = symbol.to_string();
        Self::new(move |value| format_currency(value, &symbol))
    }

    pub fn format(&self, value: f64) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for ScaleLabelFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScaleLabelFormatter(..)")
    }
}

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub responsive: bool,
    pub scale_label: Option<ScaleLabelFormatter>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            responsive: true,
            scale_label: None,
        }
    }
}

impl ChartOptions {
    /// Axis text for `value`: the formatter's output if one is set, the plain
    /// number otherwise.
    pub fn scale_label(&self, value: f64) -> String {
        match &self.scale_label {
            Some(formatter) => formatter.format(value),
            None => format_plain(value),
        }
    }

    pub fn has_scale_formatter(&self) -> bool {
        self.scale_label.is_some()
    }
}

impl Serialize for ChartOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ChartOptions", 2)?;
        state.serialize_field("responsive", &self.responsive)?;
        state.serialize_field("formattedScale", &self.has_scale_formatter())?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub fill_color: String,
    pub stroke_color: String,
    pub point_color: String,
    pub point_stroke_color: String,
    pub point_highlight_fill: String,
    pub point_highlight_stroke: String,
    pub data: Vec<f64>,
}

impl Dataset {
    /// The kiosk's single line style carrying `data`.
    pub fn base(data: Vec<f64>) -> Self {
        Self {
            label: "Dataset".to_string(),
            fill_color: "rgba(151,187,205,0.2)".to_string(),
            stroke_color: "rgba(151,187,205,1)".to_string(),
            point_color: "rgba(151,187,205,1)".to_string(),
            point_stroke_color: "#fff".to_string(),
            point_highlight_fill: "#fff".to_string(),
            point_highlight_stroke: "rgba(151,187,205,1)".to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartPayload {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
}

impl ChartPayload {
    /// Values of the first (and on the kiosk, only) dataset.
    pub fn data(&self) -> &[f64] {
        self.datasets.first().map(|d| d.data.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// The last `min(n, items.len())` elements of `items`, oldest first.
pub fn trailing<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Build a single-dataset chart over the trailing `days` records.
///
/// Labels and data come from the same window, so they always have equal
/// length and matching order. An empty or short series yields a shorter
/// (possibly empty) chart.
pub fn build_chart<F>(
    indicators: &[IndicatorRecord],
    days: usize,
    extract: F,
    scale_label: Option<ScaleLabelFormatter>,
) -> ChartPayload
where
    F: Fn(&IndicatorRecord) -> f64,
{
    let window = trailing(indicators, days);
    let labels = window.iter().map(chart_date).collect();
    let data = window.iter().map(extract).collect();

    ChartPayload {
        labels,
        datasets: vec![Dataset::base(data)],
        options: ChartOptions {
            responsive: true,
            scale_label,
        },
    }
}

/// Build the chart described by `spec`, formatting currency axes with
/// `currency_symbol`.
pub fn build_spec_chart(
    indicators: &[IndicatorRecord],
    spec: &ChartSpec,
    currency_symbol: &str,
) -> ChartPayload {
    let formatter = spec
        .currency_axis
        .then(|| ScaleLabelFormatter::currency(currency_symbol));
    let field = spec.field;
    build_chart(indicators, spec.days, |r| field.extract(r), formatter)
}

// ---------------------------------------------------------------------------
// ChartSurface
// ---------------------------------------------------------------------------

/// Rendering collaborator that receives one draw call per chart.
pub trait ChartSurface {
    fn draw(&mut self, id: ChartId, payload: &ChartPayload);
}

impl ChartSurface for BTreeMap<ChartId, ChartPayload> {
    fn draw(&mut self, id: ChartId, payload: &ChartPayload) {
        self.insert(id, payload.clone());
    }
}
