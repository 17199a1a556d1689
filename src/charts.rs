use crate::dashboard::ProjectSummary;
use crate::error::Result;
use crate::period::{month_buckets, DateRange};
use crate::records::RecordSource;
use crate::revenue::RevenueCalculator;
use chrono::{Datelike, Days, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fixed color palette, assigned cyclically to series entries.
pub const PALETTE: [&str; 8] = [
    "#2c3e50", "#3498db", "#2ecc71", "#f1c40f", "#e74c3c", "#9b59b6", "#1abc9c", "#e67e22",
];

/// Labels longer than this are truncated with an ellipsis.
pub const LABEL_MAX_LEN: usize = 20;

/// Parallel label/value/color sequences, ready for a bar, pie or line chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Month-abbreviation table for time-axis labels. The original deployment
/// was French; both tables are carried so the locale is a configuration
/// choice rather than a code change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MonthLocale {
    #[default]
    French,
    English,
}

const FRENCH_MONTHS: [&str; 12] = [
    "janv", "févr", "mars", "avr", "mai", "juin", "juil", "août", "sept", "oct", "nov", "déc",
];
const ENGLISH_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl MonthLocale {
    pub fn month_abbrev(&self, month: u32) -> &'static str {
        let index = month.saturating_sub(1).min(11) as usize;
        match self {
            MonthLocale::French => FRENCH_MONTHS[index],
            MonthLocale::English => ENGLISH_MONTHS[index],
        }
    }

    pub fn month_label(&self, date: NaiveDate) -> String {
        format!("{} {}", self.month_abbrev(date.month()), date.year())
    }
}

/// Transforms per-project aggregates into chart-ready series.
pub struct SeriesBuilder<'a> {
    source: &'a dyn RecordSource,
    locale: MonthLocale,
}

impl<'a> SeriesBuilder<'a> {
    pub fn new(source: &'a dyn RecordSource, locale: MonthLocale) -> Self {
        Self { source, locale }
    }

    /// Revenue-by-project bar series. Zero-revenue projects are omitted.
    pub fn revenue_series(&self, projects: &[ProjectSummary]) -> ChartSeries {
        let mut series = ChartSeries::default();
        for project in projects.iter().filter(|p| p.realized_revenue > 0.0) {
            let index = series.labels.len();
            series.labels.push(truncate_label(&project.name));
            series.values.push(project.realized_revenue);
            series.colors.push(PALETTE[index % PALETTE.len()].to_string());
        }
        series
    }

    /// Status-distribution pie series, grouped in first-occurrence order.
    /// With more distinct statuses than palette colors, the colors sequence
    /// is simply shorter than the labels sequence.
    pub fn status_series(&self, projects: &[ProjectSummary]) -> ChartSeries {
        let mut groups: Vec<(String, usize)> = Vec::new();
        for project in projects {
            match groups.iter_mut().find(|(label, _)| *label == project.status_label) {
                Some((_, count)) => *count += 1,
                None => groups.push((project.status_label.clone(), 1)),
            }
        }

        let mut series = ChartSeries::default();
        for (index, (label, count)) in groups.into_iter().enumerate() {
            series.labels.push(label);
            series.values.push(count as f64);
            if index < PALETTE.len() {
                series.colors.push(PALETTE[index].to_string());
            }
        }
        series
    }

    /// Month-bucketed portfolio revenue trend. Portfolio revenue is
    /// recomputed per bucket against the record source; nothing is cached.
    pub fn evolution_series(&self, range: &DateRange) -> Result<ChartSeries> {
        self.evolution_series_as_of(range, Utc::now().date_naive())
    }

    /// Same as [`evolution_series`](Self::evolution_series), with an explicit
    /// "today" for resolving unbounded ranges.
    pub fn evolution_series_as_of(
        &self,
        range: &DateRange,
        today: NaiveDate,
    ) -> Result<ChartSeries> {
        let (start, end) = resolve_evolution_bounds(range, today);
        let revenue = RevenueCalculator::new(self.source);

        let mut series = ChartSeries::default();
        for (index, (month_start, month_end)) in month_buckets(start, end).into_iter().enumerate()
        {
            let month_revenue =
                revenue.portfolio_revenue(&DateRange::bounded(month_start, month_end))?;
            series.labels.push(self.locale.month_label(month_start));
            series.values.push(month_revenue);
            series.colors.push(PALETTE[index % PALETTE.len()].to_string());
        }
        Ok(series)
    }
}

/// An unbounded side defaults so the trend always has a time axis: a missing
/// end becomes today, a missing start becomes one year before the end.
pub(crate) fn resolve_evolution_bounds(range: &DateRange, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = range.end.unwrap_or(today);
    let start = range
        .start
        .unwrap_or_else(|| end.checked_sub_days(Days::new(364)).unwrap_or(end));
    (start, end)
}

pub(crate) fn truncate_label(name: &str) -> String {
    if name.chars().count() > LABEL_MAX_LEN {
        let truncated: String = name.chars().take(LABEL_MAX_LEN).collect();
        format!("{}...", truncated)
    } else {
        name.to_string()
    }
}
