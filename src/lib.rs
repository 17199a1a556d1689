//! # Portfolio Metrics
//!
//! Financial and staffing metrics for a portfolio of projects over an
//! arbitrary date range: realized revenue, payroll cost, margin, budget
//! variance and the chart series a dashboard renders from them.
//!
//! ## Core Concepts
//!
//! - **Record source**: a read-only snapshot of business records (invoices,
//!   invoice lines, sales orders, timesheet cost entries, ledger lines,
//!   projects) behind the [`RecordSource`] trait, with an explicit
//!   [`Capabilities`] descriptor for partial deployments.
//! - **Strategy chains**: preferred data sources with ordered fallbacks —
//!   revenue comes from posted invoices first, confirmed sales orders next,
//!   billable timesheet entries last.
//! - **Fail-soft aggregation**: [`DashboardEngine::build_snapshot`] always
//!   returns a fully shaped [`DashboardSnapshot`]; a failing section keeps
//!   its zero/empty default and is logged, never propagated.
//!
//! Everything is recomputed per call from the current record snapshot; no
//! state is kept between requests.
//!
//! ## Example
//!
//! ```rust
//! use portfolio_metrics::{generate_sample_records, DashboardEngine, DateRange};
//!
//! let records = generate_sample_records(5, 2024, 42);
//! let engine = DashboardEngine::new(&records);
//!
//! let range = DateRange::parse(Some("2024-01-01"), Some("2024-12-31"));
//! let snapshot = engine.build_snapshot(&range);
//!
//! assert_eq!(snapshot.projects.len(), 5);
//! assert!(snapshot.total_revenue > 0.0);
//! ```

pub mod budget;
pub mod charts;
pub mod cost;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod margin;
pub mod period;
pub mod records;
pub mod revenue;
pub mod sample;
pub mod schema;
pub mod staffing;

pub use budget::{BudgetComparator, BudgetSummary, ProjectBudget};
pub use charts::{ChartSeries, MonthLocale, SeriesBuilder, LABEL_MAX_LEN, PALETTE};
pub use cost::{CostCalculator, EstimationConfig};
pub use dashboard::{
    ChartData, DashboardEngine, DashboardSnapshot, EngineConfig, ProjectSummary,
};
pub use error::{MetricsError, Result};
pub use export::{snapshot_to_csv, snapshot_to_json, ExportMetadata, EXPORT_FORMAT_VERSION};
pub use margin::{
    compute_margin, AdministrativeMargin, MarginBreakdown, MarginCalculator,
};
pub use period::DateRange;
pub use records::{
    DataAvailability, FamilyAvailability, MemoryRecords, RecordReader, RecordSource,
    PROJECT_SCAN_CAP,
};
pub use revenue::RevenueCalculator;
pub use sample::generate_sample_records;
pub use schema::*;
pub use staffing::StaffingCalculator;

/// One-shot snapshot computation with the default engine configuration.
pub fn build_snapshot(source: &dyn RecordSource, range: &DateRange) -> DashboardSnapshot {
    DashboardEngine::new(source).build_snapshot(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_snapshot_facade() {
        let records = generate_sample_records(2, 2024, 3);
        let snapshot = build_snapshot(&records, &DateRange::parse(Some("2024-01-01"), None));
        assert_eq!(snapshot.projects.len(), 2);
        assert!(snapshot.total_revenue > 0.0);
    }
}
