use crate::budget::{BudgetComparator, BudgetSummary};
use crate::charts::{ChartSeries, MonthLocale, SeriesBuilder};
use crate::cost::{CostCalculator, EstimationConfig};
use crate::error::Result;
use crate::margin::{
    compute_margin, AdministrativeMargin, MarginBreakdown, MarginCalculator,
};
use crate::period::DateRange;
use crate::records::{RecordReader, RecordSource};
use crate::revenue::RevenueCalculator;
use crate::schema::Project;
use crate::staffing::StaffingCalculator;
use log::{error, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Per-project financial and staffing figures. Built fresh on every call and
/// never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
    pub realized_revenue: f64,
    pub headcount: usize,
    pub hours_worked: f64,
    pub status_label: String,
    pub planned_budget: f64,
    pub consumed_budget: f64,
    pub budget_variance_pct: f64,
    pub margin: Option<MarginBreakdown>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartData {
    pub revenue_series: ChartSeries,
    pub status_series: ChartSeries,
    pub evolution_series: ChartSeries,
}

/// The consolidated dashboard result. Always fully shaped: a failing section
/// keeps its zero/empty default instead of leaving a hole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DashboardSnapshot {
    pub total_revenue: f64,
    pub projects: Vec<ProjectSummary>,
    pub administrative_margin: AdministrativeMargin,
    pub budget_summary: BudgetSummary,
    pub chart_data: ChartData,
}

impl DashboardSnapshot {
    /// JSON Schema of the snapshot shape, for presentation-layer consumers.
    pub fn schema_as_json() -> Result<String> {
        let schema = schemars::schema_for!(DashboardSnapshot);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub estimation: EstimationConfig,
    pub locale: MonthLocale,
}

/// Root aggregator: orchestrates every calculator over one date range.
///
/// Each section is fault-isolated — the snapshot must render with partial
/// data rather than surface an error to stakeholders who cannot act on one.
/// No entry point on this type ever returns an error.
pub struct DashboardEngine<'a> {
    source: &'a dyn RecordSource,
    config: EngineConfig,
}

impl<'a> DashboardEngine<'a> {
    pub fn new(source: &'a dyn RecordSource) -> Self {
        Self::with_config(source, EngineConfig::default())
    }

    pub fn with_config(source: &'a dyn RecordSource, config: EngineConfig) -> Self {
        Self { source, config }
    }

    /// Computes the full dashboard for `range`. Sections are computed
    /// independently and in a fixed order; a failing section is logged and
    /// left at its default.
    pub fn build_snapshot(&self, range: &DateRange) -> DashboardSnapshot {
        info!(
            "building dashboard snapshot for {} .. {}",
            range.start.map(|d| d.to_string()).unwrap_or_else(|| "*".into()),
            range.end.map(|d| d.to_string()).unwrap_or_else(|| "*".into()),
        );

        let mut snapshot = DashboardSnapshot::default();

        match RevenueCalculator::new(self.source).portfolio_revenue(range) {
            Ok(total) => snapshot.total_revenue = total,
            Err(e) => error!("portfolio revenue section failed: {}", e),
        }

        match self.project_summaries(range) {
            Ok(projects) => snapshot.projects = projects,
            Err(e) => error!("project summaries section failed: {}", e),
        }

        match MarginCalculator::new(self.source, self.config.estimation.clone())
            .administrative_margin(range)
        {
            Ok(margin) => snapshot.administrative_margin = margin,
            Err(e) => error!("administrative margin section failed: {}", e),
        }

        match BudgetComparator::new(self.source).budget_summary(range) {
            Ok(summary) => snapshot.budget_summary = summary,
            Err(e) => error!("budget summary section failed: {}", e),
        }

        snapshot.chart_data = self.chart_series(range);

        snapshot
    }

    /// Margin for one project; fail-soft to the zero breakdown.
    pub fn project_margin(&self, project_id: i64, range: &DateRange) -> MarginBreakdown {
        MarginCalculator::new(self.source, self.config.estimation.clone())
            .project_margin(project_id, range)
    }

    /// Budget summary alone; fail-soft to the empty summary.
    pub fn budget_summary(&self, range: &DateRange) -> BudgetSummary {
        match BudgetComparator::new(self.source).budget_summary(range) {
            Ok(summary) => summary,
            Err(e) => {
                error!("budget summary failed: {}", e);
                BudgetSummary::default()
            }
        }
    }

    /// All three chart series; each degrades to empty independently.
    pub fn chart_series(&self, range: &DateRange) -> ChartData {
        let projects = match self.project_summaries(range) {
            Ok(projects) => projects,
            Err(e) => {
                error!("chart project data failed: {}", e);
                Vec::new()
            }
        };

        let builder = SeriesBuilder::new(self.source, self.config.locale);
        let evolution_series = match builder.evolution_series(range) {
            Ok(series) => series,
            Err(e) => {
                error!("revenue evolution series failed: {}", e);
                ChartSeries::default()
            }
        };

        ChartData {
            revenue_series: builder.revenue_series(&projects),
            status_series: builder.status_series(&projects),
            evolution_series,
        }
    }

    fn project_summaries(&self, range: &DateRange) -> Result<Vec<ProjectSummary>> {
        let projects = RecordReader::new(self.source).active_projects()?;

        let mut summaries = Vec::with_capacity(projects.len());
        for project in &projects {
            match self.summarize_project(project, range) {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    // one broken project must not take the whole list down
                    error!("summary failed for project {}: {}", project.id, e);
                    summaries.push(ProjectSummary {
                        id: project.id,
                        name: project.name.clone(),
                        status_label: project.status.clone(),
                        ..ProjectSummary::default()
                    });
                }
            }
        }
        Ok(summaries)
    }

    fn summarize_project(&self, project: &Project, range: &DateRange) -> Result<ProjectSummary> {
        let revenue = RevenueCalculator::new(self.source).project_revenue(project, range)?;
        let staffing = StaffingCalculator::new(self.source);
        let headcount = staffing.headcount(project.id)?;
        let hours_worked = staffing.hours(project.id, range)?;
        let cost = CostCalculator::new(self.source, self.config.estimation.clone())
            .staffing_cost(project.id, range)?;

        // budget consumption is tracked as realized revenue, by product policy
        let consumed_budget = revenue;
        let budget_variance_pct = if project.planned_budget > 0.0 {
            (consumed_budget / project.planned_budget - 1.0) * 100.0
        } else {
            0.0
        };

        Ok(ProjectSummary {
            id: project.id,
            name: project.name.clone(),
            realized_revenue: revenue,
            headcount,
            hours_worked,
            status_label: project.status.clone(),
            planned_budget: project.planned_budget,
            consumed_budget,
            budget_variance_pct,
            margin: Some(compute_margin(revenue, cost)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MemoryRecords;
    use crate::schema::{CostEntry, Invoice, InvoiceKind, InvoiceLine, InvoiceState};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fixture() -> MemoryRecords {
        MemoryRecords {
            projects: vec![
                Project {
                    id: 1,
                    name: "Alpha".to_string(),
                    status: "open".to_string(),
                    active: true,
                    planned_budget: 2000.0,
                    analytic_id: Some(7),
                    date_start: None,
                    date_end: None,
                },
                Project {
                    id: 2,
                    name: "Beta".to_string(),
                    status: "done".to_string(),
                    active: true,
                    planned_budget: 0.0,
                    analytic_id: Some(8),
                    date_start: None,
                    date_end: None,
                },
            ],
            invoices: vec![Invoice {
                id: 1,
                state: InvoiceState::Posted,
                kind: InvoiceKind::CustomerInvoice,
                date: d(2024, 2, 15),
                total_signed: 1500.0,
            }],
            invoice_lines: vec![InvoiceLine {
                id: 10,
                invoice_id: 1,
                subtotal: 1500.0,
                analytic_ids: vec![7],
            }],
            cost_entries: vec![CostEntry {
                id: 1,
                project_id: Some(1),
                date: d(2024, 2, 20),
                hours: 16.0,
                amount: Some(-800.0),
                employee_id: Some(42),
                hourly_cost: None,
            }],
            ..MemoryRecords::default()
        }
    }

    #[test]
    fn test_snapshot_from_fixture() {
        let store = fixture();
        let engine = DashboardEngine::new(&store);
        let range = DateRange::bounded(d(2024, 1, 1), d(2024, 12, 31));
        let snapshot = engine.build_snapshot(&range);

        assert_eq!(snapshot.total_revenue, 1500.0);
        assert_eq!(snapshot.projects.len(), 2);

        let alpha = &snapshot.projects[0];
        assert_eq!(alpha.realized_revenue, 1500.0);
        assert_eq!(alpha.headcount, 1);
        assert_eq!(alpha.hours_worked, 16.0);
        assert_eq!(alpha.consumed_budget, 1500.0);
        assert!((alpha.budget_variance_pct - -25.0).abs() < 1e-9);
        let margin = alpha.margin.unwrap();
        assert_eq!(margin.margin, 700.0);

        // admin cost falls back to 15% of revenue
        assert!((snapshot.administrative_margin.admin_cost - 225.0).abs() < 1e-9);
        assert_eq!(snapshot.budget_summary.per_project.len(), 1);
        assert_eq!(snapshot.chart_data.revenue_series.labels, vec!["Alpha"]);
        assert_eq!(
            snapshot.chart_data.status_series.labels,
            vec!["open", "done"]
        );
    }

    #[test]
    fn test_snapshot_on_empty_source_is_fully_shaped() {
        let store = MemoryRecords::default();
        let engine = DashboardEngine::new(&store);
        let snapshot = engine.build_snapshot(&DateRange::unbounded());

        assert_eq!(snapshot.total_revenue, 0.0);
        assert!(snapshot.projects.is_empty());
        assert_eq!(snapshot.administrative_margin, AdministrativeMargin::default());
        assert_eq!(snapshot.budget_summary, BudgetSummary::default());
        assert!(snapshot.chart_data.revenue_series.is_empty());
        assert!(snapshot.chart_data.status_series.is_empty());
        // evolution still has one bucket per trailing month, all zero
        assert!(snapshot.chart_data.evolution_series.values.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let store = fixture();
        let engine = DashboardEngine::new(&store);
        let range = DateRange::bounded(d(2024, 1, 1), d(2024, 12, 31));
        assert_eq!(engine.build_snapshot(&range), engine.build_snapshot(&range));
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let store = fixture();
        let engine = DashboardEngine::new(&store);
        let snapshot = engine.build_snapshot(&DateRange::unbounded());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("total_revenue"));
        assert!(json.contains("administrative_margin"));
    }

    #[test]
    fn test_schema_export_mentions_sections() {
        let schema = DashboardSnapshot::schema_as_json().unwrap();
        assert!(schema.contains("total_revenue"));
        assert!(schema.contains("budget_summary"));
        assert!(schema.contains("chart_data"));
    }
}
