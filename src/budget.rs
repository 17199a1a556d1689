use crate::error::Result;
use crate::period::DateRange;
use crate::records::{RecordReader, RecordSource};
use crate::revenue::RevenueCalculator;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Planned-versus-consumed budget figures for one project.
///
/// "Consumed" is realized revenue, not cost: the comparator tracks how much
/// of the declared budget the project has already billed. Flagged for product
/// clarification; kept until the product owners decide otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectBudget {
    pub project_id: i64,
    pub name: String,
    pub planned: f64,
    pub consumed: f64,
    /// Zero-floored: an overshoot never reports negative remaining budget.
    pub remaining: f64,
    pub utilization_pct: f64,
    /// Percentage difference between consumed and planned; zero when no
    /// budget is planned.
    pub variance_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BudgetSummary {
    pub total_planned: f64,
    pub total_consumed: f64,
    pub remaining: f64,
    pub utilization_pct: f64,
    pub per_project: Vec<ProjectBudget>,
}

pub struct BudgetComparator<'a> {
    source: &'a dyn RecordSource,
}

impl<'a> BudgetComparator<'a> {
    pub fn new(source: &'a dyn RecordSource) -> Self {
        Self { source }
    }

    /// Budget consumption across all projects with a positive declared
    /// budget whose own date window intersects `range`.
    pub fn budget_summary(&self, range: &DateRange) -> Result<BudgetSummary> {
        let projects = RecordReader::new(self.source).active_projects()?;
        let revenue = RevenueCalculator::new(self.source);

        let mut per_project = Vec::new();
        for project in projects
            .iter()
            .filter(|p| p.planned_budget > 0.0)
            .filter(|p| range.intersects_window(p.date_start, p.date_end))
        {
            let consumed = revenue.project_revenue(project, range)?;
            per_project.push(ProjectBudget {
                project_id: project.id,
                name: project.name.clone(),
                planned: project.planned_budget,
                consumed,
                remaining: (project.planned_budget - consumed).max(0.0),
                utilization_pct: percentage(consumed, project.planned_budget),
                variance_pct: variance(consumed, project.planned_budget),
            });
        }

        let total_planned: f64 = per_project.iter().map(|p| p.planned).sum();
        let total_consumed: f64 = per_project.iter().map(|p| p.consumed).sum();
        debug!(
            "budget summary over {} projects: planned {:.2}, consumed {:.2}",
            per_project.len(),
            total_planned,
            total_consumed
        );

        Ok(BudgetSummary {
            total_planned,
            total_consumed,
            remaining: (total_planned - total_consumed).max(0.0),
            utilization_pct: percentage(total_consumed, total_planned),
            per_project,
        })
    }
}

fn percentage(consumed: f64, planned: f64) -> f64 {
    if planned > 0.0 {
        consumed / planned * 100.0
    } else {
        0.0
    }
}

fn variance(consumed: f64, planned: f64) -> f64 {
    if planned > 0.0 {
        (consumed / planned - 1.0) * 100.0
    } else {
        0.0
    }
}
