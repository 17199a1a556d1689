use crate::cost::{CostCalculator, EstimationConfig};
use crate::error::Result;
use crate::period::DateRange;
use crate::records::{RecordReader, RecordSource};
use crate::revenue::RevenueCalculator;
use log::{debug, error, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Revenue, cost and derived margin for one scope (a project or the
/// administrative aggregate).
///
/// Invariants: `margin` is exactly `revenue - cost`, negative margins
/// included; `margin_rate_pct` is a defined zero (never NaN or an error)
/// whenever revenue is not strictly positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarginBreakdown {
    pub revenue: f64,
    pub cost: f64,
    pub margin: f64,
    pub margin_rate_pct: f64,
}

/// Portfolio-wide margin after administrative/overhead cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AdministrativeMargin {
    pub total_revenue: f64,
    pub admin_cost: f64,
    pub admin_margin: f64,
    pub admin_margin_rate_pct: f64,
}

/// Pure, total margin computation.
pub fn compute_margin(revenue: f64, cost: f64) -> MarginBreakdown {
    let margin = revenue - cost;
    let margin_rate_pct = if revenue > 0.0 {
        round2(margin / revenue * 100.0)
    } else {
        0.0
    };
    MarginBreakdown {
        revenue,
        cost,
        margin,
        margin_rate_pct,
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct MarginCalculator<'a> {
    source: &'a dyn RecordSource,
    config: EstimationConfig,
}

impl<'a> MarginCalculator<'a> {
    pub fn new(source: &'a dyn RecordSource, config: EstimationConfig) -> Self {
        Self { source, config }
    }

    /// Margin for one project. Fails soft: a non-positive id, an unknown
    /// project or any internal failure resolves to the zero breakdown.
    pub fn project_margin(&self, project_id: i64, range: &DateRange) -> MarginBreakdown {
        match self.try_project_margin(project_id, range) {
            Ok(breakdown) => breakdown,
            Err(e) => {
                error!("margin computation failed for project {}: {}", project_id, e);
                MarginBreakdown::default()
            }
        }
    }

    fn try_project_margin(&self, project_id: i64, range: &DateRange) -> Result<MarginBreakdown> {
        if project_id <= 0 {
            warn!("margin requested for invalid project id {}", project_id);
            return Ok(MarginBreakdown::default());
        }
        let Some(project) = RecordReader::new(self.source).project_by_id(project_id)? else {
            warn!("margin requested for unknown project {}", project_id);
            return Ok(MarginBreakdown::default());
        };

        let revenue = RevenueCalculator::new(self.source).project_revenue(&project, range)?;
        let cost = CostCalculator::new(self.source, self.config.clone())
            .staffing_cost(project.id, range)?;
        let breakdown = compute_margin(revenue, cost);
        debug!(
            "project {} margin: revenue {:.2}, cost {:.2}, rate {:.2}%",
            project_id, breakdown.revenue, breakdown.cost, breakdown.margin_rate_pct
        );
        Ok(breakdown)
    }

    /// Portfolio revenue against administrative cost.
    pub fn administrative_margin(&self, range: &DateRange) -> Result<AdministrativeMargin> {
        let revenue = RevenueCalculator::new(self.source).portfolio_revenue(range)?;
        let cost = CostCalculator::new(self.source, self.config.clone()).administrative_cost(range)?;
        let breakdown = compute_margin(revenue, cost);
        Ok(AdministrativeMargin {
            total_revenue: breakdown.revenue,
            admin_cost: breakdown.cost,
            admin_margin: breakdown.margin,
            admin_margin_rate_pct: breakdown.margin_rate_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MemoryRecords;
    use crate::schema::{CostEntry, Invoice, InvoiceKind, InvoiceLine, InvoiceState, Project};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_compute_margin_identity() {
        for (revenue, cost) in [(0.0, 0.0), (100.0, 40.0), (50.0, 120.0), (-20.0, 10.0)] {
            let m = compute_margin(revenue, cost);
            assert_eq!(m.margin, revenue - cost);
        }
    }

    #[test]
    fn test_margin_rate_zero_when_revenue_not_positive() {
        let m = compute_margin(0.0, 500.0);
        assert_eq!(m.margin, -500.0);
        assert_eq!(m.margin_rate_pct, 0.0);

        let m = compute_margin(-100.0, 50.0);
        assert_eq!(m.margin_rate_pct, 0.0);
    }

    #[test]
    fn test_margin_rate_rounded_to_two_decimals() {
        let m = compute_margin(300.0, 100.0);
        assert_eq!(m.margin_rate_pct, 66.67);
    }

    #[test]
    fn test_project_margin_fails_soft_for_bad_ids() {
        let store = MemoryRecords::default();
        let calc = MarginCalculator::new(&store, EstimationConfig::default());

        assert_eq!(
            calc.project_margin(0, &DateRange::unbounded()),
            MarginBreakdown::default()
        );
        assert_eq!(
            calc.project_margin(-5, &DateRange::unbounded()),
            MarginBreakdown::default()
        );
        assert_eq!(
            calc.project_margin(42, &DateRange::unbounded()),
            MarginBreakdown::default()
        );
    }

    #[test]
    fn test_project_margin_combines_revenue_and_staffing_cost() {
        let store = MemoryRecords {
            projects: vec![Project {
                id: 1,
                name: "Alpha".to_string(),
                status: "open".to_string(),
                active: true,
                planned_budget: 0.0,
                analytic_id: Some(7),
                date_start: None,
                date_end: None,
            }],
            invoices: vec![Invoice {
                id: 1,
                state: InvoiceState::Posted,
                kind: InvoiceKind::CustomerInvoice,
                date: d(2024, 2, 1),
                total_signed: 1000.0,
            }],
            invoice_lines: vec![InvoiceLine {
                id: 10,
                invoice_id: 1,
                subtotal: 1000.0,
                analytic_ids: vec![7],
            }],
            cost_entries: vec![CostEntry {
                id: 1,
                project_id: Some(1),
                date: d(2024, 2, 10),
                hours: 8.0,
                amount: Some(-400.0),
                employee_id: Some(1),
                hourly_cost: None,
            }],
            ..MemoryRecords::default()
        };

        let calc = MarginCalculator::new(&store, EstimationConfig::default());
        let m = calc.project_margin(1, &DateRange::unbounded());
        assert_eq!(m.revenue, 1000.0);
        assert_eq!(m.cost, 400.0);
        assert_eq!(m.margin, 600.0);
        assert_eq!(m.margin_rate_pct, 60.0);
    }

    #[test]
    fn test_administrative_margin_on_empty_source() {
        let store = MemoryRecords::default();
        let calc = MarginCalculator::new(&store, EstimationConfig::default());
        let m = calc.administrative_margin(&DateRange::unbounded()).unwrap();
        assert_eq!(m, AdministrativeMargin::default());
    }
}
