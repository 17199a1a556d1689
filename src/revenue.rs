use crate::error::Result;
use crate::period::DateRange;
use crate::records::{RecordReader, RecordSource};
use crate::schema::Project;
use log::debug;

/// Realized revenue, resolved through an ordered fallback chain.
///
/// Posted customer invoices are the preferred source; confirmed sales orders
/// and revenue-side timesheet entries are fallbacks for deployments where
/// invoicing data is absent or empty. The first strategy producing a non-zero
/// figure wins. No qualifying data anywhere is a valid "no revenue" answer,
/// never an error.
pub struct RevenueCalculator<'a> {
    source: &'a dyn RecordSource,
}

type PortfolioStrategy<'a> =
    fn(&RevenueCalculator<'a>, &DateRange) -> Result<Option<f64>>;
type ProjectStrategy<'a> =
    fn(&RevenueCalculator<'a>, &Project, &DateRange) -> Result<Option<f64>>;

impl<'a> RevenueCalculator<'a> {
    pub fn new(source: &'a dyn RecordSource) -> Self {
        Self { source }
    }

    fn reader(&self) -> RecordReader<'a> {
        RecordReader::new(self.source)
    }

    /// Portfolio-wide realized revenue over `range`.
    pub fn portfolio_revenue(&self, range: &DateRange) -> Result<f64> {
        let strategies: [(&str, PortfolioStrategy<'a>); 3] = [
            ("invoices", Self::portfolio_via_invoices),
            ("sales_orders", Self::portfolio_via_sales_orders),
            ("timesheet_revenue", Self::portfolio_via_timesheets),
        ];

        for (name, strategy) in strategies {
            if let Some(total) = strategy(self, range)? {
                if total != 0.0 {
                    debug!("portfolio revenue {:.2} via {} strategy", total, name);
                    return Ok(total);
                }
            }
        }
        Ok(0.0)
    }

    /// Realized revenue attributed to one project over `range`.
    pub fn project_revenue(&self, project: &Project, range: &DateRange) -> Result<f64> {
        let strategies: [(&str, ProjectStrategy<'a>); 3] = [
            ("invoice_lines", Self::project_via_invoice_lines),
            ("sales_orders", Self::project_via_sales_orders),
            ("timesheet_revenue", Self::project_via_timesheets),
        ];

        for (name, strategy) in strategies {
            if let Some(total) = strategy(self, project, range)? {
                if total != 0.0 {
                    debug!(
                        "project {} revenue {:.2} via {} strategy",
                        project.id, total, name
                    );
                    return Ok(total);
                }
            }
        }
        Ok(0.0)
    }

    /// Sum of positive signed totals over posted customer invoices.
    /// Negative totals (credit notes mis-filed as invoices) never add to
    /// revenue.
    fn portfolio_via_invoices(&self, range: &DateRange) -> Result<Option<f64>> {
        let invoices = self.reader().posted_customer_invoices(range)?;
        if invoices.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            invoices
                .iter()
                .map(|inv| inv.total_signed)
                .filter(|total| *total > 0.0)
                .sum(),
        ))
    }

    fn portfolio_via_sales_orders(&self, range: &DateRange) -> Result<Option<f64>> {
        let orders = self.reader().confirmed_sales_orders(range, None)?;
        if orders.is_empty() {
            return Ok(None);
        }
        Ok(Some(orders.iter().map(|order| order.total).sum()))
    }

    /// Positive-amount cost entries represent billable revenue-side lines.
    fn portfolio_via_timesheets(&self, range: &DateRange) -> Result<Option<f64>> {
        let entries = self.reader().cost_entries(None, Some(range))?;
        if entries.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            entries
                .iter()
                .filter_map(|entry| entry.amount)
                .filter(|amount| *amount > 0.0)
                .sum(),
        ))
    }

    fn project_via_invoice_lines(
        &self,
        project: &Project,
        range: &DateRange,
    ) -> Result<Option<f64>> {
        let Some(analytic_id) = project.analytic_id else {
            return Ok(None);
        };
        let lines = self.reader().invoice_lines_for_analytic(analytic_id, range)?;
        if lines.is_empty() {
            return Ok(None);
        }
        Ok(Some(lines.iter().map(|line| line.subtotal).sum()))
    }

    fn project_via_sales_orders(
        &self,
        project: &Project,
        range: &DateRange,
    ) -> Result<Option<f64>> {
        let orders = self.reader().confirmed_sales_orders(range, Some(project))?;
        if orders.is_empty() {
            return Ok(None);
        }
        Ok(Some(orders.iter().map(|order| order.total).sum()))
    }

    fn project_via_timesheets(
        &self,
        project: &Project,
        range: &DateRange,
    ) -> Result<Option<f64>> {
        let entries = self.reader().cost_entries(Some(project.id), Some(range))?;
        if entries.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            entries
                .iter()
                .filter_map(|entry| entry.amount)
                .filter(|amount| *amount > 0.0)
                .sum(),
        ))
    }
}
