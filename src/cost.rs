use crate::error::Result;
use crate::period::DateRange;
use crate::records::{RecordReader, RecordSource};
use crate::revenue::RevenueCalculator;
use crate::schema::LedgerLine;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Estimation constants threaded into the cost calculator explicitly, never
/// read from ambient configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EstimationConfig {
    /// Fallback ratio applied to portfolio revenue when no administrative
    /// ledger lines qualify. `0.0` disables the fallback.
    pub admin_cost_ratio: f64,
    /// Hourly rate used to estimate staffing cost from hours when an entry
    /// carries no amount and no per-entry rate. `0.0` disables estimation.
    pub default_hourly_cost: f64,
    /// Account-code prefixes classified as administrative/overhead.
    pub admin_account_prefixes: Vec<String>,
    /// Lowercase substrings of account names classified as administrative.
    pub admin_name_keywords: Vec<String>,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            admin_cost_ratio: 0.15,
            default_hourly_cost: 0.0,
            admin_account_prefixes: Vec::new(),
            admin_name_keywords: vec![
                "admin".to_string(),
                "overhead".to_string(),
                "direction".to_string(),
            ],
        }
    }
}

/// Payroll/staffing cost per project and administrative cost for the whole
/// portfolio.
pub struct CostCalculator<'a> {
    source: &'a dyn RecordSource,
    config: EstimationConfig,
}

impl<'a> CostCalculator<'a> {
    pub fn new(source: &'a dyn RecordSource, config: EstimationConfig) -> Self {
        Self { source, config }
    }

    fn reader(&self) -> RecordReader<'a> {
        RecordReader::new(self.source)
    }

    /// Payroll cost of a project over `range`: the absolute value of
    /// negative-amount cost entries. Positive amounts are billable
    /// revenue-side entries and never count as cost. Entries without an
    /// amount are estimated from hours when a rate is available.
    pub fn staffing_cost(&self, project_id: i64, range: &DateRange) -> Result<f64> {
        let reader = self.reader();
        let caps = reader.capabilities();
        let entries = reader.cost_entries(Some(project_id), Some(range))?;

        let mut total = 0.0;
        for entry in &entries {
            let amount = if caps.cost_entry_amounts { entry.amount } else { None };
            match amount {
                Some(value) if value < 0.0 => total += value.abs(),
                Some(_) => {}
                None => {
                    let rate = if caps.employee_hourly_cost {
                        entry.hourly_cost.unwrap_or(self.config.default_hourly_cost)
                    } else {
                        self.config.default_hourly_cost
                    };
                    if rate > 0.0 {
                        total += entry.hours * rate;
                    }
                }
            }
        }
        Ok(total)
    }

    /// Administrative/overhead cost over `range`: |debit − credit| summed
    /// over posted ledger lines on administratively-classified accounts,
    /// falling back to a configured ratio of portfolio revenue when no line
    /// qualifies.
    pub fn administrative_cost(&self, range: &DateRange) -> Result<f64> {
        let lines = self.reader().posted_ledger_lines(range)?;
        let total: f64 = lines
            .iter()
            .filter(|line| self.is_admin_account(line))
            .map(|line| (line.debit - line.credit).abs())
            .sum();
        if total != 0.0 {
            return Ok(total);
        }

        if self.config.admin_cost_ratio > 0.0 {
            let revenue = RevenueCalculator::new(self.source).portfolio_revenue(range)?;
            let estimated = revenue * self.config.admin_cost_ratio;
            if estimated != 0.0 {
                debug!(
                    "administrative cost estimated at {:.2} ({}% of revenue)",
                    estimated,
                    self.config.admin_cost_ratio * 100.0
                );
            }
            return Ok(estimated);
        }
        Ok(0.0)
    }

    fn is_admin_account(&self, line: &LedgerLine) -> bool {
        if self
            .config
            .admin_account_prefixes
            .iter()
            .any(|prefix| line.account_code.starts_with(prefix.as_str()))
        {
            return true;
        }
        let name = line.account_name.to_lowercase();
        self.config
            .admin_name_keywords
            .iter()
            .any(|keyword| name.contains(keyword.as_str()))
    }
}
