use crate::error::Result;
use crate::period::DateRange;
use crate::schema::{
    Capabilities, CostEntry, Invoice, InvoiceKind, InvoiceLine, InvoiceState, LedgerLine,
    OrderState, Project, SalesOrder,
};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Hard ceiling on the number of projects considered per computation.
pub const PROJECT_SCAN_CAP: usize = 500;

/// Read-only access to the underlying business-record snapshot.
///
/// Implementations return the raw collections; filtering and joining is the
/// job of [`RecordReader`]. A `Capabilities` mismatch (asking for a family
/// the deployment does not have) is never an error here — the reader resolves
/// unavailable families to empty results. Errors are reserved for genuine
/// source failures.
pub trait RecordSource {
    fn capabilities(&self) -> Capabilities;
    fn invoices(&self) -> Result<Vec<Invoice>>;
    fn invoice_lines(&self) -> Result<Vec<InvoiceLine>>;
    fn sales_orders(&self) -> Result<Vec<SalesOrder>>;
    fn cost_entries(&self) -> Result<Vec<CostEntry>>;
    fn ledger_lines(&self) -> Result<Vec<LedgerLine>>;
    fn projects(&self) -> Result<Vec<Project>>;
}

/// Capability-aware query layer over a [`RecordSource`].
///
/// Every query resolves an unavailable family to an empty vector, so the
/// calculators never need to branch on presence themselves.
pub struct RecordReader<'a> {
    source: &'a dyn RecordSource,
}

impl<'a> RecordReader<'a> {
    pub fn new(source: &'a dyn RecordSource) -> Self {
        Self { source }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.source.capabilities()
    }

    /// Posted customer invoices with an invoice date inside `range`.
    /// Credit notes are a separate kind and are excluded here.
    pub fn posted_customer_invoices(&self, range: &DateRange) -> Result<Vec<Invoice>> {
        if !self.capabilities().invoices {
            return Ok(Vec::new());
        }
        Ok(self
            .source
            .invoices()?
            .into_iter()
            .filter(|inv| {
                inv.state == InvoiceState::Posted
                    && inv.kind == InvoiceKind::CustomerInvoice
                    && range.contains(inv.date)
            })
            .collect())
    }

    /// Invoice lines attributed to `analytic_id` whose parent invoice is a
    /// posted customer invoice dated inside `range`.
    pub fn invoice_lines_for_analytic(
        &self,
        analytic_id: i64,
        range: &DateRange,
    ) -> Result<Vec<InvoiceLine>> {
        let caps = self.capabilities();
        if !caps.invoice_lines || !caps.invoices {
            return Ok(Vec::new());
        }
        let parent_ids: HashSet<i64> = self
            .posted_customer_invoices(range)?
            .into_iter()
            .map(|inv| inv.id)
            .collect();
        Ok(self
            .source
            .invoice_lines()?
            .into_iter()
            .filter(|line| {
                parent_ids.contains(&line.invoice_id) && line.analytic_ids.contains(&analytic_id)
            })
            .collect())
    }

    /// Confirmed (or done) sales orders dated inside `range`, optionally
    /// restricted to orders linked to one project by id or analytic account.
    pub fn confirmed_sales_orders(
        &self,
        range: &DateRange,
        project: Option<&Project>,
    ) -> Result<Vec<SalesOrder>> {
        if !self.capabilities().sales_orders {
            return Ok(Vec::new());
        }
        Ok(self
            .source
            .sales_orders()?
            .into_iter()
            .filter(|order| {
                matches!(order.state, OrderState::Confirmed | OrderState::Done)
                    && range.contains(order.date)
                    && match project {
                        Some(p) => {
                            order.project_id == Some(p.id)
                                || (p.analytic_id.is_some() && order.analytic_id == p.analytic_id)
                        }
                        None => true,
                    }
            })
            .collect())
    }

    /// Cost entries, optionally restricted to one project and to a range.
    /// Headcount deliberately passes `range: None` (all-time attribution).
    pub fn cost_entries(
        &self,
        project_id: Option<i64>,
        range: Option<&DateRange>,
    ) -> Result<Vec<CostEntry>> {
        if !self.capabilities().cost_entries {
            return Ok(Vec::new());
        }
        Ok(self
            .source
            .cost_entries()?
            .into_iter()
            .filter(|entry| {
                (project_id.is_none() || entry.project_id == project_id)
                    && range.map(|r| r.contains(entry.date)).unwrap_or(true)
            })
            .collect())
    }

    /// Posted ledger lines dated inside `range`.
    pub fn posted_ledger_lines(&self, range: &DateRange) -> Result<Vec<LedgerLine>> {
        if !self.capabilities().ledger_lines {
            return Ok(Vec::new());
        }
        Ok(self
            .source
            .ledger_lines()?
            .into_iter()
            .filter(|line| line.posted && range.contains(line.date))
            .collect())
    }

    /// Active projects, capped at [`PROJECT_SCAN_CAP`].
    pub fn active_projects(&self) -> Result<Vec<Project>> {
        if !self.capabilities().projects {
            return Ok(Vec::new());
        }
        let mut projects: Vec<Project> = self
            .source
            .projects()?
            .into_iter()
            .filter(|p| p.active)
            .collect();
        if projects.len() > PROJECT_SCAN_CAP {
            warn!(
                "project scan truncated from {} to {} entries",
                projects.len(),
                PROJECT_SCAN_CAP
            );
            projects.truncate(PROJECT_SCAN_CAP);
        }
        Ok(projects)
    }

    pub fn project_by_id(&self, id: i64) -> Result<Option<Project>> {
        if !self.capabilities().projects {
            return Ok(None);
        }
        Ok(self.source.projects()?.into_iter().find(|p| p.id == id))
    }

    /// Per-family availability and record counts, for diagnostics. A family
    /// that fails to read is reported unavailable rather than erroring.
    pub fn availability(&self) -> DataAvailability {
        let caps = self.capabilities();
        DataAvailability {
            invoices: probe("invoices", caps.invoices, || {
                self.source.invoices().map(|v| v.len())
            }),
            invoice_lines: probe("invoice_lines", caps.invoice_lines, || {
                self.source.invoice_lines().map(|v| v.len())
            }),
            sales_orders: probe("sales_orders", caps.sales_orders, || {
                self.source.sales_orders().map(|v| v.len())
            }),
            cost_entries: probe("cost_entries", caps.cost_entries, || {
                self.source.cost_entries().map(|v| v.len())
            }),
            ledger_lines: probe("ledger_lines", caps.ledger_lines, || {
                self.source.ledger_lines().map(|v| v.len())
            }),
            projects: probe("projects", caps.projects, || {
                self.source.projects().map(|v| v.len())
            }),
        }
    }
}

fn probe<F>(family: &str, declared: bool, read: F) -> FamilyAvailability
where
    F: FnOnce() -> Result<usize>,
{
    if !declared {
        return FamilyAvailability {
            available: false,
            count: None,
        };
    }
    match read() {
        Ok(count) => FamilyAvailability {
            available: true,
            count: Some(count),
        },
        Err(e) => {
            warn!("availability probe failed for {}: {}", family, e);
            FamilyAvailability {
                available: false,
                count: None,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FamilyAvailability {
    pub available: bool,
    pub count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataAvailability {
    pub invoices: FamilyAvailability,
    pub invoice_lines: FamilyAvailability,
    pub sales_orders: FamilyAvailability,
    pub cost_entries: FamilyAvailability,
    pub ledger_lines: FamilyAvailability,
    pub projects: FamilyAvailability,
}

/// An owned in-memory record snapshot. Used by the sample generator and the
/// test suite, and suitable for embedding callers that materialize their
/// records up front.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecords {
    pub capabilities: Capabilities,
    pub invoices: Vec<Invoice>,
    pub invoice_lines: Vec<InvoiceLine>,
    pub sales_orders: Vec<SalesOrder>,
    pub cost_entries: Vec<CostEntry>,
    pub ledger_lines: Vec<LedgerLine>,
    pub projects: Vec<Project>,
}

impl MemoryRecords {
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }
}

impl RecordSource for MemoryRecords {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn invoices(&self) -> Result<Vec<Invoice>> {
        Ok(self.invoices.clone())
    }

    fn invoice_lines(&self) -> Result<Vec<InvoiceLine>> {
        Ok(self.invoice_lines.clone())
    }

    fn sales_orders(&self) -> Result<Vec<SalesOrder>> {
        Ok(self.sales_orders.clone())
    }

    fn cost_entries(&self) -> Result<Vec<CostEntry>> {
        Ok(self.cost_entries.clone())
    }

    fn ledger_lines(&self) -> Result<Vec<LedgerLine>> {
        Ok(self.ledger_lines.clone())
    }

    fn projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.clone())
    }
}
