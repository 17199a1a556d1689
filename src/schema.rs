use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceState {
    Draft,
    Posted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    CustomerInvoice,
    CustomerCredit,
    VendorBill,
    VendorCredit,
}

/// A customer or vendor invoice header. Only posted customer invoices count
/// toward revenue; the signed total is negative for credit notes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Invoice {
    pub id: i64,
    pub state: InvoiceState,
    pub kind: InvoiceKind,
    pub date: NaiveDate,
    pub total_signed: f64,
}

/// One line of an invoice, with the analytic accounts it is billed against.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InvoiceLine {
    pub id: i64,
    pub invoice_id: i64,
    pub subtotal: f64,
    /// Analytic distribution: the analytic account ids this line is
    /// attributed to.
    pub analytic_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Draft,
    Confirmed,
    Done,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SalesOrder {
    pub id: i64,
    pub state: OrderState,
    pub date: NaiveDate,
    pub total: f64,
    pub project_id: Option<i64>,
    pub analytic_id: Option<i64>,
}

/// A timesheet-like cost line. Negative amounts are payroll cost; positive
/// amounts are billable revenue-side entries. When the deployment does not
/// record amounts, cost can be estimated from `hours` and `hourly_cost`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CostEntry {
    pub id: i64,
    pub project_id: Option<i64>,
    pub date: NaiveDate,
    pub hours: f64,
    pub amount: Option<f64>,
    pub employee_id: Option<i64>,
    /// The employee's hourly rate at entry time, when the deployment
    /// records one.
    pub hourly_cost: Option<f64>,
}

/// A general-ledger line. Administrative cost is derived from posted lines
/// on accounts classified as administrative/overhead.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LedgerLine {
    pub id: i64,
    pub account_code: String,
    pub account_name: String,
    pub date: NaiveDate,
    pub debit: f64,
    pub credit: f64,
    pub posted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub active: bool,
    pub planned_budget: f64,
    pub analytic_id: Option<i64>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

/// Declares which record families and optional fields exist in this
/// deployment, so the calculators branch on explicit flags instead of
/// probing the store at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Capabilities {
    pub invoices: bool,
    pub invoice_lines: bool,
    pub sales_orders: bool,
    pub cost_entries: bool,
    pub ledger_lines: bool,
    pub projects: bool,
    /// Cost entries carry signed monetary amounts (not just hours).
    pub cost_entry_amounts: bool,
    /// Cost entries carry an hourly rate usable for cost estimation.
    pub employee_hourly_cost: bool,
}

impl Capabilities {
    pub fn full() -> Self {
        Self {
            invoices: true,
            invoice_lines: true,
            sales_orders: true,
            cost_entries: true,
            ledger_lines: true,
            projects: true,
            cost_entry_amounts: true,
            employee_hourly_cost: true,
        }
    }

    pub fn none() -> Self {
        Self {
            invoices: false,
            invoice_lines: false,
            sales_orders: false,
            cost_entries: false,
            ledger_lines: false,
            projects: false,
            cost_entry_amounts: false,
            employee_hourly_cost: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}
