use crate::records::MemoryRecords;
use crate::schema::{
    CostEntry, Invoice, InvoiceKind, InvoiceLine, InvoiceState, LedgerLine, Project,
};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

const STATUS_LABELS: [&str; 4] = ["In progress", "Planned", "Done", "On hold"];

/// Generates a plausible in-memory portfolio for demos and tests.
///
/// Deterministic for a given seed: every invocation with the same arguments
/// produces the same record snapshot.
pub fn generate_sample_records(project_count: usize, year: i32, seed: u64) -> MemoryRecords {
    let mut rng = StdRng::seed_from_u64(seed);
    let revenue_noise = Normal::new(0.0, 0.08).unwrap();

    let mut store = MemoryRecords::default();
    let mut invoice_id = 0i64;
    let mut line_id = 0i64;
    let mut entry_id = 0i64;

    for index in 0..project_count {
        let project_id = index as i64 + 1;
        let analytic_id = 100 + project_id;
        let monthly_revenue = 8_000.0 + index as f64 * 1_500.0;

        store.projects.push(Project {
            id: project_id,
            name: format!("Project {:02}", project_id),
            status: STATUS_LABELS[index % STATUS_LABELS.len()].to_string(),
            active: true,
            planned_budget: monthly_revenue * 12.0 * 1.2,
            analytic_id: Some(analytic_id),
            date_start: NaiveDate::from_ymd_opt(year, 1, 1),
            date_end: NaiveDate::from_ymd_opt(year, 12, 31),
        });

        for month in 1..=12u32 {
            let date = NaiveDate::from_ymd_opt(year, month, month % 27 + 1)
                .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap());
            let amount = monthly_revenue * (1.0 + revenue_noise.sample(&mut rng));

            invoice_id += 1;
            store.invoices.push(Invoice {
                id: invoice_id,
                state: InvoiceState::Posted,
                kind: InvoiceKind::CustomerInvoice,
                date,
                total_signed: amount,
            });
            line_id += 1;
            store.invoice_lines.push(InvoiceLine {
                id: line_id,
                invoice_id,
                subtotal: amount,
                analytic_ids: vec![analytic_id],
            });

            // two to four staff members log time each month
            let staff_count = 2 + (index % 3) as i64;
            for staff in 0..staff_count {
                let hours = rng.gen_range(20.0..60.0);
                let rate = 35.0 + staff as f64 * 10.0;
                entry_id += 1;
                store.cost_entries.push(CostEntry {
                    id: entry_id,
                    project_id: Some(project_id),
                    date,
                    hours,
                    amount: Some(-(hours * rate)),
                    employee_id: Some(project_id * 10 + staff),
                    hourly_cost: Some(rate),
                });
            }
        }
    }

    // one administrative ledger line per month
    for month in 1..=12u32 {
        let date = NaiveDate::from_ymd_opt(year, month, 28)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap());
        store.ledger_lines.push(LedgerLine {
            id: month as i64,
            account_code: format!("641{}", month),
            account_name: "Administration".to_string(),
            date,
            debit: rng.gen_range(3_000.0..6_000.0),
            credit: 0.0,
            posted: true,
        });
    }

    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardEngine;
    use crate::period::DateRange;
    use chrono::NaiveDate;

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let a = generate_sample_records(5, 2024, 42);
        let b = generate_sample_records(5, 2024, 42);
        assert_eq!(a.projects.len(), b.projects.len());
        assert_eq!(a.invoices.len(), b.invoices.len());
        for (left, right) in a.invoices.iter().zip(&b.invoices) {
            assert_eq!(left.total_signed, right.total_signed);
        }
    }

    #[test]
    fn test_sample_shape() {
        let store = generate_sample_records(4, 2024, 7);
        assert_eq!(store.projects.len(), 4);
        assert_eq!(store.invoices.len(), 48);
        assert_eq!(store.invoice_lines.len(), 48);
        assert_eq!(store.ledger_lines.len(), 12);
        assert!(store.cost_entries.iter().all(|e| e.amount.unwrap() < 0.0));
        assert_eq!(store.projects[0].status, "In progress");
        assert_eq!(store.projects[3].status, "On hold");
    }

    #[test]
    fn test_sample_drives_a_nonzero_dashboard() {
        let store = generate_sample_records(3, 2024, 1);
        let engine = DashboardEngine::new(&store);
        let range = DateRange::bounded(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        let snapshot = engine.build_snapshot(&range);

        assert!(snapshot.total_revenue > 0.0);
        assert_eq!(snapshot.projects.len(), 3);
        assert!(snapshot.projects.iter().all(|p| p.headcount >= 2));
        assert!(snapshot.administrative_margin.admin_cost > 0.0);
        assert_eq!(snapshot.chart_data.revenue_series.labels.len(), 3);
    }
}
