use crate::dashboard::DashboardSnapshot;
use crate::error::Result;
use crate::period::DateRange;
use chrono::Utc;
use schemars::JsonSchema;
use serde::Serialize;

pub const EXPORT_FORMAT_VERSION: &str = "2.0";

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExportMetadata {
    pub export_date: String,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub version: String,
}

#[derive(Debug, Serialize)]
struct ExportEnvelope<'a> {
    metadata: ExportMetadata,
    data: &'a DashboardSnapshot,
}

fn metadata_for(range: &DateRange) -> ExportMetadata {
    ExportMetadata {
        export_date: Utc::now().to_rfc3339(),
        period_start: range.start.map(|d| d.to_string()),
        period_end: range.end.map(|d| d.to_string()),
        version: EXPORT_FORMAT_VERSION.to_string(),
    }
}

/// Pretty-printed JSON rendition of a computed snapshot, wrapped in an
/// export-metadata envelope.
pub fn snapshot_to_json(snapshot: &DashboardSnapshot, range: &DateRange) -> Result<String> {
    let envelope = ExportEnvelope {
        metadata: metadata_for(range),
        data: snapshot,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Semicolon-separated CSV rendition: a financial summary block followed by
/// one detail row per project.
pub fn snapshot_to_csv(snapshot: &DashboardSnapshot, range: &DateRange) -> String {
    let mut output = String::new();
    let period = format!(
        "{} - {}",
        range
            .start
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unbounded".to_string()),
        range
            .end
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unbounded".to_string()),
    );

    output.push_str("Portfolio Dashboard Export\n");
    output.push_str(&format!("Period;{}\n", period));
    output.push('\n');

    output.push_str("FINANCIAL SUMMARY\n");
    output.push_str("Metric;Value\n");
    output.push_str(&format!("Total revenue;{:.2}\n", snapshot.total_revenue));
    output.push_str(&format!("Project count;{}\n", snapshot.projects.len()));
    output.push_str(&format!(
        "Administrative cost;{:.2}\n",
        snapshot.administrative_margin.admin_cost
    ));
    output.push_str(&format!(
        "Administrative margin;{:.2}\n",
        snapshot.administrative_margin.admin_margin
    ));
    output.push_str(&format!(
        "Administrative margin rate (%);{:.2}\n",
        snapshot.administrative_margin.admin_margin_rate_pct
    ));
    output.push_str(&format!(
        "Planned budget;{:.2}\n",
        snapshot.budget_summary.total_planned
    ));
    output.push_str(&format!(
        "Consumed budget;{:.2}\n",
        snapshot.budget_summary.total_consumed
    ));
    output.push('\n');

    output.push_str("PROJECT DETAIL\n");
    output.push_str("Id;Name;Revenue;Headcount;Hours;Status;Planned budget;Consumed budget\n");
    for project in &snapshot.projects {
        output.push_str(&format!(
            "{};{};{:.2};{};{:.2};{};{:.2};{:.2}\n",
            project.id,
            project.name,
            project.realized_revenue,
            project.headcount,
            project.hours_worked,
            project.status_label,
            project.planned_budget,
            project.consumed_budget,
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::ProjectSummary;
    use chrono::NaiveDate;

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            total_revenue: 1500.0,
            projects: vec![ProjectSummary {
                id: 1,
                name: "Alpha".to_string(),
                realized_revenue: 1500.0,
                headcount: 2,
                hours_worked: 40.0,
                status_label: "open".to_string(),
                planned_budget: 2000.0,
                consumed_budget: 1500.0,
                ..ProjectSummary::default()
            }],
            ..DashboardSnapshot::default()
        }
    }

    #[test]
    fn test_json_export_envelope() {
        let range = DateRange::bounded(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        );
        let json = snapshot_to_json(&snapshot(), &range).unwrap();
        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"2024-01-01\""));
        assert!(json.contains("\"version\": \"2.0\""));
        assert!(json.contains("\"total_revenue\": 1500.0"));
    }

    #[test]
    fn test_csv_export_summary_and_detail() {
        let csv = snapshot_to_csv(&snapshot(), &DateRange::unbounded());
        assert!(csv.contains("FINANCIAL SUMMARY"));
        assert!(csv.contains("Total revenue;1500.00"));
        assert!(csv.contains("PROJECT DETAIL"));
        assert!(csv.contains("1;Alpha;1500.00;2;40.00;open;2000.00;1500.00"));
        assert!(csv.contains("Period;unbounded - unbounded"));
    }
}
