use crate::error::Result;
use crate::period::DateRange;
use crate::records::{RecordReader, RecordSource};
use std::collections::HashSet;

/// Headcount and worked hours derived from timesheet-like cost entries.
pub struct StaffingCalculator<'a> {
    source: &'a dyn RecordSource,
}

impl<'a> StaffingCalculator<'a> {
    pub fn new(source: &'a dyn RecordSource) -> Self {
        Self { source }
    }

    /// Distinct staff members ever attributed to the project.
    ///
    /// Headcount is all-time by policy: staffing answers "who is on this
    /// project", not "who logged time this month", so the date range is
    /// deliberately not applied here (unlike [`hours`](Self::hours)).
    pub fn headcount(&self, project_id: i64) -> Result<usize> {
        let entries = RecordReader::new(self.source).cost_entries(Some(project_id), None)?;
        let staff: HashSet<i64> = entries
            .iter()
            .filter_map(|entry| entry.employee_id)
            .collect();
        Ok(staff.len())
    }

    /// Hours recorded against the project within `range`.
    pub fn hours(&self, project_id: i64, range: &DateRange) -> Result<f64> {
        let entries =
            RecordReader::new(self.source).cost_entries(Some(project_id), Some(range))?;
        Ok(entries.iter().map(|entry| entry.hours).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MemoryRecords;
    use crate::schema::CostEntry;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn entry(id: i64, project_id: i64, employee_id: Option<i64>, date: NaiveDate, hours: f64) -> CostEntry {
        CostEntry {
            id,
            project_id: Some(project_id),
            date,
            hours,
            amount: Some(-hours * 40.0),
            employee_id,
            hourly_cost: None,
        }
    }

    #[test]
    fn test_headcount_distinct_all_time() {
        let store = MemoryRecords {
            cost_entries: vec![
                entry(1, 4, Some(10), d(2023, 5, 1), 8.0),
                entry(2, 4, Some(10), d(2024, 2, 1), 8.0),
                entry(3, 4, Some(11), d(2024, 2, 2), 4.0),
                entry(4, 4, None, d(2024, 2, 3), 2.0),
                entry(5, 5, Some(12), d(2024, 2, 4), 8.0),
            ],
            ..MemoryRecords::default()
        };

        let calc = StaffingCalculator::new(&store);
        assert_eq!(calc.headcount(4).unwrap(), 2);
        assert_eq!(calc.headcount(99).unwrap(), 0);
    }

    #[test]
    fn test_hours_are_range_scoped() {
        let store = MemoryRecords {
            cost_entries: vec![
                entry(1, 4, Some(10), d(2023, 5, 1), 8.0),
                entry(2, 4, Some(10), d(2024, 2, 1), 6.5),
                entry(3, 4, Some(11), d(2024, 2, 2), 4.0),
            ],
            ..MemoryRecords::default()
        };

        let calc = StaffingCalculator::new(&store);
        let range = DateRange::bounded(d(2024, 1, 1), d(2024, 12, 31));
        assert_eq!(calc.hours(4, &range).unwrap(), 10.5);
        assert_eq!(calc.hours(4, &DateRange::unbounded()).unwrap(), 18.5);
    }
}
