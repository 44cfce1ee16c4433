use chrono::{DateTime, NaiveDate, Utc};
use qa_atoms::executions::{ExecutionRow, TestExecution};
use qa_atoms::tasks::Task;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{rows, ReportAnalytics};

/// Number of executions included in an export.
pub const EXPORT_SAMPLE_SIZE: usize = 10;

/// Reporting window chosen by the client. Echoed in exports, not applied to the data.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
            TimeRange::Quarter => "90d",
            TimeRange::Year => "1y",
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(TimeRange::Week),
            "30d" => Ok(TimeRange::Month),
            "90d" => Ok(TimeRange::Quarter),
            "1y" => Ok(TimeRange::Year),
            other => Err(format!("Unknown time range: {}", other)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportExport<'a> {
    pub generated_at: String,
    pub time_range: TimeRange,
    pub analytics: &'a ReportAnalytics,
    pub test_executions: Vec<ExecutionRow<'a>>,
}

/// Snapshot of the analytics plus the first executions in list order.
pub fn build_export<'a>(
    generated_at: DateTime<Utc>,
    time_range: TimeRange,
    analytics: &'a ReportAnalytics,
    tasks: &'a [Task],
    executions: &'a [TestExecution],
) -> ReportExport<'a> {
    ReportExport {
        generated_at: generated_at.to_rfc3339(),
        time_range,
        analytics,
        test_executions: rows(tasks, executions.iter().take(EXPORT_SAMPLE_SIZE)),
    }
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("qa-report-{}.json", date.format("%Y-%m-%d"))
}
