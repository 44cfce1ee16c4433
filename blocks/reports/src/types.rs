use qa_atoms::executions::{ExecutionRow, TestExecution};
use qa_atoms::tasks::Task;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analytics::{CategoryCount, StatusSlice, TesterPerformance};
use crate::demo::{DashboardDemo, ReportDemo};

/// GET /dashboard
#[derive(Debug, Serialize)]
pub struct DashboardStats<'a> {
    pub total_tasks: usize,
    pub total_executions: usize,
    pub completed_executions: usize,
    pub in_progress_executions: usize,
    pub pending_executions: usize,
    pub failed_executions: usize,
    pub average_pass_rate: f64,
    pub active_testers: usize,
    pub status_breakdown: Vec<StatusSlice>,
    pub recent_executions: Vec<ExecutionRow<'a>>,
    pub demo: DashboardDemo,
}

/// GET /reports
#[derive(Debug, Serialize, Clone)]
pub struct ReportAnalytics {
    pub total_tests: usize,
    pub completed_tests: usize,
    pub failed_tests: usize,
    /// Completed executions over all executions.
    pub pass_rate: f64,
    pub tester_performance: BTreeMap<String, TesterPerformance>,
    pub category_data: Vec<CategoryCount>,
    pub demo: ReportDemo,
}

/// Description of `task_id` among `tasks`, if it still exists.
pub fn description_for<'a>(tasks: &'a [Task], task_id: &str) -> Option<&'a str> {
    tasks
        .iter()
        .find(|t| t.task_id == task_id)
        .map(|t| t.description.as_str())
}

pub fn rows<'a>(tasks: &'a [Task], executions: impl IntoIterator<Item = &'a TestExecution>) -> Vec<ExecutionRow<'a>> {
    executions
        .into_iter()
        .map(|e| ExecutionRow::new(e, description_for(tasks, &e.task_id)))
        .collect()
}
