use chrono::NaiveDate;
use qa_atoms::executions::TestExecution;
use qa_atoms::tasks::Task;
use rand::Rng;

use crate::analytics::{
    average_pass_rate, category_data, execution_pass_rate, recent_executions, status_breakdown,
    status_counts, tester_performance, unique_testers,
};
use crate::demo::{dashboard_demo, report_demo};
use crate::types::{rows, DashboardStats, ReportAnalytics};

pub const DEFAULT_RECENT_LIMIT: usize = 6;

pub fn build_dashboard<'a, R: Rng + ?Sized>(
    tasks: &'a [Task],
    executions: &'a [TestExecution],
    recent_limit: usize,
    rng: &mut R,
) -> DashboardStats<'a> {
    let counts = status_counts(executions);

    DashboardStats {
        total_tasks: tasks.len(),
        total_executions: executions.len(),
        completed_executions: counts.completed,
        in_progress_executions: counts.in_progress,
        pending_executions: counts.pending,
        failed_executions: counts.failed,
        average_pass_rate: average_pass_rate(executions),
        active_testers: unique_testers(executions),
        status_breakdown: status_breakdown(&counts),
        recent_executions: rows(tasks, recent_executions(executions, recent_limit)),
        demo: dashboard_demo(rng),
    }
}

pub fn build_report<R: Rng + ?Sized>(
    tasks: &[Task],
    executions: &[TestExecution],
    today: NaiveDate,
    rng: &mut R,
) -> ReportAnalytics {
    let counts = status_counts(executions);

    ReportAnalytics {
        total_tests: executions.len(),
        completed_tests: counts.completed,
        failed_tests: counts.failed,
        pass_rate: execution_pass_rate(executions),
        tester_performance: tester_performance(executions),
        category_data: category_data(tasks),
        demo: report_demo(rng, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::tests::{execution, task};
    use qa_atoms::executions::ExecutionStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_store_gives_zeroed_dashboard() {
        let mut rng = StdRng::seed_from_u64(3);
        let stats = build_dashboard(&[], &[], DEFAULT_RECENT_LIMIT, &mut rng);

        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.total_executions, 0);
        assert_eq!(stats.average_pass_rate, 0.0);
        assert_eq!(stats.active_testers, 0);
        assert!(stats.status_breakdown.is_empty());
        assert!(stats.recent_executions.is_empty());
        assert!(stats.demo.synthetic);
    }

    #[test]
    fn dashboard_joins_recent_rows_with_task_descriptions() {
        let tasks = vec![task("t1", "Login flow", &["auth"])];
        let mut orphan = execution("Bob", ExecutionStatus::Failed, 0, 2);
        orphan.task_id = "gone".into();
        orphan.created_at = "2024-01-02T00:00:00+00:00".into();
        let executions = vec![execution("Alice", ExecutionStatus::Completed, 2, 2), orphan];

        let mut rng = StdRng::seed_from_u64(3);
        let stats = build_dashboard(&tasks, &executions, DEFAULT_RECENT_LIMIT, &mut rng);

        assert_eq!(stats.total_tasks, 1);
        assert_eq!(stats.completed_executions, 1);
        assert_eq!(stats.failed_executions, 1);
        assert_eq!(stats.average_pass_rate, 50.0);
        assert_eq!(stats.active_testers, 2);
        assert_eq!(stats.recent_executions.len(), 2);
        assert_eq!(stats.recent_executions[0].task_description, None);
        assert_eq!(stats.recent_executions[1].task_description, Some("Login flow"));
    }

    #[test]
    fn report_counts_runs_by_status() {
        let tasks = vec![
            task("t1", "Login flow", &["smoke", "auth"]),
            task("t2", "Checkout", &["smoke"]),
        ];
        let executions = vec![
            execution("Alice", ExecutionStatus::Completed, 1, 1),
            execution("Alice", ExecutionStatus::Failed, 0, 1),
            execution("Bob", ExecutionStatus::Completed, 1, 1),
            execution("Bob", ExecutionStatus::Pending, 0, 1),
        ];

        let mut rng = StdRng::seed_from_u64(9);
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let report = build_report(&tasks, &executions, today, &mut rng);

        assert_eq!(report.total_tests, 4);
        assert_eq!(report.completed_tests, 2);
        assert_eq!(report.failed_tests, 1);
        assert_eq!(report.pass_rate, 50.0);
        assert_eq!(report.tester_performance["Bob"].total, 2);
        assert_eq!(report.category_data.len(), 2);
        assert_eq!(report.demo.daily_activity.len(), 30);
    }
}
