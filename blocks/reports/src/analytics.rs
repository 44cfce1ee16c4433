//! Aggregations over whole task and execution collections.
//!
//! Every function is a full scan of its input and safe on empty input:
//! counts come back as zero and rates as `0.0`, never NaN.

use chrono::{DateTime, FixedOffset};
use qa_atoms::executions::{ExecutionStatus, TestExecution};
use qa_atoms::tasks::Task;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn get(&self, status: ExecutionStatus) -> usize {
        match status {
            ExecutionStatus::Pending => self.pending,
            ExecutionStatus::InProgress => self.in_progress,
            ExecutionStatus::Completed => self.completed,
            ExecutionStatus::Failed => self.failed,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed + self.failed
    }
}

pub fn status_counts(executions: &[TestExecution]) -> StatusCounts {
    executions.iter().fold(StatusCounts::default(), |mut acc, e| {
        match e.status {
            ExecutionStatus::Pending => acc.pending += 1,
            ExecutionStatus::InProgress => acc.in_progress += 1,
            ExecutionStatus::Completed => acc.completed += 1,
            ExecutionStatus::Failed => acc.failed += 1,
        }
        acc
    })
}

/// Pooled rate over `(passed, total)` pairs: `100 * Σpassed / Σtotal`.
pub fn pooled_pass_rate(counts: impl IntoIterator<Item = (usize, usize)>) -> f64 {
    let (passed, total) = counts
        .into_iter()
        .fold((0, 0), |(p, t), (passed, total)| (p + passed, t + total));
    percentage(passed, total)
}

/// Test cases passed over test cases run, across every execution.
pub fn average_pass_rate(executions: &[TestExecution]) -> f64 {
    pooled_pass_rate(
        executions
            .iter()
            .map(|e| (e.passed_test_cases(), e.total_test_cases())),
    )
}

/// Completed executions over all executions.
pub fn execution_pass_rate(executions: &[TestExecution]) -> f64 {
    percentage(status_counts(executions).completed, executions.len())
}

pub fn unique_testers(executions: &[TestExecution]) -> usize {
    executions
        .iter()
        .map(|e| e.tester_name.as_str())
        .collect::<HashSet<_>>()
        .len()
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq)]
pub struct TesterPerformance {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub success_rate: f64,
}

/// Per tester: completed executions count as passed, failed as failed, and
/// pending/in-progress only towards the total.
pub fn tester_performance(executions: &[TestExecution]) -> BTreeMap<String, TesterPerformance> {
    let mut by_tester: BTreeMap<String, TesterPerformance> = BTreeMap::new();

    for e in executions {
        let entry = by_tester.entry(e.tester_name.clone()).or_default();
        entry.total += 1;
        match e.status {
            ExecutionStatus::Completed => entry.passed += 1,
            ExecutionStatus::Failed => entry.failed += 1,
            ExecutionStatus::Pending | ExecutionStatus::InProgress => {}
        }
    }

    for perf in by_tester.values_mut() {
        perf.success_rate = percentage(perf.passed, perf.total);
    }
    by_tester
}

/// Tag -> number of tasks carrying it.
pub fn category_coverage(tasks: &[Task]) -> BTreeMap<String, usize> {
    let mut coverage = BTreeMap::new();
    for task in tasks {
        for tag in &task.tags {
            *coverage.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    coverage
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub value: usize,
}

pub fn category_data(tasks: &[Task]) -> Vec<CategoryCount> {
    category_coverage(tasks)
        .into_iter()
        .map(|(name, value)| CategoryCount { name, value })
        .collect()
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

/// The `limit` newest executions. Equal timestamps keep their input order;
/// unreadable timestamps sort last.
pub fn recent_executions(executions: &[TestExecution], limit: usize) -> Vec<&TestExecution> {
    let mut sorted: Vec<&TestExecution> = executions.iter().collect();
    sorted.sort_by(|a, b| parse_timestamp(&b.created_at).cmp(&parse_timestamp(&a.created_at)));
    sorted.truncate(limit);
    sorted
}

/// One slice of the dashboard status chart.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct StatusSlice {
    pub name: &'static str,
    pub status: ExecutionStatus,
    pub value: usize,
    pub color: &'static str,
}

/// Chart slices in display order, empty statuses left out.
pub fn status_breakdown(counts: &StatusCounts) -> Vec<StatusSlice> {
    [
        ("Completed", ExecutionStatus::Completed, "#10B981"),
        ("In Progress", ExecutionStatus::InProgress, "#3B82F6"),
        ("Pending", ExecutionStatus::Pending, "#F59E0B"),
        ("Failed", ExecutionStatus::Failed, "#EF4444"),
    ]
    .into_iter()
    .map(|(name, status, color)| StatusSlice {
        name,
        status,
        value: counts.get(status),
        color,
    })
    .filter(|slice| slice.value > 0)
    .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use qa_atoms::executions::TestCaseResult;

    pub(crate) fn execution(tester: &str, status: ExecutionStatus, passed: usize, total: usize) -> TestExecution {
        TestExecution {
            execution_id: format!("{}-{}-{}", tester, passed, total),
            task_id: "t1".into(),
            test_id: "TEST-000000-AAA".into(),
            tester_name: tester.into(),
            test_cases: (0..total)
                .map(|i| TestCaseResult {
                    test_case: format!("case {}", i),
                    passed: i < passed,
                    notes: String::new(),
                })
                .collect(),
            status,
            feedback: "f".into(),
            attached_images: vec![],
            created_at: "2024-01-01T00:00:00+00:00".into(),
            updated_at: "2024-01-01T00:00:00+00:00".into(),
        }
    }

    pub(crate) fn task(id: &str, description: &str, tags: &[&str]) -> Task {
        Task {
            task_id: id.into(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            description: description.into(),
            test_cases: vec!["case".into()],
            notes: String::new(),
            attached_images: vec![],
            created_at: "2024-01-01T00:00:00+00:00".into(),
            updated_at: "2024-01-01T00:00:00+00:00".into(),
        }
    }

    #[test]
    fn status_counts_default_to_zero() {
        assert_eq!(status_counts(&[]), StatusCounts::default());

        let counts = status_counts(&[
            execution("a", ExecutionStatus::Completed, 0, 0),
            execution("b", ExecutionStatus::Completed, 0, 0),
            execution("c", ExecutionStatus::Failed, 0, 0),
        ]);
        assert_eq!(counts.completed, 2);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.pending, 0);
        assert_eq!(counts.in_progress, 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn average_pass_rate_pools_test_cases() {
        let executions = [
            execution("a", ExecutionStatus::Completed, 8, 10),
            execution("b", ExecutionStatus::Completed, 5, 5),
        ];
        let rate = average_pass_rate(&executions);
        assert!((rate - 86.666_666).abs() < 1e-3, "rate was {}", rate);
        assert_eq!(pooled_pass_rate([(8, 10), (5, 5)]), 100.0 * 13.0 / 15.0);
    }

    #[test]
    fn rates_are_zero_without_test_cases() {
        assert_eq!(average_pass_rate(&[]), 0.0);
        let empty = [execution("a", ExecutionStatus::Pending, 0, 0)];
        let rate = average_pass_rate(&empty);
        assert_eq!(rate, 0.0);
        assert!(!rate.is_nan());
        assert_eq!(execution_pass_rate(&[]), 0.0);
    }

    #[test]
    fn execution_pass_rate_counts_completed_runs() {
        let executions = [
            execution("a", ExecutionStatus::Completed, 0, 1),
            execution("b", ExecutionStatus::Failed, 1, 1),
            execution("c", ExecutionStatus::Pending, 1, 1),
            execution("d", ExecutionStatus::Completed, 1, 1),
        ];
        assert_eq!(execution_pass_rate(&executions), 50.0);
    }

    #[test]
    fn tester_performance_classifies_by_status() {
        let executions = [
            execution("Alice", ExecutionStatus::Completed, 1, 1),
            execution("Alice", ExecutionStatus::Failed, 0, 1),
            execution("Bob", ExecutionStatus::Completed, 1, 1),
            execution("Bob", ExecutionStatus::InProgress, 0, 1),
        ];
        let perf = tester_performance(&executions);

        let alice = perf["Alice"];
        assert_eq!((alice.total, alice.passed, alice.failed), (2, 1, 1));
        assert_eq!(alice.success_rate, 50.0);

        let bob = perf["Bob"];
        assert_eq!((bob.total, bob.passed, bob.failed), (2, 1, 0));
        assert_eq!(bob.success_rate, 50.0);
    }

    #[test]
    fn tester_performance_for_two_testers() {
        let perf = tester_performance(&[
            execution("Alice", ExecutionStatus::Completed, 0, 0),
            execution("Alice", ExecutionStatus::Failed, 0, 0),
            execution("Bob", ExecutionStatus::Completed, 0, 0),
        ]);
        assert_eq!(perf.len(), 2);
        assert_eq!((perf["Alice"].total, perf["Alice"].passed, perf["Alice"].failed), (2, 1, 1));
        assert_eq!((perf["Bob"].total, perf["Bob"].passed, perf["Bob"].failed), (1, 1, 0));
        assert_eq!(unique_testers(&[
            execution("Alice", ExecutionStatus::Completed, 0, 0),
            execution("Alice", ExecutionStatus::Failed, 0, 0),
            execution("Bob", ExecutionStatus::Completed, 0, 0),
        ]), 2);
    }

    #[test]
    fn category_coverage_counts_every_tag() {
        let tasks = [
            task("1", "a", &["smoke", "auth", "api"]),
            task("2", "b", &["smoke"]),
        ];
        let coverage = category_coverage(&tasks);
        assert_eq!(coverage["smoke"], 2);
        assert_eq!(coverage["auth"], 1);
        assert_eq!(coverage["api"], 1);
        assert!(category_coverage(&[]).is_empty());

        let data = category_data(&tasks);
        assert_eq!(data.len(), 3);
        assert!(data.contains(&CategoryCount { name: "smoke".into(), value: 2 }));
    }

    #[test]
    fn recent_executions_are_newest_first_and_truncated() {
        let mut executions: Vec<TestExecution> = (0..8)
            .map(|day| {
                let mut e = execution("a", ExecutionStatus::Pending, 0, 0);
                e.execution_id = format!("day-{}", day);
                e.created_at = format!("2024-01-0{}T12:00:00+00:00", day + 1);
                e
            })
            .collect();
        executions[3].created_at = "garbage".into();

        let recent = recent_executions(&executions, 6);
        let ids: Vec<&str> = recent.iter().map(|e| e.execution_id.as_str()).collect();
        assert_eq!(ids, vec!["day-7", "day-6", "day-5", "day-4", "day-2", "day-1"]);

        assert!(recent_executions(&[], 5).is_empty());
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let mut first = execution("a", ExecutionStatus::Pending, 0, 0);
        first.execution_id = "first".into();
        let mut second = execution("b", ExecutionStatus::Pending, 0, 0);
        second.execution_id = "second".into();

        let executions = [first, second];
        let recent = recent_executions(&executions, 10);
        assert_eq!(recent[0].execution_id, "first");
        assert_eq!(recent[1].execution_id, "second");
    }

    #[test]
    fn breakdown_skips_empty_statuses() {
        let counts = StatusCounts {
            pending: 0,
            in_progress: 2,
            completed: 5,
            failed: 0,
        };
        let slices = status_breakdown(&counts);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].name, "Completed");
        assert_eq!(slices[0].value, 5);
        assert_eq!(slices[1].status, ExecutionStatus::InProgress);
        assert!(status_breakdown(&StatusCounts::default()).is_empty());
    }
}
