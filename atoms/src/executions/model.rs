use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::validation::FieldErrors;

/// Overall state of an execution. Set by the tester, never derived from the checklist.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub const ALL: [ExecutionStatus; 4] = [
        ExecutionStatus::Pending,
        ExecutionStatus::InProgress,
        ExecutionStatus::Completed,
        ExecutionStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::InProgress => "in-progress",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
        }
    }
}

impl FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ExecutionStatus::Pending),
            "in-progress" => Ok(ExecutionStatus::InProgress),
            "completed" => Ok(ExecutionStatus::Completed),
            "failed" => Ok(ExecutionStatus::Failed),
            other => Err(format!("Unknown execution status: {}", other)),
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One checklist entry. `test_case` is a copy of the task's text taken when the
/// task was selected; later edits to the task do not reach it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TestCaseResult {
    pub test_case: String,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub notes: String,
}

impl TestCaseResult {
    pub fn unchecked(test_case: impl Into<String>) -> Self {
        Self {
            test_case: test_case.into(),
            passed: false,
            notes: String::new(),
        }
    }
}

/// One fresh, unchecked entry per task test case, in task order.
pub fn seed_checklist(task_test_cases: &[String]) -> Vec<TestCaseResult> {
    task_test_cases.iter().map(TestCaseResult::unchecked).collect()
}

pub fn passed_count(test_cases: &[TestCaseResult]) -> usize {
    test_cases.iter().filter(|tc| tc.passed).count()
}

/// Percentage of passed entries; 0 for an empty checklist.
pub fn pass_rate(test_cases: &[TestCaseResult]) -> f64 {
    if test_cases.is_empty() {
        return 0.0;
    }
    passed_count(test_cases) as f64 / test_cases.len() as f64 * 100.0
}

/// TestExecution domain model - one run of a task's checklist by a tester
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TestExecution {
    pub execution_id: String,
    pub task_id: String,
    pub test_id: String,
    pub tester_name: String,
    pub test_cases: Vec<TestCaseResult>,
    pub status: ExecutionStatus,
    pub feedback: String,
    #[serde(default)]
    pub attached_images: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TestExecution {
    pub fn passed_test_cases(&self) -> usize {
        passed_count(&self.test_cases)
    }

    pub fn total_test_cases(&self) -> usize {
        self.test_cases.len()
    }

    pub fn pass_rate(&self) -> f64 {
        pass_rate(&self.test_cases)
    }

    /// Case-insensitive match on test id, tester name or the joined task description.
    pub fn matches_search(&self, term: &str, task_description: Option<&str>) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.test_id.to_lowercase().contains(&term)
            || self.tester_name.to_lowercase().contains(&term)
            || task_description.is_some_and(|d| d.to_lowercase().contains(&term))
    }
}

/// Wire shape of an execution: the record plus its derived counts and the
/// joined task description (`None` when the task no longer exists).
#[derive(Debug, Serialize)]
pub struct ExecutionRow<'a> {
    #[serde(flatten)]
    pub execution: &'a TestExecution,
    pub passed_test_cases: usize,
    pub total_test_cases: usize,
    pub task_description: Option<&'a str>,
}

impl<'a> ExecutionRow<'a> {
    pub fn new(execution: &'a TestExecution, task_description: Option<&'a str>) -> Self {
        Self {
            execution,
            passed_test_cases: execution.passed_test_cases(),
            total_test_cases: execution.total_test_cases(),
            task_description,
        }
    }
}

/// Create/update body. Every field defaults so that missing ones surface as
/// field errors instead of a parse failure.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ExecutionPayload {
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub test_id: String,
    #[serde(default)]
    pub tester_name: String,
    #[serde(default)]
    pub test_cases: Vec<TestCaseResult>,
    #[serde(default)]
    pub status: ExecutionStatus,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub attached_images: Vec<String>,
}

impl ExecutionPayload {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.task_id.is_empty() {
            errors.insert("task_id", "Task selection is required");
        }
        errors.require_text("test_id", &self.test_id, "Test ID is required");
        errors.require_text("tester_name", &self.tester_name, "Tester name is required");
        errors.require_text("feedback", &self.feedback, "Feedback is required");
        errors
    }

    pub fn trimmed(mut self) -> Self {
        self.test_id = self.test_id.trim().to_string();
        self.tester_name = self.tester_name.trim().to_string();
        self.feedback = self.feedback.trim().to_string();
        self
    }
}

/// Seeded checklist handed to a client that just picked a task.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TaskChecklist {
    pub task_id: String,
    pub test_id: String,
    pub test_cases: Vec<TestCaseResult>,
}

/// Accepts a submitted checklist against the one it must mirror.
///
/// An empty submission is seeded from `expected`. A non-empty one must have
/// exactly `expected.len()` entries: items cannot be added or removed after seeding.
/// Case text always comes from `expected`; only `passed` and `notes` are taken
/// from the submission, so a snapshot's wording never changes.
pub fn resolve_checklist(
    submitted: Vec<TestCaseResult>,
    expected: &[String],
) -> Result<Vec<TestCaseResult>, FieldErrors> {
    if submitted.is_empty() {
        return Ok(seed_checklist(expected));
    }
    if submitted.len() != expected.len() {
        let mut errors = FieldErrors::new();
        errors.insert(
            "test_cases",
            format!(
                "Expected {} test case results, got {}",
                expected.len(),
                submitted.len()
            ),
        );
        return Err(errors);
    }
    Ok(expected
        .iter()
        .zip(submitted)
        .map(|(text, result)| TestCaseResult {
            test_case: text.clone(),
            passed: result.passed,
            notes: result.notes,
        })
        .collect())
}
