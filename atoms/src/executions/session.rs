//! Client-side state of one execution form: task selection, the seeded
//! checklist, live metrics, a stopwatch and the submission it turns into.
//!
//! Nothing here performs I/O. The caller sends the `Submission` and reports
//! back with `complete_submission` once the store accepted it.

use rand::Rng;

use super::model::{
    pass_rate, passed_count, seed_checklist, ExecutionPayload, ExecutionStatus, TestCaseResult,
    TestExecution,
};
use crate::tasks::model::Task;
use crate::validation::FieldErrors;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `TEST-<last 6 digits of epoch millis>-<3 random base-36 chars>`.
/// Readable, not guaranteed unique.
pub fn generate_test_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::rng();
    let suffix: String = (0..3)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format_test_id(millis, &suffix)
}

pub fn format_test_id(epoch_millis: i64, suffix: &str) -> String {
    format!("TEST-{:06}-{}", epoch_millis.rem_euclid(1_000_000), suffix)
}

/// Seconds counter driven by `tick`, once per second while running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stopwatch {
    elapsed_seconds: u64,
    running: bool,
}

impl Stopwatch {
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stops counting; the elapsed time is kept.
    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.elapsed_seconds = 0;
        self.running = false;
    }

    pub fn tick(&mut self) {
        if self.running {
            self.elapsed_seconds += 1;
        }
    }

    /// `MM:SS`; minutes keep growing past 59.
    pub fn format_elapsed(&self) -> String {
        format!("{:02}:{:02}", self.elapsed_seconds / 60, self.elapsed_seconds % 60)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("no test case at index {index} (checklist has {len})")]
pub struct CaseIndexError {
    pub index: usize,
    pub len: usize,
}

/// What a valid session asks the store to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(ExecutionPayload),
    Update {
        execution_id: String,
        payload: ExecutionPayload,
    },
}

#[derive(Debug, Clone)]
pub struct ExecutionSession {
    draft: ExecutionPayload,
    editing: Option<String>,
    stopwatch: Stopwatch,
}

impl Default for ExecutionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionSession {
    /// Blank form for a new execution, with a generated test id.
    pub fn new() -> Self {
        Self {
            draft: ExecutionPayload {
                test_id: generate_test_id(),
                ..ExecutionPayload::default()
            },
            editing: None,
            stopwatch: Stopwatch::default(),
        }
    }

    /// Form loaded from a stored execution. Its test id is kept as is.
    pub fn edit(execution: &TestExecution) -> Self {
        Self {
            draft: ExecutionPayload {
                task_id: execution.task_id.clone(),
                test_id: execution.test_id.clone(),
                tester_name: execution.tester_name.clone(),
                test_cases: execution.test_cases.clone(),
                status: execution.status,
                feedback: execution.feedback.clone(),
                attached_images: execution.attached_images.clone(),
            },
            editing: Some(execution.execution_id.clone()),
            stopwatch: Stopwatch::default(),
        }
    }

    pub fn draft(&self) -> &ExecutionPayload {
        &self.draft
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    /// Replaces the checklist with a fresh copy of `task`'s test cases.
    ///
    /// Any progress on the previous checklist is discarded. New executions
    /// also get a new test id; edits keep theirs.
    pub fn select_task(&mut self, task: &Task) {
        self.draft.task_id = task.task_id.clone();
        self.draft.test_cases = seed_checklist(&task.test_cases);
        if self.editing.is_none() {
            self.draft.test_id = generate_test_id();
        }
    }

    /// True when selecting another task now would throw away checklist input.
    pub fn has_checklist_progress(&self) -> bool {
        self.draft
            .test_cases
            .iter()
            .any(|tc| tc.passed || !tc.notes.is_empty())
    }

    pub fn set_passed(&mut self, index: usize, passed: bool) -> Result<(), CaseIndexError> {
        self.case_mut(index)?.passed = passed;
        Ok(())
    }

    pub fn set_notes(&mut self, index: usize, notes: impl Into<String>) -> Result<(), CaseIndexError> {
        self.case_mut(index)?.notes = notes.into();
        Ok(())
    }

    fn case_mut(&mut self, index: usize) -> Result<&mut TestCaseResult, CaseIndexError> {
        let len = self.draft.test_cases.len();
        self.draft
            .test_cases
            .get_mut(index)
            .ok_or(CaseIndexError { index, len })
    }

    pub fn set_tester_name(&mut self, name: impl Into<String>) {
        self.draft.tester_name = name.into();
    }

    pub fn set_feedback(&mut self, feedback: impl Into<String>) {
        self.draft.feedback = feedback.into();
    }

    /// Only editable while creating; an edit keeps the stored id.
    pub fn set_test_id(&mut self, test_id: impl Into<String>) {
        if self.editing.is_none() {
            self.draft.test_id = test_id.into();
        }
    }

    /// Any status may be chosen at any time.
    pub fn set_status(&mut self, status: ExecutionStatus) {
        self.draft.status = status;
    }

    pub fn set_attached_images(&mut self, images: Vec<String>) {
        self.draft.attached_images = images;
    }

    pub fn passed_count(&self) -> usize {
        passed_count(&self.draft.test_cases)
    }

    pub fn total_count(&self) -> usize {
        self.draft.test_cases.len()
    }

    pub fn pass_rate(&self) -> f64 {
        pass_rate(&self.draft.test_cases)
    }

    /// Starting the clock on a pending execution marks it in progress.
    pub fn start_timer(&mut self) {
        if !self.stopwatch.is_running() && self.draft.status == ExecutionStatus::Pending {
            self.draft.status = ExecutionStatus::InProgress;
        }
        self.stopwatch.start();
    }

    pub fn pause_timer(&mut self) {
        self.stopwatch.pause();
    }

    pub fn toggle_timer(&mut self) {
        if self.stopwatch.is_running() {
            self.pause_timer();
        } else {
            self.start_timer();
        }
    }

    pub fn reset_timer(&mut self) {
        self.stopwatch.reset();
    }

    pub fn tick(&mut self) {
        self.stopwatch.tick();
    }

    pub fn validate(&self) -> FieldErrors {
        self.draft.validate()
    }

    /// The trimmed create or update request, or the field errors blocking it.
    pub fn submission(&self) -> Result<Submission, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let payload = self.draft.clone().trimmed();
        Ok(match &self.editing {
            Some(execution_id) => Submission::Update {
                execution_id: execution_id.clone(),
                payload,
            },
            None => Submission::Create(payload),
        })
    }

    /// Called once the store accepted the submission. A create clears the
    /// form for the next run; an edit leaves it untouched.
    pub fn complete_submission(&mut self) {
        if self.editing.is_none() {
            *self = Self::new();
        }
    }
}
