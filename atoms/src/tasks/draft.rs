use serde::{Deserialize, Serialize};

use super::model::{Task, TaskPayload};
use crate::validation::FieldErrors;

/// Editable task form state.
///
/// `test_cases` may hold blank slots while the user is typing; they are
/// dropped by `into_payload`. The list always keeps at least one slot.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TaskDraft {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "one_blank_slot")]
    pub test_cases: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub attached_images: Vec<String>,
}

fn one_blank_slot() -> Vec<String> {
    vec![String::new()]
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            description: String::new(),
            test_cases: one_blank_slot(),
            notes: String::new(),
            attached_images: Vec::new(),
        }
    }
}

impl TaskDraft {
    /// Loads an existing task for editing.
    pub fn from_task(task: &Task) -> Self {
        Self {
            tags: task.tags.clone(),
            description: task.description.clone(),
            test_cases: if task.test_cases.is_empty() {
                one_blank_slot()
            } else {
                task.test_cases.clone()
            },
            notes: task.notes.clone(),
            attached_images: task.attached_images.clone(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.tags.iter().all(|t| t.trim().is_empty()) {
            errors.insert("tags", "At least one tag is required");
        }

        errors.require_text("description", &self.description, "Description is required");

        if self.test_cases.iter().all(|tc| tc.trim().is_empty()) {
            errors.insert("test_cases", "At least one test case is required");
        }

        errors
    }

    pub fn add_test_case(&mut self) {
        self.test_cases.push(String::new());
    }

    /// Returns false when `index` is out of range.
    pub fn set_test_case(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.test_cases.get_mut(index) {
            Some(slot) => {
                *slot = text.into();
                true
            }
            None => false,
        }
    }

    /// No-op when only one slot is left or `index` is out of range.
    pub fn remove_test_case(&mut self, index: usize) -> bool {
        if self.test_cases.len() <= 1 || index >= self.test_cases.len() {
            return false;
        }
        self.test_cases.remove(index);
        true
    }

    /// Trimmed content with blank test cases and tags stripped.
    pub fn into_payload(self) -> TaskPayload {
        TaskPayload {
            tags: non_blank(self.tags),
            description: self.description.trim().to_string(),
            test_cases: non_blank(self.test_cases),
            notes: self.notes.trim().to_string(),
            attached_images: self.attached_images,
        }
    }

    /// Blank form shown after a successful create.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> TaskDraft {
        TaskDraft {
            tags: vec!["smoke".into()],
            description: "Login flow".into(),
            test_cases: vec!["Valid login".into(), "Invalid password".into()],
            ..TaskDraft::default()
        }
    }

    #[test]
    fn valid_draft_has_no_errors() {
        assert!(valid_draft().validate().is_empty());
    }

    #[test]
    fn every_rule_reports_its_own_message() {
        let draft = TaskDraft {
            tags: vec![],
            description: "   ".into(),
            test_cases: vec!["".into(), "  ".into()],
            ..TaskDraft::default()
        };
        let errors = draft.validate();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("tags"), Some("At least one tag is required"));
        assert_eq!(errors.get("description"), Some("Description is required"));
        assert_eq!(errors.get("test_cases"), Some("At least one test case is required"));
    }

    #[test]
    fn one_filled_slot_among_blanks_is_enough() {
        let mut draft = valid_draft();
        draft.test_cases = vec!["".into(), "Only real case".into(), " ".into()];
        assert!(draft.validate().is_empty());

        let payload = draft.into_payload();
        assert_eq!(payload.test_cases, vec!["Only real case".to_string()]);
    }

    #[test]
    fn payload_is_trimmed() {
        let mut draft = valid_draft();
        draft.description = "  Login flow \n".into();
        draft.tags = vec![" smoke ".into(), "".into(), "auth".into()];

        let payload = draft.into_payload();
        assert_eq!(payload.description, "Login flow");
        assert_eq!(payload.tags, vec!["smoke".to_string(), "auth".to_string()]);
    }

    #[test]
    fn slot_editing() {
        let mut draft = TaskDraft::default();
        assert_eq!(draft.test_cases.len(), 1);

        draft.add_test_case();
        assert!(draft.set_test_case(1, "Second"));
        assert!(!draft.set_test_case(5, "Nowhere"));
        assert_eq!(draft.test_cases, vec!["".to_string(), "Second".to_string()]);

        assert!(draft.remove_test_case(0));
        assert_eq!(draft.test_cases, vec!["Second".to_string()]);

        // The last slot can never be removed.
        assert!(!draft.remove_test_case(0));
        assert_eq!(draft.test_cases.len(), 1);
    }

    #[test]
    fn missing_json_fields_default_to_empty_form() {
        let draft: TaskDraft = serde_json::from_str("{}").unwrap();
        assert_eq!(draft, TaskDraft::default());
        assert_eq!(draft.validate().len(), 3);
    }

    #[test]
    fn edit_target_with_empty_checklist_shows_one_slot() {
        let task = Task {
            task_id: "t".into(),
            tags: vec!["a".into()],
            description: "d".into(),
            test_cases: vec![],
            notes: String::new(),
            attached_images: vec![],
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(TaskDraft::from_task(&task).test_cases, vec![String::new()]);
    }

    #[test]
    fn reset_returns_to_blank_form() {
        let mut draft = valid_draft();
        draft.reset();
        assert_eq!(draft, TaskDraft::default());
    }
}
