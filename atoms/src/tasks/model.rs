use serde::{Deserialize, Serialize};

/// Task domain model - a tagged description with its canonical test checklist
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub task_id: String,
    pub tags: Vec<String>,
    pub description: String,

    /// Checklist copied into every execution created against this task
    pub test_cases: Vec<String>,

    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub attached_images: Vec<String>,

    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    /// Case-insensitive match on the description or any tag.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.description.to_lowercase().contains(&term)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
    }
}

/// Normalised task content, ready to persist. Produced by `TaskDraft::into_payload`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TaskPayload {
    pub tags: Vec<String>,
    pub description: String,
    pub test_cases: Vec<String>,
    pub notes: String,
    pub attached_images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(description: &str, tags: &[&str]) -> Task {
        Task {
            task_id: "t-1".into(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            description: description.into(),
            test_cases: vec!["case".into()],
            notes: String::new(),
            attached_images: vec![],
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn search_matches_description_or_tag() {
        let t = task("Login flow", &["Smoke", "auth"]);
        assert!(t.matches_search("login"));
        assert!(t.matches_search("SMOKE"));
        assert!(t.matches_search("Aut"));
        assert!(t.matches_search("  "));
        assert!(!t.matches_search("checkout"));
    }
}
