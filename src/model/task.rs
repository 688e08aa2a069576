use serde::{Deserialize, Serialize};

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task text, always trimmed and non-empty
    pub text: String,
    /// Whether the checkbox is ticked
    pub completed: bool,
}

impl Task {
    /// Create an open task. The caller is responsible for trimming `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Task {
            text: text.into(),
            completed: false,
        }
    }

    /// Flip the completed flag
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// The character shown inside the checkbox `[ ]`
    pub fn checkbox_char(&self) -> char {
        if self.completed { 'x' } else { ' ' }
    }
}

/// Trim `input` and return it only if something is left.
///
/// Every name and task text in the tree goes through this before it is stored.
pub fn normalize_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_is_open() {
        let task = Task::new("Buy milk");
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.checkbox_char(), ' ');
    }

    #[test]
    fn toggle_flips_completed() {
        let mut task = Task::new("Buy milk");
        task.toggle();
        assert!(task.completed);
        assert_eq!(task.checkbox_char(), 'x');
        task.toggle();
        assert!(!task.completed);
    }

    #[test]
    fn normalize_trims_and_rejects_blank() {
        assert_eq!(normalize_text("  hello  ").as_deref(), Some("hello"));
        assert_eq!(normalize_text("   "), None);
        assert_eq!(normalize_text(""), None);
        assert_eq!(normalize_text("\t\n"), None);
    }
}
