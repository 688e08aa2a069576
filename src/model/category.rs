use serde::{Deserialize, Serialize};

use super::task::Task;

/// A named group nested one level under a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub name: String,
    pub tasks: Vec<Task>,
}

impl Subcategory {
    pub fn new(name: impl Into<String>) -> Self {
        Subcategory {
            name: name.into(),
            tasks: Vec::new(),
        }
    }
}

/// A top-level group owning direct tasks and subcategories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub subcategories: Vec<Subcategory>,
    pub tasks: Vec<Task>,
}

impl Category {
    /// Create an empty category
    pub fn new(name: impl Into<String>) -> Self {
        Category {
            name: name.into(),
            subcategories: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Direct tasks plus every subcategory's tasks
    pub fn total_task_count(&self) -> usize {
        self.tasks.len()
            + self
                .subcategories
                .iter()
                .map(|sub| sub.tasks.len())
                .sum::<usize>()
    }

    /// Number of completed tasks, direct and nested
    pub fn completed_count(&self) -> usize {
        let direct = self.tasks.iter().filter(|t| t.completed).count();
        let nested: usize = self
            .subcategories
            .iter()
            .map(|sub| sub.tasks.iter().filter(|t| t.completed).count())
            .sum();
        direct + nested
    }

    /// True when the category has neither tasks nor subcategories
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.subcategories.is_empty()
    }
}

/// The whole persisted domain state: an ordered list of categories.
///
/// Serializes as a bare JSON array so the stored value stays compatible
/// with trees written by earlier versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTree {
    pub categories: Vec<Category>,
}

impl TaskTree {
    pub fn new(categories: Vec<Category>) -> Self {
        TaskTree { categories }
    }

    /// A tree of empty categories with the given names
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TaskTree {
            categories: names.into_iter().map(Category::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    /// Sum of `total_task_count` over all categories
    pub fn total_task_count(&self) -> usize {
        self.categories.iter().map(Category::total_task_count).sum()
    }
}
