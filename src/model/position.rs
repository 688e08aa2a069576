//! Positional references into a [`TaskTree`](super::TaskTree).
//!
//! Entities have no stable id: a category is its index in the tree, a task is
//! its index in the list that holds it. Reordering a list changes the identity
//! of everything after the moved element.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Names one task list: a category's direct tasks, or one of its subcategories'
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListRef {
    pub category: usize,
    pub subcategory: Option<usize>,
}

impl ListRef {
    /// The direct task list of a category
    pub fn category(category: usize) -> Self {
        ListRef {
            category,
            subcategory: None,
        }
    }

    /// The task list of a subcategory
    pub fn subcategory(category: usize, subcategory: usize) -> Self {
        ListRef {
            category,
            subcategory: Some(subcategory),
        }
    }

    pub fn task(self, index: usize) -> TaskRef {
        TaskRef { list: self, index }
    }
}

impl fmt::Display for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subcategory {
            Some(sub) => write!(f, "{}/{}", self.category, sub),
            None => write!(f, "{}", self.category),
        }
    }
}

/// Names one task by its list and its index in that list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRef {
    pub list: ListRef,
    pub index: usize,
}

impl TaskRef {
    pub fn new(category: usize, subcategory: Option<usize>, index: usize) -> Self {
        TaskRef {
            list: ListRef {
                category,
                subcategory,
            },
            index,
        }
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.list, self.index)
    }
}
