use tracing::debug;

use crate::model::{Category, ListRef, Subcategory, Task, TaskRef, TaskTree, normalize_text};
use crate::ops::drag::DropTarget;

/// Error type for tree operations. Every variant means an index did not
/// resolve against the current tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("category not found: {0}")]
    CategoryNotFound(usize),
    #[error("subcategory not found: {category}/{subcategory}")]
    SubcategoryNotFound { category: usize, subcategory: usize },
    #[error("task not found: {0}")]
    TaskNotFound(TaskRef),
}

/// Whether an operation modified the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged,
}

impl Outcome {
    pub fn is_changed(self) -> bool {
        self == Outcome::Changed
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Owns the task tree and a version counter.
///
/// The version goes up by one for every operation that returns
/// [`Outcome::Changed`], so observers can detect a new tree by comparing
/// versions instead of contents.
#[derive(Debug, Clone, Default)]
pub struct TaskTreeStore {
    tree: TaskTree,
    version: u64,
}

impl TaskTreeStore {
    pub fn new(tree: TaskTree) -> Self {
        TaskTreeStore { tree, version: 0 }
    }

    pub fn tree(&self) -> &TaskTree {
        &self.tree
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Swap in a whole new tree. Always counts as a change.
    pub fn replace(&mut self, tree: TaskTree) {
        self.tree = tree;
        self.version += 1;
    }

    /// Run a mutation against the tree, bumping the version if it changed anything.
    pub fn apply<F>(&mut self, op: F) -> Result<Outcome, TreeError>
    where
        F: FnOnce(&mut TaskTree) -> Result<Outcome, TreeError>,
    {
        let outcome = op(&mut self.tree)?;
        if outcome.is_changed() {
            self.version += 1;
        }
        Ok(outcome)
    }

    pub fn add_category(&mut self, name: &str) -> Result<Outcome, TreeError> {
        self.apply(|tree| Ok(add_category(tree, name)))
    }

    pub fn delete_category(&mut self, index: usize) -> Result<Outcome, TreeError> {
        self.apply(|tree| delete_category(tree, index))
    }

    pub fn rename_category(&mut self, index: usize, name: &str) -> Result<Outcome, TreeError> {
        self.apply(|tree| rename_category(tree, index, name))
    }

    pub fn add_subcategory(&mut self, category: usize, name: &str) -> Result<Outcome, TreeError> {
        self.apply(|tree| add_subcategory(tree, category, name))
    }

    pub fn delete_subcategory(
        &mut self,
        category: usize,
        subcategory: usize,
    ) -> Result<Outcome, TreeError> {
        self.apply(|tree| delete_subcategory(tree, category, subcategory))
    }

    pub fn rename_subcategory(
        &mut self,
        category: usize,
        subcategory: usize,
        name: &str,
    ) -> Result<Outcome, TreeError> {
        self.apply(|tree| rename_subcategory(tree, category, subcategory, name))
    }

    pub fn add_task(&mut self, list: ListRef, text: &str) -> Result<Outcome, TreeError> {
        self.apply(|tree| add_task(tree, list, text))
    }

    pub fn remove_task(&mut self, task: TaskRef) -> Result<Outcome, TreeError> {
        self.apply(|tree| remove_task(tree, task))
    }

    pub fn toggle_task(&mut self, task: TaskRef) -> Result<Outcome, TreeError> {
        self.apply(|tree| toggle_task(tree, task))
    }

    pub fn rename_task(&mut self, task: TaskRef, text: &str) -> Result<Outcome, TreeError> {
        self.apply(|tree| rename_task(tree, task, text))
    }

    pub fn move_task(&mut self, from: TaskRef, to: DropTarget) -> Result<Outcome, TreeError> {
        self.apply(|tree| move_task(tree, from, to))
    }

    pub fn move_category(&mut self, from: usize, to: usize) -> Result<Outcome, TreeError> {
        self.apply(|tree| move_category(tree, from, to))
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

pub fn category(tree: &TaskTree, index: usize) -> Result<&Category, TreeError> {
    tree.categories
        .get(index)
        .ok_or(TreeError::CategoryNotFound(index))
}

fn category_mut(tree: &mut TaskTree, index: usize) -> Result<&mut Category, TreeError> {
    tree.categories
        .get_mut(index)
        .ok_or(TreeError::CategoryNotFound(index))
}

fn subcategory_mut(
    tree: &mut TaskTree,
    category: usize,
    subcategory: usize,
) -> Result<&mut Subcategory, TreeError> {
    category_mut(tree, category)?
        .subcategories
        .get_mut(subcategory)
        .ok_or(TreeError::SubcategoryNotFound {
            category,
            subcategory,
        })
}

/// Resolve a list reference to the tasks it names
pub fn task_list(tree: &TaskTree, list: ListRef) -> Result<&[Task], TreeError> {
    let cat = category(tree, list.category)?;
    match list.subcategory {
        None => Ok(cat.tasks.as_slice()),
        Some(sub) => cat
            .subcategories
            .get(sub)
            .map(|s| s.tasks.as_slice())
            .ok_or(TreeError::SubcategoryNotFound {
                category: list.category,
                subcategory: sub,
            }),
    }
}

fn task_list_mut(tree: &mut TaskTree, list: ListRef) -> Result<&mut Vec<Task>, TreeError> {
    match list.subcategory {
        None => Ok(&mut category_mut(tree, list.category)?.tasks),
        Some(sub) => Ok(&mut subcategory_mut(tree, list.category, sub)?.tasks),
    }
}

/// Resolve a task reference
pub fn task(tree: &TaskTree, task: TaskRef) -> Result<&Task, TreeError> {
    task_list(tree, task.list)?
        .get(task.index)
        .ok_or(TreeError::TaskNotFound(task))
}

fn task_mut(tree: &mut TaskTree, task: TaskRef) -> Result<&mut Task, TreeError> {
    task_list_mut(tree, task.list)?
        .get_mut(task.index)
        .ok_or(TreeError::TaskNotFound(task))
}

/// Direct task count plus the task counts of every subcategory
pub fn total_task_count(category: &Category) -> usize {
    category.total_task_count()
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Append an empty category. Blank names are ignored.
pub fn add_category(tree: &mut TaskTree, name: &str) -> Outcome {
    let Some(name) = normalize_text(name) else {
        debug!("ignoring blank category name");
        return Outcome::Unchanged;
    };
    tree.categories.push(Category::new(name));
    Outcome::Changed
}

/// Remove a category along with its tasks and subcategories
pub fn delete_category(tree: &mut TaskTree, index: usize) -> Result<Outcome, TreeError> {
    category(tree, index)?;
    tree.categories.remove(index);
    Ok(Outcome::Changed)
}

pub fn rename_category(tree: &mut TaskTree, index: usize, name: &str) -> Result<Outcome, TreeError> {
    let cat = category_mut(tree, index)?;
    Ok(set_name(&mut cat.name, name))
}

// ---------------------------------------------------------------------------
// Subcategories
// ---------------------------------------------------------------------------

pub fn add_subcategory(
    tree: &mut TaskTree,
    category: usize,
    name: &str,
) -> Result<Outcome, TreeError> {
    let cat = category_mut(tree, category)?;
    let Some(name) = normalize_text(name) else {
        debug!(category, "ignoring blank subcategory name");
        return Ok(Outcome::Unchanged);
    };
    cat.subcategories.push(Subcategory::new(name));
    Ok(Outcome::Changed)
}

pub fn delete_subcategory(
    tree: &mut TaskTree,
    category: usize,
    subcategory: usize,
) -> Result<Outcome, TreeError> {
    subcategory_mut(tree, category, subcategory)?;
    category_mut(tree, category)?.subcategories.remove(subcategory);
    Ok(Outcome::Changed)
}

pub fn rename_subcategory(
    tree: &mut TaskTree,
    category: usize,
    subcategory: usize,
    name: &str,
) -> Result<Outcome, TreeError> {
    let sub = subcategory_mut(tree, category, subcategory)?;
    Ok(set_name(&mut sub.name, name))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Append an open task to the end of `list`
pub fn add_task(tree: &mut TaskTree, list: ListRef, text: &str) -> Result<Outcome, TreeError> {
    let tasks = task_list_mut(tree, list)?;
    let Some(text) = normalize_text(text) else {
        debug!(%list, "ignoring blank task text");
        return Ok(Outcome::Unchanged);
    };
    tasks.push(Task::new(text));
    Ok(Outcome::Changed)
}

pub fn remove_task(tree: &mut TaskTree, task: TaskRef) -> Result<Outcome, TreeError> {
    let tasks = task_list_mut(tree, task.list)?;
    if task.index >= tasks.len() {
        return Err(TreeError::TaskNotFound(task));
    }
    tasks.remove(task.index);
    Ok(Outcome::Changed)
}

pub fn toggle_task(tree: &mut TaskTree, task: TaskRef) -> Result<Outcome, TreeError> {
    task_mut(tree, task)?.toggle();
    Ok(Outcome::Changed)
}

pub fn rename_task(tree: &mut TaskTree, task: TaskRef, text: &str) -> Result<Outcome, TreeError> {
    let t = task_mut(tree, task)?;
    Ok(set_name(&mut t.text, text))
}

// ---------------------------------------------------------------------------
// Reordering
// ---------------------------------------------------------------------------

/// Move a task to a drop target.
///
/// Dropping on a list appends. Dropping on a task inserts immediately before
/// that task as it stood before the move, in the same list or across lists.
/// All indices are checked before the tree is touched.
pub fn move_task(tree: &mut TaskTree, from: TaskRef, to: DropTarget) -> Result<Outcome, TreeError> {
    let source_len = task_list(tree, from.list)?.len();
    if from.index >= source_len {
        return Err(TreeError::TaskNotFound(from));
    }

    let (target_list, before) = match to {
        DropTarget::List(list) => (list, None),
        DropTarget::Task(target) => (target.list, Some(target.index)),
    };
    let target_len = task_list(tree, target_list)?.len();
    let same_list = target_list == from.list;

    let insert_index = match before {
        Some(b) if b >= target_len => {
            return Err(TreeError::TaskNotFound(target_list.task(b)));
        }
        // Already directly before the target (or is the target)
        Some(b) if same_list && (b == from.index || b == from.index + 1) => {
            return Ok(Outcome::Unchanged);
        }
        // The removal shifts the target down by one
        Some(b) if same_list && from.index < b => Some(b - 1),
        Some(b) => Some(b),
        None if same_list && from.index + 1 == target_len => {
            return Ok(Outcome::Unchanged);
        }
        None => None,
    };

    let moved = task_list_mut(tree, from.list)?.remove(from.index);
    let target = task_list_mut(tree, target_list)?;
    match insert_index {
        Some(i) => target.insert(i, moved),
        None => target.push(moved),
    }
    debug!(%from, %target_list, ?insert_index, "moved task");
    Ok(Outcome::Changed)
}

/// Move the category at `from` so it ends up at index `to`.
///
/// This is remove-then-insert: every category between the two positions
/// shifts by one.
pub fn move_category(tree: &mut TaskTree, from: usize, to: usize) -> Result<Outcome, TreeError> {
    category(tree, from)?;
    category(tree, to)?;
    if from == to {
        return Ok(Outcome::Unchanged);
    }
    let moved = tree.categories.remove(from);
    tree.categories.insert(to, moved);
    debug!(from, to, "moved category");
    Ok(Outcome::Changed)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Replace `slot` with the trimmed `input`, unless it is blank or identical.
fn set_name(slot: &mut String, input: &str) -> Outcome {
    match normalize_text(input) {
        Some(name) if name != *slot => {
            *slot = name;
            Outcome::Changed
        }
        _ => Outcome::Unchanged,
    }
}
