//! Move-by-drag for tasks and categories.
//!
//! A drag is a two-step gesture: pick something up, then drop it somewhere.
//! Between the two steps the session holds a positional [`DragRef`]. Any
//! delete that happens while something is held must be reported through
//! [`DragSession::on_removed`] so the reference keeps pointing at the same
//! entity, or is dropped when that entity is gone.

use tracing::debug;

use crate::model::{ListRef, TaskRef};
use crate::ops::tree_ops::{Outcome, TaskTreeStore, TreeError};

/// The thing currently being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRef {
    Task(TaskRef),
    Category(usize),
}

/// Where a dragged task is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Empty space in a list: append to the end
    List(ListRef),
    /// A specific task: insert immediately before it
    Task(TaskRef),
}

/// A structural delete that may invalidate a held reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Category(usize),
    Subcategory { category: usize, subcategory: usize },
    Task(TaskRef),
}

#[derive(Debug, Clone, Default)]
pub struct DragSession {
    current: Option<DragRef>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<DragRef> {
        self.current
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn pick_up_task(&mut self, task: TaskRef) {
        debug!(%task, "picked up task");
        self.current = Some(DragRef::Task(task));
    }

    pub fn pick_up_category(&mut self, index: usize) {
        debug!(index, "picked up category");
        self.current = Some(DragRef::Category(index));
    }

    /// Abandon the drag without touching the tree
    pub fn cancel(&mut self) -> Option<DragRef> {
        self.current.take()
    }

    /// Release the held task over `target`.
    ///
    /// The reference is cleared whether or not the move changed anything. A
    /// reference that no longer resolves comes back as `Err` with the tree
    /// untouched. If no task is held (nothing, or a category) this is a no-op
    /// and the held reference is kept.
    pub fn drop_task(
        &mut self,
        store: &mut TaskTreeStore,
        target: DropTarget,
    ) -> Result<Outcome, TreeError> {
        let Some(DragRef::Task(source)) = self.current else {
            debug!(?target, "task drop with no task held");
            return Ok(Outcome::Unchanged);
        };
        self.current = None;
        store.move_task(source, target)
    }

    /// Release the held category over the category at `target`.
    ///
    /// Same clearing rules as [`drop_task`](Self::drop_task).
    pub fn drop_category(
        &mut self,
        store: &mut TaskTreeStore,
        target: usize,
    ) -> Result<Outcome, TreeError> {
        let Some(DragRef::Category(source)) = self.current else {
            debug!(target, "category drop with no category held");
            return Ok(Outcome::Unchanged);
        };
        self.current = None;
        store.move_category(source, target)
    }

    /// Adjust or clear the held reference after something was deleted.
    pub fn on_removed(&mut self, removal: Removal) {
        let Some(held) = self.current else {
            return;
        };
        let adjusted = match held {
            DragRef::Category(index) => match removal {
                Removal::Category(r) => shift_past(index, r).map(DragRef::Category),
                _ => Some(held),
            },
            DragRef::Task(task) => adjust_task_ref(task, removal).map(DragRef::Task),
        };
        if adjusted.is_none() {
            debug!(?held, ?removal, "held item was deleted, drag cleared");
        }
        self.current = adjusted;
    }
}

fn adjust_task_ref(mut task: TaskRef, removal: Removal) -> Option<TaskRef> {
    match removal {
        Removal::Category(r) => {
            task.list.category = shift_past(task.list.category, r)?;
        }
        Removal::Subcategory {
            category,
            subcategory,
        } => {
            if task.list.category == category
                && let Some(sub) = task.list.subcategory
            {
                task.list.subcategory = Some(shift_past(sub, subcategory)?);
            }
        }
        Removal::Task(r) => {
            if r.list == task.list {
                task.index = shift_past(task.index, r.index)?;
            }
        }
    }
    Some(task)
}

/// New position of `index` after the element at `removed` left the same
/// sequence, or `None` if `index` was the one removed.
fn shift_past(index: usize, removed: usize) -> Option<usize> {
    if index == removed {
        None
    } else if removed < index {
        Some(index - 1)
    } else {
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskTree;
    use pretty_assertions::assert_eq;

    fn texts(store: &TaskTreeStore, list: ListRef) -> Vec<String> {
        crate::ops::tree_ops::task_list(store.tree(), list)
            .unwrap()
            .iter()
            .map(|t| t.text.clone())
            .collect()
    }

    fn two_lists() -> TaskTreeStore {
        let mut store = TaskTreeStore::new(TaskTree::with_names(["A", "B"]));
        store.add_task(ListRef::category(0), "t1").unwrap();
        store.add_task(ListRef::category(0), "t2").unwrap();
        store
    }

    #[test]
    fn drop_on_empty_list_appends_and_clears() {
        let mut store = two_lists();
        let mut drag = DragSession::new();

        drag.pick_up_task(TaskRef::new(0, None, 0));
        assert!(drag.is_active());

        let outcome = drag
            .drop_task(&mut store, DropTarget::List(ListRef::category(1)))
            .unwrap();
        assert_eq!(outcome, Outcome::Changed);
        assert_eq!(texts(&store, ListRef::category(0)), vec!["t2"]);
        assert_eq!(texts(&store, ListRef::category(1)), vec!["t1"]);
        assert_eq!(drag.current(), None);
    }

    #[test]
    fn drop_on_task_inserts_before_it() {
        let mut store = TaskTreeStore::new(TaskTree::with_names(["A"]));
        for t in ["t1", "t2", "t3"] {
            store.add_task(ListRef::category(0), t).unwrap();
        }
        let mut drag = DragSession::new();
        drag.pick_up_task(TaskRef::new(0, None, 2));
        drag.drop_task(&mut store, DropTarget::Task(TaskRef::new(0, None, 0)))
            .unwrap();
        assert_eq!(texts(&store, ListRef::category(0)), vec!["t3", "t1", "t2"]);
    }

    #[test]
    fn noop_drop_still_clears_reference() {
        let mut store = two_lists();
        let version = store.version();
        let mut drag = DragSession::new();
        let src = TaskRef::new(0, None, 0);
        drag.pick_up_task(src);
        let outcome = drag.drop_task(&mut store, DropTarget::Task(src)).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(store.version(), version);
        assert!(!drag.is_active());
    }

    #[test]
    fn category_drop_reorders() {
        let mut store = TaskTreeStore::new(TaskTree::with_names(["A", "B", "C"]));
        let mut drag = DragSession::new();

        drag.pick_up_category(2);
        drag.drop_category(&mut store, 0).unwrap();
        let names: Vec<&str> = store
            .tree()
            .categories
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert!(!drag.is_active());
    }

    #[test]
    fn category_dropped_on_itself_is_unchanged() {
        let mut store = TaskTreeStore::new(TaskTree::with_names(["A", "B", "C"]));
        let mut drag = DragSession::new();
        drag.pick_up_category(0);
        assert_eq!(drag.drop_category(&mut store, 0).unwrap(), Outcome::Unchanged);
        assert_eq!(store.version(), 0);
        assert!(!drag.is_active());
    }

    #[test]
    fn mismatched_drop_keeps_reference() {
        let mut store = two_lists();
        let mut drag = DragSession::new();

        drag.pick_up_category(1);
        let outcome = drag
            .drop_task(&mut store, DropTarget::List(ListRef::category(0)))
            .unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(drag.current(), Some(DragRef::Category(1)));

        drag.pick_up_task(TaskRef::new(0, None, 1));
        assert_eq!(drag.drop_category(&mut store, 0).unwrap(), Outcome::Unchanged);
        assert_eq!(drag.current(), Some(DragRef::Task(TaskRef::new(0, None, 1))));
    }

    #[test]
    fn drop_with_nothing_held_is_noop() {
        let mut store = two_lists();
        let mut drag = DragSession::new();
        assert_eq!(
            drag.drop_task(&mut store, DropTarget::List(ListRef::category(1)))
                .unwrap(),
            Outcome::Unchanged
        );
        assert_eq!(drag.drop_category(&mut store, 1).unwrap(), Outcome::Unchanged);
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn stale_reference_is_rejected_and_cleared() {
        let mut store = two_lists();
        let mut drag = DragSession::new();
        drag.pick_up_task(TaskRef::new(0, None, 1));

        // Deleted behind the session's back, without notification
        store.remove_task(TaskRef::new(0, None, 1)).unwrap();
        let before = store.tree().clone();

        let result = drag.drop_task(&mut store, DropTarget::List(ListRef::category(1)));
        assert!(result.is_err());
        assert_eq!(store.tree(), &before);
        assert!(!drag.is_active());
    }

    #[test]
    fn cancel_clears() {
        let mut drag = DragSession::new();
        drag.pick_up_category(3);
        assert_eq!(drag.cancel(), Some(DragRef::Category(3)));
        assert!(!drag.is_active());
        assert_eq!(drag.cancel(), None);
    }

    // --- Invalidation ---

    #[test]
    fn removing_held_category_clears() {
        let mut drag = DragSession::new();
        drag.pick_up_category(1);
        drag.on_removed(Removal::Category(1));
        assert_eq!(drag.current(), None);
    }

    #[test]
    fn removing_earlier_category_shifts_held_category() {
        let mut drag = DragSession::new();
        drag.pick_up_category(2);
        drag.on_removed(Removal::Category(0));
        assert_eq!(drag.current(), Some(DragRef::Category(1)));
        drag.on_removed(Removal::Category(4));
        assert_eq!(drag.current(), Some(DragRef::Category(1)));
    }

    #[test]
    fn removing_parent_category_clears_held_task() {
        let mut drag = DragSession::new();
        drag.pick_up_task(TaskRef::new(1, Some(0), 2));
        drag.on_removed(Removal::Category(1));
        assert_eq!(drag.current(), None);
    }

    #[test]
    fn removing_earlier_category_shifts_held_task() {
        let mut drag = DragSession::new();
        drag.pick_up_task(TaskRef::new(2, None, 0));
        drag.on_removed(Removal::Category(1));
        assert_eq!(drag.current(), Some(DragRef::Task(TaskRef::new(1, None, 0))));
    }

    #[test]
    fn removing_subcategory_clears_or_shifts_held_task() {
        let mut drag = DragSession::new();
        drag.pick_up_task(TaskRef::new(0, Some(2), 1));
        drag.on_removed(Removal::Subcategory {
            category: 0,
            subcategory: 0,
        });
        assert_eq!(drag.current(), Some(DragRef::Task(TaskRef::new(0, Some(1), 1))));

        // A subcategory in another category is unrelated
        drag.on_removed(Removal::Subcategory {
            category: 1,
            subcategory: 1,
        });
        assert_eq!(drag.current(), Some(DragRef::Task(TaskRef::new(0, Some(1), 1))));

        drag.on_removed(Removal::Subcategory {
            category: 0,
            subcategory: 1,
        });
        assert_eq!(drag.current(), None);
    }

    #[test]
    fn removing_subcategory_leaves_direct_task_alone() {
        let mut drag = DragSession::new();
        drag.pick_up_task(TaskRef::new(0, None, 1));
        drag.on_removed(Removal::Subcategory {
            category: 0,
            subcategory: 0,
        });
        assert_eq!(drag.current(), Some(DragRef::Task(TaskRef::new(0, None, 1))));
    }

    #[test]
    fn removing_tasks_in_same_list() {
        let mut drag = DragSession::new();
        drag.pick_up_task(TaskRef::new(0, None, 2));

        // Different list: untouched
        drag.on_removed(Removal::Task(TaskRef::new(0, Some(0), 0)));
        assert_eq!(drag.current(), Some(DragRef::Task(TaskRef::new(0, None, 2))));

        drag.on_removed(Removal::Task(TaskRef::new(0, None, 0)));
        assert_eq!(drag.current(), Some(DragRef::Task(TaskRef::new(0, None, 1))));

        drag.on_removed(Removal::Task(TaskRef::new(0, None, 1)));
        assert_eq!(drag.current(), None);
    }

    #[test]
    fn notified_removal_keeps_drag_pointing_at_same_task() {
        let mut store = two_lists();
        let mut drag = DragSession::new();
        drag.pick_up_task(TaskRef::new(0, None, 1)); // t2

        let removed = TaskRef::new(0, None, 0);
        store.remove_task(removed).unwrap();
        drag.on_removed(Removal::Task(removed));

        drag.drop_task(&mut store, DropTarget::List(ListRef::category(1)))
            .unwrap();
        assert!(texts(&store, ListRef::category(0)).is_empty());
        assert_eq!(texts(&store, ListRef::category(1)), vec!["t2"]);
    }
}
