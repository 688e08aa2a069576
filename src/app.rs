//! Application context: the one owner of the tree, the preferences, the
//! in-flight drag and the in-progress edit.
//!
//! Every mutation goes through here so the save-on-change hook can't be
//! skipped. Bad indices never surface as errors at this level: they are
//! logged and reported as [`Outcome::Unchanged`]. Only storage failures
//! propagate.

use tracing::{debug, info, warn};

use crate::io::persist::{PersistError, Persistence};
use crate::io::storage::KeyValueStore;
use crate::model::{LayoutMode, ListRef, Preferences, TaskRef, TaskTree, Theme};
use crate::ops::drag::{DragSession, DropTarget, Removal};
use crate::ops::tree_ops::{Outcome, TaskTreeStore, TreeError};

/// The entity whose name is being edited inline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Category(usize),
    Subcategory { category: usize, subcategory: usize },
    Task(TaskRef),
}

pub struct App<S> {
    store: TaskTreeStore,
    prefs: Preferences,
    drag: DragSession,
    editing: Option<EditTarget>,
    persistence: Persistence<S>,
}

impl<S: KeyValueStore> App<S> {
    /// Load state from `storage`. Never fails; bad data falls back to defaults.
    pub fn open(storage: S, default_categories: Vec<String>) -> Self {
        let mut persistence = Persistence::new(storage, default_categories);
        let tree = persistence.load_tree();
        let prefs = persistence.load_preferences();
        info!(
            categories = tree.len(),
            tasks = tree.total_task_count(),
            theme = %prefs.theme,
            layout = %prefs.layout,
            "loaded state"
        );
        App {
            store: TaskTreeStore::new(tree),
            prefs,
            drag: DragSession::new(),
            editing: None,
            persistence,
        }
    }

    pub fn tree(&self) -> &TaskTree {
        self.store.tree()
    }

    /// Increments on every change to the tree
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn editing(&self) -> Option<EditTarget> {
        self.editing
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Total tasks in a category, or `None` if the index is out of range
    pub fn total_task_count(&self, category: usize) -> Option<usize> {
        self.tree().get(category).map(|c| c.total_task_count())
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub fn add_category(&mut self, name: &str) -> Result<Outcome, PersistError> {
        let result = self.store.add_category(name);
        self.commit("add category", result)
    }

    pub fn delete_category(&mut self, index: usize) -> Result<Outcome, PersistError> {
        let result = self.store.delete_category(index);
        self.after_removal(&result, Removal::Category(index));
        self.commit("delete category", result)
    }

    /// Leaves edit mode even when the new name is rejected
    pub fn rename_category(&mut self, index: usize, name: &str) -> Result<Outcome, PersistError> {
        self.editing = None;
        let result = self.store.rename_category(index, name);
        self.commit("rename category", result)
    }

    // -----------------------------------------------------------------------
    // Subcategories
    // -----------------------------------------------------------------------

    pub fn add_subcategory(&mut self, category: usize, name: &str) -> Result<Outcome, PersistError> {
        let result = self.store.add_subcategory(category, name);
        self.commit("add subcategory", result)
    }

    pub fn delete_subcategory(
        &mut self,
        category: usize,
        subcategory: usize,
    ) -> Result<Outcome, PersistError> {
        let result = self.store.delete_subcategory(category, subcategory);
        self.after_removal(
            &result,
            Removal::Subcategory {
                category,
                subcategory,
            },
        );
        self.commit("delete subcategory", result)
    }

    pub fn rename_subcategory(
        &mut self,
        category: usize,
        subcategory: usize,
        name: &str,
    ) -> Result<Outcome, PersistError> {
        self.editing = None;
        let result = self.store.rename_subcategory(category, subcategory, name);
        self.commit("rename subcategory", result)
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn add_task(&mut self, list: ListRef, text: &str) -> Result<Outcome, PersistError> {
        let result = self.store.add_task(list, text);
        self.commit("add task", result)
    }

    pub fn remove_task(&mut self, task: TaskRef) -> Result<Outcome, PersistError> {
        let result = self.store.remove_task(task);
        self.after_removal(&result, Removal::Task(task));
        self.commit("remove task", result)
    }

    pub fn toggle_task(&mut self, task: TaskRef) -> Result<Outcome, PersistError> {
        let result = self.store.toggle_task(task);
        self.commit("toggle task", result)
    }

    pub fn rename_task(&mut self, task: TaskRef, text: &str) -> Result<Outcome, PersistError> {
        self.editing = None;
        let result = self.store.rename_task(task, text);
        self.commit("rename task", result)
    }

    // -----------------------------------------------------------------------
    // Inline editing
    // -----------------------------------------------------------------------

    pub fn begin_edit(&mut self, target: EditTarget) {
        self.editing = Some(target);
    }

    /// Discard the edit, keeping the committed name
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    // -----------------------------------------------------------------------
    // Drag and drop
    // -----------------------------------------------------------------------

    pub fn pick_up_task(&mut self, task: TaskRef) {
        self.drag.pick_up_task(task);
    }

    pub fn pick_up_category(&mut self, index: usize) {
        self.drag.pick_up_category(index);
    }

    pub fn cancel_drag(&mut self) {
        if let Some(held) = self.drag.cancel() {
            debug!(?held, "drag abandoned");
        }
    }

    pub fn drop_task(&mut self, target: DropTarget) -> Result<Outcome, PersistError> {
        let result = self.drag.drop_task(&mut self.store, target);
        self.after_move(&result);
        self.commit("drop task", result)
    }

    pub fn drop_category(&mut self, target: usize) -> Result<Outcome, PersistError> {
        let result = self.drag.drop_category(&mut self.store, target);
        self.after_move(&result);
        self.commit("drop category", result)
    }

    // -----------------------------------------------------------------------
    // Preferences
    // -----------------------------------------------------------------------

    /// Returns true if the theme changed (and was saved)
    pub fn set_theme(&mut self, theme: Theme) -> Result<bool, PersistError> {
        if self.prefs.theme == theme {
            return Ok(false);
        }
        self.prefs.theme = theme;
        self.persistence.save_theme(theme)?;
        Ok(true)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, PersistError> {
        let theme = self.prefs.theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Returns true if the layout changed (and was saved)
    pub fn set_layout(&mut self, layout: LayoutMode) -> Result<bool, PersistError> {
        if self.prefs.layout == layout {
            return Ok(false);
        }
        self.prefs.layout = layout;
        self.persistence.save_layout(layout)?;
        Ok(true)
    }

    pub fn toggle_layout(&mut self) -> Result<LayoutMode, PersistError> {
        let layout = self.prefs.layout.toggled();
        self.set_layout(layout)?;
        Ok(layout)
    }

    /// Drop all stored state and go back to the default tree and preferences
    pub fn reset(&mut self) -> Result<(), PersistError> {
        self.persistence.reset()?;
        let tree = self.persistence.default_tree();
        self.store.replace(tree);
        self.prefs = Preferences::default();
        self.drag.cancel();
        self.editing = None;
        info!("state reset to defaults");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Hooks
    // -----------------------------------------------------------------------

    fn after_removal(&mut self, result: &Result<Outcome, TreeError>, removal: Removal) {
        if matches!(result, Ok(Outcome::Changed)) {
            self.drag.on_removed(removal);
            self.editing = None;
        }
    }

    /// Positions shift on a reorder, so an edit target can't be carried over
    fn after_move(&mut self, result: &Result<Outcome, TreeError>) {
        if matches!(result, Ok(Outcome::Changed)) {
            self.editing = None;
        }
    }

    /// Save on change, and turn index errors into logged no-ops.
    fn commit(
        &mut self,
        action: &'static str,
        result: Result<Outcome, TreeError>,
    ) -> Result<Outcome, PersistError> {
        match result {
            Ok(Outcome::Changed) => {
                debug!(action, version = self.store.version(), "saving tree");
                self.persistence.save_tree(self.store.tree())?;
                Ok(Outcome::Changed)
            }
            Ok(Outcome::Unchanged) => {
                debug!(action, "nothing changed");
                Ok(Outcome::Unchanged)
            }
            Err(e) => {
                warn!(action, error = %e, "ignored");
                Ok(Outcome::Unchanged)
            }
        }
    }
}
