//! Bridges the task tree and display preferences to a [`KeyValueStore`].
//!
//! Reads happen once at startup and never fail: missing, unreadable or
//! corrupt values fall back to defaults. Writes happen after every change.

use serde::{Deserialize, Deserializer};
use tracing::{debug, error, warn};

use crate::io::storage::{KeyValueStore, StorageError};
use crate::model::{
    Category, LayoutMode, Preferences, Subcategory, Task, TaskTree, Theme, normalize_text,
};

/// Serialized tree (JSON array of categories)
pub const TREE_KEY: &str = "categories";
/// Copy of an unparsable tree value, kept for manual recovery
pub const TREE_BACKUP_KEY: &str = "categories.bak";
/// JSON boolean
pub const DARK_MODE_KEY: &str = "darkMode";
/// Raw string, `horizontal` or `grid`
pub const LAYOUT_KEY: &str = "layoutMode";

/// Error type for the write path
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("could not encode tree: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct Persistence<S> {
    storage: S,
    default_categories: Vec<String>,
}

impl<S: KeyValueStore> Persistence<S> {
    /// Default category names are trimmed; blank ones are skipped.
    pub fn new(storage: S, default_categories: Vec<String>) -> Self {
        let default_categories = default_categories
            .iter()
            .filter_map(|name| {
                let normalized = normalize_text(name);
                if normalized.is_none() {
                    warn!(?name, "ignoring blank default category name");
                }
                normalized
            })
            .collect();
        Persistence {
            storage,
            default_categories,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The tree used when nothing usable is stored
    pub fn default_tree(&self) -> TaskTree {
        TaskTree::with_names(self.default_categories.iter().cloned())
    }

    /// Load the tree, falling back to the default tree on any problem.
    ///
    /// An unparsable value is copied to [`TREE_BACKUP_KEY`] before it gets
    /// overwritten by the next save.
    pub fn load_tree(&mut self) -> TaskTree {
        let raw = match self.storage.get(TREE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored tree, using defaults");
                return self.default_tree();
            }
            Err(e) => {
                error!(error = %e, "could not read stored tree, using defaults");
                return self.default_tree();
            }
        };

        match decode_tree(&raw) {
            Ok(tree) => {
                debug!(categories = tree.len(), "loaded tree");
                tree
            }
            Err(e) => {
                error!(error = %e, "stored tree is corrupt, using defaults");
                if let Err(e) = self.storage.set(TREE_BACKUP_KEY, &raw) {
                    warn!(error = %e, "could not back up corrupt tree");
                }
                self.default_tree()
            }
        }
    }

    pub fn save_tree(&mut self, tree: &TaskTree) -> Result<(), PersistError> {
        let encoded = encode_tree(tree)?;
        self.storage.set(TREE_KEY, &encoded)?;
        Ok(())
    }

    /// Load both preferences. Each one defaults on its own.
    pub fn load_preferences(&self) -> Preferences {
        Preferences {
            theme: self.load_theme(),
            layout: self.load_layout(),
        }
    }

    fn load_theme(&self) -> Theme {
        let Some(raw) = self.read_optional(DARK_MODE_KEY) else {
            return Theme::default();
        };
        match serde_json::from_str::<bool>(raw.trim()) {
            Ok(dark) => Theme::from_dark_mode(dark),
            Err(e) => {
                warn!(value = %raw, error = %e, "ignoring unparsable dark mode flag");
                Theme::default()
            }
        }
    }

    fn load_layout(&self) -> LayoutMode {
        let Some(raw) = self.read_optional(LAYOUT_KEY) else {
            return LayoutMode::default();
        };
        raw.trim().parse().unwrap_or_else(|e: String| {
            warn!(error = %e, "ignoring stored layout mode");
            LayoutMode::default()
        })
    }

    fn read_optional(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "could not read preference");
                None
            }
        }
    }

    pub fn save_theme(&mut self, theme: Theme) -> Result<(), PersistError> {
        let encoded = serde_json::to_string(&theme.is_dark())?;
        self.storage.set(DARK_MODE_KEY, &encoded)?;
        Ok(())
    }

    pub fn save_layout(&mut self, layout: LayoutMode) -> Result<(), PersistError> {
        self.storage.set(LAYOUT_KEY, layout.as_str())?;
        Ok(())
    }

    /// Forget the stored tree, its backup and the preferences
    pub fn reset(&mut self) -> Result<(), PersistError> {
        for key in [TREE_KEY, TREE_BACKUP_KEY, DARK_MODE_KEY, LAYOUT_KEY] {
            self.storage.remove(key)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

pub fn encode_tree(tree: &TaskTree) -> Result<String, serde_json::Error> {
    serde_json::to_string(tree)
}

/// Parse a stored tree, coercing older or hand-edited shapes.
///
/// Missing or null `tasks`/`subcategories` become empty lists, bare-string
/// tasks become open tasks, and entries without a usable name or text are
/// dropped. Only a value that is not a JSON array of objects is an error.
pub fn decode_tree(raw: &str) -> Result<TaskTree, serde_json::Error> {
    let records: Vec<CategoryRecord> = serde_json::from_str(raw)?;
    let mut categories = Vec::with_capacity(records.len());

    for (ci, record) in records.into_iter().enumerate() {
        let Some(name) = record.name.as_deref().and_then(normalize_text) else {
            warn!(index = ci, "dropping stored category without a name");
            continue;
        };
        let mut category = Category::new(name);
        category.tasks = migrate_tasks(record.tasks, &category.name);

        for (si, sub) in record.subcategories.into_iter().enumerate() {
            let Some(sub_name) = sub.name.as_deref().and_then(normalize_text) else {
                warn!(category = %category.name, index = si, "dropping stored subcategory without a name");
                continue;
            };
            let mut subcategory = Subcategory::new(sub_name);
            subcategory.tasks = migrate_tasks(sub.tasks, &subcategory.name);
            category.subcategories.push(subcategory);
        }
        categories.push(category);
    }

    Ok(TaskTree::new(categories))
}

fn migrate_tasks(records: Vec<TaskRecord>, owner: &str) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(records.len());
    for (i, record) in records.into_iter().enumerate() {
        let (text, completed) = match record {
            TaskRecord::Full { text, completed } => (text, completed.unwrap_or(false)),
            TaskRecord::Bare(text) => (text, false),
            TaskRecord::Unknown(_) => {
                warn!(owner, index = i, "dropping unrecognized stored task");
                continue;
            }
        };
        match normalize_text(&text) {
            Some(text) => tasks.push(Task { text, completed }),
            None => warn!(owner, index = i, "dropping stored task with blank text"),
        }
    }
    tasks
}

#[derive(Deserialize)]
struct CategoryRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    subcategories: Vec<SubcategoryRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    tasks: Vec<TaskRecord>,
}

#[derive(Deserialize)]
struct SubcategoryRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    tasks: Vec<TaskRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaskRecord {
    Full {
        text: String,
        #[serde(default)]
        completed: Option<bool>,
    },
    Bare(String),
    Unknown(serde::de::IgnoredAny),
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStore;
    use crate::model::TaskRef;
    use crate::ops::tree_ops;
    use pretty_assertions::assert_eq;

    fn persistence() -> Persistence<MemoryStore> {
        Persistence::new(
            MemoryStore::new(),
            vec!["Personal".to_string(), "Work".to_string()],
        )
    }

    fn stored(p: &Persistence<MemoryStore>, key: &str) -> Option<String> {
        p.storage().get(key).unwrap()
    }

    #[test]
    fn missing_tree_loads_defaults() {
        let mut p = persistence();
        let tree = p.load_tree();
        assert_eq!(tree, TaskTree::with_names(["Personal", "Work"]));
        assert!(tree.categories.iter().all(Category::is_empty));
    }

    #[test]
    fn corrupt_tree_loads_defaults_and_backs_up() {
        let mut store = MemoryStore::new();
        store.set(TREE_KEY, "not json {{{").unwrap();
        let mut p = Persistence::new(store, vec!["Inbox".to_string()]);

        let tree = p.load_tree();
        assert_eq!(tree, TaskTree::with_names(["Inbox"]));
        assert_eq!(stored(&p, TREE_BACKUP_KEY).as_deref(), Some("not json {{{"));
    }

    #[test]
    fn non_array_tree_is_corrupt() {
        let mut store = MemoryStore::new();
        store.set(TREE_KEY, r#"{"name":"X"}"#).unwrap();
        let mut p = Persistence::new(store, vec!["Personal".to_string()]);
        assert_eq!(p.load_tree(), TaskTree::with_names(["Personal"]));
    }

    #[test]
    fn round_trip_preserves_structure() {
        let mut tree = TaskTree::with_names(["Home", "Work"]);
        let home = crate::model::ListRef::category(0);
        tree_ops::add_task(&mut tree, home, "Dishes").unwrap();
        tree_ops::add_task(&mut tree, home, "Laundry").unwrap();
        tree_ops::toggle_task(&mut tree, TaskRef::new(0, None, 1)).unwrap();
        tree_ops::add_subcategory(&mut tree, 1, "Reviews").unwrap();
        tree_ops::add_task(&mut tree, crate::model::ListRef::subcategory(1, 0), "PR 12")
            .unwrap();

        let mut p = persistence();
        p.save_tree(&tree).unwrap();
        assert_eq!(p.load_tree(), tree);
    }

    #[test]
    fn encoded_tree_matches_stored_shape() {
        let mut tree = TaskTree::with_names(["A"]);
        tree_ops::add_task(&mut tree, crate::model::ListRef::category(0), "t").unwrap();
        assert_eq!(
            encode_tree(&tree).unwrap(),
            r#"[{"name":"A","subcategories":[],"tasks":[{"text":"t","completed":false}]}]"#
        );
    }

    #[test]
    fn legacy_bare_string_tasks_are_coerced() {
        let tree = decode_tree(r#"[{"name":"X","tasks":["a"]}]"#).unwrap();
        assert_eq!(tree.len(), 1);
        let cat = &tree.categories[0];
        assert_eq!(cat.name, "X");
        assert!(cat.subcategories.is_empty());
        assert_eq!(cat.tasks, vec![Task::new("a")]);
    }

    #[test]
    fn legacy_missing_lists_become_empty() {
        let tree = decode_tree(r#"[{"name":"Only name"},{"name":"Nulls","tasks":null,"subcategories":null}]"#)
            .unwrap();
        assert_eq!(tree, TaskTree::with_names(["Only name", "Nulls"]));
    }

    #[test]
    fn legacy_subcategory_without_tasks() {
        let tree = decode_tree(r#"[{"name":"X","subcategories":[{"name":"S"}]}]"#).unwrap();
        assert_eq!(tree.categories[0].subcategories, vec![Subcategory::new("S")]);
    }

    #[test]
    fn missing_completed_defaults_to_open() {
        let tree = decode_tree(r#"[{"name":"X","tasks":[{"text":"a"},{"text":"b","completed":true}]}]"#)
            .unwrap();
        let tasks = &tree.categories[0].tasks;
        assert!(!tasks[0].completed);
        assert!(tasks[1].completed);
    }

    #[test]
    fn null_completed_defaults_to_open() {
        let tree =
            decode_tree(r#"[{"name":"X","tasks":[{"text":"keep me","completed":null}]}]"#).unwrap();
        assert_eq!(tree.categories[0].tasks, vec![Task::new("keep me")]);
    }

    #[test]
    fn default_names_are_trimmed_and_blanks_skipped() {
        let p = Persistence::new(
            MemoryStore::new(),
            vec!["  Home  ".to_string(), "   ".to_string()],
        );
        assert_eq!(p.default_tree(), TaskTree::with_names(["Home"]));
    }

    #[test]
    fn blank_and_unrecognized_entries_are_dropped() {
        let raw = r#"[
            {"name":"  "},
            {"tasks":[]},
            {"name":" Keep ","tasks":["  ", {"text":" t "}, 42, {"done":true}],
             "subcategories":[{"name":""}, {"name":"S","tasks":[" s "]}]}
        ]"#;
        let tree = decode_tree(raw).unwrap();
        assert_eq!(tree.len(), 1);
        let cat = &tree.categories[0];
        assert_eq!(cat.name, "Keep");
        assert_eq!(cat.tasks, vec![Task::new("t")]);
        assert_eq!(cat.subcategories.len(), 1);
        assert_eq!(cat.subcategories[0].tasks, vec![Task::new("s")]);
    }

    #[test]
    fn preferences_default_when_absent() {
        let p = persistence();
        assert_eq!(p.load_preferences(), Preferences::default());
    }

    #[test]
    fn preferences_round_trip() {
        let mut p = persistence();
        p.save_theme(Theme::Dark).unwrap();
        p.save_layout(LayoutMode::Grid).unwrap();
        assert_eq!(stored(&p, DARK_MODE_KEY).as_deref(), Some("true"));
        assert_eq!(stored(&p, LAYOUT_KEY).as_deref(), Some("grid"));
        assert_eq!(
            p.load_preferences(),
            Preferences {
                theme: Theme::Dark,
                layout: LayoutMode::Grid,
            }
        );
    }

    #[test]
    fn preferences_default_independently() {
        let mut store = MemoryStore::new();
        store.set(DARK_MODE_KEY, "maybe").unwrap();
        store.set(LAYOUT_KEY, "grid").unwrap();
        let p = Persistence::new(store, Vec::new());
        let prefs = p.load_preferences();
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.layout, LayoutMode::Grid);

        let mut store = MemoryStore::new();
        store.set(DARK_MODE_KEY, "true").unwrap();
        store.set(LAYOUT_KEY, "diagonal").unwrap();
        let p = Persistence::new(store, Vec::new());
        let prefs = p.load_preferences();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.layout, LayoutMode::Horizontal);
    }

    #[test]
    fn reset_removes_all_keys() {
        let mut p = persistence();
        p.save_tree(&TaskTree::with_names(["Z"])).unwrap();
        p.save_theme(Theme::Dark).unwrap();
        p.save_layout(LayoutMode::Grid).unwrap();
        p.storage.set(TREE_BACKUP_KEY, "{broken").unwrap();
        p.reset().unwrap();
        assert!(p.storage().is_empty());
        assert_eq!(p.load_tree(), TaskTree::with_names(["Personal", "Work"]));
    }
}
