use serde::Serialize;

use crate::model::category::{Category, Subcategory, TaskTree};
use crate::model::position::ListRef;
use crate::model::prefs::Preferences;
use crate::model::task::Task;
use crate::util::unicode::{max_width, pad_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub index: usize,
    pub text: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct SubcategoryJson {
    pub index: usize,
    pub name: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct CategoryJson {
    pub index: usize,
    pub name: String,
    pub total: usize,
    pub completed: usize,
    pub tasks: Vec<TaskJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<SubcategoryJson>,
}

#[derive(Serialize)]
pub struct CountJson {
    pub category: usize,
    pub name: String,
    pub total: usize,
}

#[derive(Serialize)]
pub struct PrefsJson {
    pub theme: String,
    pub layout: String,
}

/// Result of a mutating command
#[derive(Serialize)]
pub struct ChangeJson {
    pub changed: bool,
    pub version: u64,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(index: usize, task: &Task) -> TaskJson {
    TaskJson {
        index,
        text: task.text.clone(),
        completed: task.completed,
    }
}

fn tasks_to_json(tasks: &[Task]) -> Vec<TaskJson> {
    tasks
        .iter()
        .enumerate()
        .map(|(i, t)| task_to_json(i, t))
        .collect()
}

pub fn subcategory_to_json(index: usize, sub: &Subcategory) -> SubcategoryJson {
    SubcategoryJson {
        index,
        name: sub.name.clone(),
        tasks: tasks_to_json(&sub.tasks),
    }
}

pub fn category_to_json(index: usize, cat: &Category) -> CategoryJson {
    CategoryJson {
        index,
        name: cat.name.clone(),
        total: cat.total_task_count(),
        completed: cat.completed_count(),
        tasks: tasks_to_json(&cat.tasks),
        subcategories: cat
            .subcategories
            .iter()
            .enumerate()
            .map(|(i, s)| subcategory_to_json(i, s))
            .collect(),
    }
}

pub fn tree_to_json(tree: &TaskTree) -> Vec<CategoryJson> {
    tree.categories
        .iter()
        .enumerate()
        .map(|(i, c)| category_to_json(i, c))
        .collect()
}

pub fn prefs_to_json(prefs: Preferences) -> PrefsJson {
    PrefsJson {
        theme: prefs.theme.as_str().to_string(),
        layout: prefs.layout.as_str().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Format a task line: `0. [x] text`
pub fn format_task_line(index: usize, task: &Task) -> String {
    format!("{}. [{}] {}", index, task.checkbox_char(), task.text)
}

/// Format the whole tree, one category block after another.
///
/// Category and subcategory names are padded so their counts line up.
pub fn format_tree(tree: &TaskTree) -> Vec<String> {
    if tree.is_empty() {
        return vec!["no categories".to_string()];
    }
    let width = max_width(tree.categories.iter().map(|c| c.name.as_str()));
    let mut lines = Vec::new();
    for (i, cat) in tree.categories.iter().enumerate() {
        lines.push(format!(
            "[{}] {}  {}",
            i,
            pad_to_width(&cat.name, width),
            cat.total_task_count()
        ));
        lines.extend(format_category_body(cat));
    }
    lines
}

fn format_category_body(cat: &Category) -> Vec<String> {
    if cat.is_empty() {
        return vec!["  (empty)".to_string()];
    }
    let mut lines: Vec<String> = cat
        .tasks
        .iter()
        .enumerate()
        .map(|(i, t)| format!("  {}", format_task_line(i, t)))
        .collect();

    let width = max_width(cat.subcategories.iter().map(|s| s.name.as_str()));
    for (i, sub) in cat.subcategories.iter().enumerate() {
        lines.push(format!(
            "  [{}] {}  {}",
            i,
            pad_to_width(&sub.name, width),
            sub.tasks.len()
        ));
        if sub.tasks.is_empty() {
            lines.push("    (empty)".to_string());
        }
        for (j, task) in sub.tasks.iter().enumerate() {
            lines.push(format!("    {}", format_task_line(j, task)));
        }
    }
    lines
}

/// Human label for a task list: `Personal` or `Personal / Errands`.
/// Falls back to the positional form when the list does not exist.
pub fn list_label(tree: &TaskTree, list: ListRef) -> String {
    let Some(cat) = tree.get(list.category) else {
        return list.to_string();
    };
    match list.subcategory {
        None => cat.name.clone(),
        Some(s) => match cat.subcategories.get(s) {
            Some(sub) => format!("{} / {}", cat.name, sub.name),
            None => list.to_string(),
        },
    }
}
