mod prefs;
pub use prefs::{cmd_layout, cmd_reset, cmd_theme};

use std::error::Error;
use std::path::PathBuf;

use tracing::debug;

use crate::app::App;
use crate::cli::commands::*;
use crate::cli::init_tracing;
use crate::cli::output::*;
use crate::io::config_io::{self, DATA_DIR_ENV};
use crate::io::storage::FileStore;
use crate::model::position::{ListRef, TaskRef};
use crate::model::task::Task;
use crate::ops::drag::DropTarget;
use crate::ops::tree_ops::Outcome;

type CliResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CliResult {
    let json = cli.json;
    let config = config_io::load_config(cli.config.as_deref())?;
    init_tracing(cli.verbose, cli.quiet, config.log.filter.as_deref());

    let data_dir = config_io::resolve_data_dir(
        cli.data_dir.as_deref(),
        std::env::var_os(DATA_DIR_ENV).map(PathBuf::from),
        &config,
    )?;
    debug!(data_dir = %data_dir.display(), "using data directory");
    let storage = FileStore::open(&data_dir)?;
    let mut app = App::open(storage, config.tree.default_categories);

    match cli.command.unwrap_or(Commands::List) {
        // Read commands
        Commands::List => cmd_list(&app, json),
        Commands::Count(args) => cmd_count(&app, args, json),

        // Tree mutations
        Commands::Cat(cmd) => cmd_cat(&mut app, cmd, json),
        Commands::Sub(cmd) => cmd_sub(&mut app, cmd, json),
        Commands::Add(args) => cmd_add(&mut app, args, json),
        Commands::Rm(args) => cmd_rm(&mut app, args, json),
        Commands::Toggle(args) => cmd_toggle(&mut app, args, json),
        Commands::Edit(args) => cmd_edit(&mut app, args, json),
        Commands::Mv(args) => cmd_mv(&mut app, args, json),

        // Preferences
        Commands::Theme(args) => cmd_theme(&mut app, args, json),
        Commands::Layout(args) => cmd_layout(&mut app, args, json),
        Commands::Reset => cmd_reset(&mut app, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type TreeApp = App<FileStore>;

/// Print the result of a mutation: `message` if it changed something,
/// `no change` otherwise.
fn report(app: &TreeApp, outcome: Outcome, message: String, json: bool) -> CliResult {
    if json {
        let out = ChangeJson {
            changed: outcome.is_changed(),
            version: app.version(),
        };
        println!("{}", serde_json::to_string(&out)?);
    } else if outcome.is_changed() {
        println!("{}", message);
    } else {
        println!("no change");
    }
    Ok(())
}

fn category_name(app: &TreeApp, index: usize) -> String {
    app.tree()
        .get(index)
        .map(|c| c.name.clone())
        .unwrap_or_default()
}

fn find_task(app: &TreeApp, task: TaskRef) -> Option<&Task> {
    let cat = app.tree().get(task.list.category)?;
    let tasks = match task.list.subcategory {
        None => &cat.tasks,
        Some(s) => &cat.subcategories.get(s)?.tasks,
    };
    tasks.get(task.index)
}

fn task_text(app: &TreeApp, task: TaskRef) -> String {
    find_task(app, task)
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

fn list_ref(cat: usize, sub: Option<usize>) -> ListRef {
    ListRef {
        category: cat,
        subcategory: sub,
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(app: &TreeApp, json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&tree_to_json(app.tree()))?);
    } else {
        for line in format_tree(app.tree()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_count(app: &TreeApp, args: CountArgs, json: bool) -> CliResult {
    let total = app
        .total_task_count(args.cat)
        .ok_or_else(|| format!("no category at index {}", args.cat))?;
    if json {
        let out = CountJson {
            category: args.cat,
            name: category_name(app, args.cat),
            total,
        };
        println!("{}", serde_json::to_string(&out)?);
    } else {
        println!("{}", total);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Category and subcategory commands
// ---------------------------------------------------------------------------

fn cmd_cat(app: &mut TreeApp, cmd: CatCmd, json: bool) -> CliResult {
    match cmd.action {
        CatAction::Add { name } => {
            let outcome = app.add_category(&name)?;
            let index = app.tree().len().saturating_sub(1);
            let message = format!("added category [{}] {}", index, category_name(app, index));
            report(app, outcome, message, json)
        }
        CatAction::Rm { index } => {
            let name = category_name(app, index);
            let outcome = app.delete_category(index)?;
            report(app, outcome, format!("deleted category {}", name), json)
        }
        CatAction::Rename { index, name } => {
            let old = category_name(app, index);
            let outcome = app.rename_category(index, &name)?;
            let message = format!("renamed category {} -> {}", old, category_name(app, index));
            report(app, outcome, message, json)
        }
        CatAction::Mv { from, to } => {
            let name = category_name(app, from);
            app.pick_up_category(from);
            let outcome = app.drop_category(to)?;
            report(app, outcome, format!("moved category {} to [{}]", name, to), json)
        }
    }
}

fn cmd_sub(app: &mut TreeApp, cmd: SubCmd, json: bool) -> CliResult {
    match cmd.action {
        SubAction::Add { cat, name } => {
            let outcome = app.add_subcategory(cat, &name)?;
            let index = app
                .tree()
                .get(cat)
                .map(|c| c.subcategories.len().saturating_sub(1))
                .unwrap_or_default();
            let label = list_label(app.tree(), ListRef::subcategory(cat, index));
            report(app, outcome, format!("added subcategory [{}] {}", index, label), json)
        }
        SubAction::Rm { cat, sub } => {
            let label = list_label(app.tree(), ListRef::subcategory(cat, sub));
            let outcome = app.delete_subcategory(cat, sub)?;
            report(app, outcome, format!("deleted subcategory {}", label), json)
        }
        SubAction::Rename { cat, sub, name } => {
            let list = ListRef::subcategory(cat, sub);
            let old = list_label(app.tree(), list);
            let outcome = app.rename_subcategory(cat, sub, &name)?;
            let message = format!("renamed subcategory {} -> {}", old, list_label(app.tree(), list));
            report(app, outcome, message, json)
        }
    }
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_add(app: &mut TreeApp, args: AddArgs, json: bool) -> CliResult {
    let list = list_ref(args.cat, args.sub);
    let outcome = app.add_task(list, &args.text)?;
    let message = format!("added task to {}", list_label(app.tree(), list));
    report(app, outcome, message, json)
}

fn cmd_rm(app: &mut TreeApp, args: TaskArgs, json: bool) -> CliResult {
    let task = list_ref(args.cat, args.sub).task(args.task);
    let text = task_text(app, task);
    let outcome = app.remove_task(task)?;
    report(app, outcome, format!("removed: {}", text), json)
}

fn cmd_toggle(app: &mut TreeApp, args: TaskArgs, json: bool) -> CliResult {
    let task = list_ref(args.cat, args.sub).task(args.task);
    let outcome = app.toggle_task(task)?;
    let message = find_task(app, task)
        .map(|t| format_task_line(task.index, t))
        .unwrap_or_default();
    report(app, outcome, message, json)
}

fn cmd_edit(app: &mut TreeApp, args: EditArgs, json: bool) -> CliResult {
    let task = list_ref(args.cat, args.sub).task(args.task);
    let outcome = app.rename_task(task, &args.text)?;
    let message = format!("edited: {}", task_text(app, task));
    report(app, outcome, message, json)
}

fn cmd_mv(app: &mut TreeApp, args: MvArgs, json: bool) -> CliResult {
    let from = list_ref(args.cat, args.sub).task(args.task);
    let dest = match (args.to, args.to_sub) {
        (None, None) => from.list,
        (to, to_sub) => list_ref(to.unwrap_or(args.cat), to_sub),
    };
    let target = match args.before {
        Some(before) => DropTarget::Task(dest.task(before)),
        None => DropTarget::List(dest),
    };
    let text = task_text(app, from);

    app.pick_up_task(from);
    let outcome = app.drop_task(target)?;
    let message = format!("moved {} to {}", text, list_label(app.tree(), dest));
    report(app, outcome, message, json)
}
