use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "tt", about = concat!("tasktree v", env!("CARGO_PKG_VERSION"), " - categories, subcategories and checklists"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the stored tree and preferences
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: <config dir>/tasktree/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output (-q errors only, -qq nothing)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true, conflicts_with = "verbose")]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show every category, subcategory and task (default)
    List,
    /// Category management
    Cat(CatCmd),
    /// Subcategory management
    Sub(SubCmd),
    /// Add a task to a category, or to one of its subcategories
    Add(AddArgs),
    /// Remove a task
    Rm(TaskArgs),
    /// Toggle a task's completed flag
    Toggle(TaskArgs),
    /// Change a task's text
    Edit(EditArgs),
    /// Move a task within its list or to another list
    Mv(MvArgs),
    /// Count the tasks in a category, subcategories included
    Count(CountArgs),
    /// Show or set the color theme
    Theme(ThemeArgs),
    /// Show or set the layout mode
    Layout(LayoutArgs),
    /// Delete the stored tree and preferences
    Reset,
}

// ---------------------------------------------------------------------------
// Category / subcategory groups
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CatCmd {
    #[command(subcommand)]
    pub action: CatAction,
}

#[derive(Subcommand)]
pub enum CatAction {
    /// Append a new empty category
    Add {
        /// Category name
        name: String,
    },
    /// Delete a category with everything in it
    Rm {
        /// Category index
        index: usize,
    },
    /// Rename a category
    Rename {
        /// Category index
        index: usize,
        /// New name
        name: String,
    },
    /// Move a category to a new position
    Mv {
        /// Category index to move
        from: usize,
        /// Index it should end up at
        to: usize,
    },
}

#[derive(Args)]
pub struct SubCmd {
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Append a new empty subcategory
    Add {
        /// Category index
        cat: usize,
        /// Subcategory name
        name: String,
    },
    /// Delete a subcategory with its tasks
    Rm {
        /// Category index
        cat: usize,
        /// Subcategory index
        sub: usize,
    },
    /// Rename a subcategory
    Rename {
        /// Category index
        cat: usize,
        /// Subcategory index
        sub: usize,
        /// New name
        name: String,
    },
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Category index
    pub cat: usize,
    /// Task text
    pub text: String,
    /// Add to this subcategory instead of the category itself
    #[arg(long = "sub")]
    pub sub: Option<usize>,
}

#[derive(Args)]
pub struct TaskArgs {
    /// Category index
    pub cat: usize,
    /// Task index within its list
    pub task: usize,
    /// The task lives in this subcategory
    #[arg(long = "sub")]
    pub sub: Option<usize>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Category index
    pub cat: usize,
    /// Task index within its list
    pub task: usize,
    /// New task text
    pub text: String,
    /// The task lives in this subcategory
    #[arg(long = "sub")]
    pub sub: Option<usize>,
}

#[derive(Args)]
pub struct MvArgs {
    /// Category index of the task
    pub cat: usize,
    /// Task index within its list
    pub task: usize,
    /// The task lives in this subcategory
    #[arg(long = "sub")]
    pub sub: Option<usize>,
    /// Destination category (default: the task's own category)
    #[arg(long = "to")]
    pub to: Option<usize>,
    /// Destination subcategory within the destination category
    #[arg(long = "to-sub")]
    pub to_sub: Option<usize>,
    /// Insert before this task of the destination list (default: append)
    #[arg(long = "before")]
    pub before: Option<usize>,
}

#[derive(Args)]
pub struct CountArgs {
    /// Category index
    pub cat: usize,
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ThemeArgs {
    /// New theme; omit to show the current one
    #[arg(value_enum)]
    pub value: Option<ThemeChoice>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

#[derive(Args)]
pub struct LayoutArgs {
    /// New layout; omit to show the current one
    #[arg(value_enum)]
    pub value: Option<LayoutChoice>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LayoutChoice {
    Horizontal,
    Grid,
    Toggle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_move_with_destination() {
        let cli = Cli::try_parse_from([
            "tt", "mv", "0", "2", "--sub", "1", "--to", "3", "--before", "0",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Mv(args)) => {
                assert_eq!(args.cat, 0);
                assert_eq!(args.task, 2);
                assert_eq!(args.sub, Some(1));
                assert_eq!(args.to, Some(3));
                assert_eq!(args.to_sub, None);
                assert_eq!(args.before, Some(0));
            }
            _ => panic!("expected mv"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tt", "list", "--json", "-d", "/tmp/x", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["tt", "-v", "-q"]).is_err());
    }

    #[test]
    fn unknown_theme_rejected() {
        assert!(Cli::try_parse_from(["tt", "theme", "blue"]).is_err());
    }
}
