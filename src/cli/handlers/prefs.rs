use crate::cli::commands::{LayoutArgs, LayoutChoice, ThemeArgs, ThemeChoice};
use crate::cli::output::{ChangeJson, prefs_to_json};
use crate::model::prefs::{LayoutMode, Theme};

use super::{CliResult, TreeApp};

fn print_prefs(app: &TreeApp, json: bool, text: &str) -> CliResult {
    if json {
        println!("{}", serde_json::to_string(&prefs_to_json(app.preferences()))?);
    } else {
        println!("{}", text);
    }
    Ok(())
}

/// `tt theme [light|dark|toggle]`
pub fn cmd_theme(app: &mut TreeApp, args: ThemeArgs, json: bool) -> CliResult {
    let changed = match args.value {
        None => false,
        Some(ThemeChoice::Light) => app.set_theme(Theme::Light)?,
        Some(ThemeChoice::Dark) => app.set_theme(Theme::Dark)?,
        Some(ThemeChoice::Toggle) => {
            app.toggle_theme()?;
            true
        }
    };
    let theme = app.preferences().theme;
    if args.value.is_some() && !changed && !json {
        println!("no change");
        return Ok(());
    }
    print_prefs(app, json, theme.as_str())
}

/// `tt layout [horizontal|grid|toggle]`
pub fn cmd_layout(app: &mut TreeApp, args: LayoutArgs, json: bool) -> CliResult {
    let changed = match args.value {
        None => false,
        Some(LayoutChoice::Horizontal) => app.set_layout(LayoutMode::Horizontal)?,
        Some(LayoutChoice::Grid) => app.set_layout(LayoutMode::Grid)?,
        Some(LayoutChoice::Toggle) => {
            app.toggle_layout()?;
            true
        }
    };
    let layout = app.preferences().layout;
    if args.value.is_some() && !changed && !json {
        println!("no change");
        return Ok(());
    }
    print_prefs(app, json, layout.as_str())
}

/// `tt reset`: wipe the stored tree and preferences
pub fn cmd_reset(app: &mut TreeApp, json: bool) -> CliResult {
    app.reset()?;
    if json {
        let out = ChangeJson {
            changed: true,
            version: app.version(),
        };
        println!("{}", serde_json::to_string(&out)?);
    } else {
        println!("reset to {} default categories", app.tree().len());
    }
    Ok(())
}
