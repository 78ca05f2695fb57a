use std::path::Path;

use crate::cli::core::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::domain::{NOTIFICATION_DAY_OPTIONS, SUGGESTED_CURRENCIES};
use crate::export;

const SETTINGS_USAGE: &str = "settings [currency <code> | notify <days> | theme | sound]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "settings",
            "Show or change session preferences",
            SETTINGS_USAGE,
            cmd_settings,
        ),
        CommandEntry::new(
            "export",
            "Dump all stored data as JSON",
            "export [file]",
            cmd_export,
        ),
        CommandEntry::new(
            "clear",
            "Delete all stored data",
            "clear --yes",
            cmd_clear,
        ),
    ]
}

fn cmd_settings(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {}
        ["currency", code] => {
            context.settings.set_preferred_currency(code)?;
            if !SUGGESTED_CURRENCIES.contains(&code.to_ascii_uppercase().as_str()) {
                output::warning(format!("`{code}` is not one of the common currency codes"));
            }
        }
        ["notify", days] => {
            let days: u32 = days.parse().map_err(|_| {
                CommandError::InvalidArguments(format!("`{days}` is not a number of days"))
            })?;
            let enabled = context.settings.toggle_notification_day(days)?;
            let state = if enabled { "enabled" } else { "disabled" };
            output::success(format!("Reminder {days} day(s) before renewal {state}"));
        }
        ["theme"] => {
            let theme = context.settings.toggle_theme();
            output::success(format!("Theme set to {theme}"));
        }
        ["sound"] => {
            let enabled = context.settings.toggle_sound();
            output::success(format!("Sound {}", if enabled { "on" } else { "off" }));
        }
        _ => return Err(CommandError::usage(SETTINGS_USAGE)),
    }
    context.apply_output_preferences();

    let settings = context.settings.snapshot();
    let days: Vec<String> = settings
        .notification_days
        .iter()
        .map(|day| day.to_string())
        .collect();
    let options: Vec<String> = NOTIFICATION_DAY_OPTIONS
        .iter()
        .map(|day| day.to_string())
        .collect();
    output::section("Settings");
    output::two_column(&[
        ("Currency", settings.preferred_currency.clone()),
        (
            "Reminders",
            format!("{} day(s) before (options: {})", days.join(", "), options.join(", ")),
        ),
        ("Theme", settings.theme.to_string()),
        ("Sound", if settings.sound_enabled { "on" } else { "off" }.to_string()),
    ]);
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let bundle = export::export_all(&**context.store.backend())?;
    match args.first() {
        Some(path) => {
            bundle.write_to(Path::new(path))?;
            output::success(format!("Exported {} key(s) to {}", bundle.len(), path));
        }
        None => println!("{}", bundle.to_pretty_json()?),
    }
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args != ["--yes"] {
        output::warning("This deletes every stored subscription and all history.");
        return Err(CommandError::usage("clear --yes"));
    }
    export::clear_all(&**context.store.backend())?;
    output::success("All data has been cleared");
    Ok(())
}
