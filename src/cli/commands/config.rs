use crate::cli::core::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::config::Config;

const CONFIG_USAGE: &str =
    "config [show | set <locale|currency|precision|color|window> <value>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change saved preferences",
        CONFIG_USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {}
        ["set", key, value @ ..] if !value.is_empty() => {
            let mut config = context.config.clone();
            set_value(&mut config, key, &value.join(" "))?;
            context.replace_config(config)?;
            output::success(format!("Saved {key}"));
        }
        _ => return Err(CommandError::usage(CONFIG_USAGE)),
    }
    show_config(context);
    Ok(())
}

fn show_config(context: &ShellContext) {
    let config = &context.config;
    let data_file = config.resolve_data_file(context.config_manager.base_dir());
    output::section("Configuration");
    output::two_column(&[
        ("Locale", config.locale.clone()),
        ("Currency", config.currency.clone()),
        (
            "Precision",
            config
                .currency_precision
                .map(|digits| digits.to_string())
                .unwrap_or_else(|| "default".into()),
        ),
        ("Color", if config.ui_color_enabled { "on" } else { "off" }.to_string()),
        ("Renewal window", format!("{} days", config.upcoming_window_days)),
        ("Data file", data_file.display().to_string()),
        ("Config file", context.config_manager.config_path().display().to_string()),
    ]);
}

fn set_value(config: &mut Config, key: &str, value: &str) -> CommandResult {
    let value = value.trim();
    match key.to_ascii_lowercase().as_str() {
        "locale" => {
            if value.is_empty() {
                return Err(CommandError::usage("config set locale <tag>"));
            }
            config.locale = value.to_string();
        }
        "currency" => {
            if value.is_empty() {
                return Err(CommandError::usage("config set currency <code>"));
            }
            config.currency = value.to_ascii_uppercase();
        }
        "precision" => {
            let digits: u8 = value
                .parse()
                .ok()
                .filter(|digits| *digits <= 4)
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "precision must be a number from 0 to 4, got `{value}`"
                    ))
                })?;
            config.currency_precision = Some(digits);
        }
        "color" => {
            config.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" => true,
                "off" | "false" | "no" => false,
                _ => return Err(CommandError::usage("config set color <on|off>")),
            };
        }
        "window" => {
            let days: i64 = value
                .parse()
                .ok()
                .filter(|days| *days >= 0)
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "window must be a number of days, got `{value}`"
                    ))
                })?;
            config.upcoming_window_days = days;
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown config key `{other}`"
            )))
        }
    }
    Ok(())
}
