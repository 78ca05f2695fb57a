use colored::Colorize;
use std::fmt;
use std::sync::{OnceLock, RwLock};

use crate::domain::{Theme, UserSettings};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

#[derive(Clone, Copy, Debug)]
pub struct OutputPreferences {
    pub color_enabled: bool,
    pub theme: Theme,
    pub sound_enabled: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            color_enabled: true,
            theme: Theme::Dark,
            sound_enabled: false,
        }
    }
}

impl OutputPreferences {
    pub fn from_settings(settings: &UserSettings, color_enabled: bool) -> Self {
        Self {
            color_enabled,
            theme: settings.theme,
            sound_enabled: settings.sound_enabled,
        }
    }
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

pub fn set_preferences(prefs: OutputPreferences) {
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
}

fn preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

fn apply_style(kind: MessageKind, message: impl fmt::Display, prefs: &OutputPreferences) -> String {
    let text = message.to_string();
    let mut formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Info => text,
        MessageKind::Success => format!("[ok] {text}"),
        MessageKind::Warning => format!("[!] {text}"),
        MessageKind::Error => format!("[x] {text}"),
    };

    if prefs.sound_enabled && matches!(kind, MessageKind::Warning | MessageKind::Error) {
        formatted.push_str(" [ding]");
    }

    if !prefs.color_enabled {
        return formatted;
    }

    // Light terminals wash out the bright variants.
    match (kind, prefs.theme) {
        (MessageKind::Info, _) => formatted,
        (MessageKind::Section, _) => formatted.bold().to_string(),
        (MessageKind::Success, Theme::Dark) => formatted.bright_green().to_string(),
        (MessageKind::Success, Theme::Light) => formatted.green().to_string(),
        (MessageKind::Warning, Theme::Dark) => formatted.bright_yellow().to_string(),
        (MessageKind::Warning, Theme::Light) => formatted.yellow().to_string(),
        (MessageKind::Error, Theme::Dark) => formatted.bright_red().to_string(),
        (MessageKind::Error, Theme::Light) => formatted.red().to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message, &preferences());
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        MessageKind::Error => eprintln!("{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Prints aligned `label  value` rows.
pub fn two_column(rows: &[(&str, String)]) {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        info(format!("  {label:<width$}  {value}"));
    }
}
