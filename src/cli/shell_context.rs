use std::sync::Arc;

use tracing::debug;

use crate::{
    cli::{
        commands,
        core::{CommandError, CommandResult},
        formatters::DisplayFormatter,
        output::{self, OutputPreferences},
        registry::{CommandEntry, CommandRegistry},
    },
    config::{Config, ConfigManager},
    domain::UserSettings,
    services::{SettingsManager, SubscriptionStore},
    storage::JsonFileStore,
    utils,
};

/// Everything a command handler can reach: the store, session settings, and
/// the loaded configuration.
pub struct ShellContext {
    pub registry: CommandRegistry,
    pub store: SubscriptionStore,
    pub settings: SettingsManager,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub formatter: DisplayFormatter,
}

impl ShellContext {
    pub fn new(store: SubscriptionStore, config_manager: ConfigManager, config: Config) -> Self {
        let settings = SettingsManager::new(UserSettings::with_currency(config.currency.clone()));
        let context = Self {
            registry: CommandRegistry::with_entries(commands::all_definitions()),
            store,
            settings,
            config_manager,
            formatter: DisplayFormatter::new(config.currency_precision),
            config,
        };
        context.apply_output_preferences();
        context
    }

    /// Builds a context from `$SUBTRACK_HOME` (or `~/.subtrack`).
    pub fn from_environment() -> Result<Self, CommandError> {
        let manager = ConfigManager::with_base_dir(utils::app_data_dir())?;
        let config = manager.load()?;
        let data_file = config.resolve_data_file(manager.base_dir());
        debug!(path = %data_file.display(), "opening subscription store");
        let backend = JsonFileStore::new(data_file)?;
        Ok(Self::new(
            SubscriptionStore::new(Arc::new(backend)),
            manager,
            config,
        ))
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    /// Splits a shell line into words and runs the named command.
    pub fn execute_line(&mut self, line: &str) -> CommandResult {
        let words = shell_words::split(line)
            .map_err(|err| CommandError::InvalidArguments(format!("cannot parse input: {err}")))?;
        let Some((name, rest)) = words.split_first() else {
            return Ok(());
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        self.execute(name, &args)
    }

    pub fn execute(&mut self, name: &str, args: &[&str]) -> CommandResult {
        let name = name.to_lowercase();
        let handler = match self.registry.get(&name) {
            Some(entry) => entry.handler,
            None => {
                self.suggest_command(&name);
                return Err(CommandError::UnknownCommand(name));
            }
        };
        handler(self, args)
    }

    pub fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = self.registry.suggest(input) {
            output::info(format!("Suggestion: `{best}`?"));
        }
    }

    /// Saves `config` and applies it to the running session.
    pub fn replace_config(&mut self, config: Config) -> CommandResult {
        self.config_manager.save(&config)?;
        if config.currency != self.config.currency {
            self.settings.set_preferred_currency(&config.currency)?;
        }
        self.formatter = DisplayFormatter::new(config.currency_precision);
        self.config = config;
        self.apply_output_preferences();
        Ok(())
    }

    /// Pushes theme, sound, and color choices to the output helpers.
    pub fn apply_output_preferences(&self) {
        output::set_preferences(OutputPreferences::from_settings(
            &self.settings.snapshot(),
            self.config.ui_color_enabled,
        ));
    }
}
