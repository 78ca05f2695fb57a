mod config;
mod dashboard;
mod settings;
mod subscription;
mod system;

use crate::cli::registry::CommandEntry;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut entries = Vec::new();
    entries.extend(subscription::definitions());
    entries.extend(dashboard::definitions());
    entries.extend(settings::definitions());
    entries.extend(config::definitions());
    entries.extend(system::definitions());
    entries
}
