use std::fmt;

use serde::{Deserialize, Serialize};

/// Reminder lead times offered by the settings panel, in days.
pub const NOTIFICATION_DAY_OPTIONS: [u32; 4] = [1, 3, 7, 14];

/// Currencies offered as one-tap choices. Any other code is still accepted.
pub const SUGGESTED_CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "JPY", "AUD"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

/// Session-wide user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub preferred_currency: String,
    /// Distinct positive day counts, sorted ascending.
    pub notification_days: Vec<u32>,
    pub theme: Theme,
    pub sound_enabled: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            preferred_currency: "USD".into(),
            notification_days: vec![1, 3, 7],
            theme: Theme::Dark,
            sound_enabled: true,
        }
    }
}

impl UserSettings {
    pub fn with_currency(currency: impl Into<String>) -> Self {
        Self {
            preferred_currency: currency.into(),
            ..Self::default()
        }
    }

    pub fn notifies_on(&self, days: u32) -> bool {
        self.notification_days.binary_search(&days).is_ok()
    }
}
