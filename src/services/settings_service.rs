use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::{
    domain::{Theme, UserSettings},
    errors::SettingsError,
};

/// Session-scoped holder of the single [`UserSettings`] instance. Clones
/// share the same settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsManager {
    inner: Arc<RwLock<UserSettings>>,
}

impl SettingsManager {
    pub fn new(settings: UserSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn snapshot(&self) -> UserSettings {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_preferred_currency(&self, code: &str) -> Result<(), SettingsError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(SettingsError::Validation("currency code is required".into()));
        }
        let code = code.to_ascii_uppercase();
        self.update(|settings| settings.preferred_currency = code);
        Ok(())
    }

    /// Adds `days` to the reminder set, or removes it when already present.
    /// Returns whether the day is enabled afterwards.
    pub fn toggle_notification_day(&self, days: u32) -> Result<bool, SettingsError> {
        if days == 0 {
            return Err(SettingsError::Validation(
                "notification lead time must be at least one day".into(),
            ));
        }
        Ok(self.update(|settings| {
            match settings.notification_days.binary_search(&days) {
                Ok(index) => {
                    settings.notification_days.remove(index);
                    false
                }
                Err(index) => {
                    settings.notification_days.insert(index, days);
                    true
                }
            }
        }))
    }

    pub fn toggle_theme(&self) -> Theme {
        self.update(|settings| {
            settings.theme = settings.theme.toggled();
            settings.theme
        })
    }

    pub fn toggle_sound(&self) -> bool {
        self.update(|settings| {
            settings.sound_enabled = !settings.sound_enabled;
            settings.sound_enabled
        })
    }

    fn update<R>(&self, change: impl FnOnce(&mut UserSettings) -> R) -> R {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let result = change(&mut *guard);
        debug!(settings = ?*guard, "settings updated");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_days_stay_sorted_and_distinct() {
        let manager = SettingsManager::default();
        assert!(manager.toggle_notification_day(14).unwrap());
        assert!(!manager.toggle_notification_day(3).unwrap());
        assert!(manager.toggle_notification_day(2).unwrap());
        assert_eq!(manager.snapshot().notification_days, vec![1, 2, 7, 14]);
        assert!(manager.toggle_notification_day(0).is_err());
    }

    #[test]
    fn toggles_flip_theme_and_sound() {
        let manager = SettingsManager::default();
        assert_eq!(manager.toggle_theme(), Theme::Light);
        assert_eq!(manager.toggle_theme(), Theme::Dark);
        assert!(!manager.toggle_sound());
    }

    #[test]
    fn currency_is_normalized_and_required() {
        let manager = SettingsManager::default();
        manager.set_preferred_currency(" eur ").unwrap();
        assert_eq!(manager.snapshot().preferred_currency, "EUR");
        assert!(manager.set_preferred_currency("  ").is_err());
    }

    #[test]
    fn clones_share_state() {
        let manager = SettingsManager::default();
        let other = manager.clone();
        other.toggle_sound();
        assert!(!manager.snapshot().sound_enabled);
    }
}
