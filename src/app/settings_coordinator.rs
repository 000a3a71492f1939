//! Settings persistence.
//!
//! Viewer preferences (sidebar width, channel filters) are stored as JSON
//! strings in eframe's persistent storage.

use serde::{Deserialize, Serialize};

/// Type-safe loading and saving of serializable settings.
pub struct SettingsCoordinator;

impl SettingsCoordinator {
    /// Loads a setting, falling back to `T::default()` when it is missing
    /// or no longer parses.
    ///
    /// ```ignore
    /// let criteria: FilterCriteria =
    ///     SettingsCoordinator::load_setting(storage, "filter_criteria");
    /// ```
    pub fn load_setting<T>(storage: Option<&dyn eframe::Storage>, key: &str) -> T
    where
        T: for<'de> Deserialize<'de> + Default,
    {
        Self::try_load_setting(storage, key).unwrap_or_default()
    }

    /// Loads a setting, or `None` when it is missing or invalid.
    pub fn try_load_setting<T>(storage: Option<&dyn eframe::Storage>, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let json_str = storage?.get_string(key)?;
        match serde_json::from_str(&json_str) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, "ignoring stored setting: {}", e);
                None
            }
        }
    }

    /// Serializes and stores a setting.
    ///
    /// ```ignore
    /// SettingsCoordinator::save_setting(storage, "sidebar_width", &180.0f32);
    /// ```
    pub fn save_setting<T>(storage: &mut dyn eframe::Storage, key: &str, value: &T)
    where
        T: Serialize,
    {
        match serde_json::to_string(value) {
            Ok(json_str) => {
                storage.set_string(key, json_str);
                storage.flush();
            }
            Err(e) => tracing::warn!(key, "failed to serialize setting: {}", e),
        }
    }
}
