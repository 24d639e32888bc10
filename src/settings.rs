//! Visual effect preferences
//!
//! Persisted separately from the game in LocalStorage.

use serde::{Deserialize, Serialize};

/// Player-facing effect toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board shake on penalties and game over
    pub screen_shake: bool,
    /// Full-screen flashes on bonuses and level-ups
    pub flash_effects: bool,
    /// "LEVEL UP!" banner
    pub level_up_banner: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            flash_effects: true,
            level_up_banner: true,
        }
    }
}

impl Settings {
    /// Toggle names, matching the field names and the settings form inputs
    pub const TOGGLES: [&'static str; 3] = ["screen_shake", "flash_effects", "level_up_banner"];

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rail_drop_settings";

    /// Parse stored settings, falling back to defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        match name {
            "screen_shake" => Some(self.screen_shake),
            "flash_effects" => Some(self.flash_effects),
            "level_up_banner" => Some(self.level_up_banner),
            _ => None,
        }
    }

    /// Set a toggle by name; returns false for unknown names
    pub fn set(&mut self, name: &str, enabled: bool) -> bool {
        let slot = match name {
            "screen_shake" => &mut self.screen_shake,
            "flash_effects" => &mut self.flash_effects,
            "level_up_banner" => &mut self.level_up_banner,
            _ => {
                log::warn!("Unknown setting {}", name);
                return false;
            }
        };
        *slot = enabled;
        true
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "screen_shake": false }"#);
        assert!(!settings.screen_shake);
        assert!(settings.flash_effects);
        assert!(settings.level_up_banner);
    }

    #[test]
    fn test_corrupt_json_falls_back() {
        assert_eq!(Settings::from_json("{oops"), Settings::default());
    }

    #[test]
    fn test_toggles_by_name() {
        let mut settings = Settings::default();
        for name in Settings::TOGGLES {
            assert_eq!(settings.get(name), Some(true));
            assert!(settings.set(name, false));
            assert_eq!(settings.get(name), Some(false));
        }
        assert!(!settings.screen_shake && !settings.flash_effects && !settings.level_up_banner);

        assert!(!settings.set("volume", true));
        assert_eq!(settings.get("volume"), None);
    }

    #[test]
    fn test_toggled_settings_survive_json() {
        let mut settings = Settings::default();
        settings.set("flash_effects", false);
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json), settings);
    }
}
