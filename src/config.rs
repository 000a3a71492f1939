//! Guide configuration.
//!
//! Every field has a default so a partial (or missing) config file is fine.

use anyhow::{Context, Result};
use chrono::{Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::GuideError;
use crate::time_axis::PixelDensity;

const CONFIG_DIR_NAME: &str = "guidegrid";
const CONFIG_FILE_NAME: &str = "config.json";

/// One week; navigation steps by the window length so it must stay small.
pub const MAX_WINDOW_HOURS: u32 = 7 * 24;
pub const MAX_NOW_TICK_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Time axis tick interval
    pub slot_minutes: u32,
    pub pixels_per_minute: PixelDensity,
    pub row_height_px: f32,
    pub overscan_rows: usize,
    /// Length of the guide window and the step of previous/next navigation
    pub window_hours: u32,
    pub min_cell_width_px: f32,
    /// Now-line recompute cadence
    pub now_tick_secs: u64,
    /// Zone used to floor "now" to the hour and to interpret date jumps
    pub utc_offset_minutes: i32,
    pub sidebar_width_px: f32,
    pub header_height_px: f32,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            slot_minutes: 30,
            pixels_per_minute: PixelDensity::default(),
            row_height_px: 72.0,
            overscan_rows: 10,
            window_hours: 4,
            min_cell_width_px: 4.0,
            now_tick_secs: 60,
            utc_offset_minutes: 0,
            sidebar_width_px: 180.0,
            header_height_px: 36.0,
        }
    }
}

impl GuideConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: GuideConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the per-user config file, falling back to defaults when it is
    /// absent or unusable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded guide config");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring config file: {:#}", e);
                Self::default()
            }
        }
    }

    /// `<config_dir>/guidegrid/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), GuideError> {
        if self.slot_minutes == 0 {
            return Err(GuideError::InvalidConfig("slot_minutes must be positive".into()));
        }
        if self.pixels_per_minute.numerator == 0 || self.pixels_per_minute.denominator == 0 {
            return Err(GuideError::InvalidConfig(
                "pixels_per_minute terms must be positive".into(),
            ));
        }
        if !(self.row_height_px > 0.0) {
            return Err(GuideError::InvalidConfig("row_height_px must be positive".into()));
        }
        if self.window_hours == 0 || self.window_hours > MAX_WINDOW_HOURS {
            return Err(GuideError::InvalidConfig(format!(
                "window_hours must be between 1 and {}, got {}",
                MAX_WINDOW_HOURS, self.window_hours
            )));
        }
        if self.now_tick_secs == 0 || self.now_tick_secs > MAX_NOW_TICK_SECS {
            return Err(GuideError::InvalidConfig(format!(
                "now_tick_secs must be between 1 and {}, got {}",
                MAX_NOW_TICK_SECS, self.now_tick_secs
            )));
        }
        if self.utc_offset().is_none() {
            return Err(GuideError::InvalidConfig(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// Now-line cadence, clamped to [`MAX_NOW_TICK_SECS`].
    pub fn now_tick(&self) -> Duration {
        let secs = self.now_tick_secs.min(MAX_NOW_TICK_SECS);
        Duration::seconds(i64::try_from(secs).unwrap_or(60))
    }

    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GuideConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.slot_minutes, 30);
        assert_eq!(config.overscan_rows, 10);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"row_height_px": 48.0, "window_hours": 6}"#;
        let config: GuideConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.row_height_px, 48.0);
        assert_eq!(config.window_hours, 6);
        assert_eq!(config.slot_minutes, 30);
        assert_eq!(config.pixels_per_minute, PixelDensity::new(4, 1));
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        let bad = [
            GuideConfig { slot_minutes: 0, ..Default::default() },
            GuideConfig { pixels_per_minute: PixelDensity::new(4, 0), ..Default::default() },
            GuideConfig { row_height_px: 0.0, ..Default::default() },
            GuideConfig { window_hours: 0, ..Default::default() },
            GuideConfig { window_hours: MAX_WINDOW_HOURS + 1, ..Default::default() },
            GuideConfig { now_tick_secs: 0, ..Default::default() },
            GuideConfig { now_tick_secs: u64::MAX, ..Default::default() },
            GuideConfig { utc_offset_minutes: 24 * 60, ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(GuideError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_huge_window_from_json_is_rejected() {
        let config: GuideConfig = serde_json::from_str(r#"{"window_hours": 4000000000}"#).unwrap();
        assert!(matches!(config.validate(), Err(GuideError::InvalidConfig(_))));

        let config = GuideConfig { now_tick_secs: u64::MAX, ..Default::default() };
        assert_eq!(config.now_tick(), Duration::hours(1));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = std::env::temp_dir().join(format!("guidegrid_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"utc_offset_minutes": -300}"#).unwrap();

        let config = GuideConfig::load(&path).unwrap();
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), -300 * 60);

        std::fs::write(&path, r#"{"slot_minutes": 0}"#).unwrap();
        assert!(GuideConfig::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
