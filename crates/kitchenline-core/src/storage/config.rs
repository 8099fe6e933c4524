//! TOML-based engine configuration.
//!
//! Stores layout tuning including:
//! - Status window and snap interval
//! - Calendar offset used for hour and day boundaries
//! - Pixel scales for compact and expanded layouts
//! - Drag settle, pointer offset and long-press timings
//!
//! Configuration is stored at `~/.config/kitchenline/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::drag::LongPress;
use crate::error::ConfigError;
use crate::timeline::{is_valid_scale, CalendarZone, LayoutScale, StatusEngine, TimeMapper};

/// Status and time-grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_soon_window")]
    pub soon_window_minutes: u32,
    #[serde(default = "default_snap_minutes")]
    pub snap_minutes: u32,
    /// Fixed offset from UTC for wall-clock boundaries.
    #[serde(default)]
    pub timezone_offset_minutes: i32,
}

/// Pixel scales of the rendered timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_compact_px")]
    pub compact_px_per_hour: f64,
    #[serde(default = "default_expanded_px")]
    pub expanded_px_per_hour: f64,
    #[serde(default = "default_gap_px")]
    pub collapsed_gap_px: f64,
}

/// Drag gesture timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragConfig {
    /// Layout transition time, used for both preparing and settling.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Distance from the card top to its timeline dot.
    #[serde(default = "default_dot_offset")]
    pub dot_offset_px: f64,
    #[serde(default = "default_scroll_epsilon")]
    pub scroll_epsilon_px: f64,
    #[serde(default = "default_long_press")]
    pub long_press_ms: u64,
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/kitchenline/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub drag: DragConfig,
}

// Default functions
fn default_soon_window() -> u32 {
    30
}
fn default_snap_minutes() -> u32 {
    5
}
fn default_compact_px() -> f64 {
    32.0
}
fn default_expanded_px() -> f64 {
    60.0
}
fn default_gap_px() -> f64 {
    48.0
}
fn default_settle_ms() -> u64 {
    700
}
fn default_dot_offset() -> f64 {
    25.0
}
fn default_scroll_epsilon() -> f64 {
    0.5
}
fn default_long_press() -> u64 {
    500
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            soon_window_minutes: default_soon_window(),
            snap_minutes: default_snap_minutes(),
            timezone_offset_minutes: 0,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            compact_px_per_hour: default_compact_px(),
            expanded_px_per_hour: default_expanded_px(),
            collapsed_gap_px: default_gap_px(),
        }
    }
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            dot_offset_px: default_dot_offset(),
            scroll_epsilon_px: default_scroll_epsilon(),
            long_press_ms: default_long_press(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<i64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default, writing the default file if none
    /// exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Like [`Config::load`] but at an explicit path.
    ///
    /// # Errors
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    /// See [`Config::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The caller persists it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let next: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Reject values the timeline cannot work with.
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if self.zone().is_none() {
            return Err(invalid("timeline.timezone_offset_minutes", "offset out of range"));
        }
        let scales = [
            ("layout.compact_px_per_hour", self.layout.compact_px_per_hour),
            ("layout.expanded_px_per_hour", self.layout.expanded_px_per_hour),
        ];
        for (key, px) in scales {
            if !is_valid_scale(px) {
                return Err(invalid(key, "must be a positive number"));
            }
        }
        let gap = self.layout.collapsed_gap_px;
        if !(gap.is_finite() && gap >= 0.0) {
            return Err(invalid("layout.collapsed_gap_px", "must not be negative"));
        }
        Ok(())
    }

    /// Every leaf key with its current value, in dot-path form.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Configured calendar zone, `None` if the offset is out of range.
    pub fn zone(&self) -> Option<CalendarZone> {
        CalendarZone::from_offset_minutes(self.timeline.timezone_offset_minutes)
    }

    pub fn status_engine(&self) -> StatusEngine {
        StatusEngine::new().with_soon_window(i64::from(self.timeline.soon_window_minutes))
    }

    pub fn scale(&self) -> LayoutScale {
        LayoutScale {
            compact_px_per_hour: self.layout.compact_px_per_hour,
            expanded_px_per_hour: self.layout.expanded_px_per_hour,
        }
    }

    /// Hold-to-undo timer at the configured threshold.
    pub fn long_press(&self) -> LongPress {
        LongPress::from_config(&self.drag)
    }

    /// Mapper at the expanded scale, the layout used while dragging.
    pub fn mapper(&self) -> TimeMapper {
        TimeMapper::new(
            self.layout.expanded_px_per_hour,
            self.zone().unwrap_or_default(),
        )
        .with_snap_minutes(self.timeline.snap_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timeline.soon_window_minutes, 30);
        assert_eq!(parsed.drag.settle_ms, 700);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let parsed: Config = toml::from_str("[layout]\ncompact_px_per_hour = 40.0\n").unwrap();
        assert_eq!(parsed.layout.compact_px_per_hour, 40.0);
        assert_eq!(parsed.layout.expanded_px_per_hour, 60.0);
        assert_eq!(parsed.timeline.snap_minutes, 5);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timeline.snap_minutes").as_deref(), Some("5"));
        assert_eq!(cfg.get("drag.dot_offset_px").as_deref(), Some("25.0"));
        assert!(cfg.get("timeline.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("drag.settle_ms", "400").unwrap();
        assert_eq!(cfg.drag.settle_ms, 400);
        cfg.set("timeline.timezone_offset_minutes", "-300").unwrap();
        assert_eq!(cfg.timeline.timezone_offset_minutes, -300);
    }

    #[test]
    fn set_json_value_by_path_updates_float() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "layout.collapsed_gap_px", "36.5").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "layout.collapsed_gap_px").unwrap(),
            &serde_json::json!(36.5)
        );
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let result = cfg.set("layout.nonexistent_key", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.set("drag.settle_ms", "soon");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.drag.settle_ms, 700);
    }

    #[test]
    fn set_rejects_out_of_range_offset() {
        let mut cfg = Config::default();
        assert!(cfg.set("timeline.timezone_offset_minutes", "100000").is_err());
        assert_eq!(cfg.timeline.timezone_offset_minutes, 0);
    }

    #[test]
    fn set_rejects_unusable_scale() {
        let mut cfg = Config::default();
        for value in ["0", "-60", "0.0"] {
            let result = cfg.set("layout.expanded_px_per_hour", value);
            assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        }
        assert!(cfg.set("layout.compact_px_per_hour", "-1").is_err());
        assert_eq!(cfg.layout.expanded_px_per_hour, 60.0);
        assert!(cfg.set("layout.expanded_px_per_hour", "90").is_ok());
    }

    #[test]
    fn load_from_rejects_unusable_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[layout]\nexpanded_px_per_hour = -1.0\n").unwrap();
        let result = Config::load_from(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == "layout.expanded_px_per_hour"));
    }

    #[test]
    fn entries_lists_every_leaf() {
        let entries = Config::default().entries();
        assert_eq!(entries.len(), 10);
        assert!(entries.contains(&("layout.collapsed_gap_px".to_string(), "48.0".to_string())));
    }

    #[test]
    fn load_from_writes_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.layout.collapsed_gap_px, 48.0);
        assert!(path.exists());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("timeline.soon_window_minutes", "45").unwrap();
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timeline.soon_window_minutes, 45);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timeline\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::LoadFailed { .. })));
    }
}
