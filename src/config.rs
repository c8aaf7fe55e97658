use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_COLS, DEFAULT_FPS, DEFAULT_ROWS, DEFAULT_VIEW_COLS, DEFAULT_VIEW_ROWS,
    ENEMY_SPAWN_RATE, ITEM_SPAWN_RATE,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldConfig {
    pub cols: i32,
    pub rows: i32,
    pub view_cols: i32,
    pub view_rows: i32,
    pub seed: Option<u32>,
    pub enemy_spawn_rate: f64,
    pub item_spawn_rate: f64,
    pub fps: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            view_cols: DEFAULT_VIEW_COLS,
            view_rows: DEFAULT_VIEW_ROWS,
            seed: None,
            enemy_spawn_rate: ENEMY_SPAWN_RATE,
            item_spawn_rate: ITEM_SPAWN_RATE,
            fps: DEFAULT_FPS,
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols < 3 || self.rows < 3 {
            return Err(ConfigError::Invalid(format!(
                "world must be at least 3x3, got {}x{}",
                self.cols, self.rows
            )));
        }
        if self.view_cols < 1 || self.view_rows < 1 {
            return Err(ConfigError::Invalid(format!(
                "view must be at least 1x1, got {}x{}",
                self.view_cols, self.view_rows
            )));
        }
        for (name, rate) in [
            ("enemySpawnRate", self.enemy_spawn_rate),
            ("itemSpawnRate", self.item_spawn_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        if self.fps == 0 {
            return Err(ConfigError::Invalid("fps must be positive".to_string()));
        }
        Ok(())
    }

    pub fn tick_interval_ms(&self) -> u64 {
        1_000 / u64::from(self.fps.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, WorldConfig};

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = WorldConfig::from_json_str(r#"{"cols": 40, "seed": 7}"#).expect("config");
        assert_eq!(config.cols, 40);
        assert_eq!(config.rows, 60);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.view_cols, 60);
        assert_eq!(config.tick_interval_ms(), 33);
    }

    #[test]
    fn rejects_tiny_worlds_and_bad_rates() {
        let err = WorldConfig::from_json_str(r#"{"cols": 2}"#).expect_err("too small");
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = WorldConfig::from_json_str(r#"{"enemySpawnRate": 1.5}"#).expect_err("rate");
        assert!(err.to_string().contains("enemySpawnRate"));

        let err = WorldConfig::from_json_str(r#"{"viewRows": 0}"#).expect_err("view");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = WorldConfig::from_json_str("{not json").expect_err("parse");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = WorldConfig::from_json_file("/nonexistent/maze-rogue.json").expect_err("io");
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
