use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use warehouse_core::{WarehouseConfig, DEFAULT_SEED};

/// Tick budget used when neither the flags nor the file name one.
pub(crate) const DEFAULT_MAX_TICKS: u64 = 100_000;

/// One source of run parameters; unset fields defer to lower layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SettingsLayer {
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) robots: Option<u32>,
    pub(crate) boxes: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) max_ticks: Option<u64>,
}

impl SettingsLayer {
    /// Reads a layer from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read run configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid run configuration in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse run configuration toml contents")
    }

    /// Values set in `top` win over values set in `self`.
    #[must_use]
    pub(crate) fn overlay(self, top: Self) -> Self {
        Self {
            width: top.width.or(self.width),
            height: top.height.or(self.height),
            robots: top.robots.or(self.robots),
            boxes: top.boxes.or(self.boxes),
            seed: top.seed.or(self.seed),
            max_ticks: top.max_ticks.or(self.max_ticks),
        }
    }

    /// Fills the gaps with defaults and validates the floor parameters.
    pub(crate) fn resolve(self) -> Result<RunSettings> {
        let defaults = WarehouseConfig::default();
        let config = WarehouseConfig::new(
            self.width.unwrap_or(defaults.width),
            self.height.unwrap_or(defaults.height),
            self.robots.unwrap_or(defaults.robots),
            self.boxes.unwrap_or(defaults.boxes),
        );
        config
            .validate()
            .with_context(|| format!("rejected warehouse configuration {config:?}"))?;

        Ok(RunSettings {
            config,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            max_ticks: self.max_ticks.unwrap_or(DEFAULT_MAX_TICKS),
        })
    }
}

/// Fully resolved parameters of one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RunSettings {
    pub(crate) config: WarehouseConfig,
    pub(crate) seed: u64,
    pub(crate) max_ticks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layers_resolve_to_defaults() {
        let settings = SettingsLayer::default().resolve().expect("defaults are valid");
        assert_eq!(settings.config, WarehouseConfig::new(20, 20, 1, 200));
        assert_eq!(settings.seed, DEFAULT_SEED);
        assert_eq!(settings.max_ticks, DEFAULT_MAX_TICKS);
    }

    #[test]
    fn flags_override_file_values() {
        let file = SettingsLayer::parse(
            r#"
                width = 12
                height = 8
                boxes = 40
                seed = 7
            "#,
        )
        .expect("valid toml");
        let flags = SettingsLayer {
            boxes: Some(30),
            max_ticks: Some(500),
            ..SettingsLayer::default()
        };

        let settings = file.overlay(flags).resolve().expect("valid settings");
        assert_eq!(settings.config, WarehouseConfig::new(12, 8, 1, 30));
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.max_ticks, 500);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SettingsLayer::parse("towers = 3").is_err());
    }

    #[test]
    fn overcrowded_floor_fails_to_resolve() {
        let layer = SettingsLayer {
            width: Some(2),
            height: Some(2),
            boxes: Some(13),
            ..SettingsLayer::default()
        };
        assert!(layer.resolve().is_err());
    }
}
