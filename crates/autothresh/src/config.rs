//! Batch configuration and its JSON form.

use std::fs;
use std::path::{Path, PathBuf};

use autothresh_core::{HistogramOptions, Polarity, ThresholdMethod, ThresholdSelector};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigIoError};
use crate::tiff_codec::{Compression, DEFAULT_TILE_SIZE, TILE_ALIGN};

/// When a finished batch counts as successful.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessPolicy {
    /// At least one file, and every file written.
    #[default]
    AllWritten,
    /// At least one file written.
    AnyWritten,
}

fn default_concurrency() -> usize {
    1
}

fn default_tile_size() -> usize {
    DEFAULT_TILE_SIZE
}

/// Everything one batch run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub method: ThresholdMethod,
    /// Value for [`ThresholdMethod::Manual`]; ignored otherwise.
    #[serde(default)]
    pub threshold_value: Option<f64>,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_tile_size")]
    pub tile_size: usize,
    #[serde(default)]
    pub compression: Compression,
    #[serde(default)]
    pub polarity: Polarity,
    #[serde(default)]
    pub ignore_black: bool,
    #[serde(default)]
    pub ignore_white: bool,
    #[serde(default)]
    pub success_policy: SuccessPolicy,
    /// Where to write per-file thresholds as JSON, if anywhere.
    #[serde(default)]
    pub threshold_report: Option<PathBuf>,
}

impl BatchConfig {
    /// Defaults for everything but the directories and the method.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        method: ThresholdMethod,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            method,
            threshold_value: None,
            concurrency: default_concurrency(),
            tile_size: default_tile_size(),
            compression: Compression::default(),
            polarity: Polarity::default(),
            ignore_black: false,
            ignore_white: false,
            success_policy: SuccessPolicy::default(),
            threshold_report: None,
        }
    }

    /// Load a JSON config from disk.
    ///
    /// An unknown method name is a [`ConfigError`], the same as on the
    /// command line, rather than a JSON error.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        if let Some(name) = value.get("method").and_then(serde_json::Value::as_str) {
            name.parse::<ThresholdMethod>().map_err(ConfigError::from)?;
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn histogram_options(&self) -> HistogramOptions {
        HistogramOptions {
            ignore_black: self.ignore_black,
            ignore_white: self.ignore_white,
        }
    }

    /// Check the numeric knobs and build the threshold selector.
    pub fn validate(&self) -> Result<ThresholdSelector, ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.tile_size == 0 || self.tile_size % TILE_ALIGN != 0 {
            return Err(ConfigError::TileSize(self.tile_size));
        }
        Ok(ThresholdSelector::new(self.method, self.threshold_value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autothresh_core::ThresholdConfigError;

    #[test]
    fn minimal_json_takes_defaults() {
        let cfg: BatchConfig = serde_json::from_str(
            r#"{ "input_dir": "in", "output_dir": "out", "method": "Otsu" }"#,
        )
        .unwrap();
        assert_eq!(cfg, BatchConfig::new("in", "out", ThresholdMethod::Otsu));
        assert_eq!(cfg.concurrency, 1);
        assert_eq!(cfg.tile_size, 1024);
        assert_eq!(cfg.compression, Compression::Deflate);
        assert_eq!(cfg.success_policy, SuccessPolicy::AllWritten);
    }

    #[test]
    fn unknown_method_fails_to_parse() {
        let err = serde_json::from_str::<BatchConfig>(
            r#"{ "input_dir": "in", "output_dir": "out", "method": "otsu" }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown threshold method 'otsu'"), "{err}");
    }

    #[test]
    fn validation_rejects_bad_knobs() {
        let mut cfg = BatchConfig::new("in", "out", ThresholdMethod::Manual);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Threshold(ThresholdConfigError::MissingManualValue))
        );
        cfg.threshold_value = Some(12.0);
        assert!(cfg.validate().is_ok());
        cfg.concurrency = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroConcurrency));
        cfg.concurrency = 4;
        cfg.tile_size = 100;
        assert_eq!(cfg.validate(), Err(ConfigError::TileSize(100)));
    }

    #[test]
    fn unknown_method_in_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(
            &path,
            r#"{ "input_dir": "in", "output_dir": "out", "method": "otsu" }"#,
        )
        .unwrap();
        match BatchConfig::load_json(&path) {
            Err(ConfigIoError::Invalid(ConfigError::Threshold(
                ThresholdConfigError::UnknownMethod(name),
            ))) => assert_eq!(name, "otsu"),
            other => panic!("expected unknown method, got {other:?}"),
        }
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        let mut cfg = BatchConfig::new("in", "out", ThresholdMethod::MinErrorI);
        cfg.polarity = Polarity::ForegroundLow;
        cfg.threshold_report = Some("thresholds.json".into());
        cfg.write_json(&path).unwrap();
        assert_eq!(BatchConfig::load_json(&path).unwrap(), cfg);
    }
}
