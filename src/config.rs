//! Configuration loading and management
//!
//! Daemon paths come from the environment. Recognition tunables default to
//! the values the pipeline was tuned with and can be overridden by a JSON
//! file named in `GESTURE_PILOT_TUNING`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::features::FeatureConfig;
use crate::gesture::ClassifierConfig;
use crate::orientation::OrientationConfig;
use crate::rotation::RotationConfig;
use crate::smoothing::SmoothingConfig;

/// Environment variable naming an optional JSON tuning file
pub const TUNING_ENV: &str = "GESTURE_PILOT_TUNING";

/// Invalid tunables. Raised at construction time only, never mid-stream.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be finite and non-negative (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("{name} must lie in {min}..={max} (got {value})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("smoothing factor must lie in (0, 1] (got {0})")]
    SmoothingFactor(f64),

    #[error("dominance margin {name} must be at least 1.0 (got {value})")]
    DominanceMargin { name: &'static str, value: f64 },

    #[error("failed to read tuning file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tuning file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value })
    }
}

pub(crate) fn ensure_in_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

pub(crate) fn ensure_margin(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::DominanceMargin { name, value })
    }
}

/// Every recognition tunable, grouped by pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub features: FeatureConfig,
    pub orientation: OrientationConfig,
    pub classifier: ClassifierConfig,
    pub smoothing: SmoothingConfig,
    pub rotation: RotationConfig,
}

impl Tuning {
    /// Validate every stage's tunables
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.features.validate()?;
        self.orientation.validate()?;
        self.classifier.validate()?;
        self.smoothing.validate()?;
        self.rotation.validate()
    }

    /// Read a (possibly partial) tuning file; absent fields keep defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        let tuning: Tuning =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;

        tuning.validate()?;
        Ok(tuning)
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Recognition tunables
    pub tuning: Tuning,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("gesture-pilot");

        let socket_path = data_dir.join("daemon.sock");

        let tuning = match std::env::var_os(TUNING_ENV) {
            Some(path) => Tuning::from_file(Path::new(&path))
                .with_context(|| format!("invalid tuning from {}", TUNING_ENV))?,
            None => Tuning::default(),
        };

        Ok(Self {
            socket_path,
            data_dir,
            tuning,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::rotation::DominanceMargins;

    use super::*;

    #[test]
    fn test_config_load() {
        let config = Config::load().unwrap();
        assert!(config.socket_path.to_string_lossy().contains("gesture-pilot"));
    }

    #[test]
    fn test_default_tuning_is_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.features.extension_cosine, 0.7);
        assert_eq!(tuning.classifier.pinch_threshold, 0.05);
        assert_eq!(tuning.smoothing.grace_window_ms, 100.0);
        assert_eq!(tuning.rotation.clamp_deg, 15.0);
    }

    #[test]
    fn test_negative_dead_zone_rejected() {
        let mut tuning = Tuning::default();
        tuning.rotation.dead_zone.yaw = -1.0;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::InvalidThreshold { name: "rotation.dead_zone.yaw", .. })
        ));
    }

    #[test]
    fn test_smoothing_factor_bounds() {
        let mut tuning = Tuning::default();
        tuning.smoothing.alpha = 0.0;
        assert!(matches!(tuning.validate(), Err(ConfigError::SmoothingFactor(_))));

        tuning.smoothing.alpha = 1.0;
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_partial_tuning_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"smoothing": {{"alpha": 0.75}}, "rotation": {{"clamp_deg": 10.0}}}}"#
        )
        .unwrap();

        let tuning = Tuning::from_file(file.path()).unwrap();
        assert_eq!(tuning.smoothing.alpha, 0.75);
        assert_eq!(tuning.smoothing.grace_window_ms, 100.0);
        assert_eq!(tuning.rotation.clamp_deg, 10.0);
        assert_eq!(tuning.rotation.dead_zone.pitch, 2.5);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rotation": {{"dead_zone": {{"yaw": 4.0}}}}}}"#).unwrap();

        let tuning = Tuning::from_file(file.path()).unwrap();
        assert_eq!(tuning.rotation.dead_zone.yaw, 4.0);
        assert_eq!(tuning.rotation.dead_zone.pitch, 2.5);
        assert_eq!(tuning.rotation.dead_zone.roll, 3.0);
        assert_eq!(tuning.rotation.margins, DominanceMargins::default());
    }

    #[test]
    fn test_unparsable_tuning_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Tuning::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_invalid_tuning_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rotation": {{"margins": {{"yaw_over_roll": 0.5}}}}}}"#).unwrap();
        assert!(matches!(
            Tuning::from_file(file.path()),
            Err(ConfigError::DominanceMargin { .. })
        ));
    }
}
