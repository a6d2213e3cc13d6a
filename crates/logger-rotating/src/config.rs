//! Configuration for the rotating logger

use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of records that can be queued before producers wait
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Default interval between periodic flushes
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(2);

/// Default gzip level (best compression)
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 9;

/// Extension appended to the file suffix when compression is enabled
pub const COMPRESSED_EXTENSION: &str = "gz";

/// How often a new destination file is opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// One file per day: `<base>/<YYYY-MM>/<DD><suffix>`
    #[default]
    Daily,
    /// One file per hour: `<base>/<YYYY-MM-DD>/<HH><suffix>`
    Hourly,
}

impl RotationPolicy {
    /// Length of one full rotation period
    #[must_use]
    pub const fn period(self) -> Duration {
        match self {
            Self::Daily => Duration::from_secs(24 * 60 * 60),
            Self::Hourly => Duration::from_secs(60 * 60),
        }
    }
}

/// Configuration for a [`RotatingLogger`](crate::RotatingLogger)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotatingLoggerConfig {
    /// Root directory; rotation directories are created beneath it
    pub base_dir: PathBuf,
    /// Rotation granularity
    pub rotation: RotationPolicy,
    /// Suffix appended to the day/hour file name, e.g. `.log`
    pub file_suffix: String,
    /// Gzip every byte before it reaches the file
    pub compress: bool,
    /// Gzip level, 0 to 9
    pub compression_level: u32,
    /// Capacity of the record queue
    pub channel_capacity: usize,
    /// How often buffered bytes are pushed to the file
    pub flush_interval: Duration,
}

impl RotatingLoggerConfig {
    /// Create a configuration with defaults for everything but the base directory
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            rotation: RotationPolicy::default(),
            file_suffix: ".log".to_string(),
            compress: false,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }

    /// Start building a configuration
    pub fn builder(base_dir: impl Into<PathBuf>) -> RotatingLoggerConfigBuilder {
        RotatingLoggerConfigBuilder {
            config: Self::new(base_dir),
        }
    }

    /// Full suffix of rotated files, including the compression extension
    #[must_use]
    pub fn full_suffix(&self) -> String {
        if self.compress {
            format!("{}.{COMPRESSED_EXTENSION}", self.file_suffix)
        } else {
            self.file_suffix.clone()
        }
    }

    /// Check that the configuration can be used to start a logger
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(Error::Configuration("base_dir must not be empty".into()));
        }
        if self.file_suffix.contains(std::path::is_separator) {
            return Err(Error::Configuration(format!(
                "file_suffix must not contain a path separator: {:?}",
                self.file_suffix
            )));
        }
        if self.channel_capacity == 0 {
            return Err(Error::Configuration(
                "channel_capacity must be greater than zero".into(),
            ));
        }
        if self.flush_interval.is_zero() {
            return Err(Error::Configuration(
                "flush_interval must be greater than zero".into(),
            ));
        }
        if self.compression_level > 9 {
            return Err(Error::Configuration(format!(
                "compression_level must be between 0 and 9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }
}

/// Builder for [`RotatingLoggerConfig`]
#[derive(Debug, Clone)]
pub struct RotatingLoggerConfigBuilder {
    config: RotatingLoggerConfig,
}

impl RotatingLoggerConfigBuilder {
    /// Set the rotation policy
    #[must_use]
    pub const fn rotation(mut self, rotation: RotationPolicy) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Set the file suffix
    #[must_use]
    pub fn file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.file_suffix = suffix.into();
        self
    }

    /// Enable or disable gzip compression
    #[must_use]
    pub const fn compress(mut self, compress: bool) -> Self {
        self.config.compress = compress;
        self
    }

    /// Set the gzip level
    #[must_use]
    pub const fn compression_level(mut self, level: u32) -> Self {
        self.config.compression_level = level;
        self
    }

    /// Set the queue capacity
    #[must_use]
    pub const fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Set the periodic flush interval
    #[must_use]
    pub const fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    /// Validate and return the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if any field is invalid.
    pub fn build(self) -> Result<RotatingLoggerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RotatingLoggerConfig::new("/tmp/logs");

        assert_eq!(config.rotation, RotationPolicy::Daily);
        assert_eq!(config.file_suffix, ".log");
        assert!(!config.compress);
        assert_eq!(config.compression_level, 9);
        assert_eq!(config.channel_capacity, 1000);
        assert_eq!(config.flush_interval, Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_suffix() {
        let plain = RotatingLoggerConfig::builder("/tmp/logs")
            .file_suffix(".jsonl")
            .build()
            .unwrap();
        assert_eq!(plain.full_suffix(), ".jsonl");

        let compressed = RotatingLoggerConfig::builder("/tmp/logs")
            .file_suffix(".jsonl")
            .compress(true)
            .build()
            .unwrap();
        assert_eq!(compressed.full_suffix(), ".jsonl.gz");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_capacity = RotatingLoggerConfig::builder("/tmp/logs")
            .channel_capacity(0)
            .build();
        assert!(matches!(zero_capacity, Err(Error::Configuration(_))));

        let zero_interval = RotatingLoggerConfig::builder("/tmp/logs")
            .flush_interval(Duration::ZERO)
            .build();
        assert!(matches!(zero_interval, Err(Error::Configuration(_))));

        let bad_level = RotatingLoggerConfig::builder("/tmp/logs")
            .compression_level(10)
            .build();
        assert!(matches!(bad_level, Err(Error::Configuration(_))));

        let bad_suffix = RotatingLoggerConfig::builder("/tmp/logs")
            .file_suffix("a/b")
            .build();
        assert!(matches!(bad_suffix, Err(Error::Configuration(_))));

        let empty_base = RotatingLoggerConfig::new("").validate();
        assert!(matches!(empty_base, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_policy_serde() {
        let json = serde_json::to_string(&RotationPolicy::Hourly).unwrap();
        assert_eq!(json, "\"hourly\"");

        let policy: RotationPolicy = serde_json::from_str("\"daily\"").unwrap();
        assert_eq!(policy, RotationPolicy::Daily);
    }

    #[test]
    fn test_periods() {
        assert_eq!(RotationPolicy::Daily.period(), Duration::from_secs(86_400));
        assert_eq!(RotationPolicy::Hourly.period(), Duration::from_secs(3_600));
    }
}
