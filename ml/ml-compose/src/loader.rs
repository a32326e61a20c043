//! Loader configuration.
//!
//! The crate does not load batches itself; the host data-loading component
//! does. [`LoaderConfig`] is the declarative record handed to it, and it
//! round-trips through `ml-attrs` tagged serialization so it can live
//! inside experiment parameter maps.

use ml_attrs::AttrKind;
use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, Result};

/// Configuration for a batch loader.
///
/// # Example
///
/// ```
/// use ml_compose::LoaderConfig;
///
/// let config = LoaderConfig::new(64).shuffled().with_num_workers(4);
/// assert_eq!(config.batch_size, 64);
/// assert!(config.shuffle);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Samples per batch.
    pub batch_size: usize,

    /// Whether to shuffle each epoch.
    #[serde(default)]
    pub shuffle: bool,

    /// Worker count for the host loader (0 = load in-process).
    #[serde(default)]
    pub num_workers: usize,

    /// Drop the final incomplete batch.
    #[serde(default)]
    pub drop_last: bool,

    /// Pin host memory for device transfer.
    #[serde(default)]
    pub pin_memory: bool,

    /// Worker timeout in seconds (0 = wait forever).
    #[serde(default)]
    pub timeout_secs: f64,

    /// Shuffling seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            shuffle: false,
            num_workers: 0,
            drop_last: false,
            pin_memory: false,
            timeout_secs: 0.0,
            seed: None,
        }
    }
}

impl LoaderConfig {
    /// Creates a config with the given batch size.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Self::default()
        }
    }

    /// Enables shuffling.
    #[must_use]
    pub const fn shuffled(mut self) -> Self {
        self.shuffle = true;
        self
    }

    /// Sets the worker count.
    #[must_use]
    pub const fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Drops the final incomplete batch.
    #[must_use]
    pub const fn with_drop_last(mut self) -> Self {
        self.drop_last = true;
        self
    }

    /// Enables memory pinning.
    #[must_use]
    pub const fn with_pin_memory(mut self) -> Self {
        self.pin_memory = true;
        self
    }

    /// Sets the worker timeout in seconds.
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: f64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the shuffling seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of batches the loader would produce for `dataset_len`.
    #[must_use]
    pub const fn batches_for(&self, dataset_len: usize) -> usize {
        if self.batch_size == 0 {
            return 0;
        }
        if self.drop_last {
            dataset_len / self.batch_size
        } else {
            dataset_len.div_ceil(self.batch_size)
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch size is zero or the timeout is
    /// negative or non-finite.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ComposeError::invalid_loader_config(
                "batch_size must be positive",
            ));
        }
        if !self.timeout_secs.is_finite() || self.timeout_secs < 0.0 {
            return Err(ComposeError::invalid_loader_config(format!(
                "timeout_secs must be finite and non-negative, got {}",
                self.timeout_secs
            )));
        }
        Ok(())
    }
}

impl AttrKind for LoaderConfig {
    const KIND: &'static str = "loader_config";
}

#[cfg(test)]
mod tests {
    use ml_attrs::{AttrRegistry, decode_tagged, encode_tagged};

    use super::*;

    #[test]
    fn config_default() {
        let config = LoaderConfig::default();
        assert_eq!(config.batch_size, 1);
        assert!(!config.shuffle);
        assert_eq!(config.num_workers, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_setters() {
        let config = LoaderConfig::new(32)
            .shuffled()
            .with_num_workers(8)
            .with_drop_last()
            .with_pin_memory()
            .with_timeout_secs(30.0)
            .with_seed(42);

        assert_eq!(config.batch_size, 32);
        assert!(config.shuffle);
        assert_eq!(config.num_workers, 8);
        assert!(config.drop_last);
        assert!(config.pin_memory);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn config_batches_for() {
        let config = LoaderConfig::new(32);
        assert_eq!(config.batches_for(100), 4);
        assert_eq!(config.with_drop_last().batches_for(100), 3);
    }

    #[test]
    fn config_validate_rejects_zero_batch() {
        assert!(LoaderConfig::new(0).validate().is_err());
    }

    #[test]
    fn config_validate_rejects_negative_timeout() {
        assert!(LoaderConfig::new(1).with_timeout_secs(-1.0).validate().is_err());
        assert!(
            LoaderConfig::new(1)
                .with_timeout_secs(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn config_tagged_round_trip() {
        let config = LoaderConfig::new(64).shuffled().with_seed(1);
        let map = encode_tagged(&config).unwrap();
        assert_eq!(map.get("_kind").unwrap().as_str(), Some("loader_config"));

        let back: LoaderConfig = decode_tagged(&map).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn config_decodes_through_registry() {
        let mut registry = AttrRegistry::new();
        registry.register::<LoaderConfig>();

        let map = encode_tagged(&LoaderConfig::new(16)).unwrap();
        let decoded = registry.decode(map).unwrap();
        let config: LoaderConfig = decoded.downcast().unwrap();
        assert_eq!(config.batch_size, 16);
    }

    #[test]
    fn config_json_defaults_fill_in() {
        let config: LoaderConfig = serde_json::from_str(r#"{"batch_size": 8}"#).unwrap();
        assert_eq!(config.batch_size, 8);
        assert!(!config.shuffle);
        assert_eq!(config.timeout_secs, 0.0);
    }
}
