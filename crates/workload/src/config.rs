//! Workload configuration
//!
//! Describes the shape of randomized read-modify-write transactions.
//! Can be built in code with the `with_*` builder methods or loaded from a
//! TOML file.
//!
//! # Example
//!
//! ```toml
//! dbsize = 100000
//! readset_size = 2
//! writeset_size = 3
//! # Confine every transaction to 2 of 8 partitions.
//! # Omit for whole-keyspace sampling.
//! partitions = 2
//! thread_count = 8
//! duration_us = 100
//! seed = 42
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strata_core::{Error, Result};

use crate::partition::PartitionLayout;
use crate::sampler::{KeySampler, DEFAULT_MAX_DRAW_ATTEMPTS};
use crate::transaction::Transaction;

/// Shape of generated read-modify-write transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Keyspace size; keys are drawn from `[0, dbsize)`
    #[serde(default = "default_dbsize")]
    pub dbsize: u64,
    /// Keys read per transaction
    #[serde(default)]
    pub readset_size: usize,
    /// Keys written per transaction
    #[serde(default = "default_writeset_size")]
    pub writeset_size: usize,
    /// Partitions each transaction touches; `None` samples the whole keyspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<usize>,
    /// Number of partitions the keyspace is split into
    #[serde(default = "default_thread_count")]
    pub thread_count: usize,
    /// Simulated CPU cost per transaction, in microseconds
    #[serde(default)]
    pub duration_us: u64,
    /// Seed for reproducible generation; `None` seeds from entropy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Per-key retry budget of the sampler
    #[serde(default = "default_max_draw_attempts")]
    pub max_draw_attempts: usize,
}

fn default_dbsize() -> u64 {
    1_000_000
}

fn default_writeset_size() -> usize {
    10
}

fn default_thread_count() -> usize {
    1
}

fn default_max_draw_attempts() -> usize {
    DEFAULT_MAX_DRAW_ATTEMPTS
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            dbsize: default_dbsize(),
            readset_size: 0,
            writeset_size: default_writeset_size(),
            partitions: None,
            thread_count: default_thread_count(),
            duration_us: 0,
            seed: None,
            max_draw_attempts: default_max_draw_attempts(),
        }
    }
}

impl WorkloadConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set keyspace size
    pub fn with_dbsize(mut self, dbsize: u64) -> Self {
        self.dbsize = dbsize;
        self
    }

    /// Set readset and writeset sizes
    pub fn with_set_sizes(mut self, readset_size: usize, writeset_size: usize) -> Self {
        self.readset_size = readset_size;
        self.writeset_size = writeset_size;
        self
    }

    /// Confine transactions to `partitions` of `thread_count` partitions
    pub fn with_partitions(mut self, partitions: usize, thread_count: usize) -> Self {
        self.partitions = Some(partitions);
        self.thread_count = thread_count;
        self
    }

    /// Set the number of partitions/worker threads
    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    /// Set the simulated cost
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self
    }

    /// Set the generation seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the sampler's per-key retry budget
    pub fn with_max_draw_attempts(mut self, attempts: usize) -> Self {
        self.max_draw_attempts = attempts;
        self
    }

    /// Simulated cost as a `Duration`
    pub fn duration(&self) -> Duration {
        Duration::from_micros(self.duration_us)
    }

    /// Sampler configured with this config's retry budget
    pub fn sampler(&self) -> KeySampler {
        KeySampler::new().with_max_draw_attempts(self.max_draw_attempts)
    }

    /// Check every construction precondition up front
    ///
    /// # Errors
    ///
    /// `InvalidConfig` describing the first violated precondition.
    pub fn validate(&self) -> Result<()> {
        let total = self.readset_size as u64 + self.writeset_size as u64;
        if self.dbsize < total {
            return Err(Error::invalid_config(format!(
                "dbsize {} is smaller than readset_size {} + writeset_size {}",
                self.dbsize, self.readset_size, self.writeset_size
            )));
        }
        if self.thread_count == 0 {
            return Err(Error::invalid_config("thread_count must be at least 1"));
        }
        if self.max_draw_attempts == 0 {
            return Err(Error::invalid_config("max_draw_attempts must be at least 1"));
        }
        if let Some(partitions) = self.partitions {
            let layout = PartitionLayout::new(self.dbsize, self.thread_count)?;
            let k = partitions.min(self.thread_count) as u64;
            if total > 0 && k == 0 {
                return Err(Error::invalid_config(
                    "partitions must be at least 1 for a non-empty transaction",
                ));
            }
            if total < k {
                return Err(Error::invalid_config(format!(
                    "{} keys cannot cover {} partitions",
                    total, k
                )));
            }
            if total > k * layout.chunk_size() {
                return Err(Error::invalid_config(format!(
                    "{} keys exceed capacity of {} partitions with chunk size {}",
                    total,
                    k,
                    layout.chunk_size()
                )));
            }
        }
        Ok(())
    }

    /// Build one read-modify-write transaction of this shape
    ///
    /// # Errors
    ///
    /// Same as [`KeySampler::uniform`] / [`KeySampler::partitioned`].
    pub fn build_rmw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Transaction> {
        let sampler = self.sampler();
        let keys = match self.partitions {
            Some(partitions) => sampler.partitioned(
                rng,
                self.dbsize,
                self.readset_size,
                self.writeset_size,
                partitions,
                self.thread_count,
            )?,
            None => sampler.uniform(rng, self.dbsize, self.readset_size, self.writeset_size)?,
        };
        Ok(Transaction::rmw_sampled(keys, self.duration()))
    }

    /// Parse config from TOML text
    ///
    /// # Errors
    ///
    /// `ConfigError` on malformed TOML, `InvalidConfig` if the parsed
    /// config fails [`validate`](Self::validate).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WorkloadConfig = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse workload config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::ConfigError(msg) => {
                Error::ConfigError(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Serialize this config to TOML and write it to the given path
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = WorkloadConfig::default();
        assert_eq!(config.dbsize, 1_000_000);
        assert_eq!(config.writeset_size, 10);
        assert_eq!(config.partitions, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = WorkloadConfig::new()
            .with_dbsize(100)
            .with_set_sizes(2, 3)
            .with_partitions(2, 10)
            .with_duration(Duration::from_micros(250))
            .with_seed(7);
        assert_eq!(config.dbsize, 100);
        assert_eq!(config.readset_size, 2);
        assert_eq!(config.writeset_size, 3);
        assert_eq!(config.partitions, Some(2));
        assert_eq!(config.thread_count, 10);
        assert_eq!(config.duration(), Duration::from_micros(250));
        assert_eq!(config.seed, Some(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_keyspace_too_small() {
        let config = WorkloadConfig::new().with_dbsize(4).with_set_sizes(3, 2);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validation_zero_threads() {
        let config = WorkloadConfig::new().with_thread_count(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validation_too_few_keys_for_partitions() {
        let config = WorkloadConfig::new()
            .with_dbsize(100)
            .with_set_sizes(1, 1)
            .with_partitions(3, 10);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validation_partition_capacity() {
        let config = WorkloadConfig::new()
            .with_dbsize(100)
            .with_set_sizes(10, 11)
            .with_partitions(2, 10);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validation_clamps_partitions() {
        let config = WorkloadConfig::new()
            .with_dbsize(100)
            .with_set_sizes(2, 2)
            .with_partitions(16, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_rmw_uniform_and_partitioned() {
        let mut rng = StdRng::seed_from_u64(1);
        let uniform = WorkloadConfig::new()
            .with_dbsize(1000)
            .with_set_sizes(2, 3)
            .build_rmw(&mut rng)
            .unwrap();
        assert_eq!(uniform.readset().len(), 2);
        assert_eq!(uniform.writeset().len(), 3);

        let config = WorkloadConfig::new()
            .with_dbsize(1000)
            .with_set_sizes(2, 3)
            .with_partitions(3, 10);
        let partitioned = config.build_rmw(&mut rng).unwrap();
        let layout = PartitionLayout::new(1000, 10).unwrap();
        assert_eq!(partitioned.partitions_touched(&layout).len(), 3);
    }

    #[test]
    fn test_from_toml_str_defaults() {
        let config = WorkloadConfig::from_toml_str("dbsize = 500\n").unwrap();
        assert_eq!(config.dbsize, 500);
        assert_eq!(config.writeset_size, 10);
        assert_eq!(config.thread_count, 1);
        assert_eq!(config.max_draw_attempts, DEFAULT_MAX_DRAW_ATTEMPTS);
    }

    #[test]
    fn test_from_toml_str_full() {
        let config = WorkloadConfig::from_toml_str(
            r#"
dbsize = 100
readset_size = 2
writeset_size = 3
partitions = 2
thread_count = 10
duration_us = 100
seed = 42
"#,
        )
        .unwrap();
        assert_eq!(config.partitions, Some(2));
        assert_eq!(config.duration(), Duration::from_micros(100));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_from_toml_str_malformed() {
        let err = WorkloadConfig::from_toml_str("dbsize = \"lots\"").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_from_toml_str_rejects_invalid() {
        let err = WorkloadConfig::from_toml_str("dbsize = 2\nwriteset_size = 3\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("workload.toml");
        let config = WorkloadConfig::new()
            .with_dbsize(100)
            .with_set_sizes(1, 1)
            .with_partitions(2, 4)
            .with_seed(3);
        config.write_to_file(&path).unwrap();
        assert_eq!(WorkloadConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_from_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = WorkloadConfig::from_file(&temp_dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
