//! Seeded stream of generated transactions

use rand::rngs::StdRng;
use rand::SeedableRng;
use strata_core::Result;
use tracing::debug;

use crate::config::WorkloadConfig;
use crate::transaction::Transaction;

/// Produces read-modify-write transactions shaped by a [`WorkloadConfig`]
///
/// The same config and seed always yield the same sequence.
#[derive(Debug)]
pub struct WorkloadGenerator {
    config: WorkloadConfig,
    rng: StdRng,
    generated: u64,
}

impl WorkloadGenerator {
    /// Validate `config` and seed the generator
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the config fails validation.
    pub fn new(config: WorkloadConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!(target: "strata::workload", config = ?config, "Workload generator ready");
        Ok(Self {
            config,
            rng,
            generated: 0,
        })
    }

    /// Config this generator was built from
    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Number of transactions produced so far
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Produce the next transaction
    pub fn next_txn(&mut self) -> Result<Transaction> {
        let txn = self.config.build_rmw(&mut self.rng)?;
        self.generated += 1;
        Ok(txn)
    }

    /// Produce `count` transactions
    pub fn batch(&mut self, count: usize) -> Result<Vec<Transaction>> {
        (0..count).map(|_| self.next_txn()).collect()
    }
}

impl Iterator for WorkloadGenerator {
    type Item = Result<Transaction>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_txn())
    }
}
