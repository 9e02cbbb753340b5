//! strata-workload: generate a batch of synthetic transactions and run it
//! against the in-memory store.
//!
//! ```text
//! strata-workload [--config workload.toml] [--count 10000] [--threads 4]
//! ```
//!
//! Each worker thread owns whole transactions. Partitioned workloads are
//! routed by the first partition a transaction touches, so a worker mostly
//! sees its own shard; whole-keyspace workloads are dealt round-robin.
//! Transactions on different workers may still share keys. Commits are
//! validated, so the loser of such a race is counted as aborted.
//!
//! Exits with status 2 when the workload cannot be loaded or is invalid,
//! and 1 when running it fails.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{value_parser, Arg, Command};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use strata_workload::{
    PartitionLayout, Result, ShardedStore, Transaction, TransactionManager, WorkloadConfig,
    WorkloadGenerator,
};

fn build_cli() -> Command {
    Command::new("strata-workload")
        .about("Run synthetic transactions against an in-memory store")
        .arg(
            Arg::new("config")
                .long("config")
                .help("Workload config file (TOML)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .help("Transactions to generate (default: 10000)")
                .value_parser(value_parser!(usize))
                .default_value("10000"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .help("Worker threads (default: thread_count from the config)")
                .value_parser(value_parser!(usize)),
        )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = build_cli().get_matches();
    let config_path = matches.get_one::<PathBuf>("config").cloned();
    let count = matches.get_one::<usize>("count").copied().unwrap_or(10_000);
    let threads = matches.get_one::<usize>("threads").copied();

    if let Err(e) = run(config_path, count, threads) {
        if e.is_construction_error() {
            eprintln!("Invalid workload: {}", e);
            process::exit(2);
        }
        error!(target: "strata::workload", error = %e, "Workload failed");
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(config_path: Option<PathBuf>, count: usize, threads: Option<usize>) -> Result<()> {
    let config = match config_path {
        Some(path) => WorkloadConfig::from_file(&path)?,
        None => WorkloadConfig::default(),
    };
    let workers = threads.unwrap_or(config.thread_count).max(1);

    let mut generator = WorkloadGenerator::new(config.clone())?;
    let batch = generator.batch(count)?;
    let queues = route(batch, &config, workers)?;

    let store = ShardedStore::new();
    let manager = TransactionManager::new();
    let start = Instant::now();

    std::thread::scope(|scope| -> Result<()> {
        let handles: Vec<_> = queues
            .into_iter()
            .map(|queue| {
                let store = &store;
                let manager = &manager;
                scope.spawn(move || -> Result<()> {
                    for mut txn in queue {
                        txn.execute(manager, store)?;
                    }
                    Ok(())
                })
            })
            .collect();
        for handle in handles {
            match handle.join() {
                Ok(result) => result?,
                Err(_) => {
                    return Err(strata_workload::Error::invalid_state("worker thread panicked"))
                }
            }
        }
        Ok(())
    })?;

    let elapsed = start.elapsed();
    let stats = manager.stats();
    info!(
        target: "strata::workload",
        transactions = count,
        workers,
        committed = stats.committed,
        aborted = stats.aborted,
        keys_written = store.version(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Workload finished"
    );
    Ok(())
}

/// Split `batch` into one queue per worker
fn route(
    batch: Vec<Transaction>,
    config: &WorkloadConfig,
    workers: usize,
) -> Result<Vec<Vec<Transaction>>> {
    let mut queues: Vec<Vec<Transaction>> = vec![Vec::new(); workers];
    let layout = match config.partitions {
        Some(_) => Some(PartitionLayout::new(config.dbsize, config.thread_count)?),
        None => None,
    };
    for (i, txn) in batch.into_iter().enumerate() {
        let slot = layout
            .as_ref()
            .and_then(|layout| txn.partitions_touched(layout).into_iter().next())
            .unwrap_or(i);
        queues[slot % workers].push(txn);
    }
    Ok(queues)
}
