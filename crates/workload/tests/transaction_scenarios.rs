//! End-to-end transaction scenarios
//!
//! Runs every variant against a `ShardedStore` through real
//! `TransactionContext`s and checks the store afterwards.
//!
//! ## Running These Tests
//!
//! ```bash
//! cargo test -p strata-txn --test transaction_scenarios
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use strata_concurrency::{SteppingClock, TransactionManager};
use strata_core::{Key, KeySet, Storage, TxnStatus, Value};
use strata_storage::ShardedStore;
use strata_txn::{PartitionLayout, Transaction, WorkloadConfig, WorkloadGenerator};

// ============================================================================
// Test Helpers
// ============================================================================

fn pairs(raw: &[(u64, Value)]) -> BTreeMap<Key, Value> {
    raw.iter().map(|(k, v)| (Key::new(*k), v.clone())).collect()
}

fn keys(raw: &[u64]) -> KeySet {
    raw.iter().copied().map(Key::new).collect()
}

// ============================================================================
// Expect
// ============================================================================

mod expect {
    use super::*;

    #[test]
    fn test_commits_when_all_values_match() {
        let store = ShardedStore::with_entries([
            (Key::new(5), Value::Int(10)),
            (Key::new(7), Value::Int(20)),
        ]);
        let manager = TransactionManager::new();
        let mut txn = Transaction::expect(pairs(&[(5, Value::Int(10)), (7, Value::Int(20))]));
        assert_eq!(txn.execute(&manager, &store).unwrap(), TxnStatus::Committed);
    }

    #[test]
    fn test_aborts_on_mismatch() {
        let store = ShardedStore::with_entries([
            (Key::new(5), Value::Int(10)),
            (Key::new(7), Value::Int(99)),
        ]);
        let manager = TransactionManager::new();
        let mut txn = Transaction::expect(pairs(&[(5, Value::Int(10)), (7, Value::Int(20))]));

        let status = txn.execute(&manager, &store).unwrap();
        match status {
            TxnStatus::Aborted { reason } => assert!(reason.contains("key 7")),
            other => panic!("expected abort, got {:?}", other),
        }
        assert_eq!(manager.stats().aborted, 1);
    }

    #[test]
    fn test_aborts_on_missing_key() {
        let store = ShardedStore::with_entries([(Key::new(5), Value::Int(10))]);
        let manager = TransactionManager::new();
        let mut txn = Transaction::expect(pairs(&[(5, Value::Int(10)), (6, Value::Int(1))]));
        assert!(txn.execute(&manager, &store).unwrap().is_aborted());
    }

    #[test]
    fn test_from_keys_expects_one() {
        let store = ShardedStore::with_entries([
            (Key::new(1), Value::Int(1)),
            (Key::new(2), Value::Int(1)),
        ]);
        let manager = TransactionManager::new();
        let mut txn = Transaction::expect_keys(&keys(&[1, 2]));
        assert!(txn.execute(&manager, &store).unwrap().is_committed());
    }

    #[test]
    fn test_never_writes() {
        let store = ShardedStore::with_entries([(Key::new(1), Value::Int(1))]);
        let manager = TransactionManager::new();
        let mut txn = Transaction::expect(pairs(&[(1, Value::Int(1))]));
        txn.execute(&manager, &store).unwrap();
        assert_eq!(store.version(), 0);
    }
}

// ============================================================================
// Put
// ============================================================================

mod put {
    use super::*;

    #[test]
    fn test_values_visible_after_commit() {
        let store = ShardedStore::new();
        let manager = TransactionManager::new();
        let mut txn = Transaction::put(pairs(&[(3, Value::from("a")), (4, Value::from("b"))]));

        assert!(txn.execute(&manager, &store).unwrap().is_committed());
        assert_eq!(store.get(&Key::new(3)).unwrap(), Some(Value::from("a")));
        assert_eq!(store.get(&Key::new(4)).unwrap(), Some(Value::from("b")));
    }

    #[test]
    fn test_put_then_expect() {
        let store = ShardedStore::new();
        let manager = TransactionManager::new();
        let values = pairs(&[(10, Value::Int(1)), (11, Value::Bool(true))]);

        Transaction::put(values.clone())
            .execute(&manager, &store)
            .unwrap();
        let status = Transaction::expect(values)
            .execute(&manager, &store)
            .unwrap();
        assert!(status.is_committed());
        assert_eq!(manager.stats().committed, 2);
    }
}

// ============================================================================
// RMW
// ============================================================================

mod rmw {
    use super::*;

    #[test]
    fn test_increments_writeset() {
        let store = ShardedStore::with_entries([
            (Key::new(1), Value::Int(41)),
            (Key::new(2), Value::Int(-1)),
        ]);
        let manager = TransactionManager::new();
        let mut txn = Transaction::rmw(keys(&[0]), keys(&[1, 2, 3]), Duration::ZERO).unwrap();

        assert!(txn.execute(&manager, &store).unwrap().is_committed());
        assert_eq!(store.get(&Key::new(1)).unwrap(), Some(Value::Int(42)));
        assert_eq!(store.get(&Key::new(2)).unwrap(), Some(Value::Int(0)));
        // Absent counts as zero
        assert_eq!(store.get(&Key::new(3)).unwrap(), Some(Value::Int(1)));
        // Readset untouched
        assert_eq!(store.get(&Key::new(0)).unwrap(), None);
    }

    #[test]
    fn test_clones_increment_independently() {
        let store = ShardedStore::new();
        let manager = TransactionManager::new();
        let template = Transaction::rmw(KeySet::new(), keys(&[9]), Duration::ZERO).unwrap();

        for _ in 0..5 {
            let mut copy = template.clone();
            assert!(copy.execute(&manager, &store).unwrap().is_committed());
        }
        assert_eq!(store.get(&Key::new(9)).unwrap(), Some(Value::Int(5)));
        assert_eq!(template.status(), &TxnStatus::Pending);
    }

    #[test]
    fn test_busy_wait_bounded_by_context_clock() {
        let store = ShardedStore::new();
        let manager = TransactionManager::new();
        let clock = Arc::new(SteppingClock::new(Duration::from_millis(1)));
        let mut txn = Transaction::rmw(keys(&[1]), keys(&[2]), Duration::from_millis(10)).unwrap();

        let mut ctx = manager.begin_with_clock(&store, txn.readset(), txn.writeset(), clock.clone());
        assert!(txn.run(&mut ctx).unwrap().is_committed());
        // At least one reading per simulated millisecond
        assert!(clock.readings() >= 10);
    }

    #[test]
    fn test_busy_wait_consumes_wall_time() {
        let store = ShardedStore::new();
        let manager = TransactionManager::new();
        let mut txn = Transaction::rmw(KeySet::new(), keys(&[1]), Duration::from_millis(5)).unwrap();

        let start = Instant::now();
        txn.execute(&manager, &store).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_scenario_100_keys_10_threads_2_partitions() {
        let layout = PartitionLayout::new(100, 10).unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..100 {
            let txn =
                Transaction::rmw_partitioned(&mut rng, 100, 2, 3, 2, 10, Duration::ZERO).unwrap();
            assert_eq!(txn.readset().len(), 2);
            assert_eq!(txn.writeset().len(), 3);
            assert!(txn.readset().is_disjoint(txn.writeset()));
            assert_eq!(txn.partitions_touched(&layout).len(), 2);
        }
    }
}

// ============================================================================
// Generated workloads
// ============================================================================

mod workload {
    use super::*;

    #[test]
    fn test_generated_batch_respects_manifests() {
        let store = ShardedStore::new();
        let manager = TransactionManager::new();
        let config = WorkloadConfig::new()
            .with_dbsize(1000)
            .with_set_sizes(3, 4)
            .with_partitions(2, 8)
            .with_seed(77);
        let mut generator = WorkloadGenerator::new(config).unwrap();

        for mut txn in generator.batch(50).unwrap() {
            // The context rejects undeclared keys, so success means the
            // transaction stayed inside its manifest
            assert!(txn.execute(&manager, &store).unwrap().is_committed());
        }
        let stats = manager.stats();
        assert_eq!(stats.committed, 50);
        assert_eq!(stats.in_flight(), 0);
    }

    #[test]
    fn test_total_increments_match_writes() {
        let store = Arc::new(ShardedStore::new());
        let manager = Arc::new(TransactionManager::new());
        let config = WorkloadConfig::new()
            .with_dbsize(64)
            .with_set_sizes(1, 2)
            .with_partitions(1, 4)
            .with_seed(5);
        let txns = WorkloadGenerator::new(config).unwrap().batch(40).unwrap();

        // Each worker executes whole transactions on its own keys' partition
        let layout = PartitionLayout::new(64, 4).unwrap();
        let mut per_partition: Vec<Vec<Transaction>> = vec![Vec::new(); 4];
        for txn in txns {
            let part = *txn.partitions_touched(&layout).iter().next().unwrap();
            per_partition[part].push(txn);
        }

        let handles: Vec<_> = per_partition
            .into_iter()
            .map(|batch| {
                let store = Arc::clone(&store);
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    for mut txn in batch {
                        txn.execute(&manager, store.as_ref()).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let total: i64 = store
            .dump()
            .iter()
            .filter_map(|(_, v)| v.as_int())
            .sum();
        assert_eq!(total, 40 * 2);
        assert_eq!(manager.stats().committed, 40);
    }

    #[test]
    fn test_overlapping_increments_are_never_lost() {
        let store = ShardedStore::new();
        let manager = TransactionManager::new();
        let template =
            Transaction::rmw(KeySet::new(), keys(&[0, 1, 2, 3]), Duration::ZERO).unwrap();

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..500 {
                        template.clone().execute(&manager, &store).unwrap();
                    }
                });
            }
        });

        // Losers of a race abort instead of overwriting the winner
        let stats = manager.stats();
        assert_eq!(stats.committed + stats.aborted, 8 * 500);
        for key in 0..4 {
            assert_eq!(
                store.get(&Key::new(key)).unwrap(),
                Some(Value::Int(stats.committed as i64))
            );
        }
    }

    #[test]
    fn test_retried_increments_all_land() {
        let store = ShardedStore::new();
        let manager = TransactionManager::new();
        let template = Transaction::rmw(keys(&[9]), keys(&[0, 1]), Duration::ZERO).unwrap();

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..250 {
                        while !template.clone().execute(&manager, &store).unwrap().is_committed() {}
                    }
                });
            }
        });

        assert_eq!(manager.stats().committed, 1000);
        assert_eq!(store.get(&Key::new(0)).unwrap(), Some(Value::Int(1000)));
        assert_eq!(store.get(&Key::new(1)).unwrap(), Some(Value::Int(1000)));
    }
}
