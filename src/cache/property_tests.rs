//! Property-Based Tests for the Cache Module
//!
//! Drives the manager over an in-memory store with proptest and checks it
//! against a plain map model.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_test::block_on;

use crate::cache::{CacheManager, InvalidationStrategy};
use crate::store::{glob_match, MemoryStore};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 1000;
const TEST_DEFAULT_TTL: u64 = 300;

fn memory_manager() -> Arc<CacheManager> {
    Arc::new(CacheManager::with_store(
        Arc::new(MemoryStore::new(TEST_MAX_ENTRIES)),
        TEST_DEFAULT_TTL,
    ))
}

// == Strategies ==
/// Keys shaped like `<domain>:<id>[:<qualifier>]`
fn key_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["task", "form", "project", "user"]),
        "[a-z0-9]{1,4}",
        prop::option::of(prop::sample::select(vec!["list", "members", "open"])),
    )
        .prop_map(|(domain, id, qualifier)| match qualifier {
            Some(q) => format!("{}:{}:{}", domain, id, q),
            None => format!("{}:{}", domain, id),
        })
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Delete { key: String },
    DeletePattern { domain: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => prop::sample::select(vec!["task", "form", "project", "user"])
            .prop_map(|d| CacheOp::DeletePattern { domain: d.to_string() }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Whatever is set comes back equal through JSON
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy(), n in any::<i64>()) {
        let manager = memory_manager();
        block_on(async {
            manager.set(&key, &(value.clone(), n), None).await;
            let read: Option<(String, i64)> = manager.get(&key).await;
            prop_assert_eq!(read, Some((value, n)));
            Ok(())
        })?;
    }

    // A deleted key reads as absent
    #[test]
    fn prop_delete_removes_entry(key in key_strategy(), value in value_strategy()) {
        let manager = memory_manager();
        block_on(async {
            manager.set(&key, &value, None).await;
            manager.delete(&key).await;
            prop_assert!(!manager.exists(&key).await);
            prop_assert_eq!(manager.get::<String>(&key).await, None);
            Ok(())
        })?;
    }

    // Any op sequence leaves the store agreeing with a map model
    #[test]
    fn prop_operations_match_model(ops in prop::collection::vec(cache_op_strategy(), 1..40)) {
        let manager = memory_manager();
        let mut model: HashMap<String, String> = HashMap::new();

        block_on(async {
            for op in ops {
                match op {
                    CacheOp::Set { key, value } => {
                        manager.set(&key, &value, None).await;
                        model.insert(key, value);
                    }
                    CacheOp::Delete { key } => {
                        manager.delete(&key).await;
                        model.remove(&key);
                    }
                    CacheOp::DeletePattern { domain } => {
                        let pattern = format!("{}:*", domain);
                        let expected = model.keys().filter(|k| glob_match(&pattern, k)).count() as u64;
                        let deleted = manager.delete_pattern(&pattern).await;
                        prop_assert_eq!(deleted, expected);
                        model.retain(|k, _| !glob_match(&pattern, k));
                    }
                }
            }

            for (key, value) in &model {
                let got = manager.get::<String>(key).await;
                prop_assert_eq!(got.as_ref(), Some(value));
            }
            Ok(())
        })?;
    }

    // Registering an edge any number of times stores it once
    #[test]
    fn prop_duplicate_registration_single_edge(
        parent in key_strategy(),
        dependent in key_strategy(),
        repeats in 1usize..5,
    ) {
        let strategy = InvalidationStrategy::new(memory_manager());
        for _ in 0..repeats {
            strategy.register_dependency(&parent, &dependent);
        }
        prop_assert_eq!(strategy.get_dependencies(&parent), vec![dependent]);
        prop_assert_eq!(strategy.edge_count(), 1);
    }

    // Invalidating the head of a chain removes every link and nothing else
    #[test]
    fn prop_cascade_reaches_whole_chain(
        chain in prop::collection::hash_set("[a-z]{1,6}", 2..8),
        bystander in "[A-Z]{1,6}",
        close_cycle in any::<bool>(),
    ) {
        let chain: Vec<String> = chain.into_iter().map(|k| format!("chain:{}", k)).collect();
        let bystander = format!("other:{}", bystander);
        let manager = memory_manager();
        let strategy = InvalidationStrategy::new(manager.clone());

        for pair in chain.windows(2) {
            strategy.register_dependency(&pair[0], &pair[1]);
        }
        if close_cycle {
            strategy.register_dependency(&chain[chain.len() - 1], &chain[0]);
        }

        block_on(async {
            for key in chain.iter().chain(std::iter::once(&bystander)) {
                manager.set(key, &1u8, None).await;
            }

            let deleted = strategy.invalidate(&chain[0]).await;
            prop_assert_eq!(deleted, chain.len());

            let mut remaining = HashSet::new();
            for key in chain.iter().chain(std::iter::once(&bystander)) {
                if manager.exists(key).await {
                    remaining.insert(key.clone());
                }
            }
            prop_assert_eq!(remaining, HashSet::from([bystander.clone()]));
            Ok(())
        })?;
    }
}
