//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the fast-tier store and the pattern matcher against
//! arbitrary inputs.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{PatternMatcher, PatternMode, TierStore};

// == Test Configuration ==
const TEST_MAX_BYTES: usize = 2048;
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Cache keys in the shape the maintenance jobs use
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(:[a-z0-9-]{1,10}){0,3}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..512)
}

#[derive(Debug, Clone)]
enum StoreOp {
    Set { key: String, value: Vec<u8> },
    Get { key: String },
    Remove { key: String },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| StoreOp::Set { key, value }),
        key_strategy().prop_map(|key| StoreOp::Get { key }),
        key_strategy().prop_map(|key| StoreOp::Remove { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Byte budget holds after any operation sequence, and the accounted
    // bytes equal the sum of what is actually stored.
    #[test]
    fn prop_byte_budget_never_exceeded(ops in prop::collection::vec(store_op_strategy(), 1..60)) {
        let mut store = TierStore::new(TEST_MAX_BYTES);
        let mut sizes: HashMap<String, usize> = HashMap::new();

        for op in ops {
            match op {
                StoreOp::Set { key, value } => {
                    let size = value.len();
                    store.set(&key, Arc::new(value), TEST_TTL).unwrap();
                    sizes.insert(key, size);
                }
                StoreOp::Get { key } => {
                    let _ = store.get(&key);
                }
                StoreOp::Remove { key } => {
                    store.remove(&key);
                    sizes.remove(&key);
                }
            }
            prop_assert!(store.used_bytes() <= TEST_MAX_BYTES);
        }

        let live: usize = sizes
            .iter()
            .filter(|(key, _)| store.contains(key))
            .map(|(_, size)| *size)
            .sum();
        prop_assert_eq!(store.used_bytes(), live);
    }

    // The most recent write to a key is what a read returns.
    #[test]
    fn prop_last_write_wins(
        key in key_strategy(),
        first in value_strategy(),
        second in value_strategy(),
    ) {
        let mut store = TierStore::new(TEST_MAX_BYTES);

        store.set(&key, Arc::new(first), TEST_TTL).unwrap();
        store.set(&key, Arc::new(second.clone()), TEST_TTL).unwrap();

        let entry = store.get(&key).unwrap();
        prop_assert_eq!(entry.data.as_slice(), second.as_slice());
        prop_assert_eq!(store.len(), 1);
    }

    // A glob without wildcards matches exactly the key it spells.
    #[test]
    fn prop_literal_glob_matches_only_itself(key in key_strategy(), other in key_strategy()) {
        let matcher = PatternMatcher::compile(&key, PatternMode::Strict).unwrap();

        prop_assert!(matcher.is_match(&key));
        prop_assert_eq!(matcher.is_match(&other), key == other);
    }

    // `prefix*` matches any key starting with the prefix, in both modes.
    #[test]
    fn prop_prefix_glob(prefix in key_strategy(), suffix in "[a-z0-9:-]{0,12}") {
        let key = format!("{}{}", prefix, suffix);

        for mode in [PatternMode::Loose, PatternMode::Strict] {
            let matcher = PatternMatcher::compile(&format!("{}*", prefix), mode).unwrap();
            prop_assert!(matcher.is_match(&key));
        }
    }
}
