#![cfg(test)]

// Property tests for Dictionary kept inside the crate so they can check
// structural link invariants that are not part of the public API.

use crate::config::CopyMode;
use crate::dictionary::Dictionary;
use crate::error::DictError;
use crate::hashing::HashFunction;
use crate::value::{TypeTag, Value};
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations: indices shrink toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, u8),
    Set(usize, u8),
    Delete(usize),
    Get(usize),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (u16, usize, Vec<String>, Vec<Op>)> {
    (
        1u16..=4,
        1usize..=4,
        proptest::collection::vec("[a-z]{0,4}", 1..=10),
    )
        .prop_flat_map(|(count, size, pool)| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                4 => (idx.clone(), any::<u8>()).prop_map(|(i, v)| Op::Insert(i, v)),
                2 => (idx.clone(), any::<u8>()).prop_map(|(i, v)| Op::Set(i, v)),
                2 => idx.clone().prop_map(Op::Delete),
                2 => idx.prop_map(Op::Get),
                1 => Just(Op::Iterate),
                1 => Just(Op::Clear),
            ];
            proptest::collection::vec(op, 1..80)
                .prop_map(move |ops| (count, size, pool.clone(), ops))
        })
}

fn key(pool: &[String], i: usize) -> Value {
    Value::from(pool[i].as_str())
}

// Property: state-machine equivalence against a HashMap plus an ordered
// list modelling the global list.
// Invariants exercised after every operation:
// - Duplicate inserts fail and leave len unchanged.
// - get/set/delete agree with the model; delete of an absent key is a no-op.
// - Every entry is in exactly one chain and once in the global list, with
//   symmetric prev/next links.
// - Iteration yields the live keys exactly once, most recent insert first.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((count, size, pool, ops) in arb_scenario()) {
        let mut sut = Dictionary::new(count, size, TypeTag::Str, TypeTag::U8, CopyMode::Deep).unwrap();
        let mut model: HashMap<String, u8> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    let present = model.contains_key(&pool[i]);
                    match sut.insert(key(&pool, i), Value::U8(v)) {
                        Ok(_) => {
                            prop_assert!(!present);
                            model.insert(pool[i].clone(), v);
                            order.insert(0, pool[i].clone());
                        }
                        Err(DictError::DuplicateKey) => prop_assert!(present),
                        Err(e) => prop_assert!(false, "unexpected error {e}"),
                    }
                }
                Op::Set(i, v) => {
                    let res = sut.set(&key(&pool, i), Value::U8(v));
                    match model.get_mut(&pool[i]) {
                        Some(slot) => {
                            prop_assert!(res.is_ok());
                            *slot = v;
                        }
                        None => prop_assert_eq!(res, Err(DictError::KeyNotFound)),
                    }
                }
                Op::Delete(i) => {
                    let removed = sut.delete(&key(&pool, i));
                    prop_assert_eq!(removed, model.remove(&pool[i]).is_some());
                    order.retain(|k| k != &pool[i]);
                }
                Op::Get(i) => {
                    let got = sut.get(&key(&pool, i)).cloned();
                    prop_assert_eq!(got, model.get(&pool[i]).map(|v| Value::U8(*v)));
                }
                Op::Iterate => {
                    let keys: Vec<String> = sut
                        .keys()
                        .map(|k| k.as_str().unwrap_or_default().to_string())
                        .collect();
                    prop_assert_eq!(&keys, &order);
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                    order.clear();
                }
            }
            sut.assert_consistent();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.load_stats().entries_per_table.iter().sum::<usize>(), model.len());
        }
    }
}

// Property: with every key colliding in every table, each insert lands in a
// chain no longer than any other candidate, so chain lengths never differ by
// more than one.
proptest! {
    #[test]
    fn prop_balanced_under_total_collision(count in 1u16..=6, n in 0u32..60) {
        let mut d = Dictionary::builder()
            .array_count(count)
            .array_size(3)
            .hash_function(HashFunction::Custom(|_, _| 5))
            .key_type(TypeTag::U32)
            .value_type(TypeTag::U32)
            .build()
            .unwrap();
        for i in 0..n {
            let before: Vec<usize> = (0..count).map(|t| d.chain_len(t, 2)).collect();
            let shortest = *before.iter().min().unwrap();
            d.insert(Value::U32(i), Value::U32(i)).unwrap();
            let (t, b) = d.locate(&Value::U32(i)).unwrap();
            prop_assert_eq!(b, 2);
            prop_assert_eq!(before[usize::from(t)], shortest);
            // first table holding the minimum wins
            prop_assert_eq!(before.iter().position(|&l| l == shortest), Some(usize::from(t)));

            let after: Vec<usize> = (0..count).map(|t| d.chain_len(t, 2)).collect();
            let spread = after.iter().max().unwrap() - after.iter().min().unwrap();
            prop_assert!(spread <= 1);
        }
        d.assert_consistent();
    }
}
