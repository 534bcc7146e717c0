use mapset::KeyedSetStore;
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Clone)]
enum Operation {
    Set(u8, Vec<u8>),
    Delete(Option<u8>, Vec<u8>),
    Clear(Option<u8>),
}

fn operation() -> impl Strategy<Value = Operation> {
    let key = 0u8..8;
    let values = proptest::collection::vec(0u8..6, 0..4);
    prop_oneof![
        4 => (key.clone(), values.clone()).prop_map(|(k, vs)| Operation::Set(k, vs)),
        4 => (proptest::option::of(key.clone()), values).prop_map(|(k, vs)| Operation::Delete(k, vs)),
        1 => proptest::option::weighted(0.9, key).prop_map(Operation::Clear),
    ]
}

proptest! {
    #[test]
    fn test_store_matches_std_model(ops in proptest::collection::vec(operation(), 1..200)) {
        let mut model: HashMap<u8, HashSet<u8>> = HashMap::new();
        let mut expected_drains = Vec::new();

        let drained = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&drained);
        let mut store = KeyedSetStore::new();
        store.register_removal_handler(move |key: &u8| sink.borrow_mut().push(*key));

        for op in ops {
            match op {
                Operation::Set(k, vs) => {
                    if !vs.is_empty() {
                        model.entry(k).or_default().extend(vs.iter().copied());
                    }
                    store.set(k, vs);
                }
                Operation::Delete(None, vs) => {
                    store.delete(None, vs);
                }
                Operation::Delete(Some(k), vs) => {
                    if vs.is_empty() {
                        model.remove(&k);
                    } else if let Some(bucket) = model.get_mut(&k) {
                        for v in &vs {
                            bucket.remove(v);
                        }
                        if bucket.is_empty() {
                            model.remove(&k);
                            expected_drains.push(k);
                        }
                    }
                    store.delete(Some(&k), vs);
                }
                Operation::Clear(Some(k)) => {
                    model.remove(&k);
                    store.clear(Some(&k));
                }
                Operation::Clear(None) => {
                    model.clear();
                    store.clear(None);
                }
            }

            // No key is ever left with an empty bucket.
            prop_assert!(store.buckets().all(|bucket| !bucket.is_empty()));
            prop_assert_eq!(store.size(None), model.len());
        }

        for (k, bucket) in &model {
            prop_assert_eq!(store.size(Some(k)), bucket.len());
            for v in bucket {
                prop_assert!(store.has(k, Some(v)));
            }
        }
        prop_assert_eq!(&*drained.borrow(), &expected_drains);
    }

    #[test]
    fn test_bucket_order_is_first_insertion(values in proptest::collection::vec(any::<u16>(), 1..64)) {
        let mut store = KeyedSetStore::new();
        for v in &values {
            store.set("k", [*v]);
        }

        let mut seen = HashSet::new();
        let expected: Vec<u16> = values.iter().copied().filter(|v| seen.insert(*v)).collect();

        let mut actual = Vec::new();
        store.for_each_in_bucket("k", |v| actual.push(*v));
        prop_assert_eq!(actual, expected);
    }
}
