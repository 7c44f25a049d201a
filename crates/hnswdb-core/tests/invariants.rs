//! Property-based checks of the invariants enumerated in spec.md §8,
//! over randomized insert/delete/search sequences.

use proptest::prelude::*;

use hnswdb_core::index::HnswIndex;

const DIM: usize = 4;
const M: usize = 6;
const EF: usize = 24;

#[derive(Debug, Clone)]
enum Op {
    Insert(String, Vec<f64>),
    Delete(String),
    Search(Vec<f64>, usize),
}

fn id_strategy() -> impl Strategy<Value = String> {
    (0u32..12).prop_map(|n| format!("n{n}"))
}

fn vector_strategy() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-5.0f64..5.0, DIM)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (id_strategy(), vector_strategy()).prop_map(|(id, v)| Op::Insert(id, v)),
        id_strategy().prop_map(Op::Delete),
        (vector_strategy(), 1usize..5).prop_map(|(v, k)| Op::Search(v, k)),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(op_strategy(), 1..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// No neighbor list exceeds `M`, and every neighbor id resolves to a
    /// live node — at every point along the sequence, not just at the end.
    #[test]
    fn graph_invariants_hold_throughout(ops in ops_strategy()) {
        let idx = HnswIndex::with_seed(DIM, M, EF, 0xABCD_1234);
        let mut live: std::collections::HashSet<String> = std::collections::HashSet::new();

        for op in ops {
            match op {
                Op::Insert(id, v) => {
                    idx.insert(id.clone(), v).unwrap();
                    live.insert(id);
                }
                Op::Delete(id) => {
                    idx.delete(&id);
                    live.remove(&id);
                }
                Op::Search(q, k) => {
                    let results = idx.search(&q, k).unwrap();
                    prop_assert!(results.len() <= k.min(live.len()));
                    for w in results.windows(2) {
                        prop_assert!(w[0].similarity >= w[1].similarity);
                    }
                    for r in &results {
                        prop_assert!(live.contains(&r.id));
                    }
                }
            }

            for id in &live {
                let layers = idx.snapshot_neighbors(id).unwrap();
                for layer in &layers {
                    prop_assert!(layer.len() <= M);
                    for nb in layer {
                        prop_assert!(idx.contains(&nb.id), "dangling ref to {}", nb.id);
                    }
                }
            }
        }
    }

    /// A deleted id never resurfaces in a later search.
    #[test]
    fn deleted_ids_never_reappear(ops in ops_strategy()) {
        let idx = HnswIndex::with_seed(DIM, M, EF, 0xBEEF_F00D);
        let mut deleted: std::collections::HashSet<String> = std::collections::HashSet::new();

        for op in ops {
            match op {
                Op::Insert(id, v) => {
                    idx.insert(id.clone(), v).unwrap();
                    deleted.remove(&id);
                }
                Op::Delete(id) => {
                    idx.delete(&id);
                    deleted.insert(id);
                }
                Op::Search(q, k) => {
                    let results = idx.search(&q, k).unwrap();
                    for r in &results {
                        prop_assert!(!deleted.contains(&r.id));
                    }
                }
            }
        }
    }

    /// Replaying the same insert sequence under the same seed produces a
    /// byte-identical graph (spec.md §8 item 7).
    #[test]
    fn fixed_seed_and_order_reproduce_the_same_graph(
        ids in proptest::collection::vec(0u32..30, 5..25),
        seed in any::<u64>(),
    ) {
        let vectors: Vec<Vec<f64>> = ids
            .iter()
            .map(|&i| vec![(i as f64).sin(), (i as f64).cos(), i as f64 * 0.1, -(i as f64)])
            .collect();

        let a = HnswIndex::with_seed(DIM, M, EF, seed);
        let b = HnswIndex::with_seed(DIM, M, EF, seed);
        for (i, v) in ids.iter().zip(vectors.iter()) {
            let id = format!("n{i}");
            a.insert(id.clone(), v.clone()).unwrap();
            b.insert(id, v.clone()).unwrap();
        }

        for i in &ids {
            let id = format!("n{i}");
            prop_assert_eq!(a.snapshot_neighbors(&id), b.snapshot_neighbors(&id));
        }
    }
}
