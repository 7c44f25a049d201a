//! The end-to-end scenarios enumerated in spec.md §8, encoded literally.

use hnswdb_core::index::HnswIndex;

#[test]
fn tiny_exact_recovery() {
    let idx = HnswIndex::new(3, 16, 64);
    idx.insert("id1", vec![1.0, 0.0, 0.0]).unwrap();
    idx.insert("id2", vec![0.0, 1.0, 0.0]).unwrap();
    idx.insert("id3", vec![1.0, 1.0, 0.0]).unwrap();

    let results = idx.search(&[1.0, 0.0, 0.0], 2).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "id1");
    assert!((results[0].similarity - 1.0).abs() < 1e-9);
    assert_eq!(results[1].id, "id3");
    assert!((results[1].similarity - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
}

#[test]
fn delete_removes_hit() {
    let idx = HnswIndex::new(3, 16, 64);
    idx.insert("id1", vec![1.0, 0.0, 0.0]).unwrap();
    idx.insert("id2", vec![0.0, 1.0, 0.0]).unwrap();
    idx.insert("id3", vec![1.0, 1.0, 0.0]).unwrap();

    idx.delete("id1");

    let results = idx.search(&[1.0, 0.0, 0.0], 2).unwrap();
    assert_eq!(results[0].id, "id3");
    assert!(results.iter().all(|n| n.id != "id1"));
}

#[test]
fn duplicate_id_replaces_rather_than_duplicates() {
    let idx = HnswIndex::new(3, 16, 64);
    idx.insert("id1", vec![1.0, 0.0, 0.0]).unwrap();
    idx.insert("id1", vec![0.0, 0.0, 1.0]).unwrap();

    assert_eq!(idx.len(), 1);

    let results = idx.search(&[0.0, 0.0, 1.0], 1).unwrap();
    assert_eq!(results[0].id, "id1");
    assert!((results[0].similarity - 1.0).abs() < 1e-9);
}

#[test]
fn zero_vector_never_beats_a_real_match() {
    let idx = HnswIndex::new(3, 16, 64);
    idx.insert("z", vec![0.0, 0.0, 0.0]).unwrap();
    idx.insert("a", vec![1.0, 0.0, 0.0]).unwrap();

    let results = idx.search(&[1.0, 0.0, 0.0], 2).unwrap();
    assert_eq!(results[0].id, "a");
    assert!((results[0].similarity - 1.0).abs() < 1e-9);
    let z = results.iter().find(|n| n.id == "z").unwrap();
    assert_eq!(z.similarity, 0.0);
}

#[test]
fn empty_index_search_returns_empty() {
    let idx = HnswIndex::new(3, 16, 64);
    let results = idx.search(&[1.0, 0.0, 0.0], 5).unwrap();
    assert!(results.is_empty());
}

#[test]
fn fan_out_cap_holds_across_ten_inserts() {
    let idx = HnswIndex::with_seed(2, 2, 16, 12345);
    let points = [
        [1.0, 0.0],
        [0.0, 1.0],
        [1.0, 1.0],
        [-1.0, 0.0],
        [0.0, -1.0],
        [-1.0, -1.0],
        [2.0, 1.0],
        [1.0, 2.0],
        [-2.0, 1.0],
        [1.0, -2.0],
    ];
    for (i, p) in points.iter().enumerate() {
        idx.insert(format!("p{i}"), p.to_vec()).unwrap();
    }

    for i in 0..points.len() {
        let layers = idx.snapshot_neighbors(&format!("p{i}")).unwrap();
        for layer in layers {
            assert!(layer.len() <= 2, "layer had {} neighbors, M=2", layer.len());
        }
    }
}
