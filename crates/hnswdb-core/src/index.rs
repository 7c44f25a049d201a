//! The HNSW index: insert/delete/search over a layered proximity graph.
//!
//! Ground: `index/hnsw/native/graph.rs` in the teacher crate for the overall
//! shape (a single struct owning vectors + per-layer adjacency behind locks,
//! xorshift layer assignment, best-first `search_layer`), simplified and
//! re-keyed by string id per spec.md §3-§4.C. Two deliberate divergences
//! from the teacher (spelled out in spec.md §9, "Suspicious source
//! behaviors"):
//!
//! - neighbor-list truncation keeps the *best* `M` by similarity (sort +
//!   truncate), not the first `M` inserted, and not the teacher's VAMANA
//!   alpha-diversified heuristic;
//! - `search_layer` always expands from the entry point(s) the caller
//!   passes in — it never re-picks an entry point by scanning the node map.

use std::collections::BinaryHeap;
use std::cmp::Ordering;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use crate::distance::cosine;
use crate::error::{Error, Result};
use crate::node::{Neighbor, Node};
use crate::rng::{draw_layer, LayerRng, XorShift64Rng};

/// A candidate during best-first expansion, ordered by:
/// 1. similarity descending,
/// 2. insertion-into-frontier order ascending (earlier wins),
/// 3. id lexicographically ascending.
///
/// `Ord` is defined so that "greater" means "higher priority to pop/keep",
/// matching spec.md §4.C's ordering and tie-break rules directly.
#[derive(Debug, Clone)]
struct Candidate {
    sim: f64,
    seq: u64,
    id: String,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sim
            .total_cmp(&other.sim)
            .then_with(|| other.seq.cmp(&self.seq))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl Candidate {
    fn into_neighbor(self) -> Neighbor {
        Neighbor::new(self.id, self.sim)
    }
}

/// The node map plus the handful of fields mutated only under the write
/// lock: `max_layer` and the layer-assignment RNG (spec.md §5: "the node
/// map, each node's neighbor lists, and maxLayer are the only mutable
/// shared state... the PRNG... must be guarded by the write lock").
struct Inner {
    nodes: IndexMap<String, Node>,
    max_layer: usize,
    rng: Box<dyn LayerRng>,
}

/// Hierarchical Navigable Small World index over `D`-dimensional vectors.
///
/// `D`, `M`, and `ef` are immutable for the lifetime of the index
/// (spec.md §3). The whole node map is guarded by one
/// `parking_lot::RwLock`: reads (`search`) take the read lock, writes
/// (`insert`/`delete`) take the write lock for the entire operation
/// (spec.md §5).
pub struct HnswIndex {
    dim: usize,
    m: usize,
    ef: usize,
    inner: RwLock<Inner>,
}

impl HnswIndex {
    /// Creates an empty index with a fixed default seed, so two freshly
    /// constructed indexes with the same insertion order produce byte
    /// identical graphs (spec.md §8 item 7).
    #[must_use]
    pub fn new(dim: usize, m: usize, ef: usize) -> Self {
        Self::with_seed(dim, m, ef, 0x5DEE_CE66_D1A4_B5B5)
    }

    /// Creates an empty index seeded explicitly, for deterministic tests.
    #[must_use]
    pub fn with_seed(dim: usize, m: usize, ef: usize, seed: u64) -> Self {
        Self {
            dim,
            m,
            ef,
            inner: RwLock::new(Inner {
                nodes: IndexMap::new(),
                max_layer: 0,
                rng: Box::new(XorShift64Rng::new(seed)),
            }),
        }
    }

    /// Vector dimension `D`.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Target fan-out per layer, `M`.
    #[must_use]
    pub fn m(&self) -> usize {
        self.m
    }

    /// Default candidate-list width `ef`.
    #[must_use]
    pub fn ef(&self) -> usize {
        self.ef
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().nodes.len()
    }

    /// True if the index has no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current `maxLayer` (never lowered on delete except back to 0 when
    /// the index becomes empty — spec.md §9).
    #[must_use]
    pub fn max_layer(&self) -> usize {
        self.inner.read().max_layer
    }

    /// True if a live node with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().nodes.contains_key(id)
    }

    /// Returns a clone of a node's per-layer neighbor lists, for tests and
    /// diagnostics (e.g. checking the fan-out cap holds).
    #[must_use]
    pub fn snapshot_neighbors(&self, id: &str) -> Option<Vec<Vec<Neighbor>>> {
        self.inner.read().nodes.get(id).map(|n| n.layers.clone())
    }

    /// Inserts `(id, vector)`. A duplicate id is replaced: the existing
    /// node is deleted, then the new one is inserted fresh (spec.md §4.C).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `vector.len() != self.dim()`;
    /// in that case nothing is mutated.
    pub fn insert(&self, id: impl Into<String>, vector: Vec<f64>) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        let id = id.into();

        let mut inner = self.inner.write();

        if inner.nodes.contains_key(&id) {
            Self::delete_locked(&mut inner, &id);
        }

        let layer = draw_layer(&mut *inner.rng, self.m);
        inner.max_layer = inner.max_layer.max(layer);

        let mut new_node = Node::new(id.clone(), vector.clone(), layer);

        if inner.nodes.is_empty() {
            tracing::debug!(id = %id, layer, "insert: first node, no neighbors to wire");
            inner.nodes.insert(id, new_node);
            return Ok(());
        }

        // Deterministic entry point: the earliest-inserted still-live node.
        let mut current_ep = inner
            .nodes
            .keys()
            .next()
            .cloned()
            .expect("checked non-empty above");

        for l in (0..=layer).rev() {
            let candidates = search_layer(&vector, l, self.ef, &inner.nodes, &[current_ep.clone()]);
            let selected: Vec<Neighbor> = candidates.iter().take(self.m).cloned().collect();

            new_node.layers[l] = selected.clone();

            for nb in &selected {
                if let Some(peer) = inner.nodes.get_mut(&nb.id) {
                    // Only nodes that themselves span layer `l` receive a
                    // back-edge there; an entry point dragged in as the
                    // sole candidate above its own top layer is not a real
                    // member of that layer's subgraph (see DESIGN.md).
                    if l <= peer.top_layer() {
                        peer.layers[l].push(Neighbor::new(id.clone(), nb.similarity));
                        if peer.layers[l].len() > self.m {
                            peer.truncate_layer(l, self.m);
                        }
                    }
                }
            }

            if let Some(best) = candidates.first() {
                current_ep = best.id.clone();
            }
        }

        tracing::debug!(id = %id, layer, "insert: wired into graph");
        inner.nodes.insert(id, new_node);
        Ok(())
    }

    /// Removes `id` if present; a no-op otherwise. Returns whether a node
    /// was actually removed.
    pub fn delete(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        Self::delete_locked(&mut inner, id)
    }

    fn delete_locked(inner: &mut Inner, id: &str) -> bool {
        if !inner.nodes.contains_key(id) {
            return false;
        }

        // Edges are routinely asymmetric: independent per-side truncation
        // can keep A->B while evicting B->A, and a back-edge wired from a
        // node dragged in above its own top layer (see the `l <=
        // peer.top_layer()` guard in `insert`) never gets a reciprocal
        // edge at all. Scanning only `id`'s own out-edges therefore misses
        // nodes that point into it, leaving a dangling reference behind.
        // Every node's neighbor lists must be checked instead.
        for peer in inner.nodes.values_mut() {
            for layer in &mut peer.layers {
                if let Some(pos) = layer.iter().position(|n| n.id == id) {
                    layer.remove(pos);
                }
            }
        }

        inner.nodes.shift_remove(id);
        if inner.nodes.is_empty() {
            inner.max_layer = 0;
        }
        tracing::debug!(id, "delete: removed node");
        true
    }

    /// Returns up to `k` neighbors of `query`, ordered by similarity
    /// descending. Empty index returns an empty vec.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `query.len() != self.dim()`.
    pub fn search(&self, query: &[f64], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }

        let inner = self.inner.read();
        if inner.nodes.is_empty() {
            return Ok(Vec::new());
        }

        let mut entry = inner
            .nodes
            .keys()
            .next()
            .cloned()
            .expect("checked non-empty above");

        for l in (1..=inner.max_layer).rev() {
            entry = greedy_descend(query, &entry, l, &inner.nodes);
        }

        let width = k.max(self.ef);
        let mut results = search_layer(query, 0, width, &inner.nodes, &[entry]);
        results.truncate(k);

        tracing::debug!(k, found = results.len(), "search complete");
        Ok(results)
    }
}

/// Repeatedly replaces `entry` with a strictly-more-similar neighbor at
/// `layer` until no neighbor improves (spec.md §4.C step 2).
///
/// Looks every node up via `nodes.get` rather than indexing, the same
/// defense `search_layer` uses: a neighbor id is not guaranteed to still
/// resolve to a live node (a node can be deleted between its neighbors
/// being wired and a later traversal reading them), and panicking on a
/// stale reference would turn a missed edge into a crashed search.
fn greedy_descend(
    query: &[f64],
    entry: &str,
    layer: usize,
    nodes: &IndexMap<String, Node>,
) -> String {
    let mut best = entry.to_string();
    let Some(entry_node) = nodes.get(&best) else {
        return best;
    };
    let mut best_sim = cosine(query, &entry_node.vector);

    loop {
        let Some(current) = nodes.get(&best) else {
            break;
        };
        let mut improved = false;
        for nb in neighbors_at(current, layer) {
            let Some(nb_node) = nodes.get(&nb.id) else {
                continue;
            };
            let sim = cosine(query, &nb_node.vector);
            if sim > best_sim {
                best = nb.id.clone();
                best_sim = sim;
                improved = true;
            }
        }
        if !improved {
            break;
        }
    }

    best
}

/// A node's neighbor list at `layer`, or an empty slice if the node
/// doesn't span that layer. Never panics on an out-of-range layer — this
/// is what lets a node be used as a search anchor above its own top layer
/// (see the back-edge note in `insert`).
fn neighbors_at(node: &Node, layer: usize) -> &[Neighbor] {
    node.layers.get(layer).map_or(&[], Vec::as_slice)
}

/// Best-first expansion at a single layer, seeded from `entry_points`
/// (never re-chosen internally — spec.md §9). Returns up to `width`
/// neighbors sorted by similarity descending.
fn search_layer(
    query: &[f64],
    layer: usize,
    width: usize,
    nodes: &IndexMap<String, Node>,
    entry_points: &[String],
) -> Vec<Neighbor> {
    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut candidates: BinaryHeap<Candidate> = BinaryHeap::new();
    let mut result: Vec<Candidate> = Vec::new();
    let mut seq: u64 = 0;

    for ep in entry_points {
        if visited.insert(ep.clone()) {
            let Some(node) = nodes.get(ep) else { continue };
            let sim = cosine(query, &node.vector);
            seq += 1;
            candidates.push(Candidate {
                sim,
                seq,
                id: ep.clone(),
            });
        }
    }

    while let Some(c) = candidates.pop() {
        if result.len() >= width {
            let worst_sim = result.last().expect("len >= width > 0").sim;
            if c.sim < worst_sim {
                break;
            }
        }

        let c_id = c.id.clone();
        result.push(c);
        result.sort_by(|a, b| b.cmp(a));
        result.truncate(width);

        let Some(c_node) = nodes.get(&c_id) else { continue };
        for nb in neighbors_at(c_node, layer) {
            if visited.insert(nb.id.clone()) {
                let Some(nb_node) = nodes.get(&nb.id) else { continue };
                let sim = cosine(query, &nb_node.vector);
                seq += 1;
                candidates.push(Candidate {
                    sim,
                    seq,
                    id: nb.id.clone(),
                });
            }
        }
    }

    result.into_iter().map(Candidate::into_neighbor).collect()
}

#[cfg(test)]
mod index_tests;
