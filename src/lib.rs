//! This crate maintains single-source shortest paths on a directed graph under batches of edge deletions, with distances capped at a depth `L`. See [DynamicSssp].
//!
//! For every vertex `v` it keeps `dist(v)` in `{0, 1, ..., L, L + 1}`, where `L + 1` stands for "farther than `L` or unreachable", together with a shortest-path tree rooted at the source. Only deletions are supported; after every batch the recorded distances again equal the true capped BFS distances.
//!
//! ## Usage
//!
//! Build a [DynamicSssp] from an out-adjacency list, then feed it deletion batches and read distances and tree parents back:
//!
//! ```
//! use decremental_sssp::DynamicSssp;
//!
//! let out_adj = vec![vec![1], vec![2], vec![3], vec![]];
//! let mut sssp = DynamicSssp::new(out_adj, 0, 3);
//! assert_eq!(sssp.dist(3), 3);
//! assert_eq!(sssp.parent(3), Some(2));
//! sssp.batch_delete(&[(1, 2)]);
//! assert_eq!(sssp.dist(2), 4); // past the depth cap
//! assert_eq!(sssp.parent(2), None);
//! ```
//!
//! You can see example usage at `src/bin/example.rs` and run it with `cargo run`.
//!
//! ## Implementation
//!
//! The workhorse is [PriorityStructure], a segment tree over a dense priority domain supporting rank queries, priority lookups and a predicate-guided forward scan (`next_with`). Each vertex indexes its in-neighbors in one, and a per-vertex cursor remembers how far the search for a parent has advanced. A deletion batch re-parents orphaned vertices in layered phases, moving cursors forward with `next_with`; since distances only ever grow, a rejected in-neighbor never needs a second look until the vertex itself changes layer.
//!
//! Bulk construction of a [PriorityStructure] forks the two subtree builds at each split until the fan-out covers the rayon pool, and `next_with` scans its doubling windows with a parallel min-reduction once they are long enough.
//!
//! ## Testing
//!
//! Run the tests using:
//!
//! ```skip
//! cargo test
//! ```
//!
//! Add `-- --ignored` to run the stress tests (which run indefinitely with random data until they fail). And use `cargo bench` to see the benchmarks.

pub mod bfs;
pub mod dynamic_sssp;
pub mod priority_structure;

pub use dynamic_sssp::{DynamicSssp, Vertex};
pub use priority_structure::PriorityStructure;
