use derivative::Derivative;
use rustc_hash::FxHashSet;

use crate::bfs::bfs_seed;
use crate::priority_structure::PriorityStructure;

pub type Vertex = usize;

/// Single-source shortest paths on a directed graph under edge deletions,
/// with distances capped at a horizon `L`. `dist(v)` is the length of the
/// shortest alive path from the source, or `L + 1` for anything farther.
///
/// A shortest-path tree is kept alongside the distances. Each vertex `v`
/// owns a [`PriorityStructure`] over its in-neighbors and a scan cursor
/// remembering how far its parent search has progressed; a deletion batch
/// re-parents orphaned vertices layer by layer, advancing cursors with
/// `next_with` instead of rescanning whole neighbor lists.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct DynamicSssp {
    n: usize,
    source: Vertex,
    /// The horizon `L`. Distances past it are recorded as `L + 1`.
    depth_cap: usize,
    dist: Vec<usize>,
    #[derivative(Debug = "ignore")]
    out: Vec<Vec<Vertex>>,
    /// In-neighbors of each vertex, keyed by neighbor id.
    #[derivative(Debug = "ignore")]
    inn: Vec<PriorityStructure<Vertex>>,
    /// Parent-search cursor into `inn[v]`, a rank. 0 when unused.
    #[derivative(Debug = "ignore")]
    scan: Vec<usize>,
    parent: Vec<Option<Vertex>>,
    children: Vec<Vec<Vertex>>,
    #[derivative(Debug = "ignore")]
    alive: FxHashSet<u64>,
}

fn encode_edge(u: Vertex, v: Vertex) -> u64 {
    ((u as u64) << 32) | v as u64
}

impl DynamicSssp {
    /// Builds the structure from an out-adjacency list. Self-loops and
    /// duplicate edges are dropped at ingest.
    ///
    /// Panics if `source` or any edge endpoint is out of range, or if the
    /// vertex count does not fit the packed edge keys.
    pub fn new(out_adj: Vec<Vec<Vertex>>, source: Vertex, depth_cap: usize) -> Self {
        let n = out_adj.len();
        assert!(source < n, "source {source} out of range for {n} vertices");
        assert!(
            n <= u32::MAX as usize,
            "vertex ids must fit in 32 bits for edge keys"
        );
        let mut out: Vec<Vec<Vertex>> = vec![Vec::new(); n];
        let mut alive = FxHashSet::default();
        for (u, targets) in out_adj.into_iter().enumerate() {
            for v in targets {
                assert!(v < n, "edge target {v} out of range for {n} vertices");
                if u == v {
                    continue;
                }
                if alive.insert(encode_edge(u, v)) {
                    out[u].push(v);
                }
            }
        }

        let dist = bfs_seed(&out, source, depth_cap);

        let mut incoming: Vec<Vec<Vertex>> = vec![Vec::new(); n];
        for u in 0..n {
            for &v in &out[u] {
                incoming[v].push(u);
            }
        }
        let mut inn = Vec::with_capacity(n);
        for preds in incoming {
            let mut ps = PriorityStructure::new(n);
            ps.initialize(preds.into_iter().map(|u| (u, u + 1)).collect())
                .expect("in-neighbor ids are distinct and in range");
            inn.push(ps);
        }

        let mut this = Self {
            n,
            source,
            depth_cap,
            dist,
            out,
            inn,
            scan: vec![0; n],
            parent: vec![None; n],
            children: vec![Vec::new(); n],
            alive,
        };
        this.init_tree();
        this
    }

    /// Picks the first qualifying parent for every reachable vertex and
    /// records where its scan stopped.
    fn init_tree(&mut self) {
        for v in 0..self.n {
            let d = self.dist[v];
            if d == 0 || d > self.depth_cap {
                continue;
            }
            let pos = self.scan_for_parent(v, 1);
            if pos <= self.inn[v].len() {
                self.attach(v, pos);
            } else {
                self.scan[v] = self.inn[v].len() + 1;
            }
        }
    }

    /// Advances through `inn[v]` from rank `from`, looking for an alive
    /// in-edge whose tail sits one layer above `v`. Returns the rank found,
    /// or one past the end.
    fn scan_for_parent(&self, v: Vertex, from: usize) -> usize {
        let (dist, alive) = (&self.dist, &self.alive);
        let want = dist[v] - 1;
        self.inn[v].next_with(from, move |&w| {
            dist[w] == want && alive.contains(&encode_edge(w, v))
        })
    }

    /// Makes the in-neighbor at rank `pos` the parent of `v`.
    fn attach(&mut self, v: Vertex, pos: usize) {
        let w = *self.inn[v]
            .query(pos)
            .expect("scan cursor stopped on a valid rank");
        self.scan[v] = pos;
        self.parent[v] = Some(w);
        self.children[w].push(v);
    }

    /// Applies a batch of edge deletions and restores the distance and tree
    /// invariants. Entries that are out of range, not alive, or repeated
    /// within the batch are skipped; the rest are applied independently.
    pub fn batch_delete(&mut self, del_edges: &[(Vertex, Vertex)]) {
        let cap = self.depth_cap;
        let mut parent_deleted = vec![false; self.n];
        let mut orphaned: Vec<Vertex> = Vec::new();

        // Apply every deletion before any rescan, so cursors only ever see
        // the post-batch edge set.
        let mut applied = 0usize;
        for &(u, v) in del_edges {
            if u >= self.n || v >= self.n {
                continue;
            }
            if !self.alive.remove(&encode_edge(u, v)) {
                continue;
            }
            applied += 1;
            self.out[u].retain(|&x| x != v);
            if self.parent[v] == Some(u) {
                self.children[u].retain(|&x| x != v);
                self.parent[v] = None;
                parent_deleted[v] = true;
                orphaned.push(v);
            }
        }
        log::debug!(
            "batch_delete: {applied}/{} edges applied, {} tree edges lost",
            del_edges.len(),
            orphaned.len()
        );
        if orphaned.is_empty() {
            return;
        }

        // A vertex that still has an untried in-edge on its own layer keeps
        // its distance; picking it up now keeps it out of the phase loop.
        for &v in &orphaned {
            let pos = self.scan_for_parent(v, self.scan[v]);
            self.scan[v] = pos;
            if pos <= self.inn[v].len() {
                self.attach(v, pos);
                parent_deleted[v] = false;
            }
        }

        // The rest become eligible one layer at a time.
        let mut pending: Vec<Vec<Vertex>> = vec![Vec::new(); cap + 2];
        let mut pending_left = 0usize;
        for &v in &orphaned {
            if parent_deleted[v] {
                pending[self.dist[v]].push(v);
                pending_left += 1;
            }
        }
        if pending_left == 0 {
            return;
        }

        // Layered relaxation: at the start of phase i, every vertex in the
        // uncertain set has dist == i, and every vertex whose true distance
        // is below i is already settled.
        let mut uncertain: Vec<Vertex> = Vec::new();
        let mut queued = vec![false; self.n];
        for i in 0..=cap {
            let mut next: Vec<Vertex> = Vec::new();
            for &v in &uncertain {
                let pos = self.scan_for_parent(v, self.scan[v]);
                self.scan[v] = pos;
                if pos <= self.inn[v].len() {
                    self.attach(v, pos);
                } else {
                    // No in-edge one layer up remains: v moves down a layer
                    // and drags its whole subtree into doubt. Ranks behind
                    // the cursor were rejected at the old distance and stay
                    // rejected, so the cursor only rewinds here, where the
                    // distance grows.
                    self.scan[v] = 1;
                    if !queued[v] {
                        queued[v] = true;
                        next.push(v);
                    }
                    for c in std::mem::take(&mut self.children[v]) {
                        self.parent[c] = None;
                        if !queued[c] {
                            queued[c] = true;
                            next.push(c);
                        }
                    }
                }
            }
            if i + 1 <= cap {
                for v in std::mem::take(&mut pending[i + 1]) {
                    pending_left -= 1;
                    if !queued[v] {
                        queued[v] = true;
                        next.push(v);
                    }
                }
            }
            uncertain = next;
            for &v in &uncertain {
                queued[v] = false;
                self.dist[v] = i + 1;
            }
            log::trace!("phase {i}: {} uncertain", uncertain.len());
            if uncertain.is_empty() && pending_left == 0 {
                break;
            }
        }

        // Whatever survived all phases is past the horizon.
        for &v in &uncertain {
            self.dist[v] = cap + 1;
            self.parent[v] = None;
            self.scan[v] = 0;
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.n
    }

    pub fn source(&self) -> Vertex {
        self.source
    }

    pub fn depth_cap(&self) -> usize {
        self.depth_cap
    }

    /// Current capped distance of `v` from the source.
    pub fn dist(&self, v: Vertex) -> usize {
        self.dist[v]
    }

    /// Parent of `v` in the shortest-path tree, if it has one.
    pub fn parent(&self, v: Vertex) -> Option<Vertex> {
        self.parent[v]
    }

    /// Children of `v` in the shortest-path tree.
    pub fn children(&self, v: Vertex) -> &[Vertex] {
        &self.children[v]
    }

    /// Whether the edge `(u, v)` is currently alive.
    pub fn is_alive(&self, u: Vertex, v: Vertex) -> bool {
        u < self.n && v < self.n && self.alive.contains(&encode_edge(u, v))
    }
}
