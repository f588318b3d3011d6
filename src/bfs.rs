//! Level-synchronous truncated BFS, used to seed the distance array.

use crate::dynamic_sssp::Vertex;

/// Distances from `source` along `out_adj`, capped at `depth_cap`.
/// Vertices farther than the cap (or unreachable) get `depth_cap + 1`.
/// Runs in `O(|V| + |E|)`.
pub fn bfs_seed(out_adj: &[Vec<Vertex>], source: Vertex, depth_cap: usize) -> Vec<usize> {
    let n = out_adj.len();
    let mut dist = vec![depth_cap + 1; n];
    dist[source] = 0;
    let mut frontier = vec![source];
    for depth in 0..depth_cap {
        if frontier.is_empty() {
            break;
        }
        let mut next = Vec::new();
        for &v in &frontier {
            for &u in &out_adj[v] {
                if dist[u] > depth + 1 {
                    dist[u] = depth + 1;
                    next.push(u);
                }
            }
        }
        frontier = next;
    }
    dist
}
