use decremental_sssp::DynamicSssp;

fn show(t: &DynamicSssp) {
    for v in 0..t.num_vertices() {
        match t.parent(v) {
            Some(p) => println!("  v = {v}: dist {} (parent {p})", t.dist(v)),
            None => println!("  v = {v}: dist {}", t.dist(v)),
        }
    }
}

fn delete(t: &mut DynamicSssp, edges: &[(usize, usize)]) {
    for &(u, v) in edges {
        println!("Deleting edge from {u} to {v}");
    }
    t.batch_delete(edges);
    show(t);
}

fn main() {
    // 0 -> 1
    // v    v
    // 2 -> 3
    // v    v
    // 4    5
    let mut adj = vec![Vec::new(); 6];
    for (u, v) in [(0, 1), (0, 2), (1, 3), (2, 3), (2, 4), (3, 5)] {
        adj[u].push(v);
    }
    let mut t = DynamicSssp::new(adj, 0, 3);
    println!("Built with source 0 and depth cap 3");
    show(&t);
    delete(&mut t, &[(2, 3)]);
    delete(&mut t, &[(1, 3), (0, 1)]);
}
