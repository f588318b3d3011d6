use criterion::{black_box, criterion_group, criterion_main, Bencher, BenchmarkId, Criterion};
use decremental_sssp::PriorityStructure;
use flexi_logger::Logger;
use rand::{Rng, SeedableRng};

fn sample_elems(n: usize) -> Vec<(usize, usize)> {
    // Odd priorities only, so half the domain stays free for moves.
    (0..n).map(|i| (i, 2 * i + 1)).collect()
}

fn bench_build_impl(b: &mut Bencher, n: usize) {
    let elems = sample_elems(n);
    b.iter(|| {
        let mut ps = PriorityStructure::new(2 * n);
        ps.initialize(black_box(elems.clone())).unwrap();
        black_box(ps)
    });
}

fn bench_ops_impl(b: &mut Bencher, seed: u64, n: usize, q: usize) {
    let elems = sample_elems(n);
    b.iter(|| {
        let mut ps = black_box(PriorityStructure::new(2 * n));
        ps.initialize(elems.clone()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        for _q in 0..q {
            log::trace!("q {qi}/{q}", qi = _q + 1);
            match rng.gen_range(0..100) {
                // rank query
                0..35 => {
                    let k = rng.gen_range(1..=ps.len());
                    black_box(ps.query(k).ok());
                }
                // priority lookup
                35..55 => {
                    let p = rng.gen_range(1..=2 * n);
                    black_box(ps.find(p).ok());
                }
                // forward scan
                55..80 => {
                    let k = rng.gen_range(1..=ps.len());
                    let m = rng.gen_range(2..16);
                    black_box(ps.next_with(k, |v| v % m == 0));
                }
                // move
                _ => {
                    let k = rng.gen_range(1..=ps.len());
                    let p = rng.gen_range(1..=2 * n);
                    black_box(ps.update_priority(k, p).ok());
                }
            }
        }
    });
}

fn bench_priority_structure(c: &mut Criterion) {
    let mut g = c.benchmark_group("PriorityStructure");
    let mut rng = rand::rngs::StdRng::seed_from_u64(4815162342);
    let _logger = Logger::try_with_env().unwrap().start().unwrap();
    for n in [64usize, 1024, 16384] {
        g.throughput(criterion::Throughput::Elements(n as u64));
        g.bench_with_input(BenchmarkId::new("build", n), &n, |b, &n| {
            bench_build_impl(b, n)
        });
    }
    for q in [100usize, 400] {
        g.throughput(criterion::Throughput::Elements(q as u64));
        let input_str = format!("N 1024 Q {q}");
        let seed = rng.gen();
        log::debug!("Using seed {seed}");
        g.bench_with_input(BenchmarkId::new("ops", &input_str), &q, |b, &q| {
            bench_ops_impl(b, seed, 1024, q)
        });
    }
    g.finish();
}

criterion_group!(benches, bench_priority_structure);
criterion_main!(benches);
