use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fastrand::Rng;
use feint::algorithms::{Optimizer, BBO, CLPSO, PSO};
use feint::test_functions::Rastrigin;
use feint::Bounds;

fn step_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("rastrigin: step(20)");
    for n in [2, 5, 10, 20] {
        group.bench_with_input(BenchmarkId::new("PSO", n), &n, |b, ndim| {
            let bounds = Bounds::new(vec![-5.12; *ndim], vec![5.12; *ndim]).unwrap();
            b.iter(|| {
                let mut pso =
                    PSO::new(bounds.clone(), Rastrigin { n: *ndim }, Rng::with_seed(0));
                pso.step(20).unwrap();
            });
        });
        group.bench_with_input(BenchmarkId::new("BBO", n), &n, |b, ndim| {
            let bounds = Bounds::new(vec![-5.12; *ndim], vec![5.12; *ndim]).unwrap();
            b.iter(|| {
                let mut bbo =
                    BBO::new(bounds.clone(), Rastrigin { n: *ndim }, Rng::with_seed(0));
                bbo.step(20).unwrap();
            });
        });
        group.bench_with_input(BenchmarkId::new("CLPSO", n), &n, |b, ndim| {
            let bounds = Bounds::new(vec![-5.12; *ndim], vec![5.12; *ndim]).unwrap();
            b.iter(|| {
                let mut clpso =
                    CLPSO::new(bounds.clone(), Rastrigin { n: *ndim }, Rng::with_seed(0));
                clpso.step(20).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, step_benchmark);
criterion_main!(benches);
