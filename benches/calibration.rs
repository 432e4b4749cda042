use criterion::{Criterion, black_box, criterion_group, criterion_main};

use magcal::{DEFAULT_TARGET_RADIUS, EigenDecomposition, Matrix, Sample, fit};

fn sphere_samples(n_azimuth: usize, n_polar: usize) -> Vec<Sample> {
    let mut out = Vec::with_capacity(n_azimuth * n_polar);
    for p in 0..n_polar {
        let polar = std::f64::consts::PI * (p as f64 + 0.5) / n_polar as f64;
        for a in 0..n_azimuth {
            let azimuth = 2.0 * std::f64::consts::PI * a as f64 / n_azimuth as f64;
            out.push(Sample::new(
                0.1 + 1.2 * polar.sin() * azimuth.cos(),
                -0.05 + 0.8 * polar.sin() * azimuth.sin(),
                0.2 + 1.1 * polar.cos(),
            ));
        }
    }
    out
}

fn bench_fit(c: &mut Criterion) {
    let small = sphere_samples(8, 5);
    let large = sphere_samples(36, 18);

    c.bench_function("fit 40 samples", |b| {
        b.iter(|| fit(black_box(&small), DEFAULT_TARGET_RADIUS).unwrap())
    });
    c.bench_function("fit 648 samples", |b| {
        b.iter(|| fit(black_box(&large), DEFAULT_TARGET_RADIUS).unwrap())
    });
}

fn bench_eigen(c: &mut Criterion) {
    let a6 = Matrix::from_fn(6, 6, |i, j| ((i * 5 + j * 3 + 2) % 13) as f64 - 6.0);
    let a12 = Matrix::from_fn(12, 12, |i, j| ((i * 7 + j * 5 + 3) % 17) as f64 - 8.0);

    c.bench_function("eigen 6x6", |b| {
        b.iter(|| EigenDecomposition::new(black_box(&a6)).unwrap())
    });
    c.bench_function("eigen 12x12", |b| {
        b.iter(|| EigenDecomposition::new(black_box(&a12)).unwrap())
    });
}

fn bench_cholesky(c: &mut Criterion) {
    let a = Matrix::from_fn(10, 10, |i, j| {
        ((i + 1) * (j + 1)) as f64 * 0.1 + if i == j { 12.0 } else { 0.0 }
    });
    c.bench_function("cholesky inverse 10x10", |b| {
        b.iter(|| black_box(&a).cholesky_inverse().unwrap())
    });
}

criterion_group!(benches, bench_fit, bench_eigen, bench_cholesky);
criterion_main!(benches);
