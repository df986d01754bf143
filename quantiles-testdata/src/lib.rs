//! quantiles-testdata
//! Synthetic observation generators shared by benches and tests.
//! Values land in \[0,1] so shapes are comparable across distributions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Normal};

/// Available synthetic distributions.
#[derive(Clone, Copy, Debug)]
pub enum DistKind {
    /// Uniform in \[0,1)
    Uniform,
    /// Gaussian centered at 0.5, clamped to \[0,1]
    Normal,
    /// exp(N(0, σ²)) squashed to \[0,1] via x/(1+x)
    LogNormal { sigma: f64 },
    /// Exact repeats, a uniform body, and a thin upper tail
    Mixture,
}

/// Generate `n` values for the chosen distribution, seeded for
/// reproducibility.
pub fn gen_dataset(kind: DistKind, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n);

    match kind {
        DistKind::Uniform => {
            for _ in 0..n {
                out.push(rng.random::<f64>());
            }
        }
        DistKind::Normal => {
            let normal = Normal::new(0.5, 0.15).unwrap();
            for _ in 0..n {
                let x: f64 = normal.sample(&mut rng);
                out.push(x.clamp(0.0, 1.0));
            }
        }
        DistKind::LogNormal { sigma } => {
            let log_normal = LogNormal::new(0.0, sigma).unwrap();
            for _ in 0..n {
                let x: f64 = log_normal.sample(&mut rng);
                out.push((x / (1.0 + x)).clamp(0.0, 1.0));
            }
        }
        DistKind::Mixture => {
            // Blend tuned to stress the sketch: bit-identical repeats drive
            // the buffer's coalesce path and produce heavy single entries, a
            // uniform body keeps ranks spread, and a sparse upper tail
            // leaves wide rank gaps for the compressor to bridge.
            let repeat_grid: [f64; 4] = [0.125, 0.25, 0.5, 0.625];
            for _ in 0..n {
                let toss: f64 = rng.random();
                let v = if toss < 0.25 {
                    repeat_grid[rng.random_range(0..repeat_grid.len())]
                } else if toss < 0.85 {
                    rng.random::<f64>() * 0.75
                } else {
                    1.0 - 0.25 * rng.random::<f64>().powi(5)
                };
                out.push(v.clamp(0.0, 1.0));
            }
        }
    }
    out
}

/// Generate `n` strictly positive weights in (0, 1].
pub fn gen_weights(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| 1.0 - rng.random::<f64>()).collect()
}
