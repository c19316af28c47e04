#![allow(dead_code)]
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

// create_data
//
// Generates a row major feature matrix of small integer valued columns,
// the last column holding category codes, and binary labels from a
// noisy linear rule.
pub(crate) fn create_data(n_samples: usize, n_features: usize, n_categories: usize) -> (Vec<f64>, Vec<f64>) {
    // reproducible seed
    let mut rng = StdRng::seed_from_u64(1903);

    let feature_distribution = Uniform::new(0, 20);
    let category_distribution = Uniform::new(0, n_categories);
    let weight_distribution = Uniform::new(-1.0, 1.0);

    let weights: Vec<f64> = (0..n_features).map(|_| rng.sample(weight_distribution)).collect();

    let mut data = Vec::with_capacity(n_samples * n_features);
    let mut y = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let mut linear = 0.0;
        for (j, w) in weights.iter().enumerate() {
            let v = if j == n_features - 1 {
                rng.sample(category_distribution) as f64
            } else {
                rng.sample(feature_distribution) as f64
            };
            linear += v * w;
            data.push(v);
        }
        let noise: f64 = rng.gen_range(-2.0..2.0);
        y.push(if linear + noise > 0.0 { 1.0 } else { 0.0 });
    }

    (data, y)
}
