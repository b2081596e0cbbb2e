//! Seeded train/test split

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Row indices for the training and held-out sides of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(n * test_fraction)` rows.
///
/// When holding out would leave nothing to train on, every row goes to the
/// training side and the test side is empty.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Split {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fraction = if test_fraction.is_finite() {
        test_fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let test_len = (n as f64 * fraction).ceil() as usize;
    if test_len == 0 || test_len >= n {
        return Split {
            train: indices,
            test: Vec::new(),
        };
    }

    let train = indices.split_off(test_len);
    Split {
        train,
        test: indices,
    }
}
