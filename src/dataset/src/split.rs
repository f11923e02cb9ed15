use nn::sample::Sample;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffles `samples` with `seed` and moves `test_ratio` of them into the
/// second returned set. A ratio of `0.0` keeps everything for training.
pub fn train_test_split(
    mut samples: Vec<Sample>,
    test_ratio: f32,
    seed: u64,
) -> (Vec<Sample>, Vec<Sample>) {
    assert!(
        (0f32..1f32).contains(&test_ratio),
        "test ratio must be in [0, 1)"
    );

    samples.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = (samples.len() as f32 * test_ratio).round() as usize;
    let test = samples.split_off(samples.len() - n_test);

    (samples, test)
}
