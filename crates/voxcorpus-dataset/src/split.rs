//! Shuffle and partition.
//!
//! Randomization and sizing are separate steps so each is testable on its
//! own: `shuffle` permutes, `partition` slices. Splitting itself never
//! drops or duplicates a row.

use voxcorpus_foundation::config::SplitFractions;

/// Uniform in-place permutation. A seed pins the order for reproducible
/// runs; without one, fresh entropy gives every run a fresh split.
///
/// Source manifests often cluster related clips (alphabetical URLs,
/// per-speaker batches); a full permutation keeps that structure out of
/// the partitions.
pub fn shuffle<T>(rows: &mut [T], seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    rng.shuffle(rows);
}

/// Slice into (train, dev, test) by fraction. Train and dev take their
/// floors; test absorbs the rounding remainder, so the three always cover
/// the input exactly.
pub fn partition<T>(mut rows: Vec<T>, fractions: SplitFractions) -> (Vec<T>, Vec<T>, Vec<T>) {
    let n = rows.len();
    let train_len = ((n as f64 * fractions.train).floor() as usize).min(n);
    let dev_len = ((n as f64 * fractions.dev).floor() as usize).min(n - train_len);

    let test = rows.split_off(train_len + dev_len);
    let dev = rows.split_off(train_len);
    (rows, dev, test)
}
