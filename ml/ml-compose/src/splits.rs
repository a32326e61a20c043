//! Dataset splitting helpers.
//!
//! All helpers operate on index sets, which feed straight into
//! [`SampleBuilder::subset`](crate::SampleBuilder::subset). Shuffling is
//! seeded and reproducible.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::error::{ComposeError, Result};

fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64)
}

fn check_sum(total: usize, lengths: &[usize]) -> Result<()> {
    let sum: usize = lengths.iter().sum();
    if sum != total {
        return Err(ComposeError::SplitSumMismatch {
            expected: total,
            got: sum,
        });
    }
    Ok(())
}

fn partition(indices: Vec<usize>, lengths: &[usize]) -> Vec<Vec<usize>> {
    let mut blocks = Vec::with_capacity(lengths.len());
    let mut offset = 0;
    for &length in lengths {
        blocks.push(indices[offset..offset + length].to_vec());
        offset += length;
    }
    blocks
}

/// Splits `0..total` into consecutive index blocks of the given lengths.
///
/// # Errors
///
/// Returns an error if the lengths do not sum to `total`.
///
/// # Example
///
/// ```
/// use ml_compose::sequence_split;
///
/// let blocks = sequence_split(5, &[3, 2]).unwrap();
/// assert_eq!(blocks[0], vec![0, 1, 2]);
/// assert_eq!(blocks[1], vec![3, 4]);
/// ```
pub fn sequence_split(total: usize, lengths: &[usize]) -> Result<Vec<Vec<usize>>> {
    check_sum(total, lengths)?;
    let indices: Vec<usize> = (0..total).collect();
    Ok(partition(indices, lengths))
}

/// Splits `0..total` into shuffled, non-overlapping index blocks.
///
/// # Errors
///
/// Returns an error if the lengths do not sum to `total`.
///
/// # Example
///
/// ```
/// use ml_compose::random_split;
///
/// let blocks = random_split(10, &[8, 2], Some(42)).unwrap();
/// assert_eq!(blocks[0].len(), 8);
/// assert_eq!(blocks[1].len(), 2);
///
/// let mut all: Vec<usize> = blocks.concat();
/// all.sort_unstable();
/// assert_eq!(all, (0..10).collect::<Vec<_>>());
/// ```
pub fn random_split(total: usize, lengths: &[usize], seed: Option<u64>) -> Result<Vec<Vec<usize>>> {
    check_sum(total, lengths)?;
    let mut indices: Vec<usize> = (0..total).collect();
    indices.shuffle(&mut rng_for(seed));
    Ok(partition(indices, lengths))
}

/// Converts split ratios into integer lengths.
///
/// Ratios need not sum to 1; each length is `floor(total * ratio)`.
///
/// # Example
///
/// ```
/// use ml_compose::ratio_to_lengths;
///
/// assert_eq!(ratio_to_lengths(100, &[0.8, 0.2]), vec![80, 20]);
/// assert_eq!(ratio_to_lengths(10, &[0.5]), vec![5]);
/// ```
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn ratio_to_lengths(total: usize, ratios: &[f32]) -> Vec<usize> {
    ratios
        .iter()
        .map(|&ratio| (total as f32 * ratio) as usize)
        .collect()
}

/// Result of a semi-supervised split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemiSplit {
    /// Labeled training indices, tiled to the unlabeled set's length.
    pub labeled: Vec<usize>,
    /// Unlabeled training indices.
    pub unlabeled: Vec<usize>,
    /// Validation indices.
    pub validation: Vec<usize>,
}

/// Splits a labeled dataset for semi-supervised training.
///
/// Per class: the first `n_per_class` shuffled rows become the labeled
/// set; the first `per_class_unlabeled` rows (including the labeled ones
/// when `include_labeled` is set, excluding them otherwise) become the
/// unlabeled set; the rest go to validation. `per_class_unlabeled` is
/// `(len - val_size) / class_count`. The labeled set is then tiled to the
/// unlabeled set's length and both are shuffled, so the two streams can
/// be zipped batch-for-batch.
///
/// # Errors
///
/// Returns an error if `classes` is empty, `n_per_class` is zero, or
/// `val_size` is not below the dataset length.
///
/// # Example
///
/// ```
/// use ml_compose::semi_split;
///
/// // 3 classes, 8 rows each
/// let classes: Vec<usize> = (0..24).map(|i| i % 3).collect();
///
/// let split = semi_split(&classes, 2, 6, true, Some(42)).unwrap();
/// assert_eq!(split.unlabeled.len(), 18); // 6 per class
/// assert_eq!(split.labeled.len(), 18);   // tiled up from 6
/// assert_eq!(split.validation.len(), 6);
/// ```
pub fn semi_split(
    classes: &[usize],
    n_per_class: usize,
    val_size: usize,
    include_labeled: bool,
    seed: Option<u64>,
) -> Result<SemiSplit> {
    if classes.is_empty() {
        return Err(ComposeError::invalid_split("classes is empty"));
    }
    if n_per_class == 0 {
        return Err(ComposeError::invalid_split("n_per_class must be positive"));
    }
    if val_size >= classes.len() {
        return Err(ComposeError::invalid_split(format!(
            "val_size {val_size} must be below dataset length {}",
            classes.len()
        )));
    }

    let class_count = classes.iter().map(|&c| c + 1).max().unwrap_or(0);
    let per_class_unlabeled = (classes.len() - val_size) / class_count;

    let mut rng = rng_for(seed);
    let mut labeled = Vec::new();
    let mut unlabeled = Vec::new();
    let mut validation = Vec::new();

    for class in 0..class_count {
        let mut rows: Vec<usize> = classes
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == class)
            .map(|(row, _)| row)
            .collect();
        rows.shuffle(&mut rng);

        labeled.extend(rows.iter().take(n_per_class));
        if include_labeled {
            unlabeled.extend(rows.iter().take(per_class_unlabeled));
        } else {
            unlabeled.extend(
                rows.iter()
                    .skip(n_per_class)
                    .take(per_class_unlabeled.saturating_sub(n_per_class)),
            );
        }
        validation.extend(rows.iter().skip(per_class_unlabeled));
    }

    // Tile the labeled set to the unlabeled length so the streams zip
    if !unlabeled.is_empty() {
        let tiled_len = unlabeled.len();
        let mut tiled = Vec::with_capacity(tiled_len);
        while tiled.len() < tiled_len {
            tiled.extend(labeled.iter().take(tiled_len - tiled.len()));
        }
        labeled = tiled;
    }

    labeled.shuffle(&mut rng);
    unlabeled.shuffle(&mut rng);

    Ok(SemiSplit {
        labeled,
        unlabeled,
        validation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_split_blocks_are_consecutive() {
        let blocks = sequence_split(6, &[2, 3, 1]).unwrap();
        assert_eq!(blocks[0], vec![0, 1]);
        assert_eq!(blocks[1], vec![2, 3, 4]);
        assert_eq!(blocks[2], vec![5]);
    }

    #[test]
    fn sequence_split_sum_mismatch() {
        let err = sequence_split(6, &[2, 2]).unwrap_err();
        assert!(matches!(err, ComposeError::SplitSumMismatch { .. }));
    }

    #[test]
    fn sequence_split_empty() {
        let blocks = sequence_split(0, &[]).unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn random_split_covers_all_indices() {
        let blocks = random_split(100, &[70, 20, 10], Some(42)).unwrap();
        assert_eq!(blocks[0].len(), 70);
        assert_eq!(blocks[1].len(), 20);
        assert_eq!(blocks[2].len(), 10);

        let mut all: Vec<usize> = blocks.concat();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 100);
    }

    #[test]
    fn random_split_reproducible() {
        let a = random_split(50, &[40, 10], Some(7)).unwrap();
        let b = random_split(50, &[40, 10], Some(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn random_split_sum_mismatch() {
        assert!(random_split(10, &[5, 6], Some(0)).is_err());
    }

    #[test]
    fn ratio_to_lengths_basic() {
        assert_eq!(ratio_to_lengths(100, &[0.8, 0.2]), vec![80, 20]);
        assert_eq!(ratio_to_lengths(0, &[0.5]), vec![0]);
        // Ratios need not sum to 1
        assert_eq!(ratio_to_lengths(10, &[0.3]), vec![3]);
    }

    #[test]
    fn ratio_feeds_random_split() {
        let lengths = ratio_to_lengths(10, &[0.8, 0.2]);
        let blocks = random_split(10, &lengths, Some(1)).unwrap();
        assert_eq!(blocks[0].len(), 8);
    }

    #[test]
    fn semi_split_sizes() {
        let classes: Vec<usize> = (0..24).map(|i| i % 3).collect();
        let split = semi_split(&classes, 2, 6, true, Some(42)).unwrap();

        assert_eq!(split.unlabeled.len(), 18);
        assert_eq!(split.labeled.len(), 18);
        assert_eq!(split.validation.len(), 6);
    }

    #[test]
    fn semi_split_excluding_labeled() {
        let classes: Vec<usize> = (0..24).map(|i| i % 3).collect();
        let split = semi_split(&classes, 2, 6, false, Some(42)).unwrap();

        // 6 per class unlabeled minus 2 labeled = 4 per class
        assert_eq!(split.unlabeled.len(), 12);
        // Labeled indices never appear in the unlabeled stream
        for row in &split.labeled {
            assert!(!split.unlabeled.contains(row));
        }
    }

    #[test]
    fn semi_split_labeled_drawn_per_class() {
        let classes: Vec<usize> = (0..30).map(|i| i / 10).collect();
        let split = semi_split(&classes, 3, 6, true, Some(0)).unwrap();

        // Distinct labeled rows: 3 per class
        let mut distinct = split.labeled.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct.len(), 9);
        for class in 0..3 {
            let count = distinct
                .iter()
                .filter(|&&row| classes[row] == class)
                .count();
            assert_eq!(count, 3);
        }
    }

    #[test]
    fn semi_split_reproducible() {
        let classes: Vec<usize> = (0..40).map(|i| i % 4).collect();
        let a = semi_split(&classes, 2, 8, true, Some(5)).unwrap();
        let b = semi_split(&classes, 2, 8, true, Some(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn semi_split_rejects_bad_arguments() {
        assert!(semi_split(&[], 1, 0, true, None).is_err());
        assert!(semi_split(&[0, 1], 0, 0, true, None).is_err());
        assert!(semi_split(&[0, 1], 1, 2, true, None).is_err());
    }
}
