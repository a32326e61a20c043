//! Delegates: pluggable per-index value generators.
//!
//! A delegate produces extra fields for a sample that cannot be expressed
//! as a plain source lookup, because the indices it draws from differ from
//! the index being composed. Triplet sampling is the canonical case: the
//! positive and negative examples come from *other* rows of the data.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{ComposeError, Result};

/// Role of a delegate-emitted value within a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// An input field.
    Input,
    /// A label field.
    Label,
    /// An identifier field.
    Id,
}

/// A single value emitted by a delegate.
///
/// The name is optional in tuple mode but required in record mode.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleItem<T> {
    /// Where the value lands in the composed sample.
    pub role: Role,
    /// Field name, required for record-mode output.
    pub name: Option<String>,
    /// The value itself.
    pub value: T,
}

impl<T> SampleItem<T> {
    /// Creates an unnamed input item.
    #[must_use]
    pub const fn input(value: T) -> Self {
        Self {
            role: Role::Input,
            name: None,
            value,
        }
    }

    /// Creates an unnamed label item.
    #[must_use]
    pub const fn label(value: T) -> Self {
        Self {
            role: Role::Label,
            name: None,
            value,
        }
    }

    /// Creates an unnamed id item.
    #[must_use]
    pub const fn id(value: T) -> Self {
        Self {
            role: Role::Id,
            name: None,
            value,
        }
    }

    /// Names the item.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A pluggable generator producing extra fields per sample index.
///
/// # Example
///
/// ```
/// use ml_compose::{Delegate, SampleItem};
///
/// /// Emits the previous row as an extra input.
/// struct PrevRow {
///     rows: Vec<i64>,
/// }
///
/// impl Delegate<i64> for PrevRow {
///     fn len(&self) -> usize {
///         self.rows.len()
///     }
///
///     fn sample(&self, index: usize) -> Vec<SampleItem<i64>> {
///         let prev = if index == 0 { 0 } else { self.rows[index - 1] };
///         vec![SampleItem::input(prev).named("prev")]
///     }
/// }
///
/// let d = PrevRow { rows: vec![10, 20, 30] };
/// let items = d.sample(2);
/// assert_eq!(items[0].value, 20);
/// ```
pub trait Delegate<T>: Send + Sync {
    /// The number of indices this delegate covers.
    ///
    /// Zero means "any length": the delegate is not checked against the
    /// dataset length. A non-zero length must match the dataset.
    fn len(&self) -> usize {
        0
    }

    /// Returns `true` if the delegate covers no indices.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A short kind name used in dataset descriptions.
    fn kind(&self) -> &'static str {
        "delegate"
    }

    /// Produces the items for one sample index.
    ///
    /// The index is already resolved through subset/oversampling remaps.
    fn sample(&self, index: usize) -> Vec<SampleItem<T>>;
}

/// A delegate producing triplets for metric learning.
///
/// For an anchor at `index`, emits a positive example (same class), a
/// negative example (different class), and the negative example's label.
/// Sampling is deterministic per `(seed, index)`.
///
/// # Example
///
/// ```
/// use ml_compose::{Delegate, Role, TripletDelegate};
///
/// let inputs = vec![10, 11, 20, 21, 30, 31];
/// let labels = vec![0, 0, 1, 1, 2, 2];
/// let classes = labels.clone();
///
/// let triplet = TripletDelegate::new(inputs, labels, classes, 42).unwrap();
/// let items = triplet.sample(0);
///
/// assert_eq!(items.len(), 3);
/// assert_eq!(items[0].role, Role::Input); // positive
/// assert_eq!(items[1].role, Role::Input); // negative
/// assert_eq!(items[2].role, Role::Label); // negative label
///
/// // Positive comes from the anchor's class
/// assert!(items[0].value / 10 == 1);
/// // Negative does not
/// assert!(items[1].value / 10 != 1);
/// ```
#[derive(Debug)]
pub struct TripletDelegate<T> {
    inputs: Vec<T>,
    labels: Vec<T>,
    classes: Vec<usize>,
    by_class: Vec<Vec<usize>>,
    seed: u64,
}

impl<T> TripletDelegate<T> {
    /// Creates a triplet delegate.
    ///
    /// `classes[i]` is the class id of row `i`; `labels[i]` is the label
    /// value emitted when row `i` is drawn as the negative example.
    ///
    /// # Errors
    ///
    /// Returns an error if the three vectors disagree in length or fewer
    /// than two classes are present.
    pub fn new(inputs: Vec<T>, labels: Vec<T>, classes: Vec<usize>, seed: u64) -> Result<Self> {
        if labels.len() != inputs.len() {
            return Err(ComposeError::length_mismatch(
                "labels",
                inputs.len(),
                labels.len(),
            ));
        }
        if classes.len() != inputs.len() {
            return Err(ComposeError::length_mismatch(
                "classes",
                inputs.len(),
                classes.len(),
            ));
        }

        let class_count = classes.iter().map(|&c| c + 1).max().unwrap_or(0);
        if class_count < 2 {
            return Err(ComposeError::invalid_split(
                "triplet sampling needs at least two classes",
            ));
        }

        let mut by_class = vec![Vec::new(); class_count];
        for (row, &class) in classes.iter().enumerate() {
            by_class[class].push(row);
        }
        if by_class.iter().any(Vec::is_empty) {
            return Err(ComposeError::invalid_split(
                "every class id up to the maximum must have at least one row",
            ));
        }

        Ok(Self {
            inputs,
            labels,
            classes,
            by_class,
            seed,
        })
    }
}

impl<T: Clone + Send + Sync> Delegate<T> for TripletDelegate<T> {
    fn len(&self) -> usize {
        self.inputs.len()
    }

    fn kind(&self) -> &'static str {
        "triplet"
    }

    fn sample(&self, index: usize) -> Vec<SampleItem<T>> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ (index as u64).wrapping_mul(0x9E37));
        let anchor_class = self.classes[index % self.classes.len()];

        // Draw a class other than the anchor's
        let mut neg_class = rng.gen_range(0..self.by_class.len() - 1);
        if neg_class >= anchor_class {
            neg_class += 1;
        }

        let pos_rows = &self.by_class[anchor_class];
        let neg_rows = &self.by_class[neg_class];
        let pos_row = pos_rows[rng.gen_range(0..pos_rows.len())];
        let neg_row = neg_rows[rng.gen_range(0..neg_rows.len())];

        vec![
            SampleItem::input(self.inputs[pos_row].clone()).named("positive"),
            SampleItem::input(self.inputs[neg_row].clone()).named("negative"),
            SampleItem::label(self.labels[neg_row].clone()).named("negative_label"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> TripletDelegate<i64> {
        let inputs = vec![10, 11, 20, 21, 30, 31];
        let labels = vec![0, 0, 1, 1, 2, 2];
        let classes = vec![0, 0, 1, 1, 2, 2];
        TripletDelegate::new(inputs, labels, classes, 7).unwrap()
    }

    #[test]
    fn item_constructors() {
        let item = SampleItem::input(5).named("x");
        assert_eq!(item.role, Role::Input);
        assert_eq!(item.name.as_deref(), Some("x"));

        assert_eq!(SampleItem::label(1).role, Role::Label);
        assert_eq!(SampleItem::id(1).role, Role::Id);
    }

    #[test]
    fn triplet_rejects_length_mismatch() {
        let err = TripletDelegate::new(vec![1, 2], vec![0], vec![0, 1], 0).unwrap_err();
        assert!(matches!(err, ComposeError::LengthMismatch { .. }));
    }

    #[test]
    fn triplet_rejects_single_class() {
        let err = TripletDelegate::new(vec![1, 2], vec![0, 0], vec![0, 0], 0).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidSplit(_)));
    }

    #[test]
    fn triplet_rejects_gap_in_class_ids() {
        // Class 1 has no rows
        let err = TripletDelegate::new(vec![1, 2], vec![0, 2], vec![0, 2], 0).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidSplit(_)));
    }

    #[test]
    fn triplet_positive_shares_anchor_class() {
        let d = fixture();
        for index in 0..6 {
            let items = d.sample(index);
            let anchor_class = index / 2;
            // inputs encode class in the tens digit
            assert_eq!(items[0].value as usize / 10 - 1, anchor_class);
            assert_ne!(items[1].value as usize / 10 - 1, anchor_class);
            assert_eq!(items[2].value as usize, items[1].value as usize / 10 - 1);
        }
    }

    #[test]
    fn triplet_is_deterministic_per_index() {
        let d = fixture();
        assert_eq!(d.sample(3), d.sample(3));
    }

    #[test]
    fn triplet_reports_length_and_kind() {
        let d = fixture();
        assert_eq!(Delegate::len(&d), 6);
        assert_eq!(d.kind(), "triplet");
        assert!(!Delegate::is_empty(&d));
    }
}
