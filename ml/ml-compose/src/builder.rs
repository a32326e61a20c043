//! Declarative sample composition.
//!
//! [`SampleBuilder`] assembles indexable samples from named data sources,
//! declared output fields with optional per-field transforms, and attached
//! [`Delegate`]s. Index resolution runs the virtual-oversampling remap
//! first, then the subset remap, then the source lookup.

use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use ml_attrs::AttrMap;
use tracing::debug;

use crate::delegate::{Delegate, Role, SampleItem};
use crate::error::{ComposeError, Result};

/// A per-field transform applied to values drawn from a source.
pub type Transform<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// Declares one output field of a [`SampleBuilder`].
///
/// # Example
///
/// ```
/// use ml_compose::Field;
///
/// let f: Field<i64> = Field::named("doubled")
///     .from_source("xs")
///     .with_transform(|v| v * 2);
/// ```
pub struct Field<T> {
    name: Option<String>,
    source: Option<String>,
    transform: Option<Transform<T>>,
}

impl<T> Field<T> {
    /// Creates a field with a default name and source.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            source: None,
            transform: None,
        }
    }

    /// Creates a named field.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            source: None,
            transform: None,
        }
    }

    /// Draws the field from a specific source.
    #[must_use]
    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Applies a transform to each drawn value.
    #[must_use]
    pub fn with_transform(mut self, transform: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Binds a [`Delegate`] into a [`SampleBuilder`].
pub struct DelegateBinding<T> {
    name: Option<String>,
    delegate: Box<dyn Delegate<T>>,
    transform: Option<Transform<T>>,
    target_transform: Option<Transform<T>>,
}

impl<T> DelegateBinding<T> {
    /// Wraps a delegate.
    pub fn new(delegate: impl Delegate<T> + 'static) -> Self {
        Self {
            name: None,
            delegate: Box::new(delegate),
            transform: None,
            target_transform: None,
        }
    }

    /// Names the binding.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Applies a transform to emitted inputs.
    #[must_use]
    pub fn with_transform(mut self, transform: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Applies a transform to emitted labels.
    #[must_use]
    pub fn with_target_transform(
        mut self,
        transform: impl Fn(T) -> T + Send + Sync + 'static,
    ) -> Self {
        self.target_transform = Some(Box::new(transform));
        self
    }
}

struct FieldSpec<T> {
    name: String,
    source: String,
    transform: Option<Transform<T>>,
}

struct DelegateSlot<T> {
    name: String,
    delegate: Box<dyn Delegate<T>>,
    transform: Option<Transform<T>>,
    target_transform: Option<Transform<T>>,
}

/// Rotating remap table for virtual oversampling.
///
/// Indices past the real length resolve through a per-slot cursor that
/// advances by the virtual surplus on every access, so repeated passes
/// over the virtual range visit different base samples. Atomics keep the
/// builder `Sync`; the rotation is best-effort under contention, matching
/// the advisory nature of oversampling.
struct OversampleMap {
    real_len: usize,
    extra: usize,
    slots: Vec<AtomicUsize>,
}

impl OversampleMap {
    fn new(real_len: usize, virtual_len: usize) -> Self {
        let extra = virtual_len - real_len;
        Self {
            real_len,
            extra,
            slots: (0..extra).map(AtomicUsize::new).collect(),
        }
    }

    fn resolve(&self, index: usize) -> usize {
        if index < self.real_len {
            return index;
        }
        let slot = &self.slots[index - self.real_len];
        let next = (slot.load(Ordering::Relaxed) + self.extra) % self.real_len;
        slot.store(next, Ordering::Relaxed);
        next
    }
}

/// A composed sample.
///
/// Fields appear in declaration order: delegate-emitted ids, then declared
/// inputs, then declared labels, with delegate-emitted inputs/labels after
/// the declared ones, matching the composition order of the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    /// The resolved raw index, present when the builder emits indices.
    pub index: Option<usize>,
    /// Identifier fields.
    pub ids: Vec<(Option<String>, T)>,
    /// Input fields.
    pub inputs: Vec<(Option<String>, T)>,
    /// Label fields.
    pub labels: Vec<(Option<String>, T)>,
}

impl<T> Sample<T> {
    /// Flattens the sample into a value tuple: ids, inputs, labels.
    #[must_use]
    pub fn into_tuple(self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.ids.len() + self.inputs.len() + self.labels.len());
        out.extend(self.ids.into_iter().map(|(_, v)| v));
        out.extend(self.inputs.into_iter().map(|(_, v)| v));
        out.extend(self.labels.into_iter().map(|(_, v)| v));
        out
    }

    /// Converts the sample into an ordered name -> value record.
    ///
    /// The resolved index is not part of the record; read it from
    /// [`Sample::index`] before converting.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is unnamed.
    pub fn into_record(self) -> Result<IndexMap<String, T>> {
        let mut record = IndexMap::new();
        let fields = self
            .ids
            .into_iter()
            .chain(self.inputs)
            .chain(self.labels);
        for (name, value) in fields {
            let name = name.ok_or_else(|| ComposeError::unnamed_record_field("sample"))?;
            record.insert(name, value);
        }
        Ok(record)
    }

    /// Total number of fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.ids.len() + self.inputs.len() + self.labels.len()
    }
}

/// Builds indexable samples from named sources, fields and delegates.
///
/// # Example
///
/// ```
/// use ml_compose::{Field, SampleBuilder};
///
/// let builder = SampleBuilder::new()
///     .add_inputs(vec![1, 2, 3, 4])
///     .unwrap()
///     .add_labels(vec![0, 0, 1, 1])
///     .unwrap()
///     .input_field(Field::new().with_transform(|v: i64| v * 10))
///     .unwrap()
///     .label_field(Field::new())
///     .unwrap();
///
/// assert_eq!(builder.len(), 4);
///
/// let sample = builder.get(2).unwrap();
/// assert_eq!(sample.into_tuple(), vec![30, 1]);
/// ```
pub struct SampleBuilder<T> {
    name: String,
    base_len: Option<usize>,
    sources: IndexMap<String, Vec<T>>,
    input_fields: Vec<FieldSpec<T>>,
    label_fields: Vec<FieldSpec<T>>,
    delegates: Vec<DelegateSlot<T>>,
    subset: Option<Vec<usize>>,
    oversample: Option<OversampleMap>,
    emit_index: bool,
    record: bool,
}

impl<T> Default for SampleBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SampleBuilder<T> {
    /// Default source name for inputs.
    pub const INPUT_SOURCE: &'static str = "xs";

    /// Default source name for labels.
    pub const LABEL_SOURCE: &'static str = "ys";

    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "dataset".to_string(),
            base_len: None,
            sources: IndexMap::new(),
            input_fields: Vec::new(),
            label_fields: Vec::new(),
            delegates: Vec::new(),
            subset: None,
            oversample: None,
            emit_index: false,
            record: false,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers the default input source (`"xs"`).
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate name or length mismatch.
    pub fn add_inputs(self, values: Vec<T>) -> Result<Self> {
        self.add_source(Self::INPUT_SOURCE, values)
    }

    /// Registers the default label source (`"ys"`).
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate name or length mismatch.
    pub fn add_labels(self, values: Vec<T>) -> Result<Self> {
        self.add_source(Self::LABEL_SOURCE, values)
    }

    /// Registers a named data source.
    ///
    /// All sources must agree on length; the first registration fixes it.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate name or length mismatch.
    pub fn add_source(mut self, name: impl Into<String>, values: Vec<T>) -> Result<Self> {
        let name = name.into();
        if self.sources.contains_key(&name) {
            return Err(ComposeError::duplicate_source(name));
        }
        self.check_len(&name, values.len())?;
        self.sources.insert(name, values);
        Ok(self)
    }

    /// Declares an input field. Unnamed fields get `input_{n}`.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate field name.
    pub fn input_field(mut self, field: Field<T>) -> Result<Self> {
        let name = field
            .name
            .unwrap_or_else(|| format!("input_{}", self.input_fields.len()));
        self.check_field_name(&name)?;
        self.input_fields.push(FieldSpec {
            name,
            source: field
                .source
                .unwrap_or_else(|| Self::INPUT_SOURCE.to_string()),
            transform: field.transform,
        });
        Ok(self)
    }

    /// Declares a label field. Unnamed fields get `label_{n}`.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate field name.
    pub fn label_field(mut self, field: Field<T>) -> Result<Self> {
        let name = field
            .name
            .unwrap_or_else(|| format!("label_{}", self.label_fields.len()));
        self.check_field_name(&name)?;
        self.label_fields.push(FieldSpec {
            name,
            source: field
                .source
                .unwrap_or_else(|| Self::LABEL_SOURCE.to_string()),
            transform: field.transform,
        });
        Ok(self)
    }

    /// Attaches a delegate. Unnamed bindings get `delegate_{n}`.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate delegate name, or when the delegate
    /// reports a non-zero length that disagrees with the dataset.
    pub fn add_delegate(mut self, binding: DelegateBinding<T>) -> Result<Self> {
        let name = binding
            .name
            .unwrap_or_else(|| format!("delegate_{}", self.delegates.len()));
        if self.delegates.iter().any(|d| d.name == name) {
            return Err(ComposeError::duplicate_delegate(name));
        }
        let delegate_len = binding.delegate.len();
        if delegate_len != 0 {
            self.check_len(&name, delegate_len)?;
        }
        self.delegates.push(DelegateSlot {
            name,
            delegate: binding.delegate,
            transform: binding.transform,
            target_transform: binding.target_transform,
        });
        Ok(self)
    }

    /// Includes the resolved raw index in each sample.
    #[must_use]
    pub const fn with_index(mut self) -> Self {
        self.emit_index = true;
        self
    }

    /// Switches output checks to record mode: every field, including
    /// delegate-emitted ones, must be named.
    #[must_use]
    pub const fn record_mode(mut self) -> Self {
        self.record = true;
        self
    }

    /// Restricts the dataset to a subset of indices.
    ///
    /// The oversampling remap is sized from the subset, so the subset
    /// must be registered before [`SampleBuilder::virtual_len`].
    ///
    /// # Errors
    ///
    /// Returns an error if no sources are registered, an index is out of
    /// bounds for the base length, or virtual oversampling is already
    /// enabled.
    pub fn subset(mut self, indices: Vec<usize>) -> Result<Self> {
        if self.oversample.is_some() {
            return Err(ComposeError::SubsetAfterOversample);
        }
        let base = self.base_len.ok_or(ComposeError::NoSources)?;
        if let Some(&bad) = indices.iter().find(|&&i| i >= base) {
            return Err(ComposeError::index_out_of_bounds(bad, base));
        }
        self.subset = Some(indices);
        Ok(self)
    }

    /// Virtually oversamples the dataset to `virtual_len` samples.
    ///
    /// Call after sources and any subset are registered; the remap is
    /// sized from the length at this point.
    ///
    /// # Errors
    ///
    /// Returns an error if no sources are registered, the dataset is
    /// empty, or `virtual_len` is below the current length.
    pub fn virtual_len(mut self, virtual_len: usize) -> Result<Self> {
        if self.base_len.is_none() {
            return Err(ComposeError::NoSources);
        }
        let real = self.real_len();
        if real == 0 || virtual_len < real {
            return Err(ComposeError::InvalidVirtualLen {
                requested: virtual_len,
                real,
            });
        }
        debug!(real, virtual_len, "enabling virtual oversampling");
        self.oversample = Some(OversampleMap::new(real, virtual_len));
        Ok(self)
    }

    fn real_len(&self) -> usize {
        self.subset
            .as_ref()
            .map_or(self.base_len.unwrap_or(0), Vec::len)
    }

    /// The number of addressable samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.oversample
            .as_ref()
            .map_or_else(|| self.real_len(), |o| o.real_len + o.extra)
    }

    /// Returns `true` if no samples are addressable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_len(&mut self, name: &str, len: usize) -> Result<()> {
        match self.base_len {
            None => {
                self.base_len = Some(len);
                Ok(())
            }
            Some(expected) if expected == len => Ok(()),
            Some(expected) => Err(ComposeError::length_mismatch(name, expected, len)),
        }
    }

    fn check_field_name(&self, name: &str) -> Result<()> {
        let taken = self
            .input_fields
            .iter()
            .chain(&self.label_fields)
            .any(|f| f.name == name);
        if taken {
            return Err(ComposeError::duplicate_field(name));
        }
        Ok(())
    }

    fn resolve_index(&self, index: usize) -> Result<usize> {
        let len = self.len();
        if index >= len {
            return Err(ComposeError::index_out_of_bounds(index, len));
        }
        let mut resolved = index;
        if let Some(oversample) = &self.oversample {
            resolved = oversample.resolve(resolved);
        }
        if let Some(subset) = &self.subset {
            resolved = subset
                .get(resolved)
                .copied()
                .ok_or(ComposeError::index_out_of_bounds(resolved, subset.len()))?;
        }
        Ok(resolved)
    }

    /// Summarizes the declared fields as an ordered map.
    ///
    /// Declared fields map to their source name; delegate bindings map to
    /// the delegate's kind.
    #[must_use]
    pub fn describe(&self) -> AttrMap {
        let mut map = AttrMap::new();
        if self.emit_index {
            map.insert("_index", "index");
        }
        for field in self.input_fields.iter().chain(&self.label_fields) {
            map.insert(field.name.clone(), field.source.clone());
        }
        for slot in &self.delegates {
            map.insert(slot.name.clone(), slot.delegate.kind());
        }
        map
    }
}

impl<T: Clone> SampleBuilder<T> {
    /// Composes the sample at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of bounds, a field references
    /// an unregistered source, or record mode encounters an unnamed
    /// delegate item.
    pub fn get(&self, index: usize) -> Result<Sample<T>> {
        let resolved = self.resolve_index(index)?;

        let mut sample = Sample {
            index: self.emit_index.then_some(resolved),
            ids: Vec::new(),
            inputs: Vec::new(),
            labels: Vec::new(),
        };

        for field in &self.input_fields {
            let value = self.draw(field, resolved)?;
            sample.inputs.push((Some(field.name.clone()), value));
        }
        for field in &self.label_fields {
            let value = self.draw(field, resolved)?;
            sample.labels.push((Some(field.name.clone()), value));
        }

        for slot in &self.delegates {
            for item in slot.delegate.sample(resolved) {
                if self.record && item.name.is_none() {
                    return Err(ComposeError::unnamed_record_field(slot.name.clone()));
                }
                let SampleItem { role, name, value } = item;
                match role {
                    Role::Input => {
                        let value = match &slot.transform {
                            Some(t) => t(value),
                            None => value,
                        };
                        sample.inputs.push((name, value));
                    }
                    Role::Label => {
                        let value = match &slot.target_transform {
                            Some(t) => t(value),
                            None => value,
                        };
                        sample.labels.push((name, value));
                    }
                    Role::Id => sample.ids.push((name, value)),
                }
            }
        }

        Ok(sample)
    }

    fn draw(&self, field: &FieldSpec<T>, index: usize) -> Result<T> {
        let source = self
            .sources
            .get(&field.source)
            .ok_or_else(|| ComposeError::unknown_source(field.name.clone(), field.source.clone()))?;
        let value = source
            .get(index)
            .ok_or_else(|| ComposeError::index_out_of_bounds(index, source.len()))?
            .clone();
        Ok(match &field.transform {
            Some(t) => t(value),
            None => value,
        })
    }

    /// Iterates over all samples in index order.
    pub fn iter(&self) -> impl Iterator<Item = Result<Sample<T>>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}

impl<T> std::fmt::Debug for SampleBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleBuilder")
            .field("name", &self.name)
            .field("base_len", &self.base_len)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field(
                "input_fields",
                &self.input_fields.iter().map(|s| &s.name).collect::<Vec<_>>(),
            )
            .field(
                "label_fields",
                &self.label_fields.iter().map(|s| &s.name).collect::<Vec<_>>(),
            )
            .field(
                "delegates",
                &self.delegates.iter().map(|s| &s.name).collect::<Vec<_>>(),
            )
            .field("emit_index", &self.emit_index)
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl<T> std::fmt::Display for SampleBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids = if self.emit_index { "_index" } else { "" };
        let inputs: Vec<&str> = self.input_fields.iter().map(|s| s.name.as_str()).collect();
        let labels: Vec<&str> = self.label_fields.iter().map(|s| s.name.as_str()).collect();
        let delegates: Vec<&str> = self.delegates.iter().map(|s| s.name.as_str()).collect();
        write!(
            f,
            "{}: ({}, {}, {}, {})",
            self.name,
            ids,
            inputs.join(", "),
            labels.join(", "),
            delegates.join(", ")
        )
    }
}
