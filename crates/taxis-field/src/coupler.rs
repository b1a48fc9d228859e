//! Derived-field coupling.
//!
//! A [`FieldCoupler`] holds a declarative table of derived field →
//! [`Combination`] rules. Each application recomputes every cell of every
//! derived field from the *current* concentrations of its sources, so it
//! must run before the sources diffuse for the same tick. Results that
//! would go negative are clamped to zero.

use std::error::Error;
use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;
use taxis_core::FieldId;
use tracing::trace;

use crate::FieldStore;

/// How a derived field is computed from its sources, cell by cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Combination {
    /// `target = source`.
    Copy(FieldId),
    /// `target = sum(sources)`.
    Sum(Vec<FieldId>),
    /// `target = max(minuend - subtrahend, 0)`.
    Difference {
        /// Field added.
        minuend: FieldId,
        /// Field subtracted.
        subtrahend: FieldId,
    },
}

impl Combination {
    /// Every field this combination reads, in declaration order.
    pub fn sources(&self) -> SmallVec<[FieldId; 4]> {
        match self {
            Self::Copy(src) => SmallVec::from_slice(&[*src]),
            Self::Sum(srcs) => srcs.iter().copied().collect(),
            Self::Difference {
                minuend,
                subtrahend,
            } => SmallVec::from_slice(&[*minuend, *subtrahend]),
        }
    }

    /// Evaluate into `out`, which must be sized to the target grid.
    /// Sources missing from `store` contribute nothing.
    fn evaluate(&self, store: &FieldStore, out: &mut [f64]) {
        let conc = |id: FieldId| store.get(id).map(|f| f.concentrations());
        match self {
            Self::Copy(src) => {
                out.fill(0.0);
                if let Some(values) = conc(*src) {
                    for (o, v) in out.iter_mut().zip(values) {
                        *o = *v;
                    }
                }
            }
            Self::Sum(srcs) => {
                out.fill(0.0);
                for values in srcs.iter().filter_map(|&id| conc(id)) {
                    for (o, v) in out.iter_mut().zip(values) {
                        *o += v;
                    }
                }
            }
            Self::Difference {
                minuend,
                subtrahend,
            } => {
                out.fill(0.0);
                if let Some(values) = conc(*minuend) {
                    for (o, v) in out.iter_mut().zip(values) {
                        *o = *v;
                    }
                }
                if let Some(values) = conc(*subtrahend) {
                    for (o, v) in out.iter_mut().zip(values) {
                        *o -= v;
                    }
                }
            }
        }
    }
}

/// Errors from coupling validation (setup-time, not per-tick).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CouplingError {
    /// A rule references a field not registered in the store.
    UnknownField {
        /// The derived field the rule writes.
        target: FieldId,
        /// The missing field.
        field: FieldId,
    },
    /// A `Sum` rule has no sources.
    EmptySum {
        /// The derived field.
        target: FieldId,
    },
    /// Two rules write the same derived field.
    WriteConflict {
        /// The contested field.
        target: FieldId,
    },
    /// A rule reads its own target.
    SelfReference {
        /// The derived field.
        target: FieldId,
    },
    /// A derived field is used as a source of another rule.
    DerivedSource {
        /// The rule's target.
        target: FieldId,
        /// The derived field it tried to read.
        source: FieldId,
    },
    /// Source and target grids differ.
    ShapeMismatch {
        /// The derived field.
        target: FieldId,
        /// The source with a different grid.
        source: FieldId,
        /// Target grid dimensions.
        target_shape: [usize; 3],
        /// Source grid dimensions.
        source_shape: [usize; 3],
    },
}

impl fmt::Display for CouplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { target, field } => {
                write!(f, "coupling for field {target} references unknown field {field}")
            }
            Self::EmptySum { target } => write!(f, "sum coupling for field {target} has no sources"),
            Self::WriteConflict { target } => {
                write!(f, "field {target} is derived by more than one coupling")
            }
            Self::SelfReference { target } => write!(f, "coupling for field {target} reads itself"),
            Self::DerivedSource { target, source } => write!(
                f,
                "coupling for field {target} reads derived field {source}; derived chains are not supported"
            ),
            Self::ShapeMismatch {
                target,
                source,
                target_shape,
                source_shape,
            } => write!(
                f,
                "coupling for field {target} ({target_shape:?}) reads field {source} with grid {source_shape:?}"
            ),
        }
    }
}

impl Error for CouplingError {}

/// Insertion-ordered table of derived-field rules.
///
/// # Examples
///
/// ```
/// use taxis_core::{BoundBox, DVec3, FieldId};
/// use taxis_field::{ChemicalField, Combination, FieldCoupler, FieldStore};
///
/// let bound = BoundBox::solid(DVec3::splat(4.0)).unwrap();
/// let mut store = FieldStore::new();
/// for name in ["signal", "goal"] {
///     store.insert(
///         ChemicalField::builder().name(name).shape([4, 4, 4]).bound(&bound).build().unwrap(),
///     );
/// }
/// store.add_quantity(FieldId(0), DVec3::splat(1.5), 2.0);
///
/// let mut coupler = FieldCoupler::new();
/// coupler.add_rule(FieldId(1), Combination::Copy(FieldId(0))).unwrap();
/// coupler.validate(&store).unwrap();
/// coupler.apply(&mut store);
///
/// assert_eq!(store.conc_at(FieldId(1), DVec3::splat(1.5)), Some(2.0));
/// assert!(coupler.is_derived(FieldId(1)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FieldCoupler {
    rules: IndexMap<FieldId, Combination>,
    scratch: Vec<f64>,
}

impl FieldCoupler {
    /// An empty coupler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` as derived by `combination`.
    ///
    /// # Errors
    ///
    /// [`CouplingError::WriteConflict`] if `target` is already derived,
    /// [`CouplingError::SelfReference`] if the rule reads `target`, and
    /// [`CouplingError::EmptySum`] for a sum with no sources.
    pub fn add_rule(&mut self, target: FieldId, combination: Combination) -> Result<(), CouplingError> {
        if self.rules.contains_key(&target) {
            return Err(CouplingError::WriteConflict { target });
        }
        if matches!(&combination, Combination::Sum(srcs) if srcs.is_empty()) {
            return Err(CouplingError::EmptySum { target });
        }
        if combination.sources().contains(&target) {
            return Err(CouplingError::SelfReference { target });
        }
        self.rules.insert(target, combination);
        Ok(())
    }

    /// Check every rule against the fields actually registered.
    ///
    /// # Errors
    ///
    /// The first [`CouplingError`] found, in rule order.
    pub fn validate(&self, store: &FieldStore) -> Result<(), CouplingError> {
        for (&target, combination) in &self.rules {
            let target_field = store.get(target).ok_or(CouplingError::UnknownField {
                target,
                field: target,
            })?;
            let target_shape = target_field.shape().dims();
            for source in combination.sources() {
                if self.rules.contains_key(&source) {
                    return Err(CouplingError::DerivedSource { target, source });
                }
                let source_field = store.get(source).ok_or(CouplingError::UnknownField {
                    target,
                    field: source,
                })?;
                let source_shape = source_field.shape().dims();
                if source_shape != target_shape {
                    return Err(CouplingError::ShapeMismatch {
                        target,
                        source,
                        target_shape,
                        source_shape,
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether `id` is recomputed by this coupler rather than diffused.
    pub fn is_derived(&self, id: FieldId) -> bool {
        self.rules.contains_key(&id)
    }

    /// Iterate `(target, combination)` in registration order.
    pub fn rules(&self) -> impl Iterator<Item = (FieldId, &Combination)> {
        self.rules.iter().map(|(&t, c)| (t, c))
    }

    /// Number of derived fields.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no field is derived.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Recompute every derived field from current source values.
    ///
    /// Intended for a validated coupler; rules whose target is missing
    /// are skipped. Returns the number of cells written.
    pub fn apply(&mut self, store: &mut FieldStore) -> usize {
        let mut written = 0;
        for (&target, combination) in &self.rules {
            let Some(cells) = store.get(target).map(|f| f.concentrations().len()) else {
                continue;
            };
            self.scratch.clear();
            self.scratch.resize(cells, 0.0);
            combination.evaluate(store, &mut self.scratch);
            if let Some(field) = store.get_mut(target) {
                field.overwrite(&self.scratch);
                written += cells;
            }
            trace!(%target, cells, "derived field recomputed");
        }
        written
    }
}
