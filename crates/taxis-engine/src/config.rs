//! Simulation configuration and validation.

use std::error::Error;
use std::fmt;

use taxis_agent::{PlacementError, Species, SpeciesProfile};
use taxis_core::{BoundBox, FieldId, PopulationId};
use taxis_field::{ChemicalField, Combination, CouplingError, FieldCoupler, FieldStore};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`SimulationConfig`] or setting a
/// simulation up. Every variant aborts before the first tick.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `dt` is NaN, infinite, zero, or negative.
    InvalidTimestep {
        /// The invalid value.
        value: f64,
    },
    /// `duration` is NaN, infinite, or negative.
    InvalidDuration {
        /// The invalid value.
        value: f64,
    },
    /// A field definition failed validation.
    InvalidField {
        /// Configured field name.
        name: String,
        /// Description of the validation failure.
        reason: String,
    },
    /// A diffusing field would be unstable at the configured `dt`.
    NumericalInstability {
        /// Configured field name.
        field: String,
        /// The configured step.
        dt: f64,
        /// Largest stable step for this field.
        max_dt: f64,
    },
    /// A species profile failed validation.
    InvalidSpecies {
        /// Population the profile belongs to.
        population: PopulationId,
        /// Its species tag.
        species: Species,
        /// Description of the validation failure.
        reason: String,
    },
    /// A species profile refers to a field that does not exist.
    UnknownField {
        /// Population the profile belongs to.
        population: PopulationId,
        /// Its species tag.
        species: Species,
        /// The missing field.
        field: FieldId,
    },
    /// Two populations carry the same species tag.
    DuplicateSpecies {
        /// The later population repeating the tag.
        population: PopulationId,
        /// The repeated tag.
        species: Species,
    },
    /// Derived-field coupling validation failed.
    Coupling(CouplingError),
    /// Initial placement could not fit the requested agents.
    Placement(PlacementError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimestep { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::InvalidDuration { value } => {
                write!(f, "duration must be finite and >= 0, got {value}")
            }
            Self::InvalidField { name, reason } => write!(f, "field '{name}': {reason}"),
            Self::NumericalInstability { field, dt, max_dt } => write!(
                f,
                "field '{field}' is unstable at dt {dt}: diffusion requires dt <= {max_dt}"
            ),
            Self::InvalidSpecies {
                population,
                species,
                reason,
            } => write!(f, "population {population} (species {species}): {reason}"),
            Self::UnknownField {
                population,
                species,
                field,
            } => write!(
                f,
                "population {population} (species {species}) references unknown field {field}"
            ),
            Self::DuplicateSpecies {
                population,
                species,
            } => write!(
                f,
                "population {population} repeats species {species}; each tag needs one profile"
            ),
            Self::Coupling(e) => write!(f, "coupling: {e}"),
            Self::Placement(e) => write!(f, "placement: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Coupling(e) => Some(e),
            Self::Placement(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CouplingError> for ConfigError {
    fn from(e: CouplingError) -> Self {
        Self::Coupling(e)
    }
}

impl From<PlacementError> for ConfigError {
    fn from(e: PlacementError) -> Self {
        Self::Placement(e)
    }
}

// ── FieldConfig ────────────────────────────────────────────────────

/// One chemical field. Its grid always spans the simulation bound box.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    /// Name used in diagnostics, lookups, and tabular output.
    pub name: String,
    /// Box counts per axis.
    pub shape: [usize; 3],
    /// Diffusivity (length²/time). Ignored for derived fields.
    pub diffusivity: f64,
    /// Decay rate (1/time). Ignored for derived fields.
    pub decay_rate: f64,
    /// Concentration every cell starts at.
    pub initial_concentration: f64,
}

impl FieldConfig {
    /// A non-diffusing, non-decaying field starting empty.
    pub fn new(name: impl Into<String>, shape: [usize; 3]) -> Self {
        Self {
            name: name.into(),
            shape,
            diffusivity: 0.0,
            decay_rate: 0.0,
            initial_concentration: 0.0,
        }
    }

    /// Set the diffusivity.
    pub fn with_diffusivity(mut self, d: f64) -> Self {
        self.diffusivity = d;
        self
    }

    /// Set the decay rate.
    pub fn with_decay_rate(mut self, k: f64) -> Self {
        self.decay_rate = k;
        self
    }

    /// Set the initial concentration.
    pub fn with_initial_concentration(mut self, c: f64) -> Self {
        self.initial_concentration = c;
        self
    }

    fn build(&self, bound: &BoundBox) -> Result<ChemicalField, ConfigError> {
        ChemicalField::builder()
            .name(self.name.clone())
            .shape(self.shape)
            .bound(bound)
            .diffusivity(self.diffusivity)
            .decay_rate(self.decay_rate)
            .initial_concentration(self.initial_concentration)
            .build()
            .map_err(|reason| ConfigError::InvalidField {
                name: self.name.clone(),
                reason,
            })
    }
}

// ── SpeciesConfig ──────────────────────────────────────────────────

/// One population: a species profile and how many agents to place.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesConfig {
    /// Shared behaviour of every member.
    pub profile: SpeciesProfile,
    /// Agents placed at setup.
    pub initial_count: usize,
}

impl SpeciesConfig {
    /// `initial_count` agents governed by `profile`.
    pub fn new(profile: SpeciesProfile, initial_count: usize) -> Self {
        Self {
            profile,
            initial_count,
        }
    }
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Complete description of a simulation run.
///
/// `FieldId(n)` corresponds to `fields[n]`; `PopulationId(n)` to
/// `species[n]`. [`validate()`](Self::validate) checks every structural
/// invariant; [`Simulation::new`](crate::Simulation::new) runs it before
/// building any state.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Fixed time step per tick.
    pub dt: f64,
    /// Total simulated time; the run finishes once the clock reaches it.
    pub duration: f64,
    /// Simulation volume and per-axis boundary behaviour.
    pub bound: BoundBox,
    /// Seed for the simulation's single random stream.
    pub seed: u64,
    /// Chemical fields.
    pub fields: Vec<FieldConfig>,
    /// Derived fields as `(target, rule)`, applied in order.
    pub couplings: Vec<(FieldId, Combination)>,
    /// Populations, placed in order.
    pub species: Vec<SpeciesConfig>,
    /// Consecutive overlapping candidates tolerated per placed agent.
    pub max_placement_attempts: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            duration: 1000.0,
            bound: BoundBox::default(),
            seed: 0,
            fields: Vec::new(),
            couplings: Vec::new(),
            species: Vec::new(),
            max_placement_attempts: 10_000,
        }
    }
}

/// Fields and coupler built from a validated configuration.
pub(crate) struct PreparedFields {
    pub(crate) store: FieldStore,
    pub(crate) coupler: FieldCoupler,
}

impl SimulationConfig {
    /// Validate all structural invariants.
    ///
    /// Builds the fields and coupling table to check them, then discards
    /// them; placement is not attempted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.prepare_fields().map(|_| ())
    }

    pub(crate) fn prepare_fields(&self) -> Result<PreparedFields, ConfigError> {
        // 1. Clock.
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidTimestep { value: self.dt });
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ConfigError::InvalidDuration {
                value: self.duration,
            });
        }

        // 2. Fields.
        let mut store = FieldStore::new();
        for fc in &self.fields {
            store.insert(fc.build(&self.bound)?);
        }

        // 3. Couplings.
        let mut coupler = FieldCoupler::new();
        for (target, rule) in &self.couplings {
            coupler.add_rule(*target, rule.clone())?;
        }
        coupler.validate(&store)?;

        // 4. Stability of every field that actually diffuses.
        for (id, field) in store.iter() {
            if coupler.is_derived(id) {
                continue;
            }
            if let Some(max_dt) = field.max_dt() {
                if self.dt > max_dt {
                    return Err(ConfigError::NumericalInstability {
                        field: field.name().to_string(),
                        dt: self.dt,
                        max_dt,
                    });
                }
            }
        }

        // 5. Species.
        for (i, sc) in self.species.iter().enumerate() {
            let population = PopulationId(i as u32);
            let species = sc.profile.species;
            sc.profile
                .validate(self.dt)
                .map_err(|reason| ConfigError::InvalidSpecies {
                    population,
                    species,
                    reason,
                })?;
            if self.species[..i].iter().any(|o| o.profile.species == species) {
                return Err(ConfigError::DuplicateSpecies {
                    population,
                    species,
                });
            }
            if let Some(field) = sc.profile.referenced_fields().find(|&f| !store.contains(f)) {
                return Err(ConfigError::UnknownField {
                    population,
                    species,
                    field,
                });
            }
        }

        Ok(PreparedFields { store, coupler })
    }
}
