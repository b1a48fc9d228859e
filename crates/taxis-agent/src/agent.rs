//! The per-organism behaviour model.

use glam::DVec3;
use rand::Rng;
use taxis_core::FieldId;
use tracing::trace;

use crate::context::ActContext;
use crate::motility::MotilityState;
use crate::species::{radius_from_surface_area, SecretionMode, Species, SpeciesProfile};

/// One simulated organism.
///
/// Size is stored as surface area; [`radius`](Self::radius) is always
/// derived from it. Species-wide behaviour comes from the
/// [`SpeciesProfile`] passed to [`act`](Self::act).
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    position: DVec3,
    surface_area: f64,
    species: Species,
    growth_rate: f64,
    goal: Option<FieldId>,
    motility: MotilityState,
}

impl Agent {
    /// A new agent at `position` with the profile's initial size and a
    /// random heading.
    pub fn new<R: Rng + ?Sized>(position: DVec3, profile: &SpeciesProfile, rng: &mut R) -> Self {
        Self::with_surface_area(position, profile.initial_surface_area(), profile, rng)
    }

    /// A new agent with an explicit surface area.
    pub fn with_surface_area<R: Rng + ?Sized>(
        position: DVec3,
        surface_area: f64,
        profile: &SpeciesProfile,
        rng: &mut R,
    ) -> Self {
        Self {
            position,
            surface_area,
            species: profile.species,
            growth_rate: profile.growth_rate,
            goal: profile.goal,
            motility: MotilityState::random(rng),
        }
    }

    /// Centre of the agent.
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Current surface area.
    pub fn surface_area(&self) -> f64 {
        self.surface_area
    }

    /// Radius derived from the surface area.
    pub fn radius(&self) -> f64 {
        radius_from_surface_area(self.surface_area)
    }

    /// Species tag.
    pub fn species(&self) -> Species {
        self.species
    }

    /// Surface area added per unit time.
    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    /// Field this agent chemotaxes toward.
    pub fn goal(&self) -> Option<FieldId> {
        self.goal
    }

    /// Current unit heading.
    pub fn heading(&self) -> DVec3 {
        self.motility.heading
    }

    /// Distance between surfaces; negative when the spheres overlap.
    pub fn outer_distance(&self, other: &Agent) -> f64 {
        self.position.distance(other.position) - self.radius() - other.radius()
    }

    /// Whether this agent overlaps any member of `others`.
    pub fn intersects<'a, I>(&self, others: I) -> bool
    where
        I: IntoIterator<Item = &'a Agent>,
    {
        others.into_iter().any(|o| self.outer_distance(o) < 0.0)
    }

    /// One tick of behaviour: move, secrete, grow, maybe replicate.
    ///
    /// A child produced by replication is pushed onto `nursery`, never
    /// into the list the caller is iterating. Returns `true` if the agent
    /// divided.
    pub fn act(
        &mut self,
        profile: &SpeciesProfile,
        ctx: &mut ActContext<'_>,
        nursery: &mut Vec<Agent>,
    ) -> bool {
        let dt = ctx.dt;

        // Move.
        let goal = self.goal.and_then(|id| ctx.fields.get(id));
        let heading = profile.taxis.choose_heading(
            &mut self.motility,
            self.position,
            ctx.bound,
            goal,
            dt,
            &mut *ctx.rng,
        );
        let (position, heading) = ctx
            .bound
            .confine(self.position + heading * (profile.speed * dt), heading);
        self.position = position;
        self.motility.heading = heading;

        // Secrete.
        for s in &profile.secretions {
            let fire = match s.mode {
                SecretionMode::EveryTick => true,
                SecretionMode::Stochastic { rate } => ctx.rng.random::<f64>() < rate * dt,
            };
            if fire && !ctx.fields.add_quantity(s.field, self.position, s.amount) {
                ctx.record_dropped_deposit();
            }
        }

        // Grow.
        self.surface_area += self.growth_rate * dt;

        // Replicate.
        if self.radius() >= profile.replication_radius {
            self.surface_area *= 0.5;
            let child =
                Agent::with_surface_area(self.position, self.surface_area, profile, &mut *ctx.rng);
            trace!(species = %self.species, position = ?self.position, "agent divided");
            nursery.push(child);
            return true;
        }
        false
    }
}
