//! Rating provider abstraction.
//!
//! A [`ThermalRatingProvider`] turns (conductor, weather, temperature limit)
//! into a per-phase current limit. The screening engine only ever talks to
//! this trait; the physics lives behind it so tests can substitute stub
//! providers with known shapes.

use dlr_core::units::{Amperes, Celsius, Kilovolts, MegavoltAmperes};
use dlr_core::{AmbientConditions, ConductorSpec};
use thiserror::Error;

/// A rating request that could not produce a number.
///
/// This is an expected outcome, not a fault: ambient above the conductor
/// limit, solar gain exceeding dissipation, or inputs outside the conductor
/// data's valid range all land here. Callers must carry the reason through
/// to reports; a line without a rating is "unknown", never "unloaded".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rating unavailable: {reason}")]
pub struct RatingUnavailable {
    pub reason: String,
}

impl RatingUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Computes steady-state thermal current limits.
///
/// Implementations must be pure: identical inputs yield identical results,
/// with no hidden clocks or ambient lookups. That property is what makes
/// request-scoped caching and parallel screening sound. Implementations
/// must also never panic on non-physical inputs; they return
/// [`RatingUnavailable`] instead.
pub trait ThermalRatingProvider: Send + Sync {
    /// Steady-state ampacity of `conductor` held at `max_operating_temp`
    /// under `ambient` weather.
    fn rate(
        &self,
        conductor: &ConductorSpec,
        ambient: &AmbientConditions,
        max_operating_temp: Celsius,
    ) -> Result<Amperes, RatingUnavailable>;
}

/// A computed rating: the per-phase ampacity and its three-phase MVA
/// equivalent at the line's operating voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingResult {
    pub ampacity: Amperes,
    pub rating: MegavoltAmperes,
}

impl RatingResult {
    /// Derive the MVA rating from an ampacity at a given voltage.
    pub fn at_voltage(ampacity: Amperes, voltage: Kilovolts) -> Self {
        Self {
            ampacity,
            rating: ampacity.three_phase_mva(voltage),
        }
    }
}
