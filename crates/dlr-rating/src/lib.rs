//! Conductor thermal rating for `dlr`.
//!
//! Answers one question: how much current can a conductor carry at a given
//! operating temperature under given weather, and what does that mean in
//! MVA at line voltage. The crate is organized around a small trait so the
//! physical model can be swapped for stubs in tests:
//!
//! - [`provider`]: the [`ThermalRatingProvider`] contract and the
//!   [`RatingResult`] amps-to-MVA conversion.
//! - [`heat_balance`]: the steady-state heat balance implementation,
//!   balancing convective and radiative losses against solar gain.
//! - [`cache`]: bitwise-keyed memoization of rating outcomes.
//! - [`context`]: [`RatingContext`], which bundles a provider, one weather
//!   snapshot, and a fresh cache for the duration of a request.
//!
//! # Quick start
//!
//! ```
//! use dlr_core::{AmbientConditions, ConductorSpec};
//! use dlr_core::units::{Celsius, Kilovolts};
//! use dlr_rating::{HeatBalanceProvider, RatingContext};
//!
//! let conductor = ConductorSpec::new("3/0 ACSR 6/1 PIGEON", 0.560, 0.616, 0.251)?;
//! let ambient = AmbientConditions::default().with_temperature(Celsius(35.0));
//!
//! let ctx = RatingContext::new(&HeatBalanceProvider, &ambient);
//! let rating = ctx.rating_for(&conductor, Celsius(75.0), Kilovolts(138.0))?;
//! println!("{} -> {}", rating.ampacity, rating.rating);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache;
pub mod context;
pub mod heat_balance;
pub mod provider;

pub use cache::{RatingCache, RatingKey};
pub use context::RatingContext;
pub use heat_balance::HeatBalanceProvider;
pub use provider::{RatingResult, RatingUnavailable, ThermalRatingProvider};

use chrono::Datelike;

use dlr_core::AmbientConditions;

/// Default weather for a calendar date.
///
/// Keeps every default except the day of year, which drives solar
/// declination. Callers that also know the hour or the forecast
/// temperature layer those on top.
pub fn ambient_for_date(date: chrono::NaiveDate) -> AmbientConditions {
    AmbientConditions {
        day_of_year: date.ordinal(),
        ..AmbientConditions::default()
    }
}
