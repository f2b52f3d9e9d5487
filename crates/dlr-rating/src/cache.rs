//! Request-scoped rating memoization.
//!
//! Screening a batch of outages re-rates the same conductors at the same
//! weather hundreds of times. Provider purity makes those calls
//! memoizable; this cache does exactly that, scoped to one request so a
//! weather change can never serve stale numbers.

use std::sync::Mutex;

use hashbrown::HashMap;

use dlr_core::units::{Amperes, Celsius, FeetPerSecond};

use crate::provider::RatingUnavailable;

/// Cache key for one rating computation.
///
/// The key carries the inputs that vary across lines within a single
/// request: conductor identity, its temperature limit, and the two weather
/// scalars that sweeps perturb. The remaining ambient fields are fixed for
/// the lifetime of the owning request. Float components are keyed by bit
/// pattern, so -0.0 and 0.0 are distinct keys; both map to the same pure
/// result, which costs at most one extra computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RatingKey {
    conductor: String,
    max_operating_temp: u64,
    ambient_temp: u64,
    wind_speed: u64,
}

impl RatingKey {
    pub fn new(
        conductor: &str,
        max_operating_temp: Celsius,
        ambient_temp: Celsius,
        wind_speed: FeetPerSecond,
    ) -> Self {
        Self {
            conductor: conductor.to_string(),
            max_operating_temp: max_operating_temp.value().to_bits(),
            ambient_temp: ambient_temp.value().to_bits(),
            wind_speed: wind_speed.value().to_bits(),
        }
    }
}

/// Thread-safe memo of rating outcomes, including unavailable ones.
///
/// An unavailable rating is cached like any other result: retrying the
/// same inputs cannot succeed, so there is nothing to gain from re-asking
/// the provider, and the reason string must stay stable within a request.
#[derive(Debug, Default)]
pub struct RatingCache {
    entries: Mutex<HashMap<RatingKey, Result<Amperes, RatingUnavailable>>>,
}

impl RatingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached outcome for `key`, computing and storing it on a
    /// miss.
    ///
    /// The provider call runs with the lock released, so a slow model never
    /// serializes unrelated lookups. Two threads racing on the same fresh
    /// key may both compute; purity guarantees they agree, and the first
    /// insert wins.
    pub fn get_or_compute<F>(&self, key: RatingKey, compute: F) -> Result<Amperes, RatingUnavailable>
    where
        F: FnOnce() -> Result<Amperes, RatingUnavailable>,
    {
        if let Some(hit) = self.lock().get(&key).cloned() {
            return hit;
        }

        let result = compute();
        self.lock().entry(key).or_insert(result).clone()
    }

    /// Number of distinct keys resolved so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RatingKey, Result<Amperes, RatingUnavailable>>> {
        // a poisoned memo is still a valid memo
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
