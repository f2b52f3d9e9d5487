//! Per-request rating context.

use dlr_core::units::{Amperes, Celsius, Kilovolts};
use dlr_core::{AmbientConditions, ConductorSpec};

use crate::cache::{RatingCache, RatingKey};
use crate::provider::{RatingResult, RatingUnavailable, ThermalRatingProvider};

/// One provider, one weather snapshot, one memo.
///
/// A context pins a single [`AmbientConditions`] for its whole lifetime,
/// which is what lets the cache key ignore every ambient field except the
/// two that sweeps vary. Callers that want different weather build a fresh
/// context; construction is cheap and the old memo is dropped with it.
pub struct RatingContext<'a> {
    provider: &'a dyn ThermalRatingProvider,
    ambient: &'a AmbientConditions,
    cache: RatingCache,
}

impl<'a> RatingContext<'a> {
    pub fn new(provider: &'a dyn ThermalRatingProvider, ambient: &'a AmbientConditions) -> Self {
        Self {
            provider,
            ambient,
            cache: RatingCache::new(),
        }
    }

    pub fn ambient(&self) -> &AmbientConditions {
        self.ambient
    }

    /// Memoized ampacity for a conductor at its operating limit.
    pub fn ampacity(
        &self,
        conductor: &ConductorSpec,
        max_operating_temp: Celsius,
    ) -> Result<Amperes, RatingUnavailable> {
        let key = RatingKey::new(
            &conductor.name,
            max_operating_temp,
            self.ambient.temperature,
            self.ambient.wind_speed,
        );
        self.cache.get_or_compute(key, || {
            self.provider.rate(conductor, self.ambient, max_operating_temp)
        })
    }

    /// Memoized ampacity converted to a three-phase MVA rating at `voltage`.
    pub fn rating_for(
        &self,
        conductor: &ConductorSpec,
        max_operating_temp: Celsius,
        voltage: Kilovolts,
    ) -> Result<RatingResult, RatingUnavailable> {
        let ampacity = self.ampacity(conductor, max_operating_temp)?;
        Ok(RatingResult::at_voltage(ampacity, voltage))
    }

    /// Distinct (conductor, limit, weather) tuples rated so far.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heat_balance::HeatBalanceProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl ThermalRatingProvider for CountingProvider {
        fn rate(
            &self,
            _conductor: &ConductorSpec,
            _ambient: &AmbientConditions,
            _max_operating_temp: Celsius,
        ) -> Result<Amperes, RatingUnavailable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Amperes(500.0))
        }
    }

    fn pigeon() -> ConductorSpec {
        ConductorSpec::new("3/0 ACSR 6/1 PIGEON", 0.560, 0.616, 0.251).unwrap()
    }

    fn linnet() -> ConductorSpec {
        ConductorSpec::new("336.4 ACSR 26/7 LINNET", 0.294, 0.322, 0.360).unwrap()
    }

    #[test]
    fn test_repeated_lookups_hit_the_memo() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let ambient = AmbientConditions::default();
        let ctx = RatingContext::new(&provider, &ambient);
        let conductor = pigeon();

        for _ in 0..10 {
            ctx.ampacity(&conductor, Celsius(75.0)).unwrap();
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        ctx.ampacity(&linnet(), Celsius(75.0)).unwrap();
        ctx.ampacity(&conductor, Celsius(100.0)).unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert_eq!(ctx.cached_entries(), 3);
    }

    #[test]
    fn test_rating_for_converts_to_mva() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let ambient = AmbientConditions::default();
        let ctx = RatingContext::new(&provider, &ambient);

        let result = ctx
            .rating_for(&pigeon(), Celsius(75.0), Kilovolts(138.0))
            .unwrap();
        assert_eq!(result.ampacity, Amperes(500.0));
        // sqrt(3) * 500 A * 138 kV ~= 119.5 MVA
        assert!((result.rating.value() - 119.5).abs() < 0.2);
    }

    #[test]
    fn test_contexts_share_nothing() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let warm = AmbientConditions::default().with_temperature(Celsius(40.0));
        let conductor = pigeon();

        {
            let ctx = RatingContext::new(&provider, &warm);
            ctx.ampacity(&conductor, Celsius(75.0)).unwrap();
        }
        {
            let ctx = RatingContext::new(&provider, &warm);
            ctx.ampacity(&conductor, Celsius(75.0)).unwrap();
        }

        // each context starts with an empty memo
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_physical_provider_through_context() {
        let provider = HeatBalanceProvider;
        let ambient = AmbientConditions::default();
        let ctx = RatingContext::new(&provider, &ambient);

        let rating = ctx
            .rating_for(&pigeon(), Celsius(75.0), Kilovolts(138.0))
            .unwrap();
        assert!(rating.ampacity.value() > 200.0 && rating.ampacity.value() < 450.0);
        assert!(rating.rating.value() > 45.0 && rating.rating.value() < 110.0);
    }
}
