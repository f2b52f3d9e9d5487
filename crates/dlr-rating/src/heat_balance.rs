//! Steady-state conductor heat balance.
//!
//! The reference [`ThermalRatingProvider`] for overhead lines. At thermal
//! equilibrium the ohmic heating of a conductor held at its temperature
//! limit equals net dissipation, which pins the current:
//!
//! ```text
//! I = sqrt((q_c + q_r - q_s) / R(T_c))
//! ```
//!
//! where `q_c` is convective loss, `q_r` radiated loss, `q_s` solar gain
//! (all W/m) and `R(T_c)` the AC resistance at the conductor limit (Ω/m).
//! Correlations follow the IEEE 738 steady-state method
//! (doi:10.1109/IEEESTD.2013.6692858); inputs stay in the imperial units
//! utility datasheets use and are converted to SI internally.

use dlr_core::units::{Amperes, Celsius, Degrees, Radians};
use dlr_core::{AmbientConditions, Atmosphere, ConductorSpec};

use crate::provider::{RatingUnavailable, ThermalRatingProvider};

const METERS_PER_MILE: f64 = 1609.344;
const METERS_PER_INCH: f64 = 0.0254;

/// Overhead lines run broadly east-west in the planning base case; the
/// solar incidence term uses that fixed axis.
const LINE_AZIMUTH: Degrees = Degrees(90.0);

/// Total clear-sky solar flux (W/m²) as a polynomial in solar altitude
/// (degrees), lowest order first.
const CLEAR_SKY_FLUX: [f64; 7] = [
    -42.2391,
    63.8044,
    -1.9220,
    3.46921e-2,
    -3.61118e-4,
    1.94318e-6,
    -4.07608e-9,
];

/// Same polynomial fitted for an industrial (polluted) atmosphere.
const INDUSTRIAL_SKY_FLUX: [f64; 7] = [
    53.1821,
    14.2110,
    6.6138e-1,
    -3.1658e-2,
    5.4654e-4,
    -4.3446e-6,
    1.3236e-8,
];

/// IEEE 738 steady-state thermal rating model.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatBalanceProvider;

impl HeatBalanceProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ThermalRatingProvider for HeatBalanceProvider {
    fn rate(
        &self,
        conductor: &ConductorSpec,
        ambient: &AmbientConditions,
        max_operating_temp: Celsius,
    ) -> Result<Amperes, RatingUnavailable> {
        let tc = max_operating_temp.value();
        let ta = ambient.temperature.value();

        if !tc.is_finite() || !ta.is_finite() {
            return Err(RatingUnavailable::new("non-finite temperature input"));
        }
        if max_operating_temp < ConductorSpec::LOW_REF {
            return Err(RatingUnavailable::new(format!(
                "operating limit {:.1} °C is below the {:.0} °C resistance reference",
                tc,
                ConductorSpec::LOW_REF.value()
            )));
        }
        if ta >= tc {
            return Err(RatingUnavailable::new(format!(
                "ambient {:.1} °C at or above the {:.1} °C conductor limit",
                ta, tc
            )));
        }
        if ambient.wind_speed.value() < 0.0 || !ambient.wind_speed.value().is_finite() {
            return Err(RatingUnavailable::new("wind speed must be non-negative"));
        }

        let diameter_m = conductor.diameter() * METERS_PER_INCH;
        let resistance_per_m = conductor.resistance_at(max_operating_temp) / METERS_PER_MILE;

        let q_convective = convection_loss(diameter_m, tc, ta, ambient);
        let q_radiated = radiation_loss(diameter_m, tc, ta, ambient.emissivity);
        let q_solar = solar_gain(diameter_m, ambient);

        let radicand = (q_convective + q_radiated - q_solar) / resistance_per_m;
        if !radicand.is_finite() || radicand <= 0.0 {
            return Err(RatingUnavailable::new(
                "heat gain exceeds dissipation at the conductor temperature limit",
            ));
        }

        Ok(Amperes(radicand.sqrt()))
    }
}

/// Convective heat loss in W/m.
///
/// Takes the larger of the natural and forced correlations; at low wind
/// speeds forced convection under-predicts and buoyancy dominates.
fn convection_loss(diameter_m: f64, tc: f64, ta: f64, ambient: &AmbientConditions) -> f64 {
    let t_film = (tc + ta) / 2.0;
    let delta_t = tc - ta;

    let viscosity = 1.458e-6 * (t_film + 273.0).powf(1.5) / (t_film + 383.4);
    let elevation_m = ambient.elevation.to_meters();
    let density = (1.293 - 1.525e-4 * elevation_m + 6.379e-9 * elevation_m.powi(2))
        / (1.0 + 0.00367 * t_film);
    let conductivity = 2.424e-2 + 7.477e-5 * t_film - 4.407e-9 * t_film.powi(2);

    let natural = 3.645 * density.sqrt() * diameter_m.powf(0.75) * delta_t.powf(1.25);

    let wind_mps = ambient.wind_speed.to_meters_per_second();
    if wind_mps <= 0.0 {
        return natural;
    }

    let reynolds = diameter_m * density * wind_mps / viscosity;
    let phi = ambient.wind_angle.to_radians();
    let angle_factor =
        1.194 - phi.cos() + 0.194 * (phi * 2.0).cos() + 0.368 * (phi * 2.0).sin();

    // low- and high-Reynolds fits; the crossover sits near Re ~ 1000
    let forced_low = (1.01 + 1.35 * reynolds.powf(0.52)) * conductivity * delta_t;
    let forced_high = 0.754 * reynolds.powf(0.6) * conductivity * delta_t;
    let forced = angle_factor * forced_low.max(forced_high);

    forced.max(natural)
}

/// Radiated heat loss in W/m.
fn radiation_loss(diameter_m: f64, tc: f64, ta: f64, emissivity: f64) -> f64 {
    17.8 * diameter_m
        * emissivity
        * (((tc + 273.0) / 100.0).powi(4) - ((ta + 273.0) / 100.0).powi(4))
}

/// Solar heat gain in W/m. Zero when the sun is below the horizon.
fn solar_gain(diameter_m: f64, ambient: &AmbientConditions) -> f64 {
    let (altitude, azimuth) = solar_position(ambient.latitude, ambient.day_of_year, ambient.hour_of_day);
    if altitude.value() <= 0.0 {
        return 0.0;
    }

    let flux = sky_flux(ambient.atmosphere, altitude.to_degrees().value());
    let elevation_m = ambient.elevation.to_meters();
    let altitude_correction = 1.0 + 1.148e-4 * elevation_m - 1.108e-8 * elevation_m.powi(2);
    let corrected_flux = (flux * altitude_correction).max(0.0);

    let incidence = (altitude.cos() * (azimuth - LINE_AZIMUTH.to_radians()).cos()).acos();
    ambient.absorptivity * corrected_flux * incidence.sin() * diameter_m
}

/// Solar altitude and azimuth for a northern-hemisphere site.
///
/// Declination follows the 23.4583°-amplitude sine fit over the year; the
/// azimuth quadrant is resolved from the hour angle sign.
fn solar_position(latitude: Degrees, day_of_year: u32, hour_of_day: f64) -> (Radians, Radians) {
    let declination: Radians =
        Degrees(23.4583 * ((284.0 + day_of_year as f64) / 365.0 * 360.0).to_radians().sin())
            .to_radians();
    let hour_angle = Degrees(15.0 * (hour_of_day - 12.0)).to_radians();
    let lat = latitude.to_radians();

    let sin_altitude =
        lat.cos() * declination.cos() * hour_angle.cos() + lat.sin() * declination.sin();
    let altitude = Radians(sin_altitude.clamp(-1.0, 1.0).asin());

    let chi =
        hour_angle.sin() / (lat.sin() * hour_angle.cos() - lat.cos() * declination.tan());
    let quadrant = if hour_angle.value() < 0.0 {
        if chi >= 0.0 {
            0.0
        } else {
            180.0
        }
    } else if chi >= 0.0 {
        180.0
    } else {
        360.0
    };
    let azimuth = Degrees(quadrant + chi.atan().to_degrees()).to_radians();

    (altitude, azimuth)
}

/// Total solar flux (W/m²) for an atmosphere at a solar altitude in degrees.
fn sky_flux(atmosphere: Atmosphere, altitude_deg: f64) -> f64 {
    let coefficients = match atmosphere {
        Atmosphere::Clear => &CLEAR_SKY_FLUX,
        Atmosphere::Industrial => &INDUSTRIAL_SKY_FLUX,
    };
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * altitude_deg + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlr_core::units::{Feet, FeetPerSecond};

    fn drake() -> ConductorSpec {
        // 795 kcmil 26/7 ACSR, the conductor of the published worked example
        ConductorSpec::new("795 ACSR 26/7 DRAKE", 0.1170, 0.1277, 0.554).unwrap()
    }

    fn pigeon() -> ConductorSpec {
        ConductorSpec::new("3/0 ACSR 6/1 PIGEON", 0.560, 0.616, 0.251).unwrap()
    }

    fn book_conditions() -> AmbientConditions {
        AmbientConditions {
            temperature: Celsius(40.0),
            emissivity: 0.5,
            absorptivity: 0.5,
            elevation: Feet(0.0),
            ..AmbientConditions::default()
        }
    }

    #[test]
    fn test_drake_rating_matches_published_band() {
        // 40 °C ambient, 100 °C limit, 2 ft/s perpendicular wind, full sun:
        // the worked example lands near 1000 A
        let provider = HeatBalanceProvider::new();
        let amps = provider
            .rate(&drake(), &book_conditions(), Celsius(100.0))
            .unwrap();
        assert!(
            amps.value() > 900.0 && amps.value() < 1100.0,
            "got {}",
            amps
        );
    }

    #[test]
    fn test_small_conductor_rates_lower() {
        let provider = HeatBalanceProvider::new();
        let ambient = AmbientConditions::default();
        let small = provider.rate(&pigeon(), &ambient, Celsius(75.0)).unwrap();
        let large = provider.rate(&drake(), &ambient, Celsius(75.0)).unwrap();
        assert!(small < large);
        // 3/0 ACSR books at roughly 300 A
        assert!(small.value() > 200.0 && small.value() < 450.0, "got {}", small);
    }

    #[test]
    fn test_ampacity_decreases_with_ambient_temperature() {
        let provider = HeatBalanceProvider::new();
        let mut previous = f64::INFINITY;
        for ta in [25.0, 30.0, 35.0, 40.0, 45.0] {
            let ambient = AmbientConditions::default().with_temperature(Celsius(ta));
            let amps = provider.rate(&pigeon(), &ambient, Celsius(75.0)).unwrap();
            assert!(amps.value() < previous, "not monotone at {} °C", ta);
            previous = amps.value();
        }
    }

    #[test]
    fn test_ampacity_increases_with_wind() {
        let provider = HeatBalanceProvider::new();
        let calm = AmbientConditions::default().with_wind_speed(FeetPerSecond(0.5));
        let breezy = AmbientConditions::default().with_wind_speed(FeetPerSecond(5.0));
        let low = provider.rate(&pigeon(), &calm, Celsius(75.0)).unwrap();
        let high = provider.rate(&pigeon(), &breezy, Celsius(75.0)).unwrap();
        assert!(high > low);
    }

    #[test]
    fn test_ampacity_increases_with_operating_limit() {
        let provider = HeatBalanceProvider::new();
        let ambient = AmbientConditions::default();
        let cool = provider.rate(&pigeon(), &ambient, Celsius(50.0)).unwrap();
        let hot = provider.rate(&pigeon(), &ambient, Celsius(100.0)).unwrap();
        assert!(hot > cool);
    }

    #[test]
    fn test_parallel_wind_cools_less_than_perpendicular() {
        let provider = HeatBalanceProvider::new();
        let perpendicular = AmbientConditions::default();
        let parallel = AmbientConditions::default().with_wind_angle(Degrees(0.0));
        let perp = provider.rate(&pigeon(), &perpendicular, Celsius(75.0)).unwrap();
        let para = provider.rate(&pigeon(), &parallel, Celsius(75.0)).unwrap();
        assert!(para < perp);
    }

    #[test]
    fn test_night_rating_exceeds_noon_rating() {
        let provider = HeatBalanceProvider::new();
        let noon = AmbientConditions::default();
        let midnight = AmbientConditions {
            hour_of_day: 0.0,
            ..AmbientConditions::default()
        };
        let day = provider.rate(&pigeon(), &noon, Celsius(75.0)).unwrap();
        let night = provider.rate(&pigeon(), &midnight, Celsius(75.0)).unwrap();
        assert!(night > day);
    }

    #[test]
    fn test_industrial_sky_attenuates_sun() {
        let provider = HeatBalanceProvider::new();
        let clear = AmbientConditions::default();
        let hazy = AmbientConditions {
            atmosphere: Atmosphere::Industrial,
            ..AmbientConditions::default()
        };
        let under_clear = provider.rate(&pigeon(), &clear, Celsius(75.0)).unwrap();
        let under_haze = provider.rate(&pigeon(), &hazy, Celsius(75.0)).unwrap();
        assert!(under_haze >= under_clear);
    }

    #[test]
    fn test_zero_wind_uses_natural_convection() {
        let provider = HeatBalanceProvider::new();
        let still = AmbientConditions::default().with_wind_speed(FeetPerSecond(0.0));
        let amps = provider.rate(&pigeon(), &still, Celsius(75.0)).unwrap();
        assert!(amps.value() > 0.0);
    }

    #[test]
    fn test_no_headroom_is_unavailable() {
        let provider = HeatBalanceProvider::new();
        let scorching = AmbientConditions::default().with_temperature(Celsius(80.0));
        let err = provider.rate(&pigeon(), &scorching, Celsius(75.0)).unwrap_err();
        assert!(err.reason.contains("at or above"));
    }

    #[test]
    fn test_limit_below_reference_is_unavailable() {
        let provider = HeatBalanceProvider::new();
        let ambient = AmbientConditions::default().with_temperature(Celsius(10.0));
        let err = provider.rate(&pigeon(), &ambient, Celsius(20.0)).unwrap_err();
        assert!(err.reason.contains("resistance reference"));
    }

    #[test]
    fn test_sun_dominated_sliver_is_unavailable() {
        // 0.1 °C of headroom cannot shed the absorbed noon sun
        let provider = HeatBalanceProvider::new();
        let ambient = AmbientConditions::default().with_temperature(Celsius(74.9));
        let err = provider.rate(&pigeon(), &ambient, Celsius(75.0)).unwrap_err();
        assert!(err.reason.contains("heat gain exceeds dissipation"));
    }

    #[test]
    fn test_negative_wind_rejected() {
        let provider = HeatBalanceProvider::new();
        let ambient = AmbientConditions::default().with_wind_speed(FeetPerSecond(-1.0));
        assert!(provider.rate(&pigeon(), &ambient, Celsius(75.0)).is_err());
    }

    #[test]
    fn test_solar_noon_geometry() {
        // June noon at 27° N: sun nearly overhead, azimuth due south
        let (altitude, azimuth) = solar_position(Degrees(27.0), 163, 12.0);
        let altitude_deg = altitude.to_degrees().value();
        let azimuth_deg = azimuth.to_degrees().value();
        assert!(altitude_deg > 80.0 && altitude_deg <= 90.0, "altitude {}", altitude_deg);
        assert!((azimuth_deg - 180.0).abs() < 1.0, "azimuth {}", azimuth_deg);
    }

    #[test]
    fn test_sun_below_horizon_has_no_gain() {
        let midnight = AmbientConditions {
            hour_of_day: 0.0,
            ..AmbientConditions::default()
        };
        assert_eq!(solar_gain(0.0127, &midnight), 0.0);
    }

    #[test]
    fn test_sky_flux_plausible_at_high_sun() {
        let clear = sky_flux(Atmosphere::Clear, 86.0);
        let industrial = sky_flux(Atmosphere::Industrial, 86.0);
        assert!(clear > 950.0 && clear < 1150.0, "clear {}", clear);
        assert!(industrial < clear);
    }
}
