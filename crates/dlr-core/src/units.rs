//! Compile-time unit safety for thermal screening quantities.
//!
//! Prevents mixing incompatible units like MW and MVA, or ft/s and °C.
//!
//! # Design Philosophy
//!
//! Thermal screening mixes quantities from two worlds: electrical (active
//! power in MW, apparent power in MVA, voltage in kV, current in amperes)
//! and meteorological (temperature in °C, wind speed in ft/s, elevation in
//! feet). Using raw `f64` values throughout makes it easy to hand a wind
//! speed to a function expecting a temperature, or to divide MW by amperes
//! and call the result a loading. This module provides newtype wrappers
//! that catch such errors at compile time.
//!
//! # Zero Runtime Overhead
//!
//! All types use `#[repr(transparent)]` ensuring they have the same memory
//! layout as `f64`. The compiler optimizes away all wrapper overhead.
//!
//! # Usage
//!
//! ```
//! use dlr_core::units::{Amperes, Kilovolts, Megawatts};
//!
//! let ampacity = Amperes(774.0);
//! let rating = ampacity.three_phase_mva(Kilovolts(138.0));
//!
//! let flow = Megawatts(92.5);
//! let loading_pct = flow.value().abs() / rating.value() * 100.0;
//! # let _ = loading_pct;
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Macro to implement common arithmetic operations for unit types
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Mul<$type> for f64 {
            type Output = $type;
            fn mul(self, rhs: $type) -> Self::Output {
                <$type>::new(self * rhs.0)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Absolute value
            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Check if value is finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Check if value is NaN
            #[inline]
            pub fn is_nan(self) -> bool {
                self.0.is_nan()
            }

            /// Minimum of two values
            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            /// Maximum of two values
            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            /// Clamp value to range
            #[inline]
            pub fn clamp(self, min: Self, max: Self) -> Self {
                Self(self.0.clamp(min.0, max.0))
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

// =============================================================================
// Power Units
// =============================================================================

/// Active power in megawatts (MW)
///
/// Branch flows are carried as signed active power; the sign encodes flow
/// direction relative to the from-bus.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW");

/// Apparent power in megavolt-amperes (MVA)
///
/// Thermal ratings are expressed as apparent power so they can be compared
/// directly against branch flows regardless of power factor.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MegavoltAmperes(pub f64);

impl_unit_ops!(MegavoltAmperes, "MVA");

// =============================================================================
// Voltage and Current Units
// =============================================================================

/// Voltage in kilovolts (kV)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilovolts(pub f64);

impl_unit_ops!(Kilovolts, "kV");

/// Current in amperes (A)
///
/// Conductor ampacities come out of the heat balance in amperes per phase.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Amperes(pub f64);

impl_unit_ops!(Amperes, "A");

impl Amperes {
    /// Convert a per-phase current limit into a three-phase apparent power
    /// rating at the given line voltage: S = √3 × I × V / 1000.
    #[inline]
    pub fn three_phase_mva(self, voltage: Kilovolts) -> MegavoltAmperes {
        MegavoltAmperes(3.0_f64.sqrt() * self.0 * voltage.0 / 1000.0)
    }
}

// =============================================================================
// Thermal and Weather Units
// =============================================================================

/// Temperature in degrees Celsius (°C)
///
/// Used for both ambient air temperature and conductor operating
/// temperature limits.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(pub f64);

impl_unit_ops!(Celsius, "°C");

/// Wind speed in feet per second (ft/s)
///
/// Utility weather feeds and conductor datasheets use imperial wind speeds;
/// conversion to SI happens inside the heat-balance model.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FeetPerSecond(pub f64);

impl_unit_ops!(FeetPerSecond, "ft/s");

impl FeetPerSecond {
    /// Convert to metres per second
    #[inline]
    pub fn to_meters_per_second(self) -> f64 {
        self.0 * 0.3048
    }
}

/// Elevation in feet above sea level (ft)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Feet(pub f64);

impl_unit_ops!(Feet, "ft");

impl Feet {
    /// Convert to metres
    #[inline]
    pub fn to_meters(self) -> f64 {
        self.0 * 0.3048
    }
}

// =============================================================================
// Ratio Units
// =============================================================================

/// A loading ratio expressed in percent (%)
///
/// 100 % means the branch flow exactly matches its thermal rating.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Percent(pub f64);

impl_unit_ops!(Percent, "%");

// =============================================================================
// Angle Units
// =============================================================================

/// Angle in radians
///
/// The natural unit for mathematical operations (sin, cos, etc.).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Radians, "rad");

/// Angle in degrees
///
/// More human-readable for display and input/output. Wind attack angles,
/// latitudes, and solar geometry are specified in degrees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees, "°");

impl Radians {
    /// Convert to degrees
    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0 * 180.0 / std::f64::consts::PI)
    }

    /// Sine of the angle
    #[inline]
    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    /// Cosine of the angle
    #[inline]
    pub fn cos(self) -> f64 {
        self.0.cos()
    }

    /// Tangent of the angle
    #[inline]
    pub fn tan(self) -> f64 {
        self.0.tan()
    }

    /// Zero radians
    pub const ZERO: Self = Self(0.0);

    /// Pi radians (180°)
    pub const PI: Self = Self(std::f64::consts::PI);
}

impl Degrees {
    /// Convert to radians
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0 * std::f64::consts::PI / 180.0)
    }

    /// Zero degrees
    pub const ZERO: Self = Self(0.0);
}

// =============================================================================
// Tests
// =============================================================================
