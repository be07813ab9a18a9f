//! # Constants and type definitions for the transit engine
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the crate.
//!
//! ## Overview
//!
//! - Astronomical and geodetic constants (AU, mean Earth radius, J2000.0)
//! - Unit conversions (degrees ↔ radians, arcseconds ↔ radians, days ↔ seconds)
//! - Type aliases carrying the unit of a value in its name
//!
//! These definitions are shared by the orbital model, the geodesy helpers and the
//! parallax engine.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of days in a Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU_KM: f64 = 149_597_870.7;

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00:00 TT)
pub const J2000_JD: f64 = 2_451_545.0;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Mean Earth radius in kilometers (IUGG arithmetic mean radius R1)
pub const EARTH_MEAN_RADIUS_KM: f64 = 6_371.0088;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Distance in astronomical units
pub type Au = f64;
/// Julian Date (days)
pub type JulianDate = f64;
/// Identifier of an observation site inside a historical roster
pub type SiteId = String;

#[cfg(test)]
mod constants_test {
    use super::*;

    #[test]
    fn test_angle_conversions() {
        assert!((180.0 * RADEG - std::f64::consts::PI).abs() < 1e-15);
        assert!((3600.0 * RADSEC - RADEG).abs() < 1e-15);
        assert_eq!(DPI, std::f64::consts::TAU);
    }
}
