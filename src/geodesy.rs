//! # Terrestrial sites and great-circle baselines
//!
//! - [`GeodeticLocation`]: validated latitude/longitude (degrees) with an informational elevation.
//! - [`distance`]: haversine great-circle distance on a sphere of radius
//!   [`EARTH_MEAN_RADIUS_KM`].
//!
//! The spherical model ignores Earth oblateness and elevation; over intercontinental baselines
//! the error stays well under 0.5 %.
//!
//! ```text
//! h = sin²(Δφ/2) + cos φ₁ · cos φ₂ · sin²(Δλ/2)
//! c = 2 · atan2(√h, √(1 - h))
//! d = R · c
//! ```
//!
//! `h` is clamped into `[0, 1]` before the square roots, so rounding on antipodal or coincident
//! points cannot produce NaN.

use crate::constants::{Degree, Kilometer, Meter, Radian, EARTH_MEAN_RADIUS_KM};
use crate::transit_errors::TransitError;

/// Point on the Earth's surface.
///
/// Units
/// -----
/// * `latitude`: degrees in `[-90, 90]`, north positive.
/// * `longitude`: degrees in `[-180, 180]`, east positive.
/// * `elevation`: meters above sea level, informational only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticLocation {
    latitude: Degree,
    longitude: Degree,
    elevation: Meter,
}

impl GeodeticLocation {
    /// Build a validated location.
    ///
    /// Errors
    /// ------
    /// * [`TransitError::InputValidation`] if a coordinate is NaN or out of range.
    pub fn new(
        latitude: Degree,
        longitude: Degree,
        elevation: Meter,
    ) -> Result<Self, TransitError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(TransitError::InputValidation(format!(
                "latitude {latitude}° is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(TransitError::InputValidation(format!(
                "longitude {longitude}° is outside [-180, 180]"
            )));
        }
        if !elevation.is_finite() {
            return Err(TransitError::InputValidation(format!(
                "elevation {elevation} m is not finite"
            )));
        }

        Ok(GeodeticLocation {
            latitude,
            longitude,
            elevation,
        })
    }

    pub fn latitude(&self) -> Degree {
        self.latitude
    }

    pub fn longitude(&self) -> Degree {
        self.longitude
    }

    pub fn elevation(&self) -> Meter {
        self.elevation
    }
}

/// Central angle between two locations (radians), haversine formulation.
pub fn central_angle(a: &GeodeticLocation, b: &GeodeticLocation) -> Radian {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let dphi = phi2 - phi1;
    let dlambda = (b.longitude - a.longitude).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance between two locations, in kilometers.
pub fn distance(a: &GeodeticLocation, b: &GeodeticLocation) -> Kilometer {
    EARTH_MEAN_RADIUS_KM * central_angle(a, b)
}

#[cfg(test)]
mod geodesy_test {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn loc(lat: f64, lon: f64) -> GeodeticLocation {
        GeodeticLocation::new(lat, lon, 0.0).unwrap()
    }

    #[test]
    fn test_stockholm_paris() {
        let stockholm = loc(59.3293, 18.0686);
        let paris = loc(48.8566, 2.3522);
        let d = distance(&stockholm, &paris);
        assert!((d - 1546.0).abs() < 20.0, "d = {d}");
    }

    #[test]
    fn test_identity_and_symmetry() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            let p = loc(rng.random_range(-90.0..=90.0), rng.random_range(-180.0..=180.0));
            let q = loc(rng.random_range(-90.0..=90.0), rng.random_range(-180.0..=180.0));
            assert_eq!(distance(&p, &p), 0.0);
            assert_relative_eq!(distance(&p, &q), distance(&q, &p), epsilon = 1e-9);
            assert!(distance(&p, &q) <= std::f64::consts::PI * EARTH_MEAN_RADIUS_KM + 1e-9);
        }
    }

    #[test]
    fn test_antipodes() {
        let d = distance(&loc(0.0, 0.0), &loc(0.0, 180.0));
        assert_relative_eq!(d, std::f64::consts::PI * EARTH_MEAN_RADIUS_KM, epsilon = 1e-6);

        let d = distance(&loc(90.0, 0.0), &loc(-90.0, 0.0));
        assert_relative_eq!(d, std::f64::consts::PI * EARTH_MEAN_RADIUS_KM, epsilon = 1e-6);
    }

    #[test]
    fn test_quarter_meridian() {
        let d = distance(&loc(0.0, 10.0), &loc(90.0, 10.0));
        assert_relative_eq!(d, std::f64::consts::FRAC_PI_2 * EARTH_MEAN_RADIUS_KM, epsilon = 1e-6);
    }

    #[test]
    fn test_dateline_crossing() {
        let d = distance(&loc(0.0, 179.5), &loc(0.0, -179.5));
        assert_relative_eq!(d, 1f64.to_radians() * EARTH_MEAN_RADIUS_KM, epsilon = 1e-6);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            GeodeticLocation::new(91.0, 0.0, 0.0),
            Err(TransitError::InputValidation(_))
        ));
        assert!(matches!(
            GeodeticLocation::new(0.0, -180.5, 0.0),
            Err(TransitError::InputValidation(_))
        ));
        assert!(matches!(
            GeodeticLocation::new(f64::NAN, 0.0, 0.0),
            Err(TransitError::InputValidation(_))
        ));
        assert!(matches!(
            GeodeticLocation::new(0.0, 0.0, f64::INFINITY),
            Err(TransitError::InputValidation(_))
        ));
        assert!(GeodeticLocation::new(-90.0, 180.0, 4_200.0).is_ok());
    }
}
