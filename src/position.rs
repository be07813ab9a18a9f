//! # Heliocentric positions from mean elements
//!
//! [`PositionCalculator`] turns the secular elements of [`OrbitalElementsTable`] into Cartesian
//! heliocentric ecliptic coordinates (AU) for a body at a given Julian Date:
//!
//! 1. `T = (JD - 2451545.0) / 36525`
//! 2. every element evaluated as `element₀ + rate₁·T + rate₂·T²`
//! 3. mean anomaly `M = L - ϖ`, normalized to `[0, 2π)`
//! 4. eccentric anomaly `E` from Kepler's equation ([`KeplerSolver`])
//! 5. orbital-plane coordinates `x = a(cos E - e)`, `y = a·√(1-e²)·sin E`
//! 6. rotation into the ecliptic frame, following the configured [`RotationModel`]
//!
//! The Sun is the origin of the frame and is returned as `(0, 0, 0)`.
//!
//! The calculator is stateless apart from its shared, immutable element table: identical
//! inputs always yield identical outputs and nothing is cached between calls.
//!
//! ## Rotation models
//!
//! - [`RotationModel::Full`] applies `R_z(Ω)·R_x(i)·R_z(ω)` with `ω = ϖ - Ω`.
//! - [`RotationModel::InclinationOnly`] applies `R_x(i)` alone, which keeps the x axis on the
//!   periapsis direction instead of the vernal equinox.
//!
//! ## Non-convergence
//!
//! A Kepler solve that exhausts its budget does not fail the call: the returned
//! [`CelestialPosition`] carries `converged == false` and the solver logs a warning.

use std::sync::Arc;

use hifitime::Epoch;
use nalgebra::{Rotation3, Unit, Vector3};

use crate::config::{RotationModel, TransitConfig};
use crate::constants::{Au, JulianDate, Radian};
use crate::kepler::{principal_angle, KeplerSolver};
use crate::orbital_elements::{Body, OrbitalElements, OrbitalElementsTable};
use crate::time::{epoch_to_jd, julian_centuries};
use crate::transit_errors::TransitError;

/// Heliocentric ecliptic position of a body at an epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelestialPosition {
    pub body: Body,
    /// Julian Date of the position
    pub epoch: JulianDate,
    /// Coordinates in AU
    pub x: Au,
    pub y: Au,
    pub z: Au,
    /// Whether Kepler's equation converged for this position
    pub converged: bool,
    /// Kepler iterations spent (0 for the Sun)
    pub iterations: usize,
}

impl CelestialPosition {
    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Heliocentric distance in AU.
    pub fn distance(&self) -> Au {
        self.vector().norm()
    }

    /// Distance to another position in AU.
    pub fn distance_to(&self, other: &CelestialPosition) -> Au {
        (self.vector() - other.vector()).norm()
    }

    /// Heliocentric ecliptic longitude in `[0, 2π)`.
    pub fn ecliptic_longitude(&self) -> Radian {
        principal_angle(self.y.atan2(self.x))
    }

    /// Heliocentric ecliptic latitude in `[-π/2, π/2]`, 0 at the origin.
    pub fn ecliptic_latitude(&self) -> Radian {
        let r = self.distance();
        if r == 0.0 {
            return 0.0;
        }
        (self.z / r).clamp(-1.0, 1.0).asin()
    }
}

/// Rotation of a vector by `angle` about one of the frame axes.
fn rotmt(angle: Radian, axis: Unit<Vector3<f64>>) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&axis, angle)
}

/// Computes heliocentric positions of the tabulated bodies.
#[derive(Debug, Clone)]
pub struct PositionCalculator {
    table: Arc<OrbitalElementsTable>,
    solver: KeplerSolver,
    rotation_model: RotationModel,
}

impl PositionCalculator {
    pub fn new(table: Arc<OrbitalElementsTable>, config: &TransitConfig) -> Self {
        PositionCalculator {
            table,
            solver: config.kepler_solver(),
            rotation_model: config.rotation_model,
        }
    }

    /// Calculator over the embedded element table with default settings.
    pub fn builtin() -> Result<Self, TransitError> {
        Ok(Self::new(
            Arc::new(OrbitalElementsTable::builtin()?),
            &TransitConfig::default(),
        ))
    }

    pub fn table(&self) -> &OrbitalElementsTable {
        &self.table
    }

    pub fn rotation_model(&self) -> RotationModel {
        self.rotation_model
    }

    /// Heliocentric ecliptic position of `body` at Julian Date `jd`.
    ///
    /// Arguments
    /// ---------
    /// * `body`: the body to place.
    /// * `jd`: Julian Date.
    ///
    /// Return
    /// ------
    /// * the body position in AU; the Sun is always at the origin.
    ///
    /// Errors
    /// ------
    /// * [`TransitError::UnknownBody`] if the body has no elements in the table.
    /// * [`TransitError::InvalidEccentricity`] if the evaluated eccentricity leaves `[0, 1)`.
    /// * [`TransitError::NonFinite`] if `jd` or any intermediate value is not finite.
    pub fn position(&self, body: Body, jd: JulianDate) -> Result<CelestialPosition, TransitError> {
        if !jd.is_finite() {
            return Err(TransitError::NonFinite("julian date"));
        }

        if body == Body::Sun {
            return Ok(CelestialPosition {
                body,
                epoch: jd,
                x: 0.0,
                y: 0.0,
                z: 0.0,
                converged: true,
                iterations: 0,
            });
        }

        let t = julian_centuries(jd);
        let elements = self.table.elements_at(body, t)?;

        let ecc = elements.eccentricity;
        if !(0.0..1.0).contains(&ecc) {
            return Err(TransitError::InvalidEccentricity {
                body,
                eccentricity: ecc,
            });
        }

        let mean_anomaly = elements.mean_anomaly();
        let solution = self.solver.solve(mean_anomaly, ecc)?;
        if !solution.converged {
            tracing::warn!(
                %body,
                jd,
                iterations = solution.iterations,
                "position computed from a non-converged eccentric anomaly"
            );
        }

        let (sin_e, cos_e) = solution.eccentric_anomaly.sin_cos();
        let a = elements.semi_major_axis;
        let orbital_plane = Vector3::new(
            a * (cos_e - ecc),
            a * (1.0 - ecc * ecc).sqrt() * sin_e,
            0.0,
        );

        let ecliptic = self.to_ecliptic(&elements) * orbital_plane;

        if !ecliptic.iter().all(|c| c.is_finite()) {
            return Err(TransitError::NonFinite("heliocentric position"));
        }

        tracing::debug!(
            %body,
            jd,
            x = ecliptic.x,
            y = ecliptic.y,
            z = ecliptic.z,
            iterations = solution.iterations,
            "heliocentric position"
        );

        Ok(CelestialPosition {
            body,
            epoch: jd,
            x: ecliptic.x,
            y: ecliptic.y,
            z: ecliptic.z,
            converged: solution.converged,
            iterations: solution.iterations,
        })
    }

    /// Same as [`PositionCalculator::position`] with a body given by name.
    pub fn position_by_name(
        &self,
        body: &str,
        jd: JulianDate,
    ) -> Result<CelestialPosition, TransitError> {
        self.position(body.parse()?, jd)
    }

    /// Same as [`PositionCalculator::position`] at a calendar instant.
    pub fn position_at(
        &self,
        body: Body,
        epoch: &Epoch,
    ) -> Result<CelestialPosition, TransitError> {
        self.position(body, epoch_to_jd(epoch))
    }

    /// Distance between two bodies at `jd`, in AU.
    pub fn distance_between(&self, a: Body, b: Body, jd: JulianDate) -> Result<Au, TransitError> {
        Ok(self.position(a, jd)?.distance_to(&self.position(b, jd)?))
    }

    fn to_ecliptic(&self, elements: &OrbitalElements) -> Rotation3<f64> {
        let tilt = rotmt(elements.inclination, Vector3::x_axis());
        match self.rotation_model {
            RotationModel::InclinationOnly => tilt,
            RotationModel::Full => {
                rotmt(elements.ascending_node, Vector3::z_axis())
                    * tilt
                    * rotmt(elements.periapsis_argument(), Vector3::z_axis())
            }
        }
    }
}

#[cfg(test)]
mod position_test {
    use super::*;
    use crate::constants::J2000_JD;
    use approx::assert_relative_eq;

    fn calculator(model: RotationModel) -> PositionCalculator {
        PositionCalculator::new(
            Arc::new(OrbitalElementsTable::builtin().unwrap()),
            &TransitConfig::default().with_rotation_model(model),
        )
    }

    #[test]
    fn test_sun_is_origin() {
        let calc = calculator(RotationModel::Full);
        let sun = calc.position(Body::Sun, 2_400_000.0).unwrap();
        assert_eq!(sun.vector(), Vector3::zeros());
        assert_eq!(sun.ecliptic_latitude(), 0.0);
    }

    #[test]
    fn test_earth_at_j2000() {
        let calc = calculator(RotationModel::Full);
        let earth = calc.position(Body::Earth, J2000_JD).unwrap();
        assert!(earth.converged);

        // early January: Earth close to perihelion
        assert!((0.983..0.984).contains(&earth.distance()), "r = {}", earth.distance());

        let table_l = calc.table().elements_at(Body::Earth, 0.0).unwrap().mean_longitude;
        let diff = crate::kepler::angle_diff(earth.ecliptic_longitude(), table_l);
        assert!(diff.abs() < 0.5f64.to_radians(), "longitude offset {}°", diff.to_degrees());
        assert_relative_eq!(earth.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_venus_stays_on_its_orbit() {
        let calc = calculator(RotationModel::Full);
        for k in 0..50 {
            let jd = J2000_JD - 100_000.0 + k as f64 * 3_917.0;
            let venus = calc.position(Body::Venus, jd).unwrap();
            assert!((0.717..0.729).contains(&venus.distance()));
            assert!(venus.ecliptic_latitude().abs() <= 3.5f64.to_radians());
        }
    }

    #[test]
    fn test_rotation_preserves_radius() {
        let full = calculator(RotationModel::Full);
        let tilt = calculator(RotationModel::InclinationOnly);
        let jd = 2_364_409.5;
        for body in [Body::Venus, Body::Earth] {
            let a = full.position(body, jd).unwrap();
            let b = tilt.position(body, jd).unwrap();
            assert_relative_eq!(a.distance(), b.distance(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_inclination_only_keeps_periapsis_axis() {
        let calc = calculator(RotationModel::InclinationOnly);
        let earth = calc.position(Body::Earth, J2000_JD).unwrap();
        // M ≈ -2.47°, so the orbital-plane longitude is the true anomaly, just before periapsis
        let lon = crate::kepler::angle_diff(earth.ecliptic_longitude(), 0.0);
        assert!(lon < 0.0 && lon > -3f64.to_radians());
    }

    #[test]
    fn test_determinism() {
        let calc = calculator(RotationModel::Full);
        let a = calc.position(Body::Venus, 2_367_000.25).unwrap();
        let b = calc.position(Body::Venus, 2_367_000.25).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_body() {
        let calc = calculator(RotationModel::Full);
        assert_eq!(
            calc.position_by_name("mars", J2000_JD),
            Err(TransitError::UnknownBody("mars".into()))
        );
        assert_eq!(
            calc.position(Body::Earth, f64::NAN),
            Err(TransitError::NonFinite("julian date"))
        );
    }

    #[test]
    fn test_eccentricity_guard() {
        let csv = "body,element,value,rate,rate2
earth,semi_major_axis,1.0,0,0
earth,eccentricity,0.5,0.6,0
earth,inclination,0,0,0
earth,mean_longitude,0,0,0
earth,perihelion_longitude,0,0,0
earth,ascending_node,0,0,0
";
        let table = OrbitalElementsTable::from_reader(csv.as_bytes()).unwrap();
        let calc = PositionCalculator::new(Arc::new(table), &TransitConfig::default());
        // T = 1 century: e = 1.1
        let err = calc.position(Body::Earth, J2000_JD + 36_525.0).unwrap_err();
        assert!(matches!(err, TransitError::InvalidEccentricity { body: Body::Earth, .. }));
        assert!(calc.position(Body::Earth, J2000_JD).is_ok());
    }

    #[test]
    fn test_earth_venus_distance_at_1761_transit() {
        let calc = calculator(RotationModel::Full);
        let epoch = crate::time::parse_epoch("1761-06-06T05:20:00 UTC").unwrap();
        let jd = epoch_to_jd(&epoch);
        let d = calc.distance_between(Body::Earth, Body::Venus, jd).unwrap();
        // inferior conjunction: roughly 1.015 - 0.72 AU
        assert!((0.27..0.31).contains(&d), "d = {d}");
    }
}
