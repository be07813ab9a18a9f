//! Engine configuration.
//!
//! [`TransitConfig`] gathers the numeric settings of the engine: Kepler solver stopping criteria,
//! the frame rotation applied to orbital-plane coordinates, the assumed measurement
//! uncertainties and the reference value of the astronomical unit. Every field has a default, so
//! a partial document deserialized with `serde` only overrides what it names.

use serde::Deserialize;

use crate::constants::{ArcSec, Kilometer, Meter, AU_KM};
use crate::kepler::{KeplerSolver, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};

/// Rotation from the orbital plane to the heliocentric ecliptic frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationModel {
    /// `R_z(Ω)·R_x(i)·R_z(ω)`: node, inclination and argument of periapsis.
    #[default]
    Full,
    /// Tilt by the inclination about the x axis only; node and periapsis orientation are ignored.
    InclinationOnly,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransitConfig {
    pub kepler_tolerance: f64,
    pub kepler_max_iterations: usize,
    pub rotation_model: RotationModel,
    /// Assumed timing uncertainty on contact instants (seconds).
    pub timing_uncertainty_sec: f64,
    /// Assumed angular measurement uncertainty (arcseconds).
    pub angular_uncertainty_arcsec: ArcSec,
    /// Assumed uncertainty on the baseline between two sites (meters).
    pub baseline_uncertainty_m: Meter,
    /// Accepted value of the astronomical unit used to score estimates.
    pub reference_au_km: Kilometer,
}

impl Default for TransitConfig {
    fn default() -> Self {
        TransitConfig {
            kepler_tolerance: DEFAULT_TOLERANCE,
            kepler_max_iterations: DEFAULT_MAX_ITERATIONS,
            rotation_model: RotationModel::Full,
            timing_uncertainty_sec: 120.0,
            angular_uncertainty_arcsec: 0.5,
            baseline_uncertainty_m: 1000.0,
            reference_au_km: AU_KM,
        }
    }
}

impl TransitConfig {
    pub fn with_rotation_model(mut self, rotation_model: RotationModel) -> Self {
        self.rotation_model = rotation_model;
        self
    }

    pub fn with_kepler(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.kepler_tolerance = tolerance;
        self.kepler_max_iterations = max_iterations;
        self
    }

    pub fn with_uncertainties(
        mut self,
        timing_sec: f64,
        angular_arcsec: ArcSec,
        baseline_m: Meter,
    ) -> Self {
        self.timing_uncertainty_sec = timing_sec;
        self.angular_uncertainty_arcsec = angular_arcsec;
        self.baseline_uncertainty_m = baseline_m;
        self
    }

    pub fn kepler_solver(&self) -> KeplerSolver {
        KeplerSolver::new(self.kepler_tolerance, self.kepler_max_iterations)
    }
}
