//! # Kepler's equation
//!
//! Newton–Raphson solver for the elliptic Kepler equation
//!
//! ```text
//! f(E) = E - e·sin(E) - M = 0,     f'(E) = 1 - e·cos(E)
//! ```
//!
//! giving the eccentric anomaly `E` from the mean anomaly `M` and the eccentricity `e`.
//!
//! ## Convergence
//!
//! Iteration starts from `E₀ = M` and stops as soon as the Newton step `|ΔE|` falls below the
//! tolerance. Exhausting the iteration budget is **not** an error: the best estimate is returned
//! with [`KeplerSolution::converged`] set to `false`, and the caller decides whether this deserves
//! more than a warning.
//!
//! For `0 ≤ e < 1` the derivative `1 - e·cos(E)` is bounded below by `1 - e > 0`, but for `e`
//! very close to 1 it can become numerically tiny. When `|f'(E)|` drops under
//! [`DERIVATIVE_FLOOR`], the step is replaced by a damped step of fixed sign. Every iterate is
//! clamped into `[M - e, M + e]`, which always contains the root, and an exhausted budget returns
//! the iterate with the smallest residual.
//!
//! ## See also
//! ------------
//! * [`crate::position::PositionCalculator`] – main consumer of the solver.

use crate::constants::{Radian, DPI};
use crate::transit_errors::TransitError;
use std::f64::consts::PI;

/// Default stopping tolerance on the Newton step (radians).
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default iteration budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Below this value the Newton derivative is considered degenerate.
pub const DERIVATIVE_FLOOR: f64 = 1e-12;

/// Outcome of a Kepler equation solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly `E` (radians), best available estimate.
    pub eccentric_anomaly: Radian,
    /// `true` when the stopping criterion was met before the budget ran out.
    pub converged: bool,
    /// Number of Newton iterations performed.
    pub iterations: usize,
}

impl KeplerSolution {
    /// Residual `|E - e·sin(E) - M|` of this solution.
    pub fn residual(&self, mean_anomaly: Radian, eccentricity: f64) -> f64 {
        let e_anom = self.eccentric_anomaly;
        (e_anom - eccentricity * e_anom.sin() - mean_anomaly).abs()
    }
}

/// Kepler equation solver carrying its stopping criteria.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolver {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for KeplerSolver {
    fn default() -> Self {
        KeplerSolver {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl KeplerSolver {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        KeplerSolver {
            tolerance,
            max_iterations,
        }
    }

    /// Solve Kepler's equation with this solver's tolerance and budget.
    ///
    /// See [`solve_kepler`].
    pub fn solve(
        &self,
        mean_anomaly: Radian,
        eccentricity: f64,
    ) -> Result<KeplerSolution, TransitError> {
        solve_kepler(
            mean_anomaly,
            eccentricity,
            self.tolerance,
            self.max_iterations,
        )
    }
}

/// Solve `E - e·sin(E) = M` for the eccentric anomaly with Newton–Raphson.
///
/// Arguments
/// ---------
/// * `mean_anomaly`: mean anomaly `M` in radians (any value, not necessarily normalized).
/// * `eccentricity`: orbital eccentricity, must satisfy `0 ≤ e < 1`.
/// * `tolerance`: stopping threshold on `|ΔE|`.
/// * `max_iterations`: iteration budget.
///
/// Return
/// ------
/// * a [`KeplerSolution`]; `converged == false` when the budget was exhausted.
///
/// Errors
/// ------
/// * [`TransitError::InputValidation`] if the eccentricity is outside `[0, 1)`.
/// * [`TransitError::NonFinite`] if `M` is not finite or the iterate diverges to NaN.
pub fn solve_kepler(
    mean_anomaly: Radian,
    eccentricity: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<KeplerSolution, TransitError> {
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(TransitError::InputValidation(format!(
            "eccentricity {eccentricity} is outside [0, 1)"
        )));
    }
    if !mean_anomaly.is_finite() {
        return Err(TransitError::NonFinite("mean anomaly"));
    }

    // E - M = e·sin(E) keeps the root within [M - e, M + e]
    let lower = mean_anomaly - eccentricity;
    let upper = mean_anomaly + eccentricity;
    let residual = |e_anom: f64| (e_anom - eccentricity * e_anom.sin() - mean_anomaly).abs();

    let mut e_anom = mean_anomaly;
    let mut best = (e_anom, residual(e_anom));
    let mut converged = false;
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;

        let fun = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        let funp = 1.0 - eccentricity * e_anom.cos();

        let delta = if funp.abs() < DERIVATIVE_FLOOR {
            // degenerate slope: damped step toward the root
            -fun.signum() * fun.abs().min(0.5)
        } else {
            -fun / funp
        };

        let next = (e_anom + delta).clamp(lower, upper);
        if !next.is_finite() {
            return Err(TransitError::NonFinite("eccentric anomaly"));
        }
        let step = next - e_anom;
        e_anom = next;

        let res = residual(e_anom);
        if res < best.1 {
            best = (e_anom, res);
        }
        if step.abs() < tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        e_anom = best.0;
        tracing::warn!(
            mean_anomaly,
            eccentricity,
            iterations,
            "Kepler equation did not converge, returning best estimate"
        );
    }

    Ok(KeplerSolution {
        eccentric_anomaly: e_anom,
        converged,
        iterations,
    })
}

/// True anomaly from the eccentric anomaly, in `(-π, π]`.
pub fn true_anomaly(eccentric_anomaly: Radian, eccentricity: f64) -> Radian {
    let (sin_e, cos_e) = eccentric_anomaly.sin_cos();
    let beta = (1.0 - eccentricity * eccentricity).sqrt();
    (beta * sin_e).atan2(cos_e - eccentricity)
}

/// Principal value of an angle in radians, in `[0, 2π)`.
pub fn principal_angle(a: f64) -> f64 {
    let r = a.rem_euclid(DPI);
    // rem_euclid may round up to exactly 2π for tiny negative inputs
    if r >= DPI {
        0.0
    } else {
        r
    }
}

/// Principal difference between two angles, in `[-π, π]`.
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let a = principal_angle(a);
    let b = principal_angle(b);

    let mut diff = a - b;

    if diff > PI {
        diff -= DPI;
    } else if diff < -PI {
        diff += DPI;
    }

    diff
}
