//! # Parallax triangulation of the astronomical unit
//!
//! [`ParallaxEngine`] estimates the Earth–Sun distance from two terrestrial observation sites
//! and an instant, in the manner of the eighteenth-century transit expeditions:
//!
//! 1. the **baseline** `b` between the sites is the great-circle distance
//!    ([`crate::geodesy::distance`]);
//! 2. Earth, Venus and Sun positions at the instant come from the
//!    [`PositionCalculator`]; the Earth–Sun distance `d` is `|r_earth - r_sun|` in km;
//! 3. the **parallax angle** is the angle the baseline subtends at the Sun's distance,
//!    `θ = b / d` (small-angle approximation);
//! 4. the **AU estimate** is `b / tan θ`, scored against the reference AU as a percentage error.
//!
//! The uncertainty attached to each result is informational and never feeds back into the
//! estimate. It combines, by root-sum-square, three relative contributions:
//!
//! ```text
//! timing    = timing_uncertainty_sec / 86400
//! angular   = angular_uncertainty_arcsec / θ["]
//! distance  = baseline_uncertainty_m / b[m]
//! ```
//!
//! ## Side effects
//!
//! Every successful calculation is appended to the engine's [`CalculationHistory`] and handed
//! to the registered [`ParallaxObserver`]s. The history sits behind a mutex, so a single engine
//! can be shared by threads computing independent pairs concurrently.
//!
//! ## Errors
//!
//! * [`TransitError::InsufficientObservations`] – fewer than two distinct sites.
//! * [`TransitError::InputValidation`] – co-located sites, or more than two sites.
//! * [`TransitError::NonFinite`] – NaN/∞ surfaced in an intermediate value.
//!
//! No partial result is ever returned or recorded.
//!
//! ## See also
//! ------------
//! * [`au_from_parallax`], [`parallax_from_au`] – the direct and inverse relations.
//! * [`crate::transit::Transit::historical_parallax`] – pairwise aggregation by transit year.

use std::f64::consts::FRAC_PI_2;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hifitime::Epoch;
use itertools::Itertools;

use crate::config::TransitConfig;
use crate::constants::{ArcSec, Kilometer, Meter, Radian, SiteId, AU_KM, RADSEC, SECONDS_PER_DAY};
use crate::geodesy;
use crate::history::{CalculationHistory, HistoryFilter, PrecisionMode};
use crate::orbital_elements::Body;
use crate::position::{CelestialPosition, PositionCalculator};
use crate::sites::roster::TransitRoster;
use crate::sites::ObservationSite;
use crate::time::{epoch_to_jd, SimulationClock};
use crate::transit_errors::TransitError;

/// Non-fatal condition met while computing a result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComputationWarning {
    /// Kepler's equation exhausted its iteration budget for this body.
    KeplerNonConvergence { body: Body, iterations: usize },
}

/// Assumed measurement uncertainties and their combined relative effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uncertainty {
    pub time_sec: f64,
    pub angular_arcsec: ArcSec,
    pub distance_m: Meter,
    /// Root-sum-square of the relative contributions, as a fraction of the estimate
    pub combined: f64,
}

impl Uncertainty {
    /// Combine the configured assumptions for a given baseline and parallax angle.
    pub fn assess(config: &TransitConfig, baseline_km: Kilometer, parallax_arcsec: ArcSec) -> Self {
        let timing = config.timing_uncertainty_sec / SECONDS_PER_DAY;
        let angular = config.angular_uncertainty_arcsec / parallax_arcsec;
        let distance = config.baseline_uncertainty_m / (baseline_km * 1000.0);

        Uncertainty {
            time_sec: config.timing_uncertainty_sec,
            angular_arcsec: config.angular_uncertainty_arcsec,
            distance_m: config.baseline_uncertainty_m,
            combined: (timing.powi(2) + angular.powi(2) + distance.powi(2)).sqrt(),
        }
    }

    /// Combined uncertainty expressed in kilometers on a given estimate.
    pub fn combined_km(&self, estimate_km: Kilometer) -> Kilometer {
        self.combined * estimate_km
    }
}

/// Outcome of one two-site triangulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxResult {
    pub site_a: SiteId,
    pub site_b: SiteId,
    /// Instant of the observation
    pub epoch: Epoch,
    pub baseline_km: Kilometer,
    pub earth_sun_distance_km: Kilometer,
    pub earth_venus_distance_km: Kilometer,
    pub parallax_angle_arcsec: ArcSec,
    pub calculated_au_km: Kilometer,
    pub reference_au_km: Kilometer,
    pub error_percent: f64,
    pub uncertainty: Uncertainty,
    pub precision_mode: PrecisionMode,
    /// Wall-clock instant of the calculation
    pub computed_at: Epoch,
    pub warnings: Vec<ComputationWarning>,
}

impl ParallaxResult {
    pub fn parallax_angle_rad(&self) -> Radian {
        self.parallax_angle_arcsec * RADSEC
    }
}

/// Summary statistics over a set of results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxSummary {
    pub count: usize,
    pub mean_au_km: Kilometer,
    /// Population standard deviation of the AU estimates
    pub std_dev_au_km: Kilometer,
    pub mean_error_percent: f64,
}

impl ParallaxSummary {
    /// Statistics of `results`, `None` when empty.
    pub fn from_results(results: &[ParallaxResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let n = results.len() as f64;
        let mean_au = results.iter().map(|r| r.calculated_au_km).sum::<f64>() / n;
        let variance = results
            .iter()
            .map(|r| (r.calculated_au_km - mean_au).powi(2))
            .sum::<f64>()
            / n;
        let mean_error = results.iter().map(|r| r.error_percent).sum::<f64>() / n;

        Some(ParallaxSummary {
            count: results.len(),
            mean_au_km: mean_au,
            std_dev_au_km: variance.sqrt(),
            mean_error_percent: mean_error,
        })
    }
}

/// Every pairwise result of one transit year, with its summary and best entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalParallax {
    pub year: i32,
    pub mid_transit: Epoch,
    pub results: Vec<ParallaxResult>,
    pub summary: ParallaxSummary,
    pub best_result: ParallaxResult,
}

/// Receives each result computed by a [`ParallaxEngine`].
pub trait ParallaxObserver: Send + Sync {
    fn on_result(&self, result: &ParallaxResult);
}

/// AU estimate `b / tan θ` from a baseline and the angle it subtends.
///
/// Errors
/// ------
/// * [`TransitError::InputValidation`] unless `b > 0` and `θ ∈ (0, π/2)`.
pub fn au_from_parallax(baseline_km: Kilometer, angle: Radian) -> Result<Kilometer, TransitError> {
    if !(baseline_km > 0.0 && baseline_km.is_finite()) {
        return Err(TransitError::InputValidation(format!(
            "baseline {baseline_km} km must be positive"
        )));
    }
    if !(angle > 0.0 && angle < FRAC_PI_2) {
        return Err(TransitError::InputValidation(format!(
            "parallax angle {angle} rad is outside (0, π/2)"
        )));
    }
    Ok(baseline_km / angle.tan())
}

/// Angle subtended by a baseline at a distance, `atan(b / d)`; inverse of [`au_from_parallax`].
pub fn parallax_from_au(
    baseline_km: Kilometer,
    distance_km: Kilometer,
) -> Result<Radian, TransitError> {
    if !(baseline_km > 0.0 && distance_km > 0.0) {
        return Err(TransitError::InputValidation(format!(
            "baseline {baseline_km} km and distance {distance_km} km must be positive"
        )));
    }
    let angle = (baseline_km / distance_km).atan();
    if !angle.is_finite() {
        return Err(TransitError::NonFinite("parallax angle"));
    }
    Ok(angle)
}

fn ensure_finite(value: f64, what: &'static str) -> Result<f64, TransitError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TransitError::NonFinite(what))
    }
}

fn kepler_warnings(positions: &[&CelestialPosition]) -> Vec<ComputationWarning> {
    positions
        .iter()
        .filter(|p| !p.converged)
        .map(|p| ComputationWarning::KeplerNonConvergence {
            body: p.body,
            iterations: p.iterations,
        })
        .collect()
}

pub struct ParallaxEngine {
    calculator: PositionCalculator,
    config: TransitConfig,
    history: Mutex<CalculationHistory>,
    observers: Vec<Arc<dyn ParallaxObserver>>,
}

impl std::fmt::Debug for ParallaxEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallaxEngine")
            .field("calculator", &self.calculator)
            .field("config", &self.config)
            .field("history_len", &self.history().len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ParallaxEngine {
    pub fn new(calculator: PositionCalculator, config: TransitConfig) -> Self {
        ParallaxEngine {
            calculator,
            config,
            history: Mutex::new(CalculationHistory::new()),
            observers: Vec::new(),
        }
    }

    pub fn calculator(&self) -> &PositionCalculator {
        &self.calculator
    }

    pub fn config(&self) -> &TransitConfig {
        &self.config
    }

    /// Register an observer notified after each successful calculation.
    pub fn subscribe(&mut self, observer: Arc<dyn ParallaxObserver>) {
        self.observers.push(observer);
    }

    /// Triangulate the AU from two sites at an instant.
    ///
    /// Arguments
    /// -----------------
    /// * `site_a`, `site_b`: two distinct observation sites.
    /// * `epoch`: instant of the observation.
    /// * `precision_mode`: recorded on the result for the precision policy.
    ///
    /// Return
    /// ----------
    /// * the [`ParallaxResult`], also appended to the history.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::InsufficientObservations`] if both sites share the same id.
    /// * [`TransitError::InputValidation`] if the sites are co-located (zero baseline).
    /// * Any position error ([`TransitError::InvalidEccentricity`], [`TransitError::NonFinite`]).
    pub fn compute_parallax(
        &self,
        site_a: &ObservationSite,
        site_b: &ObservationSite,
        epoch: Epoch,
        precision_mode: PrecisionMode,
    ) -> Result<ParallaxResult, TransitError> {
        let result = self.evaluate(site_a, site_b, epoch, precision_mode)?;
        self.record(&result);
        Ok(result)
    }

    /// Triangulation without side effects: nothing is recorded nor broadcast.
    fn evaluate(
        &self,
        site_a: &ObservationSite,
        site_b: &ObservationSite,
        epoch: Epoch,
        precision_mode: PrecisionMode,
    ) -> Result<ParallaxResult, TransitError> {
        if site_a.id == site_b.id {
            return Err(TransitError::InsufficientObservations { found: 1 });
        }

        let baseline_km = ensure_finite(
            geodesy::distance(&site_a.location, &site_b.location),
            "baseline",
        )?;
        if baseline_km <= 0.0 {
            return Err(TransitError::InputValidation(format!(
                "sites '{}' and '{}' are co-located, the baseline is zero",
                site_a.id, site_b.id
            )));
        }

        let jd = epoch_to_jd(&epoch);
        let earth = self.calculator.position(Body::Earth, jd)?;
        let venus = self.calculator.position(Body::Venus, jd)?;
        let sun = self.calculator.position(Body::Sun, jd)?;

        let earth_sun_distance_km =
            ensure_finite(earth.distance_to(&sun) * AU_KM, "earth-sun distance")?;
        let earth_venus_distance_km =
            ensure_finite(earth.distance_to(&venus) * AU_KM, "earth-venus distance")?;

        let parallax_angle = ensure_finite(baseline_km / earth_sun_distance_km, "parallax angle")?;
        let calculated_au_km =
            ensure_finite(au_from_parallax(baseline_km, parallax_angle)?, "AU estimate")?;

        let reference_au_km = self.config.reference_au_km;
        let error_percent = ensure_finite(
            (calculated_au_km - reference_au_km).abs() / reference_au_km * 100.0,
            "error percentage",
        )?;

        let parallax_angle_arcsec = parallax_angle / RADSEC;
        let uncertainty = Uncertainty::assess(&self.config, baseline_km, parallax_angle_arcsec);
        ensure_finite(uncertainty.combined, "uncertainty")?;

        let computed_at =
            Epoch::now().map_err(|err| TransitError::ClockUnavailable(err.to_string()))?;

        let result = ParallaxResult {
            site_a: site_a.id.clone(),
            site_b: site_b.id.clone(),
            epoch,
            baseline_km,
            earth_sun_distance_km,
            earth_venus_distance_km,
            parallax_angle_arcsec,
            calculated_au_km,
            reference_au_km,
            error_percent,
            uncertainty,
            precision_mode,
            computed_at,
            warnings: kepler_warnings(&[&earth, &venus]),
        };

        tracing::debug!(
            site_a = %result.site_a,
            site_b = %result.site_b,
            baseline_km,
            parallax_arcsec = parallax_angle_arcsec,
            au_km = calculated_au_km,
            error_percent,
            "parallax computed"
        );

        Ok(result)
    }

    /// Append to the history, then notify observers.
    fn record(&self, result: &ParallaxResult) {
        self.history().push(result.clone());
        for observer in &self.observers {
            observer.on_result(result);
        }
    }

    /// Triangulate from a list that must hold exactly two sites.
    pub fn compute_from_sites(
        &self,
        sites: &[ObservationSite],
        epoch: Epoch,
        precision_mode: PrecisionMode,
    ) -> Result<ParallaxResult, TransitError> {
        match sites {
            [a, b] => self.compute_parallax(a, b, epoch, precision_mode),
            [] | [_] => Err(TransitError::InsufficientObservations { found: sites.len() }),
            _ => Err(TransitError::InputValidation(format!(
                "exactly two sites are triangulated at once, got {}",
                sites.len()
            ))),
        }
    }

    /// Triangulate at the instant given by a simulation clock.
    pub fn compute_parallax_at(
        &self,
        clock: &dyn SimulationClock,
        site_a: &ObservationSite,
        site_b: &ObservationSite,
        precision_mode: PrecisionMode,
    ) -> Result<ParallaxResult, TransitError> {
        self.compute_parallax(site_a, site_b, clock.current_epoch()?, precision_mode)
    }

    /// Triangulate every unordered pair of a roster at its mid-transit instant.
    ///
    /// Return
    /// ----------
    /// * `n·(n-1)/2` results in roster order, their summary, and the minimum-error result.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::InsufficientObservations`] if the roster holds fewer than two sites.
    /// * The first error of any pair; nothing is returned, recorded or broadcast partially.
    pub fn historical_parallax(
        &self,
        roster: &TransitRoster,
        precision_mode: PrecisionMode,
    ) -> Result<HistoricalParallax, TransitError> {
        if roster.sites.len() < 2 {
            return Err(TransitError::InsufficientObservations {
                found: roster.sites.len(),
            });
        }

        let results = roster
            .sites
            .iter()
            .tuple_combinations()
            .map(|(a, b)| self.evaluate(a, b, roster.mid_transit, precision_mode))
            .collect::<Result<Vec<_>, _>>()?;

        let summary = ParallaxSummary::from_results(&results)
            .ok_or(TransitError::InsufficientObservations { found: 0 })?;

        let best_result = results
            .iter()
            .min_by(|a, b| a.error_percent.total_cmp(&b.error_percent))
            .cloned()
            .ok_or(TransitError::InsufficientObservations { found: 0 })?;

        tracing::info!(
            year = roster.year,
            pairs = results.len(),
            mean_au_km = summary.mean_au_km,
            std_dev_au_km = summary.std_dev_au_km,
            best_site_a = %best_result.site_a,
            best_site_b = %best_result.site_b,
            "historical parallax aggregated"
        );

        for result in &results {
            self.record(result);
        }

        Ok(HistoricalParallax {
            year: roster.year,
            mid_transit: roster.mid_transit,
            results,
            summary,
            best_result,
        })
    }

    /// Locked access to the history; a poisoned lock is recovered since the log is append-only.
    pub fn history(&self) -> MutexGuard<'_, CalculationHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn filter_history(&self, filter: &HistoryFilter) -> Vec<ParallaxResult> {
        self.history().filter(filter)
    }

    pub fn clear_history(&self) {
        self.history().clear();
    }
}
