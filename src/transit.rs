//! # Transit: orbital model, historical rosters and parallax engine
//!
//! This module defines the [`Transit`](crate::transit::Transit) struct, the façade that wires
//! together:
//!
//! 1. **Orbital model** ([`OrbitalElementsTable`]) – J2000 secular elements of Venus and Earth,
//!    shared through an [`Arc`] with the position calculator.
//! 2. **Historical rosters** ([`HistoricalRosters`]) – sites of the 1761, 1769, 1874 and 1882
//!    transits, parsed on first use and cached in a [`OnceCell`].
//! 3. **Parallax engine** ([`ParallaxEngine`]) – triangulation, calculation history and observers.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use venus_transit::history::PrecisionMode;
//! use venus_transit::transit::Transit;
//!
//! let transit = Transit::builtin().unwrap();
//!
//! // Every pair of the 1769 expeditions, evaluated at mid-transit
//! let h = transit.historical_parallax(1769, PrecisionMode::Standard).unwrap();
//! println!("best pair {} / {}: {:.2} %", h.best_result.site_a, h.best_result.site_b,
//!          h.best_result.error_percent);
//! ```
//!
//! ## See also
//! ------------
//! * [`PositionCalculator`](crate::position::PositionCalculator) – Heliocentric positions.
//! * [`ParallaxEngine`] – Two-site triangulation.
//! * [`TransitConfig`] – Numerical settings and assumed uncertainties.

use std::sync::{Arc, MutexGuard};

use hifitime::Epoch;
use once_cell::sync::OnceCell;

use crate::{
    config::TransitConfig,
    constants::{Au, JulianDate},
    history::{CalculationHistory, HistoryFilter, PrecisionMode},
    orbital_elements::{Body, OrbitalElementsTable},
    parallax::{HistoricalParallax, ParallaxEngine, ParallaxObserver, ParallaxResult},
    position::{CelestialPosition, PositionCalculator},
    sites::roster::{HistoricalRosters, TransitRoster},
    transit_errors::TransitError,
};

#[derive(Debug)]
pub struct Transit {
    config: TransitConfig,
    elements: Arc<OrbitalElementsTable>,
    rosters: OnceCell<HistoricalRosters>,
    engine: ParallaxEngine,
}

impl Transit {
    /// Construct a [`Transit`] context over a given element table.
    ///
    /// The historical rosters are **not** parsed yet; they are loaded the first time
    /// [`rosters`](crate::transit::Transit::rosters) is called.
    ///
    /// Arguments
    /// -----------------
    /// * `elements`: secular elements of Venus and Earth.
    /// * `config`: numerical settings applied to every calculation.
    pub fn new(elements: OrbitalElementsTable, config: TransitConfig) -> Self {
        let elements = Arc::new(elements);
        let calculator = PositionCalculator::new(Arc::clone(&elements), &config);

        Transit {
            engine: ParallaxEngine::new(calculator, config.clone()),
            config,
            elements,
            rosters: OnceCell::new(),
        }
    }

    /// Context over the built-in J2000 element table with the given configuration.
    pub fn with_config(config: TransitConfig) -> Result<Self, TransitError> {
        Ok(Self::new(OrbitalElementsTable::builtin()?, config))
    }

    /// Context over the built-in element table and the default configuration.
    pub fn builtin() -> Result<Self, TransitError> {
        Self::with_config(TransitConfig::default())
    }

    pub fn config(&self) -> &TransitConfig {
        &self.config
    }

    pub fn elements(&self) -> &OrbitalElementsTable {
        &self.elements
    }

    pub fn engine(&self) -> &ParallaxEngine {
        &self.engine
    }

    /// Get the lazily-loaded historical rosters.
    ///
    /// Return
    /// ----------
    /// * `&HistoricalRosters` on success, or the parse error of the embedded tables.
    pub fn rosters(&self) -> Result<&HistoricalRosters, TransitError> {
        self.rosters.get_or_try_init(HistoricalRosters::builtin)
    }

    /// Replace the rosters, e.g. with tables read from disk.
    pub fn with_rosters(mut self, rosters: HistoricalRosters) -> Self {
        self.rosters = OnceCell::with_value(rosters);
        self
    }

    pub fn roster(&self, year: i32) -> Result<&TransitRoster, TransitError> {
        self.rosters()?.roster(year)
    }

    /// Heliocentric position of a body at a Julian date.
    pub fn position(&self, body: Body, jd: JulianDate) -> Result<CelestialPosition, TransitError> {
        self.engine.calculator().position(body, jd)
    }

    /// Heliocentric position by body name (`"venus"`, `"earth"`, `"sun"`).
    pub fn position_by_name(
        &self,
        body: &str,
        jd: JulianDate,
    ) -> Result<CelestialPosition, TransitError> {
        self.engine.calculator().position_by_name(body, jd)
    }

    /// Distance between two bodies at a Julian date, in AU.
    pub fn distance(&self, a: Body, b: Body, jd: JulianDate) -> Result<Au, TransitError> {
        self.engine.calculator().distance_between(a, b, jd)
    }

    /// Triangulate two sites of a transit year, looked up by id.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::UnknownTransitYear`] if `year` has no roster.
    /// * [`TransitError::InsufficientObservations`] if either id is not in the roster,
    ///   `found` counting the ids that were.
    pub fn compute_parallax_by_ids(
        &self,
        year: i32,
        site_a: &str,
        site_b: &str,
        epoch: Epoch,
        precision_mode: PrecisionMode,
    ) -> Result<ParallaxResult, TransitError> {
        let roster = self.roster(year)?;
        match (roster.site(site_a), roster.site(site_b)) {
            (Some(a), Some(b)) => self.engine.compute_parallax(a, b, epoch, precision_mode),
            (a, b) => Err(TransitError::InsufficientObservations {
                found: usize::from(a.is_some()) + usize::from(b.is_some()),
            }),
        }
    }

    /// Every pairwise triangulation of a transit year at its mid-transit instant.
    ///
    /// See also
    /// ------------
    /// * [`ParallaxEngine::historical_parallax`] – Aggregation over one roster.
    pub fn historical_parallax(
        &self,
        year: i32,
        precision_mode: PrecisionMode,
    ) -> Result<HistoricalParallax, TransitError> {
        let roster = self.roster(year)?;
        self.engine.historical_parallax(roster, precision_mode)
    }

    pub fn subscribe(&mut self, observer: Arc<dyn ParallaxObserver>) {
        self.engine.subscribe(observer);
    }

    pub fn history(&self) -> MutexGuard<'_, CalculationHistory> {
        self.engine.history()
    }

    pub fn filter_history(&self, filter: &HistoryFilter) -> Vec<ParallaxResult> {
        self.engine.filter_history(filter)
    }

    pub fn clear_history(&self) {
        self.engine.clear_history();
    }
}

#[cfg(test)]
mod transit_test {
    use super::*;
    use crate::constants::J2000_JD;
    use crate::time::parse_epoch;

    #[test]
    fn test_lazy_rosters() {
        let transit = Transit::builtin().unwrap();
        assert!(transit.rosters.get().is_none());
        assert_eq!(transit.rosters().unwrap().years().len(), 4);
        assert!(transit.rosters.get().is_some());
    }

    #[test]
    fn test_by_ids() {
        let transit = Transit::builtin().unwrap();
        let epoch = parse_epoch("1769-06-03T22:25:00 UTC").unwrap();

        let r = transit
            .compute_parallax_by_ids(1769, "point_venus", "vardo", epoch, PrecisionMode::Standard)
            .unwrap();
        assert_eq!(r.site_a, "point_venus");
        assert!(r.baseline_km > 9_000.0);

        assert_eq!(
            transit.compute_parallax_by_ids(
                1769,
                "point_venus",
                "atlantis",
                epoch,
                PrecisionMode::Standard,
            ),
            Err(TransitError::InsufficientObservations { found: 1 })
        );
        assert_eq!(
            transit.compute_parallax_by_ids(2004, "a", "b", epoch, PrecisionMode::Standard),
            Err(TransitError::UnknownTransitYear(2004))
        );
        assert_eq!(transit.history().len(), 1);
    }

    #[test]
    fn test_positions_through_facade() {
        let transit = Transit::builtin().unwrap();
        let sun = transit.position(Body::Sun, J2000_JD).unwrap();
        assert_eq!(sun.distance(), 0.0);
        let d = transit.distance(Body::Earth, Body::Sun, J2000_JD).unwrap();
        assert!(d > 0.98 && d < 0.99);
        assert!(transit.position_by_name("mars", J2000_JD).is_err());
    }
}
