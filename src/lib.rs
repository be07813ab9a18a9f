//! # venus_transit
//!
//! Re-enactment of the historical measurement of the astronomical unit from transits of Venus.
//!
//! Heliocentric positions of Venus and Earth are propagated from J2000 secular elements
//! ([`orbital_elements`], [`kepler`], [`position`]); two terrestrial sites separated by a
//! great-circle baseline ([`geodesy`], [`sites`]) triangulate the Earth–Sun distance
//! ([`parallax`]); results are scored against the modern AU and logged ([`history`]).
//!
//! [`transit::Transit`] bundles everything behind a single context.

pub mod config;
pub mod constants;
pub mod geodesy;
pub mod history;
pub mod kepler;
pub mod orbital_elements;
pub mod parallax;
pub mod position;
pub mod sites;
pub mod time;
pub mod transit;
pub mod transit_errors;
