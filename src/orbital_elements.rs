//! # Mean orbital elements with secular rates
//!
//! This module holds the **static orbital-elements table** used by the position model: for each
//! supported [`Body`], the six mean elements at J2000.0 together with their linear and quadratic
//! secular rates, so that every element is evaluated as
//!
//! ```text
//! element(T) = element₀ + rate₁·T + rate₂·T²,     T = (JD - 2451545.0) / 36525
//! ```
//!
//! ## Elements
//!
//! | field                   | unit    | symbol |
//! |-------------------------|---------|--------|
//! | `semi_major_axis`       | AU      | a      |
//! | `eccentricity`          | –       | e      |
//! | `inclination`           | rad     | i      |
//! | `mean_longitude`        | rad     | L      |
//! | `perihelion_longitude`  | rad     | ϖ      |
//! | `ascending_node`        | rad     | Ω      |
//!
//! The periapsis term is tabulated as the **longitude of perihelion** ϖ = Ω + ω, which is what the
//! mean anomaly is taken from (`M = L - ϖ`). The argument of periapsis ω is derived from it.
//!
//! ## Data source
//!
//! The default table is embedded from `data/orbital_elements.csv` (Meeus, *Astronomical
//! Algorithms*, mean elements referred to the J2000 ecliptic). Angles and angular rates are given
//! in **degrees** and **degrees per Julian century** in the file and converted to radians at load.
//! A caller can supply its own table with the same layout through
//! [`OrbitalElementsTable::from_reader`].
//!
//! The table is immutable once loaded.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{Au, Radian, RADEG};
use crate::kepler::principal_angle;
use crate::transit_errors::TransitError;

static DEFAULT_ELEMENTS: &str = include_str!("../data/orbital_elements.csv");

/// Bodies known to the position model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Body {
    Sun,
    Venus,
    Earth,
}

impl Body {
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Venus => "venus",
            Body::Earth => "earth",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = TransitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sun" => Ok(Body::Sun),
            "venus" => Ok(Body::Venus),
            "earth" => Ok(Body::Earth),
            _ => Err(TransitError::UnknownBody(s.to_string())),
        }
    }
}

/// Name of an element column in the CSV table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ElementName {
    SemiMajorAxis,
    Eccentricity,
    Inclination,
    MeanLongitude,
    PerihelionLongitude,
    AscendingNode,
}

impl ElementName {
    const ALL: [ElementName; 6] = [
        ElementName::SemiMajorAxis,
        ElementName::Eccentricity,
        ElementName::Inclination,
        ElementName::MeanLongitude,
        ElementName::PerihelionLongitude,
        ElementName::AscendingNode,
    ];

    fn is_angle(&self) -> bool {
        !matches!(self, ElementName::SemiMajorAxis | ElementName::Eccentricity)
    }
}

#[derive(Debug, Deserialize)]
struct ElementRecord {
    body: String,
    element: ElementName,
    value: f64,
    rate: f64,
    rate2: f64,
}

/// One element as a quadratic polynomial in Julian centuries.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SecularTerm {
    /// Value at J2000.0
    pub value: f64,
    /// Linear rate, per Julian century
    pub rate: f64,
    /// Quadratic rate, per Julian century squared
    pub rate2: f64,
}

impl SecularTerm {
    pub fn new(value: f64, rate: f64, rate2: f64) -> Self {
        SecularTerm { value, rate, rate2 }
    }

    /// Evaluate the polynomial at `t` Julian centuries from J2000.0.
    pub fn at(&self, t: f64) -> f64 {
        self.value + (self.rate + self.rate2 * t) * t
    }
}

/// Mean elements of one body and their secular rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecularElements {
    pub semi_major_axis: SecularTerm,
    pub eccentricity: SecularTerm,
    pub inclination: SecularTerm,
    pub mean_longitude: SecularTerm,
    pub perihelion_longitude: SecularTerm,
    pub ascending_node: SecularTerm,
}

impl SecularElements {
    /// Evaluate all elements at `t` Julian centuries from J2000.0.
    pub fn at(&self, t: f64) -> OrbitalElements {
        OrbitalElements {
            semi_major_axis: self.semi_major_axis.at(t),
            eccentricity: self.eccentricity.at(t),
            inclination: self.inclination.at(t),
            mean_longitude: self.mean_longitude.at(t),
            perihelion_longitude: self.perihelion_longitude.at(t),
            ascending_node: self.ascending_node.at(t),
        }
    }
}

/// Mean elements of a body evaluated at a given epoch.
///
/// Units: AU for `semi_major_axis`, radians for every angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    pub semi_major_axis: Au,
    pub eccentricity: f64,
    pub inclination: Radian,
    pub mean_longitude: Radian,
    pub perihelion_longitude: Radian,
    pub ascending_node: Radian,
}

impl OrbitalElements {
    /// Mean anomaly `M = L - ϖ`, in `[0, 2π)`.
    pub fn mean_anomaly(&self) -> Radian {
        principal_angle(self.mean_longitude - self.perihelion_longitude)
    }

    /// Argument of periapsis `ω = ϖ - Ω`, in `[0, 2π)`.
    pub fn periapsis_argument(&self) -> Radian {
        principal_angle(self.perihelion_longitude - self.ascending_node)
    }
}

/// Read-only store of secular elements per body.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalElementsTable {
    bodies: HashMap<Body, SecularElements>,
}

impl OrbitalElementsTable {
    /// Load the embedded Meeus table.
    pub fn builtin() -> Result<Self, TransitError> {
        Self::from_reader(DEFAULT_ELEMENTS.as_bytes())
    }

    /// Load a table from CSV with the header `body,element,value,rate,rate2`.
    ///
    /// Angles are read in degrees (rates in degrees per century) and stored in radians.
    ///
    /// Errors
    /// ------
    /// * [`TransitError::CsvError`] for malformed rows,
    /// * [`TransitError::UnknownBody`] for an unsupported body name,
    /// * [`TransitError::InputValidation`] for duplicated or missing elements, or rows on the Sun.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TransitError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut terms: HashMap<Body, HashMap<ElementName, SecularTerm>> = HashMap::new();

        for record in rdr.deserialize::<ElementRecord>() {
            let record = record?;
            let body: Body = record.body.parse()?;
            if body == Body::Sun {
                return Err(TransitError::InputValidation(
                    "the Sun is the origin of the frame and takes no orbital elements".into(),
                ));
            }

            let scale = if record.element.is_angle() { RADEG } else { 1.0 };
            let term = SecularTerm::new(
                record.value * scale,
                record.rate * scale,
                record.rate2 * scale,
            );

            if terms
                .entry(body)
                .or_default()
                .insert(record.element, term)
                .is_some()
            {
                return Err(TransitError::InputValidation(format!(
                    "duplicated element {:?} for {body}",
                    record.element
                )));
            }
        }

        let mut bodies = HashMap::with_capacity(terms.len());
        for (body, elements) in terms {
            let get = |name: ElementName| {
                elements.get(&name).copied().ok_or_else(|| {
                    TransitError::InputValidation(format!("missing element {name:?} for {body}"))
                })
            };

            // every element must be present
            for name in ElementName::ALL {
                get(name)?;
            }

            bodies.insert(
                body,
                SecularElements {
                    semi_major_axis: get(ElementName::SemiMajorAxis)?,
                    eccentricity: get(ElementName::Eccentricity)?,
                    inclination: get(ElementName::Inclination)?,
                    mean_longitude: get(ElementName::MeanLongitude)?,
                    perihelion_longitude: get(ElementName::PerihelionLongitude)?,
                    ascending_node: get(ElementName::AscendingNode)?,
                },
            );
        }

        tracing::debug!(bodies = bodies.len(), "orbital elements table loaded");

        Ok(OrbitalElementsTable { bodies })
    }

    /// Secular elements of a body.
    pub fn secular_elements(&self, body: Body) -> Result<&SecularElements, TransitError> {
        self.bodies
            .get(&body)
            .ok_or_else(|| TransitError::UnknownBody(body.to_string()))
    }

    /// Elements of a body evaluated at `t` Julian centuries from J2000.0.
    pub fn elements_at(&self, body: Body, t: f64) -> Result<OrbitalElements, TransitError> {
        Ok(self.secular_elements(body)?.at(t))
    }

    pub fn contains(&self, body: Body) -> bool {
        self.bodies.contains_key(&body)
    }

    /// Bodies present in the table, sorted.
    pub fn bodies(&self) -> Vec<Body> {
        let mut bodies: Vec<Body> = self.bodies.keys().copied().collect();
        bodies.sort();
        bodies
    }
}
