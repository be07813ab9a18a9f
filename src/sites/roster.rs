//! Historical rosters of transit observation sites.
//!
//! Two embedded CSV tables feed [`HistoricalRosters`]:
//!
//! - `data/transits.csv`: `year,mid_transit` with the mid-transit instant in UTC,
//! - `data/transit_sites.csv`: `year,id,name,latitude,longitude,elevation_m,telescope,observer`
//!   followed by four optional contact instants.
//!
//! Both are read-only configuration; [`HistoricalRosters::from_readers`] accepts replacements
//! with the same layout.

use std::collections::BTreeMap;
use std::io::Read;

use hifitime::Epoch;
use serde::Deserialize;

use super::{ContactTimes, ObservationSite};
use crate::constants::{Degree, Meter};
use crate::geodesy::GeodeticLocation;
use crate::time::parse_epoch;
use crate::transit_errors::TransitError;

static DEFAULT_TRANSITS: &str = include_str!("../../data/transits.csv");
static DEFAULT_SITES: &str = include_str!("../../data/transit_sites.csv");

#[derive(Debug, Deserialize)]
struct TransitRecord {
    year: i32,
    mid_transit: String,
}

#[derive(Debug, Deserialize)]
struct SiteRecord {
    year: i32,
    id: String,
    name: String,
    latitude: Degree,
    longitude: Degree,
    elevation_m: Meter,
    telescope: String,
    observer: String,
    first_contact: Option<String>,
    second_contact: Option<String>,
    third_contact: Option<String>,
    fourth_contact: Option<String>,
}

fn parse_contact(field: Option<String>) -> Result<Option<Epoch>, TransitError> {
    match field {
        Some(s) if !s.trim().is_empty() => Ok(Some(parse_epoch(&s)?)),
        _ => Ok(None),
    }
}

impl SiteRecord {
    fn into_site(self) -> Result<ObservationSite, TransitError> {
        let location = GeodeticLocation::new(self.latitude, self.longitude, self.elevation_m)?;
        let contacts = ContactTimes {
            first: parse_contact(self.first_contact)?,
            second: parse_contact(self.second_contact)?,
            third: parse_contact(self.third_contact)?,
            fourth: parse_contact(self.fourth_contact)?,
        };

        Ok(
            ObservationSite::new(self.id, self.name, location, self.telescope, self.observer)
                .with_contact_times(contacts),
        )
    }
}

/// Sites that observed the transit of one year.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitRoster {
    pub year: i32,
    /// Mid-transit instant (geocentric), UTC
    pub mid_transit: Epoch,
    pub sites: Vec<ObservationSite>,
}

impl TransitRoster {
    pub fn site(&self, id: &str) -> Option<&ObservationSite> {
        self.sites.iter().find(|s| s.id == id)
    }
}

/// All known transit rosters, keyed by year.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRosters {
    rosters: BTreeMap<i32, TransitRoster>,
}

impl HistoricalRosters {
    /// Rosters of the 1761, 1769, 1874 and 1882 transits shipped with the crate.
    pub fn builtin() -> Result<Self, TransitError> {
        Self::from_readers(DEFAULT_TRANSITS.as_bytes(), DEFAULT_SITES.as_bytes())
    }

    /// Load rosters from a transit table and a site table.
    ///
    /// Errors
    /// ------
    /// * [`TransitError::CsvError`] on malformed rows.
    /// * [`TransitError::InvalidEpoch`] on unparsable instants.
    /// * [`TransitError::InputValidation`] on invalid coordinates, duplicated years or site ids,
    ///   or a site whose year has no transit entry.
    pub fn from_readers<T: Read, S: Read>(transits: T, sites: S) -> Result<Self, TransitError> {
        let mut rosters = BTreeMap::new();

        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(transits);
        for record in rdr.deserialize::<TransitRecord>() {
            let record = record?;
            let roster = TransitRoster {
                year: record.year,
                mid_transit: parse_epoch(&record.mid_transit)?,
                sites: Vec::new(),
            };
            if rosters.insert(record.year, roster).is_some() {
                return Err(TransitError::InputValidation(format!(
                    "transit year {} listed twice",
                    record.year
                )));
            }
        }

        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(sites);
        for record in rdr.deserialize::<SiteRecord>() {
            let record = record?;
            let year = record.year;
            let roster = rosters.get_mut(&year).ok_or_else(|| {
                TransitError::InputValidation(format!(
                    "site '{}' refers to unknown transit year {year}",
                    record.id
                ))
            })?;

            let site = record.into_site()?;
            if roster.site(&site.id).is_some() {
                return Err(TransitError::InputValidation(format!(
                    "site '{}' listed twice for {year}",
                    site.id
                )));
            }
            roster.sites.push(site);
        }

        tracing::debug!(years = rosters.len(), "historical transit rosters loaded");

        Ok(HistoricalRosters { rosters })
    }

    /// Roster of a transit year.
    pub fn roster(&self, year: i32) -> Result<&TransitRoster, TransitError> {
        self.rosters
            .get(&year)
            .ok_or(TransitError::UnknownTransitYear(year))
    }

    /// Known transit years in increasing order.
    pub fn years(&self) -> Vec<i32> {
        self.rosters.keys().copied().collect()
    }

    /// Find a site by id in any roster, most recent transit first.
    pub fn find_site(&self, id: &str) -> Option<&ObservationSite> {
        self.rosters.values().rev().find_map(|r| r.site(id))
    }
}
