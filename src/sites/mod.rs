//! # Observation sites
//!
//! An [`ObservationSite`] is read-only reference data describing where a transit was observed:
//! a stable identifier, a display name, the [`GeodeticLocation`], the instrument, the observer,
//! and the contact instants when they were recorded ([`ContactTimes`]).
//!
//! Historical sites grouped by transit year live in [`roster`].
//!
//! ## Contacts
//!
//! ```text
//!   1st: Venus touches the solar limb from outside
//!   2nd: Venus fully inside the disk
//!   3rd: Venus touches the limb from inside on exit
//!   4th: Venus leaves the disk
//! ```

pub mod roster;

use hifitime::{Duration, Epoch};

use crate::constants::SiteId;
use crate::geodesy::GeodeticLocation;

/// Recorded contact instants of a transit at one site; any of them may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactTimes {
    pub first: Option<Epoch>,
    pub second: Option<Epoch>,
    pub third: Option<Epoch>,
    pub fourth: Option<Epoch>,
}

impl ContactTimes {
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
            && self.second.is_none()
            && self.third.is_none()
            && self.fourth.is_none()
    }

    /// Time between the outer contacts (1st → 4th), when both were recorded.
    pub fn duration(&self) -> Option<Duration> {
        Some(self.fourth? - self.first?)
    }

    /// Middle of the transit as seen from the site, from the outer contacts or,
    /// failing that, the inner ones.
    pub fn mid_transit(&self) -> Option<Epoch> {
        let (start, end) = match (self.first, self.fourth) {
            (Some(first), Some(fourth)) => (first, fourth),
            _ => (self.second?, self.third?),
        };
        Some(start + (end - start) * 0.5)
    }
}

/// Where and by whom a transit was observed.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSite {
    pub id: SiteId,
    pub name: String,
    pub location: GeodeticLocation,
    pub telescope: String,
    pub observer: String,
    pub contact_times: ContactTimes,
}

impl ObservationSite {
    pub fn new(
        id: impl Into<SiteId>,
        name: impl Into<String>,
        location: GeodeticLocation,
        telescope: impl Into<String>,
        observer: impl Into<String>,
    ) -> Self {
        ObservationSite {
            id: id.into(),
            name: name.into(),
            location,
            telescope: telescope.into(),
            observer: observer.into(),
            contact_times: ContactTimes::default(),
        }
    }

    pub fn with_contact_times(mut self, contact_times: ContactTimes) -> Self {
        self.contact_times = contact_times;
        self
    }
}

#[cfg(test)]
mod sites_test {
    use super::*;
    use crate::time::parse_epoch;

    #[test]
    fn test_contact_times() {
        let empty = ContactTimes::default();
        assert!(empty.is_empty());
        assert_eq!(empty.duration(), None);
        assert_eq!(empty.mid_transit(), None);

        let contacts = ContactTimes {
            first: Some(parse_epoch("1769-06-03T19:25:00 UTC").unwrap()),
            second: None,
            third: None,
            fourth: Some(parse_epoch("1769-06-04T01:25:00 UTC").unwrap()),
        };
        assert_eq!(contacts.duration().unwrap().to_seconds(), 6.0 * 3600.0);
        assert_eq!(
            contacts.mid_transit().unwrap(),
            parse_epoch("1769-06-03T22:25:00 UTC").unwrap()
        );
    }

    #[test]
    fn test_mid_transit_from_inner_contacts() {
        let contacts = ContactTimes {
            first: Some(parse_epoch("1882-12-06T13:00:00 UTC").unwrap()),
            second: Some(parse_epoch("1882-12-06T14:00:00 UTC").unwrap()),
            third: Some(parse_epoch("1882-12-06T20:00:00 UTC").unwrap()),
            fourth: None,
        };
        assert_eq!(
            contacts.mid_transit().unwrap(),
            parse_epoch("1882-12-06T17:00:00 UTC").unwrap()
        );
    }

    #[test]
    fn test_site_builder() {
        let loc = GeodeticLocation::new(59.3293, 18.0686, 20.0).unwrap();
        let site = ObservationSite::new("stockholm", "Stockholm", loc, "refractor", "Wargentin");
        assert_eq!(site.id, "stockholm");
        assert!(site.contact_times.is_empty());
    }
}
