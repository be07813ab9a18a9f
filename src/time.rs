use hifitime::{Epoch, TimeScale};
use std::str::FromStr;

use crate::constants::{JulianDate, DAYS_PER_CENTURY, J2000_JD, JDTOMJD};
use crate::transit_errors::TransitError;

/// Parse a calendar instant such as `1769-06-03T22:25:00 UTC` into an [`Epoch`].
///
/// When no time scale is given, UTC is assumed.
pub fn parse_epoch(date: &str) -> Result<Epoch, TransitError> {
    Ok(Epoch::from_str(date.trim())?)
}

/// Julian Date (UTC) of an epoch.
pub fn epoch_to_jd(epoch: &Epoch) -> JulianDate {
    epoch.to_jde_utc_days()
}

/// Epoch corresponding to a Julian Date expressed in UTC.
pub fn jd_to_epoch(jd: JulianDate) -> Epoch {
    Epoch::from_jde_utc(jd)
}

/// Transformation from julian date (JD) in modified julian date (MJD)
pub fn jd_to_mjd(jd: JulianDate) -> f64 {
    jd - JDTOMJD
}

/// Transformation from modified julian date (MJD) in julian date (JD)
pub fn mjd_to_jd(mjd: f64) -> JulianDate {
    mjd + JDTOMJD
}

/// Julian centuries elapsed since J2000.0.
///
/// Arguments
/// ---------
/// * `jd`: Julian Date
///
/// Return
/// ------
/// * `T = (JD - 2451545.0) / 36525`, the time argument of the secular element polynomials
pub fn julian_centuries(jd: JulianDate) -> f64 {
    (jd - J2000_JD) / DAYS_PER_CENTURY
}

/// Transformation from date in the format YYYY MM DD.FFFFF (UTC) to julian date (JD)
///
/// Historical transit records often give contact instants as a fractional day.
///
/// Argument
/// --------
/// * `date_str`: a string representing the date in the format YYYY MM DD.FFFFF in UTC
///
/// Return
/// ------
/// * the input date as a Julian Date in UTC
pub fn frac_date_to_jd(date_str: &str) -> Result<JulianDate, TransitError> {
    let parts: Vec<&str> = date_str.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(TransitError::InvalidEpoch(format!(
            "expected YYYY MM DD.FFFFF, got '{date_str}'"
        )));
    }

    let invalid =
        |what: &str| TransitError::InvalidEpoch(format!("invalid {what} in '{date_str}'"));

    let year = i32::from_str(parts[0]).map_err(|_| invalid("year"))?;
    let month = u8::from_str(parts[1]).map_err(|_| invalid("month"))?;
    let day_fraction = f64::from_str(parts[2]).map_err(|_| invalid("fractional day"))?;
    if !(1.0..32.0).contains(&day_fraction) {
        return Err(invalid("fractional day"));
    }

    let day = day_fraction.trunc() as u8;
    let fraction = day_fraction - day as f64;

    // Midnight of the civil day, then add the fraction as a duration.
    let midnight = Epoch::maybe_from_gregorian(year, month, day, 0, 0, 0, 0, TimeScale::UTC)?;
    Ok(epoch_to_jd(&midnight) + fraction)
}

/// Source of the "current simulation time".
///
/// A time-control collaborator implements this trait to drive the engine
/// from its own clock instead of a literal instant.
pub trait SimulationClock {
    fn current_epoch(&self) -> Result<Epoch, TransitError>;
}

/// A clock frozen on a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub Epoch);

impl SimulationClock for FixedClock {
    fn current_epoch(&self) -> Result<Epoch, TransitError> {
        Ok(self.0)
    }
}

/// The host system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SimulationClock for SystemClock {
    fn current_epoch(&self) -> Result<Epoch, TransitError> {
        Epoch::now().map_err(|err| TransitError::ClockUnavailable(err.to_string()))
    }
}
