use thiserror::Error;

use crate::orbital_elements::Body;

#[derive(Error, Debug)]
pub enum TransitError {
    #[error("Unknown body identifier: {0}")]
    UnknownBody(String),

    #[error("No historical roster for transit year {0}")]
    UnknownTransitYear(i32),

    #[error("At least two distinct observation sites are required, found {found}")]
    InsufficientObservations { found: usize },

    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("Eccentricity {eccentricity} of {body} is outside [0, 1)")]
    InvalidEccentricity { body: Body, eccentricity: f64 },

    #[error("Non-finite value detected while computing {0}")]
    NonFinite(&'static str),

    #[error("Invalid epoch: {0}")]
    InvalidEpoch(String),

    #[error("Unable to read CSV table: {0}")]
    CsvError(#[from] csv::Error),

    #[error("System clock unavailable: {0}")]
    ClockUnavailable(String),
}

impl From<hifitime::HifitimeError> for TransitError {
    fn from(err: hifitime::HifitimeError) -> Self {
        TransitError::InvalidEpoch(err.to_string())
    }
}

impl PartialEq for TransitError {
    fn eq(&self, other: &Self) -> bool {
        use TransitError::*;
        match (self, other) {
            (UnknownBody(a), UnknownBody(b)) => a == b,
            (UnknownTransitYear(a), UnknownTransitYear(b)) => a == b,
            (InsufficientObservations { found: a }, InsufficientObservations { found: b }) => {
                a == b
            }
            (InputValidation(a), InputValidation(b)) => a == b,
            (
                InvalidEccentricity {
                    body: b1,
                    eccentricity: e1,
                },
                InvalidEccentricity {
                    body: b2,
                    eccentricity: e2,
                },
            ) => b1 == b2 && e1 == e2,
            (NonFinite(a), NonFinite(b)) => a == b,
            (InvalidEpoch(a), InvalidEpoch(b)) => a == b,
            (ClockUnavailable(a), ClockUnavailable(b)) => a == b,

            // csv errors are not comparable: same variant is enough
            (CsvError(_), CsvError(_)) => true,

            _ => false,
        }
    }
}
