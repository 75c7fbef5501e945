//! Filter parsing errors.

use thiserror::Error;

/// Why a single filter could not be built from request parameters.
///
/// These never reach the user: filter sets log them and drop the filter.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("missing parameter(s): {0}")]
    MissingParameter(String),

    #[error("could not parse {name}={value:?} as a number")]
    InvalidNumber { name: String, value: String },

    #[error("could not parse {name}={value:?} as a YYYY-MM-DD date")]
    InvalidDate { name: String, value: String },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("{name}={value:?} is not a valid identifier")]
    InvalidIdentifier { name: String, value: String },

    #[error("invalid JSON filter payload: {0}")]
    InvalidJson(String),
}
