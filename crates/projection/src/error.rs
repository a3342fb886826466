//! Projection errors.

use soc_common::{Crs, SocError};
use thiserror::Error;

/// Errors raised when a CRS cannot be turned into projection math.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProjectionError {
    /// The EPSG code is not in the definitions database.
    #[error("{0} is not in the crs-definitions database")]
    UnknownCrs(Crs),

    /// The definition exists but could not be parsed.
    #[error("invalid projection definition for {crs}: {message}")]
    InvalidDefinition { crs: Crs, message: String },
}

impl From<ProjectionError> for SocError {
    fn from(err: ProjectionError) -> Self {
        SocError::Projection(err.to_string())
    }
}

/// Result type for projection operations.
pub type ProjectionResult<T> = Result<T, ProjectionError>;
