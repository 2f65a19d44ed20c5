//! Constraint violations raised while building protocol value types

use thiserror::Error;

/// Errors that can occur while constructing a [`GpsFix`](crate::GpsFix)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GpsError {
    /// Latitude outside [-90, 90] degrees or not finite
    #[error("Invalid latitude {value}: must be within [-90, 90] degrees")]
    InvalidLatitude { value: f64 },

    /// Longitude outside [-180, 180] degrees or not finite
    #[error("Invalid longitude {value}: must be within [-180, 180] degrees")]
    InvalidLongitude { value: f64 },

    /// Altitude is NaN or infinite
    #[error("Invalid altitude {value}: must be finite")]
    InvalidAltitude { value: f64 },
}
