//! GPS fix value object
//!
//! A fix is immutable once built. Latitude and longitude are range-checked at
//! construction; the timestamp is held in UTC and compared or transmitted only
//! after truncation to whole seconds.

use chrono::{DateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use std::fmt;

use crate::errors::GpsError;

/// Latitude bounds in degrees
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Longitude bounds in degrees
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A single GPS location sample
#[derive(Debug, Clone, Copy)]
pub struct GpsFix {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    timestamp: DateTime<Utc>,
}

impl GpsFix {
    /// Create a fix, rejecting out-of-range coordinates.
    ///
    /// The timestamp may be in any time zone; it is converted to UTC here and
    /// truncated to the second whenever it is compared or put on the wire.
    pub fn new<Tz: TimeZone>(
        latitude: f64,
        longitude: f64,
        altitude: f64,
        timestamp: DateTime<Tz>,
    ) -> Result<Self, GpsError> {
        if !latitude.is_finite() || latitude < LATITUDE_RANGE.0 || latitude > LATITUDE_RANGE.1 {
            return Err(GpsError::InvalidLatitude { value: latitude });
        }
        if !longitude.is_finite() || longitude < LONGITUDE_RANGE.0 || longitude > LONGITUDE_RANGE.1
        {
            return Err(GpsError::InvalidLongitude { value: longitude });
        }
        if !altitude.is_finite() {
            return Err(GpsError::InvalidAltitude { value: altitude });
        }

        Ok(Self {
            latitude,
            longitude,
            altitude,
            timestamp: timestamp.with_timezone(&Utc),
        })
    }

    /// Create a fix stamped with the current time
    pub fn now(latitude: f64, longitude: f64, altitude: f64) -> Result<Self, GpsError> {
        Self::new(latitude, longitude, altitude, Utc::now())
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Altitude in metres
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Timestamp as supplied, converted to UTC (sub-second part preserved)
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Timestamp truncated to whole seconds, in UTC
    pub fn normalized_timestamp(&self) -> DateTime<Utc> {
        self.timestamp.trunc_subsecs(0)
    }

    /// Wire representation of the normalized timestamp, e.g. `2024-01-01T00:00:00Z`
    pub fn wire_timestamp(&self) -> String {
        format_wire_timestamp(&self.timestamp)
    }

    /// Copy of this fix with its timestamp truncated to whole seconds
    pub fn normalized(&self) -> Self {
        Self {
            timestamp: self.normalized_timestamp(),
            ..*self
        }
    }
}

/// Format a timestamp the way the protocol transmits it: UTC, second precision, `Z` suffix
pub fn format_wire_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .trunc_subsecs(0)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl PartialEq for GpsFix {
    fn eq(&self, other: &Self) -> bool {
        self.latitude == other.latitude
            && self.longitude == other.longitude
            && self.altitude == other.altitude
            && self.normalized_timestamp() == other.normalized_timestamp()
    }
}

impl fmt::Display for GpsFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lat: {}deg, Lon: {}deg, Alt: {}m, Timestamp: {}",
            self.latitude,
            self.longitude,
            self.altitude,
            self.wire_timestamp()
        )
    }
}
