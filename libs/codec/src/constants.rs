//! JSON field names used on the wire

pub const FIELD_USER_ID: &str = "userId";
pub const FIELD_MSG_TYPE: &str = "msgType";
pub const FIELD_GPS_COORDINATES: &str = "gpsCoordinates";
pub const FIELD_LAT: &str = "lat";
pub const FIELD_LON: &str = "lon";
pub const FIELD_ALT: &str = "alt";
pub const FIELD_TIMESTAMP: &str = "timestamp";
/// Echoed by the controller in location acknowledgments
pub const FIELD_GPS_TIMESTAMP: &str = "gpsTimestamp";
