pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

pub fn is_valid_latitude(latitude: f64) -> bool {
    latitude.is_finite() && (-MAX_LATITUDE..=MAX_LATITUDE).contains(&latitude)
}

pub fn is_valid_longitude(longitude: f64) -> bool {
    longitude.is_finite() && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&longitude)
}

pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    is_valid_latitude(latitude) && is_valid_longitude(longitude)
}
