use std::{error, fmt};

use async_trait::async_trait;
use model::location::Coordinates;

#[derive(Debug, Clone, PartialEq)]
pub enum GeocodingError {
    /// The service answered, but knows no place matching the address.
    NotFound(String),
    /// The service could not be reached or gave an unusable answer.
    Unavailable(String),
}

impl fmt::Display for GeocodingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotFound(address) => {
                write!(f, "Could not find coordinates for address: {address}")
            }
            Self::Unavailable(why) => write!(f, "Geocoding service error: {why}"),
        }
    }
}

impl error::Error for GeocodingError {}

/// Resolves free-text addresses into coordinates. Every call is a single
/// attempt; retrying is up to the caller.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodingError>;
}
