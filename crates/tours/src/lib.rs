use std::{error::Error, fmt, io};

pub mod client;
pub mod database;
pub mod geocoder;
pub mod uploads;
pub mod validation;

use geocoder::GeocodingError;
use validation::ValidationError;

#[derive(Debug)]
pub enum RequestError {
    NotFound,
    Validation(ValidationError),
    Geocoding(GeocodingError),
    Storage(io::Error),
    Other(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "The requested item does not exist."),
            Self::Validation(why) => write!(f, "{why}"),
            Self::Geocoding(why) => write!(f, "{why}"),
            Self::Storage(why) => write!(f, "Could not store uploaded file: {why}"),
            Self::Other(why) => write!(f, "{why}"),
        }
    }
}

impl Error for RequestError {}

impl From<database::DatabaseError> for RequestError {
    fn from(value: database::DatabaseError) -> Self {
        match value {
            database::DatabaseError::NotFound => Self::NotFound,
            database::DatabaseError::Other(why) => Self::Other(why),
        }
    }
}

impl From<ValidationError> for RequestError {
    fn from(why: ValidationError) -> Self {
        Self::Validation(why)
    }
}

impl From<GeocodingError> for RequestError {
    fn from(why: GeocodingError) -> Self {
        Self::Geocoding(why)
    }
}

impl From<io::Error> for RequestError {
    fn from(why: io::Error) -> Self {
        Self::Storage(why)
    }
}

pub type RequestResult<O> = Result<O, RequestError>;
