use std::{error, fmt};

use model::{
    location::{Coordinates, Location},
    waypoint::{HOME_WAYPOINT, UNNAMED_WAYPOINT},
};

use crate::uploads::{is_safe_filename, AudioUpload};

/// The two ways a waypoint can be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointSource {
    /// Latitude and longitude are mandatory, an address is ignored.
    Coordinates,
    /// Either an address or both latitude and longitude have to be given.
    /// An address takes precedence over coordinates.
    Home,
}

impl WaypointSource {
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::Coordinates => UNNAMED_WAYPOINT,
            Self::Home => HOME_WAYPOINT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Neither an address nor a complete pair of coordinates was given.
    MissingLocation,
    MissingCoordinate(&'static str),
    InvalidCoordinate { field: &'static str, value: String },
    CoordinateOutOfRange(Coordinates),
    MissingAudioFile,
    InvalidFilename(String),
    MalformedForm(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MissingLocation => write!(
                f,
                "Either an address or both latitude and longitude must be provided."
            ),
            Self::MissingCoordinate(field) => write!(f, "Field '{field}' is required."),
            Self::InvalidCoordinate { field, value } => {
                write!(f, "Field '{field}' is not a number: '{value}'.")
            }
            Self::CoordinateOutOfRange(coordinates) => write!(
                f,
                "Coordinates out of range: latitude {}, longitude {}.",
                coordinates.latitude, coordinates.longitude
            ),
            Self::MissingAudioFile => write!(f, "Field 'audio_file' is required."),
            Self::InvalidFilename(name) => write!(f, "Invalid file name: '{name}'."),
            Self::MalformedForm(why) => write!(f, "Malformed form data: {why}"),
        }
    }
}

impl error::Error for ValidationError {}

/// Raw multipart fields of a waypoint creation request. Numbers are kept as
/// text until validation so that a missing tour can be reported before any
/// problem with the payload.
#[derive(Debug, Clone)]
pub struct WaypointForm {
    pub source: WaypointSource,
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub audio_file: Option<AudioUpload>,
}

/// A waypoint request which passed validation; only its location may still
/// need geocoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedWaypoint {
    pub name: String,
    pub location: Location,
    pub audio_file: AudioUpload,
}

impl WaypointForm {
    pub fn new(source: WaypointSource) -> Self {
        Self {
            source,
            name: None,
            address: None,
            latitude: None,
            longitude: None,
            audio_file: None,
        }
    }

    pub fn validate(self) -> Result<ValidatedWaypoint, ValidationError> {
        let location = self.location()?;

        let audio_file = self.audio_file.ok_or(ValidationError::MissingAudioFile)?;
        if !is_safe_filename(&audio_file.filename) {
            return Err(ValidationError::InvalidFilename(audio_file.filename));
        }

        let name = non_blank(self.name)
            .unwrap_or_else(|| self.source.default_name().to_owned());

        Ok(ValidatedWaypoint {
            name,
            location,
            audio_file,
        })
    }

    fn location(&self) -> Result<Location, ValidationError> {
        if self.source == WaypointSource::Home {
            if let Some(address) = non_blank(self.address.clone()) {
                return Ok(Location::Address(address.trim().to_owned()));
            }
        }

        let latitude = parse_coordinate("latitude", &self.latitude)?;
        let longitude = parse_coordinate("longitude", &self.longitude)?;
        let coordinates = match (latitude, longitude, self.source) {
            (Some(latitude), Some(longitude), _) => {
                Coordinates::new(latitude, longitude)
            }
            (_, _, WaypointSource::Home) => return Err(ValidationError::MissingLocation),
            (None, _, WaypointSource::Coordinates) => {
                return Err(ValidationError::MissingCoordinate("latitude"))
            }
            (_, None, WaypointSource::Coordinates) => {
                return Err(ValidationError::MissingCoordinate("longitude"))
            }
        };

        if !coordinates.is_valid() {
            return Err(ValidationError::CoordinateOutOfRange(coordinates));
        }
        Ok(Location::Coordinates(coordinates))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_coordinate(
    field: &'static str,
    value: &Option<String>,
) -> Result<Option<f64>, ValidationError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse::<f64>().map(Some).map_err(|_| {
            ValidationError::InvalidCoordinate {
                field,
                value: text.to_owned(),
            }
        }),
    }
}
