use async_trait::async_trait;
use log::debug;
use model::location::Coordinates;
use serde::Deserialize;
use tours::geocoder::{Geocoder, GeocodingError};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "tour-app-server";

#[derive(Debug, thiserror::Error)]
pub enum NominatimError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid Response ({status_code}) {url}")]
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
    },
    #[error("Invalid coordinate in response: '{0}'")]
    InvalidCoordinate(String),
}

/// One entry of a nominatim search result. Coordinates are sent as strings.
#[derive(Debug, Clone, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl Place {
    fn coordinates(&self) -> Result<Coordinates, NominatimError> {
        let latitude = self
            .lat
            .trim()
            .parse()
            .map_err(|_| NominatimError::InvalidCoordinate(self.lat.clone()))?;
        let longitude = self
            .lon
            .trim()
            .parse()
            .map_err(|_| NominatimError::InvalidCoordinate(self.lon.clone()))?;
        let coordinates = Coordinates::new(latitude, longitude);
        if !coordinates.is_valid() {
            return Err(NominatimError::InvalidCoordinate(format!(
                "{}, {}",
                self.lat, self.lon
            )));
        }
        Ok(coordinates)
    }
}

/// Geocoder backed by the search endpoint of a nominatim instance.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new<U, A>(base_url: U, user_agent: A) -> Result<Self, NominatimError>
    where
        U: Into<String>,
        A: AsRef<str>,
    {
        // nominatim's usage policy requires an identifying user agent
        let client = reqwest::Client::builder()
            .user_agent(user_agent.as_ref())
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Returns the best match for `address`, if nominatim knows one.
    pub async fn search(&self, address: &str) -> Result<Option<Coordinates>, NominatimError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NominatimError::InvalidResponse {
                status_code: response.status(),
                url,
            });
        }

        let places: Vec<Place> = response.json().await?;
        match places.first() {
            Some(place) => {
                debug!(
                    "Resolved '{}' to '{}'.",
                    address,
                    place.display_name.as_deref().unwrap_or("?")
                );
                place.coordinates().map(Some)
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodingError> {
        match self.search(address).await {
            Ok(Some(coordinates)) => Ok(coordinates),
            Ok(None) => Err(GeocodingError::NotFound(address.to_owned())),
            Err(why) => Err(GeocodingError::Unavailable(why.to_string())),
        }
    }
}
