use std::sync::Arc;

use log::{debug, error, info, warn};
use model::{
    location::{Coordinates, Location},
    tour::{NewTour, Tour},
    waypoint::{NewWaypoint, Waypoint},
    WithId,
};
use utility::id::Id;

use crate::{
    database::{Database, TourRepo, WaypointRepo},
    geocoder::{Geocoder, GeocodingError},
    uploads::UploadStore,
    validation::WaypointForm,
    RequestError, RequestResult,
};

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Entry point for everything the API can do with tours and waypoints.
#[derive(Clone)]
pub struct Client<D>
where
    D: Database,
{
    pub database: D,
    geocoder: Arc<dyn Geocoder>,
    uploads: UploadStore,
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new(database: D, geocoder: Arc<dyn Geocoder>, uploads: UploadStore) -> Self {
        Self {
            database,
            geocoder,
            uploads,
        }
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    pub async fn get_tour(&self, id: Id<Tour>) -> RequestResult<WithId<Tour>> {
        Ok(self.database.auto().get_tour(id).await?)
    }

    pub async fn get_tours(&self, skip: u32, limit: u32) -> RequestResult<Vec<WithId<Tour>>> {
        Ok(self.database.auto().get_tours(skip, limit).await?)
    }

    pub async fn create_tour(&self, tour: NewTour) -> RequestResult<WithId<Tour>> {
        let tour = self.database.auto().insert_tour(tour).await?;
        info!("Created tour {} '{}'.", tour.id, tour.content.name);
        Ok(tour)
    }

    pub async fn ensure_tour_exists(&self, id: &Id<Tour>) -> RequestResult<()> {
        if self.database.auto().tour_exists(*id).await? {
            Ok(())
        } else {
            Err(RequestError::NotFound)
        }
    }

    /// Creates a waypoint from a submitted form.
    ///
    /// The tour is checked first, so a missing tour is reported even for an
    /// invalid form. An address is geocoded and replaces any coordinates sent
    /// along with it. The audio file is written before the row is inserted and
    /// is left behind if the insert fails.
    pub async fn create_waypoint(
        &self,
        tour_id: Id<Tour>,
        form: WaypointForm,
    ) -> RequestResult<WithId<Waypoint>> {
        self.ensure_tour_exists(&tour_id).await?;

        let waypoint = form.validate()?;
        let coordinates = self.resolve(waypoint.location).await?;

        let audio_filename = self
            .uploads
            .store(&waypoint.audio_file)
            .await
            .inspect_err(|why| {
                error!(
                    "Could not store audio file '{}': {}",
                    waypoint.audio_file.filename, why
                )
            })?;

        let waypoint = self
            .database
            .auto()
            .insert_waypoint(
                tour_id,
                NewWaypoint {
                    name: waypoint.name,
                    coordinates,
                    audio_filename,
                },
            )
            .await
            .inspect_err(|why| error!("Could not insert waypoint: {why}"))?;

        info!(
            "Created waypoint {} '{}' in tour {}.",
            waypoint.id, waypoint.content.name, tour_id
        );
        Ok(waypoint)
    }

    async fn resolve(&self, location: Location) -> RequestResult<Coordinates> {
        match location {
            Location::Coordinates(coordinates) => Ok(coordinates),
            Location::Address(address) => {
                debug!("Geocoding address '{address}'.");
                self.geocoder
                    .geocode(&address)
                    .await
                    .and_then(|coordinates| {
                        if coordinates.is_valid() {
                            Ok(coordinates)
                        } else {
                            Err(GeocodingError::Unavailable(format!(
                                "geocoder returned invalid coordinates {}, {} for '{}'",
                                coordinates.latitude, coordinates.longitude, address
                            )))
                        }
                    })
                    .inspect_err(|why| warn!("{why}"))
                    .map_err(RequestError::from)
            }
        }
    }
}
