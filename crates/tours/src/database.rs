use std::{error, fmt, result};

use async_trait::async_trait;
use model::{
    tour::{NewTour, Tour},
    waypoint::{NewWaypoint, Waypoint},
    WithId,
};
use utility::id::Id;

#[derive(Debug)]
pub enum DatabaseError {
    NotFound,
    Other(Box<dyn error::Error + Send + Sync>),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "Row not found."),
            Self::Other(why) => write!(f, "Database error: {why}"),
        }
    }
}

impl error::Error for DatabaseError {}

pub type Result<T> = result::Result<T, DatabaseError>;

/// A handle to the store which hands out connections on demand.
///
/// Implementations are expected to be cheap to clone (a pool handle), so one
/// instance can be created at startup and shared by every request.
pub trait Database: Clone + Send + Sync + Sized + 'static {
    type Autocommit: TourRepo + WaypointRepo + Send;

    fn auto(&self) -> Self::Autocommit;
}

#[async_trait]
pub trait TourRepo {
    /// Returns the tour with all of its waypoints.
    async fn get_tour(&mut self, id: Id<Tour>) -> Result<WithId<Tour>>;

    /// Returns a page of tours in insertion order, each with its waypoints.
    async fn get_tours(&mut self, skip: u32, limit: u32) -> Result<Vec<WithId<Tour>>>;

    async fn insert_tour(&mut self, tour: NewTour) -> Result<WithId<Tour>>;

    async fn tour_exists(&mut self, id: Id<Tour>) -> Result<bool>;
}

#[async_trait]
pub trait WaypointRepo {
    /// Inserts a waypoint below `tour_id`. Whether the tour exists is not
    /// checked here.
    async fn insert_waypoint(
        &mut self,
        tour_id: Id<Tour>,
        waypoint: NewWaypoint,
    ) -> Result<WithId<Waypoint>>;
}
