use async_trait::async_trait;
use model::{
    tour::Tour,
    waypoint::{NewWaypoint, Waypoint, UNNAMED_WAYPOINT},
    WithId,
};
use sqlx::prelude::FromRow;
use tours::database::{Result, WaypointRepo};
use utility::id::Id;

use crate::queries::waypoint::insert;
use crate::SqliteDatabaseAutocommit;

use super::DatabaseRow;

#[derive(Debug, Clone, FromRow)]
pub struct WaypointRow {
    pub id: i64,
    // NULL for rows written before waypoints had names.
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub audio_filename: Option<String>,
    pub tour_id: i64,
}

impl DatabaseRow for WaypointRow {
    type Model = Waypoint;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Waypoint {
            name: self.name.unwrap_or_else(|| UNNAMED_WAYPOINT.to_owned()),
            latitude: self.latitude,
            longitude: self.longitude,
            audio_filename: self.audio_filename,
            tour_id: Id::new(self.tour_id),
        }
    }
}

#[async_trait]
impl WaypointRepo for SqliteDatabaseAutocommit {
    async fn insert_waypoint(
        &mut self,
        tour_id: Id<Tour>,
        waypoint: NewWaypoint,
    ) -> Result<WithId<Waypoint>> {
        insert(&self.pool, tour_id, waypoint).await
    }
}
