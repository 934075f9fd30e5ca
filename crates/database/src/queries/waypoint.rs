use model::{
    tour::Tour,
    waypoint::{NewWaypoint, Waypoint},
    WithId,
};
use sqlx::{Executor, Sqlite};
use tours::database::Result;
use utility::id::Id;

use crate::data_model::{waypoint::WaypointRow, with_id};

use super::convert_error;

/// The tour is not checked; with foreign keys enabled a missing tour makes
/// the insert fail.
pub async fn insert<'c, E>(
    executor: E,
    tour_id: Id<Tour>,
    waypoint: NewWaypoint,
) -> Result<WithId<Waypoint>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        INSERT INTO waypoints(
            name,
            latitude,
            longitude,
            audio_filename,
            tour_id
        )
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, name, latitude, longitude, audio_filename, tour_id;
        ",
    )
    .bind(&waypoint.name)
    .bind(waypoint.coordinates.latitude)
    .bind(waypoint.coordinates.longitude)
    .bind(&waypoint.audio_filename)
    .bind(tour_id.raw())
    .fetch_one(executor)
    .await
    .map(|row: WaypointRow| with_id(row))
    .map_err(convert_error)
}
