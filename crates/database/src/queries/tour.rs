use std::collections::HashMap;

use model::{
    tour::{NewTour, Tour},
    waypoint::Waypoint,
    WithId,
};
use sqlx::{Acquire, Executor, Sqlite};
use tours::database::Result;
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{tour::TourRow, waypoint::WaypointRow, with_id, with_ids};

use super::convert_error;

pub async fn get<'c, A>(connection: A, id: Id<Tour>) -> Result<WithId<Tour>>
where
    A: Acquire<'c, Database = Sqlite>,
{
    let mut connection = connection.acquire().await.map_err(convert_error)?;

    let tour: TourRow = sqlx::query_as(
        "
        SELECT id, name, description
        FROM tours
        WHERE id = ?;
        ",
    )
    .bind(id.raw())
    .fetch_one(&mut *connection)
    .await
    .map_err(convert_error)?;

    let waypoints: Vec<WaypointRow> = sqlx::query_as(
        "
        SELECT id, name, latitude, longitude, audio_filename, tour_id
        FROM waypoints
        WHERE tour_id = ?
        ORDER BY id;
        ",
    )
    .bind(id.raw())
    .fetch_all(&mut *connection)
    .await
    .map_err(convert_error)?;

    let mut tour = with_id(tour);
    tour.content.waypoints = with_ids(waypoints);
    Ok(tour)
}

/// Fetches one page of tours together with the waypoints of exactly those
/// tours, using one query for each table.
pub async fn get_page<'c, A>(
    connection: A,
    skip: u32,
    limit: u32,
) -> Result<Vec<WithId<Tour>>>
where
    A: Acquire<'c, Database = Sqlite>,
{
    let mut connection = connection.acquire().await.map_err(convert_error)?;

    let tours: Vec<TourRow> = sqlx::query_as(
        "
        SELECT id, name, description
        FROM tours
        ORDER BY id
        LIMIT ? OFFSET ?;
        ",
    )
    .bind(i64::from(limit))
    .bind(i64::from(skip))
    .fetch_all(&mut *connection)
    .await
    .map_err(convert_error)?;

    if tours.is_empty() {
        return Ok(vec![]);
    }

    let waypoints: Vec<WaypointRow> = sqlx::query_as(
        "
        SELECT id, name, latitude, longitude, audio_filename, tour_id
        FROM waypoints
        WHERE tour_id IN (
            SELECT id FROM tours ORDER BY id LIMIT ? OFFSET ?
        )
        ORDER BY id;
        ",
    )
    .bind(i64::from(limit))
    .bind(i64::from(skip))
    .fetch_all(&mut *connection)
    .await
    .map_err(convert_error)?;

    let mut by_tour: HashMap<i64, Vec<WithId<Waypoint>>> = HashMap::new();
    for waypoint in waypoints {
        by_tour
            .entry(waypoint.tour_id)
            .or_default()
            .push(with_id(waypoint));
    }

    tours
        .into_iter()
        .map(|tour| {
            let waypoints = by_tour.remove(&tour.id).unwrap_or_default();
            with_id(tour).also(|tour| tour.content.waypoints = waypoints)
        })
        .collect::<Vec<_>>()
        .let_owned(Ok)
}

pub async fn insert<'c, E>(executor: E, tour: NewTour) -> Result<WithId<Tour>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        INSERT INTO tours(
            name,
            description
        )
        VALUES (?, ?)
        RETURNING id, name, description;
        ",
    )
    .bind(&tour.name)
    .bind(&tour.description)
    .fetch_one(executor)
    .await
    .map(|row: TourRow| with_id(row))
    .map_err(convert_error)
}

pub async fn exists<'c, E>(executor: E, id: Id<Tour>) -> Result<bool>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tours WHERE id = ?);")
        .bind(id.raw())
        .fetch_one(executor)
        .await
        .map(|found: i64| found != 0)
        .map_err(convert_error)
}
