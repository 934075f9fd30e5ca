use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        DefaultBodyLimit, OriginalUri, Path, Query, State,
    },
    http::{Method, StatusCode},
    routing::{get, on, post},
    Json, Router,
};
use model::{
    tour::{NewTour, Tour},
    waypoint::Waypoint,
    WithId,
};
use serde::Deserialize;
use tours::client::DEFAULT_PAGE_SIZE;
use utility::{id::Id, let_also::LetAlso};

use super::waypoints;
use crate::{
    base_url::BaseUrl,
    common::{
        route_not_found, schema, HateoasResult, RouteErrorResponse, RouteResult,
        METHOD_FILTER_ALL,
    },
    hateoas, WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        format!("/tours{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes(state: WebState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(get_tours).post(create_tour))
        .route("/schema", get(schema::<WithId<Tour>>))
        .route("/:tour_id", get(get_tour))
        .route("/:tour_id/waypoints", post(waypoints::create_waypoint))
        .route(
            "/:tour_id/waypoints/from_home",
            post(waypoints::create_waypoint_from_home),
        )
        .route("/waypoints/schema", get(schema::<WithId<Waypoint>>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
pub(crate) struct TourListQuery {
    #[serde(default)]
    skip: u32,

    #[serde(default = "default_page_size")]
    limit: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

async fn get_tours(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { tour_client }): State<WebState>,
    base_url: BaseUrl,
    query: Result<Query<TourListQuery>, QueryRejection>,
) -> RouteResult<Json<Vec<hateoas::Response<WithId<Tour>>>>> {
    let Query(params) = query.map_err(|rejection| {
        RouteErrorResponse::new(rejection.status())
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
            .with_message(rejection.body_text())
    })?;

    tour_client
        .get_tours(params.skip, params.limit)
        .await
        .map(|tours| {
            tours
                .into_iter()
                .map(|tour| tour_hateoas(tour, &base_url))
                .collect::<Vec<_>>()
                .let_owned(Json)
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn get_tour(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { tour_client }): State<WebState>,
    path: Result<Path<i64>, PathRejection>,
    base_url: BaseUrl,
) -> HateoasResult<WithId<Tour>> {
    let tour_id = parse_tour_id(path, &Method::GET, original_uri.path())?;

    tour_client
        .get_tour(tour_id)
        .await
        .map(|tour| tour_hateoas(tour, &base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn create_tour(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { tour_client }): State<WebState>,
    base_url: BaseUrl,
    payload: Result<Json<NewTour>, JsonRejection>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<WithId<Tour>>>)> {
    let Json(tour) = payload.map_err(|rejection| {
        RouteErrorResponse::new(rejection.status())
            .with_method(&Method::POST)
            .with_uri(original_uri.path())
            .with_message(rejection.body_text())
    })?;

    tour_client
        .create_tour(tour)
        .await
        .map(|tour| (StatusCode::CREATED, tour_hateoas(tour, &base_url).json()))
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
                .with_message("Could not create tour.")
        })
}

/// The `:tour_id` path parameter. A non-numeric id is answered like every
/// other malformed request.
pub(crate) fn parse_tour_id(
    path: Result<Path<i64>, PathRejection>,
    method: &Method,
    uri: &str,
) -> RouteResult<Id<Tour>> {
    path.map(|Path(tour_id)| Id::new(tour_id))
        .map_err(|rejection| {
            RouteErrorResponse::new(rejection.status())
                .with_method(method)
                .with_uri(uri)
                .with_message(rejection.body_text())
        })
}

pub(crate) fn tour_hateoas(
    tour: WithId<Tour>,
    base_url: &BaseUrl,
) -> hateoas::Response<WithId<Tour>> {
    let id = tour.id;
    hateoas::Response::builder(tour, base_url)
        .link("self", resource!("/{}", id))
        .build()
}
