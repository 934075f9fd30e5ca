use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::PathRejection,
        Multipart, OriginalUri, Path, State,
    },
    http::Method,
};
use database::SqliteDatabase;
use log::debug;
use model::{tour::Tour, waypoint::Waypoint, WithId};
use tours::{
    client::Client,
    uploads::AudioUpload,
    validation::{ValidationError, WaypointForm, WaypointSource},
    RequestResult,
};
use url::Url;
use utility::id::Id;

use super::tours::parse_tour_id;
use crate::{
    base_url::BaseUrl,
    common::{HateoasResult, RouteErrorResponse},
    hateoas, WebState,
};

/// `POST /tours/:tour_id/waypoints`, the location is given as coordinates.
pub(crate) async fn create_waypoint(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { tour_client }): State<WebState>,
    path: Result<Path<i64>, PathRejection>,
    base_url: BaseUrl,
    multipart: Result<Multipart, MultipartRejection>,
) -> HateoasResult<WithId<Waypoint>> {
    let tour_id = parse_tour_id(path, &Method::POST, original_uri.path())?;

    submit_waypoint(&tour_client, tour_id, WaypointSource::Coordinates, multipart)
        .await
        .map(|waypoint| waypoint_hateoas(waypoint, &base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })
}

/// `POST /tours/:tour_id/waypoints/from_home`, the location is given as an
/// address or as coordinates.
pub(crate) async fn create_waypoint_from_home(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { tour_client }): State<WebState>,
    path: Result<Path<i64>, PathRejection>,
    base_url: BaseUrl,
    multipart: Result<Multipart, MultipartRejection>,
) -> HateoasResult<WithId<Waypoint>> {
    let tour_id = parse_tour_id(path, &Method::POST, original_uri.path())?;

    submit_waypoint(&tour_client, tour_id, WaypointSource::Home, multipart)
        .await
        .map(|waypoint| waypoint_hateoas(waypoint, &base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })
}

async fn submit_waypoint(
    tour_client: &Client<SqliteDatabase>,
    tour_id: Id<Tour>,
    source: WaypointSource,
    multipart: Result<Multipart, MultipartRejection>,
) -> RequestResult<WithId<Waypoint>> {
    let form = match multipart {
        Ok(multipart) => read_form(multipart, source).await,
        Err(rejection) => Err(ValidationError::MalformedForm(rejection.body_text())),
    };

    match form {
        Ok(form) => tour_client.create_waypoint(tour_id, form).await,
        Err(why) => {
            // an unknown tour wins over a broken request body
            tour_client.ensure_tour_exists(&tour_id).await?;
            Err(why.into())
        }
    }
}

fn malformed(why: MultipartError) -> ValidationError {
    ValidationError::MalformedForm(why.body_text())
}

/// Collects the known fields of a waypoint form. Unknown fields are skipped,
/// repeated fields keep their last value.
async fn read_form(
    mut multipart: Multipart,
    source: WaypointSource,
) -> Result<WaypointForm, ValidationError> {
    let mut form = WaypointForm::new(source);

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "name" => form.name = Some(field.text().await.map_err(malformed)?),
            "address" => form.address = Some(field.text().await.map_err(malformed)?),
            "latitude" => form.latitude = Some(field.text().await.map_err(malformed)?),
            "longitude" => form.longitude = Some(field.text().await.map_err(malformed)?),
            "audio_file" => {
                let filename = field.file_name().map(str::to_owned);
                let bytes = field.bytes().await.map_err(malformed)?;
                form.audio_file =
                    filename.map(|filename| AudioUpload::new(filename, bytes.to_vec()));
            }
            other => debug!("Ignoring unknown form field '{other}'."),
        }
    }

    Ok(form)
}

pub(crate) fn waypoint_hateoas(
    waypoint: WithId<Waypoint>,
    base_url: &BaseUrl,
) -> hateoas::Response<WithId<Waypoint>> {
    let tour = super::tours::resource!("/{}", waypoint.content.tour_id);
    let audio = waypoint
        .content
        .audio_filename
        .as_deref()
        .and_then(|filename| audio_url(base_url, filename));

    hateoas::Response::builder(waypoint, base_url)
        .link("tour", tour)
        .link_extern_option("audio", audio)
        .build()
}

/// Where a stored audio file is served, with `filename` escaped as a single
/// path segment.
fn audio_url(base_url: &BaseUrl, filename: &str) -> Option<Url> {
    let mut url = Url::parse(&base_url.full_url("/uploads")).ok()?;
    url.path_segments_mut().ok()?.push(filename);
    Some(url)
}
