//! Integration tests driving the full router against an in-memory database,
//! a stub geocoder and a temporary upload directory.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use database::SqliteDatabase;
use model::location::Coordinates;
use serde_json::{json, Value};
use tempfile::TempDir;
use tours::{
    client::Client,
    geocoder::{Geocoder, GeocodingError},
    uploads::UploadStore,
};
use tower::util::ServiceExt; // for `oneshot`
use web::{router, WebState};

const BOUNDARY: &str = "----tour-test-boundary";
const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// Answers from a fixed table, every other address is unknown.
#[derive(Default)]
struct StubGeocoder {
    answers: HashMap<&'static str, Result<Coordinates, GeocodingError>>,
}

impl StubGeocoder {
    fn answer(
        mut self,
        address: &'static str,
        result: Result<Coordinates, GeocodingError>,
    ) -> Self {
        self.answers.insert(address, result);
        self
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodingError> {
        self.answers
            .get(address)
            .cloned()
            .unwrap_or_else(|| Err(GeocodingError::NotFound(address.to_owned())))
    }
}

/// The router plus the upload directory it writes to. The directory lives as
/// long as the test app.
struct TestApp {
    router: Router,
    uploads: TempDir,
}

impl TestApp {
    async fn new(geocoder: StubGeocoder) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let database = SqliteDatabase::in_memory().await.unwrap();
        let state = WebState {
            tour_client: Client::new(
                database,
                Arc::new(geocoder),
                UploadStore::new(uploads.path()),
            ),
        };

        Self {
            router: router(state, MAX_UPLOAD_BYTES),
            uploads,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn create_tour(&self, name: &str, description: &str) -> Value {
        let (status, body) = self
            .send(json_request(
                "/tours",
                json!({ "name": name, "description": description }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a `multipart/form-data` request from text fields and an optional
/// `audio_file` upload.
fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    audio_file: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = audio_file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"audio_file\"; \
                 filename=\"{filename}\"\r\nContent-Type: audio/mpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// - General routes -

#[tokio::test]
async fn root_and_ping_answer() {
    let app = TestApp::new(StubGeocoder::default()).await;

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Welcome to the Tour App API" }));

    let (status, body) = app.get("/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "pong!");
}

#[tokio::test]
async fn unknown_route_is_a_json_not_found() {
    let app = TestApp::new(StubGeocoder::default()).await;

    let (status, body) = app.get("/routes/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["httpMethod"], "GET");
    assert_eq!(body["requestedUri"], "/routes/nowhere");
}

#[tokio::test]
async fn schemas_are_served() {
    let app = TestApp::new(StubGeocoder::default()).await;

    let (status, body) = app.get("/tours/schema").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["properties"]["waypoints"].is_object());

    let (status, body) = app.get("/tours/waypoints/schema?exampleData=true").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["properties"]["audio_filename"].is_object());
}

// - Tours -

#[tokio::test]
async fn created_tour_can_be_fetched() {
    let app = TestApp::new(StubGeocoder::default()).await;

    let created = app.create_tour("Old Town", "Churches and markets").await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "Old Town");
    assert_eq!(created["waypoints"], json!([]));
    assert_eq!(created["links"][0]["rel"], "self");
    assert_eq!(
        created["links"][0]["href"],
        format!("http://localhost/tours/{id}")
    );

    let (status, fetched) = app.get(&format!("/tours/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id);
    assert_eq!(fetched["name"], "Old Town");
    assert_eq!(fetched["description"], "Churches and markets");
    assert_eq!(fetched["waypoints"], json!([]));
}

#[tokio::test]
async fn missing_tour_is_not_found() {
    let app = TestApp::new(StubGeocoder::default()).await;

    let (status, body) = app.get("/tours/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Tour not found.");
}

#[tokio::test]
async fn incomplete_tour_payload_is_rejected() {
    let app = TestApp::new(StubGeocoder::default()).await;

    let (status, body) = app
        .send(json_request("/tours", json!({ "name": "No description" })))
        .await;
    assert!(status.is_client_error());
    assert_eq!(body["httpMethod"], "POST");
}

#[tokio::test]
async fn tours_are_listed_page_by_page() {
    let app = TestApp::new(StubGeocoder::default()).await;
    for name in ["first", "second", "third"] {
        app.create_tour(name, "").await;
    }

    let (status, page) = app.get("/tours?skip=1&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["name"], "second");

    let (_, all) = app.get("/tours").await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (status, _) = app.get("/tours?skip=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/tours?limit=many").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// - Waypoints -

#[tokio::test]
async fn waypoint_with_coordinates_is_created_and_served() {
    let app = TestApp::new(StubGeocoder::default()).await;
    let tour_id = app.create_tour("Harbour", "").await["id"].as_i64().unwrap();

    let (status, waypoint) = app
        .send(multipart_request(
            &format!("/tours/{tour_id}/waypoints"),
            &[
                ("name", "Pier"),
                ("latitude", "54.3227"),
                ("longitude", "10.1357"),
            ],
            Some(("pier.mp3", b"ID3 narration")),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(waypoint["tour_id"], tour_id);
    assert_eq!(waypoint["name"], "Pier");
    assert_eq!(waypoint["latitude"], 54.3227);
    assert_eq!(waypoint["longitude"], 10.1357);
    assert_eq!(waypoint["audio_filename"], "pier.mp3");
    assert_eq!(
        waypoint["links"],
        json!([
            { "rel": "tour", "href": format!("http://localhost/tours/{tour_id}") },
            { "rel": "audio", "href": "http://localhost/uploads/pier.mp3" }
        ])
    );
    assert_eq!(
        std::fs::read(app.uploads.path().join("pier.mp3")).unwrap(),
        b"ID3 narration"
    );

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/uploads/pier.mp3").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ID3 narration");

    let (_, tour) = app.get(&format!("/tours/{tour_id}")).await;
    assert_eq!(tour["waypoints"].as_array().unwrap().len(), 1);
    assert_eq!(tour["waypoints"][0]["name"], "Pier");
    assert!(tour["waypoints"][0].get("links").is_none());
}

#[tokio::test]
async fn unnamed_waypoint_gets_default_name() {
    let app = TestApp::new(StubGeocoder::default()).await;
    let tour_id = app.create_tour("Harbour", "").await["id"].as_i64().unwrap();

    let (status, waypoint) = app
        .send(multipart_request(
            &format!("/tours/{tour_id}/waypoints"),
            &[("latitude", "1"), ("longitude", "2")],
            Some(("a.mp3", b"a")),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(waypoint["name"], "Unnamed Waypoint");
}

#[tokio::test]
async fn waypoint_for_missing_tour_is_not_found_regardless_of_payload() {
    let app = TestApp::new(StubGeocoder::default()).await;

    let requests = [
        multipart_request(
            "/tours/404/waypoints",
            &[("latitude", "1"), ("longitude", "2")],
            Some(("a.mp3", b"a")),
        ),
        multipart_request("/tours/404/waypoints", &[], None),
        multipart_request("/tours/404/waypoints/from_home", &[("name", "x")], None),
        json_request("/tours/404/waypoints/from_home", json!({ "address": "Kiel" })),
    ];

    for request in requests {
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Tour not found.");
    }
    assert!(!app.uploads.path().join("a.mp3").exists());
}

#[tokio::test]
async fn invalid_waypoint_payloads_are_bad_requests() {
    let app = TestApp::new(StubGeocoder::default()).await;
    let tour_id = app.create_tour("Harbour", "").await["id"].as_i64().unwrap();
    let uri = format!("/tours/{tour_id}/waypoints");

    let cases = [
        multipart_request(&uri, &[("latitude", "1")], Some(("a.mp3", b"a"))),
        multipart_request(&uri, &[("latitude", "1"), ("longitude", "2")], None),
        multipart_request(
            &uri,
            &[("latitude", "north"), ("longitude", "2")],
            Some(("a.mp3", b"a")),
        ),
        multipart_request(
            &uri,
            &[("latitude", "91"), ("longitude", "2")],
            Some(("a.mp3", b"a")),
        ),
        multipart_request(
            &uri,
            &[("latitude", "1"), ("longitude", "2")],
            Some(("../escape.mp3", b"a")),
        ),
        json_request(&uri, json!({ "latitude": 1, "longitude": 2 })),
    ];

    for request in cases {
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }

    let (_, tour) = app.get(&format!("/tours/{tour_id}")).await;
    assert_eq!(tour["waypoints"], json!([]));
}

#[tokio::test]
async fn geocoded_address_overrides_supplied_coordinates() {
    let geocoder = StubGeocoder::default().answer(
        "Holstenstraße 1, Kiel",
        Ok(Coordinates::new(54.3213, 10.1349)),
    );
    let app = TestApp::new(geocoder).await;
    let tour_id = app.create_tour("Home", "").await["id"].as_i64().unwrap();

    let (status, waypoint) = app
        .send(multipart_request(
            &format!("/tours/{tour_id}/waypoints/from_home"),
            &[
                ("address", "Holstenstraße 1, Kiel"),
                ("latitude", "1.0"),
                ("longitude", "2.0"),
            ],
            Some(("home.mp3", b"home")),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(waypoint["name"], "Home");
    assert_eq!(waypoint["latitude"], 54.3213);
    assert_eq!(waypoint["longitude"], 10.1349);
    assert_eq!(waypoint["tour_id"], tour_id);
}

#[tokio::test]
async fn home_waypoint_accepts_coordinates_without_address() {
    let app = TestApp::new(StubGeocoder::default()).await;
    let tour_id = app.create_tour("Home", "").await["id"].as_i64().unwrap();

    let (status, waypoint) = app
        .send(multipart_request(
            &format!("/tours/{tour_id}/waypoints/from_home"),
            &[("name", "Garden"), ("latitude", "54.0"), ("longitude", "10.0")],
            Some(("garden.mp3", b"garden")),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(waypoint["name"], "Garden");
    assert_eq!(waypoint["latitude"], 54.0);
}

#[tokio::test]
async fn home_waypoint_without_location_is_a_bad_request() {
    let app = TestApp::new(StubGeocoder::default()).await;
    let tour_id = app.create_tour("Home", "").await["id"].as_i64().unwrap();

    let (status, body) = app
        .send(multipart_request(
            &format!("/tours/{tour_id}/waypoints/from_home"),
            &[("latitude", "54.0")],
            Some(("home.mp3", b"home")),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Either an address or both latitude and longitude must be provided."
    );
    assert!(!app.uploads.path().join("home.mp3").exists());
}

#[tokio::test]
async fn geocoding_failures_are_reported() {
    let geocoder = StubGeocoder::default().answer(
        "Kiel",
        Err(GeocodingError::Unavailable("connection refused".to_owned())),
    );
    let app = TestApp::new(geocoder).await;
    let tour_id = app.create_tour("Home", "").await["id"].as_i64().unwrap();
    let uri = format!("/tours/{tour_id}/waypoints/from_home");

    let (status, body) = app
        .send(multipart_request(
            &uri,
            &[("address", "Atlantis")],
            Some(("home.mp3", b"home")),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Could not find coordinates for address: Atlantis"
    );

    let (status, _) = app
        .send(multipart_request(
            &uri,
            &[("address", "Kiel")],
            Some(("home.mp3", b"home")),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    assert!(!app.uploads.path().join("home.mp3").exists());
}

#[tokio::test]
async fn invalid_geocoder_coordinates_are_not_stored() {
    let geocoder = StubGeocoder::default().answer("Kiel", Ok(Coordinates::new(f64::NAN, 10.0)));
    let app = TestApp::new(geocoder).await;
    let tour_id = app.create_tour("Home", "").await["id"].as_i64().unwrap();

    let (status, body) = app
        .send(multipart_request(
            &format!("/tours/{tour_id}/waypoints/from_home"),
            &[("address", "Kiel")],
            Some(("home.mp3", b"home")),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{body}");

    let (_, tour) = app.get(&format!("/tours/{tour_id}")).await;
    assert_eq!(tour["waypoints"], json!([]));
    assert!(!app.uploads.path().join("home.mp3").exists());
}

#[tokio::test]
async fn audio_link_of_an_unusual_file_name_is_served() {
    let app = TestApp::new(StubGeocoder::default()).await;
    let tour_id = app.create_tour("Harbour", "").await["id"].as_i64().unwrap();

    let (status, waypoint) = app
        .send(multipart_request(
            &format!("/tours/{tour_id}/waypoints"),
            &[("latitude", "54.3"), ("longitude", "10.1")],
            Some(("what?.mp3", b"question")),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(waypoint["audio_filename"], "what?.mp3");
    assert_eq!(
        waypoint["links"][1],
        json!({ "rel": "audio", "href": "http://localhost/uploads/what%3F.mp3" })
    );

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/uploads/what%3F.mp3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"question");
}

#[tokio::test]
async fn non_numeric_tour_id_is_a_json_bad_request() {
    let app = TestApp::new(StubGeocoder::default()).await;

    let (status, body) = app.get("/tours/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["httpMethod"], "GET");
    assert_eq!(body["requestedUri"], "/tours/abc");
    assert!(body["message"].is_string());

    for uri in ["/tours/abc/waypoints", "/tours/abc/waypoints/from_home"] {
        let (status, body) = app
            .send(multipart_request(
                uri,
                &[("latitude", "1"), ("longitude", "2")],
                Some(("a.mp3", b"a")),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["httpMethod"], "POST");
        assert_eq!(body["requestedUri"], uri);
    }
    assert!(!app.uploads.path().join("a.mp3").exists());
}
