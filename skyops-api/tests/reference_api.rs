use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use skyops_api::{app, AppState};
use skyops_core::auth::SharedSecretAuthorizer;
use skyops_core::ids::UuidGenerator;
use skyops_core::memory::{InMemoryFlightRepository, InMemoryReferenceRepository};
use skyops_core::{FlightScheduler, ReferenceCatalog, ReferenceService, SchedulingRules};
use skyops_shared::{Aircraft, Airline, Airport, Human, Masked};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "ramp-access";

/// Flights resolve their references against the same tables the
/// reference endpoints write to.
fn test_app() -> Router {
    let airports = Arc::new(InMemoryReferenceRepository::<Airport>::new());
    let airlines = Arc::new(InMemoryReferenceRepository::<Airline>::new());
    let aircraft = Arc::new(InMemoryReferenceRepository::<Aircraft>::new());
    let humans = Arc::new(InMemoryReferenceRepository::<Human>::new());

    let scheduler = FlightScheduler::new(
        Arc::new(InMemoryFlightRepository::new()),
        ReferenceCatalog {
            airports: airports.clone(),
            humans: humans.clone(),
            airlines: airlines.clone(),
            aircraft: aircraft.clone(),
        },
        Arc::new(UuidGenerator),
        SchedulingRules::default(),
    );

    app(AppState {
        airports: Arc::new(ReferenceService::attached_to(airports, &scheduler)),
        airlines: Arc::new(ReferenceService::attached_to(airlines, &scheduler)),
        aircraft: Arc::new(ReferenceService::attached_to(aircraft, &scheduler)),
        humans: Arc::new(ReferenceService::attached_to(humans, &scheduler)),
        scheduler: Arc::new(scheduler),
        authorizer: Arc::new(SharedSecretAuthorizer::new(Masked(SECRET.to_string()))),
    })
}

async fn send(app: &Router, method: Method, uri: &str, secret: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(secret) = secret {
        builder = builder.header("x-edit-secret", secret);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, path: &str, body: Value) -> String {
    let (status, created) = send(app, Method::POST, path, Some(SECRET), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    created["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_reference_writes_require_edit_secret() {
    let app = test_app();
    let airline = json!({ "name": "Lufthansa" });

    let (status, body) = send(&app, Method::POST, "/v1/airlines", None, Some(airline.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let id = create(&app, "/v1/airlines", airline).await;
    let uri = format!("/v1/airlines/{}", id);
    let (status, _) = send(&app, Method::DELETE, &uri, Some("guess"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, listed) = send(&app, Method::GET, "/v1/airlines", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_airport_lifecycle() {
    let app = test_app();
    let body = json!({ "icao": "eddf", "name": "Frankfurt am Main", "country": "Germany" });

    let (status, created) = send(&app, Method::POST, "/v1/airports", Some(SECRET), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["icao"], "EDDF");
    let uri = format!("/v1/airports/{}", created["id"].as_str().unwrap());

    let (status, fetched) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, duplicate) = send(&app, Method::POST, "/v1/airports", Some(SECRET), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate["error"]["code"], "airport_exists");
    assert_eq!(duplicate["error"]["details"]["icao"], "EDDF");

    let (status, deleted) = send(&app, Method::DELETE, &uri, Some(SECRET), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], created["id"]);

    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Airport not found");
}

#[tokio::test]
async fn test_invalid_reference_payloads() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/humans",
        Some(SECRET),
        Some(json!({ "first_name": "Bessie", "last_name": "Coleman", "birthdate": "26/01/1892" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_data");
    assert_eq!(body["error"]["details"]["birthdate"], "26/01/1892");

    let (status, body) = send(&app, Method::POST, "/v1/aircraft", Some(SECRET), Some(json!({ "model": "A320" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_data");

    let (status, body) = send(&app, Method::GET, "/v1/aircraft/D-AIMA", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["aircraft_id"], "D-AIMA");

    let (status, body) = send(&app, Method::GET, "/v1/humans?take=1000", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_pagination");
}

#[tokio::test]
async fn test_flights_use_created_references_and_pin_them() {
    let app = test_app();

    let origin = create(&app, "/v1/airports", json!({ "icao": "EDDF", "name": "Frankfurt", "country": "Germany" })).await;
    let destination = create(&app, "/v1/airports", json!({ "icao": "LSZH", "name": "Zurich", "country": "Switzerland" })).await;
    let airline = create(&app, "/v1/airlines", json!({ "name": "Lufthansa" })).await;
    let aircraft = create(&app, "/v1/aircraft", json!({ "registration": "d-aiqa", "model": "A320-200" })).await;
    let pilot = create(&app, "/v1/humans", json!({ "first_name": "Hanna", "last_name": "Reitsch", "birthdate": "1912-03-29" })).await;
    let copilot = create(&app, "/v1/humans", json!({ "first_name": "Elly", "last_name": "Beinhorn", "birthdate": "1907-05-30" })).await;

    let (status, flight) = send(
        &app,
        Method::POST,
        "/v1/flights",
        Some(SECRET),
        Some(json!({
            "flight_number": "LH1188",
            "departure_airport_id": origin,
            "arrival_airport_id": destination,
            "departure_time": "2024-06-01T07:00:00Z",
            "arrival_time": "2024-06-01T08:10:00Z",
            "pilot_id": pilot,
            "copilot_id": copilot,
            "airline_id": airline,
            "aircraft_id": aircraft
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", flight);

    let (status, body) = send(&app, Method::DELETE, &format!("/v1/humans/{}", copilot), Some(SECRET), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "reference_in_use");

    let (status, body) = send(&app, Method::DELETE, &format!("/v1/airports/{}", destination), Some(SECRET), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["airport_id"], destination.as_str());

    let flight_uri = format!("/v1/flights/{}", flight["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::DELETE, &flight_uri, Some(SECRET), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &format!("/v1/humans/{}", copilot), Some(SECRET), None).await;
    assert_eq!(status, StatusCode::OK);
}
