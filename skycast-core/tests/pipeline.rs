//! End-to-end pipeline tests: pinned coordinate -> mocked weatherapi.com
//! endpoint -> session state -> derived queries.

use std::sync::Arc;

use skycast_core::{
    Coordinate, ErrorKind, PinnedLocation, QueryError, SessionState, WeatherApi, WeatherSession,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("fixtures/forecast_3day.json");

fn fixture_value() -> serde_json::Value {
    serde_json::from_str(FIXTURE).expect("fixture parses")
}

fn session_against(server: &MockServer) -> WeatherSession {
    let location = PinnedLocation::new(Coordinate { lat: 37.7749, lon: -122.4194 });
    let provider = WeatherApi::with_base_url("TESTKEY".into(), server.uri());
    WeatherSession::new(Arc::new(location), Arc::new(provider))
}

#[tokio::test]
async fn loads_and_answers_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("key", "TESTKEY"))
        .and(query_param("q", "37.7749,-122.4194"))
        .and(query_param("days", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture_value()))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_against(&server);
    session.start();

    let state = session.settled().await;
    assert!(matches!(state, SessionState::Loaded(_)));

    let current = session.current().expect("loaded");
    assert_eq!(current.temp_c, 18.5);
    assert_eq!(current.condition.text, "Partly cloudy");

    let rows = session.three_day_rows().expect("loaded");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].label, "Today");
    assert_eq!(rows[0].max_c, 22.0);
    assert_eq!(rows[0].min_c, 14.0);

    let hours = session.hourly(0).expect("loaded");
    assert_eq!(hours.len(), 3);
    assert_eq!(session.hourly(3).unwrap_err(), QueryError::DayOutOfRange(3));
}

#[tokio::test]
async fn missing_field_surfaces_as_decode_failure() {
    let server = MockServer::start().await;
    let mut body = fixture_value();
    body["current"]
        .as_object_mut()
        .expect("current object")
        .remove("temp_c");

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let session = session_against(&server);
    session.start();

    let state = session.settled().await;
    assert!(matches!(state, SessionState::Failed(ErrorKind::Decode(_))));
    // The session never pretends to be loaded with defaulted values.
    assert_eq!(session.current().unwrap_err(), QueryError::NotReady);
}

#[tokio::test]
async fn server_error_surfaces_with_its_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = session_against(&server);
    session.start();

    let state = session.settled().await;
    assert_eq!(state, SessionState::Failed(ErrorKind::Http(500)));
}

#[tokio::test]
async fn a_new_start_refetches_from_scratch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture_value()))
        .expect(2)
        .mount(&server)
        .await;

    let session = session_against(&server);
    session.start();
    assert!(matches!(session.settled().await, SessionState::Loaded(_)));

    session.start();
    assert!(matches!(session.settled().await, SessionState::Loaded(_)));
}
