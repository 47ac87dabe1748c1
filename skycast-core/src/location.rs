//! Single-shot location capability.
//!
//! A [`LocationSource`] yields exactly one coordinate (or one failure) per
//! request, then goes idle until asked again. Sources never hand back a fix
//! obtained before the request was issued.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{error::LocationError, model::Coordinate};

/// "Give me a current coordinate once."
#[async_trait]
pub trait LocationSource: Send + Sync + std::fmt::Debug {
    async fn request_once(&self) -> Result<Coordinate, LocationError>;
}

/// A fixed coordinate, for callers that already know where they are
/// (CLI flags, a configured fallback, tests).
#[derive(Debug, Clone)]
pub struct PinnedLocation {
    coordinate: Coordinate,
}

impl PinnedLocation {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationSource for PinnedLocation {
    async fn request_once(&self) -> Result<Coordinate, LocationError> {
        Ok(self.coordinate)
    }
}

const IP_LOOKUP_URL: &str = "http://ip-api.com/json";
const LOOKUP_WAIT: Duration = Duration::from_secs(10);

/// Coordinate via IP geolocation. Each request performs a fresh lookup and
/// enforces its own bounded wait.
#[derive(Debug, Clone)]
pub struct IpLocation {
    http: Client,
    base_url: String,
    wait: Duration,
}

impl IpLocation {
    pub fn new() -> Self {
        Self::with_base_url(IP_LOOKUP_URL)
    }

    /// Point the lookup at a different endpoint (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            wait: LOOKUP_WAIT,
        }
    }

    async fn lookup(&self) -> Result<Coordinate, LocationError> {
        let res = self.http.get(&self.base_url).send().await.map_err(|err| {
            tracing::debug!("ip lookup request failed: {err}");
            LocationError::Unavailable
        })?;

        let status = res.status();
        if status == StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if !status.is_success() {
            tracing::debug!(%status, "ip lookup rejected");
            return Err(LocationError::Unavailable);
        }

        let body: IpLookupResponse = res.json().await.map_err(|err| {
            tracing::debug!("ip lookup parse error: {err}");
            LocationError::Unavailable
        })?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinate { lat, lon }),
            _ => Err(LocationError::Unavailable),
        }
    }
}

impl Default for IpLocation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationSource for IpLocation {
    async fn request_once(&self) -> Result<Coordinate, LocationError> {
        tokio::time::timeout(self.wait, self.lookup())
            .await
            .map_err(|_| LocationError::Timeout)?
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn pinned_location_returns_its_coordinate() {
        let source = PinnedLocation::new(Coordinate { lat: 37.7749, lon: -122.4194 });
        let coordinate = source.request_once().await.expect("pinned fix");
        assert_eq!(coordinate.lat, 37.7749);
        assert_eq!(coordinate.lon, -122.4194);
    }

    #[tokio::test]
    async fn ip_lookup_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "lat": 48.8566,
                "lon": 2.3522
            })))
            .mount(&server)
            .await;

        let source = IpLocation::with_base_url(server.uri());
        let coordinate = source.request_once().await.expect("fix");
        assert_eq!(coordinate.lat, 48.8566);
        assert_eq!(coordinate.lon, 2.3522);
    }

    #[tokio::test]
    async fn ip_lookup_failure_body_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail",
                "message": "private range"
            })))
            .mount(&server)
            .await;

        let source = IpLocation::with_base_url(server.uri());
        let err = source.request_once().await.unwrap_err();
        assert_eq!(err, LocationError::Unavailable);
    }

    #[tokio::test]
    async fn forbidden_is_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let source = IpLocation::with_base_url(server.uri());
        let err = source.request_once().await.unwrap_err();
        assert_eq!(err, LocationError::PermissionDenied);
    }

    #[tokio::test]
    async fn slow_lookup_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "status": "success", "lat": 0.0, "lon": 0.0
                    }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut source = IpLocation::with_base_url(server.uri());
        source.wait = Duration::from_millis(50);

        let err = source.request_once().await.unwrap_err();
        assert_eq!(err, LocationError::Timeout);
    }
}
