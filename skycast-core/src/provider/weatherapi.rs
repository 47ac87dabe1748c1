use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::FetchError,
    model::{Coordinate, FORECAST_DAYS, Forecast},
};

use super::ForecastProvider;

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// weatherapi.com forecast client.
#[derive(Debug, Clone)]
pub struct WeatherApi {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApi {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self { api_key, base_url: base_url.into(), http: Client::new() }
    }
}

#[async_trait]
impl ForecastProvider for WeatherApi {
    async fn fetch(&self, coordinate: Coordinate) -> Result<Forecast, FetchError> {
        let url = format!("{}/forecast.json", self.base_url);
        let query = format!("{},{}", coordinate.lat, coordinate.lon);
        let days = FORECAST_DAYS.to_string();

        tracing::debug!(%query, "requesting forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query.as_str()),
                ("days", days.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, body = %truncate_body(&body), "forecast request rejected");
            return Err(FetchError::Http(status));
        }

        let forecast: Forecast = serde_json::from_str(&body)?;

        let day_count = forecast.days().len();
        if day_count < FORECAST_DAYS {
            return Err(FetchError::Contract(format!(
                "expected {FORECAST_DAYS} forecast days, got {day_count}"
            )));
        }

        tracing::debug!(location = %forecast.location.name, "forecast decoded");
        Ok(forecast)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}
