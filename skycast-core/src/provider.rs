//! Forecast provider seam.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{
    Config,
    error::FetchError,
    model::{Coordinate, Forecast},
};

pub mod weatherapi;

pub use weatherapi::WeatherApi;

/// Fetches the fixed 3-day forecast window for a coordinate. One network
/// attempt per call; no caching, no retry.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch(&self, coordinate: Coordinate) -> Result<Forecast, FetchError>;
}

/// Construct the weatherapi.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<WeatherApi> {
    let api_key = config.require_api_key()?;
    Ok(WeatherApi::new(api_key.to_owned()))
}
