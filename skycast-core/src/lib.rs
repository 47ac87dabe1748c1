//! Core library for the `skycast` weather client.
//!
//! This crate defines:
//! - The forecast domain model and its strict decode rules
//! - The single-shot location capability
//! - The weatherapi.com forecast provider
//! - The session state machine tying location -> fetch -> published state
//! - Pure presentation derivations (themes, summary rows, hourly lists)
//!
//! It is used by `skycast-cli`, but can also be reused by other display
//! layers.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod present;
pub mod provider;
pub mod session;

pub use config::Config;
pub use error::{ErrorKind, FetchError, LocationError, QueryError};
pub use location::{IpLocation, LocationSource, PinnedLocation};
pub use model::{Coordinate, FORECAST_DAYS, Forecast};
pub use present::{DayRow, Theme};
pub use provider::{ForecastProvider, WeatherApi, provider_from_config};
pub use session::{SessionState, WeatherSession};
