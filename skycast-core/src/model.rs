//! Domain model for the weatherapi.com 3-day forecast response.
//!
//! Field names mirror the provider's wire format, so the structs double as
//! the decode schema. Decoding is strict: every field is required unless
//! marked optional here, and a missing field or type mismatch is a decode
//! failure, never a defaulted value.

use serde::{Deserialize, Serialize};

/// Number of days in the fixed forecast window.
pub const FORECAST_DAYS: usize = 3;

/// A (latitude, longitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Decoded forecast response: the resolved location, current conditions and
/// the multi-day detail.
///
/// Instances are created once per successful fetch and replaced wholesale by
/// the next one; nothing mutates them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub location: Location,
    pub current: Current,
    pub forecast: ForecastDays,
}

impl Forecast {
    /// The ordered day entries: index 0 is today, 1 tomorrow, 2 the day
    /// after. Guaranteed to hold at least [`FORECAST_DAYS`] entries for any
    /// forecast obtained through the provider.
    pub fn days(&self) -> &[ForecastDay] {
        &self.forecast.forecastday
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub tz_id: String,
    pub localtime_epoch: i64,
    pub localtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub last_updated_epoch: i64,
    pub last_updated: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub is_day: u8,
    pub condition: Condition,
    pub wind_mph: f64,
    pub wind_kph: f64,
    pub wind_degree: u16,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub pressure_in: f64,
    pub precip_mm: f64,
    pub precip_in: f64,
    pub humidity: u8,
    pub cloud: u8,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub vis_km: f64,
    pub vis_miles: f64,
    pub uv: f64,
    pub gust_mph: f64,
    pub gust_kph: f64,
}

/// Provider-supplied weather description bundle. The icon is an opaque
/// string: either a remote asset path or a local icon identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDays {
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub date_epoch: i64,
    pub day: Day,
    pub astro: Astro,
    pub hour: Vec<Hour>,
}

/// Day-level aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub maxtemp_c: f64,
    pub maxtemp_f: f64,
    pub mintemp_c: f64,
    pub mintemp_f: f64,
    pub avgtemp_c: f64,
    pub avgtemp_f: f64,
    pub maxwind_mph: f64,
    pub maxwind_kph: f64,
    pub totalprecip_mm: f64,
    pub totalprecip_in: f64,
    pub totalsnow_cm: f64,
    pub avgvis_km: f64,
    pub avgvis_miles: f64,
    pub avghumidity: u8,
    pub daily_will_it_rain: u8,
    pub daily_chance_of_rain: u8,
    pub daily_will_it_snow: u8,
    pub daily_chance_of_snow: u8,
    pub condition: Condition,
    pub uv: f64,
    pub air_quality: Option<AirQuality>,
}

/// Air-quality block; the provider only includes it when asked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub us_epa_index: i32,
    pub gb_defra_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
    pub moon_illumination: u8,
    pub is_moon_up: u8,
    pub is_sun_up: u8,
}

/// One entry of a day's hourly breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hour {
    pub time: String,
    pub temp_c: f64,
    pub condition: Condition,
}
