//! Presentation derivation: pure functions turning a loaded forecast and the
//! wall clock into display values. Nothing here performs IO or touches
//! session state.

use chrono::{DateTime, Duration, Local, Timelike};

use crate::{
    error::QueryError,
    model::{FORECAST_DAYS, Forecast, Hour},
};

/// Day/night visual theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Morning,
    Evening,
}

/// True when the local hour is in [5, 18).
///
/// A fixed wall-clock heuristic, intentionally independent of the
/// provider's `is_day` and astro fields: the theme must track the viewer's
/// clock even when the forecast data is stale.
pub fn is_daytime<T: Timelike>(t: &T) -> bool {
    (5..18).contains(&t.hour())
}

pub fn theme_for<T: Timelike>(t: &T) -> Theme {
    if is_daytime(t) { Theme::Morning } else { Theme::Evening }
}

/// One row of the three-day summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRow {
    pub label: String,
    pub icon: String,
    pub max_c: f64,
    pub min_c: f64,
}

/// Flatten the forecast into exactly three summary rows.
///
/// Labels come from the wall clock, not the provider's `date` fields:
/// "Today" for index 0, then the weekday names of `now + 1d` and `now + 2d`.
pub fn three_day_rows(forecast: &Forecast, now: DateTime<Local>) -> Vec<DayRow> {
    forecast
        .days()
        .iter()
        .take(FORECAST_DAYS)
        .enumerate()
        .map(|(index, day)| DayRow {
            label: day_label(index, now),
            icon: day.day.condition.icon.clone(),
            max_c: day.day.maxtemp_c,
            min_c: day.day.mintemp_c,
        })
        .collect()
}

fn day_label(index: usize, now: DateTime<Local>) -> String {
    if index == 0 {
        "Today".to_string()
    } else {
        (now + Duration::days(index as i64)).format("%A").to_string()
    }
}

/// The selected day's hourly breakdown, unmodified. A day index outside
/// 0..=2 is a contract violation, not something to clamp.
pub fn hourly(forecast: &Forecast, day_index: usize) -> Result<&[Hour], QueryError> {
    if day_index >= FORECAST_DAYS {
        return Err(QueryError::DayOutOfRange(day_index));
    }
    forecast
        .days()
        .get(day_index)
        .map(|day| day.hour.as_slice())
        .ok_or(QueryError::DayOutOfRange(day_index))
}
