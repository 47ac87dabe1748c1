use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use chrono::Local;
use clap::{Parser, Subcommand};

use skycast_core::{
    Config, Coordinate, Forecast, IpLocation, LocationSource, PinnedLocation, SessionState, Theme,
    WeatherSession, present, provider_from_config,
};

/// Seconds between re-renders in watch mode. Only time-derived labels and
/// the theme are refreshed; the forecast itself is never refetched.
const RENDER_TICK_SECS: u64 = 60;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Location-aware weather client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weatherapi.com API key.
    Configure,

    /// Fetch and show the 3-day forecast for the current location.
    Show {
        /// Pin the latitude instead of auto-detecting the location.
        #[arg(long, requires = "lon")]
        lat: Option<f64>,

        /// Pin the longitude instead of auto-detecting the location.
        #[arg(long, requires = "lat")]
        lon: Option<f64>,

        /// Day index for the hourly breakdown (0 = today).
        #[arg(long, default_value_t = 0)]
        day: usize,

        /// Keep the display up, refreshing time-derived labels every minute.
        #[arg(long)]
        watch: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, day, watch } => show(lat, lon, day, watch).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("weatherapi.com API key:")
        .without_confirmation()
        .prompt()?;
    config.api_key = Some(api_key);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(lat: Option<f64>, lon: Option<f64>, day: usize, watch: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;

    let location: Arc<dyn LocationSource> = match pinned_coordinate(lat, lon, &config) {
        Some(coordinate) => {
            tracing::debug!(lat = coordinate.lat, lon = coordinate.lon, "using pinned coordinate");
            Arc::new(PinnedLocation::new(coordinate))
        }
        None => Arc::new(IpLocation::new()),
    };

    let session = WeatherSession::new(location, Arc::new(provider));
    session.start();
    println!("Locating and fetching forecast...");

    let forecast = match session.settled().await {
        SessionState::Loaded(forecast) => forecast,
        SessionState::Failed(err) => bail!("{err}\n{}", err.user_message()),
        state => bail!("unexpected session state: {state:?}"),
    };

    render(&forecast, day)?;

    if watch {
        let mut tick = tokio::time::interval(Duration::from_secs(RENDER_TICK_SECS));
        tick.tick().await; // the first tick fires immediately
        loop {
            tick.tick().await;
            render(&forecast, day)?;
        }
    }

    Ok(())
}

fn pinned_coordinate(lat: Option<f64>, lon: Option<f64>, config: &Config) -> Option<Coordinate> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Some(Coordinate { lat, lon }),
        _ => config.pinned,
    }
}

fn render(forecast: &Forecast, day_index: usize) -> anyhow::Result<()> {
    let now = Local::now();
    let (glyph, theme_name) = match present::theme_for(&now) {
        Theme::Morning => ("*", "morning"),
        Theme::Evening => (")", "evening"),
    };

    let location = &forecast.location;
    let current = &forecast.current;

    println!();
    println!(
        "{glyph} {}, {} ({theme_name})",
        location.name, location.country
    );
    println!("  {:.1}°C  {}", current.temp_c, current.condition.text);
    println!(
        "  Feels like {:.1}°C · Humidity {}% · Wind {:.1} km/h {}",
        current.feelslike_c, current.humidity, current.wind_kph, current.wind_dir
    );
    println!(
        "  Visibility {:.1} km · UV {:.0} · Cloud {}%",
        current.vis_km, current.uv, current.cloud
    );

    println!();
    println!("  THREE DAY FORECAST");
    for row in present::three_day_rows(forecast, now) {
        println!(
            "  {:<12} {:>5.1}° / {:>5.1}°   {}",
            row.label, row.max_c, row.min_c, row.icon
        );
    }

    println!();
    println!("  Hourly (day {day_index})");
    for hour in present::hourly(forecast, day_index)? {
        // "2024-05-14 08:00" -> "08:00"
        let time = hour.time.split_whitespace().last().unwrap_or(&hour.time);
        println!("  {time}  {:>5.1}°C  {}", hour.temp_c, hour.condition.text);
    }

    Ok(())
}
