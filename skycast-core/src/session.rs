//! Session coordinator: drives `location fix -> forecast fetch -> published
//! state` and exposes the result as observable state plus derived queries.

use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{
    error::{ErrorKind, QueryError},
    location::LocationSource,
    model::{Coordinate, Current, Forecast, Hour},
    present::{self, DayRow},
    provider::ForecastProvider,
};

/// The single session state. Exactly one variant holds at any time; the
/// display layer reads it, only the session writes it.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    AwaitingLocation,
    AwaitingForecast(Coordinate),
    Loaded(Arc<Forecast>),
    Failed(ErrorKind),
}

impl SessionState {
    /// True once a pipeline run has reached its terminal state.
    pub fn is_settled(&self) -> bool {
        matches!(self, SessionState::Loaded(_) | SessionState::Failed(_))
    }
}

struct Run {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

struct Shared {
    tx: watch::Sender<SessionState>,
    run: Mutex<Run>,
}

impl Shared {
    /// Publish `state` unless the run that produced it has been superseded.
    /// A completion arriving after cancellation is discarded, never applied.
    fn publish(&self, generation: u64, state: SessionState) -> bool {
        let run = self.run.lock();
        if run.generation != generation {
            tracing::debug!("discarding completion from superseded run");
            return false;
        }
        self.tx.send_replace(state);
        true
    }
}

/// One acquisition pipeline per instance: asks the location source for a
/// coordinate, fetches the forecast for it, and publishes the outcome
/// through a watch channel.
pub struct WeatherSession {
    location: Arc<dyn LocationSource>,
    provider: Arc<dyn ForecastProvider>,
    shared: Arc<Shared>,
    rx: watch::Receiver<SessionState>,
}

impl WeatherSession {
    pub fn new(location: Arc<dyn LocationSource>, provider: Arc<dyn ForecastProvider>) -> Self {
        let (tx, rx) = watch::channel(SessionState::Idle);
        Self {
            location,
            provider,
            shared: Arc::new(Shared { tx, run: Mutex::new(Run { generation: 0, handle: None }) }),
            rx,
        }
    }

    /// Start (or restart) the pipeline. Must be called from within a tokio
    /// runtime.
    ///
    /// Overlap policy: cancel-and-restart. Calling `start` while a run is
    /// in flight aborts that run and begins a fresh one from the location
    /// request; the aborted run's completion is discarded. Coordinates are
    /// never carried over between runs.
    pub fn start(&self) {
        let mut run = self.shared.run.lock();
        if let Some(handle) = run.handle.take() {
            handle.abort();
        }
        run.generation += 1;
        let generation = run.generation;

        self.shared.tx.send_replace(SessionState::AwaitingLocation);

        let location = Arc::clone(&self.location);
        let provider = Arc::clone(&self.provider);
        let shared = Arc::clone(&self.shared);

        run.handle = Some(tokio::spawn(async move {
            let coordinate = match location.request_once().await {
                Ok(coordinate) => coordinate,
                Err(err) => {
                    tracing::warn!("location request failed: {err}");
                    shared.publish(generation, SessionState::Failed(err.into()));
                    return;
                }
            };

            if !shared.publish(generation, SessionState::AwaitingForecast(coordinate)) {
                return;
            }

            match provider.fetch(coordinate).await {
                Ok(forecast) => {
                    shared.publish(generation, SessionState::Loaded(Arc::new(forecast)));
                }
                Err(err) => {
                    tracing::warn!("forecast fetch failed: {err}");
                    shared.publish(generation, SessionState::Failed(err.into()));
                }
            }
        }));
    }

    /// Cancel any in-flight run and return to `Idle`. A completion arriving
    /// after teardown is discarded.
    pub fn shutdown(&self) {
        let mut run = self.shared.run.lock();
        if let Some(handle) = run.handle.take() {
            handle.abort();
        }
        run.generation += 1;
        self.shared.tx.send_replace(SessionState::Idle);
    }

    /// Current state, cloned.
    pub fn state(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// A receiver for the display layer to watch state changes on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.rx.clone()
    }

    /// Wait for the running pipeline to reach `Loaded` or `Failed`. Only
    /// meaningful after [`start`](Self::start).
    pub async fn settled(&self) -> SessionState {
        let mut rx = self.rx.clone();
        match rx.wait_for(SessionState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// The loaded forecast, or an explicit not-ready indication.
    pub fn forecast(&self) -> Result<Arc<Forecast>, QueryError> {
        match &*self.rx.borrow() {
            SessionState::Loaded(forecast) => Ok(Arc::clone(forecast)),
            _ => Err(QueryError::NotReady),
        }
    }

    /// Current conditions from the loaded forecast.
    pub fn current(&self) -> Result<Current, QueryError> {
        self.forecast().map(|forecast| forecast.current.clone())
    }

    /// The three-day summary rows, labelled from the wall clock.
    pub fn three_day_rows(&self) -> Result<Vec<DayRow>, QueryError> {
        let forecast = self.forecast()?;
        Ok(present::three_day_rows(&forecast, Local::now()))
    }

    /// Hourly breakdown for a day index in 0..=2.
    pub fn hourly(&self, day_index: usize) -> Result<Vec<Hour>, QueryError> {
        let forecast = self.forecast()?;
        present::hourly(&forecast, day_index).map(<[Hour]>::to_vec)
    }
}

impl Drop for WeatherSession {
    fn drop(&mut self) {
        if let Some(handle) = self.shared.run.lock().handle.take() {
            handle.abort();
        }
    }
}
