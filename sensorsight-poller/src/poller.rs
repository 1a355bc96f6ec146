//! Sensor polling loop: periodic fetches, retry after failure, delivery.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use sensorsight_common::Reading;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, Sleep, interval_at, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::PollConfig;
use crate::fetcher::{Fetch, FetchError};
use crate::normalizer::normalize;
use crate::notify::Notifier;

/// Result of one poll cycle, as handed to the delivery callback.
pub type PollOutcome = Result<Reading, FetchError>;

type FetchFuture = Pin<Box<dyn Future<Output = Result<Value, FetchError>> + Send>>;

/// Receiver of poll outcomes (the renderer side).
pub trait Deliver: Send + 'static {
    fn deliver(&mut self, outcome: PollOutcome);
}

impl<F> Deliver for F
where
    F: FnMut(PollOutcome) + Send + 'static,
{
    fn deliver(&mut self, outcome: PollOutcome) {
        self(outcome)
    }
}

/// Latest state of a poller.
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    /// Started, no fetch issued yet.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The latest fetch produced a reading.
    Ready(Reading),
    /// The latest fetch failed.
    Error(FetchError),
}

impl PollState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollState::Idle => "idle",
            PollState::Loading => "loading",
            PollState::Ready(_) => "ready",
            PollState::Error(_) => "error",
        }
    }

    pub fn reading(&self) -> Option<&Reading> {
        match self {
            PollState::Ready(reading) => Some(reading),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Interval,
    Retry,
}

impl Trigger {
    fn as_str(&self) -> &'static str {
        match self {
            Trigger::Interval => "interval",
            Trigger::Retry => "retry",
        }
    }
}

/// Polls one sensor endpoint until stopped.
///
/// A periodic timer and a one-shot retry timer (armed after a failure)
/// both trigger fetches; at most one fetch is in flight at a time and a
/// trigger that fires while one is running is dropped.
pub struct Poller<F: Fetch, D: Deliver> {
    config: PollConfig,
    fetcher: Arc<F>,
    deliver: D,
    notifier: Option<Notifier>,
}

impl<F: Fetch, D: Deliver> Poller<F, D> {
    pub fn new(config: PollConfig, fetcher: F, deliver: D) -> Self {
        Self {
            config,
            fetcher: Arc::new(fetcher),
            deliver,
            notifier: None,
        }
    }

    /// Emit notification events after every successful poll.
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Spawn the polling task.
    ///
    /// The first fetch happens after `initial_delay_ms`, then every
    /// `interval_ms`. Must be called within a tokio runtime.
    pub fn start(self) -> PollerHandle {
        let token = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(PollState::Idle);
        let task = tokio::spawn(self.run(token.clone(), state_tx));

        PollerHandle {
            token,
            state: state_rx,
            task: Some(task),
        }
    }

    async fn run(mut self, token: CancellationToken, state: watch::Sender<PollState>) {
        info!(
            url = %self.config.url,
            interval_ms = self.config.interval_ms,
            retry_delay_ms = self.config.retry_delay_ms,
            timeout_ms = self.config.timeout_ms,
            "Starting sensor poller"
        );

        let first_tick = Instant::now() + self.config.initial_delay();
        let mut ticker = interval_at(first_tick, self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut retry: Option<Pin<Box<Sleep>>> = None;
        let mut in_flight: Option<FetchFuture> = None;

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => break,

                result = settle(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    if token.is_cancelled() {
                        break;
                    }
                    self.handle_result(result, &mut retry, &state);
                }

                _ = ticker.tick() => {
                    self.trigger(Trigger::Interval, &mut in_flight, &state);
                }

                _ = expire(&mut retry), if retry.is_some() => {
                    retry = None;
                    self.trigger(Trigger::Retry, &mut in_flight, &state);
                }
            }
        }

        if in_flight.is_some() {
            debug!(url = %self.config.url, "Aborting in-flight fetch");
        }
        info!(url = %self.config.url, "Sensor poller stopped");
    }

    fn trigger(
        &self,
        trigger: Trigger,
        in_flight: &mut Option<FetchFuture>,
        state: &watch::Sender<PollState>,
    ) {
        if in_flight.is_some() {
            debug!(trigger = trigger.as_str(), "Fetch already in flight, skipping");
            return;
        }

        debug!(url = %self.config.url, trigger = trigger.as_str(), "Fetching sensor data");
        state.send_replace(PollState::Loading);

        let fetcher = Arc::clone(&self.fetcher);
        *in_flight = Some(Box::pin(async move { fetcher.fetch().await }));
    }

    fn handle_result(
        &mut self,
        result: Result<Value, FetchError>,
        retry: &mut Option<Pin<Box<Sleep>>>,
        state: &watch::Sender<PollState>,
    ) {
        match result {
            Ok(json) => {
                let reading = normalize(&json, &self.config);
                if reading.is_empty() {
                    warn!(url = %self.config.url, "Response contained none of the configured fields");
                } else {
                    debug!(
                        temperature = ?reading.temperature_celsius,
                        humidity = ?reading.humidity_percent,
                        pressure = ?reading.pressure_hpa,
                        "Sensor reading"
                    );
                }

                state.send_replace(PollState::Ready(reading.clone()));
                self.deliver.deliver(Ok(reading.clone()));

                if let Some(notifier) = &self.notifier {
                    notifier.emit(&reading);
                }
            }
            Err(e) => {
                warn!(
                    url = %self.config.url,
                    kind = e.kind(),
                    error = %e,
                    retry_in_ms = self.config.retry_delay_ms,
                    "Sensor poll failed"
                );

                state.send_replace(PollState::Error(e.clone()));
                self.deliver.deliver(Err(e));

                if retry.is_none() {
                    *retry = Some(Box::pin(sleep(self.config.retry_delay())));
                }
            }
        }
    }
}

async fn settle(in_flight: &mut Option<FetchFuture>) -> Result<Value, FetchError> {
    match in_flight {
        Some(fetch) => fetch.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn expire(retry: &mut Option<Pin<Box<Sleep>>>) {
    match retry {
        Some(timer) => timer.as_mut().await,
        None => std::future::pending().await,
    }
}

/// Handle to a running [`Poller`].
///
/// Dropping the handle stops the poller.
#[derive(Debug)]
pub struct PollerHandle {
    token: CancellationToken,
    state: watch::Receiver<PollState>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop polling.
    ///
    /// Cancels both timers and aborts any in-flight fetch; nothing is
    /// delivered once the poller task observes the stop.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Current state.
    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Stop polling and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!(error = %e, "Sensor poller task panicked");
                }
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
