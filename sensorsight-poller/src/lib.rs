//! HTTP sensor poller.
//!
//! Polls a sensor endpoint that returns a JSON object, normalizes the
//! payload into a [`Reading`](sensorsight_common::Reading) and hands each
//! outcome to a delivery callback.
//!
//! # Pipeline
//!
//! ```text
//! Poller ──trigger──> Fetcher ──JSON──> Normalizer ──Reading|FetchError──> Deliver
//!                                                        └──Reading──> Notifier
//! ```
//!
//! - [`fetcher`] - HTTP GET with timeout and failure classification
//! - [`normalizer`] - alias lookup, float parsing, unit heuristics
//! - [`poller`] - periodic schedule, retry after failure, single in-flight fetch
//! - [`notify`] - named `TEMPERATURE` / `HUMIDITY` / `PRESSURE` events
//! - [`display`] / [`render`] - render-time formatting and the log renderer

pub mod config;
pub mod display;
pub mod fetcher;
pub mod normalizer;
pub mod notify;
pub mod poller;
pub mod render;

pub use config::{PollConfig, PollerAppConfig};
pub use fetcher::{Fetch, FetchError, HttpFetcher};
pub use normalizer::{normalize, normalize_at};
pub use poller::{Deliver, PollOutcome, PollState, Poller, PollerHandle};
