//! # reqpulse Core
//!
//! The container-agnostic aggregation core of reqpulse: a concurrency-safe
//! statistics accumulator, an interval snapshot calculator, a request
//! dispatcher, and the small capability contract a hosting container
//! implements to be monitored.
//!
//! The core creates no threads, performs no I/O, and persists nothing; it
//! observes request lifecycle events supplied by the host and derives
//! interval statistics that a [`bridge::SnapshotSink`] consumes.

pub mod adapter;
mod bridge;
mod config;
mod dispatch;
mod error;
mod registry;
mod sanitize;
mod snapshot;
mod stats;

// Public API
pub use adapter::{chain_fn, BoxFuture, FnChain, InboundRequest, OutboundResponse, RequestChain};
pub use bridge::{Emitter, LogSink, SnapshotSink};
pub use config::{CaseRule, MonitorConfig, DEFAULT_MASK_TOKEN};
pub use dispatch::{CategoryPolicy, InFlight, Outcome, RequestMonitor};
pub use error::ConfigError;
pub use registry::{CategoryRegistry, MonitoredCategory};
pub use sanitize::{mask_credentials, RequestDescriptor};
pub use snapshot::IntervalSnapshot;
pub use stats::{SampleAccumulator, Totals};
