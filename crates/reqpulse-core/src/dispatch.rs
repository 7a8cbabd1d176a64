//! The request dispatcher: ties the adapter boundary to the accumulator.
//!
//! One dispatch walks `ENTER → START_RECORDED → CHAIN_INVOKED →
//! {COMPLETED | FAILED} → EXIT`. Exactly one of completion or failure is
//! recorded per start (never zero, never both), even when the downstream
//! chain raises or the host drops the dispatch future mid-flight.

use crate::adapter::{InboundRequest, RequestChain};
use crate::config::MonitorConfig;
use crate::error::ConfigError;
use crate::registry::{CategoryRegistry, MonitoredCategory};
use crate::sanitize::RequestDescriptor;
use crate::stats::SampleAccumulator;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Resolves the monitored category for a sanitized request descriptor.
///
/// Policy is external to the core; the default is `METHOD path`.
pub type CategoryPolicy = Arc<dyn Fn(&RequestDescriptor) -> MonitoredCategory + Send + Sync>;

/// Terminal outcome of one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
}

/// The instrumentation entry point, written once over the adapter
/// capability contract.
///
/// Creates no threads of its own; it only has to be safe to call from as
/// many container worker threads as the host uses.
#[derive(Clone)]
pub struct RequestMonitor {
    config: Arc<MonitorConfig>,
    registry: Arc<CategoryRegistry>,
    policy: CategoryPolicy,
}

impl RequestMonitor {
    /// Build a monitor, validating the configuration up front.
    pub fn new(config: MonitorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(CategoryRegistry::new()),
            policy: Arc::new(|descriptor| {
                MonitoredCategory::new(format!("{} {}", descriptor.method, descriptor.path))
            }),
        })
    }

    /// Replace the category resolution policy.
    pub fn with_policy(mut self, policy: CategoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The registry backing this monitor; the snapshot query surface for
    /// emitter bridges.
    pub fn registry(&self) -> &Arc<CategoryRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Instrument one request around a chain continuation.
    ///
    /// Records a start, invokes `proceed` exactly once, then records a
    /// completion on `Ok` or a failure on `Err`. The chain's error is
    /// returned unchanged; monitoring never swallows or wraps downstream
    /// failures.
    pub async fn dispatch<R, C>(&self, request: &R, chain: C) -> Result<C::Output, C::Error>
    where
        R: InboundRequest + ?Sized,
        C: RequestChain,
    {
        let in_flight = self.begin(request);
        match chain.proceed().await {
            Ok(output) => {
                in_flight.complete();
                Ok(output)
            }
            Err(error) => {
                in_flight.fail();
                Err(error)
            }
        }
    }

    /// Record a request start and hand back its in-flight context.
    ///
    /// For hosts whose chain continuation cannot be expressed as a
    /// [`RequestChain`] value (e.g. the native request must be moved into
    /// the inner service): settle the returned context manually. Dropping
    /// it unsettled counts as a failure, so a host-side cancellation still
    /// reaches a terminal state.
    pub fn begin<R>(&self, request: &R) -> InFlight
    where
        R: InboundRequest + ?Sized,
    {
        let descriptor = RequestDescriptor::from_request(request, &self.config);
        let category = (self.policy)(&descriptor);
        let accumulator = self.registry.accumulator(&category);
        accumulator.record_start();
        tracing::debug!(category = %category, "request entered dispatch");

        InFlight {
            category,
            descriptor,
            start: Instant::now(),
            accumulator,
            settled: false,
        }
    }

    /// Event interface for instrumentation collaborators that observe
    /// request starts through a mechanism other than a chain wrapper.
    pub fn on_request_start(&self, category: &MonitoredCategory) {
        self.registry.accumulator(category).record_start();
    }

    /// Counterpart of [`on_request_start`](Self::on_request_start) for the
    /// terminal event.
    pub fn on_request_end(
        &self,
        category: &MonitoredCategory,
        outcome: Outcome,
        duration: Duration,
    ) {
        let accumulator = self.registry.accumulator(category);
        match outcome {
            Outcome::Completed => accumulator.record_completion(duration),
            Outcome::Failed => accumulator.record_failure(),
        }
    }
}

impl Default for RequestMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::new()).expect("default MonitorConfig is valid")
    }
}

/// Transient context for one in-flight request, exclusively owned by the
/// dispatch that created it.
///
/// Settling it via [`complete`](Self::complete) or [`fail`](Self::fail)
/// records the terminal outcome; dropping it unsettled records a failure.
#[must_use = "an unsettled in-flight request counts as a failure on drop"]
pub struct InFlight {
    category: MonitoredCategory,
    descriptor: RequestDescriptor,
    start: Instant,
    accumulator: Arc<SampleAccumulator>,
    settled: bool,
}

impl InFlight {
    pub fn category(&self) -> &MonitoredCategory {
        &self.category
    }

    /// The sanitized request descriptor captured at entry.
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Record a successful completion with the elapsed duration.
    pub fn complete(mut self) {
        let elapsed = self.start.elapsed();
        self.settled = true;
        self.accumulator.record_completion(elapsed);
        tracing::debug!(category = %self.category, ?elapsed, "request completed");
    }

    /// Record a failure; the downstream error itself stays with the host.
    pub fn fail(mut self) {
        self.settled = true;
        self.accumulator.record_failure();
        tracing::debug!(category = %self.category, "request failed downstream");
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            // Host cancelled the dispatch future mid-chain.
            self.accumulator.record_failure();
            tracing::debug!(category = %self.category, "request dropped before settling");
        }
    }
}
