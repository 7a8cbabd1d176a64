//! Tower integration: wraps any `tower::Service` HTTP stack with request
//! monitoring.
//!
//! The layer is the only wiring a tower-based host needs; category
//! resolution, masking, and accumulation all stay in the core.

use crate::http::HttpRequestView;
use http::Request;
use reqpulse_core::{BoxFuture, RequestMonitor};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Layer;
use tower_service::Service;

/// Layer applying a [`MonitorService`] around an inner service.
#[derive(Clone)]
pub struct MonitorLayer {
    monitor: Arc<RequestMonitor>,
}

impl MonitorLayer {
    pub fn new(monitor: Arc<RequestMonitor>) -> Self {
        Self { monitor }
    }

    /// The monitor backing this layer.
    pub fn monitor(&self) -> &Arc<RequestMonitor> {
        &self.monitor
    }
}

impl<S> Layer<S> for MonitorLayer {
    type Service = MonitorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MonitorService {
            inner,
            monitor: self.monitor.clone(),
        }
    }
}

/// Service wrapper recording one start and exactly one terminal outcome
/// per request. Inner-service errors propagate unchanged and count as
/// failures; a dropped call future counts as a failure too.
#[derive(Clone)]
pub struct MonitorService<S> {
    inner: S,
    monitor: Arc<RequestMonitor>,
}

impl<S, B> Service<Request<B>> for MonitorService<S>
where
    S: Service<Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<Result<S::Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        // Swap in the clone so the original, poll_ready-checked service
        // handles this request.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let monitor = self.monitor.clone();

        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let in_flight = monitor.begin(&HttpRequestView::new(&parts));
            let request = Request::from_parts(parts, body);

            match inner.call(request).await {
                Ok(response) => {
                    in_flight.complete();
                    Ok(response)
                }
                Err(error) => {
                    in_flight.fail();
                    Err(error)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reqpulse_core::MonitoredCategory;
    use tower::{service_fn, ServiceExt};

    fn monitor() -> Arc<RequestMonitor> {
        Arc::new(RequestMonitor::default())
    }

    fn request(path: &str) -> Request<Bytes> {
        Request::builder()
            .method(http::Method::GET)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    fn totals(
        monitor: &RequestMonitor,
        category: &str,
    ) -> reqpulse_core::Totals {
        monitor
            .registry()
            .accumulator(&MonitoredCategory::new(category))
            .snapshot()
    }

    #[tokio::test]
    async fn wrapped_service_records_completions() {
        let monitor = monitor();
        let service = MonitorLayer::new(monitor.clone()).layer(service_fn(
            |_req: Request<Bytes>| async {
                Ok::<_, std::io::Error>(http::Response::new(Bytes::from_static(b"ok")))
            },
        ));

        let response = service.oneshot(request("/orders")).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);

        let totals = totals(&monitor, "GET /orders");
        assert_eq!(totals.total_hits, 1);
        assert_eq!(totals.total_completions, 1);
        assert_eq!(totals.current_threads, 0);
    }

    #[tokio::test]
    async fn inner_error_propagates_unchanged_and_counts_as_failure() {
        let monitor = monitor();
        let service = MonitorLayer::new(monitor.clone()).layer(service_fn(
            |_req: Request<Bytes>| async {
                Err::<http::Response<Bytes>, _>(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "backend gone",
                ))
            },
        ));

        let error = service.oneshot(request("/orders")).await.unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::ConnectionReset);
        assert_eq!(error.to_string(), "backend gone");

        let totals = totals(&monitor, "GET /orders");
        assert_eq!(totals.total_hits, 1);
        assert_eq!(totals.total_completions, 0);
        assert_eq!(totals.current_threads, 0);
        assert_eq!(totals.max_concurrent_threads, 1);
    }

    #[tokio::test]
    async fn category_comes_from_sanitized_path_not_query() {
        let monitor = monitor();
        let service = MonitorLayer::new(monitor.clone()).layer(service_fn(
            |_req: Request<Bytes>| async {
                Ok::<_, std::io::Error>(http::Response::new(Bytes::new()))
            },
        ));

        service
            .oneshot(request("/login?password=hunter2"))
            .await
            .unwrap();

        assert_eq!(totals(&monitor, "GET /login").total_completions, 1);
    }
}
