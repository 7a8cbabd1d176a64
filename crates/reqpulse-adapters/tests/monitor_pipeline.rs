//! End-to-end pipeline: tower host -> dispatcher -> accumulator ->
//! interval roll -> sink.

use bytes::Bytes;
use http::Request;
use reqpulse_adapters::MonitorLayer;
use reqpulse_core::{
    CaseRule, Emitter, IntervalSnapshot, MonitorConfig, MonitoredCategory, RequestMonitor,
    SnapshotSink,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::{service_fn, Layer, ServiceExt};

#[derive(Default)]
struct CollectingSink {
    batches: Mutex<Vec<Vec<IntervalSnapshot>>>,
}

impl SnapshotSink for CollectingSink {
    fn emit(&self, snapshots: &[IntervalSnapshot]) {
        self.batches.lock().unwrap().push(snapshots.to_vec());
    }
}

fn request(uri: &str) -> Request<Bytes> {
    Request::builder()
        .method(http::Method::GET)
        .uri(uri)
        .body(Bytes::new())
        .unwrap()
}

#[tokio::test]
async fn traffic_flows_from_host_to_sink() {
    let config = MonitorConfig::new().case_rule(CaseRule::Insensitive);
    let monitor = Arc::new(RequestMonitor::new(config).unwrap());
    let layer = MonitorLayer::new(monitor.clone());

    let ok_service = service_fn(|_req: Request<Bytes>| async {
        tokio::time::sleep(Duration::from_millis(2)).await;
        Ok::<_, std::io::Error>(http::Response::new(Bytes::from_static(b"ok")))
    });
    let failing_service = service_fn(|_req: Request<Bytes>| async {
        Err::<http::Response<Bytes>, _>(std::io::Error::other("downstream broke"))
    });

    for _ in 0..3 {
        layer
            .layer(ok_service)
            .oneshot(request("/orders?PASSWORD=dave"))
            .await
            .unwrap();
    }
    let error = layer
        .layer(failing_service)
        .oneshot(request("/orders"))
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "downstream broke");

    let sink = Arc::new(CollectingSink::default());
    let emitter = Emitter::spawn(
        monitor.registry().clone(),
        Duration::from_millis(25),
        sink.clone(),
    );
    tokio::time::sleep(Duration::from_millis(60)).await;
    emitter.shutdown().await;

    let batches = sink.batches.lock().unwrap();
    assert_eq!(batches.len(), 1, "one active interval expected");

    let snapshot = &batches[0][0];
    assert_eq!(snapshot.category, MonitoredCategory::new("GET /orders"));
    assert_eq!(snapshot.total_hits, 4);
    assert_eq!(snapshot.total_completions, 3);
    assert!(snapshot.average_duration >= Duration::from_millis(2));
    assert!(snapshot.is_active);
    assert!(snapshot.throughput > 0.0);
    assert!(snapshot.min_duration.is_some());

    // The interval rolled; nothing is active until new traffic arrives.
    assert!(monitor.registry().active_categories().is_empty());
}

#[tokio::test]
async fn snapshot_query_surface_serves_on_demand_reads() {
    let monitor = Arc::new(RequestMonitor::default());
    let layer = MonitorLayer::new(monitor.clone());

    let service = service_fn(|_req: Request<Bytes>| async {
        Ok::<_, std::io::Error>(http::Response::new(Bytes::new()))
    });
    layer.layer(service).oneshot(request("/ping")).await.unwrap();

    let category = MonitoredCategory::new("GET /ping");
    let start = std::time::SystemTime::now() - Duration::from_secs(10);
    let end = std::time::SystemTime::now();

    let snapshot = monitor
        .registry()
        .snapshot(&category, start, end)
        .expect("category was dispatched");
    assert_eq!(snapshot.total_completions, 1);
    assert_eq!(monitor.registry().active_categories(), vec![category]);
}
