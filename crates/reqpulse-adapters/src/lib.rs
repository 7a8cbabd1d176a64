//! # reqpulse Adapters
//!
//! Per-container adapter implementations for the reqpulse aggregation
//! core. One adapter set exists per hosting runtime, selected at
//! composition time; every adapter is thin mechanical glue with no
//! aggregation logic of its own.
//!
//! - [`http`]: views over the `http` crate's request/response types, the
//!   common surface of hyper-family hosts.
//! - [`tower`]: a `Layer`/`Service` pair that wires the dispatcher into
//!   any tower HTTP stack.

pub mod http;
pub mod tower;

pub use crate::http::{HttpRequestView, HttpResponseView, SessionAttributes};
pub use crate::tower::{MonitorLayer, MonitorService};
