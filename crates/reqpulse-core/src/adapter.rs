//! The container adapter capability contract.
//!
//! A hosting runtime exposes its native request, response, and dispatch
//! continuation through these three traits so the dispatcher can be
//! written once. Implementations are mechanical per container and carry no
//! aggregation logic; they are stateless views over a container-native
//! object, valid only for the duration of one dispatch.
//!
//! All accessors are pure reads: an absent or unreadable value is reported
//! as `None` (or an empty sequence), never as a panic or an error. A read
//! failure inside an adapter is recovered locally by treating the field as
//! absent. Instrumentation is fail-open.

use std::future::Future;
use std::pin::Pin;

/// A boxed future, the shape every chain continuation resolves to.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Read-only view of an inbound request.
pub trait InboundRequest {
    /// Request path without query string.
    fn path(&self) -> &str;

    /// HTTP method name.
    fn method(&self) -> &str;

    /// The raw, unmasked query string, if any. Callers must sanitize
    /// before letting this value leave the instrumentation boundary.
    fn raw_query(&self) -> Option<&str>;

    /// All decoded values of one query parameter; empty when absent.
    fn query_parameter(&self, name: &str) -> Vec<String>;

    /// The value of one request cookie.
    fn cookie(&self, name: &str) -> Option<String>;

    /// A string attribute from the container's session, if the container
    /// has a session concept at all.
    fn session_attribute(&self, name: &str) -> Option<String>;
}

/// Read-only view of an outbound response.
pub trait OutboundResponse {
    /// HTTP status code.
    fn status_code(&self) -> u16;

    /// The value of one response header.
    fn header(&self, name: &str) -> Option<String>;
}

/// The continuation of container-native dispatch.
///
/// `proceed` consumes the chain, so the at-most-once contract is enforced
/// by the type system rather than a runtime flag. The returned future may
/// take arbitrary time and its error, if any, belongs to the host: the
/// core re-raises it unchanged.
pub trait RequestChain: Send {
    type Output: Send;
    type Error: Send;

    /// Invoke the next stage of dispatch.
    fn proceed(self) -> BoxFuture<Result<Self::Output, Self::Error>>;
}

/// Adapt a closure into a [`RequestChain`].
///
/// ```
/// use reqpulse_core::adapter::chain_fn;
///
/// let chain = chain_fn(|| async { Ok::<_, std::io::Error>("handled") });
/// # drop(chain);
/// ```
pub fn chain_fn<F, Fut, T, E>(f: F) -> FnChain<F>
where
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send,
    E: Send,
{
    FnChain(f)
}

/// A [`RequestChain`] backed by a one-shot closure.
pub struct FnChain<F>(F);

impl<F, Fut, T, E> RequestChain for FnChain<F>
where
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send,
    E: Send,
{
    type Output = T;
    type Error = E;

    fn proceed(self) -> BoxFuture<Result<T, E>> {
        Box::pin((self.0)())
    }
}
