//! Adapter set for hyper-family hosts built on the `http` crate types.
//!
//! Pure views over `http::request::Parts` and `http::Response`; they hold
//! no aggregation state and are valid only for the duration of one
//! dispatch. Every read failure (non-UTF-8 header, malformed cookie pair)
//! degrades to an absent value; the adapter never aborts the request.

use http::request::Parts;
use http::Response;
use reqpulse_core::{InboundRequest, OutboundResponse};
use std::collections::HashMap;

/// String attributes a host associates with the request's session.
///
/// Hosts with a session concept insert this into the request extensions;
/// [`HttpRequestView::session_attribute`] reads from it.
#[derive(Debug, Clone, Default)]
pub struct SessionAttributes(HashMap<String, String>);

impl SessionAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// Inbound request view over [`http::request::Parts`].
pub struct HttpRequestView<'a> {
    parts: &'a Parts,
}

impl<'a> HttpRequestView<'a> {
    pub fn new(parts: &'a Parts) -> Self {
        Self { parts }
    }
}

impl InboundRequest for HttpRequestView<'_> {
    fn path(&self) -> &str {
        self.parts.uri.path()
    }

    fn method(&self) -> &str {
        self.parts.method.as_str()
    }

    fn raw_query(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    fn query_parameter(&self, name: &str) -> Vec<String> {
        let Some(query) = self.parts.uri.query() else {
            return Vec::new();
        };
        query
            .split('&')
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=')?;
                let key = urlencoding::decode(key).ok()?;
                if key == name {
                    Some(urlencoding::decode(value).ok()?.into_owned())
                } else {
                    None
                }
            })
            .collect()
    }

    fn cookie(&self, name: &str) -> Option<String> {
        for header in self.parts.headers.get_all(http::header::COOKIE) {
            let Ok(raw) = header.to_str() else {
                tracing::debug!("skipping non-UTF-8 cookie header");
                continue;
            };
            for parsed in cookie::Cookie::split_parse(raw) {
                match parsed {
                    Ok(c) if c.name() == name => return Some(c.value().to_string()),
                    Ok(_) => {}
                    Err(_) => tracing::debug!("skipping malformed cookie pair"),
                }
            }
        }
        None
    }

    fn session_attribute(&self, name: &str) -> Option<String> {
        self.parts
            .extensions
            .get::<SessionAttributes>()
            .and_then(|session| session.get(name))
            .map(str::to_string)
    }
}

/// Outbound response view over [`http::Response`].
pub struct HttpResponseView<'a, B> {
    response: &'a Response<B>,
}

impl<'a, B> HttpResponseView<'a, B> {
    pub fn new(response: &'a Response<B>) -> Self {
        Self { response }
    }
}

impl<B> OutboundResponse for HttpResponseView<'_, B> {
    fn status_code(&self) -> u16 {
        self.response.status().as_u16()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }
}
