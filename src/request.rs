//! Per-request CORS context

use hyper::{Method, Request};
use crate::{
    headers::{
        HeaderMap,
        HeaderValue,
        ACCESS_CONTROL_REQUEST_HEADERS,
        ACCESS_CONTROL_REQUEST_METHOD,
        ORIGIN
    },
    preflight::is_preflight_parts
};

/// A snapshot of the request data CORS processing needs
///
/// It is taken before the request is handed over to the next handler,
/// so the headers can be written once the response exists.
#[derive(Debug, Clone)]
pub struct CorsRequest {
    method: Method,
    origin: Option<HeaderValue>,
    request_method: Option<HeaderValue>,
    request_headers: Option<HeaderValue>,
    preflight: bool,
}

impl CorsRequest {
    /// Creates a [`CorsRequest`] from the request method and headers
    pub fn new(method: &Method, headers: &HeaderMap) -> Self {
        Self {
            method: method.clone(),
            origin: headers
                .get(ORIGIN)
                .filter(|v| !v.is_empty())
                .cloned(),
            request_method: headers.get(ACCESS_CONTROL_REQUEST_METHOD).cloned(),
            request_headers: headers.get(ACCESS_CONTROL_REQUEST_HEADERS).cloned(),
            preflight: is_preflight_parts(method, headers),
        }
    }

    /// Creates a [`CorsRequest`] from a [`Request`]
    #[inline]
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self::new(request.method(), request.headers())
    }

    /// Request method
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Non-empty `Origin` header value
    #[inline]
    pub fn origin(&self) -> Option<&HeaderValue> {
        self.origin.as_ref()
    }

    /// `Access-Control-Request-Method` header value
    #[inline]
    pub fn request_method(&self) -> Option<&HeaderValue> {
        self.request_method.as_ref()
    }

    /// `Access-Control-Request-Headers` header value
    #[inline]
    pub fn request_headers(&self) -> Option<&HeaderValue> {
        self.request_headers.as_ref()
    }

    /// Returns `true` for a preflight request
    #[inline]
    pub fn is_preflight(&self) -> bool {
        self.preflight
    }
}
