//! Preflight request classification

use hyper::{Method, Request};
use crate::headers::{HeaderMap, ACCESS_CONTROL_REQUEST_METHOD};

/// Returns `true` if the request is a CORS preflight request
///
/// A preflight request is an `OPTIONS` request with a non-empty
/// `Access-Control-Request-Method` header. A bare `OPTIONS` request is a simple request.
#[inline]
pub fn is_preflight<B>(request: &Request<B>) -> bool {
    is_preflight_parts(request.method(), request.headers())
}

/// Same as [`is_preflight`] but works with the request method and headers directly
#[inline]
pub fn is_preflight_parts(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS && headers
        .get(ACCESS_CONTROL_REQUEST_METHOD)
        .is_some_and(|v| !v.is_empty())
}
