//! CORS related HTTP headers

// Re-exporting HeaderMap, HeaderValue and CORS headers from hyper
pub use hyper::{
    header::{
        InvalidHeaderValue,
        ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
        ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
        ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD,
        ORIGIN,
        VARY,
    },
    http::{HeaderName, HeaderValue},
    HeaderMap
};

/// Common prefix of every CORS response and request header
pub const ACCESS_CONTROL_PREFIX: &str = "access-control-";

/// Returns `true` if the header belongs to the `Access-Control-*` family
///
/// [`HeaderName`] is always lowercase, so a plain prefix check is enough.
#[inline]
pub fn is_access_control(name: &HeaderName) -> bool {
    name.as_str().starts_with(ACCESS_CONTROL_PREFIX)
}

/// Iterates over the names of `Access-Control-*` headers present in `headers`
#[inline]
pub fn access_control_names(headers: &HeaderMap) -> impl Iterator<Item = &HeaderName> {
    headers.keys().filter(|name| is_access_control(name))
}

/// Joins items into a comma separated header value
#[inline]
pub(crate) fn build_csv<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut it = items.into_iter();
    let mut out = String::new();

    if let Some(first) = it.next() {
        out.push_str(first.as_ref());
        for item in it {
            out.push_str(", ");
            out.push_str(item.as_ref());
        }
    }

    out
}
