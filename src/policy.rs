//! Validated, immutable CORS policy

use crate::{
    headers::HeaderValue,
    origin::{self, OriginPattern},
};

/// Upper bound of the `Access-Control-Max-Age` header, 24 hours = 86,400 seconds
pub const MAX_AGE_LIMIT: u32 = 24 * 60 * 60;

const WILDCARD_STR: &str = "*";

/// Pre-computed value of the `Access-Control-Allow-Headers` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AllowHeaders {
    /// No allowed headers configured, the header is not sent
    None,
    /// Wildcard configured, the `Access-Control-Request-Headers` value is echoed
    Echo,
    /// Configured list joined by `", "`
    List(HeaderValue),
}

/// Represents a validated CORS policy
///
/// Created once by [`CorsConfig::validate`](crate::CorsConfig) and never mutated afterwards,
/// so it can be shared between concurrent requests as `&PolicyConfig` or `Arc<PolicyConfig>`.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    pub(crate) allowed_origins: Vec<OriginPattern>,
    pub(crate) override_existing_cors: bool,
    pub(crate) allowed_methods: Vec<String>,
    pub(crate) allow_credentials: bool,
    pub(crate) max_age: u32,
    pub(crate) allowed_headers: Vec<String>,
    pub(crate) exposed_headers: Vec<String>,

    pub(crate) allow_methods_value: HeaderValue,
    pub(crate) allow_headers_value: AllowHeaders,
    pub(crate) expose_headers_value: Option<HeaderValue>,
    pub(crate) max_age_value: Option<HeaderValue>,
}

impl PolicyConfig {
    /// Decides whether the `origin` is allowed by this policy
    #[inline]
    pub fn is_allowed(&self, origin: impl AsRef<[u8]>) -> bool {
        origin::is_allowed(&self.allowed_origins, origin)
    }

    /// Allowed origin patterns in the configured order
    #[inline]
    pub fn allowed_origins(&self) -> &[OriginPattern] {
        &self.allowed_origins
    }

    /// Whether the computed CORS headers are written to the response
    #[inline]
    pub fn override_existing_cors(&self) -> bool {
        self.override_existing_cors
    }

    /// Allowed methods advertised in preflight responses
    #[inline]
    pub fn allowed_methods(&self) -> &[String] {
        &self.allowed_methods
    }

    /// Whether the `Access-Control-Allow-Credentials: true` header is sent
    #[inline]
    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    /// Preflight cache duration in seconds, always within `[0, 86400]`
    #[inline]
    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    /// Allowed headers advertised in preflight responses
    #[inline]
    pub fn allowed_headers(&self) -> &[String] {
        &self.allowed_headers
    }

    /// Headers exposed to scripts on simple responses
    #[inline]
    pub fn exposed_headers(&self) -> &[String] {
        &self.exposed_headers
    }

    /// Returns `true` if `allowed_headers` contains the `*` wildcard
    #[inline]
    pub fn echoes_request_headers(&self) -> bool {
        self.allow_headers_value == AllowHeaders::Echo
    }

    #[inline]
    pub(crate) fn contains_wildcard(items: &[String]) -> bool {
        items.iter().any(|h| h == WILDCARD_STR)
    }
}
