//! CORS response headers

use crate::{
    headers::{
        access_control_names,
        HeaderMap,
        HeaderName,
        HeaderValue,
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        ACCESS_CONTROL_ALLOW_HEADERS,
        ACCESS_CONTROL_ALLOW_METHODS,
        ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_EXPOSE_HEADERS,
        ACCESS_CONTROL_MAX_AGE,
        VARY,
    },
    policy::{AllowHeaders, PolicyConfig},
    request::CorsRequest,
};

const WILDCARD_STR: &str = "*";
const VARY_TOKEN: &str = "Access-Control-Allow-Origin";
const TRUE_STR: &str = "true";

/// Writes the CORS headers of a [`PolicyConfig`] into a response [`HeaderMap`]
///
/// Every write is gated by [`PolicyConfig::override_existing_cors`]: when it's `false`
/// the headers are computed and logged, but nothing is written.
#[derive(Debug, Clone, Copy)]
pub struct HeaderWriter<'a> {
    policy: &'a PolicyConfig,
}

impl<'a> HeaderWriter<'a> {
    /// Creates a writer for the `policy`
    #[inline]
    pub fn new(policy: &'a PolicyConfig) -> Self {
        Self { policy }
    }

    /// Applies the CORS headers for an admitted `request`
    ///
    /// Must only be called once the request origin has been allowed by the policy.
    /// `Access-Control-*` headers already present in `headers` are logged and left in place.
    pub fn apply(&self, request: &CorsRequest, headers: &mut HeaderMap) {
        Self::log_existing(headers);

        let Some(origin) = request.origin() else {
            return;
        };

        self.set(headers, ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        self.append_vary(headers);

        if request.is_preflight() {
            tracing::debug!("CORS: preflight request");

            self.set(headers, ACCESS_CONTROL_ALLOW_METHODS, self.policy.allow_methods_value.clone());

            match &self.policy.allow_headers_value {
                AllowHeaders::None => (),
                AllowHeaders::Echo => {
                    let requested = request
                        .request_headers()
                        .cloned()
                        .unwrap_or_else(|| HeaderValue::from_static(""));
                    self.set(headers, ACCESS_CONTROL_ALLOW_HEADERS, requested);
                }
                AllowHeaders::List(value) => self.set(headers, ACCESS_CONTROL_ALLOW_HEADERS, value.clone()),
            }

            if let Some(max_age) = &self.policy.max_age_value {
                self.set(headers, ACCESS_CONTROL_MAX_AGE, max_age.clone());
            }
        } else if let Some(exposed) = &self.policy.expose_headers_value {
            self.set(headers, ACCESS_CONTROL_EXPOSE_HEADERS, exposed.clone());
        }

        if self.policy.allow_credentials {
            self.set(headers, ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static(TRUE_STR));
        }
    }

    /// Removes every `Access-Control-*` header from `headers`
    /// if [`PolicyConfig::override_existing_cors`] is `true`, otherwise does nothing
    ///
    /// This pass is not part of [`MiddlewareHandler::handle`](crate::MiddlewareHandler::handle),
    /// hosts that want conflicting headers stripped call it explicitly.
    pub fn strip_existing(&self, headers: &mut HeaderMap) {
        if !self.policy.override_existing_cors {
            return;
        }

        let existing = access_control_names(headers)
            .cloned()
            .collect::<Vec<_>>();

        for name in existing {
            tracing::debug!("CORS: removing existing header `{name}`");
            headers.remove(name);
        }
    }

    #[inline]
    pub(crate) fn log_existing(headers: &HeaderMap) {
        for name in access_control_names(headers) {
            tracing::debug!("CORS: header `{name}` is already set");
        }
    }

    #[inline]
    fn set(&self, headers: &mut HeaderMap, name: HeaderName, value: HeaderValue) {
        tracing::debug!("CORS: setting header `{name}: {value:?}`");

        if self.policy.override_existing_cors {
            headers.insert(name, value);
        }
    }

    /// Appends `Access-Control-Allow-Origin` to the `Vary` header unless it's already listed
    fn append_vary(&self, headers: &mut HeaderMap) {
        if !self.policy.override_existing_cors {
            return;
        }

        let already_varies = headers
            .get_all(VARY)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .any(|token| token == WILDCARD_STR || token.eq_ignore_ascii_case(VARY_TOKEN));

        if !already_varies {
            headers.append(VARY, HeaderValue::from_static(VARY_TOKEN));
        }
    }
}

impl PolicyConfig {
    /// Returns a [`HeaderWriter`] for this policy
    #[inline]
    pub fn writer(&self) -> HeaderWriter<'_> {
        HeaderWriter::new(self)
    }
}
