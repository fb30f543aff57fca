//! CORS (Cross-Origin Resource Sharing) configuration

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    headers::{build_csv, HeaderValue},
    lifecycle::{Provisioner, Validator},
    origin::OriginPattern,
    policy::{AllowHeaders, PolicyConfig, MAX_AGE_LIMIT},
};

pub mod directive;

/// Default preflight cache duration (fetch standard default)
///
/// See: <https://fetch.spec.whatwg.org/#http-access-control-max-age>
pub const DEFAULT_MAX_AGE: i64 = 5;

/// Methods allowed when none are configured
pub const DEFAULT_METHODS: [&str; 6] = ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"];

const WILDCARD_STR: &str = "*";

/// Represents the CORS middleware configuration options as they were configured
///
/// Turns into a [`PolicyConfig`] in two steps:
/// [`Provisioner::provision`] fills in the defaults and [`Validator::validate`]
/// checks the options and pre-computes everything the request path needs.
/// [`CorsConfig::build`] runs both.
///
/// # Example
/// ```no_run
/// use cors_gate::CorsConfig;
///
/// let policy = CorsConfig::default()
///     .with_origins(["https://example.com", "^https://.*\\.example\\.net$"])
///     .with_methods(["GET", "POST"])
///     .with_headers(["*"])
///     .with_override_existing(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins: `*`, `^regex$` or exact origins
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_origins: Vec<String>,

    /// Whether the computed CORS headers are written to responses
    #[serde(skip_serializing_if = "is_false")]
    pub override_existing_cors: bool,

    /// Methods advertised in `Access-Control-Allow-Methods`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_methods: Vec<String>,

    /// Whether to send `Access-Control-Allow-Credentials: true`
    #[serde(skip_serializing_if = "is_false")]
    pub allow_credentials: bool,

    /// Preflight cache duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,

    /// Headers advertised in `Access-Control-Allow-Headers`, `*` echoes the requested ones
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_headers: Vec<String>,

    /// Headers advertised in `Access-Control-Expose-Headers`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exposed_headers: Vec<String>,
}

#[inline]
fn is_false(value: &bool) -> bool {
    !*value
}

impl CorsConfig {
    /// Parses the JSON form of the configuration
    ///
    /// # Example
    /// ```no_run
    /// use cors_gate::CorsConfig;
    ///
    /// let config = CorsConfig::from_json(r#"{
    ///     "allowed_origins": ["https://example.com"],
    ///     "max_age": 600
    /// }"#).unwrap();
    /// ```
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(Error::from)
    }

    /// Serializes the configuration into its JSON form
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(Error::from)
    }

    /// Configures the allowed origins
    ///
    /// Default value: `*` (any origin is allowed)
    pub fn with_origins<T, S>(mut self, origins: T) -> Self
    where
        T: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Configures CORS to allow any origin
    pub fn with_any_origin(mut self) -> Self {
        self.allowed_origins = vec![WILDCARD_STR.into()];
        self
    }

    /// Configures the methods advertised in the
    /// [`Access-Control-Allow-Methods`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Reference/Headers/Access-Control-Allow-Methods) header
    ///
    /// Default value: `GET, POST, PUT, DELETE, PATCH, OPTIONS`
    pub fn with_methods<T, S>(mut self, methods: T) -> Self
    where
        T: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.allowed_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Configures the headers advertised in the
    /// [`Access-Control-Allow-Headers`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Reference/Headers/Access-Control-Allow-Headers) header,
    /// `*` echoes the `Access-Control-Request-Headers` of the preflight request
    ///
    /// Default value: empty (the header is not sent)
    pub fn with_headers<T, S>(mut self, headers: T) -> Self
    where
        T: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Configures the headers advertised in the
    /// [`Access-Control-Expose-Headers`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Reference/Headers/Access-Control-Expose-Headers) header
    ///
    /// Default value: empty (the header is not sent)
    pub fn with_expose_headers<T, S>(mut self, headers: T) -> Self
    where
        T: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.exposed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Configures the [`Access-Control-Max-Age`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Reference/Headers/Access-Control-Max-Age)
    /// value in seconds, a negative value disables the header
    ///
    /// Default value: 5 seconds (also used for `0`), values above 86,400 are capped
    pub fn with_max_age(mut self, secs: i64) -> Self {
        self.max_age = Some(secs);
        self
    }

    /// Configures whether to allow credentials
    ///
    /// Default value: `false`
    pub fn with_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    /// Configures whether the computed CORS headers are written to responses
    ///
    /// Default value: `false` (no CORS header is written)
    pub fn with_override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing_cors = override_existing;
        self
    }

    /// Provisions and validates the configuration in one go
    pub fn build(mut self) -> Result<PolicyConfig, Error> {
        self.provision()?;
        self.validate()
    }

    /// Fills in the defaults for everything left unset, running it again changes nothing
    fn apply_defaults(&mut self) {
        if self.allowed_origins.is_empty() {
            self.allowed_origins = vec![WILDCARD_STR.into()];
            tracing::debug!("CORS: no allowed origins specified, defaulting to * (all origins)");
        }

        if self.allowed_methods.is_empty() {
            self.allowed_methods = DEFAULT_METHODS.iter().map(|m| m.to_string()).collect();
            tracing::debug!("CORS: no allowed methods specified, defaulting to {}", build_csv(DEFAULT_METHODS));
        }

        if matches!(self.max_age, None | Some(0)) {
            self.max_age = Some(DEFAULT_MAX_AGE);
            tracing::debug!("CORS: no max age specified, defaulting to {DEFAULT_MAX_AGE} seconds");
        }
    }

    fn header_value(header: &'static str, value: String) -> Result<HeaderValue, Error> {
        HeaderValue::from_str(&value)
            .map_err(|_| Error::InvalidHeaderValue { header, value })
    }
}

impl Provisioner for CorsConfig {
    fn provision(&mut self) -> Result<(), Error> {
        self.apply_defaults();

        tracing::info!(
            allowed_origins = ?self.allowed_origins,
            override_existing_cors = self.override_existing_cors,
            allowed_methods = ?self.allowed_methods,
            allow_credentials = self.allow_credentials,
            max_age = ?self.max_age,
            allowed_headers = ?self.allowed_headers,
            exposed_headers = ?self.exposed_headers,
            "CORS: configured"
        );

        Ok(())
    }
}

impl Validator for CorsConfig {
    type Validated = PolicyConfig;

    fn validate(mut self) -> Result<PolicyConfig, Error> {
        self.apply_defaults();

        if let Some(method) = self.allowed_methods
            .iter()
            .find(|m| memchr::memchr(b',', m.as_bytes()).is_some()) {
            return Err(Error::MalformedMethod(method.clone()));
        }

        let max_age = match self.max_age.unwrap_or(DEFAULT_MAX_AGE) {
            secs if secs > MAX_AGE_LIMIT as i64 => {
                tracing::warn!("CORS: max age {secs} capped to 24 hours ({MAX_AGE_LIMIT} seconds)");
                MAX_AGE_LIMIT
            }
            secs if secs < 0 => {
                tracing::warn!("CORS: negative max age {secs} raised to 0, the max age header won't be sent");
                0
            }
            secs => secs as u32,
        };

        let allow_methods_value = Self::header_value(
            "access-control-allow-methods",
            build_csv(&self.allowed_methods)
        )?;

        let allow_headers_value = if self.allowed_headers.is_empty() {
            AllowHeaders::None
        } else if PolicyConfig::contains_wildcard(&self.allowed_headers) {
            AllowHeaders::Echo
        } else {
            AllowHeaders::List(Self::header_value(
                "access-control-allow-headers",
                build_csv(&self.allowed_headers)
            )?)
        };

        let expose_headers_value = if self.exposed_headers.is_empty() {
            None
        } else {
            Some(Self::header_value(
                "access-control-expose-headers",
                build_csv(&self.exposed_headers)
            )?)
        };

        let max_age_value = (max_age > 0)
            .then(|| HeaderValue::from_str(itoa::Buffer::new().format(max_age)).ok())
            .flatten();

        let allowed_origins = self.allowed_origins
            .iter()
            .map(|o| OriginPattern::parse(o))
            .collect();

        Ok(PolicyConfig {
            allowed_origins,
            override_existing_cors: self.override_existing_cors,
            allowed_methods: self.allowed_methods,
            allow_credentials: self.allow_credentials,
            max_age,
            allowed_headers: self.allowed_headers,
            exposed_headers: self.exposed_headers,
            allow_methods_value,
            allow_headers_value,
            expose_headers_value,
            max_age_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_creates_default_cors_config() {
        let config = CorsConfig::default();

        assert!(config.allowed_origins.is_empty());
        assert!(config.allowed_methods.is_empty());
        assert!(config.allowed_headers.is_empty());
        assert!(config.exposed_headers.is_empty());
        assert_eq!(config.max_age, None);
        assert!(!config.allow_credentials);
        assert!(!config.override_existing_cors);
    }

    #[test]
    fn it_provisions_defaults() {
        let mut config = CorsConfig::default();
        config.provision().unwrap();

        assert_eq!(config.allowed_origins, ["*"]);
        assert_eq!(config.allowed_methods, DEFAULT_METHODS);
        assert_eq!(config.max_age, Some(DEFAULT_MAX_AGE));
    }

    #[test]
    fn it_does_not_overwrite_configured_values_on_provision() {
        let mut config = CorsConfig::default()
            .with_origins(["https://example.com"])
            .with_methods(["GET"])
            .with_max_age(30);
        config.provision().unwrap();

        assert_eq!(config.allowed_origins, ["https://example.com"]);
        assert_eq!(config.allowed_methods, ["GET"]);
        assert_eq!(config.max_age, Some(30));
    }

    #[test]
    fn it_provisions_default_max_age_for_zero() {
        let mut config = CorsConfig::default().with_max_age(0);
        config.provision().unwrap();

        assert_eq!(config.max_age, Some(DEFAULT_MAX_AGE));
    }

    #[test]
    fn it_uses_default_max_age_for_explicit_zero() {
        let from_json = CorsConfig::from_json(r#"{ "max_age": 0 }"#)
            .unwrap()
            .build()
            .unwrap();
        let from_builder = CorsConfig::default()
            .with_max_age(0)
            .build()
            .unwrap();

        assert_eq!(from_json.max_age(), 5);
        assert_eq!(from_json.max_age_value.unwrap(), "5");
        assert_eq!(from_builder.max_age(), 5);
    }

    #[test]
    fn it_caps_max_age() {
        let policy = CorsConfig::default()
            .with_max_age(100_000)
            .build()
            .unwrap();

        assert_eq!(policy.max_age(), 86_400);
        assert_eq!(policy.max_age_value.unwrap(), "86400");
    }

    #[test]
    fn it_keeps_max_age_at_the_limit() {
        let policy = CorsConfig::default()
            .with_max_age(86_400)
            .build()
            .unwrap();

        assert_eq!(policy.max_age(), 86_400);
    }

    #[test]
    fn it_raises_negative_max_age_to_zero() {
        let policy = CorsConfig::default()
            .with_max_age(-10)
            .build()
            .unwrap();

        assert_eq!(policy.max_age(), 0);
        assert!(policy.max_age_value.is_none());
    }

    #[test]
    fn it_uses_default_max_age() {
        let policy = CorsConfig::default().build().unwrap();

        assert_eq!(policy.max_age(), 5);
        assert_eq!(policy.max_age_value.unwrap(), "5");
    }

    #[test]
    fn it_rejects_comma_separated_methods() {
        let result = CorsConfig::default()
            .with_methods(["GET,POST"])
            .build();

        assert!(matches!(result, Err(Error::MalformedMethod(m)) if m == "GET,POST"));
    }

    #[test]
    fn it_accepts_separate_methods() {
        let policy = CorsConfig::default()
            .with_methods(["GET", "POST"])
            .build()
            .unwrap();

        assert_eq!(policy.allow_methods_value, "GET, POST");
    }

    #[test]
    fn it_applies_defaults_when_validated_without_provisioning() {
        let policy = CorsConfig::default()
            .with_override_existing(true)
            .validate()
            .unwrap();

        assert_eq!(policy.allowed_origins(), [OriginPattern::Wildcard]);
        assert!(policy.is_allowed("https://example.com"));
        assert_eq!(policy.allowed_methods(), DEFAULT_METHODS);
        assert_eq!(policy.allow_methods_value, "GET, POST, PUT, DELETE, PATCH, OPTIONS");
        assert_eq!(policy.max_age(), 5);
    }

    #[test]
    fn it_gives_same_policy_with_or_without_provisioning() {
        let mut provisioned = CorsConfig::default().with_headers(["*"]);
        provisioned.provision().unwrap();
        let provisioned = provisioned.validate().unwrap();
        let validated = CorsConfig::default()
            .with_headers(["*"])
            .validate()
            .unwrap();

        assert_eq!(provisioned.allowed_origins(), validated.allowed_origins());
        assert_eq!(provisioned.allowed_methods(), validated.allowed_methods());
        assert_eq!(provisioned.max_age(), validated.max_age());
    }

    #[test]
    fn it_precomputes_allow_headers() {
        let list = CorsConfig::default()
            .with_headers(["Content-Type", "X-Custom"])
            .build()
            .unwrap();
        let echo = CorsConfig::default()
            .with_headers(["Content-Type", "*"])
            .build()
            .unwrap();
        let none = CorsConfig::default().build().unwrap();

        assert_eq!(list.allow_headers_value, AllowHeaders::List(HeaderValue::from_static("Content-Type, X-Custom")));
        assert_eq!(echo.allow_headers_value, AllowHeaders::Echo);
        assert!(echo.echoes_request_headers());
        assert_eq!(none.allow_headers_value, AllowHeaders::None);
    }

    #[test]
    fn it_precomputes_expose_headers() {
        let policy = CorsConfig::default()
            .with_expose_headers(["X-Total-Count", "X-Page"])
            .build()
            .unwrap();

        assert_eq!(policy.expose_headers_value.unwrap(), "X-Total-Count, X-Page");
    }

    #[test]
    fn it_rejects_invalid_header_values() {
        let result = CorsConfig::default()
            .with_expose_headers(["X-Bad\nHeader"])
            .build();

        assert!(matches!(
            result,
            Err(Error::InvalidHeaderValue { header, .. }) if header == "access-control-expose-headers"
        ));
    }

    #[test]
    fn it_compiles_origin_patterns() {
        let policy = CorsConfig::default()
            .with_origins(["*", r"^https://.*\.example\.com$", "https://example.org"])
            .build()
            .unwrap();

        assert!(matches!(policy.allowed_origins()[0], OriginPattern::Wildcard));
        assert!(matches!(policy.allowed_origins()[1], OriginPattern::Regex { compiled: Some(_), .. }));
        assert!(matches!(policy.allowed_origins()[2], OriginPattern::Exact(_)));
    }

    #[test]
    fn it_does_not_fail_on_invalid_origin_regex() {
        let policy = CorsConfig::default()
            .with_origins(["^https://(broken$"])
            .build()
            .unwrap();

        assert!(!policy.is_allowed("https://(broken"));
    }

    #[test]
    fn it_parses_json_config() {
        let config = CorsConfig::from_json(r#"{
            "allowed_origins": ["https://example.com"],
            "override_existing_cors": true,
            "allowed_methods": ["GET", "POST"],
            "allow_credentials": true,
            "max_age": 600,
            "allowed_headers": ["*"],
            "exposed_headers": ["X-Total-Count"]
        }"#).unwrap();

        assert_eq!(config, CorsConfig::default()
            .with_origins(["https://example.com"])
            .with_override_existing(true)
            .with_methods(["GET", "POST"])
            .with_credentials(true)
            .with_max_age(600)
            .with_headers(["*"])
            .with_expose_headers(["X-Total-Count"]));
    }

    #[test]
    fn it_parses_empty_json_config() {
        let config = CorsConfig::from_json("{}").unwrap();

        assert_eq!(config, CorsConfig::default());
    }

    #[test]
    fn it_rejects_unknown_json_fields() {
        let result = CorsConfig::from_json(r#"{ "allowed_origin": ["*"] }"#);

        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn it_omits_empty_values_in_json() {
        let json = CorsConfig::default()
            .with_origins(["https://example.com"])
            .to_json()
            .unwrap();

        assert_eq!(json, r#"{"allowed_origins":["https://example.com"]}"#);
    }
}
