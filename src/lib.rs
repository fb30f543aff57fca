//! # cors-gate
//!
//! > CORS (Cross-Origin Resource Sharing) decision and header-injection middleware
//! > for [hyper](https://hyper.rs/) based servers.
//!
//! For every request that carries an `Origin` header the middleware decides whether the origin
//! is allowed, tells apart preflight and simple requests, and writes the CORS response headers.
//! The request is always forwarded to the next handler.
//!
//! ## Features
//! * Wildcard, exact and regex (`^...$`) origin patterns, precompiled once
//! * Configuration via builder methods, JSON or the `cors { ... }` directive
//! * Immutable, validated policy shared across concurrent requests
//! * A [`hyper::service::Service`] adapter
//!
//! ## Example
//! ```no_run
//! use cors_gate::{CorsConfig, CorsService};
//!
//! # fn wrap<S>(inner: S) -> Result<CorsService<S>, cors_gate::Error> {
//! let policy = CorsConfig::default()
//!     .with_origins(["^https://.*\\.example\\.com$"])
//!     .with_override_existing(true)
//!     .with_credentials(true)
//!     .build()?;
//!
//! let service = CorsService::new(policy, inner);
//! # Ok(service)
//! # }
//! ```

pub mod config;
pub mod error;
pub mod headers;
pub mod lifecycle;
pub mod middleware;
pub mod origin;
pub mod policy;
pub mod preflight;
pub mod request;
pub mod writer;

pub use crate::{
    config::{CorsConfig, directive::Dispenser},
    error::Error,
    lifecycle::{DirectiveUnmarshaler, MiddlewareHandler, Provisioner, Validator},
    middleware::CorsService,
    origin::{OriginPattern, is_allowed},
    policy::PolicyConfig,
    preflight::is_preflight,
    request::CorsRequest,
    writer::HeaderWriter,
};
