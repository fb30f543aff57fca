//! Capabilities a host exercises at each stage of the middleware lifecycle
//!
//! 1. [`DirectiveUnmarshaler`] - the configuration is read from the `cors` directive
//! 2. [`Provisioner`] - defaults are filled in
//! 3. [`Validator`] - the configuration is checked and frozen into a [`PolicyConfig`](crate::PolicyConfig)
//! 4. [`MiddlewareHandler`] - every request goes through the frozen policy

use std::future::Future;
use hyper::{Request, Response};
use crate::{config::directive::Dispenser, error::Error};

/// Reads the configuration from a tokenized directive
pub trait DirectiveUnmarshaler {
    /// Fills `self` from the tokens of the [`Dispenser`]
    fn unmarshal_directive(&mut self, dispenser: &mut Dispenser) -> Result<(), Error>;
}

/// Fills in default values before validation
pub trait Provisioner {
    /// Sets up the defaults for everything that wasn't configured
    fn provision(&mut self) -> Result<(), Error>;
}

/// Checks the configuration and produces its validated form
pub trait Validator {
    /// The validated, immutable form
    type Validated;

    /// Validates `self`, any error here is fatal for the startup
    fn validate(self) -> Result<Self::Validated, Error>;
}

/// Handles a request and always passes it to the `next` handler
///
/// Whatever `next` returns, including an error, is returned unchanged
/// apart from the headers the middleware writes.
pub trait MiddlewareHandler {
    /// Handles the `request` and calls `next` exactly once
    fn handle<B, R, E, F, Fut>(
        &self,
        request: Request<B>,
        next: F,
    ) -> impl Future<Output = Result<Response<R>, E>> + Send
    where
        B: Send,
        R: Send,
        E: Send,
        F: FnOnce(Request<B>) -> Fut + Send,
        Fut: Future<Output = Result<Response<R>, E>> + Send;
}
