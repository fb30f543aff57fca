//! CORS middleware

use std::{future::Future, sync::Arc};
use futures_util::future::BoxFuture;
use hyper::{service::Service, Request, Response};
use crate::{
    lifecycle::MiddlewareHandler,
    policy::PolicyConfig,
    request::CorsRequest,
    writer::HeaderWriter,
};

impl MiddlewareHandler for PolicyConfig {
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
        Fut: Future<Output = Result<Response<R>, E>> + Send,
    {
        async move {
            let cors = CorsRequest::from_request(&request);

            let Some(origin) = cors.origin() else {
                tracing::trace!("CORS: no origin header, skipping");
                return next(request).await;
            };

            let admitted = self.is_allowed(origin);

            let mut response = next(request).await?;

            if admitted {
                self.writer().apply(&cors, response.headers_mut());
            } else {
                HeaderWriter::log_existing(response.headers());
                tracing::debug!("CORS: origin {origin:?} is not allowed");
            }

            Ok(response)
        }
    }
}

/// A [`Service`] that runs the wrapped service behind a CORS policy
///
/// # Example
/// ```no_run
/// use std::convert::Infallible;
/// use hyper::{service::service_fn, Request, Response};
/// use cors_gate::{CorsConfig, CorsService};
///
/// let policy = CorsConfig::default()
///     .with_origins(["https://example.com"])
///     .with_override_existing(true)
///     .build()
///     .unwrap();
///
/// let service = CorsService::new(policy, service_fn(|_: Request<String>| async {
///     Ok::<_, Infallible>(Response::new(String::from("ok")))
/// }));
/// ```
#[derive(Debug, Clone)]
pub struct CorsService<S> {
    policy: Arc<PolicyConfig>,
    inner: S,
}

impl<S> CorsService<S> {
    /// Wraps the `inner` service
    #[inline]
    pub fn new(policy: PolicyConfig, inner: S) -> Self {
        Self::from_arc(Arc::new(policy), inner)
    }

    /// Wraps the `inner` service with an already shared policy
    #[inline]
    pub fn from_arc(policy: Arc<PolicyConfig>, inner: S) -> Self {
        Self { policy, inner }
    }

    /// The policy requests are handled with
    #[inline]
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// The wrapped service
    #[inline]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S, B, R> Service<Request<B>> for CorsService<S>
where
    S: Service<Request<B>, Response = Response<R>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
{
    type Response = Response<R>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    #[inline]
    fn call(&self, request: Request<B>) -> Self::Future {
        let policy = self.policy.clone();
        let inner = self.inner.clone();
        Box::pin(async move {
            policy
                .handle(request, move |request| inner.call(request))
                .await
        })
    }
}
