#![allow(dead_code)]

use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, atomic::{AtomicUsize, Ordering}},
};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    body::Incoming,
    header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN},
    server::conn::http1,
    service::service_fn,
    Request,
    Response,
};
use hyper_util::rt::TokioIo;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use cors_gate::{CorsService, PolicyConfig};

/// Path whose handler sets its own `Access-Control-Allow-Origin` header
pub const PRESET_PATH: &str = "/preset";

/// Origin the `/preset` handler allows
pub const PRESET_ORIGIN: &str = "https://preset.com";

/// A hyper server running the CORS middleware in front of a plain handler
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    calls: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Binds a random local port and starts serving requests with the `policy`
    pub async fn spawn(policy: PolicyConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let service = CorsService::new(policy, service_fn({
            let calls = calls.clone();
            move |request| handle(request, calls.clone())
        }));

        let (tx, mut rx) = oneshot::channel::<()>();
        let server_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else {
                            continue;
                        };
                        let service = service.clone();
                        tokio::spawn(async move {
                            let _ = http1::Builder::new()
                                .serve_connection(TokioIo::new(stream), service)
                                .await;
                        });
                    }
                    _ = &mut rx => break,
                }
            }
        });

        Self {
            addr,
            calls,
            shutdown_tx: Some(tx),
            server_handle: Some(server_handle),
        }
    }

    /// Constructs an absolute URL for the given path
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Creates an HTTP/1 client for this server
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .http1_only()
            .no_proxy()
            .build()
            .unwrap()
    }

    /// How many times the wrapped handler has run
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Stops accepting connections and waits for the server task
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.server_handle.take() {
            let _ = tokio::time::timeout(
                tokio::time::Duration::from_secs(5),
                handle
            ).await;
        }
    }
}

async fn handle(
    request: Request<Incoming>,
    calls: Arc<AtomicUsize>
) -> Result<Response<Full<Bytes>>, Infallible> {
    calls.fetch_add(1, Ordering::SeqCst);

    let mut response = Response::new(Full::new(Bytes::from_static(b"ok")));
    if request.uri().path() == PRESET_PATH {
        response
            .headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(PRESET_ORIGIN));
    }

    Ok(response)
}
