//! HTTP endpoint serving the exported metrics.
//!
//! Every request to the metrics path refreshes the collector from the hub
//! before encoding, so Prometheus sees data as fresh as its own scrape
//! interval. The endpoint always answers 200, even when the hub is down; in
//! that case it serves whatever the previous successful scrape left behind.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hubwatch::collector::HubCollector;
//! use hubwatch::hub::HubClient;
//! use hubwatch::server::MetricsServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HubClient::builder()
//!         .endpoint("http://192.168.1.10/apps/api/7/devices")
//!         .access_token("0e4a...")
//!         .build()?;
//!     let collector = Arc::new(HubCollector::new(client, &["temperature".to_string()])?);
//!
//!     let server = MetricsServer::bind("0.0.0.0:9100".parse()?).await?;
//!     server.serve(collector).await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, warn};

use crate::collector::HubCollector;
use crate::hub::DeviceSource;

/// Path serving the Prometheus exposition.
pub const METRICS_PATH: &str = "/metrics";

/// A bound listener ready to serve metrics.
#[derive(Debug)]
pub struct MetricsServer {
    listener: TcpListener,
}

impl MetricsServer {
    /// Bind the listening socket. Port 0 picks an ephemeral port.
    pub async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails.
    ///
    /// Each connection is served on its own task, so concurrent scrapes
    /// refresh the collector concurrently.
    pub async fn serve<S>(self, collector: Arc<HubCollector<S>>) -> std::io::Result<()>
    where
        S: DeviceSource + 'static,
    {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let collector = collector.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let collector = collector.clone();
                    async move { handle_request(req, collector.as_ref()).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!(%peer, "Metrics connection error: {}", e);
                }
            });
        }
    }
}

async fn handle_request<B, S>(
    req: Request<B>,
    collector: &HubCollector<S>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    S: DeviceSource,
{
    let path = req.uri().path();

    if path == METRICS_PATH {
        // Failures are logged by the collector; stale series are still served.
        let _ = collector.refresh().await;

        let body = collector.render().unwrap_or_else(|e| {
            error!("Encoding metrics: {}", e);
            String::new()
        });
        Ok(text_response(
            StatusCode::OK,
            prometheus::TEXT_FORMAT,
            body,
        ))
    } else if path == "/health" || path == "/healthz" {
        Ok(text_response(StatusCode::OK, "text/plain", "OK".to_string()))
    } else {
        warn!(path, "Request for unknown path");
        Ok(text_response(
            StatusCode::NOT_FOUND,
            "text/plain",
            "Not Found".to_string(),
        ))
    }
}

fn text_response(
    status: StatusCode,
    content_type: &'static str,
    body: String,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
