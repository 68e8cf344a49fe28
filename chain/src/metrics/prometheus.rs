//! Prometheus-backed metrics and HTTP exporter.
//!
//! Defines a [`MetricsRegistry`] that owns a Prometheus registry and a set
//! of strongly-typed node metrics, plus an async HTTP exporter that serves
//! `/metrics` using `hyper`.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header, server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use prometheus::{self, Encoder, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder};

/// Node-level Prometheus metrics.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Transactions accepted into the pending buffer.
    pub tx_accepted: IntCounter,
    /// Transactions rejected (ownership or signature failure).
    pub tx_rejected: IntCounter,
    /// Blocks proposed by this node.
    pub blocks_proposed: IntCounter,
    /// Blocks accepted from peers.
    pub blocks_accepted: IntCounter,
    /// Blocks rejected from peers.
    pub blocks_rejected: IntCounter,
    /// Prevotes accepted into the tally.
    pub prevotes_accepted: IntCounter,
    /// Precommits accepted into the tally.
    pub precommits_accepted: IntCounter,
    /// Votes rejected (unknown validator, bad signature, or duplicate).
    pub votes_rejected: IntCounter,
    /// Heights finalized by this node.
    pub blocks_finalized: IntCounter,
    /// Fatal safety violations observed by this node.
    pub safety_violations: IntCounter,
    /// Latency of `Node::receive_block`'s validation path, in seconds.
    pub block_validation_seconds: Histogram,
}

impl NodeMetrics {
    /// Registers node metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let tx_accepted = IntCounter::with_opts(Opts::new("tx_accepted_total", "Transactions accepted"))?;
        registry.register(Box::new(tx_accepted.clone()))?;

        let tx_rejected = IntCounter::with_opts(Opts::new("tx_rejected_total", "Transactions rejected"))?;
        registry.register(Box::new(tx_rejected.clone()))?;

        let blocks_proposed = IntCounter::with_opts(Opts::new("blocks_proposed_total", "Blocks proposed"))?;
        registry.register(Box::new(blocks_proposed.clone()))?;

        let blocks_accepted = IntCounter::with_opts(Opts::new("blocks_accepted_total", "Blocks accepted from peers"))?;
        registry.register(Box::new(blocks_accepted.clone()))?;

        let blocks_rejected = IntCounter::with_opts(Opts::new("blocks_rejected_total", "Blocks rejected from peers"))?;
        registry.register(Box::new(blocks_rejected.clone()))?;

        let prevotes_accepted = IntCounter::with_opts(Opts::new("prevotes_accepted_total", "Prevotes accepted"))?;
        registry.register(Box::new(prevotes_accepted.clone()))?;

        let precommits_accepted =
            IntCounter::with_opts(Opts::new("precommits_accepted_total", "Precommits accepted"))?;
        registry.register(Box::new(precommits_accepted.clone()))?;

        let votes_rejected = IntCounter::with_opts(Opts::new("votes_rejected_total", "Votes rejected"))?;
        registry.register(Box::new(votes_rejected.clone()))?;

        let blocks_finalized = IntCounter::with_opts(Opts::new("blocks_finalized_total", "Heights finalized"))?;
        registry.register(Box::new(blocks_finalized.clone()))?;

        let safety_violations =
            IntCounter::with_opts(Opts::new("safety_violations_total", "Fatal safety violations observed"))?;
        registry.register(Box::new(safety_violations.clone()))?;

        let block_validation_seconds = Histogram::with_opts(
            HistogramOpts::new("block_validation_seconds", "Time to validate a received block, in seconds")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(block_validation_seconds.clone()))?;

        Ok(Self {
            tx_accepted,
            tx_rejected,
            blocks_proposed,
            blocks_accepted,
            blocks_rejected,
            prevotes_accepted,
            precommits_accepted,
            votes_rejected,
            blocks_finalized,
            safety_violations,
            block_validation_seconds,
        })
    }
}

/// Wrapper around a Prometheus registry and the node metrics.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub node: NodeMetrics,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with a fresh underlying `Registry`
    /// and registers the node metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("chain".to_string()), None)?;
        let node = NodeMetrics::register(&registry)?;
        Ok(Self { registry, node })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!(error = %e, "failed to encode Prometheus metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Runs an HTTP server that exposes Prometheus metrics.
///
/// Listens on `addr` and serves `GET /metrics` with the Prometheus text
/// exposition format. All other paths return 404. Intended to be spawned
/// onto a Tokio runtime alongside a node.
pub async fn run_prometheus_http_server(
    metrics: Arc<MetricsRegistry>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                handle_request(req, metrics)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, svc).await {
                tracing::error!(error = %err, "prometheus HTTP server error");
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    metrics: Arc<MetricsRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => {
            let body = metrics.gather_text();
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
                .body(Full::new(Bytes::from(body)))
                .unwrap())
        }
        _ => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::from("not found")))
            .unwrap()),
    }
}
