// src/main.rs
use anyhow::Result;
use hyper::{Body, Request, Response, Server, StatusCode};
use status_poller::{
    config::{self, Config, LoggingConfig},
    health::HttpHealthSource,
    metrics::MetricsRegistry,
    page::{render_changes, Page},
    poller::{StatusPoller, STATUS_ELEMENT_ID},
    server::{HealthEndpoint, ServerBuilder},
};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = config::load_config(&config_path).await?;

    init_tracing(&config.logging)?;
    info!("Loaded configuration from: {}", config_path);

    // Serve the health endpoint ourselves when asked to
    if let Some(server) = &config.server {
        let addr = server.socket_addr()?;
        let bound = ServerBuilder::new(addr, HealthEndpoint::new()).bind().await?;
        tokio::spawn(async move {
            if let Err(e) = bound.serve().await {
                error!("Health endpoint server error: {}", e);
            }
        });
    }

    let metrics_registry = MetricsRegistry::new()?;
    let metrics = metrics_registry.collector();

    if config.metrics.enabled {
        let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics.port).into();
        start_metrics_server(metrics_addr, metrics_registry, config.metrics.path.clone())?;
    }

    let handle = start_poller(&config, metrics)?;

    shutdown_signal().await;

    if let Err(e) = handle.shutdown().await {
        warn!("Status poller did not stop cleanly: {}", e);
    }
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = match &logging.filter {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::from_default_env()
            .add_directive("status_poller=debug".parse()?)
            .add_directive("hyper=info".parse()?),
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn start_poller(
    config: &Config,
    metrics: Arc<status_poller::metrics::MetricsCollector>,
) -> Result<status_poller::poller::PollerHandle> {
    let page = Arc::new(Page::new());
    let element = page.insert_element(STATUS_ELEMENT_ID);
    tokio::spawn(render_changes(element.subscribe(), std::io::stdout()));

    let source = Arc::new(HttpHealthSource::new(&config.base_url)?);
    let poller = Arc::new(StatusPoller::new(source, page.clone()).with_metrics(metrics));

    let handle = poller.install();
    page.mark_ready();
    Ok(handle)
}

fn start_metrics_server(addr: SocketAddr, registry: MetricsRegistry, path: String) -> Result<()> {
    let registry = Arc::new(registry);
    let metrics_path = Arc::new(path);
    let service_path = metrics_path.clone();

    let make_service = hyper::service::make_service_fn(move |_| {
        let registry = registry.clone();
        let path = service_path.clone();

        async move {
            Ok::<_, Infallible>(hyper::service::service_fn(move |req: Request<Body>| {
                let registry = registry.clone();
                let path = path.clone();

                async move { Ok::<_, Infallible>(metrics_response(&req, &registry, &path)) }
            }))
        }
    });

    let server = Server::try_bind(&addr)?.serve(make_service);

    info!(
        "Metrics server listening on http://{}{}",
        addr,
        metrics_path.as_str()
    );

    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(())
}

fn metrics_response(req: &Request<Body>, registry: &MetricsRegistry, path: &str) -> Response<Body> {
    if req.uri().path() != path {
        let mut response = Response::new(Body::from("Not Found"));
        *response.status_mut() = StatusCode::NOT_FOUND;
        return response;
    }

    match registry.gather() {
        Ok(metrics) => {
            let mut response = Response::new(Body::from(metrics));
            response.headers_mut().insert(
                hyper::header::CONTENT_TYPE,
                hyper::header::HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            response
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            let mut response = Response::new(Body::from("Internal Server Error"));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
