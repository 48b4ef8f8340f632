//! Network module with deferred startup lifecycle.
//!
//! `new()` allocates shared state, `start()` binds the TCP listener, and
//! `serve()` accepts connections until the shutdown future resolves.
//! Splitting `start()` from `serve()` lets the caller learn the bound port
//! (useful with port 0) before traffic flows.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::{NetworkConfig, TlsConfig};
use super::handlers::{
    batch_handler, describe_category_handler, describe_handler, execute_handler, health_handler,
    help_handler, liveness_handler, query_handler, readiness_handler, AppState,
};
use super::middleware::{apply_http_layers, timeout_layer, track_in_flight};
use super::shutdown::ShutdownController;
use crate::service::Dispatcher;

/// Owns the HTTP server lifecycle.
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    dispatcher: Arc<Dispatcher>,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    /// Creates the module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            config,
            listener: None,
            dispatcher,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `POST /execute`, `POST /query`, `POST /batch`
    /// - `GET /help`, `GET /describe`, `GET /describe/{category}`
    /// - `GET /health`, `GET /health/live`, `GET /health/ready`
    ///
    /// Dispatch routes count toward in-flight tracking and answer 503 once
    /// draining starts; health routes stay reachable throughout. Only health
    /// and introspection routes carry the request timeout, so an execute,
    /// query, or batch always runs to completion and returns its result.
    pub fn build_router(&self) -> Router {
        let state = AppState {
            dispatcher: Arc::clone(&self.dispatcher),
            shutdown: Arc::clone(&self.shutdown),
            start_time: Instant::now(),
        };
        let in_flight = from_fn_with_state(Arc::clone(&self.shutdown), track_in_flight);

        let operations = Router::new()
            .route("/execute", post(execute_handler))
            .route("/query", post(query_handler))
            .route("/batch", post(batch_handler))
            .route_layer(in_flight.clone());

        let introspection = Router::new()
            .route("/help", get(help_handler))
            .route("/describe", get(describe_handler))
            .route("/describe/{category}", get(describe_category_handler))
            .route_layer(in_flight);

        let bounded = Router::new()
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .merge(introspection)
            .layer(timeout_layer(&self.config));

        let router = bounded.merge(operations);
        apply_http_layers(router, &self.config).with_state(state)
    }

    /// Binds the TCP listener and returns the bound port.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "TCP listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    ///
    /// Once `shutdown` fires the health state becomes `Draining`, dispatch
    /// routes answer 503, and up to `drain_timeout` is spent waiting for
    /// in-flight requests before the state becomes `Stopped`.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called, if TLS material cannot
    /// be loaded, or on a fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow!("start() must be called before serve()"))?;
        let router = self.build_router();
        let ctrl = Arc::clone(&self.shutdown);

        let signal = {
            let ctrl = Arc::clone(&ctrl);
            async move {
                shutdown.await;
                info!("shutdown requested, draining");
                ctrl.trigger_shutdown();
            }
        };

        ctrl.set_ready();

        match &self.config.tls {
            Some(tls) => serve_tls(listener, router, tls, signal).await?,
            None => serve_plain(listener, router, signal).await?,
        }

        if ctrl.wait_for_drain(self.config.drain_timeout).await {
            info!("all in-flight requests drained");
        } else {
            warn!(
                in_flight = ctrl.in_flight_count(),
                "drain timeout expired with requests still in flight"
            );
        }
        Ok(())
    }
}

async fn serve_plain(
    listener: TcpListener,
    router: Router,
    signal: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("serving plain HTTP");
    axum::serve(listener, router)
        .with_graceful_shutdown(signal)
        .await
        .context("HTTP server terminated with error")
}

/// Serves HTTPS through `axum-server`, reusing the pre-bound listener.
async fn serve_tls(
    listener: TcpListener,
    router: Router,
    tls: &TlsConfig,
    signal: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .with_context(|| {
            format!(
                "failed to load TLS material from {} and {}",
                tls.cert_path.display(),
                tls.key_path.display()
            )
        })?;

    let addr = listener.local_addr()?;
    let std_listener = listener.into_std()?;
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        signal.await;
        shutdown_handle.graceful_shutdown(None);
    });

    info!(%addr, "serving HTTPS");
    axum_server::from_tcp_rustls(std_listener, rustls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .context("HTTPS server terminated with error")
}
