//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wrap it in host routing so tenant hosts are rewritten before matching
//! - Wire up middleware (request id, tracing, timeout)
//! - Apply platform config reloads to the live classifier
//! - Serve until the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{DashboardConfig, EdgeConfig};
use crate::dashboard::setup_dashboard_router;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::site::site_handler;
use crate::lifecycle::Services;
use crate::provisioning::DomainProvisioner;
use crate::routing::{host_routing, HostClassifier, SharedClassifier};
use crate::store::SiteStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub provisioner: Arc<DomainProvisioner>,
    pub store: Arc<dyn SiteStore>,
    pub dashboard: DashboardConfig,
}

/// HTTP server for the tenant edge.
pub struct HttpServer {
    router: Router,
    config: EdgeConfig,
    classifier: SharedClassifier,
}

impl HttpServer {
    pub fn new(config: EdgeConfig, services: Services) -> Self {
        let state = AppState {
            provisioner: services.provisioner,
            store: services.store,
            dashboard: config.dashboard.clone(),
        };

        let router = Self::build_router(&config, state, services.classifier.clone());
        Self {
            router,
            config,
            classifier: services.classifier,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &EdgeConfig, state: AppState, classifier: SharedClassifier) -> Router {
        let routes = Router::new()
            .route("/healthz", get(health))
            .route("/site/{identifier}", get(site_handler))
            .route("/site/{identifier}/", get(site_handler))
            .route("/site/{identifier}/{*path}", get(site_handler))
            .with_state(state.clone())
            .merge(setup_dashboard_router(state));

        // Middleware on a plain Router runs after route matching, so the
        // rewrite has to wrap the routes as a service.
        Router::new()
            .fallback_service(routes)
            .layer(middleware::from_fn_with_state(classifier, host_routing))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<EdgeConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            base_domains = ?self.config.platform.base_domains,
            "HTTP server starting"
        );

        tokio::spawn(apply_config_updates(
            self.classifier.clone(),
            config_updates,
            shutdown.resubscribe(),
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Swap in a freshly built classifier for each reloaded config.
async fn apply_config_updates(
    classifier: SharedClassifier,
    mut updates: mpsc::UnboundedReceiver<EdgeConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(config) => {
                    classifier.store(Arc::new(HostClassifier::new(&config.platform)));
                    tracing::info!(
                        platform_domains = config.platform.domains.len(),
                        base_domains = ?config.platform.base_domains,
                        "Host classifier reloaded"
                    );
                }
                None => break,
            },
            _ = shutdown.recv() => break,
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
