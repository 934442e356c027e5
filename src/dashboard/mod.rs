//! Dashboard API for the app shell.
//!
//! # Data Flow
//! ```text
//! app shell ── Bearer api_key + X-User-Id ──▶ auth.rs (CallerContext)
//!     → handlers.rs ("save domain" / "remove domain" / "verify DNS")
//!     → DomainProvisioner
//!     → JSON { success, domain | error_kind, message }
//! ```

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::http::server::AppState;
use self::auth::{dashboard_auth_middleware, DashboardAuth};
use self::handlers::*;

pub fn setup_dashboard_router(state: AppState) -> Router {
    let auth = DashboardAuth::new(state.dashboard.api_key.clone());

    Router::new()
        .route(
            "/api/sites/{site_id}/domain",
            put(set_site_domain).delete(remove_site_domain),
        )
        .route("/api/domains/{domain}/verification", get(verify_domain))
        .route_layer(middleware::from_fn_with_state(auth, dashboard_auth_middleware))
        .with_state(state)
}
