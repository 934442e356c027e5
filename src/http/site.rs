//! Tenant site handler.
//!
//! Requests reach this handler only through `/site/{identifier}...`, normally
//! after the host-routing middleware rewrote them. The metadata header says
//! whether the identifier is a subdomain label or a custom domain.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::request::RequestIdExt;
use crate::http::server::AppState;
use crate::routing::X_SITE_CUSTOM_DOMAIN;
use crate::store::SiteRecord;

#[derive(Debug, Deserialize)]
pub struct SitePath {
    pub identifier: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// What the renderer needs to know about the resolved tenant.
#[derive(Debug, Serialize, Deserialize)]
pub struct SiteSummary {
    pub site_id: String,
    pub subdomain: String,
    pub custom_domain: Option<String>,
    /// `subdomain` or `custom_domain`.
    pub resolved_by: String,
    pub path: String,
}

pub async fn site_handler(
    State(state): State<AppState>,
    Path(params): Path<SitePath>,
    request: Request<Body>,
) -> Response {
    let by_custom_domain = request.headers().contains_key(&X_SITE_CUSTOM_DOMAIN);
    let identifier = params.identifier.to_ascii_lowercase();

    let lookup = if by_custom_domain {
        state.store.find_by_custom_domain(&identifier).await
    } else {
        state.store.find_by_subdomain(&identifier).await
    };

    match lookup {
        Ok(Some(site)) => {
            let path = format!("/{}", params.path.unwrap_or_default());
            Json(summarize(site, by_custom_domain, path)).into_response()
        }
        Ok(None) => {
            tracing::debug!(
                request_id = %request.request_id(),
                identifier = %identifier,
                by_custom_domain,
                "Unknown tenant"
            );
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "site not found" })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request.request_id(), error = %e, "Site lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "site lookup failed" })),
            )
                .into_response()
        }
    }
}

fn summarize(site: SiteRecord, by_custom_domain: bool, path: String) -> SiteSummary {
    SiteSummary {
        site_id: site.site_id,
        subdomain: site.subdomain,
        custom_domain: site.custom_domain,
        resolved_by: if by_custom_domain {
            "custom_domain".to_string()
        } else {
            "subdomain".to_string()
        },
        path,
    }
}
