//! Host-routing middleware.
//!
//! # Responsibilities
//! - Classify every request by its Host header
//! - Rewrite tenant requests to `/site/{identifier}{path}`
//! - Tell downstream handlers which kind of identifier they got
//!
//! # Design Decisions
//! - Wraps the whole router so the rewrite happens before route matching
//! - Client-supplied `x-site-*` headers are always stripped
//! - Any rewrite failure serves the request as the platform

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, uri::PathAndQuery, HeaderName, HeaderValue, Request, Uri},
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;
use crate::routing::classifier::{is_static_asset, HostClassification, HostClassifier};

/// Carries the subdomain-derived tenant identifier.
pub const X_SITE_SUBDOMAIN: HeaderName = HeaderName::from_static("x-site-subdomain");

/// Carries the custom-domain-derived tenant identifier.
pub const X_SITE_CUSTOM_DOMAIN: HeaderName = HeaderName::from_static("x-site-custom-domain");

/// Classifier shared with the config reload loop.
pub type SharedClassifier = Arc<ArcSwap<HostClassifier>>;

/// Middleware function for tenant host routing.
pub async fn host_routing(
    State(classifier): State<SharedClassifier>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    req.headers_mut().remove(X_SITE_SUBDOMAIN);
    req.headers_mut().remove(X_SITE_CUSTOM_DOMAIN);

    if is_static_asset(req.uri().path()) {
        return next.run(req).await;
    }

    let host = request_host(&req).unwrap_or_default();
    let decision = classifier.load().route(&host, req.uri().path());
    metrics::record_classification(decision.classification.category().as_str());

    let classification = match apply_decision(&mut req, &decision.classification, decision.rewritten_path) {
        Ok(()) => decision.classification,
        Err(reason) => {
            tracing::warn!(host = %host, reason, "Tenant rewrite failed, serving as platform");
            req.headers_mut().remove(X_SITE_SUBDOMAIN);
            req.headers_mut().remove(X_SITE_CUSTOM_DOMAIN);
            HostClassification::PlatformDomain
        }
    };

    tracing::debug!(
        host = %host,
        category = classification.category().as_str(),
        path = %req.uri().path(),
        "Host classified"
    );

    req.extensions_mut().insert(classification);
    next.run(req).await
}

/// Host header, or the URI authority for HTTP/2 requests.
fn request_host(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.as_str().to_string()))
}

fn apply_decision(
    req: &mut Request<Body>,
    classification: &HostClassification,
    rewritten_path: Option<String>,
) -> Result<(), &'static str> {
    let (header_name, identifier) = match classification {
        HostClassification::PlatformDomain => return Ok(()),
        HostClassification::TenantSubdomain(id) => (X_SITE_SUBDOMAIN, id),
        HostClassification::TenantCustomDomain(id) => (X_SITE_CUSTOM_DOMAIN, id),
    };

    let value = HeaderValue::from_str(identifier).map_err(|_| "identifier is not a header value")?;

    if let Some(path) = rewritten_path {
        let uri = rewrite_uri(req.uri(), &path).ok_or("rewritten path is not a valid URI")?;
        *req.uri_mut() = uri;
    }

    req.headers_mut().insert(header_name, value);
    Ok(())
}

/// Replace the path of `uri`, keeping scheme, authority and query.
fn rewrite_uri(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}
