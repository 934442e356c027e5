use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::provisioning::{CallerContext, ProvisioningError};

/// Header carrying the signed-in user, set by the app shell.
pub const X_USER_ID: &str = "x-user-id";

/// Shared secret between the app shell and this API.
#[derive(Clone, Default)]
pub struct DashboardAuth {
    api_key: Option<Arc<str>>,
}

impl DashboardAuth {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()).map(Arc::from),
        }
    }

    fn accepts(&self, authorization: Option<&str>) -> bool {
        match &self.api_key {
            None => true,
            Some(key) => authorization
                .and_then(|v| v.strip_prefix("Bearer "))
                .is_some_and(|presented| presented == key.as_ref()),
        }
    }
}

/// Checks the bearer key and attaches the caller, if any.
///
/// A missing `X-User-Id` is not rejected here; the provisioning workflow
/// decides which actions need a caller.
pub async fn dashboard_auth_middleware(
    State(auth): State<DashboardAuth>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if !auth.accepts(authorization) {
        tracing::warn!(path = %request.uri().path(), "Dashboard request with bad API key");
        return ProvisioningError::AuthenticationRequired.into_response();
    }

    let caller = request
        .headers()
        .get(X_USER_ID)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(CallerContext::new);

    if let Some(caller) = caller {
        request.extensions_mut().insert(caller);
    }

    next.run(request).await
}
