use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::provisioning::{
    CallerContext, DomainState, DomainUpdate, ProvisioningError, VerificationStatus,
};

#[derive(Debug, Deserialize)]
pub struct SetDomainRequest {
    /// Raw user input; empty or missing removes the domain.
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DomainResponse {
    pub success: bool,
    pub domain: Option<String>,
    pub state: DomainState,
}

impl From<DomainUpdate> for DomainResponse {
    fn from(update: DomainUpdate) -> Self {
        Self {
            success: true,
            domain: update.domain,
            state: update.state,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub success: bool,
    /// `verified` once the domain resolves to the platform.
    pub state: DomainState,
    #[serde(flatten)]
    pub status: VerificationStatus,
}

impl From<VerificationStatus> for VerificationResponse {
    fn from(status: VerificationStatus) -> Self {
        Self {
            success: true,
            state: DomainState::after_verification(&status),
            status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_kind: String,
    pub message: String,
}

impl ProvisioningError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProvisioningError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ProvisioningError::Forbidden | ProvisioningError::EntitlementDenied => {
                StatusCode::FORBIDDEN
            }
            ProvisioningError::SiteNotFound => StatusCode::NOT_FOUND,
            ProvisioningError::InvalidDomain(_) => StatusCode::BAD_REQUEST,
            ProvisioningError::DomainTaken(_) => StatusCode::CONFLICT,
            ProvisioningError::ProviderError(_) => StatusCode::BAD_GATEWAY,
            ProvisioningError::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProvisioningError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error_kind: self.kind().to_string(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// "Save domain".
pub async fn set_site_domain(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    caller: Option<Extension<CallerContext>>,
    Json(request): Json<SetDomainRequest>,
) -> Result<Json<DomainResponse>, ProvisioningError> {
    let caller = caller.map(|Extension(c)| c);
    let raw = request.domain.unwrap_or_default();

    let update = state
        .provisioner
        .set_domain(caller.as_ref(), &site_id, &raw)
        .await?;
    Ok(Json(update.into()))
}

/// "Remove domain".
pub async fn remove_site_domain(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    caller: Option<Extension<CallerContext>>,
) -> Result<Json<DomainResponse>, ProvisioningError> {
    let caller = caller.map(|Extension(c)| c);

    let update = state
        .provisioner
        .remove_domain(caller.as_ref(), &site_id)
        .await?;
    Ok(Json(update.into()))
}

/// "Verify DNS".
pub async fn verify_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<VerificationResponse>, ProvisioningError> {
    let status = state.provisioner.verify_domain(&domain).await?;
    Ok(Json(status.into()))
}
