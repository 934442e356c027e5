//! Hosting-platform wire types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the hosting platform integration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostingError {
    /// Deployment has no hosting credentials. Always non-fatal.
    #[error("hosting platform integration is not configured")]
    NotConfigured,

    /// Configured, but unreachable, timing out or failing server-side.
    #[error("hosting platform unavailable: {0}")]
    Unavailable(String),

    /// The domain is already attached to this project.
    #[error("domain already exists on this project")]
    AlreadyExists,

    /// The domain belongs to another project.
    #[error("domain is taken by another project")]
    Taken,

    /// The domain is not attached to this project.
    #[error("domain not found on this project")]
    NotFound,

    /// Any other error body, kept opaque.
    #[error("hosting platform error {code} (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}

impl HostingError {
    /// Low-cardinality label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            HostingError::NotConfigured => "not_configured",
            HostingError::Unavailable(_) => "unavailable",
            HostingError::AlreadyExists => "already_exists",
            HostingError::Taken => "taken",
            HostingError::NotFound => "not_found",
            HostingError::Api { .. } => "api_error",
        }
    }

    /// Whether the platform could not give any answer at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, HostingError::NotConfigured | HostingError::Unavailable(_))
    }
}

/// Result type for hosting platform operations.
pub type HostingResult<T> = Result<T, HostingError>;

/// Authoritative configuration state of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlatformDomainStatus {
    /// DNS points at the platform.
    pub configured: bool,
    /// Ownership verified by the platform.
    pub verified: bool,
    /// Records the owner still has to publish.
    pub pending_challenges: Vec<VerificationChallenge>,
}

/// A DNS record the platform asks for before verifying a domain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationChallenge {
    #[serde(rename = "type")]
    pub record_type: String,
    pub domain: String,
    pub value: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddDomainBody<'a> {
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectDomain {
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub verification: Option<Vec<VerificationChallenge>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DomainConfig {
    #[serde(default)]
    pub misconfigured: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Map a non-success response to a [`HostingError`].
pub(crate) fn map_api_error(status: u16, body: &str) -> HostingError {
    let detail = serde_json::from_str::<ApiErrorBody>(body).ok().map(|b| b.error);

    match detail.as_ref().map(|d| d.code.as_str()) {
        Some("domain_already_exists") => return HostingError::AlreadyExists,
        Some("domain_taken") => return HostingError::Taken,
        Some("not_found") => return HostingError::NotFound,
        _ => {}
    }

    if status >= 500 || status == 429 {
        return HostingError::Unavailable(format!("HTTP {status}"));
    }

    let (code, message) = detail
        .map(|d| (d.code, d.message))
        .unwrap_or_else(|| (String::new(), body.chars().take(200).collect()));

    HostingError::Api {
        status,
        code,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let body = |code: &str| format!(r#"{{"error":{{"code":"{code}","message":"x"}}}}"#);
        assert_eq!(map_api_error(409, &body("domain_already_exists")), HostingError::AlreadyExists);
        assert_eq!(map_api_error(409, &body("domain_taken")), HostingError::Taken);
        assert_eq!(map_api_error(404, &body("not_found")), HostingError::NotFound);
    }

    #[test]
    fn test_opaque_error() {
        let err = map_api_error(
            400,
            r#"{"error":{"code":"invalid_domain","message":"bad name"}}"#,
        );
        assert_eq!(
            err,
            HostingError::Api {
                status: 400,
                code: "invalid_domain".into(),
                message: "bad name".into()
            }
        );
        assert_eq!(err.label(), "api_error");
        assert!(!err.is_unreachable());
    }

    #[test]
    fn test_server_errors_are_unavailable() {
        assert!(map_api_error(503, "<html>down</html>").is_unreachable());
        assert!(map_api_error(429, "{}").is_unreachable());
    }

    #[test]
    fn test_non_json_body_kept_as_message() {
        let err = map_api_error(403, "forbidden");
        assert!(err.to_string().contains("forbidden"));
    }

    #[test]
    fn test_challenge_deserialization() {
        let domain: ProjectDomain = serde_json::from_str(
            r#"{"name":"example.com","verified":false,"verification":[
                {"type":"TXT","domain":"_vercel.example.com","value":"vc-domain-verify=abc","reason":"pending_domain_verification"}
            ]}"#,
        )
        .unwrap();
        let challenges = domain.verification.unwrap();
        assert_eq!(challenges[0].record_type, "TXT");
        assert_eq!(challenges[0].domain, "_vercel.example.com");
    }
}
