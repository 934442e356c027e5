//! Hosting-platform REST client with timeout and error mapping.
//!
//! # Responsibilities
//! - Attach and detach custom domains on the configured project
//! - Query the platform's authoritative domain configuration
//! - Map transport failures and timeouts to `Unavailable`

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::HostingConfig;
use crate::hosting::types::{
    map_api_error, AddDomainBody, DomainConfig, HostingError, HostingResult, PlatformDomainStatus,
    ProjectDomain,
};
use crate::hosting::HostingPlatform;
use crate::observability::metrics;
use crate::resilience::with_timeout;

/// Credentials resolved from configuration.
#[derive(Clone)]
struct Credentials {
    token: String,
    project_id: String,
}

/// REST client for the hosting platform.
#[derive(Clone)]
pub struct HostingApiClient {
    client: reqwest::Client,
    base_url: Url,
    credentials: Option<Credentials>,
    team_id: Option<String>,
    timeout_duration: Duration,
}

impl HostingApiClient {
    /// Create a new client.
    ///
    /// A config without token or project yields a client that answers
    /// `NotConfigured` to every call.
    pub fn new(config: &HostingConfig) -> HostingResult<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            HostingError::Unavailable(format!(
                "invalid API base URL '{}': {}",
                config.api_base_url, e
            ))
        })?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("tenant-edge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HostingError::Unavailable(format!("HTTP client: {e}")))?;

        let credentials = match (&config.token, &config.project_id) {
            (Some(token), Some(project_id)) if config.is_configured() => Some(Credentials {
                token: token.clone(),
                project_id: project_id.clone(),
            }),
            _ => None,
        };

        if credentials.is_none() {
            tracing::info!("Hosting platform credentials absent, domain provisioning runs in DNS-only mode");
        }

        Ok(Self {
            client,
            base_url,
            credentials,
            team_id: config.team_id.clone().filter(|t| !t.is_empty()),
            timeout_duration: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> HostingResult<&Credentials> {
        self.credentials.as_ref().ok_or(HostingError::NotConfigured)
    }

    /// Build `{base}/{segments...}?teamId=...`.
    fn endpoint(&self, segments: &[&str]) -> HostingResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HostingError::Unavailable("API base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        if let Some(team_id) = &self.team_id {
            url.query_pairs_mut().append_pair("teamId", team_id);
        }
        Ok(url)
    }

    /// Send a request and return the status plus body text.
    async fn execute(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> HostingResult<(StatusCode, String)> {
        let credentials = self.credentials()?;
        let start = Instant::now();

        tracing::debug!(operation, method = %method, url = %url, "Hosting API request");

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&credentials.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        let result = match with_timeout(self.timeout_duration, exchange).await {
            Ok(Ok((status, text))) if status.is_success() => Ok((status, text)),
            Ok(Ok((status, text))) => Err(map_api_error(status.as_u16(), &text)),
            Ok(Err(e)) => Err(HostingError::Unavailable(e.to_string())),
            Err(elapsed) => Err(HostingError::Unavailable(elapsed.to_string())),
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.label(),
        };
        metrics::record_hosting_call(operation, outcome, start);

        if let Err(e) = &result {
            tracing::warn!(operation, error = %e, "Hosting API call failed");
        }
        result
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
    ) -> HostingResult<T> {
        let (_, text) = self.execute(operation, Method::GET, url, None).await?;
        serde_json::from_str(&text).map_err(|e| HostingError::Api {
            status: 200,
            code: "invalid_response".into(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl HostingPlatform for HostingApiClient {
    async fn add_domain(&self, domain: &str) -> HostingResult<()> {
        let credentials = self.credentials()?;
        let url = self.endpoint(&["v10", "projects", credentials.project_id.as_str(), "domains"])?;
        let body = serde_json::to_value(AddDomainBody { name: domain })
            .map_err(|e| HostingError::Unavailable(e.to_string()))?;

        self.execute("add_domain", Method::POST, url, Some(body))
            .await
            .map(|_| ())
    }

    async fn remove_domain(&self, domain: &str) -> HostingResult<()> {
        let credentials = self.credentials()?;
        let url = self.endpoint(&["v9", "projects", credentials.project_id.as_str(), "domains", domain])?;

        self.execute("remove_domain", Method::DELETE, url, None)
            .await
            .map(|_| ())
    }

    async fn domain_status(&self, domain: &str) -> HostingResult<PlatformDomainStatus> {
        let credentials = self.credentials()?;

        let project_url =
            self.endpoint(&["v9", "projects", credentials.project_id.as_str(), "domains", domain])?;
        let project_domain: ProjectDomain = self.get_json("domain_status", project_url).await?;

        let config_url = self.endpoint(&["v6", "domains", domain, "config"])?;
        let config: DomainConfig = self.get_json("domain_config", config_url).await?;

        Ok(PlatformDomainStatus {
            configured: !config.misconfigured,
            verified: project_domain.verified,
            pending_challenges: project_domain.verification.unwrap_or_default(),
        })
    }
}

impl std::fmt::Debug for HostingApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostingApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("configured", &self.is_configured())
            .field("team_id", &self.team_id)
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}
