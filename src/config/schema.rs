//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the tenant edge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Platform-owned hostnames and the tenant subdomain rules.
    pub platform: PlatformConfig,

    /// Hosting-platform API credentials and scoping.
    pub hosting: HostingConfig,

    /// DNS fallback used when the hosting API cannot answer.
    pub dns: DnsConfig,

    /// Dashboard API settings.
    pub dashboard: DashboardConfig,

    /// Site store settings.
    pub store: StoreConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Host classification rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Hostnames served as the platform itself (exact match).
    pub domains: Vec<String>,

    /// Apex domains under which `{label}.{base}` names a tenant.
    pub base_domains: Vec<String>,

    /// Loopback pseudo-TLD treated like a base domain for local testing.
    pub dev_suffix: Option<String>,

    /// Labels that are never tenant identifiers.
    pub reserved_subdomains: Vec<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            domains: vec![
                "tenantedge.app".to_string(),
                "www.tenantedge.app".to_string(),
                "localhost".to_string(),
                "127.0.0.1".to_string(),
            ],
            base_domains: vec!["tenantedge.app".to_string()],
            dev_suffix: Some("localhost".to_string()),
            reserved_subdomains: default_reserved_subdomains(),
        }
    }
}

/// Subdomain labels carved out for operational use.
pub fn default_reserved_subdomains() -> Vec<String> {
    [
        "www", "app", "api", "admin", "dashboard", "mail", "smtp", "ftp", "cdn", "assets",
        "static",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Hosting-platform API configuration.
///
/// Missing `token` or `project_id` means the deployment has no hosting
/// integration; every call then reports `NotConfigured`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostingConfig {
    /// API base URL.
    pub api_base_url: String,

    /// Bearer token.
    pub token: Option<String>,

    /// Project the custom domains are attached to.
    pub project_id: Option<String>,

    /// Optional team scope, sent as `teamId`.
    pub team_id: Option<String>,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl HostingConfig {
    /// True when credentials and a project are present.
    pub fn is_configured(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
            && self.project_id.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.vercel.com".to_string(),
            token: None,
            project_id: None,
            team_id: None,
            timeout_secs: 5,
        }
    }
}

/// DNS fallback configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DnsConfig {
    /// Substrings that identify the hosting platform in a CNAME target.
    pub cname_markers: Vec<String>,

    /// A-record addresses that belong to the hosting platform.
    pub platform_ips: Vec<String>,

    /// Per-lookup timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            cname_markers: vec!["vercel-dns.com".to_string()],
            platform_ips: vec!["76.76.21.21".to_string(), "76.76.21.98".to_string()],
            timeout_secs: 5,
        }
    }
}

/// Dashboard API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DashboardConfig {
    /// Bearer key the app shell must present. `None` disables the check.
    pub api_key: Option<String>,
}

/// Site store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file backing the site store. `None` keeps sites in memory only.
    pub path: Option<String>,
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
