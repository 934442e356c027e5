//! Host classification.
//!
//! # Responsibilities
//! - Normalize the Host header (port, trailing dot, case)
//! - Decide platform domain vs tenant subdomain vs tenant custom domain
//! - Compute the canonical tenant-site path rewrite
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 4343)
//! - Path matching is case-sensitive
//! - Suffix checks only, no regex, no database lookups
//! - Never fails: anything unrecognisable is the platform itself

use std::collections::HashSet;

use serde::Serialize;

use crate::config::PlatformConfig;

/// Prefix of every rewritten tenant path.
pub const SITE_PATH_PREFIX: &str = "/site/";

/// Which kind of host a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HostCategory {
    PlatformDomain,
    TenantSubdomain,
    TenantCustomDomain,
}

impl HostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostCategory::PlatformDomain => "platform_domain",
            HostCategory::TenantSubdomain => "tenant_subdomain",
            HostCategory::TenantCustomDomain => "tenant_custom_domain",
        }
    }
}

/// Outcome of classifying one host.
///
/// A tenant identifier exists exactly when the host is not the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "category", content = "tenant_identifier")]
pub enum HostClassification {
    PlatformDomain,
    TenantSubdomain(String),
    TenantCustomDomain(String),
}

impl HostClassification {
    pub fn category(&self) -> HostCategory {
        match self {
            HostClassification::PlatformDomain => HostCategory::PlatformDomain,
            HostClassification::TenantSubdomain(_) => HostCategory::TenantSubdomain,
            HostClassification::TenantCustomDomain(_) => HostCategory::TenantCustomDomain,
        }
    }

    pub fn tenant_identifier(&self) -> Option<&str> {
        match self {
            HostClassification::PlatformDomain => None,
            HostClassification::TenantSubdomain(id) | HostClassification::TenantCustomDomain(id) => {
                Some(id)
            }
        }
    }
}

/// Classification plus the path the request should be served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub classification: HostClassification,
    /// `None` means serve the original path unmodified.
    pub rewritten_path: Option<String>,
}

/// Immutable host classifier built from the platform configuration.
#[derive(Debug, Clone)]
pub struct HostClassifier {
    platform_domains: HashSet<String>,
    /// Base domains (dev suffix included), longest first.
    base_domains: Vec<String>,
    reserved: HashSet<String>,
}

impl HostClassifier {
    pub fn new(config: &PlatformConfig) -> Self {
        let platform_domains = config
            .domains
            .iter()
            .map(|d| normalize_host(d))
            .filter(|d| !d.is_empty())
            .collect();

        let mut base_domains: Vec<String> = config
            .base_domains
            .iter()
            .chain(config.dev_suffix.iter())
            .map(|d| normalize_host(d))
            .filter(|d| !d.is_empty())
            .collect();
        base_domains.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        base_domains.dedup();

        let reserved = config
            .reserved_subdomains
            .iter()
            .map(|label| label.trim().to_ascii_lowercase())
            .collect();

        Self {
            platform_domains,
            base_domains,
            reserved,
        }
    }

    /// Classify a raw Host header value.
    pub fn classify(&self, raw_host: &str) -> HostClassification {
        let host = normalize_host(raw_host);
        if host.is_empty() || self.platform_domains.contains(&host) {
            return HostClassification::PlatformDomain;
        }

        for base in &self.base_domains {
            if host == *base {
                return HostClassification::PlatformDomain;
            }
            let Some(prefix) = host
                .strip_suffix(base.as_str())
                .and_then(|rest| rest.strip_suffix('.'))
            else {
                continue;
            };

            let label = prefix.split('.').next().unwrap_or_default();
            if label.is_empty() || self.reserved.contains(label) {
                return HostClassification::PlatformDomain;
            }
            return HostClassification::TenantSubdomain(label.to_string());
        }

        HostClassification::TenantCustomDomain(host)
    }

    /// Classify and decide the served path.
    pub fn route(&self, raw_host: &str, path: &str) -> RouteDecision {
        let classification = self.classify(raw_host);
        let rewritten_path = classification
            .tenant_identifier()
            .and_then(|id| rewrite_path(id, path));

        RouteDecision {
            classification,
            rewritten_path,
        }
    }

    /// True if `domain` is the platform itself or lives under a base domain.
    pub fn is_platform_owned(&self, domain: &str) -> bool {
        let host = normalize_host(domain);
        self.platform_domains.contains(&host)
            || self
                .base_domains
                .iter()
                .any(|base| host == *base || host.ends_with(&format!(".{base}")))
    }
}

/// `/site/{identifier}{path}`, or `None` when `path` is already a site path.
pub fn rewrite_path(identifier: &str, path: &str) -> Option<String> {
    if path.starts_with(SITE_PATH_PREFIX) {
        return None;
    }
    if path.starts_with('/') {
        Some(format!("{SITE_PATH_PREFIX}{identifier}{path}"))
    } else {
        Some(format!("{SITE_PATH_PREFIX}{identifier}/{path}"))
    }
}

/// Strip port and trailing dot, lower-case.
pub fn normalize_host(raw: &str) -> String {
    let host = raw.trim();

    let host = if let Some(rest) = host.strip_prefix('[') {
        // Bracketed IPv6 literal, keep the brackets and drop the port.
        match rest.find(']') {
            Some(end) => &host[..end + 2],
            None => host,
        }
    } else {
        match host.rsplit_once(':') {
            Some((name, port))
                if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) =>
            {
                name
            }
            _ => host,
        }
    };

    host.strip_suffix('.').unwrap_or(host).to_ascii_lowercase()
}

/// Paths that never need tenant routing (bundles, images, fonts, favicon).
pub fn is_static_asset(path: &str) -> bool {
    const PREFIXES: &[&str] = &["/_next/", "/static/", "/assets/"];
    const EXTENSIONS: &[&str] = &[
        "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "ico", "woff", "woff2", "ttf", "otf",
        "eot", "js", "css", "map",
    ];

    if path == "/favicon.ico" || PREFIXES.iter().any(|p| path.starts_with(p)) {
        return true;
    }

    let last = path.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}
