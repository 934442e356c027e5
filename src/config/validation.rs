//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check hostname-shaped fields are bare hostnames
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::config::schema::EdgeConfig;

/// Hosting calls a single SetDomain can chain: old-domain remove, add,
/// compensating remove.
const SET_DOMAIN_HOSTING_CALLS: u64 = 3;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    for (i, domain) in config.platform.domains.iter().enumerate() {
        if let Some(problem) = hostname_problem(domain) {
            errors.push(ValidationError::new(format!("platform.domains[{i}]"), problem));
        }
    }

    if config.platform.base_domains.is_empty() && config.platform.dev_suffix.is_none() {
        errors.push(ValidationError::new(
            "platform.base_domains",
            "at least one base domain or a dev suffix is required",
        ));
    }

    for (i, base) in config.platform.base_domains.iter().enumerate() {
        if let Some(problem) = hostname_problem(base) {
            errors.push(ValidationError::new(
                format!("platform.base_domains[{i}]"),
                problem,
            ));
        }
    }

    if let Some(suffix) = &config.platform.dev_suffix {
        if let Some(problem) = hostname_problem(suffix) {
            errors.push(ValidationError::new("platform.dev_suffix", problem));
        }
    }

    for (i, label) in config.platform.reserved_subdomains.iter().enumerate() {
        let valid = !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            errors.push(ValidationError::new(
                format!("platform.reserved_subdomains[{i}]"),
                format!("'{label}' is not a single DNS label"),
            ));
        }
    }

    if url::Url::parse(&config.hosting.api_base_url).is_err() {
        errors.push(ValidationError::new(
            "hosting.api_base_url",
            format!("'{}' is not a URL", config.hosting.api_base_url),
        ));
    }

    if config.hosting.timeout_secs == 0 {
        errors.push(ValidationError::new("hosting.timeout_secs", "must be > 0"));
    }

    if config.dns.timeout_secs == 0 {
        errors.push(ValidationError::new("dns.timeout_secs", "must be > 0"));
    }

    for (i, ip) in config.dns.platform_ips.iter().enumerate() {
        if ip.parse::<IpAddr>().is_err() {
            errors.push(ValidationError::new(
                format!("dns.platform_ips[{i}]"),
                format!("'{ip}' is not an IP address"),
            ));
        }
    }

    let set_domain_budget = config
        .hosting
        .timeout_secs
        .saturating_mul(SET_DOMAIN_HOSTING_CALLS);
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    } else if config.timeouts.request_secs < set_domain_budget {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "must be at least {set_domain_budget} ({SET_DOMAIN_HOSTING_CALLS} x hosting.timeout_secs) so a domain rollback can finish"
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn hostname_problem(host: &str) -> Option<String> {
    if host.trim().is_empty() {
        return Some("must not be empty".to_string());
    }
    if host.contains("://") || host.contains('/') {
        return Some(format!("'{host}' must be a bare hostname, not a URL"));
    }
    if host.contains(':') && host.parse::<IpAddr>().is_err() {
        return Some(format!("'{host}' must not carry a port"));
    }
    None
}
