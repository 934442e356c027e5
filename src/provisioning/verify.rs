//! Domain verification: hosting platform first, DNS as fallback.

use std::net::Ipv4Addr;

use crate::config::DnsConfig;
use crate::dns::DnsProbe;
use crate::hosting::PlatformDomainStatus;
use crate::provisioning::types::{VerificationMethod, VerificationStatus};

/// What a correctly pointed domain looks like in DNS.
#[derive(Debug, Clone, Default)]
pub struct DnsPolicy {
    cname_markers: Vec<String>,
    platform_ips: Vec<Ipv4Addr>,
}

impl DnsPolicy {
    pub fn new(config: &DnsConfig) -> Self {
        Self {
            cname_markers: config
                .cname_markers
                .iter()
                .map(|m| m.to_ascii_lowercase())
                .collect(),
            platform_ips: config
                .platform_ips
                .iter()
                .filter_map(|ip| ip.parse().ok())
                .collect(),
        }
    }

    fn is_platform_cname(&self, target: &str) -> bool {
        self.cname_markers.iter().any(|m| target.contains(m.as_str()))
    }
}

/// Translate the platform's answer into a status for the user.
pub fn status_from_platform(domain: &str, platform: &PlatformDomainStatus) -> VerificationStatus {
    let message = if platform.configured && platform.verified {
        "Domain is configured and verified.".to_string()
    } else if !platform.configured {
        "DNS records do not point to the hosting platform yet. Changes can take up to 48 hours to propagate.".to_string()
    } else if let Some(challenge) = platform.pending_challenges.first() {
        format!(
            "Waiting for ownership verification: add a {} record for {} with value {}.",
            challenge.record_type, challenge.domain, challenge.value
        )
    } else {
        "Domain is configured; verification is still pending on the hosting platform.".to_string()
    };

    VerificationStatus {
        domain: domain.to_string(),
        configured: platform.configured,
        verified: platform.configured && platform.verified,
        propagation_pending: false,
        message,
        method: VerificationMethod::Platform,
    }
}

/// Best-effort DNS check: CNAME marker first, then the A-record allow-list.
pub async fn status_from_dns(domain: &str, dns: &dyn DnsProbe, policy: &DnsPolicy) -> VerificationStatus {
    let verified = |message: String| VerificationStatus {
        domain: domain.to_string(),
        configured: true,
        verified: true,
        propagation_pending: false,
        message,
        method: VerificationMethod::Dns,
    };

    let cnames = dns.lookup_cname(domain).await;
    if let Some(target) = cnames.iter().find(|t| policy.is_platform_cname(t)) {
        return verified(format!("CNAME points to {target}."));
    }

    let addresses = dns.lookup_a(domain).await;
    if let Some(ip) = addresses.iter().find(|ip| policy.platform_ips.contains(ip)) {
        return verified(format!("A record points to {ip}."));
    }

    if cnames.is_empty() && addresses.is_empty() {
        return VerificationStatus {
            domain: domain.to_string(),
            configured: false,
            verified: false,
            propagation_pending: true,
            message: "DNS records not yet propagated. This can take up to 48 hours.".to_string(),
            method: VerificationMethod::Dns,
        };
    }

    let found: Vec<String> = cnames
        .iter()
        .cloned()
        .chain(addresses.iter().map(ToString::to_string))
        .collect();
    VerificationStatus {
        domain: domain.to_string(),
        configured: false,
        verified: false,
        propagation_pending: false,
        message: format!(
            "Domain resolves to {}, which is not the hosting platform. Update the CNAME or A record.",
            found.join(", ")
        ),
        method: VerificationMethod::Dns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosting::VerificationChallenge;
    use async_trait::async_trait;

    struct StaticDns {
        cnames: Vec<String>,
        addresses: Vec<Ipv4Addr>,
    }

    #[async_trait]
    impl DnsProbe for StaticDns {
        async fn lookup_cname(&self, _domain: &str) -> Vec<String> {
            self.cnames.clone()
        }

        async fn lookup_a(&self, _domain: &str) -> Vec<Ipv4Addr> {
            self.addresses.clone()
        }
    }

    fn policy() -> DnsPolicy {
        DnsPolicy::new(&DnsConfig::default())
    }

    #[tokio::test]
    async fn test_cname_marker_verifies() {
        let dns = StaticDns {
            cnames: vec!["cname.vercel-dns.com".into()],
            addresses: vec![],
        };
        let status = status_from_dns("maria.com", &dns, &policy()).await;
        assert!(status.verified);
        assert_eq!(status.method, VerificationMethod::Dns);
    }

    #[tokio::test]
    async fn test_a_record_allow_list() {
        let dns = StaticDns {
            cnames: vec![],
            addresses: vec![Ipv4Addr::new(76, 76, 21, 21)],
        };
        assert!(status_from_dns("maria.com", &dns, &policy()).await.verified);
    }

    #[tokio::test]
    async fn test_no_records_is_pending() {
        let dns = StaticDns {
            cnames: vec![],
            addresses: vec![],
        };
        let status = status_from_dns("maria.com", &dns, &policy()).await;
        assert!(!status.verified);
        assert!(status.propagation_pending);
        assert!(status.message.contains("not yet propagated"));
    }

    #[tokio::test]
    async fn test_wrong_target() {
        let dns = StaticDns {
            cnames: vec!["old-host.example.net".into()],
            addresses: vec![Ipv4Addr::new(10, 0, 0, 1)],
        };
        let status = status_from_dns("maria.com", &dns, &policy()).await;
        assert!(!status.verified);
        assert!(!status.propagation_pending);
        assert!(status.message.contains("old-host.example.net"));
        assert!(status.message.contains("10.0.0.1"));
    }

    #[test]
    fn test_platform_messages() {
        let ok = status_from_platform(
            "maria.com",
            &PlatformDomainStatus {
                configured: true,
                verified: true,
                pending_challenges: vec![],
            },
        );
        assert!(ok.verified);

        let misconfigured = status_from_platform(
            "maria.com",
            &PlatformDomainStatus {
                configured: false,
                verified: true,
                pending_challenges: vec![],
            },
        );
        assert!(!misconfigured.verified);
        assert!(misconfigured.message.contains("do not point"));

        let challenge = status_from_platform(
            "maria.com",
            &PlatformDomainStatus {
                configured: true,
                verified: false,
                pending_challenges: vec![VerificationChallenge {
                    record_type: "TXT".into(),
                    domain: "_vercel.maria.com".into(),
                    value: "vc-domain-verify=abc".into(),
                    reason: None,
                }],
            },
        );
        assert!(!challenge.verified);
        assert!(challenge.message.contains("_vercel.maria.com"));
    }
}
