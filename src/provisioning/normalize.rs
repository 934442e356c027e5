//! Custom-domain input normalization.

/// Normalize what a user typed into the domain field.
///
/// Lower-cases, trims, strips a leading `http://`/`https://`, a leading
/// `www.` label and one trailing slash. `None` means the field was empty,
/// i.e. "remove the domain".
pub fn normalize_domain(raw: &str) -> Option<String> {
    let lowered = raw.to_lowercase();
    let trimmed = lowered.trim();
    if trimmed.is_empty() {
        return None;
    }

    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    let cleaned = without_www.strip_suffix('/').unwrap_or(without_www);

    Some(cleaned.to_string())
}

/// Hostname syntax check for a normalized domain.
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    });

    // A numeric TLD means an IP address, not a domain.
    let tld_ok = labels
        .last()
        .is_some_and(|tld| !tld.chars().all(|c| c.is_ascii_digit()));

    labels_ok && tld_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(
            normalize_domain("HTTPS://Www.Example.COM.br/").as_deref(),
            Some("example.com.br")
        );
        assert_eq!(normalize_domain("  maria.com  ").as_deref(), Some("maria.com"));
        assert_eq!(normalize_domain("http://maria.com").as_deref(), Some("maria.com"));
        assert_eq!(normalize_domain("www.maria.com").as_deref(), Some("maria.com"));
    }

    #[test]
    fn test_only_one_of_each_stripped() {
        assert_eq!(normalize_domain("www.www.maria.com//").as_deref(), Some("www.maria.com/"));
    }

    #[test]
    fn test_empty_means_remove() {
        assert_eq!(normalize_domain(""), None);
        assert_eq!(normalize_domain("   \t"), None);
    }

    #[test]
    fn test_scheme_only_is_not_removal() {
        assert_eq!(normalize_domain("https://").as_deref(), Some(""));
        assert!(!is_valid_domain(""));
    }

    #[test]
    fn test_valid_domains() {
        assert!(is_valid_domain("example.com.br"));
        assert!(is_valid_domain("psic-maria.example.com.br"));
        assert!(is_valid_domain("xn--caf-dma.com"));
    }

    #[test]
    fn test_invalid_domains() {
        for domain in [
            "localhost",
            "example.com/page",
            "-maria.com",
            "maria-.com",
            "ma ria.com",
            "maria..com",
            "192.168.0.1",
            "example.com:8080",
        ] {
            assert!(!is_valid_domain(domain), "{domain}");
        }
    }
}
