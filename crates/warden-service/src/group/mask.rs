//! Address masks: dotted IP templates and host name templates.

use warden_rules::template::template_match;

/// A mask with any character besides digits, `.` and `*` is a host name mask.
fn is_domain_mask(mask: &str) -> bool {
    mask.chars().any(|c| !(c.is_ascii_digit() || c == '.' || c == '*'))
}

/// Compares the first three characters of one address part.
fn part_match(template: &str, actual: &str) -> bool {
    let required: String = template.chars().take(3).collect();
    let actual: String = actual.chars().take(3).collect();
    template_match(&required, &actual)
}

/// Both sides need exactly four parts, matched pairwise.
fn ip_number_match(template: &str, ip: &str) -> bool {
    let template_parts: Vec<&str> = template.split('.').collect();
    let ip_parts: Vec<&str> = ip.split('.').collect();

    template_parts.len() == 4
        && ip_parts.len() == 4
        && template_parts
            .iter()
            .zip(&ip_parts)
            .all(|(t, i)| part_match(t, i))
}

/// ## Summary
/// Matches an address mask against the peer.
///
/// `*.cern.ch` is a host name mask and is matched against `host`;
/// `128.141.*.*` is an IP number mask and is matched against `ip`. A missing
/// side never matches.
#[must_use]
pub fn mask_match(template: &str, ip: Option<&str>, host: Option<&str>) -> bool {
    let matched = if is_domain_mask(template) {
        host.is_some_and(|host| template_match(template, host))
    } else {
        ip.is_some_and(|ip| ip_number_match(template, ip))
    };

    tracing::trace!(template, ?ip, ?host, matched, "Address mask");
    matched
}
