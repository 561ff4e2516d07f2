use warden_rules::core::Scheme;

/// ## Summary
/// Splits an `Authorization` header value into its scheme and credential
/// material.
///
/// Returns `None` for a blank header. A scheme with no material yields an
/// empty material string.
#[must_use]
pub fn parse_authorization(header: &str) -> Option<(Scheme, &str)> {
    let header = header.trim();
    if header.is_empty() {
        return None;
    }

    let (name, material) = header
        .split_once(char::is_whitespace)
        .unwrap_or((header, ""));
    Some((Scheme::parse(name), material.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_scheme_and_material() {
        assert_eq!(
            parse_authorization("Basic YWxpY2U6eA=="),
            Some((Scheme::Basic, "YWxpY2U6eA=="))
        );
        assert_eq!(
            parse_authorization("  pubkey   abc  "),
            Some((Scheme::Pubkey, "abc"))
        );
        assert_eq!(parse_authorization("Bearer t"), Some((Scheme::Unknown, "t")));
        assert_eq!(parse_authorization("Basic"), Some((Scheme::Basic, "")));
        assert_eq!(parse_authorization(" "), None);
    }
}
