use std::collections::BTreeSet;
use std::path::PathBuf;

use warden_core::constants::{GROUP_FILE_ATTRIBUTE, PASSWORD_FILE_ATTRIBUTE};

use super::{GroupDefinition, Scheme};

/// One directive of a protection setup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectionDirective {
    /// `Auth` line; unknown scheme names are already dropped.
    Auth(Vec<Scheme>),
    /// `Mask` line holding an unnamed group definition.
    Mask(GroupDefinition),
    /// Any other `name value` line.
    Attribute { name: String, value: String },
}

/// A parsed protection setup file.
///
/// Records are shared through the protection cache and never change after
/// parsing. The run-as identity and the request path a record is applied to
/// are kept per request, outside the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectionRecord {
    pub source_path: Option<PathBuf>,
    /// Empty until an `Auth` directive is seen; empty admits no scheme.
    pub allowed_schemes: BTreeSet<Scheme>,
    pub mask_group: Option<GroupDefinition>,
    pub attributes: Vec<(String, String)>,
}

impl ProtectionRecord {
    /// A record with no schemes, no mask and no attributes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Folds parsed directives into a record.
    ///
    /// `Auth` directives accumulate. A later `Mask` replaces an earlier one.
    /// Attributes keep file order, duplicates included.
    #[must_use]
    pub fn from_directives(
        source_path: Option<PathBuf>,
        directives: impl IntoIterator<Item = ProtectionDirective>,
    ) -> Self {
        let mut record = Self {
            source_path,
            ..Self::default()
        };

        for directive in directives {
            match directive {
                ProtectionDirective::Auth(schemes) => record.allowed_schemes.extend(schemes),
                ProtectionDirective::Mask(group) => record.mask_group = Some(group),
                ProtectionDirective::Attribute { name, value } => {
                    record.attributes.push((name, value));
                }
            }
        }

        record
    }

    #[must_use]
    pub fn allows(&self, scheme: Scheme) -> bool {
        self.allowed_schemes.contains(&scheme)
    }

    /// Returns the first value bound to `name`, ignoring ASCII case.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn password_file(&self) -> Option<&str> {
        self.attribute(PASSWORD_FILE_ATTRIBUTE)
    }

    #[must_use]
    pub fn group_file(&self) -> Option<&str> {
        self.attribute(GROUP_FILE_ATTRIBUTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(name: &str, value: &str) -> ProtectionDirective {
        ProtectionDirective::Attribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn empty_record_admits_no_scheme() {
        let record = ProtectionRecord::empty();
        assert!(!record.allows(Scheme::Basic));
        assert!(record.attributes.is_empty());
        assert!(record.mask_group.is_none());
    }

    #[test]
    fn auth_directives_accumulate() {
        let record = ProtectionRecord::from_directives(
            None,
            [
                ProtectionDirective::Auth(vec![Scheme::Basic]),
                ProtectionDirective::Auth(vec![Scheme::Pubkey, Scheme::Basic]),
            ],
        );

        assert_eq!(record.allowed_schemes.len(), 2);
        assert!(record.allows(Scheme::Basic));
        assert!(record.allows(Scheme::Pubkey));
    }

    #[test]
    fn attribute_lookup_returns_first_occurrence() {
        let record = ProtectionRecord::from_directives(
            None,
            [
                attribute("passw", "/etc/first"),
                attribute("PassW", "/etc/second"),
                attribute("group", "/etc/groups"),
            ],
        );

        assert_eq!(record.password_file(), Some("/etc/first"));
        assert_eq!(record.group_file(), Some("/etc/groups"));
        assert_eq!(record.attributes.len(), 3);
        assert_eq!(record.attribute("missing"), None);
    }
}
