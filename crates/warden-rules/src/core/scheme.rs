use std::fmt;

/// An authentication scheme tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scheme {
    /// Base64 `user:password` credentials.
    Basic,
    /// Address-bound public-key scheme.
    Pubkey,
    KerberosV4,
    KerberosV5,
    /// Any name not in the scheme table.
    Unknown,
}

impl Scheme {
    /// Looks up a scheme by name, ignoring ASCII case.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        const TABLE: [(&str, Scheme); 4] = [
            ("basic", Scheme::Basic),
            ("pubkey", Scheme::Pubkey),
            ("kerberosv4", Scheme::KerberosV4),
            ("kerberosv5", Scheme::KerberosV5),
        ];

        TABLE
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(name))
            .map_or(Self::Unknown, |(_, scheme)| *scheme)
    }

    /// Returns the canonical scheme name, as used in `WWW-Authenticate`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Pubkey => "Pubkey",
            Self::KerberosV4 => "KerberosV4",
            Self::KerberosV5 => "KerberosV5",
            Self::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
