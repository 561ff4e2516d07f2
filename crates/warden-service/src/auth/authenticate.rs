use warden_rules::core::{ProtectionRecord, Scheme};

use super::credential::{PubkeyFields, decode};
use super::password::{FilePasswordVerifier, PasswordVerifier};

/// A user whose credentials were accepted for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub scheme: Scheme,
    pub username: String,
    pub password_cleartext: String,
    /// Present only for address-bound schemes.
    pub pubkey: Option<PubkeyFields>,
}

impl std::fmt::Debug for AuthenticatedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedIdentity")
            .field("scheme", &self.scheme)
            .field("username", &self.username)
            .field("pubkey", &self.pubkey)
            .finish_non_exhaustive()
    }
}

/// Verifies request credentials against a protection record.
#[derive(Debug, Clone, Default)]
pub struct Authenticator<V = FilePasswordVerifier> {
    verifier: V,
}

impl<V: PasswordVerifier> Authenticator<V> {
    #[must_use]
    pub const fn new(verifier: V) -> Self {
        Self { verifier }
    }

    /// ## Summary
    /// Authenticates `credentials` presented under `scheme`.
    ///
    /// The scheme must be known and allowed by `protection`, the material
    /// must decode, and the password must match the entry in the file named
    /// by the `passw` attribute. Address-bound credentials must additionally
    /// be fresh and come from the address they name.
    ///
    /// Every failure yields `None`; the reason is only logged.
    #[must_use]
    #[tracing::instrument(skip(self, credentials, protection), fields(scheme = %scheme))]
    pub fn authenticate(
        &self,
        scheme: Scheme,
        credentials: &str,
        protection: &ProtectionRecord,
    ) -> Option<AuthenticatedIdentity> {
        if !scheme.is_known() {
            tracing::debug!("Unknown authentication scheme");
            return None;
        }

        if !protection.allows(scheme) {
            tracing::debug!("Scheme not allowed by protection setup");
            return None;
        }

        let candidate = decode(credentials, scheme)
            .inspect_err(|err| tracing::debug!(error = %err, "Credentials not decodable"))
            .ok()?;

        let Some(password_file) = protection.password_file() else {
            tracing::warn!("Protection setup names no password file");
            return None;
        };

        if !self
            .verifier
            .check(&candidate.username, &candidate.password, password_file)
        {
            tracing::debug!(username = %candidate.username, "Password check failed");
            return None;
        }

        if let Some(fields) = &candidate.pubkey {
            if !timestamp_is_fresh(&fields.issued_at) {
                tracing::debug!(username = %candidate.username, "Credentials are stale");
                return None;
            }
            if !address_is_consistent(&fields.peer_address) {
                tracing::debug!(username = %candidate.username, "Credentials bound to another address");
                return None;
            }
        }

        tracing::debug!(username = %candidate.username, "Authenticated");
        Some(AuthenticatedIdentity {
            scheme,
            username: candidate.username,
            password_cleartext: candidate.password,
            pubkey: candidate.pubkey,
        })
    }
}

// No freshness window or peer comparison exists for address-bound
// credentials, so both checks reject.
const fn timestamp_is_fresh(_issued_at: &str) -> bool {
    false
}

const fn address_is_consistent(_peer_address: &str) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use warden_rules::core::ProtectionDirective;

    /// Accepts exactly one user/password pair from a fixed file name.
    struct OneUser;

    impl PasswordVerifier for OneUser {
        fn check(&self, username: &str, password: &str, password_file: &str) -> bool {
            password_file == "/etc/warden/passwd" && username == "alice" && password == "pw"
        }
    }

    fn protection(schemes: Vec<Scheme>, passw: Option<&str>) -> ProtectionRecord {
        let mut directives = vec![ProtectionDirective::Auth(schemes)];
        if let Some(passw) = passw {
            directives.push(ProtectionDirective::Attribute {
                name: "passw".to_string(),
                value: passw.to_string(),
            });
        }
        ProtectionRecord::from_directives(None, directives)
    }

    fn basic(cleartext: &str) -> String {
        STANDARD.encode(cleartext)
    }

    #[test_log::test]
    fn accepts_allowed_scheme_with_matching_password() {
        let record = protection(vec![Scheme::Basic], Some("/etc/warden/passwd"));
        let identity = Authenticator::new(OneUser)
            .authenticate(Scheme::Basic, &basic("alice:pw"), &record)
            .expect("authenticated");

        assert_eq!(identity.scheme, Scheme::Basic);
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.password_cleartext, "pw");
        assert!(identity.pubkey.is_none());
    }

    #[test]
    fn scheme_gating() {
        let auth = Authenticator::new(OneUser);
        let pubkey_only = protection(vec![Scheme::Pubkey], Some("/etc/warden/passwd"));
        assert!(auth.authenticate(Scheme::Basic, &basic("alice:pw"), &pubkey_only).is_none());

        let nothing = ProtectionRecord::empty();
        assert!(auth.authenticate(Scheme::Basic, &basic("alice:pw"), &nothing).is_none());

        let with_unknown = protection(vec![Scheme::Basic, Scheme::Unknown], Some("/etc/warden/passwd"));
        assert!(auth.authenticate(Scheme::Unknown, &basic("alice:pw"), &with_unknown).is_none());
    }

    #[test]
    fn rejects_wrong_password_and_missing_password_file() {
        let auth = Authenticator::new(OneUser);
        let record = protection(vec![Scheme::Basic], Some("/etc/warden/passwd"));
        assert!(auth.authenticate(Scheme::Basic, &basic("alice:nope"), &record).is_none());
        assert!(auth.authenticate(Scheme::Basic, &basic("alice"), &record).is_none());

        let no_passw = protection(vec![Scheme::Basic], None);
        assert!(auth.authenticate(Scheme::Basic, &basic("alice:pw"), &no_passw).is_none());
    }

    #[test]
    fn kerberos_is_never_authenticated() {
        let auth = Authenticator::new(OneUser);
        let record = protection(vec![Scheme::KerberosV5], Some("/etc/warden/passwd"));
        assert!(auth.authenticate(Scheme::KerberosV5, &basic("alice:pw"), &record).is_none());
    }

    #[test]
    fn pubkey_is_never_authenticated() {
        let auth = Authenticator::new(OneUser);
        let record = protection(vec![Scheme::Pubkey], Some("/etc/warden/passwd"));
        let material = basic("alice:pw:10.0.0.1:0:secret");
        assert!(auth.authenticate(Scheme::Pubkey, &material, &record).is_none());
        assert!(!timestamp_is_fresh("0"));
        assert!(!address_is_consistent("10.0.0.1"));
    }

    #[test]
    fn debug_hides_password() {
        let identity = AuthenticatedIdentity {
            scheme: Scheme::Basic,
            username: "alice".to_string(),
            password_cleartext: "hunter2".to_string(),
            pubkey: None,
        };
        assert!(!format!("{identity:?}").contains("hunter2"));
    }
}
