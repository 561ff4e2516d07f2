use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier as _,
    password_hash::{SaltString, rand_core::OsRng},
};

use std::sync::LazyLock;

use crate::error::{ServiceError, ServiceResult};

/// Checks a cleartext password against a password file.
pub trait PasswordVerifier: Send + Sync {
    /// Returns whether `password` is the password of `username` in the file
    /// at `password_file`.
    fn check(&self, username: &str, password: &str, password_file: &str) -> bool;
}

/// Reads `user:hash` lines, where `hash` is an Argon2 PHC string.
///
/// Blank lines and lines starting with `#` are skipped. The file is read on
/// every check.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePasswordVerifier;

impl PasswordVerifier for FilePasswordVerifier {
    #[tracing::instrument(skip(self, password))]
    fn check(&self, username: &str, password: &str, password_file: &str) -> bool {
        let contents = match std::fs::read_to_string(password_file) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(error = %e, "Unable to read password file");
                return false;
            }
        };

        let entry = find_entry(&contents, username);
        if entry.is_none() {
            tracing::debug!("No password entry for user");
        }

        // Unknown users still pay for one verification.
        let Some(hash) = entry.or(dummy_hash()) else {
            return false;
        };
        let verified = verify_password(password, hash).is_ok();

        verified && entry.is_some()
    }
}

static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    hash_password("warden-unknown-user")
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to prepare dummy password hash"))
        .ok()
});

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH.as_deref()
}

fn find_entry<'a>(contents: &'a str, username: &str) -> Option<&'a str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .find(|(user, _)| *user == username)
        .map(|(_, hash)| hash.trim())
}

/// ## Summary
/// Hashes a password using Argon2id with a random salt.
///
/// ## Errors
/// Returns an error if password hashing fails.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::InvalidConfiguration(format!("Failed to hash password: {e}")))?;

    Ok(password_hash.to_string())
}

/// ## Summary
/// Verifies a password against a stored Argon2 hash.
///
/// ## Errors
/// Returns `InvalidConfiguration` if the stored hash is malformed and
/// `NotAuthenticated` if the password does not match.
pub fn verify_password(password: &str, password_hash: &str) -> ServiceResult<()> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| {
        tracing::warn!(error = %e, "Malformed password hash");
        ServiceError::InvalidConfiguration(format!("Invalid password hash: {e}"))
    })?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|err| {
            tracing::trace!("Password verification failed: {}", err);
            ServiceError::NotAuthenticated
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("test_password_123").expect("Failed to hash password");

        assert!(verify_password("test_password_123", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong_password", &hash),
            Err(ServiceError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_verify_invalid_hash_format() {
        assert!(matches!(
            verify_password("password", "not_a_valid_hash"),
            Err(ServiceError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn finds_first_matching_entry() {
        let contents = "# users\n\nbob:$h1\nalice:$h2\nalice:$h3\n";
        assert_eq!(find_entry(contents, "alice"), Some("$h2"));
        assert_eq!(find_entry(contents, "Alice"), None);
        assert_eq!(find_entry(contents, "# users"), None);
    }

    #[test_log::test]
    fn file_verifier_checks_hashes() {
        let mut tmp = tempfile::NamedTempFile::new().expect("temp file");
        let hash = hash_password("wonderland").expect("hash");
        writeln!(tmp, "# comment\nalice:{hash}\nbob:garbage").expect("write");
        let path = tmp.path().to_string_lossy().into_owned();

        let verifier = FilePasswordVerifier;
        assert!(verifier.check("alice", "wonderland", &path));
        assert!(!verifier.check("alice", "looking-glass", &path));
        assert!(!verifier.check("bob", "anything", &path));
        assert!(!verifier.check("carol", "wonderland", &path));
        assert!(!verifier.check("alice", "wonderland", "/nonexistent/passwd"));
    }

    #[test]
    fn unknown_user_is_checked_against_dummy_hash() {
        let dummy = dummy_hash().expect("dummy hash prepared");
        assert!(verify_password("warden-unknown-user", dummy).is_ok());

        let mut tmp = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(tmp, "alice:{}", hash_password("wonderland").expect("hash")).expect("write");
        let path = tmp.path().to_string_lossy().into_owned();

        assert!(!FilePasswordVerifier.check("ghost", "warden-unknown-user", &path));
        assert!(!FilePasswordVerifier.check("ghost", "wonderland", &path));
    }
}
