use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use warden_rules::core::Scheme;

/// Why credential material could not be turned into a candidate identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Scheme {0} has no credential decoder")]
    UnsupportedScheme(Scheme),

    #[error("No credentials given")]
    EmptyCredentials,

    #[error("Transport decoding failed: {0}")]
    Transport(String),

    #[error("Decoded credentials are not valid UTF-8")]
    NotUtf8,

    #[error("Public key decryption is not available")]
    DecryptionUnavailable,

    #[error("Credentials carry no password")]
    MissingPassword,

    #[error("Public key credentials lack address, timestamp or secret")]
    MalformedPubkeyFields,
}

/// Extra fields carried by address-bound (`Pubkey`) credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubkeyFields {
    pub peer_address: String,
    pub issued_at: String,
    pub client_secret: String,
}

/// Credentials decoded from a request, not yet verified.
#[derive(Clone, PartialEq, Eq)]
pub struct Candidate {
    pub username: String,
    pub password: String,
    pub pubkey: Option<PubkeyFields>,
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("pubkey", &self.pubkey.is_some())
            .finish()
    }
}

/// ## Summary
/// Decodes the credential material of an `Authorization` header.
///
/// `Basic` material is base64 of `user:password`. `Pubkey` material would be
/// base64 of an encrypted `user:password:address:timestamp:secret` block,
/// but no decryption is available so it always fails.
///
/// ## Errors
/// Returns a [`DecodeError`] describing the first step that failed.
pub fn decode(encoded: &str, scheme: Scheme) -> Result<Candidate, DecodeError> {
    if !matches!(scheme, Scheme::Basic | Scheme::Pubkey) {
        return Err(DecodeError::UnsupportedScheme(scheme));
    }

    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(DecodeError::EmptyCredentials);
    }

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| DecodeError::Transport(e.to_string()))?;

    if scheme == Scheme::Pubkey {
        return Err(DecodeError::DecryptionUnavailable);
    }

    let cleartext = String::from_utf8(bytes).map_err(|_| DecodeError::NotUtf8)?;
    decompose(&cleartext, scheme)
}

/// Splits decrypted cleartext into its `:`-separated fields.
pub(crate) fn decompose(cleartext: &str, scheme: Scheme) -> Result<Candidate, DecodeError> {
    let mut fields = cleartext.splitn(6, ':');
    let username = fields.next().unwrap_or_default().to_string();
    let password = fields.next().ok_or(DecodeError::MissingPassword)?.to_string();

    let pubkey = if scheme == Scheme::Pubkey {
        let (Some(peer_address), Some(issued_at), Some(client_secret)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(DecodeError::MalformedPubkeyFields);
        };
        Some(PubkeyFields {
            peer_address: peer_address.to_string(),
            issued_at: issued_at.to_string(),
            client_secret: client_secret.to_string(),
        })
    } else {
        None
    };

    if fields.next().is_some() {
        tracing::debug!(scheme = %scheme, "Extra fields after credentials ignored");
    }

    Ok(Candidate {
        username,
        password,
        pubkey,
    })
}
