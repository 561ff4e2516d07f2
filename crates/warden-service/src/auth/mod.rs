//! Credentials, password checks and access decisions.

mod access;
mod authenticate;
mod credential;
mod header;
mod identity;
pub mod password;

pub use access::{AccessControl, AccessDecision, AccessGrant};
pub use authenticate::{AuthenticatedIdentity, Authenticator};
pub use credential::{Candidate, DecodeError, PubkeyFields, decode};
pub use header::parse_authorization;
pub use identity::{IdentityNaming, SystemIdentityNaming};
pub use password::{FilePasswordVerifier, PasswordVerifier};
