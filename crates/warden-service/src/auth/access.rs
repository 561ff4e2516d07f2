//! Access decisions for one request.

use std::sync::Arc;

use warden_core::constants::{NOBODY_GROUP, NOBODY_ID, NOBODY_USER};
use warden_rules::core::{GroupFile, Scheme};

use super::authenticate::{AuthenticatedIdentity, Authenticator};
use super::header::parse_authorization;
use super::identity::{IdentityNaming, SystemIdentityNaming};
use super::password::{FilePasswordVerifier, PasswordVerifier};
use crate::group::{GroupRegistry, Membership, MembershipResolver, Peer};
use crate::protection::{BoundProtection, ProtectionContext};

/// What a granted request runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// `None` for requests that needed no authentication.
    pub identity: Option<AuthenticatedIdentity>,
    pub run_as_user: String,
    pub run_as_group: String,
    pub uid: u32,
    pub gid: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted(AccessGrant),
    /// Credentials are missing or were rejected; `schemes` lists what the
    /// client may retry with.
    Unauthorized { schemes: Vec<Scheme> },
    Forbidden,
}

/// Combines authentication, mask groups and run-as identities into one
/// decision.
pub struct AccessControl<V = FilePasswordVerifier> {
    authenticator: Authenticator<V>,
    groups: Arc<GroupRegistry>,
    naming: Arc<dyn IdentityNaming>,
}

impl Default for AccessControl {
    fn default() -> Self {
        Self::new(
            Authenticator::default(),
            Arc::new(GroupRegistry::new()),
            Arc::new(SystemIdentityNaming),
        )
    }
}

impl<V: PasswordVerifier> AccessControl<V> {
    #[must_use]
    pub fn new(
        authenticator: Authenticator<V>,
        groups: Arc<GroupRegistry>,
        naming: Arc<dyn IdentityNaming>,
    ) -> Self {
        Self {
            authenticator,
            groups,
            naming,
        }
    }

    /// ## Summary
    /// Decides whether a request may proceed under the protection in
    /// `context`.
    ///
    /// A request with no current protection is granted anonymously as
    /// `nobody`. A protected request must authenticate with an allowed
    /// scheme; when the protection carries a mask group the user must also
    /// be a member of it from `peer`. A mask that rejects the peer address
    /// is final; a mask that does not list the user asks for credentials
    /// again.
    #[must_use]
    #[tracing::instrument(skip(self, context, authorization))]
    pub fn check(
        &self,
        context: &ProtectionContext,
        authorization: Option<&str>,
        peer: Peer<'_>,
    ) -> AccessDecision {
        let Some(bound) = context.current() else {
            tracing::trace!("Request is not protected");
            return AccessDecision::Granted(AccessGrant {
                identity: None,
                run_as_user: NOBODY_USER.to_string(),
                run_as_group: NOBODY_GROUP.to_string(),
                uid: NOBODY_ID,
                gid: NOBODY_ID,
            });
        };

        let record = bound.record();
        let challenge = || {
            let schemes: Vec<Scheme> = record
                .allowed_schemes
                .iter()
                .copied()
                .filter(|scheme| scheme.is_known())
                .collect();
            if schemes.is_empty() {
                tracing::debug!("Protection allows no scheme");
                AccessDecision::Forbidden
            } else {
                AccessDecision::Unauthorized { schemes }
            }
        };

        let Some((scheme, material)) = authorization.and_then(parse_authorization) else {
            tracing::debug!("No credentials presented");
            return challenge();
        };

        let Some(identity) = self.authenticator.authenticate(scheme, material, record) else {
            return challenge();
        };

        match self.mask_membership(bound, &identity.username, peer) {
            Membership::Ok => AccessDecision::Granted(self.grant(bound, identity)),
            Membership::NotMember => {
                tracing::debug!(username = %identity.username, "User not in mask group");
                challenge()
            }
            Membership::BlockedByAddress => {
                tracing::debug!(username = %identity.username, "Peer address rejected by mask group");
                AccessDecision::Forbidden
            }
        }
    }

    fn mask_membership(&self, bound: &BoundProtection, username: &str, peer: Peer<'_>) -> Membership {
        let record = bound.record();
        let Some(mask) = &record.mask_group else {
            return Membership::Ok;
        };

        let file = record
            .group_file()
            .map_or_else(|| Arc::new(GroupFile::new()), |path| self.groups.load(path));
        let mask = file.resolve_external(mask);
        MembershipResolver::new(&file).is_member(&mask, username, peer)
    }

    fn grant(&self, bound: &BoundProtection, identity: AuthenticatedIdentity) -> AccessGrant {
        AccessGrant {
            identity: Some(identity),
            run_as_user: bound.run_as_user().to_string(),
            run_as_group: bound.run_as_group().to_string(),
            uid: bound.uid(self.naming.as_ref()),
            gid: bound.gid(self.naming.as_ref()),
        }
    }
}
