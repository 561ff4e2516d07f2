use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use salvo::Depot;
use salvo::http::StatusCode;
use salvo::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use tracing::error;

use warden_core::constants::AUTH_REALM;
use warden_rules::core::Scheme;
use warden_service::auth::{AccessControl, AccessDecision, AccessGrant};
use warden_service::group::Peer;
use warden_service::protection::ProtectionRegistry;

use crate::config::get_config_from_depot;
use crate::rules::RuleTable;

pub mod depot_keys {
    pub const ACCESS_GRANT: &str = "__access_grant";
}

/// Middleware that applies the configured protection rules to each request.
///
/// Granted requests continue with an [`AccessGrant`] in the depot under
/// [`depot_keys::ACCESS_GRANT`]. Requests lacking acceptable credentials get
/// `401 Unauthorized` with one challenge per allowed scheme; requests the
/// protection refuses outright get `403 Forbidden`.
pub struct ProtectionMiddleware {
    protections: Arc<ProtectionRegistry>,
    access: AccessControl,
}

impl Default for ProtectionMiddleware {
    fn default() -> Self {
        Self::new(Arc::new(ProtectionRegistry::new()), AccessControl::default())
    }
}

impl ProtectionMiddleware {
    #[must_use]
    pub const fn new(protections: Arc<ProtectionRegistry>, access: AccessControl) -> Self {
        Self { protections, access }
    }
}

#[salvo::async_trait]
impl salvo::Handler for ProtectionMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = ?e, "Failed to get config from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let context = RuleTable::new(&config.access).apply(&self.protections, req.uri().path());

        let authorization = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let remote = req.remote_addr();
        let ip = remote
            .as_ipv4()
            .map(|addr| IpAddr::V4(*addr.ip()))
            .or_else(|| remote.as_ipv6().map(|addr| IpAddr::V6(*addr.ip())))
            .and_then(peer_ipv4)
            .map(|ip| ip.to_string());
        let peer = Peer::new(ip.as_deref(), None);

        match self.access.check(&context, authorization, peer) {
            AccessDecision::Granted(grant) => {
                tracing::debug!(
                    user = grant.identity.as_ref().map(|identity| identity.username.as_str()),
                    run_as = %grant.run_as_user,
                    "Access granted"
                );
                depot.insert(depot_keys::ACCESS_GRANT, grant);
            }
            AccessDecision::Unauthorized { schemes } => {
                tracing::debug!(?schemes, "Credentials required");
                res.status_code(StatusCode::UNAUTHORIZED);
                for scheme in schemes {
                    if let Err(e) = res.add_header(WWW_AUTHENTICATE, challenge(scheme), false) {
                        error!(error = %e, "Failed to add challenge header");
                    }
                }
                ctrl.skip_rest();
            }
            AccessDecision::Forbidden => {
                tracing::debug!("Access forbidden");
                res.status_code(StatusCode::FORBIDDEN);
                ctrl.skip_rest();
            }
        }
    }
}

/// Dotted IPv4 form of a peer, unwrapping IPv4-mapped IPv6 addresses.
/// Address masks are dotted quads, so other IPv6 peers have none.
fn peer_ipv4(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

fn challenge(scheme: Scheme) -> String {
    format!("{} realm=\"{AUTH_REALM}\"", scheme.name())
}

/// Get the access grant stored by [`ProtectionMiddleware`].
#[must_use]
pub fn get_grant_from_depot(depot: &Depot) -> Option<&AccessGrant> {
    depot.get::<AccessGrant>(depot_keys::ACCESS_GRANT).ok()
}
