use salvo::prelude::Json;
use salvo::{Depot, Router, handler};
use serde_json::json;

use warden_core::constants::WHOAMI_ROUTE_COMPONENT;

use crate::middleware::protection::get_grant_from_depot;

/// ## Summary
/// Returns the identity the request was granted under as JSON.
/// The grant is stored in the depot by the `ProtectionMiddleware`.
#[handler]
async fn whoami(depot: &Depot) -> Json<serde_json::Value> {
    let Some(grant) = get_grant_from_depot(depot) else {
        return Json(json!({"error":"Access grant not found in depot"}));
    };

    let (user, scheme) = grant
        .identity
        .as_ref()
        .map_or((None, None), |identity| {
            (Some(identity.username.as_str()), Some(identity.scheme.name()))
        });

    Json(json!({
        "user": user,
        "scheme": scheme,
        "run_as_user": grant.run_as_user,
        "run_as_group": grant.run_as_group,
        "uid": grant.uid,
        "gid": grant.gid,
    }))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(WHOAMI_ROUTE_COMPONENT).get(whoami)
}
