mod healthcheck;
mod whoami;

use salvo::Router;

pub use warden_core::constants::{APP_ROUTE_COMPONENT, WHOAMI_ROUTE_PREFIX};

/// ## Summary
/// Constructs the application router.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(APP_ROUTE_COMPONENT)
        .push(healthcheck::routes())
        .push(whoami::routes())
}
