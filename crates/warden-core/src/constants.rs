/// Route component constants shared across crates
pub const APP_ROUTE_COMPONENT: &str = "app";
pub const APP_ROUTE_PREFIX: &str = const_str::concat!("/", APP_ROUTE_COMPONENT);

pub const HEALTHCHECK_ROUTE_COMPONENT: &str = "healthcheck";

pub const WHOAMI_ROUTE_COMPONENT: &str = "whoami";
pub const WHOAMI_ROUTE_PREFIX: &str =
    const_str::concat!(APP_ROUTE_PREFIX, "/", WHOAMI_ROUTE_COMPONENT);

/// Run-as user when a protection setup names none.
pub const NOBODY_USER: &str = "nobody";
/// Run-as group when a protection setup names none.
pub const NOBODY_GROUP: &str = "nogroup";
/// Numeric id used when a run-as name cannot be resolved.
pub const NOBODY_ID: u32 = 65534;

/// Protection attribute naming the password file.
pub const PASSWORD_FILE_ATTRIBUTE: &str = "passw";
/// Protection attribute naming the group file used to resolve the mask group.
pub const GROUP_FILE_ATTRIBUTE: &str = "group";

/// Realm announced in `WWW-Authenticate` challenges.
pub const AUTH_REALM: &str = "warden";
