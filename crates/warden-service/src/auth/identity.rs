use nix::unistd::{Group, User};

/// Maps run-as user and group names to numeric ids.
pub trait IdentityNaming: Send + Sync {
    fn resolve_user(&self, name: &str) -> Option<u32>;
    fn resolve_group(&self, name: &str) -> Option<u32>;
}

/// Resolves names through the system account databases.
///
/// Numeric names are taken as ids directly. Other names go through
/// `getpwnam(3)` / `getgrnam(3)`, so every configured NSS source is consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentityNaming;

impl IdentityNaming for SystemIdentityNaming {
    fn resolve_user(&self, name: &str) -> Option<u32> {
        numeric(name).or_else(|| {
            User::from_name(name)
                .inspect_err(|e| tracing::debug!(name, error = %e, "User lookup failed"))
                .ok()
                .flatten()
                .map(|user| user.uid.as_raw())
        })
    }

    fn resolve_group(&self, name: &str) -> Option<u32> {
        numeric(name).or_else(|| {
            Group::from_name(name)
                .inspect_err(|e| tracing::debug!(name, error = %e, "Group lookup failed"))
                .ok()
                .flatten()
                .map(|group| group.gid.as_raw())
        })
    }
}

/// Empty names never resolve; all-digit names are ids.
fn numeric(name: &str) -> Option<u32> {
    if name.is_empty() {
        return None;
    }
    name.parse().ok()
}
