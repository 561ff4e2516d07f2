//! Per-request protection state.
//!
//! The rule matcher fills a [`ProtectionContext`] while it walks the rules for
//! one request; later stages read the protection that applies from it. The
//! shared, cached [`ProtectionRecord`] is never mutated: everything that
//! varies per request lives in [`BoundProtection`].

use std::sync::Arc;

use warden_core::constants::{NOBODY_GROUP, NOBODY_ID, NOBODY_USER};
use warden_rules::core::ProtectionRecord;

use super::ProtectionRegistry;
use crate::auth::IdentityNaming;
use crate::error::{ServiceError, ServiceResult};

/// A cached protection record applied to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundProtection {
    record: Arc<ProtectionRecord>,
    bound_request_path: Option<String>,
    run_as_user: String,
    run_as_group: String,
}

impl BoundProtection {
    #[must_use]
    pub fn new(record: Arc<ProtectionRecord>, request_path: Option<&str>, ids: Option<&str>) -> Self {
        let mut bound = Self {
            record,
            bound_request_path: request_path.map(str::to_string),
            run_as_user: NOBODY_USER.to_string(),
            run_as_group: NOBODY_GROUP.to_string(),
        };
        bind_identity(&mut bound, ids);
        bound
    }

    #[must_use]
    pub fn record(&self) -> &ProtectionRecord {
        &self.record
    }

    #[must_use]
    pub fn shared_record(&self) -> &Arc<ProtectionRecord> {
        &self.record
    }

    #[must_use]
    pub fn bound_request_path(&self) -> Option<&str> {
        self.bound_request_path.as_deref()
    }

    #[must_use]
    pub fn run_as_user(&self) -> &str {
        &self.run_as_user
    }

    #[must_use]
    pub fn run_as_group(&self) -> &str {
        &self.run_as_group
    }

    /// Numeric user id to serve the request as, or `nobody` (65534).
    #[must_use]
    pub fn uid(&self, naming: &dyn IdentityNaming) -> u32 {
        naming.resolve_user(&self.run_as_user).unwrap_or(NOBODY_ID)
    }

    /// Numeric group id to serve the request as, or `nogroup` (65534).
    #[must_use]
    pub fn gid(&self, naming: &dyn IdentityNaming) -> u32 {
        naming.resolve_group(&self.run_as_group).unwrap_or(NOBODY_ID)
    }
}

/// ## Summary
/// Sets the run-as identity from a `user.group` string.
///
/// `None` gives `nobody.nogroup`. Otherwise the text is split at the first
/// `.`: the left side is the user (possibly empty) and the right side, if
/// any, the group; a missing group is `nogroup`.
pub fn bind_identity(bound: &mut BoundProtection, ids: Option<&str>) {
    let (user, group) = match ids {
        None => (NOBODY_USER, NOBODY_GROUP),
        Some(ids) => ids.split_once('.').unwrap_or((ids, NOBODY_GROUP)),
    };
    bound.run_as_user = user.to_string();
    bound.run_as_group = group.to_string();
}

/// Default and current protection for one request.
#[derive(Debug, Clone, Default)]
pub struct ProtectionContext {
    default: Option<BoundProtection>,
    current: Option<BoundProtection>,
}

impl ProtectionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Establishes the default protection from `file`.
    ///
    /// ## Errors
    /// Returns `ConfigurationAbsent` when no file is given; the default is
    /// left unset.
    #[tracing::instrument(skip(self, registry))]
    pub fn set_default(
        &mut self,
        registry: &ProtectionRegistry,
        path_hint: Option<&str>,
        file: Option<&str>,
        ids: Option<&str>,
    ) -> ServiceResult<()> {
        self.default = None;

        let Some(file) = file else {
            tracing::warn!("Protection file not specified (obligatory for default protection)");
            return Err(ServiceError::ConfigurationAbsent(
                "default protection requires a protection file".to_string(),
            ));
        };

        self.default = Some(BoundProtection::new(registry.load(file), path_hint, ids));
        Ok(())
    }

    /// ## Summary
    /// Establishes the current protection from `file`, or from the default
    /// protection when no file is given.
    ///
    /// Falling back rebinds the run-as identity of the default as well, since
    /// both slots then describe the same protection.
    ///
    /// ## Errors
    /// Returns `ConfigurationAbsent` when no file is given and no default is
    /// set; the current protection is left unset.
    #[tracing::instrument(skip(self, registry))]
    pub fn set_current(
        &mut self,
        registry: &ProtectionRegistry,
        path_hint: Option<&str>,
        file: Option<&str>,
        ids: Option<&str>,
    ) -> ServiceResult<()> {
        self.current = None;

        if let Some(file) = file {
            self.current = Some(BoundProtection::new(registry.load(file), path_hint, ids));
            return Ok(());
        }

        let Some(default) = self.default.as_mut() else {
            tracing::warn!("Protection file not specified and no default protection is set");
            return Err(ServiceError::ConfigurationAbsent(
                "no protection file and no default protection".to_string(),
            ));
        };

        tracing::debug!("Protection file not specified, using default protection");
        bind_identity(default, ids);
        self.current = Some(default.clone());
        Ok(())
    }

    #[must_use]
    pub fn current(&self) -> Option<&BoundProtection> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn default_protection(&self) -> Option<&BoundProtection> {
        self.default.as_ref()
    }

    /// ## Summary
    /// Returns the current protection, promoting the default into the current
    /// slot when none is set.
    ///
    /// Promotion marks the request as protected and empties the default slot.
    pub fn get_default_or_promote(&mut self) -> Option<&BoundProtection> {
        if self.current.is_none() {
            self.current = self.default.take();
        }
        self.current.as_ref()
    }

    /// Clears both slots. Cached records are unaffected.
    pub fn clear(&mut self) {
        self.default = None;
        self.current = None;
    }
}
