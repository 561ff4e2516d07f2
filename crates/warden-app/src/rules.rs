//! Path rules that pick the protection for a request.

use percent_encoding::percent_decode_str;

use warden_core::config::{AccessConfig, AccessRule, RuleKind};
use warden_rules::template::template_match;
use warden_service::protection::{ProtectionContext, ProtectionRegistry};

/// Ordered protection rules from the `access` settings.
#[derive(Debug, Clone, Copy)]
pub struct RuleTable<'a> {
    rules: &'a [AccessRule],
    enforce_default: bool,
}

impl<'a> RuleTable<'a> {
    #[must_use]
    pub fn new(config: &'a AccessConfig) -> Self {
        Self {
            rules: &config.rules,
            enforce_default: config.enforce_default,
        }
    }

    /// ## Summary
    /// Builds the protection context for a request to `path`.
    ///
    /// The raw path is first reduced with [`routing_path`], the form the
    /// router dispatches on. A template matches the reduced path either as is
    /// or with a trailing `/`, so `/private/*` also covers `/private`.
    ///
    /// Every rule whose template matches is applied in order: `def_prot`
    /// sets the default protection, `protect` the current one, so a later
    /// match replaces an earlier one. A rule that cannot be applied is
    /// logged and skipped. With `enforce_default` set, the default is
    /// promoted when no `protect` rule matched.
    #[must_use]
    #[tracing::instrument(skip(self, registry))]
    pub fn apply(&self, registry: &ProtectionRegistry, path: &str) -> ProtectionContext {
        let path = routing_path(path);
        let directory = format!("{path}/");
        let mut context = ProtectionContext::new();

        for rule in self.rules.iter().filter(|rule| {
            template_match(&rule.template, &path) || template_match(&rule.template, &directory)
        }) {
            tracing::trace!(template = %rule.template, kind = ?rule.kind, "Rule matched");

            let outcome = match rule.kind {
                RuleKind::DefProt => context.set_default(
                    registry,
                    Some(&path),
                    rule.file.as_deref(),
                    rule.ids.as_deref(),
                ),
                RuleKind::Protect => context.set_current(
                    registry,
                    Some(&path),
                    rule.file.as_deref(),
                    rule.ids.as_deref(),
                ),
            };

            if let Err(e) = outcome {
                tracing::warn!(template = %rule.template, error = %e, "Protection rule not applied");
            }
        }

        if self.enforce_default {
            context.get_default_or_promote();
        }

        context
    }
}

/// ## Summary
/// Reduces a raw request path to the segments the router matches on.
///
/// Empty segments are dropped, so doubled and trailing slashes vanish, and
/// every remaining segment is percent-decoded. `.` and `..` are kept as
/// literal segments.
#[must_use]
pub fn routing_path(raw: &str) -> String {
    let segments: Vec<_> = raw
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy())
        .collect();
    format!("/{}", segments.join("/"))
}
