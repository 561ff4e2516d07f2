//! Recursive group membership.
//!
//! A definition is evaluated item by item. Each item checks the peer address
//! first, then the user. User references linked to another group are checked
//! recursively; the set of groups on the current recursion path guards
//! against reference cycles.

use std::collections::HashSet;

use warden_rules::core::{GroupDefinition, GroupFile, GroupId, Item, Reference};

use super::mask::mask_match;

/// Outcome of a membership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Ok,
    NotMember,
    /// An item's address clause rejected the peer.
    BlockedByAddress,
}

impl Membership {
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Address of the connecting client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Peer<'a> {
    pub ip: Option<&'a str>,
    pub host: Option<&'a str>,
}

impl<'a> Peer<'a> {
    #[must_use]
    pub const fn new(ip: Option<&'a str>, host: Option<&'a str>) -> Self {
        Self { ip, host }
    }

    #[must_use]
    pub const fn ip(ip: &'a str) -> Self {
        Self {
            ip: Some(ip),
            host: None,
        }
    }
}

/// Resolves membership against the definitions of one group file.
pub struct MembershipResolver<'a> {
    file: &'a GroupFile,
}

impl<'a> MembershipResolver<'a> {
    #[must_use]
    pub const fn new(file: &'a GroupFile) -> Self {
        Self { file }
    }

    /// ## Summary
    /// Checks whether `username`, connecting from `peer`, belongs to `definition`.
    ///
    /// The first item whose address clause rejects the peer ends the check
    /// with [`Membership::BlockedByAddress`]; later items are not consulted.
    #[must_use]
    pub fn is_member(&self, definition: &GroupDefinition, username: &str, peer: Peer<'_>) -> Membership {
        let mut path = HashSet::new();
        let result = self.check(definition, username, peer, &mut path);
        tracing::debug!(
            group = definition.name.as_deref().unwrap_or("<mask>"),
            username,
            ?result,
            "Membership resolved"
        );
        result
    }

    /// Checks membership in the named group of this file. An unknown name
    /// admits nobody.
    #[must_use]
    pub fn is_member_of(&self, group: &str, username: &str, peer: Peer<'_>) -> Membership {
        match self.file.definition(group) {
            Some(definition) => self.is_member(definition, username, peer),
            None => {
                tracing::debug!(group, "No such group");
                Membership::NotMember
            }
        }
    }

    fn check(
        &self,
        definition: &GroupDefinition,
        username: &str,
        peer: Peer<'_>,
        path: &mut HashSet<GroupId>,
    ) -> Membership {
        for item in &definition.items {
            if !address_allowed(item, peer) {
                return Membership::BlockedByAddress;
            }

            let Some(users) = &item.user_clause else {
                return Membership::Ok;
            };

            if users
                .iter()
                .any(|reference| self.reference_admits(reference, username, peer, path))
            {
                return Membership::Ok;
            }
        }

        Membership::NotMember
    }

    fn reference_admits(
        &self,
        reference: &Reference,
        username: &str,
        peer: Peer<'_>,
        path: &mut HashSet<GroupId>,
    ) -> bool {
        let Some(id) = reference.resolved_group else {
            return !username.is_empty() && reference.literal_name == username;
        };

        let Some(group) = self.file.get(id) else {
            tracing::warn!(name = %reference.literal_name, "Dangling group reference");
            return false;
        };

        if !path.insert(id) {
            tracing::warn!(name = %reference.literal_name, "Group reference cycle; branch skipped");
            return false;
        }
        let result = self.check(group, username, peer, path);
        path.remove(&id);

        result.is_ok()
    }
}

fn address_allowed(item: &Item, peer: Peer<'_>) -> bool {
    item.address_clause.as_ref().is_none_or(|masks| {
        masks
            .iter()
            .any(|mask| mask_match(&mask.literal_name, peer.ip, peer.host))
    })
}
