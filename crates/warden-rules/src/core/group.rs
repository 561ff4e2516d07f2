//! Group definitions and the per-file arena that links them.
//!
//! A group file is a list of named definitions. A user reference inside a
//! definition may name an earlier definition of the same file; that link is
//! stored as a [`GroupId`] into the owning [`GroupFile`], so the arena can hold
//! any reference graph, cyclic ones included.

use std::fmt;

/// Index of a definition inside its [`GroupFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

impl GroupId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One entry in a user or address clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// User name, group name, IP mask or host name mask.
    pub literal_name: String,
    /// Linked group, set only for user references naming a known group.
    pub resolved_group: Option<GroupId>,
}

impl Reference {
    #[must_use]
    pub fn new(literal_name: impl Into<String>) -> Self {
        Self {
            literal_name: literal_name.into(),
            resolved_group: None,
        }
    }

    /// Creates a reference that is already linked to a group.
    #[must_use]
    pub fn linked(literal_name: impl Into<String>, group: GroupId) -> Self {
        Self {
            literal_name: literal_name.into(),
            resolved_group: Some(group),
        }
    }
}

/// One alternative within a group.
///
/// A missing user clause admits any user and a missing address clause admits
/// any address. When both are present both must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub user_clause: Option<Vec<Reference>>,
    pub address_clause: Option<Vec<Reference>>,
}

/// A named rule set, or the unnamed mask of a protection setup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDefinition {
    pub name: Option<String>,
    pub items: Vec<Item>,
}

impl GroupDefinition {
    #[must_use]
    pub fn named(name: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            name: Some(name.into()),
            items,
        }
    }

    #[must_use]
    pub fn unnamed(items: Vec<Item>) -> Self {
        Self { name: None, items }
    }

    fn user_references_mut(&mut self) -> impl Iterator<Item = &mut Reference> {
        self.items
            .iter_mut()
            .filter_map(|item| item.user_clause.as_mut())
            .flatten()
    }
}

/// The parsed contents of one group file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFile {
    definitions: Vec<GroupDefinition>,
}

impl GroupFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Builds a file from definitions whose references are already linked.
    ///
    /// No resolution pass runs; every `resolved_group` must index into
    /// `definitions`.
    #[must_use]
    pub fn from_linked(definitions: Vec<GroupDefinition>) -> Self {
        Self { definitions }
    }

    /// ## Summary
    /// Links the user references of `definition` against the definitions
    /// added so far, then appends it.
    ///
    /// Names declared later in the file are not visible, so forward references
    /// stay plain user names.
    pub fn push(&mut self, mut definition: GroupDefinition) -> GroupId {
        self.resolve_references(&mut definition);
        self.definitions.push(definition);
        GroupId(self.definitions.len() - 1)
    }

    /// Links every user reference of `definition` that names a definition of
    /// this file. Address references are left alone.
    pub fn resolve_references(&self, definition: &mut GroupDefinition) {
        for reference in definition.user_references_mut() {
            reference.resolved_group = self.find(&reference.literal_name);
        }
    }

    /// ## Summary
    /// Returns a copy of a definition from elsewhere, such as a protection
    /// mask, with its user references linked into this file.
    #[must_use]
    pub fn resolve_external(&self, definition: &GroupDefinition) -> GroupDefinition {
        let mut resolved = definition.clone();
        self.resolve_references(&mut resolved);
        resolved
    }

    /// Finds the first definition with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<GroupId> {
        self.definitions
            .iter()
            .position(|definition| definition.name.as_deref() == Some(name))
            .map(GroupId)
    }

    /// Looks a definition up by name.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&GroupDefinition> {
        self.find(name).and_then(|id| self.get(id))
    }

    #[must_use]
    pub fn get(&self, id: GroupId) -> Option<&GroupDefinition> {
        self.definitions.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupDefinition> {
        self.definitions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user_clause {
            Some(users) => {
                let rendered: Vec<String> = users
                    .iter()
                    .map(|r| {
                        let marker = if r.resolved_group.is_some() { "*REF*" } else { "" };
                        format!("{}{marker}", r.literal_name)
                    })
                    .collect();
                write!(f, "[{}] ", rendered.join("; "))?;
            }
            None => f.write_str("ANYBODY ")?,
        }

        match &self.address_clause {
            Some(addresses) => {
                let rendered: Vec<&str> =
                    addresses.iter().map(|r| r.literal_name.as_str()).collect();
                write!(f, "@ [{}]", rendered.join("; "))
            }
            None => f.write_str("@ ANYADDRESS"),
        }
    }
}

impl fmt::Display for GroupDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Group {}:", self.name.as_deref().unwrap_or("NULL"))?;
        if self.items.is_empty() {
            return f.write_str("\tEMPTY");
        }
        for item in &self.items {
            writeln!(f, "\t{item}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(names: &[&str]) -> Item {
        Item {
            user_clause: Some(names.iter().map(|n| Reference::new(*n)).collect()),
            address_clause: None,
        }
    }

    #[test]
    fn push_links_backward_references_only() {
        let mut file = GroupFile::new();
        file.push(GroupDefinition::named("staff", vec![users(&["alice", "bob"])]));
        let id = file.push(GroupDefinition::named(
            "everyone",
            vec![users(&["staff", "later", "carol"])],
        ));
        file.push(GroupDefinition::named("later", vec![users(&["dave"])]));

        let everyone = file.get(id).expect("definition exists");
        let refs = everyone.items[0].user_clause.as_ref().expect("user clause");
        assert_eq!(refs[0].resolved_group, Some(GroupId::new(0)));
        assert_eq!(refs[1].resolved_group, None);
        assert_eq!(refs[2].resolved_group, None);
    }

    #[test]
    fn address_references_are_never_linked() {
        let mut file = GroupFile::new();
        file.push(GroupDefinition::named("lan", vec![users(&["alice"])]));
        let id = file.push(GroupDefinition::named(
            "remote",
            vec![Item {
                user_clause: None,
                address_clause: Some(vec![Reference::new("lan")]),
            }],
        ));

        let remote = file.get(id).expect("definition exists");
        let addresses = remote.items[0].address_clause.as_ref().expect("address clause");
        assert_eq!(addresses[0].resolved_group, None);
    }

    #[test]
    fn find_returns_first_of_duplicate_names() {
        let mut file = GroupFile::new();
        file.push(GroupDefinition::named("dup", vec![users(&["a"])]));
        file.push(GroupDefinition::named("dup", vec![users(&["b"])]));

        assert_eq!(file.find("dup"), Some(GroupId::new(0)));
        assert_eq!(file.len(), 2);
    }

    #[test]
    fn resolve_external_links_mask_against_file() {
        let mut file = GroupFile::new();
        file.push(GroupDefinition::named("staff", vec![users(&["alice"])]));

        let mask = GroupDefinition::unnamed(vec![users(&["staff", "root"])]);
        let resolved = file.resolve_external(&mask);

        let refs = resolved.items[0].user_clause.as_ref().expect("user clause");
        assert_eq!(refs[0].resolved_group, Some(GroupId::new(0)));
        assert_eq!(refs[1].resolved_group, None);
        assert!(mask.items[0].user_clause.as_ref().expect("clause")[0]
            .resolved_group
            .is_none());
    }

    #[test]
    fn display_marks_references_and_wildcards() {
        let mut file = GroupFile::new();
        file.push(GroupDefinition::named("staff", vec![users(&["alice"])]));
        let id = file.push(GroupDefinition::named(
            "admins",
            vec![
                Item {
                    user_clause: Some(vec![Reference::new("staff"), Reference::new("root")]),
                    address_clause: Some(vec![Reference::new("10.0.0.*")]),
                },
                Item::default(),
            ],
        ));

        let rendered = file.get(id).expect("definition exists").to_string();
        assert!(rendered.starts_with("Group admins:"));
        assert!(rendered.contains("[staff*REF*; root] @ [10.0.0.*]"));
        assert!(rendered.contains("ANYBODY @ ANYADDRESS"));
    }
}
