use std::sync::Arc;

use warden_rules::core::GroupFile;
use warden_rules::parse::parse_group_file;

use crate::cache::FileCache;

/// Cache of parsed group files, keyed by path.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    cache: FileCache<GroupFile>,
}

impl GroupRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Returns the parsed group file at `path`, reading it on first use.
    ///
    /// An unreadable file yields an empty, uncached group file. Malformed
    /// declarations are logged and left out.
    #[must_use]
    #[tracing::instrument(skip(self))]
    pub fn load(&self, path: &str) -> Arc<GroupFile> {
        self.cache
            .get_or_load(path, read_group_file)
            .unwrap_or_default()
    }

    /// ## Summary
    /// Parses group file text and links its references, one declaration at a
    /// time.
    #[must_use]
    pub fn parse(input: &str) -> GroupFile {
        let mut file = GroupFile::new();
        for outcome in parse_group_file(input) {
            match outcome {
                Ok(definition) => {
                    file.push(definition);
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Group declaration dropped");
                }
            }
        }
        file
    }
}

fn read_group_file(path: &str) -> Option<GroupFile> {
    let input = match std::fs::read_to_string(path) {
        Ok(input) => input,
        Err(e) => {
            tracing::debug!(path, error = %e, "Unable to open group file");
            return None;
        }
    };

    let file = GroupRegistry::parse(&input);
    tracing::info!(path, groups = file.len(), "Loaded group file");
    for definition in file.iter() {
        tracing::trace!(%definition, "Group definition");
    }
    Some(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_is_cached_by_path() {
        let mut tmp = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(tmp, "staff: alice, bob").expect("write");
        let path = tmp.path().to_string_lossy().into_owned();

        let registry = GroupRegistry::new();
        let first = registry.load(&path);
        std::fs::remove_file(tmp.path()).expect("remove");
        let second = registry.load(&path);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn unreadable_file_is_empty() {
        let registry = GroupRegistry::new();
        let file = registry.load("/nonexistent/warden/groups");
        assert!(file.is_empty());
    }

    #[test_log::test]
    fn parse_keeps_valid_declarations() {
        let file = GroupRegistry::parse("a: x\nbad: , \nb: (a, y)\n");
        assert_eq!(file.len(), 2);
        let b = file.definition("b").expect("b parsed");
        let refs = b.items[0].user_clause.as_ref().expect("users");
        assert!(refs[0].resolved_group.is_some());
        assert!(refs[1].resolved_group.is_none());
    }
}
