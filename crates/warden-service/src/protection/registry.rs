use std::path::PathBuf;
use std::sync::Arc;

use warden_rules::core::ProtectionRecord;
use warden_rules::parse::parse_protection_file;

use crate::cache::FileCache;

/// Cache of parsed protection setup files, keyed by path.
#[derive(Debug, Default)]
pub struct ProtectionRegistry {
    cache: FileCache<ProtectionRecord>,
}

impl ProtectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Returns the protection record for `path`, parsing the file on first use.
    ///
    /// An unreadable file yields a fresh empty record, which is not cached.
    #[must_use]
    #[tracing::instrument(skip(self))]
    pub fn load(&self, path: &str) -> Arc<ProtectionRecord> {
        self.cache
            .get_or_load(path, read_protection_file)
            .unwrap_or_else(|| Arc::new(ProtectionRecord::empty()))
    }

    /// ## Summary
    /// Parses protection file text, logging and dropping malformed lines.
    #[must_use]
    pub fn parse(source_path: Option<PathBuf>, input: &str) -> ProtectionRecord {
        let directives = parse_protection_file(input)
            .into_iter()
            .filter_map(|outcome| {
                outcome
                    .inspect_err(|err| tracing::debug!(error = %err, "Protection line dropped"))
                    .ok()
            });
        ProtectionRecord::from_directives(source_path, directives)
    }
}

fn read_protection_file(path: &str) -> Option<ProtectionRecord> {
    let input = match std::fs::read_to_string(path) {
        Ok(input) => input,
        Err(e) => {
            tracing::debug!(path, error = %e, "Unable to open protection setup file");
            return None;
        }
    };

    let record = ProtectionRegistry::parse(Some(PathBuf::from(path)), &input);
    tracing::info!(
        path,
        schemes = ?record.allowed_schemes,
        attributes = record.attributes.len(),
        masked = record.mask_group.is_some(),
        "Loaded protection setup file"
    );
    Some(record)
}
