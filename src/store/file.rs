// SPDX-License-Identifier: GPL-3.0-only

use super::{PersistenceStore, StoreResult, decode_record, encode_record};
use crate::state::PersistedRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Store that keeps one `<key>.json` file per record in a directory.
///
/// Writes land in a temporary sibling file first and are renamed into place,
/// so a crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9_-]` become `_`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl PersistenceStore for JsonFileStore {
    fn load(&self, key: &str) -> StoreResult<Option<PersistedRecord>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => decode_record(key, &text).map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, key: &str, record: &PersistedRecord) -> StoreResult<()> {
        let text = encode_record(record)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            match fs::remove_file(&tmp) {
                Err(cleanup) if cleanup.kind() != ErrorKind::NotFound => tracing::warn!(
                    "Failed to remove {}: {}",
                    tmp.display(),
                    cleanup
                ),
                _ => {}
            }
            return Err(err.into());
        }

        tracing::debug!("Wrote panel record to {}", path.display());
        Ok(())
    }
}
