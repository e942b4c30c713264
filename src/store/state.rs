//! Identifiers of messages that already contributed rows.

use super::write_atomic;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedIds {
    #[serde(default)]
    processed_ids: BTreeSet<String>,
}

impl ProcessedIds {
    /// Load from `path`; an absent file is an empty set.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persist sorted and pretty-printed.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
        write_atomic(path, &json)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.processed_ids.contains(id)
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, ids: I) {
        self.processed_ids.extend(ids);
    }

    pub fn len(&self) -> usize {
        self.processed_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed_ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.processed_ids.iter().map(String::as_str)
    }
}
