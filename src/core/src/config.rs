//! Invocation configuration.
//!
//! A [`RetagConfig`] is resolved once from the command line and passed by
//! reference to every stage of the transform.

use crate::error::{Result, RetagError};
use crate::id::ImageId;

/// Caller-supplied metadata fields, in argument order.
///
/// Re-inserting a key replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataOverrides {
    entries: Vec<(String, String)>,
}

impl MetadataOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build overrides from a flat `key value key value ...` token list.
    pub fn from_pairs(tokens: &[String]) -> Result<Self> {
        if tokens.len() % 2 != 0 {
            return Err(RetagError::OddMetadataArguments {
                count: tokens.len(),
            });
        }

        let mut overrides = Self::new();
        let mut i = 0;
        while i < tokens.len() {
            overrides.insert(tokens[i].clone(), tokens[i + 1].clone());
            i += 2;
        }
        Ok(overrides)
    }

    pub fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything one run of the transform needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetagConfig {
    /// Identifier being replaced
    pub old_id: ImageId,
    /// Replacement identifier
    pub new_id: ImageId,
    /// Fields merged into the matching metadata record
    pub overrides: MetadataOverrides,
}

impl RetagConfig {
    pub fn new(old_id: ImageId, new_id: ImageId, overrides: MetadataOverrides) -> Self {
        Self {
            old_id,
            new_id,
            overrides,
        }
    }

}
