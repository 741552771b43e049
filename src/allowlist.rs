//! Hand-maintained names that must be isolated even when discovery misses them.

use std::collections::BTreeSet;

use crate::error::AllowListError;

/// Names the aider test suite isolates regardless of what discovery finds.
///
/// Most of these are read through indirection (config layers, provider
/// prefixes) and never appear as a literal lookup.
pub const AIDER_ALLOW_LIST: &[&str] = &[
    "AIDER_API_KEY",
    "AIDER_OPENAI_API_KEY",
    "AIDER_ANTHROPIC_API_KEY",
    "AIDER_MODEL",
    "AIDER_EDIT_FORMAT",
    "AIDER_MAP_TOKENS",
    "AIDER_CONFIG",
];

/// Immutable set of allow-listed variable names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    names: BTreeSet<String>,
}

impl AllowList {
    /// Build an allow-list, rejecting names that cannot be environment keys.
    pub fn new<I, S>(names: I) -> Result<Self, AllowListError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.into();
            if !is_valid_name(&name) {
                return Err(AllowListError::InvalidName { name });
            }
            set.insert(name);
        }
        Ok(Self { names: set })
    }

    /// The curated aider preset.
    #[must_use]
    pub fn aider() -> Self {
        Self {
            names: AIDER_ALLOW_LIST.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Return a new list containing the names of both lists.
    #[must_use]
    pub fn merged(&self, other: &AllowList) -> Self {
        Self {
            names: self.names.union(&other.names).cloned().collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Portable environment variable name: non-empty ASCII alphanumerics and `_`.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
