//! The full set of names one guard manages.

use std::collections::BTreeSet;

use crate::allowlist::AllowList;
use crate::discover::CandidateNameSet;

/// Discovered names plus allow-listed names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetNameSet {
    names: BTreeSet<String>,
}

impl TargetNameSet {
    #[must_use]
    pub fn union(candidates: CandidateNameSet, allow: &AllowList) -> Self {
        let mut names = candidates.into_inner();
        names.extend(allow.iter().map(str::to_string));
        Self { names }
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

impl<S: Into<String>> FromIterator<S> for TargetNameSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
