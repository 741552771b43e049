//! Static discovery of environment variable names.
//!
//! The discoverer reads each artifact in a [`SourceSet`] and runs a
//! [`PatternSet`] over its text. A per-artifact failure only skips that
//! artifact; discovery itself cannot fail.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{PatternError, SourceError};
use crate::patterns::{LookupIdiom, PatternSet};
use crate::source::SourceSet;

/// Names recovered by one discovery run. Immutable once returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateNameSet {
    names: BTreeSet<String>,
}

impl CandidateNameSet {
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

    pub(crate) fn into_inner(self) -> BTreeSet<String> {
        self.names
    }
}

/// Scans source text for literal environment lookups.
#[derive(Debug, Clone)]
pub struct Discoverer {
    patterns: PatternSet,
}

impl Default for Discoverer {
    fn default() -> Self {
        Self {
            patterns: PatternSet::defaults().clone(),
        }
    }
}

impl Discoverer {
    #[must_use]
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    /// Discoverer that only recognises the given idioms.
    pub fn with_idioms<I>(idioms: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = LookupIdiom>,
    {
        Ok(Self::new(PatternSet::compile(idioms)?))
    }

    /// Extract names from a single piece of text.
    #[must_use]
    pub fn scan_text(&self, text: &str) -> CandidateNameSet {
        let mut names = BTreeSet::new();
        self.patterns.extract_into(text, &mut names);
        CandidateNameSet { names }
    }

    /// Scan every artifact and union the results.
    #[must_use]
    pub fn discover(&self, sources: &SourceSet) -> CandidateNameSet {
        let mut names = BTreeSet::new();
        let mut scanned = 0usize;
        let mut skipped = 0usize;

        for artifact in sources.iter() {
            let module = match artifact.load() {
                Ok(module) => module,
                Err(err) => {
                    skipped += 1;
                    log_skip(&artifact.label(), &err);
                    continue;
                }
            };
            let before = names.len();
            self.patterns.extract_into(&module.text, &mut names);
            debug!(
                source = %module.label,
                new = names.len() - before,
                "scanned source"
            );
            scanned += 1;
        }

        debug!(
            scanned,
            skipped,
            found = names.len(),
            "environment name discovery finished"
        );
        CandidateNameSet { names }
    }
}

fn log_skip(label: &str, err: &SourceError) {
    match err {
        SourceError::Unavailable { .. } => {
            debug!(source = %label, "skipping unavailable source: {err}");
        }
        SourceError::NotText { .. } => debug!(source = %label, "skipping source without text: {err}"),
    }
}
