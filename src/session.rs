//! Session lifecycle: discover, isolate, run, restore.
//!
//! A [`Session`] is built once per test binary and wraps the whole run:
//!
//! ```no_run
//! use envguard::{AllowList, Session, SourceSet};
//!
//! let session = Session::new(SourceSet::new().with_path("app/settings.py"))
//!     .with_allow_list(&AllowList::aider());
//! let failures = session.run(|| {
//!     // run every test case here
//!     0usize
//! })?;
//! # Ok::<(), envguard::GuardError>(())
//! ```

use anyhow::{Context, Result};
use tracing::info;

use crate::allowlist::AllowList;
use crate::config::Config;
use crate::discover::Discoverer;
use crate::error::GuardError;
use crate::guard::EnvironmentGuard;
use crate::patterns::PatternSet;
use crate::source::SourceSet;
use crate::target::TargetNameSet;

/// Everything needed to compute the target names for one test session.
#[derive(Debug, Clone)]
pub struct Session {
    sources: SourceSet,
    discoverer: Discoverer,
    allow: AllowList,
}

impl Session {
    /// Session over `sources` using the default idioms and an empty allow-list.
    #[must_use]
    pub fn new(sources: SourceSet) -> Self {
        Self {
            sources,
            discoverer: Discoverer::default(),
            allow: AllowList::default(),
        }
    }

    /// Build a session from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let patterns =
            PatternSet::compile(config.idioms()).context("Failed to compile lookup idioms")?;
        let extensions = config.extensions();
        let mut sources = SourceSet::new();
        for root in config.roots() {
            sources.extend(SourceSet::walk(
                &root,
                &extensions,
                config.respect_gitignore(),
            ));
        }
        Ok(Self {
            sources,
            discoverer: Discoverer::new(patterns),
            allow: config.allow_list()?,
        })
    }

    /// Replace the default idioms with a custom discoverer.
    #[must_use]
    pub fn with_discoverer(mut self, discoverer: Discoverer) -> Self {
        self.discoverer = discoverer;
        self
    }

    /// Add names hard-coded at the call site.
    #[must_use]
    pub fn with_allow_list(mut self, allow: &AllowList) -> Self {
        self.allow = self.allow.merged(allow);
        self
    }

    /// Discover names and merge them with the allow-list.
    #[must_use]
    pub fn target_names(&self) -> TargetNameSet {
        let candidates = self.discoverer.discover(&self.sources);
        info!(
            sources = self.sources.len(),
            discovered = candidates.len(),
            allowed = self.allow.len(),
            "computed session target names"
        );
        TargetNameSet::union(candidates, &self.allow)
    }

    /// Compute the target names and engage a guard over them.
    pub fn engage(&self) -> Result<EnvironmentGuard, GuardError> {
        EnvironmentGuard::engage(self.target_names())
    }

    /// Run `work` with every target name cleared, then restore.
    ///
    /// The work's return value, including any `Err`, is handed back as is.
    /// If the work panics the guard restores the environment while unwinding.
    pub fn run<R, F>(&self, work: F) -> Result<R, GuardError>
    where
        F: FnOnce() -> R,
    {
        let guard = self.engage()?;
        let outcome = work();
        guard.restore();
        Ok(outcome)
    }
}
