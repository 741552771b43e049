//! Discover the environment variables an application reads and run a test
//! session against an environment where none of them are set.
//!
//! Discovery is a heuristic text scan: it finds names passed as quoted
//! literals to known lookup idioms (`os.getenv("X")`, `env::var("X")`,
//! `os.environ["X"]`, ...) and nothing else. The discovered names, plus a
//! hand-maintained allow-list, are snapshotted and removed from the process
//! environment for the duration of the session and put back afterwards.

pub mod allowlist;
pub mod config;
pub mod discover;
pub mod error;
pub mod guard;
pub mod patterns;
pub mod session;
pub mod source;
pub mod target;

#[cfg(test)]
mod test_support;

pub use allowlist::{AIDER_ALLOW_LIST, AllowList};
pub use config::Config;
pub use discover::{CandidateNameSet, Discoverer};
pub use error::{AllowListError, GuardError, PatternError, SourceError};
pub use guard::{EnvironmentGuard, EnvironmentSnapshot};
pub use patterns::{IdiomKind, LookupIdiom, PatternSet};
pub use session::Session;
pub use source::{ModuleSource, SourceArtifact, SourceSet};
pub use target::TargetNameSet;
