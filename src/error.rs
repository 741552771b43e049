//! Error types shared by discovery, the allow-list, and the environment guard.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::patterns::IdiomKind;

// === Errors ===

/// Reasons a single source artifact could not be scanned.
///
/// These never leave the discoverer; they are logged and the artifact is
/// skipped.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The artifact could not be opened or read.
    #[error("Source unavailable: {path}: {source}")]
    Unavailable { path: PathBuf, source: io::Error },
    /// The artifact was read but has no text form.
    #[error("Source is not valid UTF-8 text: {path}")]
    NotText { path: PathBuf },
}

/// Errors raised while engaging an environment guard.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    /// Another guard is still alive in this process.
    #[error("An environment guard is already engaged in this process")]
    AlreadyEngaged,
}

/// Errors raised while building an allow-list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllowListError {
    /// The name is empty or contains characters outside `[A-Za-z0-9_]`.
    #[error("Invalid environment variable name in allow-list: {name:?}")]
    InvalidName { name: String },
}

/// Errors raised while compiling lookup idioms.
#[derive(Debug, Error)]
pub enum PatternError {
    /// An idiom name that is empty would match the first literal of any call.
    #[error("Lookup idiom of kind {kind:?} has an empty name")]
    EmptyName { kind: IdiomKind },
    #[error(transparent)]
    Regex(#[from] regex::Error),
}
