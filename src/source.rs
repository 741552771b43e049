//! Source artifacts handed to the discoverer.
//!
//! Artifacts are only ever read, never loaded or executed.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use crate::error::SourceError;

/// One thing to scan: a file on disk or text supplied directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceArtifact {
    Path(PathBuf),
    Inline { label: String, text: String },
}

impl SourceArtifact {
    /// Human-readable label used in logs.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            SourceArtifact::Path(path) => path.display().to_string(),
            SourceArtifact::Inline { label, .. } => label.clone(),
        }
    }

    /// Read the artifact's text.
    pub fn load(&self) -> Result<ModuleSource, SourceError> {
        match self {
            SourceArtifact::Path(path) => {
                let bytes = fs::read(path).map_err(|source| SourceError::Unavailable {
                    path: path.clone(),
                    source,
                })?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| SourceError::NotText { path: path.clone() })?;
                Ok(ModuleSource {
                    label: path.display().to_string(),
                    text,
                })
            }
            SourceArtifact::Inline { label, text } => Ok(ModuleSource {
                label: label.clone(),
                text: text.clone(),
            }),
        }
    }
}

/// Text of one artifact, alive only for the duration of a scan.
#[derive(Debug)]
pub struct ModuleSource {
    pub label: String,
    pub text: String,
}

/// Explicit list of artifacts to scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    artifacts: Vec<SourceArtifact>,
}

impl SourceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifacts.push(SourceArtifact::Path(path.into()));
        self
    }

    /// Add in-memory text.
    #[must_use]
    pub fn with_text(mut self, label: impl Into<String>, text: impl Into<String>) -> Self {
        self.artifacts.push(SourceArtifact::Inline {
            label: label.into(),
            text: text.into(),
        });
        self
    }

    pub fn extend(&mut self, other: SourceSet) {
        self.artifacts.extend(other.artifacts);
    }

    /// Collect every file under `root` whose extension is in `extensions`.
    ///
    /// When `root` is itself a file it is included if the extension matches.
    /// Entries the walker cannot read are skipped.
    #[must_use]
    pub fn walk(root: &Path, extensions: &[String], respect_gitignore: bool) -> Self {
        let mut paths = Vec::new();

        let walker = WalkBuilder::new(root)
            .hidden(false)
            .follow_links(true)
            .git_ignore(respect_gitignore)
            .git_global(false)
            .git_exclude(respect_gitignore)
            .require_git(false)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("skipping unreadable entry under {}: {err}", root.display());
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if has_extension(entry.path(), extensions) {
                paths.push(entry.into_path());
            }
        }

        paths.sort();
        Self {
            artifacts: paths.into_iter().map(SourceArtifact::Path).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceArtifact> {
        self.artifacts.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
}
