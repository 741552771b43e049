//! Configuration loading and defaults for envguard sessions.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::allowlist::AllowList;
use crate::patterns::{LookupIdiom, default_idioms};

pub const CONFIG_FILE_NAME: &str = "envguard.toml";
pub const DEFAULT_ROOTS: &[&str] = &["src"];
pub const DEFAULT_EXTENSIONS: &[&str] = &["rs", "py"];

// === Types ===

/// Session configuration, as read from `envguard.toml` plus environment overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directories or files to scan.
    pub roots: Option<Vec<String>>,
    /// File extensions considered source.
    pub extensions: Option<Vec<String>>,
    /// Extra names isolated regardless of discovery.
    pub allow: Option<Vec<String>>,
    /// Additional lookup idioms.
    pub idioms: Option<Vec<LookupIdiom>>,
    /// Whether the built-in Python and Rust idioms are scanned too.
    pub default_idioms: Option<bool>,
    pub respect_gitignore: Option<bool>,

    /// Directory relative roots are resolved against. Set by `load`.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

// === Config Loading ===

impl Config {
    /// Load configuration from disk and merge with environment overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = resolve_load_config_path(path);
        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let mut parsed: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            parsed.base_dir = path.parent().map(Path::to_path_buf);
            parsed
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that could never scan anything or isolate anything sensibly.
    pub fn validate(&self) -> Result<()> {
        if let Some(roots) = &self.roots
            && roots.iter().all(|r| r.trim().is_empty())
        {
            anyhow::bail!("Invalid config: roots cannot be empty");
        }
        if let Some(extensions) = &self.extensions
            && extensions.iter().all(|e| e.trim().is_empty())
        {
            anyhow::bail!("Invalid config: extensions cannot be empty");
        }
        if let Some(idioms) = &self.idioms
            && let Some(idiom) = idioms.iter().find(|i| i.name.trim().is_empty())
        {
            anyhow::bail!("Invalid config: idiom of kind {:?} has an empty name", idiom.kind);
        }
        self.allow_list()?;
        Ok(())
    }

    /// Scan roots, with `~` expanded and relative paths resolved against the config file.
    #[must_use]
    pub fn roots(&self) -> Vec<PathBuf> {
        let raw: Vec<String> = self
            .roots
            .clone()
            .unwrap_or_else(|| DEFAULT_ROOTS.iter().map(|s| (*s).to_string()).collect());
        raw.iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(|r| {
                let path = expand_path(r);
                match (&self.base_dir, path.is_relative()) {
                    (Some(base), true) => base.join(path),
                    _ => path,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        self.extensions
            .clone()
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect())
            .into_iter()
            .map(|e| e.trim().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect()
    }

    pub fn allow_list(&self) -> Result<AllowList> {
        let names = self.allow.clone().unwrap_or_default();
        AllowList::new(names).context("Invalid config: bad allow-list entry")
    }

    /// Idioms to compile: the built-ins (unless disabled) followed by configured ones.
    #[must_use]
    pub fn idioms(&self) -> Vec<LookupIdiom> {
        let mut idioms = if self.default_idioms.unwrap_or(true) {
            default_idioms()
        } else {
            Vec::new()
        };
        idioms.extend(self.idioms.clone().unwrap_or_default());
        idioms
    }

    #[must_use]
    pub fn respect_gitignore(&self) -> bool {
        self.respect_gitignore.unwrap_or(true)
    }
}

// === Defaults ===

fn env_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("ENVGUARD_CONFIG_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(expand_path(trimmed));
        }
    }
    None
}

fn resolve_load_config_path(path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = path {
        return expand_pathbuf(path);
    }
    env_config_path().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

fn expand_pathbuf(path: PathBuf) -> PathBuf {
    if let Some(raw) = path.to_str() {
        return expand_path(raw);
    }
    path
}

fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.as_ref())
}

// === Environment Overrides ===

fn apply_env_overrides(config: &mut Config) {
    if let Ok(value) = std::env::var("ENVGUARD_ROOTS") {
        config.roots = Some(split_list(&value));
        // Roots from the environment are relative to the working directory.
        config.base_dir = None;
    }
    if let Ok(value) = std::env::var("ENVGUARD_EXTENSIONS") {
        config.extensions = Some(split_list(&value));
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
