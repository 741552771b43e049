//! Textual patterns for environment lookup idioms.
//!
//! Each idiom compiles to one regex that captures a variable name only when it
//! is a quoted literal sitting directly inside the call or index syntax. Names
//! assembled from concatenation, formatting, or variables are not matched, and
//! commented-out code is matched like any other text.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::PatternError;

/// Single- or double-quoted literal made of name characters.
const QUOTED_NAME: &str = r#"(?:"([A-Za-z0-9_]+)"|'([A-Za-z0-9_]+)')"#;

/// Syntactic shape of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdiomKind {
    /// `name("VAR")` or `name("VAR", default)`.
    Call,
    /// `name["VAR"]`.
    Index,
}

/// One lookup idiom, e.g. a call to `os.getenv` or indexing `os.environ`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LookupIdiom {
    pub kind: IdiomKind,
    pub name: String,
}

impl LookupIdiom {
    #[must_use]
    pub fn call(name: impl Into<String>) -> Self {
        Self {
            kind: IdiomKind::Call,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn index(name: impl Into<String>) -> Self {
        Self {
            kind: IdiomKind::Index,
            name: name.into(),
        }
    }

    fn to_pattern(&self) -> String {
        let starts_with_word = self
            .name
            .starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_');
        let boundary = if starts_with_word { r"\b" } else { "" };
        let name = regex::escape(&self.name);
        match self.kind {
            // The literal must be the whole first argument: next token is `,` or `)`.
            IdiomKind::Call => format!(r"{boundary}{name}\s*\(\s*{QUOTED_NAME}\s*[,)]"),
            IdiomKind::Index => format!(r"{boundary}{name}\s*\[\s*{QUOTED_NAME}\s*\]"),
        }
    }
}

/// Python and Rust lookup idioms scanned when nothing else is configured.
#[must_use]
pub fn default_idioms() -> Vec<LookupIdiom> {
    vec![
        // Python
        LookupIdiom::call("os.environ.get"),
        LookupIdiom::call("os.getenv"),
        LookupIdiom::call("os.environ"),
        LookupIdiom::index("os.environ"),
        // Rust
        LookupIdiom::call("env::var"),
        LookupIdiom::call("env::var_os"),
        LookupIdiom::call("env!"),
        LookupIdiom::call("option_env!"),
    ]
}

// === Compiled Patterns ===

#[derive(Debug, Clone)]
struct CompiledIdiom {
    idiom: LookupIdiom,
    regex: Regex,
}

/// A fixed, compiled set of lookup patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    compiled: Vec<CompiledIdiom>,
}

impl PatternSet {
    /// Compile the given idioms. Duplicate idioms are compiled once.
    ///
    /// Idioms with a blank name are rejected.
    pub fn compile<I>(idioms: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = LookupIdiom>,
    {
        let mut compiled: Vec<CompiledIdiom> = Vec::new();
        for idiom in idioms {
            if idiom.name.trim().is_empty() {
                return Err(PatternError::EmptyName { kind: idiom.kind });
            }
            if compiled.iter().any(|c| c.idiom == idiom) {
                continue;
            }
            let regex = Regex::new(&idiom.to_pattern())?;
            compiled.push(CompiledIdiom { idiom, regex });
        }
        Ok(Self { compiled })
    }

    /// Shared compiled copy of [`default_idioms`].
    #[must_use]
    pub fn defaults() -> &'static PatternSet {
        static DEFAULTS: OnceLock<PatternSet> = OnceLock::new();
        DEFAULTS.get_or_init(|| {
            PatternSet::compile(default_idioms()).expect("default idiom patterns should compile")
        })
    }

    pub fn idioms(&self) -> impl Iterator<Item = &LookupIdiom> {
        self.compiled.iter().map(|c| &c.idiom)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Add every literal name found in `text` to `out`.
    pub fn extract_into(&self, text: &str, out: &mut BTreeSet<String>) {
        for compiled in &self.compiled {
            for caps in compiled.regex.captures_iter(text) {
                if let Some(name) = caps.get(1).or_else(|| caps.get(2)) {
                    out.insert(name.as_str().to_string());
                }
            }
        }
    }
}
