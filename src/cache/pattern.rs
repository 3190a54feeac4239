//! Pattern Matcher Module
//!
//! Compiles invalidation globs into anchored regular expressions. `*` matches
//! zero or more characters; the whole key must match.
//!
//! Two modes exist:
//! - [`PatternMode::Loose`] (default) substitutes `*` and passes every other
//!   character to the regex engine untouched, so `.` in `report.2024` also
//!   matches `reportX2024` and an unbalanced `(` is a syntax error.
//! - [`PatternMode::Strict`] escapes literal segments first, so every
//!   character other than `*` matches itself.

use regex::Regex;

use crate::error::CacheError;

/// How literal glob segments are handed to the regex engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternMode {
    #[default]
    Loose,
    Strict,
}

// == Pattern Matcher ==
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    glob: String,
    regex: Regex,
}

impl PatternMatcher {
    /// Compiles `glob`, rejecting empty or malformed patterns.
    pub fn compile(glob: &str, mode: PatternMode) -> Result<Self, CacheError> {
        if glob.is_empty() {
            return Err(CacheError::PatternSyntax {
                pattern: glob.to_string(),
                reason: "pattern is empty".to_string(),
            });
        }

        let body = match mode {
            PatternMode::Loose => glob.replace('*', ".*"),
            PatternMode::Strict => glob
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*"),
        };

        let regex = Regex::new(&format!("^(?:{})$", body)).map_err(|e| {
            CacheError::PatternSyntax {
                pattern: glob.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }
}
