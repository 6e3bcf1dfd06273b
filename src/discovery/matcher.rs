//! Glob pattern compilation for exclusion rules
//!
//! Supports `*`, `**`, `?`, character classes and brace alternation
//! (`*.{png,jpg}`). `*` is allowed to cross `/`, so `*.md` matches at any
//! depth, and `**` glued to a name (`**node_modules/**`) acts as a plain
//! any-sequence wildcard.

use globset::{GlobBuilder, GlobMatcher};

/// A compiled glob, pure and stateless
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    matcher: GlobMatcher,
}

impl CompiledPattern {
    /// Check a slash-normalized relative path against the pattern
    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }
}

/// Compile a glob pattern
///
/// # Errors
/// Returns the glob parse error (unclosed class or alternation, dangling
/// escape, ...). Callers in the exclusion policy treat it as never matching.
pub fn compile(pattern: &str) -> Result<CompiledPattern, globset::Error> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(true)
        .build()?;
    Ok(CompiledPattern {
        matcher: glob.compile_matcher(),
    })
}
