//! Exclusion policy
//!
//! Unions three rule sets into one ordered list:
//! 1. patterns from `<root>/.gitignore`
//! 2. the built-in defaults below
//! 3. user-supplied `--exclude` patterns
//!
//! A path is excluded when any rule matches it. Ignore-file and built-in
//! patterns are prefixed with `**` so they match at any depth; user patterns
//! are taken verbatim.

use std::fs;
use std::io;
use std::path::Path;

use crate::core::error::PipelineError;
use crate::discovery::matcher::{compile, CompiledPattern};

/// Ignore file read from the root of the walk
pub const IGNORE_FILE: &str = ".gitignore";

/// Built-in exclusions, before depth anchoring
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // dependency and build output
    "node_modules/**",
    "vendor/**",
    "build/**",
    "dist/**",
    // binaries and archives
    ".exe",
    ".dll",
    ".so",
    ".dylib",
    ".class",
    ".jar",
    ".war",
    ".ear",
    ".zip",
    ".tar.gz",
    ".rar",
    ".log",
    // version control
    ".git/**",
    ".svn/**",
    ".hg/**",
    // documents and images
    ".pdf",
    ".png",
    ".jpg",
    ".jpeg",
    ".gif",
    ".bmp",
    ".tiff",
    ".ico",
    ".svg",
    ".webp",
    // minified assets and lockfiles
    ".min.js",
    ".min.css",
    ".lock",
    // tests
    "test*/**",
    "test*.{js,py,go,java,cs,ts,cpp,c,rb}",
    "spec*.{js,ts}",
    "__tests__/**",
];

/// Where a rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    IgnoreFile,
    BuiltIn,
    User,
}

/// A single exclusion pattern
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    pub pattern: String,
    pub source: RuleSource,
    compiled: Option<CompiledPattern>,
}

impl ExclusionRule {
    fn new(pattern: String, source: RuleSource) -> Self {
        let compiled = match compile(&pattern) {
            Ok(compiled) => Some(compiled),
            Err(err) => {
                tracing::warn!(%pattern, ?source, error = %err, "ignoring malformed exclude pattern");
                None
            }
        };
        Self {
            pattern,
            source,
            compiled,
        }
    }

    /// Whether the pattern compiled; malformed rules never match
    pub fn is_valid(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.compiled
            .as_ref()
            .is_some_and(|compiled| compiled.is_match(path))
    }
}

/// Ordered, merged exclusion rules for one walk
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    rules: Vec<ExclusionRule>,
}

impl ExclusionPolicy {
    /// Build the policy for `root`: ignore file (if any), defaults, user patterns
    pub fn build(root: &Path, user_excludes: &[String]) -> Result<Self, PipelineError> {
        let ignore_patterns = read_ignore_file(root)?;
        Ok(Self::from_patterns(ignore_patterns, user_excludes))
    }

    /// Build the policy from already-read ignore-file patterns
    pub fn from_patterns(ignore_patterns: Vec<String>, user_excludes: &[String]) -> Self {
        let ignore_rules = ignore_patterns
            .into_iter()
            .map(|p| ExclusionRule::new(anchor_anywhere(&p), RuleSource::IgnoreFile));
        let default_rules = DEFAULT_EXCLUDES
            .iter()
            .map(|p| ExclusionRule::new(anchor_anywhere(p), RuleSource::BuiltIn));
        let user_rules = user_excludes
            .iter()
            .map(|p| ExclusionRule::new(p.clone(), RuleSource::User));

        let rules: Vec<ExclusionRule> = ignore_rules.chain(default_rules).chain(user_rules).collect();
        for rule in &rules {
            tracing::trace!(pattern = %rule.pattern, source = ?rule.source, "exclusion rule");
        }
        tracing::debug!(
            rules = rules.len(),
            invalid = rules.iter().filter(|r| !r.is_valid()).count(),
            "exclusion policy built"
        );
        Self { rules }
    }

    pub fn rules(&self) -> &[ExclusionRule] {
        &self.rules
    }

    /// The first rule matching `path`, in evaluation order
    pub fn matching_rule(&self, path: &str) -> Option<&ExclusionRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// Whether a root-relative path is excluded by any rule
    pub fn is_excluded(&self, path: &str) -> bool {
        self.matching_rule(path).is_some()
    }

    /// Whether a root-relative directory is excluded
    ///
    /// Also probes `dir/` so directory-shaped patterns (`node_modules/**`,
    /// an ignore line `target/`) prune the directory itself.
    pub fn is_dir_excluded(&self, dir: &str) -> bool {
        self.is_excluded(dir) || self.is_excluded(&format!("{}/", dir))
    }
}

/// Prefix a pattern so it matches at any depth
fn anchor_anywhere(pattern: &str) -> String {
    format!("**{}", pattern)
}

/// Read ignore-file patterns from `<root>/.gitignore`
///
/// A missing file yields no patterns. Lines are trimmed; blank lines and
/// `#` comments are skipped.
pub fn read_ignore_file(root: &Path) -> Result<Vec<String>, PipelineError> {
    let path = root.join(IGNORE_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(PipelineError::IgnoreFile { path, source }),
    };

    Ok(parse_ignore_lines(&content))
}

fn parse_ignore_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
