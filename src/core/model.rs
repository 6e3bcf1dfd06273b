//! Data model shared by the discovery pipeline and its collaborators
//!
//! The pipeline produces an ordered `Vec<FileRecord>`; everything downstream
//! (tree, template, token counter, output envelope) only reads it.

use serde::{Deserialize, Serialize};

/// Default cap on files reported per directory when sampling is enabled
pub const DEFAULT_MAX_FILES_PER_DIRECTORY: i64 = 5;

/// A file selected by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to root, using '/' as separator
    pub path: String,

    /// File content (lossy UTF-8)
    pub content: String,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Parent directory of this record, `"."` for files directly under root
    pub fn parent_dir(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => ".",
        }
    }
}

/// Options recognized by the discovery pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Additional glob patterns, unioned with ignore-file and built-in patterns
    pub exclude: Vec<String>,

    /// Per-directory cap; `<= 0` means no cap
    pub max_files_per_directory: i64,

    /// Bypass the sampler entirely
    pub disable_sampling: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            max_files_per_directory: DEFAULT_MAX_FILES_PER_DIRECTORY,
            disable_sampling: false,
        }
    }
}

impl PipelineConfig {
    /// Effective cap, or `None` when every matched file is kept
    pub fn sample_cap(&self) -> Option<usize> {
        if self.disable_sampling {
            return None;
        }
        normalize_cap(self.max_files_per_directory)
    }
}

/// Normalize a raw cap value: non-positive values mean "no cap"
pub fn normalize_cap(max_per_directory: i64) -> Option<usize> {
    usize::try_from(max_per_directory).ok().filter(|cap| *cap > 0)
}

/// JSON envelope emitted with `--json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOutput {
    pub prompt: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,

    /// Number of files rendered into the prompt
    pub file_count: usize,

    /// xxh3 digest of `prompt`
    pub fingerprint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_dir() {
        assert_eq!(FileRecord::new("main.go", "").parent_dir(), ".");
        assert_eq!(FileRecord::new("a/1.go", "").parent_dir(), "a");
        assert_eq!(FileRecord::new("a/b/c.rs", "").parent_dir(), "a/b");
    }

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert!(config.exclude.is_empty());
        assert_eq!(config.max_files_per_directory, 5);
        assert!(!config.disable_sampling);
        assert_eq!(config.sample_cap(), Some(5));
    }

    #[test]
    fn test_sample_cap_non_positive_is_uncapped() {
        for raw in [0, -1, i64::MIN] {
            let config = PipelineConfig {
                max_files_per_directory: raw,
                ..Default::default()
            };
            assert_eq!(config.sample_cap(), None, "cap {}", raw);
        }
    }

    #[test]
    fn test_sample_cap_disabled() {
        let config = PipelineConfig {
            max_files_per_directory: 3,
            disable_sampling: true,
            ..Default::default()
        };
        assert_eq!(config.sample_cap(), None);
    }

    #[test]
    fn test_pipeline_config_camel_case() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{"exclude":["*.md"],"maxFilesPerDirectory":2,"disableSampling":true}"#,
        )
        .unwrap();
        assert_eq!(config.exclude, vec!["*.md".to_string()]);
        assert_eq!(config.max_files_per_directory, 2);
        assert!(config.disable_sampling);

        let partial: PipelineConfig = serde_json::from_str(r#"{"exclude":[]}"#).unwrap();
        assert_eq!(partial.max_files_per_directory, 5);
    }

    #[test]
    fn test_prompt_output_omits_missing_token_count() {
        let output = PromptOutput {
            prompt: "p".to_string(),
            token_count: None,
            file_count: 0,
            fingerprint: "00".to_string(),
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(!json.contains("token_count"));
    }
}
