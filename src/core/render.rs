//! Output envelope
//!
//! Wraps a rendered prompt for delivery: as-is, or as a JSON object with the
//! token count and a fingerprint.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::model::PromptOutput;
use crate::core::util::fingerprint;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Prompt,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Prompt
        }
    }
}

/// Renderer for the final artifact
pub struct Renderer {
    format: OutputFormat,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render the prompt in the configured envelope
    pub fn render(
        &self,
        prompt: String,
        token_count: Option<usize>,
        file_count: usize,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Prompt => Ok(prompt),
            OutputFormat::Json => {
                let output = PromptOutput {
                    fingerprint: fingerprint(prompt.as_bytes()),
                    prompt,
                    token_count,
                    file_count,
                };
                serde_json::to_string_pretty(&output).context("Failed to serialize JSON output")
            }
        }
    }
}

/// Write the artifact to a file, or print it to stdout
pub fn write_output(output: &str, destination: Option<&Path>) -> Result<()> {
    match destination {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("Failed to write output file: {:?}", path))?;
            tracing::info!(path = %path.display(), bytes = output.len(), "wrote prompt");
        }
        None => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_render_prompt_passthrough() {
        let renderer = Renderer::new(OutputFormat::Prompt);
        let output = renderer.render("hello".to_string(), Some(3), 1).unwrap();
        assert_eq!(output, "hello");
    }

    #[test]
    fn test_render_json() {
        let renderer = Renderer::new(OutputFormat::Json);
        let output = renderer.render("hello".to_string(), Some(3), 2).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["prompt"], "hello");
        assert_eq!(value["token_count"], 3);
        assert_eq!(value["file_count"], 2);
        assert_eq!(value["fingerprint"], fingerprint(b"hello"));
        // pretty-printed with two-space indentation
        assert!(output.contains("\n  \"prompt\""));
    }

    #[test]
    fn test_render_json_without_tokens() {
        let renderer = Renderer::new(OutputFormat::Json);
        let output = renderer.render("hello".to_string(), None, 0).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert!(value.get("token_count").is_none());
    }

    #[test]
    fn test_output_format_from_flag() {
        assert_eq!(OutputFormat::from_json_flag(true), OutputFormat::Json);
        assert_eq!(OutputFormat::from_json_flag(false), OutputFormat::Prompt);
        assert_eq!(OutputFormat::default(), OutputFormat::Prompt);
    }

    #[test]
    fn test_write_output_to_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("prompt.md");
        write_output("content", Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_write_output_missing_dir_fails() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("missing").join("prompt.md");
        assert!(write_output("content", Some(&path)).is_err());
    }
}
