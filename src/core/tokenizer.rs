//! Token counting for rendered prompts
//!
//! Uses tiktoken BPE encodings (cl100k_base by default). Each encoding is
//! loaded once per process on first use.
//!
//! Supported encodings:
//! - cl100k_base (GPT-4, GPT-3.5-turbo)
//! - o200k_base (GPT-4o)
//! - p50k_base, p50k_edit (Codex / text-davinci)
//! - r50k_base (GPT-3)

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use tiktoken_rs::{cl100k_base, o200k_base, p50k_base, p50k_edit, r50k_base, CoreBPE};

/// Supported tokenizer encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Cl100kBase,
    O200kBase,
    P50kBase,
    P50kEdit,
    R50kBase,
}

impl Encoding {
    /// List all accepted encoding names
    pub fn available() -> &'static [&'static str] {
        &[
            "cl100k_base",
            "o200k_base",
            "p50k_base",
            "p50k_edit",
            "r50k_base",
        ]
    }

    fn bpe(&self) -> &'static Result<CoreBPE, String> {
        match self {
            Encoding::Cl100kBase => &CL100K_BPE,
            Encoding::O200kBase => &O200K_BPE,
            Encoding::P50kBase => &P50K_BPE,
            Encoding::P50kEdit => &P50K_EDIT_BPE,
            Encoding::R50kBase => &R50K_BPE,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Cl100kBase => "cl100k_base",
            Encoding::O200kBase => "o200k_base",
            Encoding::P50kBase => "p50k_base",
            Encoding::P50kEdit => "p50k_edit",
            Encoding::R50kBase => "r50k_base",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k_base" | "cl100k" => Ok(Encoding::Cl100kBase),
            "o200k_base" | "o200k" => Ok(Encoding::O200kBase),
            "p50k_base" | "p50k" => Ok(Encoding::P50kBase),
            "p50k_edit" => Ok(Encoding::P50kEdit),
            "r50k_base" | "r50k" | "gpt2" => Ok(Encoding::R50kBase),
            _ => Err(format!(
                "Unknown encoding: {}. Available: {}",
                s,
                Encoding::available().join(", ")
            )),
        }
    }
}

// Lazy-initialized BPE encodings (loaded once on first use)
static CL100K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| cl100k_base().map_err(|e| format!("Failed to load cl100k_base: {}", e)));

static O200K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| o200k_base().map_err(|e| format!("Failed to load o200k_base: {}", e)));

static P50K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| p50k_base().map_err(|e| format!("Failed to load p50k_base: {}", e)));

static P50K_EDIT_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| p50k_edit().map_err(|e| format!("Failed to load p50k_edit: {}", e)));

static R50K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| r50k_base().map_err(|e| format!("Failed to load r50k_base: {}", e)));

/// Count tokens in text using the given encoding
pub fn count_tokens(text: &str, encoding: Encoding) -> Result<usize> {
    if text.is_empty() {
        return Ok(0);
    }

    let bpe = encoding.bpe().as_ref().map_err(|e| anyhow!("{}", e))?;
    let count = bpe.encode_with_special_tokens(text).len();
    tracing::debug!(%encoding, tokens = count, "counted prompt tokens");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens_empty() {
        assert_eq!(count_tokens("", Encoding::default()).unwrap(), 0);
    }

    #[test]
    fn test_count_tokens_ascii() {
        let tokens = count_tokens("Hello, world!", Encoding::Cl100kBase).unwrap();
        assert!(tokens > 0 && tokens < 10);
    }

    #[test]
    fn test_count_tokens_code() {
        let text = r#"fn main() { println!("Hello"); }"#;
        assert!(count_tokens(text, Encoding::Cl100kBase).unwrap() > 0);
    }

    #[test]
    fn test_every_encoding_counts() {
        let text = "# Project Structure\n\nroot\n  main.go\n";
        for name in Encoding::available() {
            let encoding: Encoding = name.parse().unwrap();
            assert!(count_tokens(text, encoding).unwrap() > 0, "{}", name);
        }
    }

    #[test]
    fn test_count_is_deterministic() {
        let text = "package main\n\nfunc main() {}\n";
        let first = count_tokens(text, Encoding::O200kBase).unwrap();
        let second = count_tokens(text, Encoding::O200kBase).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!(
            "cl100k_base".parse::<Encoding>().unwrap(),
            Encoding::Cl100kBase
        );
        assert_eq!("O200K_BASE".parse::<Encoding>().unwrap(), Encoding::O200kBase);
        assert_eq!("gpt2".parse::<Encoding>().unwrap(), Encoding::R50kBase);
        let err = "unknown".parse::<Encoding>().unwrap_err();
        assert!(err.contains("Available: cl100k_base"));
    }

    #[test]
    fn test_encoding_display_round_trips() {
        for name in Encoding::available() {
            assert_eq!(name.parse::<Encoding>().unwrap().to_string(), *name);
        }
    }
}
