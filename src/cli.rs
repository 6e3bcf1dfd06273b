//! CLI module - Command-line interface definition and the prompt flow

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use crate::core::model::{PipelineConfig, DEFAULT_MAX_FILES_PER_DIRECTORY};
use crate::core::paths::root_label;
use crate::core::render::{write_output, OutputFormat, Renderer};
use crate::core::tokenizer::{count_tokens, Encoding};
use crate::discovery::pipeline;
use crate::prompt::template::{PromptRenderer, DEFAULT_TEMPLATE};
use crate::prompt::tree::SourceTree;

/// code2prompt - turn a source tree into a single LLM prompt.
#[derive(Parser, Debug)]
#[command(name = "code2prompt")]
#[command(
    author,
    version,
    about,
    long_about = r#"code2prompt walks a directory, drops excluded files, samples large
directories down to a fixed number of files each, and renders what is left
into one prompt: a tree outline followed by every file's content.

Exclusions come from three places, applied together:
- <PATH>/.gitignore (patterns match at any depth)
- a built-in list of binaries, lockfiles, VCS and build directories, tests
- --exclude patterns (glob syntax, matched against the relative path)

Examples:
    code2prompt .
    code2prompt src --tokens -o prompt.md
    code2prompt . -e '*.md' -e 'docs/**' --json
    code2prompt . --no-sample --template review.hbs
"#
)]
pub struct Cli {
    /// Directory to turn into a prompt.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Extra exclusion glob (repeatable, comma-delimited).
    #[arg(
        short,
        long,
        value_name = "GLOB",
        env = "CODE2PROMPT_EXCLUDE",
        value_delimiter = ',',
        long_help = "Glob pattern matched against each path relative to PATH, e.g. '*.md',\n\
'docs/**' or 'src/*.snap'. '*' may cross '/', so '*.md' matches Markdown files\n\
at every depth.\n\n\
May be given several times or as a comma-separated list."
    )]
    pub exclude: Vec<String>,

    /// Template file (handlebars syntax).
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "CODE2PROMPT_TEMPLATE",
        long_help = "Render the prompt with this template instead of the built-in one.\n\n\
Available variables: sourceTree, and inside {{#each files}}: this.Path,\n\
this.Content, @index. Helper: getFileExtension."
    )]
    pub template: Option<PathBuf>,

    /// Write the result to a file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Wrap the prompt in a JSON object.
    #[arg(
        long,
        long_help = "Print a JSON object with the fields prompt, file_count, fingerprint\n\
(xxh3 of the prompt) and, with --tokens, token_count."
    )]
    pub json: bool,

    /// Count the prompt's tokens.
    #[arg(long)]
    pub tokens: bool,

    /// Tokenizer encoding used by --tokens.
    #[arg(
        long,
        value_name = "NAME",
        env = "CODE2PROMPT_ENCODING",
        default_value = "cl100k_base",
        long_help = "Tokenizer encoding used by --tokens.\n\n\
Supported values: cl100k_base (default), o200k_base, p50k_base, p50k_edit, r50k_base"
    )]
    pub encoding: Encoding,

    /// Maximum files kept per directory (<= 0 keeps all).
    #[arg(
        short,
        long = "max-files-per-dir",
        value_name = "N",
        env = "CODE2PROMPT_MAX_FILES_PER_DIR",
        default_value_t = DEFAULT_MAX_FILES_PER_DIRECTORY,
        allow_negative_numbers = true,
        long_help = "Directories holding more than N files keep only the first N in byte\n\
order of their paths. Zero or a negative value disables the cap."
    )]
    pub max_files_per_dir: i64,

    /// Keep every file, ignoring --max-files-per-dir.
    #[arg(long, env = "CODE2PROMPT_NO_SAMPLE")]
    pub no_sample: bool,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        long_help = "Disable colored output. This is useful when piping to files or when your\n\
terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (only errors on stderr).
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        long_help = "Enable debug diagnostics on stderr: loaded rules, pruned directories,\n\
sampling decisions. RUST_LOG takes precedence when set."
    )]
    pub verbose: bool,
}

impl Cli {
    /// Default tracing filter for the selected verbosity
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            exclude: self.exclude.clone(),
            max_files_per_directory: self.max_files_per_dir,
            disable_sampling: self.no_sample,
        }
    }
}

/// Run the prompt flow for parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let files = pipeline::run(&cli.path, &cli.pipeline_config())
        .with_context(|| format!("Failed to collect files under {:?}", cli.path))?;

    let tree = SourceTree::from_files(root_label(&cli.path), &files);

    let template = match &cli.template {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read template: {:?}", path))?,
        None => DEFAULT_TEMPLATE.to_string(),
    };
    let prompt = PromptRenderer::default()
        .render_source(&template, &tree.to_string(), &files)
        .context("Failed to render template")?;

    let token_count = if cli.tokens {
        let count = count_tokens(&prompt, cli.encoding)?;
        if !cli.quiet {
            eprintln!(
                "{} {}",
                "Token count:".bold(),
                count.to_string().green()
            );
        }
        Some(count)
    } else {
        None
    };

    let output = Renderer::new(OutputFormat::from_json_flag(cli.json)).render(
        prompt,
        token_count,
        files.len(),
    )?;
    write_output(&output, cli.output.as_deref())
}
