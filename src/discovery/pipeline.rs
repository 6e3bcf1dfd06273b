//! Discovery pipeline: policy → walk → sample
//!
//! Stateless; each call owns its file list from creation until it is
//! returned.

use std::path::Path;

use crate::core::error::PipelineError;
use crate::core::model::{FileRecord, PipelineConfig};
use crate::discovery::policy::ExclusionPolicy;
use crate::discovery::sampler::sample;
use crate::discovery::walker::walk;

/// Select the files under `root` that make up the prompt
pub fn run(root: &Path, config: &PipelineConfig) -> Result<Vec<FileRecord>, PipelineError> {
    let policy = ExclusionPolicy::build(root, &config.exclude)?;
    let files = walk(root, &policy)?;
    let walked = files.len();

    let files = if config.disable_sampling {
        files
    } else {
        sample(files, config.max_files_per_directory)
    };

    tracing::info!(
        root = %root.display(),
        rules = policy.rules().len(),
        walked,
        selected = files.len(),
        cap = ?config.sample_cap(),
        "selected files"
    );
    Ok(files)
}
