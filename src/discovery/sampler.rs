//! Deterministic per-directory sampling
//!
//! Files are grouped by parent directory. A group larger than the cap is
//! sorted by path and truncated to the lexicographically first N; smaller
//! groups pass through in their original order. Groups are emitted in order
//! of first appearance. There is no randomness: the same input always yields
//! the same output.

use std::collections::HashMap;

use crate::core::model::{normalize_cap, FileRecord};

/// Files sharing a parent directory
#[derive(Debug)]
struct DirectoryGroup {
    dir: String,
    files: Vec<FileRecord>,
}

fn group_by_directory(files: Vec<FileRecord>) -> Vec<DirectoryGroup> {
    let mut groups: Vec<DirectoryGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for file in files {
        let dir = file.parent_dir().to_string();
        match index.get(&dir) {
            Some(&i) => groups[i].files.push(file),
            None => {
                index.insert(dir.clone(), groups.len());
                groups.push(DirectoryGroup {
                    dir,
                    files: vec![file],
                });
            }
        }
    }

    groups
}

/// Cap the number of files per directory; `max_per_directory <= 0` keeps all
pub fn sample(files: Vec<FileRecord>, max_per_directory: i64) -> Vec<FileRecord> {
    let Some(cap) = normalize_cap(max_per_directory) else {
        return files;
    };

    let mut sampled = Vec::with_capacity(files.len());
    for mut group in group_by_directory(files) {
        if group.files.len() > cap {
            tracing::debug!(
                dir = %group.dir,
                kept = cap,
                dropped = group.files.len() - cap,
                "sampling directory"
            );
            group.files.sort_by(|a, b| a.path.cmp(&b.path));
            group.files.truncate(cap);
        }
        sampled.extend(group.files);
    }

    sampled
}
