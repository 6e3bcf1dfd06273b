//! Source tree outline built from selected file paths

use std::fmt;

use crate::core::model::FileRecord;

/// A node in the outline; each node owns its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    pub name: String,
    pub children: Vec<SourceTree>,
}

impl SourceTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Build the tree from slash-separated relative paths
    pub fn from_files(label: impl Into<String>, files: &[FileRecord]) -> Self {
        let mut root = Self::new(label);
        for file in files {
            root.insert(&file.path);
        }
        root
    }

    fn insert(&mut self, path: &str) {
        let mut current = self;
        for part in path.split('/').filter(|part| !part.is_empty()) {
            current = current.child_mut(part);
        }
    }

    /// Find or create the child named `name`
    fn child_mut(&mut self, name: &str) -> &mut SourceTree {
        let idx = match self.children.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.children.push(SourceTree::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{}{}", "  ".repeat(depth), self.name)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

/// One node per line, two spaces of indentation per level
impl fmt::Display for SourceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
