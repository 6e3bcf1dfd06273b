//! Prompt template rendering
//!
//! A small handlebars-shaped subset, enough for prompt layouts:
//!
//! ```text
//! {{sourceTree}}                      variable ({{{sourceTree}}} also accepted)
//! {{#each files}} ... {{/each}}       iterate selected files
//! {{this.Path}} {{this.Content}}      fields of the current file ({{@index}} too)
//! {{getFileExtension this.Path}}      helper call
//! {{! comment }}                      dropped
//! ```
//!
//! Output is never HTML-escaped. Block tags and comments alone on their line
//! are standalone: the whole line, newline included, is removed. Unknown
//! variables render empty; unknown helpers are an error.
//!
//! Helpers live in a [`TemplateHelpers`] value handed to [`PromptRenderer`],
//! so separate renders never share state.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::TemplateError;
use crate::core::model::FileRecord;
use crate::core::paths::file_extension;

/// Static regex for `{{ expr }}` and `{{{ expr }}}` tags
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\{?\s*([^{}]*?)\s*\}?\}\}").expect("Invalid TAG_RE regex")
});

/// Template used when no `--template` is given
pub const DEFAULT_TEMPLATE: &str = "# Project Structure

{{sourceTree}}
# Files
{{#each files}}

## {{this.Path}}

```{{getFileExtension this.Path}}
{{this.Content}}
```
{{/each}}
";

/// The only iterable collection
const FILES_COLLECTION: &str = "files";

/// A helper receives its resolved arguments
pub type Helper = fn(&[&str]) -> String;

fn get_file_extension(args: &[&str]) -> String {
    args.first()
        .map(|path| file_extension(path).to_string())
        .unwrap_or_default()
}

/// Named helpers available to a renderer
#[derive(Clone)]
pub struct TemplateHelpers {
    helpers: BTreeMap<String, Helper>,
}

impl Default for TemplateHelpers {
    fn default() -> Self {
        let mut helpers = Self::empty();
        helpers.register("getFileExtension", get_file_extension);
        helpers
    }
}

impl fmt::Debug for TemplateHelpers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.helpers.keys()).finish()
    }
}

impl TemplateHelpers {
    /// A registry with no helpers at all
    pub fn empty() -> Self {
        Self {
            helpers: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, helper: Helper) {
        self.helpers.insert(name.into(), helper);
    }

    fn get(&self, name: &str) -> Option<Helper> {
        self.helpers.get(name).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Var(String),
    Helper { name: String, args: Vec<String> },
    Each { collection: String, body: Vec<Node> },
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        // open `each` blocks: (collection, nodes of the enclosing level)
        let mut stack: Vec<(String, Vec<Node>)> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut cursor = 0;

        for caps in TAG_RE.captures_iter(source) {
            let (Some(tag), Some(expr)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let expr = expr.as_str().trim();

            let standalone = if is_block_tag(expr) {
                standalone_span(source, tag.start(), tag.end())
            } else {
                None
            };
            let (text_end, next) = standalone.unwrap_or((tag.start(), tag.end()));
            push_text(&mut nodes, &source[cursor..text_end.max(cursor)]);
            cursor = next;

            if let Some(open) = expr.strip_prefix('#') {
                let mut parts = open.split_whitespace();
                let block = parts.next().unwrap_or_default();
                if block != "each" {
                    return Err(TemplateError::UnsupportedBlock(block.to_string()));
                }
                let collection = parts.next().unwrap_or_default().to_string();
                stack.push((collection, std::mem::take(&mut nodes)));
            } else if let Some(close) = expr.strip_prefix('/') {
                let close = close.trim();
                let Some((collection, parent)) = stack.pop() else {
                    return Err(TemplateError::UnexpectedClose(close.to_string()));
                };
                if close != "each" {
                    return Err(TemplateError::MismatchedClose {
                        open: "each".to_string(),
                        found: close.to_string(),
                    });
                }
                let body = std::mem::replace(&mut nodes, parent);
                nodes.push(Node::Each { collection, body });
            } else if expr.starts_with('!') {
                // comment
            } else {
                let mut parts = expr.split_whitespace().map(str::to_string);
                match (parts.next(), parts.collect::<Vec<_>>()) {
                    (Some(name), args) if args.is_empty() => nodes.push(Node::Var(name)),
                    (Some(name), args) => nodes.push(Node::Helper { name, args }),
                    (None, _) => {}
                }
            }
        }

        push_text(&mut nodes, &source[cursor..]);
        if !stack.is_empty() {
            return Err(TemplateError::UnclosedBlock("each".to_string()));
        }
        Ok(Self { nodes })
    }
}

fn is_block_tag(expr: &str) -> bool {
    expr.starts_with('#') || expr.starts_with('/') || expr.starts_with('!')
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

/// Byte span of the line holding a tag, if the tag is alone on that line
fn standalone_span(source: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let is_blank = |s: &str| s.chars().all(|c| c == ' ' || c == '\t');

    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    if !is_blank(&source[line_start..start]) {
        return None;
    }

    let line_end = source[end..].find('\n').map_or(source.len(), |i| end + i + 1);
    let trailing = source[end..line_end].trim_end_matches(|c| c == '\n' || c == '\r');
    if !is_blank(trailing) {
        return None;
    }
    Some((line_start, line_end))
}

/// Variables visible while rendering
#[derive(Debug, Clone, Copy)]
struct Scope<'a> {
    source_tree: &'a str,
    files: &'a [FileRecord],
    current: Option<(usize, &'a FileRecord)>,
}

impl<'a> Scope<'a> {
    fn lookup(&self, name: &str) -> Option<Cow<'a, str>> {
        let name = name.trim_start_matches("../");
        if name == "sourceTree" {
            return Some(Cow::Borrowed(self.source_tree));
        }

        let (index, file) = self.current?;
        match name.strip_prefix("this.").unwrap_or(name) {
            "Path" | "path" => Some(Cow::Borrowed(file.path.as_str())),
            "Content" | "content" => Some(Cow::Borrowed(file.content.as_str())),
            "@index" => Some(Cow::Owned(index.to_string())),
            _ => None,
        }
    }

    /// Helper arguments: quoted literals or variables
    fn resolve_arg<'b>(&self, arg: &'b str) -> Cow<'b, str>
    where
        'a: 'b,
    {
        let quoted = arg
            .strip_prefix('"')
            .and_then(|a| a.strip_suffix('"'))
            .or_else(|| arg.strip_prefix('\'').and_then(|a| a.strip_suffix('\'')));
        match quoted {
            Some(literal) => Cow::Borrowed(literal),
            None => self.lookup(arg).unwrap_or_default(),
        }
    }
}

/// Renders templates with an explicit helper registry
#[derive(Debug, Clone)]
pub struct PromptRenderer {
    helpers: TemplateHelpers,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new(TemplateHelpers::default())
    }
}

impl PromptRenderer {
    pub fn new(helpers: TemplateHelpers) -> Self {
        Self { helpers }
    }

    /// Parse `source` and render it against the tree outline and files
    pub fn render_source(
        &self,
        source: &str,
        source_tree: &str,
        files: &[FileRecord],
    ) -> Result<String, TemplateError> {
        let template = Template::parse(source)?;
        self.render(&template, source_tree, files)
    }

    pub fn render(
        &self,
        template: &Template,
        source_tree: &str,
        files: &[FileRecord],
    ) -> Result<String, TemplateError> {
        let scope = Scope {
            source_tree,
            files,
            current: None,
        };
        let mut out = String::new();
        self.render_nodes(&template.nodes, scope, &mut out)?;
        Ok(out)
    }

    fn render_nodes(
        &self,
        nodes: &[Node],
        scope: Scope<'_>,
        out: &mut String,
    ) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Var(name) => match scope.lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => tracing::trace!(variable = %name, "unknown template variable"),
                },
                Node::Helper { name, args } => {
                    let helper = self
                        .helpers
                        .get(name)
                        .ok_or_else(|| TemplateError::UnknownHelper(name.clone()))?;
                    let values: Vec<Cow<'_, str>> =
                        args.iter().map(|arg| scope.resolve_arg(arg)).collect();
                    let values: Vec<&str> = values.iter().map(|v| v.as_ref()).collect();
                    out.push_str(&helper(&values));
                }
                Node::Each { collection, body } => {
                    if collection != FILES_COLLECTION {
                        return Err(TemplateError::UnknownCollection(collection.clone()));
                    }
                    for (index, file) in scope.files.iter().enumerate() {
                        let inner = Scope {
                            current: Some((index, file)),
                            ..scope
                        };
                        self.render_nodes(body, inner, out)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str, tree: &str, files: &[FileRecord]) -> Result<String, TemplateError> {
        PromptRenderer::default().render_source(source, tree, files)
    }

    #[test]
    fn test_default_template() {
        let files = vec![
            FileRecord::new("main.go", "package main\n"),
            FileRecord::new("Makefile", "all:\n"),
        ];
        let output = render(DEFAULT_TEMPLATE, "app\n  main.go\n  Makefile\n", &files).unwrap();
        assert_eq!(
            output,
            "# Project Structure\n\napp\n  main.go\n  Makefile\n\n# Files\n\
             \n## main.go\n\n```go\npackage main\n\n```\n\
             \n## Makefile\n\n```\nall:\n\n```\n"
        );
    }

    #[test]
    fn test_default_template_no_files() {
        let output = render(DEFAULT_TEMPLATE, "app\n", &[]).unwrap();
        assert_eq!(output, "# Project Structure\n\napp\n\n# Files\n");
    }

    #[test]
    fn test_no_html_escaping() {
        let files = vec![FileRecord::new("a.html", "<p>&amp;</p>")];
        let output = render("{{#each files}}{{this.Content}}{{/each}}", "", &files).unwrap();
        assert_eq!(output, "<p>&amp;</p>");
    }

    #[test]
    fn test_triple_stash_and_short_names() {
        let files = vec![FileRecord::new("x.rs", "fn x() {}")];
        let output = render(
            "{{{sourceTree}}}|{{#each files}}{{@index}}:{{Path}}={{{content}}}{{/each}}",
            "tree",
            &files,
        )
        .unwrap();
        assert_eq!(output, "tree|0:x.rs=fn x() {}");
    }

    #[test]
    fn test_root_variables_visible_inside_each() {
        let files = vec![FileRecord::new("a", ""), FileRecord::new("b", "")];
        let output = render("{{#each files}}[{{../sourceTree}}]{{/each}}", "T", &files).unwrap();
        assert_eq!(output, "[T][T]");
    }

    #[test]
    fn test_unknown_variable_renders_empty() {
        let output = render("a{{nothing}}b", "", &[]).unwrap();
        assert_eq!(output, "ab");
    }

    #[test]
    fn test_comment_is_dropped() {
        let output = render("{{! header }}\nbody\n", "", &[]).unwrap();
        assert_eq!(output, "body\n");
    }

    #[test]
    fn test_indented_standalone_block() {
        let files = vec![FileRecord::new("a.go", "")];
        let source = "list:\n  {{#each files}}\n- {{this.Path}}\n  {{/each}}\nend\n";
        let output = render(source, "", &files).unwrap();
        assert_eq!(output, "list:\n- a.go\nend\n");
    }

    #[test]
    fn test_inline_block_is_not_standalone() {
        let files = vec![FileRecord::new("a.go", ""), FileRecord::new("b.go", "")];
        let output = render("files: {{#each files}}{{this.Path}} {{/each}}\n", "", &files).unwrap();
        assert_eq!(output, "files: a.go b.go \n");
    }

    #[test]
    fn test_helper_with_literal_argument() {
        let output = render("{{getFileExtension \"notes.txt\"}}", "", &[]).unwrap();
        assert_eq!(output, "txt");
    }

    #[test]
    fn test_custom_helpers_are_per_renderer() {
        fn shout(args: &[&str]) -> String {
            args.first().map(|a| a.to_uppercase()).unwrap_or_default()
        }

        let mut helpers = TemplateHelpers::default();
        helpers.register("shout", shout);
        let custom = PromptRenderer::new(helpers);
        let files = vec![FileRecord::new("a.go", "")];
        let source = "{{#each files}}{{shout this.Path}}{{/each}}";

        assert_eq!(custom.render_source(source, "", &files).unwrap(), "A.GO");
        // a fresh renderer does not see the other renderer's helper
        assert_eq!(
            render(source, "", &files).unwrap_err(),
            TemplateError::UnknownHelper("shout".to_string())
        );
    }

    #[test]
    fn test_empty_registry_has_no_extension_helper() {
        let renderer = PromptRenderer::new(TemplateHelpers::empty());
        let err = renderer
            .render_source("{{getFileExtension \"a.rs\"}}", "", &[])
            .unwrap_err();
        assert_eq!(err, TemplateError::UnknownHelper("getFileExtension".to_string()));
    }

    #[test]
    fn test_unclosed_block() {
        let err = Template::parse("{{#each files}}x").unwrap_err();
        assert_eq!(err, TemplateError::UnclosedBlock("each".to_string()));
    }

    #[test]
    fn test_unexpected_close() {
        let err = Template::parse("x{{/each}}").unwrap_err();
        assert_eq!(err, TemplateError::UnexpectedClose("each".to_string()));
    }

    #[test]
    fn test_mismatched_close() {
        let err = Template::parse("{{#each files}}x{{/if}}").unwrap_err();
        assert!(matches!(err, TemplateError::MismatchedClose { .. }));
    }

    #[test]
    fn test_unsupported_block() {
        let err = Template::parse("{{#if files}}x{{/if}}").unwrap_err();
        assert_eq!(err, TemplateError::UnsupportedBlock("if".to_string()));
    }

    #[test]
    fn test_unknown_collection() {
        let err = render("{{#each dirs}}x{{/each}}", "", &[]).unwrap_err();
        assert_eq!(err, TemplateError::UnknownCollection("dirs".to_string()));
    }

    #[test]
    fn test_parse_once_render_many() {
        let template = Template::parse("{{#each files}}{{this.Path}};{{/each}}").unwrap();
        let renderer = PromptRenderer::default();
        let one = vec![FileRecord::new("a", "")];
        let two = vec![FileRecord::new("b", ""), FileRecord::new("c", "")];
        assert_eq!(renderer.render(&template, "", &one).unwrap(), "a;");
        assert_eq!(renderer.render(&template, "", &two).unwrap(), "b;c;");
    }
}
