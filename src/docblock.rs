//! Annotation sources: where a route's tags come from.
//!
//! Tags are read from docblock text with [`parse_docblock`], looked up from a
//! pre-built table, or produced by the `#[resource_tags]` macro and handed
//! over as a closure.

use std::collections::HashMap;

use crate::route::RouteInfo;
use crate::tags::Tag;

/// Supplies the ordered tags attached to one documented operation
pub trait AnnotationSource: Send + Sync {
    fn tags(&self, route: &RouteInfo) -> Vec<Tag>;
}

impl<F> AnnotationSource for F
where
    F: Fn(&RouteInfo) -> Vec<Tag> + Send + Sync,
{
    fn tags(&self, route: &RouteInfo) -> Vec<Tag> {
        self(route)
    }
}

/// Parse annotations out of a docblock.
///
/// Accepts `///`, `//!`, `/** ... */` and ` * ` prefixed lines as well as bare
/// text. A line starting with `@name` opens a tag; following non-blank lines
/// that are not annotations continue its content. `@specimen-ignore` ends
/// parsing.
pub fn parse_docblock(text: &str) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    let mut continuing = false;

    for raw in text.lines() {
        let line = strip_comment_markers(raw);

        if line == "@specimen-ignore" {
            break;
        }

        if let Some(rest) = line.strip_prefix('@') {
            let (name, content) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            continuing = !name.is_empty();
            if continuing {
                tags.push(Tag::new(name, content.trim()));
            }
        } else if line.is_empty() {
            continuing = false;
        } else if continuing {
            if let Some(tag) = tags.last_mut() {
                if !tag.content.is_empty() {
                    tag.content.push(' ');
                }
                tag.content.push_str(line);
            }
        }
    }

    tags
}

fn strip_comment_markers(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_suffix("*/").unwrap_or(line);
    let line = ["///", "//!", "/**", "/*", "*"]
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix))
        .unwrap_or(line);
    line.trim()
}

/// Docblock text registered per route, parsed on lookup
#[derive(Debug, Clone, Default)]
pub struct DocblockSource {
    docblocks: HashMap<RouteInfo, String>,
}

impl DocblockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, route: RouteInfo, docblock: impl Into<String>) -> Self {
        self.insert(route, docblock);
        self
    }

    pub fn insert(&mut self, route: RouteInfo, docblock: impl Into<String>) {
        self.docblocks.insert(route, docblock.into());
    }
}

impl AnnotationSource for DocblockSource {
    fn tags(&self, route: &RouteInfo) -> Vec<Tag> {
        self.docblocks
            .get(route)
            .map(|docblock| parse_docblock(docblock))
            .unwrap_or_default()
    }
}

/// Pre-parsed tags per route
#[derive(Debug, Clone, Default)]
pub struct StaticTags {
    tags: HashMap<RouteInfo, Vec<Tag>>,
}

impl StaticTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, route: RouteInfo, tags: Vec<Tag>) -> Self {
        self.tags.insert(route, tags);
        self
    }
}

impl AnnotationSource for StaticTags {
    fn tags(&self, route: &RouteInfo) -> Vec<Tag> {
        self.tags.get(route).cloned().unwrap_or_default()
    }
}
