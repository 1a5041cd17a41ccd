use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Declares a single resource response: `@resource [status] <ResourceType>`
pub const RESOURCE: &str = "resource";
/// Declares a collection response: `@resourcecollection [status] <ResourceType>`
pub const RESOURCE_COLLECTION: &str = "resourcecollection";
/// Names the model the resource wraps: `@resourcemodel <ModelType>`
pub const RESOURCE_MODEL: &str = "resourcemodel";
/// Factory states applied to the model: `@resourcestate a, b`
pub const RESOURCE_STATE: &str = "resourcestate";

// Optional 3-digit ASCII status, optional whitespace, then the resource type.
static KIND_CONTENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([0-9]{3})?\s*(.*)$").unwrap());

/// A docblock annotation: its name without the leading `@` and its raw content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub content: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Case-insensitive name comparison
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether this tag declares a resource response
    pub fn is_resource_kind(&self) -> bool {
        self.is(RESOURCE) || self.is(RESOURCE_COLLECTION)
    }
}

/// Whether the example wraps one sample or a collection of samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Single,
    Collection,
}

/// Everything the resolver needs, read from a route's tags.
///
/// Only the first occurrence of each annotation counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub kind: ResourceKind,
    /// Declared status code; `None` defers to the renderer
    pub status: Option<u16>,
    pub resource_type: String,
    pub model_type: String,
    pub states: Vec<String>,
}

impl ResolutionRequest {
    /// Build a request from tags in source order.
    ///
    /// Returns `Ok(None)` when no `@resource` or `@resourcecollection` tag is
    /// present, and a [`ConfigurationError`] when the model annotation is
    /// missing or empty.
    pub fn from_tags(tags: &[Tag]) -> Result<Option<Self>, ConfigurationError> {
        let Some(kind_tag) = tags.iter().find(|tag| tag.is_resource_kind()) else {
            return Ok(None);
        };

        let kind = if kind_tag.is(RESOURCE_COLLECTION) {
            ResourceKind::Collection
        } else {
            ResourceKind::Single
        };
        let (status, resource_type) = parse_kind_content(&kind_tag.content);

        let model_type = tags
            .iter()
            .find(|tag| tag.is(RESOURCE_MODEL))
            .map(|tag| tag.content.trim())
            .unwrap_or_default();
        if model_type.is_empty() {
            return Err(ConfigurationError::MissingModelAnnotation {
                resource: resource_type,
            });
        }

        let states = tags
            .iter()
            .find(|tag| tag.is(RESOURCE_STATE))
            .map(|tag| parse_states(&tag.content))
            .unwrap_or_default();

        Ok(Some(Self {
            kind,
            status,
            resource_type,
            model_type: model_type.to_string(),
            states,
        }))
    }

    pub fn is_collection(&self) -> bool {
        self.kind == ResourceKind::Collection
    }
}

/// Split `@resource` content into its optional status and the resource type.
///
/// A `000` prefix is treated as no status.
pub fn parse_kind_content(content: &str) -> (Option<u16>, String) {
    let content = content.trim();
    let Some(caps) = KIND_CONTENT_RE.captures(content) else {
        return (None, content.to_string());
    };

    let status = caps
        .get(1)
        .and_then(|code| code.as_str().parse::<u16>().ok())
        .filter(|code| *code != 0);
    let resource = caps.get(2).map_or("", |rest| rest.as_str()).trim();

    (status, resource.to_string())
}

/// Comma-separated state names: trimmed, empties and repeats dropped, order kept
pub fn parse_states(content: &str) -> Vec<String> {
    let mut states: Vec<String> = Vec::new();
    for state in content.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !states.iter().any(|seen| seen == state) {
            states.push(state.to_string());
        }
    }
    states
}

/// Strip surrounding whitespace and any leading namespace separators
pub fn normalize_type_id(type_id: &str) -> &str {
    type_id.trim().trim_start_matches('\\')
}
