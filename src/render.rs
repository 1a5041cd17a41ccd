use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RenderingError;
use crate::resource::{Shape, WrappedResource};

/// A serialized response with the renderer's own status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedResponse {
    pub status: u16,
    pub content: String,
}

/// Serializes wrapped resources to transport payloads
pub trait ResponseRenderer: Send + Sync {
    fn render(&self, resource: &WrappedResource) -> Result<RenderedResponse, RenderingError>;
}

/// Renders resources as JSON, wrapped under a `data` key by default.
///
/// The intrinsic status is 201 for an item whose sample was just created by
/// a factory, 200 otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRenderer {
    wrap: Option<String>,
    pretty: bool,
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self {
            wrap: Some("data".to_string()),
            pretty: false,
        }
    }
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the bare body without a wrapping key
    pub fn without_wrapping(mut self) -> Self {
        self.wrap = None;
        self
    }

    pub fn wrap_with(mut self, key: impl Into<String>) -> Self {
        self.wrap = Some(key.into());
        self
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

impl ResponseRenderer for JsonRenderer {
    fn render(&self, resource: &WrappedResource) -> Result<RenderedResponse, RenderingError> {
        let body = match &self.wrap {
            Some(key) => {
                let mut wrapped = Map::new();
                wrapped.insert(key.clone(), resource.body().clone());
                Value::Object(wrapped)
            }
            None => resource.body().clone(),
        };

        let content = if self.pretty {
            serde_json::to_string_pretty(&body)?
        } else {
            serde_json::to_string(&body)?
        };

        let status = if resource.shape() == Shape::Item && resource.was_recently_created() {
            201
        } else {
            200
        };

        Ok(RenderedResponse { status, content })
    }
}
