//! Resource types: transformers from sample instances to response bodies.
//!
//! A resource either wraps a single model ([`JsonResource`]) or is
//! collection-oriented ([`ResourceCollection`]). Collection-oriented
//! resources expose the [`CollectionRenderable`] capability, which the
//! resolver dispatches on instead of probing constructors.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ResourceError;
use crate::sample::SampleInstance;
use crate::tags::normalize_type_id;

/// What a resource is constructed from
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceInput {
    Instance(SampleInstance),
    List(Vec<SampleInstance>),
}

/// Whether a wrapped resource renders one item or a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Item,
    Collection,
}

/// A resource constructed around its samples, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedResource {
    resource: String,
    body: Value,
    shape: Shape,
    recently_created: bool,
}

impl WrappedResource {
    pub fn item(resource: impl Into<String>, body: Value, recently_created: bool) -> Self {
        Self {
            resource: resource.into(),
            body,
            shape: Shape::Item,
            recently_created,
        }
    }

    pub fn collection(resource: impl Into<String>, items: Vec<Value>) -> Self {
        Self {
            resource: resource.into(),
            body: Value::Array(items),
            shape: Shape::Collection,
            recently_created: false,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Whether the wrapped item was inserted by the factory just now
    pub fn was_recently_created(&self) -> bool {
        self.recently_created
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

/// A declared resource type
pub trait ResourceType: Send + Sync {
    fn name(&self) -> &str;

    /// Construct the resource directly from its input
    fn make(&self, input: ResourceInput) -> Result<WrappedResource, ResourceError>;

    /// Dedicated collection entry point: every item wrapped by this resource
    fn collection(&self, items: Vec<SampleInstance>) -> Result<WrappedResource, ResourceError> {
        let bodies = items
            .into_iter()
            .map(|item| {
                self.make(ResourceInput::Instance(item))
                    .map(WrappedResource::into_body)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WrappedResource::collection(self.name(), bodies))
    }

    /// Present when the resource is collection-oriented
    fn as_collection(&self) -> Option<&dyn CollectionRenderable> {
        None
    }
}

/// Capability of resources that are built from a list of samples
pub trait CollectionRenderable {
    fn from_list(&self, items: Vec<SampleInstance>) -> Result<WrappedResource, ResourceError>;
}

type Transform = Arc<dyn Fn(&SampleInstance) -> Result<Value, String> + Send + Sync>;

/// Resource wrapping a single model through a transform closure
#[derive(Clone)]
pub struct JsonResource {
    name: String,
    transform: Transform,
    lists_only: bool,
}

impl JsonResource {
    pub fn new<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&SampleInstance) -> Value + Send + Sync + 'static,
    {
        Self::fallible(name, move |instance| Ok(transform(instance)))
    }

    pub fn fallible<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&SampleInstance) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: normalize_type_id(&name.into()).to_string(),
            transform: Arc::new(transform),
            lists_only: false,
        }
    }

    /// Resource that exposes every model attribute unchanged
    pub fn attributes(name: impl Into<String>) -> Self {
        Self::new(name, SampleInstance::to_value)
    }

    /// Require a list argument; a lone instance is rejected with
    /// [`ResourceError::ExpectsCollection`]
    pub fn for_lists(mut self) -> Self {
        self.lists_only = true;
        self
    }

    fn transform(&self, instance: &SampleInstance) -> Result<Value, ResourceError> {
        (self.transform)(instance).map_err(|reason| ResourceError::Transform {
            resource: self.name.clone(),
            reason,
        })
    }

    fn transform_all(&self, items: &[SampleInstance]) -> Result<Vec<Value>, ResourceError> {
        items.iter().map(|item| self.transform(item)).collect()
    }
}

impl ResourceType for JsonResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn make(&self, input: ResourceInput) -> Result<WrappedResource, ResourceError> {
        match input {
            ResourceInput::Instance(_) if self.lists_only => Err(ResourceError::ExpectsCollection {
                resource: self.name.clone(),
            }),
            ResourceInput::Instance(instance) => Ok(WrappedResource::item(
                self.name.clone(),
                self.transform(&instance)?,
                instance.was_recently_created(),
            )),
            ResourceInput::List(items) if self.lists_only => Ok(WrappedResource::item(
                self.name.clone(),
                Value::Array(self.transform_all(&items)?),
                false,
            )),
            ResourceInput::List(_) => Err(ResourceError::ExpectsInstance {
                resource: self.name.clone(),
            }),
        }
    }
}

/// Collection-oriented resource: renders a list through an item resource
#[derive(Clone)]
pub struct ResourceCollection {
    name: String,
    collects: JsonResource,
}

impl ResourceCollection {
    pub fn new(name: impl Into<String>, collects: JsonResource) -> Self {
        Self {
            name: normalize_type_id(&name.into()).to_string(),
            collects,
        }
    }
}

impl ResourceType for ResourceCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn make(&self, input: ResourceInput) -> Result<WrappedResource, ResourceError> {
        let items = match input {
            ResourceInput::Instance(instance) => vec![instance],
            ResourceInput::List(items) => items,
        };
        Ok(WrappedResource::collection(
            self.name.clone(),
            self.collects.transform_all(&items)?,
        ))
    }

    fn collection(&self, items: Vec<SampleInstance>) -> Result<WrappedResource, ResourceError> {
        self.make(ResourceInput::List(items))
    }

    fn as_collection(&self) -> Option<&dyn CollectionRenderable> {
        Some(self)
    }
}

impl CollectionRenderable for ResourceCollection {
    fn from_list(&self, items: Vec<SampleInstance>) -> Result<WrappedResource, ResourceError> {
        self.make(ResourceInput::List(items))
    }
}

/// Resource types keyed by normalized identifier
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    resources: HashMap<String, Arc<dyn ResourceType>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, resource: impl ResourceType + 'static) -> Self {
        self.resources
            .insert(resource.name().to_string(), Arc::new(resource));
        self
    }

    pub fn get(&self, type_id: &str) -> Result<Arc<dyn ResourceType>, ResourceError> {
        self.resources
            .get(normalize_type_id(type_id))
            .cloned()
            .ok_or_else(|| ResourceError::UnknownResource(type_id.trim().to_string()))
    }
}
