pub use specimen_macros::resource_tags;

// Re-export aide for convenience
pub use aide;

mod config;
mod docblock;
mod error;
mod openapi;
mod registry;
mod render;
mod report;
mod resolver;
mod resource;
mod route;
mod sample;
mod store;
mod tags;
mod utils;

pub use config::{ConfigError, ResolverConfig};
pub use docblock::{parse_docblock, AnnotationSource, DocblockSource, StaticTags};
pub use error::{
    ConfigurationError, ConstructError, ExampleError, FactoryError, InstantiationError,
    RenderingError, ResourceError, Stage, StageError, StageFailure, StoreError,
};
pub use openapi::{apply_examples, ExampleResponse};
pub use registry::{
    FactoryDefinition, FactoryProvider, ModelDefinition, ModelRegistry, PlainConstructor,
};
pub use render::{JsonRenderer, RenderedResponse, ResponseRenderer};
pub use report::{DiagnosticSink, MemorySink, Reporter, TracingSink, VERBOSE_HINT};
pub use resolver::SampleResolver;
pub use resource::{
    CollectionRenderable, JsonResource, ResourceCollection, ResourceInput, ResourceRegistry,
    ResourceType, Shape, WrappedResource,
};
pub use route::RouteInfo;
pub use sample::SampleInstance;
pub use store::{DataStore, InMemoryStore, Transaction, TransactionScope};
pub use tags::{
    normalize_type_id, parse_kind_content, parse_states, ResolutionRequest, ResourceKind, Tag,
};
pub use utils::suggest_annotation;

/// Annotation names recognized by the resolver
pub mod annotations {
    pub use crate::tags::{RESOURCE, RESOURCE_COLLECTION, RESOURCE_MODEL, RESOURCE_STATE};
}

pub mod http {
    pub use axum::http::Method;
}
