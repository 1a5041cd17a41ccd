//! Turning resource annotations into example responses.
//!
//! For each route the resolver reads a [`ResolutionRequest`] from the tags,
//! produces sample instances through the fallback chain (factory, then the
//! first stored row, then a default-constructed instance), wraps them in the
//! declared resource and renders the result.
//!
//! Every failure is reported through the [`Reporter`] and turns into "no
//! example" for that route.

use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::docblock::AnnotationSource;
use crate::error::{
    ExampleError, InstantiationError, ResourceError, Stage, StageError, StageFailure, StoreError,
};
use crate::openapi::ExampleResponse;
use crate::registry::{FactoryProvider, ModelRegistry, PlainConstructor};
use crate::render::{JsonRenderer, ResponseRenderer};
use crate::report::Reporter;
use crate::resource::{ResourceInput, ResourceRegistry, ResourceType, WrappedResource};
use crate::route::RouteInfo;
use crate::sample::SampleInstance;
use crate::store::{DataStore, TransactionScope};
use crate::tags::{normalize_type_id, ResolutionRequest, ResourceKind, Tag};
use crate::utils::suggest_annotation;

const FALLBACK_CHAIN: [Stage; 3] = [Stage::Factory, Stage::Stored, Stage::Bare];

/// Produces example responses from `@resource` annotations.
///
/// # Example
/// ```ignore
/// use std::sync::Arc;
/// use specimen::{JsonResource, ModelDefinition, ModelRegistry, ResourceRegistry, SampleResolver};
///
/// let models = Arc::new(
///     ModelRegistry::new().register(ModelDefinition::new("User", || json!({"id": 1}))),
/// );
/// let resources = ResourceRegistry::new().register(JsonResource::attributes("UserResource"));
///
/// let resolver = SampleResolver::from_registry(models, resources)
///     .with_annotations(DocblockSource::new().with(route.clone(), docblock));
///
/// let examples = resolver.examples(&route);
/// ```
pub struct SampleResolver {
    config: ResolverConfig,
    reporter: Reporter,
    factories: Arc<dyn FactoryProvider>,
    constructor: Arc<dyn PlainConstructor>,
    store: Option<Arc<dyn DataStore>>,
    resources: ResourceRegistry,
    renderer: Arc<dyn ResponseRenderer>,
    annotations: Option<Arc<dyn AnnotationSource>>,
}

impl SampleResolver {
    /// Create a resolver from its collaborators, with default configuration
    /// and a [`JsonRenderer`]
    pub fn new(
        factories: Arc<dyn FactoryProvider>,
        constructor: Arc<dyn PlainConstructor>,
        resources: ResourceRegistry,
    ) -> Self {
        Self {
            config: ResolverConfig::default(),
            reporter: Reporter::default(),
            factories,
            constructor,
            store: None,
            resources,
            renderer: Arc::new(JsonRenderer::default()),
            annotations: None,
        }
    }

    /// Create a resolver whose factories and constructors come from one registry
    pub fn from_registry(models: Arc<ModelRegistry>, resources: ResourceRegistry) -> Self {
        Self::new(models.clone(), models, resources)
    }

    /// Apply configuration; the reporter's verbosity follows it
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.reporter = self.reporter.with_verbose(config.verbose_logging);
        self.config = config;
        self
    }

    /// Replace the reporter, keeping the configured verbosity
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter.with_verbose(self.config.verbose_logging);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn DataStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_renderer(mut self, renderer: impl ResponseRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn with_annotations(mut self, annotations: impl AnnotationSource + 'static) -> Self {
        self.annotations = Some(Arc::new(annotations));
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Example responses for a route, with tags from the annotation source
    pub fn examples(&self, route: &RouteInfo) -> Option<Vec<ExampleResponse>> {
        let tags = self
            .annotations
            .as_ref()
            .map(|source| source.tags(route))
            .unwrap_or_default();
        self.responses_for(route, &tags)
    }

    /// Example responses for a route with the given tags.
    ///
    /// `None` when the route has no resource annotation or when anything
    /// fails; failures are logged with the route's methods and path.
    pub fn responses_for(&self, route: &RouteInfo, tags: &[Tag]) -> Option<Vec<ExampleResponse>> {
        let request = match ResolutionRequest::from_tags(tags) {
            Ok(Some(request)) => request,
            Ok(None) => {
                self.note_near_misses(route, tags);
                return None;
            }
            Err(err) => {
                self.reporter.route_failure(route, &err.into());
                return None;
            }
        };

        match self.assemble(&request) {
            Ok(responses) => Some(responses),
            Err(err) => {
                self.reporter.route_failure(route, &err);
                None
            }
        }
    }

    /// Build the example for a parsed request.
    ///
    /// Always a single-element list on success.
    pub fn assemble(&self, request: &ResolutionRequest) -> Result<Vec<ExampleResponse>, ExampleError> {
        let first = self.resolve_instance(&request.model_type, &request.states)?;
        let resource = self.resources.get(&request.resource_type)?;

        let mut wrapped = self.wrap_single(resource.as_ref(), first.clone())?;
        if request.kind == ResourceKind::Collection {
            let second = self.resolve_instance(&request.model_type, &request.states)?;
            wrapped = self.wrap_collection(resource.as_ref(), vec![first, second])?;
        }

        let rendered = self.renderer.render(&wrapped)?;
        let status = request.status.unwrap_or(rendered.status);

        Ok(vec![ExampleResponse::new(status, rendered.content)])
    }

    /// Produce one sample instance, falling through the stages in order.
    ///
    /// Fails only when every stage failed, i.e. the model cannot be built,
    /// fetched or constructed at all.
    pub fn resolve_instance(
        &self,
        model: &str,
        states: &[String],
    ) -> Result<SampleInstance, InstantiationError> {
        let type_id = normalize_type_id(model);
        let mut bare: Option<Result<SampleInstance, StageError>> = None;
        let mut failures = Vec::new();

        for stage in FALLBACK_CHAIN {
            let attempt = match stage {
                Stage::Factory => self.from_factory(type_id, states),
                Stage::Stored => self.from_store(type_id, &mut bare),
                Stage::Bare => self.bare_instance(type_id, &mut bare),
            };

            match attempt {
                Ok(instance) => return Ok(instance),
                Err(error) => {
                    self.reporter
                        .detail(format!("'{type_id}' {stage} stage failed: {error}"));
                    failures.push(StageFailure { stage, error });
                }
            }
        }

        Err(InstantiationError {
            model: model.to_string(),
            failures,
        })
    }

    fn from_factory(&self, type_id: &str, states: &[String]) -> Result<SampleInstance, StageError> {
        if !self.config.use_transactions {
            return Ok(self.factories.make(type_id, states)?);
        }

        let store = self
            .store
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("no data store configured".to_string()))?;
        let mut scope = TransactionScope::begin(store)?;
        let created = self.factories.create(type_id, states, scope.transaction());
        if let Err(err) = scope.rollback() {
            self.reporter
                .warn(format!("rolling back '{type_id}' sample failed: {err}"));
        }

        Ok(created?)
    }

    fn from_store(
        &self,
        type_id: &str,
        bare: &mut Option<Result<SampleInstance, StageError>>,
    ) -> Result<SampleInstance, StageError> {
        let instance = self.bare_slot(type_id, bare).as_ref().map_err(Clone::clone)?;
        if !instance.is_persistent() {
            return Err(StageError::NotPersistent(type_id.to_string()));
        }

        let store = self
            .store
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("no data store configured".to_string()))?;
        store
            .fetch_first(instance.type_id())?
            .ok_or_else(|| StageError::NoRows(type_id.to_string()))
    }

    fn bare_instance(
        &self,
        type_id: &str,
        bare: &mut Option<Result<SampleInstance, StageError>>,
    ) -> Result<SampleInstance, StageError> {
        match bare.take() {
            Some(constructed) => constructed,
            None => Ok(self.constructor.construct(type_id)?),
        }
    }

    // Construct at most once per resolution; later stages share the result.
    fn bare_slot<'s>(
        &self,
        type_id: &str,
        bare: &'s mut Option<Result<SampleInstance, StageError>>,
    ) -> &'s Result<SampleInstance, StageError> {
        bare.get_or_insert_with(|| self.constructor.construct(type_id).map_err(StageError::from))
    }

    fn wrap_single(
        &self,
        resource: &dyn ResourceType,
        instance: SampleInstance,
    ) -> Result<WrappedResource, ResourceError> {
        if let Some(collection) = resource.as_collection() {
            return collection.from_list(vec![instance]);
        }

        match resource.make(ResourceInput::Instance(instance.clone())) {
            Err(ResourceError::ExpectsCollection { .. }) => {
                self.reporter.detail(format!(
                    "'{}' expects a collection, wrapping the sample in a list",
                    resource.name()
                ));
                resource.make(ResourceInput::List(vec![instance]))
            }
            wrapped => wrapped,
        }
    }

    fn wrap_collection(
        &self,
        resource: &dyn ResourceType,
        items: Vec<SampleInstance>,
    ) -> Result<WrappedResource, ResourceError> {
        match resource.as_collection() {
            Some(collection) => collection.from_list(items),
            None => resource.collection(items),
        }
    }

    fn note_near_misses(&self, route: &RouteInfo, tags: &[Tag]) {
        for tag in tags {
            if let Some(suggestion) = suggest_annotation(&tag.name) {
                self.reporter.detail(format!(
                    "{route}: ignoring '@{}', did you mean '@{suggestion}'?",
                    tag.name
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConstructError, FactoryError};
    use crate::registry::{FactoryDefinition, ModelDefinition};
    use crate::report::MemorySink;
    use crate::resource::{JsonResource, ResourceCollection};
    use crate::store::{InMemoryStore, Transaction};
    use axum::http::Method;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map};

    fn models() -> Arc<ModelRegistry> {
        Arc::new(
            ModelRegistry::new()
                .register(
                    ModelDefinition::new("App\\Models\\User", || json!({"id": null}))
                        .persistent()
                        .factory(
                            FactoryDefinition::new(|n| json!({"id": n, "source": "factory"}))
                                .state("admin", |attrs| {
                                    attrs.insert("role".into(), json!("admin"));
                                }),
                        ),
                )
                .register(
                    ModelDefinition::new("App\\Models\\Post", || json!({"source": "bare"}))
                        .persistent(),
                )
                .register(ModelDefinition::new("App\\Money", || json!({"source": "bare"})))
                .register(ModelDefinition::fallible("App\\Broken", || {
                    Err("constructor needs arguments".into())
                })),
        )
    }

    fn resources() -> ResourceRegistry {
        ResourceRegistry::new()
            .register(JsonResource::attributes("App\\Http\\Resources\\UserResource"))
            .register(ResourceCollection::new(
                "App\\Http\\Resources\\UserCollection",
                JsonResource::attributes("App\\Http\\Resources\\UserResource"),
            ))
            .register(JsonResource::attributes("ListResource").for_lists())
    }

    fn resolver() -> SampleResolver {
        SampleResolver::from_registry(models(), resources())
    }

    #[test]
    fn factory_stage_applies_states() {
        let instance = resolver()
            .resolve_instance("\\App\\Models\\User", &["admin".to_string()])
            .unwrap();
        assert_eq!(
            instance.to_value(),
            json!({"id": 1, "source": "factory", "role": "admin"})
        );
    }

    #[test]
    fn stored_row_beats_bare_instance() {
        let store = Arc::new(InMemoryStore::new());
        store.seed(
            SampleInstance::new("App\\Models\\Post", Map::new())
                .persistent()
                .with_attribute("source", "database"),
        );

        let instance = resolver()
            .with_store(store)
            .resolve_instance("App\\Models\\Post", &[])
            .unwrap();
        assert_eq!(instance.get("source"), Some(&json!("database")));
    }

    #[test]
    fn non_persistent_model_uses_bare_instance() {
        let store = Arc::new(InMemoryStore::new());
        store.seed(SampleInstance::new("App\\Money", Map::new()).with_attribute("source", "database"));

        let instance = resolver()
            .with_store(store)
            .resolve_instance("App\\Money", &[])
            .unwrap();
        assert_eq!(instance.get("source"), Some(&json!("bare")));
    }

    #[test]
    fn unresolvable_model_lists_every_stage() {
        let err = resolver().resolve_instance("App\\Unknown", &[]).unwrap_err();
        assert_eq!(err.model, "App\\Unknown");
        let stages: Vec<Stage> = err.failures.iter().map(|f| f.stage).collect();
        assert_eq!(stages, vec![Stage::Factory, Stage::Stored, Stage::Bare]);
        assert_eq!(
            err.failures[0].error,
            StageError::Factory(FactoryError::UnknownType("App\\Unknown".into()))
        );
        assert_eq!(
            err.failures[2].error,
            StageError::Construct(ConstructError::UnknownType("App\\Unknown".into()))
        );
    }

    #[test]
    fn failed_construction_is_attempted_once() {
        let err = resolver().resolve_instance("App\\Broken", &[]).unwrap_err();
        assert_eq!(err.failures.len(), 3);
        assert_eq!(err.failures[1].error, err.failures[2].error);
    }

    #[test]
    fn transactional_factory_leaves_no_rows() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = resolver()
            .with_config(ResolverConfig::default().transactional())
            .with_store(store.clone());

        let instance = resolver.resolve_instance("App\\Models\\User", &[]).unwrap();
        assert!(instance.was_recently_created());
        assert_eq!(store.count("App\\Models\\User"), 0);
        assert!(!store.in_transaction());
    }

    #[test]
    fn transactional_factory_failure_rolls_back() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = resolver()
            .with_config(ResolverConfig::default().transactional())
            .with_store(store.clone());

        let instance = resolver
            .resolve_instance("App\\Models\\User", &["banned".to_string()])
            .unwrap();
        assert_eq!(instance.get("id"), Some(&json!(null)));
        assert!(!store.in_transaction());
        assert_eq!(store.count("App\\Models\\User"), 0);
    }

    /// Inserts the sample, then reports a failure
    struct InsertThenFail(Arc<ModelRegistry>);

    impl FactoryProvider for InsertThenFail {
        fn make(&self, type_id: &str, states: &[String]) -> Result<SampleInstance, FactoryError> {
            self.0.make(type_id, states)
        }

        fn create(
            &self,
            type_id: &str,
            states: &[String],
            transaction: &mut dyn Transaction,
        ) -> Result<SampleInstance, FactoryError> {
            let instance = self.make(type_id, states)?;
            transaction.insert(&instance)?;
            Err(FactoryError::Failed {
                model: type_id.to_string(),
                reason: "after-create hook failed".into(),
            })
        }
    }

    #[test]
    fn failure_after_insert_leaves_no_rows() {
        let models = models();
        let store = Arc::new(InMemoryStore::new());
        let factories = Arc::new(InsertThenFail(models.clone()));
        let resolver = SampleResolver::new(factories, models, resources())
            .with_config(ResolverConfig::default().transactional())
            .with_store(store.clone());

        let instance = resolver.resolve_instance("App\\Models\\User", &[]).unwrap();
        assert_eq!(instance.get("id"), Some(&json!(null)));
        assert_eq!(store.count("App\\Models\\User"), 0);
        assert!(!store.in_transaction());
    }

    struct StuckTransaction;

    impl Transaction for StuckTransaction {
        fn insert(&mut self, _: &SampleInstance) -> Result<(), StoreError> {
            Ok(())
        }

        fn fetch_first(&self, _: &str) -> Result<Option<SampleInstance>, StoreError> {
            Ok(None)
        }

        fn rollback(&mut self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection lost".into()))
        }
    }

    struct StuckStore;

    impl DataStore for StuckStore {
        fn begin(&self) -> Result<Box<dyn Transaction + '_>, StoreError> {
            Ok(Box::new(StuckTransaction))
        }

        fn fetch_first(&self, _: &str) -> Result<Option<SampleInstance>, StoreError> {
            Ok(None)
        }
    }

    #[test]
    fn rollback_failure_is_warned_in_quiet_mode() {
        let sink = Arc::new(MemorySink::new());
        let resolver = resolver()
            .with_config(ResolverConfig::default().transactional())
            .with_reporter(Reporter::new(false, sink.clone()))
            .with_store(Arc::new(StuckStore));

        let instance = resolver.resolve_instance("App\\Models\\User", &[]).unwrap();
        assert!(instance.was_recently_created());
        assert_eq!(
            sink.lines(),
            vec![(
                tracing::Level::WARN,
                "rolling back 'App\\Models\\User' sample failed: data store unavailable: connection lost"
                    .to_string()
            )]
        );
    }

    #[test]
    fn transactional_without_store_falls_back() {
        let resolver = resolver().with_config(ResolverConfig::default().transactional());
        let instance = resolver.resolve_instance("App\\Models\\User", &[]).unwrap();
        assert_eq!(instance.get("id"), Some(&json!(null)));
    }

    #[test]
    fn single_resource_example() {
        let request = ResolutionRequest {
            kind: ResourceKind::Single,
            status: None,
            resource_type: "\\App\\Http\\Resources\\UserResource".into(),
            model_type: "App\\Models\\User".into(),
            states: vec![],
        };

        let responses = resolver().assemble(&request).unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status, 200);
        assert_eq!(
            responses[0].json().unwrap(),
            json!({"data": {"id": 1, "source": "factory"}})
        );
    }

    #[test]
    fn collection_example_has_two_items() {
        let request = ResolutionRequest {
            kind: ResourceKind::Collection,
            status: Some(206),
            resource_type: "App\\Http\\Resources\\UserResource".into(),
            model_type: "App\\Models\\User".into(),
            states: vec![],
        };

        let responses = resolver().assemble(&request).unwrap();
        assert_eq!(responses[0].status, 206);
        assert_eq!(
            responses[0].json().unwrap(),
            json!({"data": [
                {"id": 1, "source": "factory"},
                {"id": 2, "source": "factory"},
            ]})
        );
    }

    #[test]
    fn collection_oriented_resource_wraps_single_sample_in_list() {
        let request = ResolutionRequest {
            kind: ResourceKind::Single,
            status: None,
            resource_type: "App\\Http\\Resources\\UserCollection".into(),
            model_type: "App\\Money".into(),
            states: vec![],
        };

        let responses = resolver().assemble(&request).unwrap();
        assert_eq!(responses[0].json().unwrap(), json!({"data": [{"source": "bare"}]}));
    }

    #[test]
    fn list_resource_is_retried_with_list() {
        let sink = Arc::new(MemorySink::new());
        let resolver = resolver()
            .with_config(ResolverConfig::default().verbose())
            .with_reporter(Reporter::new(false, sink.clone()));
        let request = ResolutionRequest {
            kind: ResourceKind::Single,
            status: None,
            resource_type: "ListResource".into(),
            model_type: "App\\Money".into(),
            states: vec![],
        };

        let responses = resolver.assemble(&request).unwrap();
        assert_eq!(responses[0].json().unwrap(), json!({"data": [{"source": "bare"}]}));
        assert!(sink.contains("expects a collection"));
    }

    #[test]
    fn route_failures_become_absent() {
        let sink = Arc::new(MemorySink::new());
        let resolver = resolver().with_reporter(Reporter::new(false, sink.clone()));
        let route = RouteInfo::single(Method::GET, "/users");

        let tags = vec![
            Tag::new("resource", "App\\Http\\Resources\\Missing"),
            Tag::new("resourcemodel", "App\\Money"),
        ];
        assert_eq!(resolver.responses_for(&route, &tags), None);
        assert!(sink.contains("[GET] /users: couldn't render the resource"));
    }

    #[test]
    fn near_miss_annotations_are_noted_verbosely() {
        let sink = Arc::new(MemorySink::new());
        let resolver = resolver()
            .with_config(ResolverConfig::default().verbose())
            .with_reporter(Reporter::new(true, sink.clone()));
        let route = RouteInfo::single(Method::GET, "/users");

        let tags = vec![Tag::new("resorce", "UserResource")];
        assert_eq!(resolver.responses_for(&route, &tags), None);
        assert!(sink.contains("did you mean '@resource'?"));
    }
}
