//! Typed model registry.
//!
//! Models are registered at startup under their type identifier, each with a
//! default constructor and optionally a factory definition with named
//! states. The registry serves as both [`FactoryProvider`] and
//! [`PlainConstructor`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};

use crate::error::{ConstructError, FactoryError};
use crate::sample::SampleInstance;
use crate::store::Transaction;
use crate::tags::normalize_type_id;

/// Builds sample instances from factory definitions
pub trait FactoryProvider: Send + Sync {
    /// Build an in-memory instance with the given states applied
    fn make(&self, type_id: &str, states: &[String]) -> Result<SampleInstance, FactoryError>;

    /// Build an instance and insert it inside `transaction`
    fn create(
        &self,
        type_id: &str,
        states: &[String],
        transaction: &mut dyn Transaction,
    ) -> Result<SampleInstance, FactoryError> {
        let mut instance = self.make(type_id, states)?;
        transaction.insert(&instance)?;
        instance.mark_recently_created();
        Ok(instance)
    }
}

/// Default-constructs instances with no arguments
pub trait PlainConstructor: Send + Sync {
    fn construct(&self, type_id: &str) -> Result<SampleInstance, ConstructError>;
}

type Attributes = Map<String, Value>;
type Constructor = Box<dyn Fn() -> Result<Value, String> + Send + Sync>;
type Definition = Box<dyn Fn(u64) -> Result<Value, String> + Send + Sync>;
type StateFn = Box<dyn Fn(&mut Attributes) + Send + Sync>;

/// A factory: base attributes plus named state overrides.
///
/// The base definition receives a sequence number starting at 1 that grows
/// with every build, so successive samples differ.
pub struct FactoryDefinition {
    definition: Definition,
    states: HashMap<String, StateFn>,
    sequence: AtomicU64,
}

impl FactoryDefinition {
    pub fn new<F>(definition: F) -> Self
    where
        F: Fn(u64) -> Value + Send + Sync + 'static,
    {
        Self::fallible(move |n| Ok(definition(n)))
    }

    pub fn fallible<F>(definition: F) -> Self
    where
        F: Fn(u64) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            definition: Box::new(definition),
            states: HashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn state<F>(mut self, name: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&mut Attributes) + Send + Sync + 'static,
    {
        self.states.insert(name.into(), Box::new(apply));
        self
    }

    fn produce(&self, model: &str, states: &[String]) -> Result<Attributes, FactoryError> {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let failed = |reason: String| FactoryError::Failed {
            model: model.to_string(),
            reason,
        };

        let mut attributes = (self.definition)(n)
            .map_err(failed)
            .and_then(|value| into_attributes(value).map_err(failed))?;

        for state in states {
            let apply = self
                .states
                .get(state)
                .ok_or_else(|| FactoryError::UnknownState {
                    model: model.to_string(),
                    state: state.clone(),
                })?;
            apply(&mut attributes);
        }

        Ok(attributes)
    }
}

/// A registered model type
pub struct ModelDefinition {
    type_id: String,
    constructor: Constructor,
    factory: Option<FactoryDefinition>,
    persistent: bool,
}

impl ModelDefinition {
    pub fn new<F>(type_id: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::fallible(type_id, move || Ok(constructor()))
    }

    pub fn fallible<F>(type_id: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            type_id: type_id.into(),
            constructor: Box::new(constructor),
            factory: None,
            persistent: false,
        }
    }

    /// Mark the model as database-backed
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn factory(mut self, factory: FactoryDefinition) -> Self {
        self.factory = Some(factory);
        self
    }

    fn instance(&self, attributes: Attributes) -> SampleInstance {
        let instance = SampleInstance::new(self.type_id.clone(), attributes);
        if self.persistent {
            instance.persistent()
        } else {
            instance
        }
    }
}

/// Model definitions keyed by normalized type identifier
#[derive(Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelDefinition>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, model: ModelDefinition) -> Self {
        let key = normalize_type_id(&model.type_id).to_string();
        self.models.insert(key, model);
        self
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.models.contains_key(normalize_type_id(type_id))
    }

    fn model(&self, type_id: &str) -> Option<&ModelDefinition> {
        self.models.get(normalize_type_id(type_id))
    }
}

impl FactoryProvider for ModelRegistry {
    fn make(&self, type_id: &str, states: &[String]) -> Result<SampleInstance, FactoryError> {
        let model = self
            .model(type_id)
            .ok_or_else(|| FactoryError::UnknownType(type_id.to_string()))?;
        let factory = model
            .factory
            .as_ref()
            .ok_or_else(|| FactoryError::MissingFactory(type_id.to_string()))?;

        let attributes = factory.produce(type_id, states)?;
        Ok(model.instance(attributes))
    }
}

impl PlainConstructor for ModelRegistry {
    fn construct(&self, type_id: &str) -> Result<SampleInstance, ConstructError> {
        let model = self
            .model(type_id)
            .ok_or_else(|| ConstructError::UnknownType(type_id.to_string()))?;
        let failed = |reason: String| ConstructError::Failed {
            model: type_id.to_string(),
            reason,
        };

        let attributes = (model.constructor)()
            .map_err(failed)
            .and_then(|value| into_attributes(value).map_err(failed))?;
        Ok(model.instance(attributes))
    }
}

fn into_attributes(value: Value) -> Result<Attributes, String> {
    match value {
        Value::Object(attributes) => Ok(attributes),
        Value::Null => Ok(Attributes::new()),
        other => Err(format!("expected an object of attributes, got {other}")),
    }
}
