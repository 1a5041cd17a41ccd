use serde::Serialize;
use serde_json::{Map, Value};

/// A representative object of an application model, used only for examples.
///
/// Serializes as its attribute map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampleInstance {
    #[serde(skip)]
    type_id: String,
    attributes: Map<String, Value>,
    #[serde(skip)]
    persistent: bool,
    #[serde(skip)]
    recently_created: bool,
}

impl SampleInstance {
    pub fn new(type_id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            type_id: type_id.into(),
            attributes,
            persistent: false,
            recently_created: false,
        }
    }

    /// Mark the instance as belonging to a database-backed model
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Set when the instance was just inserted by a factory
    pub fn was_recently_created(&self) -> bool {
        self.recently_created
    }

    pub(crate) fn mark_recently_created(&mut self) {
        self.recently_created = true;
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.attributes.clone())
    }
}
