//! Error types for sample resolution and example assembly.
//!
//! Collaborator failures (`FactoryError`, `ConstructError`, `StoreError`,
//! `ResourceError`) are recoverable inside the fallback chain. The three
//! route-level kinds are collected under [`ExampleError`]:
//! - [`ConfigurationError`]: a required annotation is missing
//! - [`InstantiationError`]: no stage produced a sample instance
//! - [`RenderingError`]: wrapping or serializing the resource failed

use std::fmt;

use thiserror::Error;

/// A required annotation is missing or unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// `@resource`/`@resourcecollection` without a `@resourcemodel`
    #[error("missing @resourcemodel annotation for resource '{resource}'")]
    MissingModelAnnotation {
        /// The declared resource type
        resource: String,
    },
}

/// Failure raised by a [`FactoryProvider`](crate::FactoryProvider)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    /// No model registered under this identifier
    #[error("unknown model type '{0}'")]
    UnknownType(String),

    /// The model exists but has no factory definition
    #[error("no factory defined for model '{0}'")]
    MissingFactory(String),

    /// A requested state is not defined on the factory
    #[error("factory for '{model}' has no state '{state}'")]
    UnknownState {
        /// Model type identifier
        model: String,
        /// The state name that was requested
        state: String,
    },

    /// The factory definition itself failed
    #[error("factory for '{model}' failed: {reason}")]
    Failed {
        /// Model type identifier
        model: String,
        /// Reason reported by the definition
        reason: String,
    },

    /// Persisting the built instance failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure raised by a [`PlainConstructor`](crate::PlainConstructor)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructError {
    /// No model registered under this identifier
    #[error("unknown model type '{0}'")]
    UnknownType(String),

    /// Default construction failed
    #[error("constructing '{model}' failed: {reason}")]
    Failed {
        /// Model type identifier
        model: String,
        /// Reason reported by the constructor
        reason: String,
    },
}

/// Failure raised by a [`DataStore`](crate::DataStore)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The transaction was already rolled back
    #[error("transaction is already closed")]
    TransactionClosed,

    /// The store cannot serve the request
    #[error("data store unavailable: {0}")]
    Unavailable(String),
}

/// Failure raised while wrapping instances in a resource type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// No resource registered under this identifier
    #[error("unknown resource type '{0}'")]
    UnknownResource(String),

    /// The resource must be constructed from a list of instances
    #[error("resource '{resource}' expects a collection of models")]
    ExpectsCollection {
        /// Resource type identifier
        resource: String,
    },

    /// The resource must be constructed from a single instance
    #[error("resource '{resource}' expects a single model")]
    ExpectsInstance {
        /// Resource type identifier
        resource: String,
    },

    /// The transformer failed
    #[error("resource '{resource}' failed to transform: {reason}")]
    Transform {
        /// Resource type identifier
        resource: String,
        /// Reason reported by the transformer
        reason: String,
    },
}

/// One step of the sample fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Build through the model factory
    Factory,
    /// Fetch the first stored row
    Stored,
    /// Use the default-constructed instance
    Bare,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Factory => "factory",
            Self::Stored => "database",
            Self::Bare => "constructor",
        };
        f.write_str(name)
    }
}

/// Why a single stage of the fallback chain did not produce an instance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// Factory stage failure
    #[error(transparent)]
    Factory(#[from] FactoryError),

    /// Default construction failure
    #[error(transparent)]
    Construct(#[from] ConstructError),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The model is not persistence-capable, so the store is not consulted
    #[error("model '{0}' is not stored in a database")]
    NotPersistent(String),

    /// The store holds no row of this type
    #[error("no stored '{0}' rows")]
    NoRows(String),
}

/// A stage together with the reason it fell through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    /// The stage that was attempted
    pub stage: Stage,
    /// Why it did not produce an instance
    pub error: StageError,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.error)
    }
}

/// No stage of the fallback chain produced a sample instance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to instantiate model '{model}'")]
pub struct InstantiationError {
    /// The model type identifier as declared
    pub model: String,
    /// Every stage failure, in the order attempted
    pub failures: Vec<StageFailure>,
}

/// Wrapping or serializing the resource failed
#[derive(Debug, Error)]
pub enum RenderingError {
    /// Resource lookup or transformation failed
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The rendered body could not be serialized
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Any failure that prevents an example response for one route
#[derive(Debug, Error)]
pub enum ExampleError {
    /// Missing annotation
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// No sample instance could be produced
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),

    /// The resource could not be rendered
    #[error(transparent)]
    Rendering(#[from] RenderingError),
}

impl From<ResourceError> for ExampleError {
    fn from(err: ResourceError) -> Self {
        Self::Rendering(err.into())
    }
}

impl ExampleError {
    /// One-line description of the failure kind
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "missing resource annotation",
            Self::Instantiation(_) => "couldn't instantiate a sample model",
            Self::Rendering(_) => "couldn't render the resource",
        }
    }

    /// Full diagnostic lines, most specific last
    pub fn details(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        if let Self::Instantiation(err) = self {
            lines.extend(err.failures.iter().map(|failure| format!("  {failure}")));
        }
        lines
    }
}
