//! Construction-time configuration for validators.

use crate::access::PropertyAccess;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Shared property-accessor function: object and attribute name in, current
/// value out.
pub type Accessor<T> = Arc<dyn Fn(&T, &str) -> Value + Send + Sync>;

/// Configuration injected into a validator when it is built.
///
/// Carries the property accessor used to read attribute values at evaluation
/// time. The default reads through [`PropertyAccess`]; a custom closure can
/// replace it for object types with their own getter conventions (observable
/// models, ORMs, and the like).
///
/// ## Example
///
/// ```rust,ignore
/// let config = ValidatorConfig::with_accessor(|person: &Person, name| match name {
///     "email" => Value::String(person.email.clone()),
///     _ => Value::Null,
/// });
/// let builder = ValidatorBuilder::with_config(config);
/// ```
pub struct ValidatorConfig<T> {
    accessor: Accessor<T>,
}

impl<T> ValidatorConfig<T> {
    /// Build a config around a custom property accessor.
    pub fn with_accessor(accessor: impl Fn(&T, &str) -> Value + Send + Sync + 'static) -> Self {
        Self {
            accessor: Arc::new(accessor),
        }
    }

    pub(crate) fn read(&self, object: &T, attribute: &str) -> Value {
        (*self.accessor)(object, attribute)
    }

    pub(crate) fn accessor(&self) -> Accessor<T> {
        Arc::clone(&self.accessor)
    }
}

impl<T: PropertyAccess> ValidatorConfig<T> {
    /// The default config: read attributes through [`PropertyAccess`].
    pub fn new() -> Self {
        Self::with_accessor(|object: &T, name: &str| object.property(name))
    }
}

impl<T: PropertyAccess> Default for ValidatorConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ValidatorConfig<T> {
    fn clone(&self) -> Self {
        Self {
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<T> fmt::Debug for ValidatorConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorConfig").finish_non_exhaustive()
    }
}
