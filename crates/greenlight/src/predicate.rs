//! The predicate contract shared by validation rules and gating conditions.

use async_trait::async_trait;
use serde_json::Value;

/// Error type surfaced by predicates and conditions.
///
/// A rejection aborts the whole `validate` resolution and is propagated to
/// the caller unchanged, so the alias stays maximally permissive.
pub type PredicateError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of a single predicate or condition evaluation.
pub type PredicateResult = Result<bool, PredicateError>;

/// An asynchronous boolean test over attribute values.
///
/// `values` holds the current values of the predicate's declared dependency
/// attributes in declaration order; for a rule with no explicit dependencies
/// that is a single element, the target attribute's own value. `Ok(false)`
/// is a normal validation failure and records the rule's message; `Err`
/// aborts the surrounding `validate` call.
///
/// Synchronous predicates are written as plain closures through
/// [`FnPredicate`] (or the builder's `*_fn` methods); asynchronous ones
/// implement this trait directly.
///
/// ## Example
///
/// ```rust,ignore
/// struct EmailAvailable {
///     taken: Vec<String>,
/// }
///
/// #[async_trait]
/// impl Predicate<Value> for EmailAvailable {
///     async fn check(&self, values: &[Value], _attribute: &str, _object: &Value) -> PredicateResult {
///         let email = values[0].as_str().unwrap_or_default();
///         Ok(!self.taken.iter().any(|t| t == email))
///     }
/// }
/// ```
#[async_trait]
pub trait Predicate<T>: Send + Sync {
    /// Resolve this predicate against the current dependency values.
    async fn check(&self, values: &[Value], attribute: &str, object: &T) -> PredicateResult;
}

/// Adapts a plain synchronous closure into a [`Predicate`].
pub struct FnPredicate<F> {
    f: F,
}

impl<F> FnPredicate<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<T, F> Predicate<T> for FnPredicate<F>
where
    T: Sync,
    F: Fn(&[Value], &str, &T) -> PredicateResult + Send + Sync,
{
    async fn check(&self, values: &[Value], attribute: &str, object: &T) -> PredicateResult {
        (self.f)(values, attribute, object)
    }
}
