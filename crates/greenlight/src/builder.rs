//! Fluent construction of validators.

use crate::access::PropertyAccess;
use crate::config::{Accessor, ValidatorConfig};
use crate::error::BuilderError;
use crate::helpers::Helpers;
use crate::predicate::{FnPredicate, Predicate, PredicateResult};
use crate::validator::ObjectValidator;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde_json::Value;
use std::sync::Arc;

/// Entry point: a fresh builder over a fresh registry, with the default
/// accessor and the standard helper vocabulary.
pub fn validator<T>() -> ValidatorBuilder<T>
where
    T: PropertyAccess + Send + Sync + 'static,
{
    ValidatorBuilder::new()
}

/// Accumulates validation rules and dependency edges into an
/// [`ObjectValidator`].
///
/// Rule calls live on the group type returned by [`validates`], so `when`
/// and `using` cannot be called before an attribute is selected. Usage
/// errors that only surface at runtime (helper lookup, helper arguments)
/// are remembered and reported by `build()`, keeping the chain fluent.
///
/// ## Example
///
/// ```rust,ignore
/// use greenlight::prelude::*;
/// use serde_json::json;
///
/// let validator = validator()
///     .validates("email")
///         .using(&[], checks::email(Default::default()), "invalid email")
///     .validates("spouse_name")
///         .when_fn(&["marital_status"], |values, _, _| Ok(values[0] == "married"))
///         .using(&[], checks::present(), "required")
///     .build()?;
///
/// let report = validator
///     .validate(&json!({ "marital_status": "married", "spouse_name": "" }))
///     .await?;
/// assert!(!report.is_valid());
/// ```
///
/// [`validates`]: ValidatorBuilder::validates
pub struct ValidatorBuilder<T> {
    validator: ObjectValidator<T>,
    helpers: Helpers<T>,
    error: Option<BuilderError>,
}

impl<T> ValidatorBuilder<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self
    where
        T: PropertyAccess,
    {
        Self::with_config(ValidatorConfig::default())
    }

    /// Build over an explicit configuration (custom property accessor).
    pub fn with_config(config: ValidatorConfig<T>) -> Self {
        Self {
            validator: ObjectValidator::new(config),
            helpers: Helpers::standard(),
            error: None,
        }
    }

    /// Replace the helper vocabulary available to `apply`.
    pub fn helpers(mut self, helpers: Helpers<T>) -> Self {
        self.helpers = helpers;
        self
    }

    /// Begin a rule group for `attribute`. Conditions accumulated by a
    /// previous group do not carry over.
    pub fn validates(self, attribute: impl Into<String>) -> AttributeRules<T> {
        AttributeRules {
            builder: self,
            attribute: attribute.into(),
            conditions: Vec::new(),
        }
    }

    /// Finish construction, surfacing the first usage error recorded while
    /// chaining.
    pub fn build(self) -> Result<ObjectValidator<T>, BuilderError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.validator),
        }
    }
}

impl<T> Default for ValidatorBuilder<T>
where
    T: PropertyAccess + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A gating condition accumulated by `when`, kept with the dependency
/// attributes whose current values it receives.
struct Gate<T> {
    dependencies: Vec<String>,
    condition: Arc<dyn Predicate<T>>,
}

/// A rule group for one attribute, produced by `validates`.
///
/// `when` accumulates gating conditions; each `using` commits one rule into
/// the registry, gated by a snapshot of the conditions accumulated so far —
/// later `when` calls never retroactively affect an already committed rule.
pub struct AttributeRules<T> {
    builder: ValidatorBuilder<T>,
    attribute: String,
    conditions: Vec<Arc<Gate<T>>>,
}

impl<T> AttributeRules<T>
where
    T: Send + Sync + 'static,
{
    /// Gate the rules committed after this call on `condition`.
    ///
    /// The condition receives the current values of `dependencies` (the
    /// group's own attribute when empty) at evaluation time; any condition
    /// resolving false reports the attribute valid without running the
    /// rule's predicate. Every dependency other than the group's attribute
    /// also registers a cascade edge back to this attribute.
    pub fn when(mut self, dependencies: &[&str], condition: impl Predicate<T> + 'static) -> Self {
        let dependencies = self.resolve_dependencies(dependencies);
        self.conditions.push(Arc::new(Gate {
            dependencies,
            condition: Arc::new(condition),
        }));
        self
    }

    /// Alias for [`when`](Self::when); reads better after a first condition.
    pub fn and(self, dependencies: &[&str], condition: impl Predicate<T> + 'static) -> Self {
        self.when(dependencies, condition)
    }

    /// [`when`](Self::when) with a plain synchronous closure.
    pub fn when_fn<F>(self, dependencies: &[&str], condition: F) -> Self
    where
        F: Fn(&[Value], &str, &T) -> PredicateResult + Send + Sync + 'static,
    {
        self.when(dependencies, FnPredicate::new(condition))
    }

    /// Commit one rule for the group's attribute.
    ///
    /// The predicate receives the current values of `dependencies` (the
    /// group's own attribute when empty), the attribute name, and the
    /// object; a false resolution records `message` against the attribute.
    /// Dependency edges register exactly as in [`when`](Self::when).
    pub fn using(
        mut self,
        dependencies: &[&str],
        predicate: impl Predicate<T> + 'static,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        if message.is_empty() {
            let attribute = self.attribute.clone();
            return self.fail(BuilderError::EmptyMessage { attribute });
        }

        let dependencies = self.resolve_dependencies(dependencies);
        let accessor = self.builder.validator.accessor();
        let wired = DependentPredicate {
            dependencies,
            accessor: Arc::clone(&accessor),
            inner: Arc::new(predicate),
        };
        let committed: Arc<dyn Predicate<T>> = if self.conditions.is_empty() {
            Arc::new(wired)
        } else {
            Arc::new(Guarded {
                conditions: self.conditions.clone(),
                accessor,
                inner: Arc::new(wired),
            })
        };

        self.builder
            .validator
            .add_shared_validation(self.attribute.clone(), committed, message);
        self
    }

    /// [`using`](Self::using) with a plain synchronous closure.
    pub fn using_fn<F>(self, dependencies: &[&str], predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&[Value], &str, &T) -> PredicateResult + Send + Sync + 'static,
    {
        self.using(dependencies, FnPredicate::new(predicate), message)
    }

    /// Invoke a named helper from the builder's registry against this group.
    pub fn apply(self, helper: &str, args: &[Value]) -> Self {
        let Some(run) = self.builder.helpers.get(helper).cloned() else {
            let name = helper.to_string();
            return self.fail(BuilderError::UnknownHelper(name));
        };
        (*run)(self, args)
    }

    /// Record a usage error to be surfaced by `build()`. Later errors keep
    /// the first one.
    pub fn fail(mut self, error: BuilderError) -> Self {
        if self.builder.error.is_none() {
            self.builder.error = Some(error);
        }
        self
    }

    /// Start a new rule group for another attribute.
    pub fn validates(self, attribute: impl Into<String>) -> AttributeRules<T> {
        self.builder.validates(attribute)
    }

    /// Finish construction; see [`ValidatorBuilder::build`].
    pub fn build(self) -> Result<ObjectValidator<T>, BuilderError> {
        self.builder.build()
    }

    /// Default to the group's own attribute, and register a cascade edge for
    /// every other dependency.
    fn resolve_dependencies(&mut self, dependencies: &[&str]) -> Vec<String> {
        if dependencies.is_empty() {
            return vec![self.attribute.clone()];
        }
        for dependency in dependencies {
            if *dependency != self.attribute {
                self.builder
                    .validator
                    .add_dependents_for(dependency, &[self.attribute.as_str()]);
            }
        }
        dependencies.iter().map(|d| (*d).to_string()).collect()
    }
}

/// Wraps a committed predicate so it receives the current values of its
/// declared dependency attributes, read through the accessor at evaluation
/// time rather than at registration time.
struct DependentPredicate<T> {
    dependencies: Vec<String>,
    accessor: Accessor<T>,
    inner: Arc<dyn Predicate<T>>,
}

#[async_trait]
impl<T: Sync> Predicate<T> for DependentPredicate<T> {
    async fn check(&self, _values: &[Value], attribute: &str, object: &T) -> PredicateResult {
        let values: Vec<Value> = self
            .dependencies
            .iter()
            .map(|dependency| (*self.accessor)(object, dependency))
            .collect();
        self.inner.check(&values, attribute, object).await
    }
}

/// Evaluates a rule's condition snapshot before its predicate. Conditions
/// run concurrently; any resolving false reports the attribute valid
/// without invoking the inner predicate.
struct Guarded<T> {
    conditions: Vec<Arc<Gate<T>>>,
    accessor: Accessor<T>,
    inner: Arc<dyn Predicate<T>>,
}

#[async_trait]
impl<T: Sync> Predicate<T> for Guarded<T> {
    async fn check(&self, values: &[Value], attribute: &str, object: &T) -> PredicateResult {
        let accessor = &self.accessor;
        let gates = self.conditions.iter().map(|gate| async move {
            let dependency_values: Vec<Value> = gate
                .dependencies
                .iter()
                .map(|dependency| (**accessor)(object, dependency))
                .collect();
            gate.condition
                .check(&dependency_values, attribute, object)
                .await
        });

        for passed in try_join_all(gates).await? {
            if !passed {
                tracing::trace!(attribute, "condition resolved false, skipping predicate");
                return Ok(true);
            }
        }

        self.inner.check(values, attribute, object).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn using_wires_dependency_values_in_declaration_order() {
        let validator = validator::<Value>()
            .validates("confirmation")
            .using_fn(
                &["password", "confirmation"],
                |values: &[Value], _: &str, _: &Value| Ok(values[0] == values[1]),
                "passwords must match",
            )
            .build()
            .unwrap();

        let report = validator
            .validate(&json!({ "password": "s3cret", "confirmation": "s3cret" }))
            .await
            .unwrap();
        assert!(report.is_valid());

        let report = validator
            .validate(&json!({ "password": "s3cret", "confirmation": "typo" }))
            .await
            .unwrap();
        assert_eq!(
            report.messages_for("confirmation"),
            ["passwords must match".to_string()]
        );
    }

    #[tokio::test]
    async fn dependencies_cascade_back_into_the_declaring_attribute() {
        let validator = validator::<Value>()
            .validates("spouse_name")
            .when_fn(
                &["marital_status"],
                |values: &[Value], _: &str, _: &Value| Ok(values[0] == "married"),
            )
            .using(&[], checks::present(), "required")
            .build()
            .unwrap();

        // Validating the parent attribute alone must re-validate the
        // dependent one.
        let report = validator
            .validate_attributes(
                &json!({ "marital_status": "married", "spouse_name": "" }),
                &["marital_status"],
            )
            .await
            .unwrap();

        assert!(!report.is_valid());
        assert_eq!(
            report.messages_for("spouse_name"),
            ["required".to_string()]
        );
    }

    #[tokio::test]
    async fn false_condition_skips_the_predicate_entirely() {
        static PREDICATE_RUNS: AtomicUsize = AtomicUsize::new(0);

        let validator = validator::<Value>()
            .validates("spouse_name")
            .when_fn(
                &["marital_status"],
                |values: &[Value], _: &str, _: &Value| Ok(values[0] == "married"),
            )
            .using_fn(
                &[],
                |_: &[Value], _: &str, _: &Value| {
                    PREDICATE_RUNS.fetch_add(1, Ordering::SeqCst);
                    Ok(false)
                },
                "required",
            )
            .build()
            .unwrap();

        let report = validator
            .validate(&json!({ "marital_status": "single", "spouse_name": "" }))
            .await
            .unwrap();

        assert!(report.is_valid());
        assert!(report.messages_for("spouse_name").is_empty());
        assert_eq!(PREDICATE_RUNS.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn each_using_snapshots_the_conditions_accumulated_so_far() {
        let validator = validator::<Value>()
            .validates("nickname")
            .using_fn(
                &[],
                |_: &[Value], _: &str, _: &Value| Ok(false),
                "always recorded",
            )
            .when_fn(&[], |_: &[Value], _: &str, _: &Value| Ok(false))
            .using_fn(
                &[],
                |_: &[Value], _: &str, _: &Value| Ok(false),
                "gated away",
            )
            .build()
            .unwrap();

        let report = validator.validate(&json!({ "nickname": "x" })).await.unwrap();
        assert_eq!(
            report.messages_for("nickname"),
            ["always recorded".to_string()]
        );
    }

    #[tokio::test]
    async fn a_new_group_resets_the_condition_accumulator() {
        let validator = validator::<Value>()
            .validates("a")
            .when_fn(&[], |_: &[Value], _: &str, _: &Value| Ok(false))
            .validates("b")
            .using_fn(&[], |_: &[Value], _: &str, _: &Value| Ok(false), "bad b")
            .build()
            .unwrap();

        // `b`'s rule must not inherit `a`'s never-committed condition.
        let report = validator.validate(&json!({})).await.unwrap();
        assert_eq!(report.messages_for("b"), ["bad b".to_string()]);
    }

    #[tokio::test]
    async fn condition_values_are_read_at_evaluation_time() {
        static READS: AtomicUsize = AtomicUsize::new(0);

        let config = ValidatorConfig::with_accessor(|object: &Value, name: &str| {
            READS.fetch_add(1, Ordering::SeqCst);
            object.property(name)
        });

        let validator = ValidatorBuilder::with_config(config)
            .validates("spouse_name")
            .when_fn(
                &["marital_status"],
                |values: &[Value], _: &str, _: &Value| Ok(values[0] == "married"),
            )
            .using(&[], checks::present(), "required")
            .build()
            .unwrap();

        // Nothing is read until a validate call actually evaluates rules.
        assert_eq!(READS.load(Ordering::SeqCst), 0);

        let report = validator
            .validate(&json!({ "marital_status": "married", "spouse_name": "ada" }))
            .await
            .unwrap();
        assert!(report.is_valid());
        assert!(READS.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn empty_messages_are_rejected_at_build_time() {
        let result = validator::<Value>()
            .validates("email")
            .using(&[], checks::present(), "")
            .build();

        assert!(matches!(
            result,
            Err(BuilderError::EmptyMessage { attribute }) if attribute == "email"
        ));
    }

    #[test]
    fn the_first_recorded_error_wins() {
        let result = validator::<Value>()
            .validates("email")
            .apply("no_such_helper", &[])
            .using(&[], checks::present(), "")
            .build();

        assert_eq!(
            result.unwrap_err(),
            BuilderError::UnknownHelper("no_such_helper".to_string())
        );
    }
}
