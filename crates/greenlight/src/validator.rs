//! The validation registry and its resolution algorithm.

use crate::config::{Accessor, ValidatorConfig};
use crate::predicate::{Predicate, PredicateError};
use crate::report::ValidationReport;
use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One registered rule: predicate plus the failure message it contributes.
struct Rule<T> {
    predicate: Arc<dyn Predicate<T>>,
    message: String,
}

/// Outcome of one rule evaluation: the attribute, and its failure message if
/// the rule did not pass.
type Outcome = (String, Option<String>);

/// Per-attribute validation rules plus the dependency graph that cascades a
/// `validate` call into dependent attributes.
///
/// Usually constructed through [`ValidatorBuilder`](crate::ValidatorBuilder)
/// and structurally immutable once built; `validate` only borrows shared, so
/// one validator serves repeated and concurrent calls.
pub struct ObjectValidator<T> {
    validations: HashMap<String, Vec<Rule<T>>>,
    dependents: HashMap<String, Vec<String>>,
    config: ValidatorConfig<T>,
}

impl<T> ObjectValidator<T> {
    pub fn new(config: ValidatorConfig<T>) -> Self {
        Self {
            validations: HashMap::new(),
            dependents: HashMap::new(),
            config,
        }
    }

    /// Append a `(predicate, message)` rule to `attribute`'s list, creating
    /// the list if absent. Rules evaluate independently; every failing rule
    /// contributes its message.
    pub fn add_validation(
        &mut self,
        attribute: impl Into<String>,
        predicate: impl Predicate<T> + 'static,
        message: impl Into<String>,
    ) {
        self.add_shared_validation(attribute.into(), Arc::new(predicate), message.into());
    }

    pub(crate) fn add_shared_validation(
        &mut self,
        attribute: String,
        predicate: Arc<dyn Predicate<T>>,
        message: String,
    ) {
        self.validations
            .entry(attribute)
            .or_default()
            .push(Rule { predicate, message });
    }

    /// Union `dependents` into `parent`'s dependent set. Duplicates and
    /// self-edges are dropped.
    pub fn add_dependents_for(&mut self, parent: &str, dependents: &[&str]) {
        let set = self.dependents.entry(parent.to_string()).or_default();
        for dependent in dependents {
            if *dependent != parent && !set.iter().any(|d| d == dependent) {
                tracing::trace!(parent, dependent, "registered cascade edge");
                set.push((*dependent).to_string());
            }
        }
    }

    /// Every attribute known to the registry: validated attributes plus all
    /// parents and dependents in the dependency graph. Enumeration order is
    /// not meaningful.
    pub fn attributes(&self) -> Vec<String> {
        let mut all: Vec<String> = Vec::new();
        let known = self
            .validations
            .keys()
            .chain(self.dependents.keys())
            .chain(self.dependents.values().flatten());
        for attribute in known {
            if !all.iter().any(|a| a == attribute) {
                all.push(attribute.clone());
            }
        }
        all
    }

    pub(crate) fn accessor(&self) -> Accessor<T> {
        self.config.accessor()
    }

    fn is_known(&self, attribute: &str) -> bool {
        self.validations.contains_key(attribute)
            || self.dependents.contains_key(attribute)
            || self
                .dependents
                .values()
                .any(|deps| deps.iter().any(|d| d == attribute))
    }

    fn dependents_of(&self, attribute: &str) -> &[String] {
        self.dependents
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl<T: Sync> ObjectValidator<T> {
    /// Validate the default attribute set: every attribute with an explicit
    /// validation list. Dependents without rules of their own are reached
    /// through cascading only.
    pub async fn validate(&self, object: &T) -> Result<ValidationReport, PredicateError> {
        let attributes: Vec<&str> = self.validations.keys().map(String::as_str).collect();
        self.validate_attributes(object, &attributes).await
    }

    /// Validate an explicit attribute subset plus everything it cascades
    /// into. All collected evaluations run concurrently; the first predicate
    /// or condition error aborts the call with no partial report.
    pub async fn validate_attributes(
        &self,
        object: &T,
        attributes: &[&str],
    ) -> Result<ValidationReport, PredicateError> {
        let mut visited: Vec<String> = attributes.iter().map(|a| (*a).to_string()).collect();
        let mut evaluations: Vec<BoxFuture<'_, Result<Outcome, PredicateError>>> = Vec::new();
        for attribute in attributes {
            if !self.is_known(attribute) {
                tracing::warn!(attribute, "requested attribute has no validations or dependents");
            }
            self.expand(object, attribute, &mut visited, &mut evaluations);
        }

        tracing::debug!(
            requested = attributes.len(),
            evaluations = evaluations.len(),
            "resolving validations"
        );

        let outcomes = future::try_join_all(evaluations).await?;
        Ok(ValidationReport::collect(outcomes))
    }

    /// Depth-first expansion of one attribute and its dependents. The
    /// per-call visited set is seeded with the requested attributes, so
    /// dependency cycles truncate at their first occurrence instead of
    /// recursing forever.
    fn expand<'a>(
        &'a self,
        object: &'a T,
        attribute: &str,
        visited: &mut Vec<String>,
        evaluations: &mut Vec<BoxFuture<'a, Result<Outcome, PredicateError>>>,
    ) {
        if let Some(rules) = self.validations.get(attribute) {
            let value = self.config.read(object, attribute);
            for rule in rules {
                let value = value.clone();
                let attribute = attribute.to_string();
                evaluations.push(
                    async move {
                        let values = [value];
                        let passed = rule.predicate.check(&values, &attribute, object).await?;
                        let message = if passed {
                            None
                        } else {
                            Some(rule.message.clone())
                        };
                        Ok((attribute, message))
                    }
                    .boxed(),
                );
            }
        } else if self.is_known(attribute) {
            // Recognized but carrying no rules: automatically valid.
            evaluations.push(future::ready(Ok((attribute.to_string(), None))).boxed());
        }

        for dependent in self.dependents_of(attribute) {
            if !visited.iter().any(|v| v == dependent) {
                visited.push(dependent.clone());
                self.expand(object, dependent, visited, evaluations);
            }
        }
    }
}

impl<T: crate::access::PropertyAccess> Default for ObjectValidator<T> {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl<T> fmt::Debug for ObjectValidator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectValidator")
            .field("attributes", &self.attributes())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::FnPredicate;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn passing() -> FnPredicate<impl Fn(&[Value], &str, &Value) -> crate::PredicateResult> {
        FnPredicate::new(|_: &[Value], _: &str, _: &Value| Ok(true))
    }

    fn failing() -> FnPredicate<impl Fn(&[Value], &str, &Value) -> crate::PredicateResult> {
        FnPredicate::new(|_: &[Value], _: &str, _: &Value| Ok(false))
    }

    #[test]
    fn attributes_unions_rules_and_graph_members() {
        let mut validator = ObjectValidator::<Value>::default();
        validator.add_validation("email", passing(), "bad");
        validator.add_dependents_for("marital_status", &["spouse_name"]);

        let mut attributes = validator.attributes();
        attributes.sort();
        assert_eq!(attributes, ["email", "marital_status", "spouse_name"]);
    }

    #[test]
    fn self_edges_and_duplicates_are_dropped() {
        let mut validator = ObjectValidator::<Value>::default();
        validator.add_dependents_for("a", &["a", "b", "b"]);
        assert_eq!(validator.dependents_of("a"), ["b".to_string()]);
    }

    #[tokio::test]
    async fn multiple_rules_each_contribute_their_message() {
        let mut validator = ObjectValidator::<Value>::default();
        validator.add_validation("name", failing(), "first");
        validator.add_validation("name", failing(), "second");

        let report = validator.validate(&json!({})).await.unwrap();
        assert!(!report.is_valid());
        assert_eq!(
            report.messages_for("name"),
            ["first".to_string(), "second".to_string()]
        );
    }

    #[tokio::test]
    async fn validating_a_subset_leaves_other_attributes_untouched() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut validator = ObjectValidator::<Value>::default();
        validator.add_validation("a", passing(), "bad a");
        validator.add_validation(
            "b",
            FnPredicate::new(|_: &[Value], _: &str, _: &Value| {
                CALLS.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }),
            "bad b",
        );

        let report = validator
            .validate_attributes(&json!({}), &["a"])
            .await
            .unwrap();

        assert!(report.covers("a"));
        assert!(!report.covers("b"));
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cascade_reaches_dependents_of_dependents() {
        let mut validator = ObjectValidator::<Value>::default();
        validator.add_validation("a", passing(), "bad a");
        validator.add_validation("b", failing(), "bad b");
        validator.add_validation("c", failing(), "bad c");
        validator.add_dependents_for("a", &["b"]);
        validator.add_dependents_for("b", &["c"]);

        let report = validator
            .validate_attributes(&json!({}), &["a"])
            .await
            .unwrap();

        assert!(!report.is_valid());
        assert_eq!(report.messages_for("b"), ["bad b".to_string()]);
        assert_eq!(report.messages_for("c"), ["bad c".to_string()]);
    }

    #[tokio::test]
    async fn dependency_cycles_truncate_after_one_visit_each() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let counted = || {
            FnPredicate::new(|_: &[Value], _: &str, _: &Value| {
                CALLS.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            })
        };

        let mut validator = ObjectValidator::<Value>::default();
        validator.add_validation("a", counted(), "bad a");
        validator.add_validation("b", counted(), "bad b");
        validator.add_dependents_for("a", &["b"]);
        validator.add_dependents_for("b", &["a"]);

        let report = validator
            .validate_attributes(&json!({}), &["a"])
            .await
            .unwrap();

        assert!(report.is_valid());
        assert!(report.covers("a"));
        assert!(report.covers("b"));
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dependents_without_rules_resolve_as_automatically_valid() {
        let mut validator = ObjectValidator::<Value>::default();
        validator.add_validation("a", passing(), "bad a");
        validator.add_dependents_for("a", &["b"]);

        let report = validator.validate(&json!({})).await.unwrap();
        assert!(report.is_valid());
        assert!(report.covers("b"));
        assert!(report.messages_for("b").is_empty());
    }

    #[tokio::test]
    async fn unknown_requested_attributes_contribute_nothing() {
        let mut validator = ObjectValidator::<Value>::default();
        validator.add_validation("a", passing(), "bad a");

        let report = validator
            .validate_attributes(&json!({}), &["ghost"])
            .await
            .unwrap();
        assert!(report.is_valid());
        assert!(!report.covers("ghost"));
    }

    #[tokio::test]
    async fn predicate_errors_abort_the_whole_call() {
        let mut validator = ObjectValidator::<Value>::default();
        validator.add_validation("a", passing(), "bad a");
        validator.add_validation(
            "b",
            FnPredicate::new(|_: &[Value], _: &str, _: &Value| Err("backend down".into())),
            "bad b",
        );

        let err = validator.validate(&json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "backend down");
    }

    #[tokio::test]
    async fn repeated_validation_is_idempotent() {
        let mut validator = ObjectValidator::<Value>::default();
        validator.add_validation(
            "email",
            FnPredicate::new(|values: &[Value], _: &str, _: &Value| {
                Ok(values[0].as_str().is_some_and(|s| s.contains('@')))
            }),
            "invalid email",
        );

        let object = json!({ "email": "nope" });
        let first = validator.validate(&object).await.unwrap();
        let second = validator.validate(&object).await.unwrap();
        assert_eq!(first, second);
    }
}
