//! Named shorthand vocabularies for the rule builder.
//!
//! A [`Helpers`] value is an explicit registry injected at builder-creation
//! time. Registering or removing a helper affects only builders created
//! with that value; there is no process-wide helper state.

use crate::builder::AttributeRules;
use crate::checks::{self, EmailOptions};
use crate::error::BuilderError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A helper: receives the current rule group and its arguments, and returns
/// the group. Argument problems are reported through
/// [`AttributeRules::fail`] so the chain stays fluent.
pub type HelperFn<T> = Arc<dyn Fn(AttributeRules<T>, &[Value]) -> AttributeRules<T> + Send + Sync>;

/// Registry of named helpers available to a builder's `apply`.
pub struct Helpers<T> {
    entries: HashMap<String, HelperFn<T>>,
}

impl<T> Helpers<T> {
    /// A registry with no vocabulary at all.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Install a helper under `name`, replacing any previous one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        helper: impl Fn(AttributeRules<T>, &[Value]) -> AttributeRules<T> + Send + Sync + 'static,
    ) {
        self.entries.insert(name.into(), Arc::new(helper));
    }

    /// Remove a helper; returns whether it was present.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&HelperFn<T>> {
        self.entries.get(name)
    }
}

impl<T> Helpers<T>
where
    T: Send + Sync + 'static,
{
    /// The stock vocabulary: `required`, `optional`, `email`, `min_length`,
    /// and `max_length`, layered over `when`/`using` and the bundled checks.
    pub fn standard() -> Self {
        let mut helpers = Self::empty();

        helpers.register("required", |group, args| match message_arg("required", args, 0) {
            Ok(message) => group.using(&[], checks::present(), message),
            Err(error) => group.fail(error),
        });

        helpers.register("optional", |group, _args| group.when(&[], checks::present()));

        helpers.register("email", |group, args| {
            let message = match message_arg("email", args, 0) {
                Ok(message) => message,
                Err(error) => return group.fail(error),
            };
            let options = match args.get(1) {
                None | Some(Value::Null) => EmailOptions::default(),
                Some(raw) => match serde_json::from_value(raw.clone()) {
                    Ok(options) => options,
                    Err(err) => {
                        return group.fail(BuilderError::HelperArgs {
                            helper: "email".to_string(),
                            reason: format!("takes an options object: {err}"),
                        })
                    }
                },
            };
            group.using(&[], checks::email(options), message)
        });

        helpers.register("min_length", |group, args| {
            match length_arg("min_length", args)
                .and_then(|length| Ok((length, message_arg("min_length", args, 1)?)))
            {
                Ok((length, message)) => group.using(&[], checks::min_length(length), message),
                Err(error) => group.fail(error),
            }
        });

        helpers.register("max_length", |group, args| {
            match length_arg("max_length", args)
                .and_then(|length| Ok((length, message_arg("max_length", args, 1)?)))
            {
                Ok((length, message)) => group.using(&[], checks::max_length(length), message),
                Err(error) => group.fail(error),
            }
        });

        helpers
    }
}

impl<T> Clone for Helpers<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T> Default for Helpers<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::standard()
    }
}

impl<T> fmt::Debug for Helpers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helpers")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn message_arg(helper: &str, args: &[Value], index: usize) -> Result<String, BuilderError> {
    match args.get(index) {
        Some(Value::String(message)) => Ok(message.clone()),
        _ => Err(BuilderError::HelperArgs {
            helper: helper.to_string(),
            reason: format!("expects a message string as argument {index}"),
        }),
    }
}

fn length_arg(helper: &str, args: &[Value]) -> Result<usize, BuilderError> {
    args.first()
        .and_then(Value::as_u64)
        .map(|length| length as usize)
        .ok_or_else(|| BuilderError::HelperArgs {
            helper: helper.to_string(),
            reason: "expects a length as its first argument".to_string(),
        })
}
