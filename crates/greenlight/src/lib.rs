//! # Greenlight
//!
//! Dependency-aware asynchronous object validation.
//!
//! Rules are registered per attribute through a fluent builder: pick an
//! attribute with `validates`, optionally gate its rules behind asynchronous
//! conditions with `when`, commit predicates with `using`, and `build()` the
//! resulting [`ObjectValidator`]. Declaring a rule or condition against
//! other attributes also wires dependency edges, so validating one attribute
//! cascades into everything that depends on it. A single `validate` call
//! resolves the whole applicable rule set concurrently and folds it into one
//! [`ValidationReport`].
//!
//! ## Features
//!
//! - Sync and async predicates over `serde_json::Value` attribute values
//! - Conditional rules (`when`) with dependency-driven cascading
//! - Cycle-tolerant dependency resolution (each attribute resolves once)
//! - Pluggable property access for custom object models
//! - An extensible, injected helper vocabulary (`required`, `optional`,
//!   `email`, `min_length`, `max_length`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use greenlight::prelude::*;
//! use serde_json::json;
//!
//! let validator = validator()
//!     .validates("email")
//!         .using(&[], checks::email(Default::default()), "invalid email")
//!     .validates("spouse_name")
//!         .when_fn(&["marital_status"], |values, _, _| Ok(values[0] == "married"))
//!         .apply("required", &[json!("required")])
//!     .build()?;
//!
//! let report = validator
//!     .validate(&json!({ "email": "a@b.com", "marital_status": "single" }))
//!     .await?;
//! assert!(report.is_valid());
//! ```

mod access;
mod builder;
mod config;
mod error;
mod helpers;
mod predicate;
mod report;
mod validator;

pub mod checks;

pub use access::PropertyAccess;
pub use builder::{validator, AttributeRules, ValidatorBuilder};
pub use config::{Accessor, ValidatorConfig};
pub use error::BuilderError;
pub use helpers::{HelperFn, Helpers};
pub use predicate::{FnPredicate, Predicate, PredicateError, PredicateResult};
pub use report::ValidationReport;
pub use validator::ObjectValidator;

/// Prelude: the working vocabulary in one import.
pub mod prelude {
    pub use crate::access::PropertyAccess;
    pub use crate::builder::{validator, AttributeRules, ValidatorBuilder};
    pub use crate::checks;
    pub use crate::config::ValidatorConfig;
    pub use crate::error::BuilderError;
    pub use crate::helpers::Helpers;
    pub use crate::predicate::{FnPredicate, Predicate, PredicateError, PredicateResult};
    pub use crate::report::ValidationReport;
    pub use crate::validator::ObjectValidator;
}
