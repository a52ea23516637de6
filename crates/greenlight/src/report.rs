//! Aggregated validation results.

use serde::Serialize;
use std::collections::HashMap;

/// Outcome of one `validate` call: overall validity plus the per-attribute
/// failure messages.
///
/// Every attribute resolved during the call gets an entry; an empty message
/// list means it passed. `valid` holds exactly when every list is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    valid: bool,
    errors: HashMap<String, Vec<String>>,
}

impl ValidationReport {
    /// Fold the joined per-rule outcomes into one report. A `Some` message
    /// marks its attribute (and the report) as failed; a `None` only ensures
    /// the attribute is represented.
    pub(crate) fn collect(outcomes: Vec<(String, Option<String>)>) -> Self {
        let mut report = Self::default();
        for (attribute, message) in outcomes {
            let messages = report.errors.entry(attribute).or_default();
            if let Some(message) = message {
                messages.push(message);
                report.valid = false;
            }
        }
        report
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Failure messages recorded for `attribute`, in rule-registration
    /// order. Empty when the attribute passed or was never resolved.
    pub fn messages_for(&self, attribute: &str) -> &[String] {
        self.errors.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `attribute` was resolved during the call, passing or not.
    pub fn covers(&self, attribute: &str) -> bool {
        self.errors.contains_key(attribute)
    }

    /// The full attribute-to-messages mapping.
    pub fn errors(&self) -> &HashMap<String, Vec<String>> {
        &self.errors
    }
}

impl Default for ValidationReport {
    /// An empty report is vacuously valid.
    fn default() -> Self {
        Self {
            valid: true,
            errors: HashMap::new(),
        }
    }
}
