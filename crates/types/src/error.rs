use thiserror::Error;

/// Raised when an input value violates a documented invariant.
///
/// `field` names the offending input (e.g. `"dimensions.width"`), `rule`
/// states what was expected of it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid value for '{field}': {rule}")]
pub struct DataValidationError {
    pub field: String,
    pub rule: String,
}

impl DataValidationError {
    pub fn new(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
        }
    }
}
