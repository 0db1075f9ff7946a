//! Field-level validation errors for board entities.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure raised before any write reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace only.
    BlankField {
        entity: &'static str,
        field: &'static str,
    },
    /// Text field exceeds its column width (in characters).
    TooLong {
        entity: &'static str,
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// A comment was attached to an article that has no id yet.
    UnpersistedArticle,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { entity, field } => {
                write!(f, "{entity}.{field} must not be blank")
            }
            Self::TooLong {
                entity,
                field,
                max,
                actual,
            } => write!(
                f,
                "{entity}.{field} must be at most {max} characters, got {actual}"
            ),
            Self::UnpersistedArticle => {
                write!(f, "comment must reference a persisted article")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_not_blank(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_max_chars(
    entity: &'static str,
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            entity,
            field,
            max,
            actual,
        });
    }
    Ok(())
}
