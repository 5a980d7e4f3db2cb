//! Error types for inventory operations
//!
//! Every failure the core can report is one of these variants, so the
//! caller can render a distinct message for each kind.

use thiserror::Error;

use crate::models::Field;

/// A raw form payload that cannot become a spare part
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are empty after trimming
    #[error("All fields are required (missing: {})", join_fields(.0))]
    MissingFields(Vec<Field>),

    /// Price or stock text is not a number of the right shape
    #[error("{field} must be {}, got '{value}'", expected_number(.field))]
    InvalidNumber { field: Field, value: String },
}

impl ValidationError {
    /// The fields this error is about
    pub fn fields(&self) -> Vec<Field> {
        match self {
            ValidationError::MissingFields(fields) => fields.clone(),
            ValidationError::InvalidNumber { field, .. } => vec![*field],
        }
    }
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn expected_number(field: &Field) -> &'static str {
    match field {
        Field::Stock => "a non-negative whole number",
        _ => "a non-negative number",
    }
}

/// Errors returned by the part controller
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A part with this ID is already stored
    #[error("Part with ID '{0}' already exists")]
    DuplicateKey(String),

    /// Update or delete was asked for without a part ID
    #[error("Part ID is required")]
    MissingKey,

    /// The form's part ID differs from the part being updated
    #[error("Part ID cannot be changed by an update (editing '{key}', form has '{part_id}')")]
    PartIdChange { key: String, part_id: String },

    /// A display line that does not split into the five list columns
    #[error("Malformed display line '{line}': {reason}")]
    MalformedLine { line: String, reason: String },

    /// The store failed (I/O, parse, SQL, lock timeout)
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_labels() {
        let err = ValidationError::MissingFields(vec![Field::Name, Field::Stock]);
        assert_eq!(
            err.to_string(),
            "All fields are required (missing: Part Name, Stock Quantity)"
        );
    }

    #[test]
    fn test_invalid_number_message() {
        let err = ValidationError::InvalidNumber {
            field: Field::Stock,
            value: "12.5".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Stock Quantity must be a non-negative whole number, got '12.5'"
        );
        assert_eq!(err.fields(), vec![Field::Stock]);
    }

    #[test]
    fn test_validation_error_converts() {
        let err: InventoryError = ValidationError::MissingFields(vec![Field::PartId]).into();
        assert!(matches!(err, InventoryError::Validation(_)));
    }
}
