//! Schema handling for the credit-application table.
//!
//! Column naming lives in [`columns`]; [`normalize`] casts raw input into the
//! two physical types the engine works with (`Float64` and `Utf8`).

pub mod columns;
pub mod normalize;

use arrow::datatypes::{DataType, Schema};
use serde::Serialize;

use crate::error::{DashboardError, Result};

pub use normalize::normalize_batch;

/// Logical role of a column in the derived dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnKind {
    /// Row identifier, never a feature
    Identifier,
    /// The 0/1 default flag
    Target,
    /// Numeric feature (`Float64`)
    Numeric,
    /// Categorical feature (`Utf8`)
    Categorical,
}

impl ColumnKind {
    /// Classify a column from its name and physical type
    #[must_use]
    pub fn classify(name: &str, data_type: &DataType) -> Self {
        if name == columns::SK_ID_CURR {
            Self::Identifier
        } else if name == columns::TARGET {
            Self::Target
        } else if is_numeric(data_type) {
            Self::Numeric
        } else {
            Self::Categorical
        }
    }

    /// Whether the column takes part in numeric aggregates and correlations
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Numeric | Self::Target)
    }
}

/// Whether an Arrow type is handled as a number
#[must_use]
pub const fn is_numeric(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
    )
}

/// Check that every named column is present, failing on the first absent one
///
/// # Errors
/// Returns [`DashboardError::MissingColumn`] naming the first absent column
pub fn require_columns(schema: &Schema, required: &[&str]) -> Result<()> {
    for column in required {
        if schema.index_of(column).is_err() {
            return Err(DashboardError::missing_column(*column));
        }
    }
    Ok(())
}

/// Check that a column is present and numeric
pub fn require_numeric(schema: &Schema, column: &str) -> Result<()> {
    let field = schema
        .field_with_name(column)
        .map_err(|_| DashboardError::missing_column(column))?;
    if is_numeric(field.data_type()) {
        Ok(())
    } else {
        Err(DashboardError::ColumnType {
            column: column.to_string(),
            expected: "numeric",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::Field;

    #[test]
    fn require_columns_names_first_missing() {
        let schema = Schema::new(vec![
            Field::new(columns::TARGET, DataType::Int64, false),
            Field::new(columns::DAYS_BIRTH, DataType::Int64, false),
        ]);
        let err = require_columns(&schema, &columns::REQUIRED_RAW).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::MissingColumn { ref column } if column == columns::DAYS_EMPLOYED
        ));
    }

    #[test]
    fn classification_respects_reserved_names() {
        assert_eq!(
            ColumnKind::classify(columns::SK_ID_CURR, &DataType::Int64),
            ColumnKind::Identifier
        );
        assert_eq!(
            ColumnKind::classify(columns::TARGET, &DataType::Float64),
            ColumnKind::Target
        );
        assert_eq!(
            ColumnKind::classify("FLAG_OWN_CAR", &DataType::Utf8),
            ColumnKind::Categorical
        );
        assert_eq!(
            ColumnKind::classify("CNT_CHILDREN", &DataType::Int64),
            ColumnKind::Numeric
        );
    }
}
