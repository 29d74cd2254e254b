//! Arrow data handling utilities
//!
//! Helpers for locating and downcasting the columns of the derived batch.

pub mod array_utils;

pub use array_utils::{
    downcast_array, float_column, float_values, get_column_by_name, get_column_index,
    string_column, take_rows,
};
