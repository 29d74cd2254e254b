//! View Resolver: applies a Filter State to the dataset.

use std::sync::Arc;

use arrow::array::BooleanArray;
use arrow::compute::and;
use log::debug;

use crate::error::Result;
use crate::filter::FilterState;
use crate::store::Dataset;
use crate::view::View;

/// Resolve the rows matching every active predicate
///
/// # Arguments
/// * `dataset` - The shared derived dataset
/// * `state` - The predicates to intersect
///
/// # Returns
/// A view holding the matching row indices in dataset order
///
/// # Errors
/// Returns an error if a predicate names a column of the wrong type
pub fn resolve(dataset: &Arc<Dataset>, state: &FilterState) -> Result<View> {
    let total = dataset.num_rows();
    let mut mask: Option<BooleanArray> = None;

    for predicate in state.predicates() {
        let next = predicate.evaluate(dataset.batch())?;
        mask = Some(match mask {
            Some(current) => and(&current, &next)?,
            None => next,
        });
    }

    let rows: Vec<u32> = match mask {
        // row count fits u32 for any table this engine loads
        Some(mask) => mask.values().set_indices().map(|i| i as u32).collect(),
        None => (0..total as u32).collect(),
    };

    debug!(
        "Resolved {} of {total} rows with {} active filters",
        rows.len(),
        state.len()
    );
    Ok(View::new(Arc::clone(dataset), rows))
}
