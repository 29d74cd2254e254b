//! Spinner shown while the application table loads and derives.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::store::Dataset;

const SPINNER_TEMPLATE: &str = "{spinner:.green} {elapsed_precise} {msg}";

/// Start a spinner naming the file being loaded
#[must_use]
pub fn load_spinner(path: &Path) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    let name = path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    pb.set_message(format!("Loading and deriving {name}..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Stop the spinner with the shape of the derived dataset
pub fn finish_load(pb: &ProgressBar, dataset: &Dataset) {
    pb.finish_with_message(format!(
        "Dataset ready: {} rows, {} columns, {} excluded",
        dataset.num_rows(),
        dataset.batch().num_columns(),
        dataset.report().excluded_columns.len()
    ));
}

/// Stop the spinner after a failed load
pub fn abandon_load(pb: &ProgressBar) {
    pb.abandon_with_message("Load failed");
}
