//! Logging helpers and progress spinners

pub mod log;
pub mod progress;

pub use log::{log_derivation, log_excluded_column, log_read_start, log_table_read};
pub use progress::{abandon_load, finish_load, load_spinner};
