//! Shared utilities: Arrow helpers, file IO and logging.

pub mod arrow;
pub mod io;
pub mod logging;

pub use io::{InputFormat, load_batch};
pub use logging::{log_derivation, log_excluded_column, log_read_start, log_table_read};
