//! Utility functions for error handling
//!
//! File access helpers that turn bare IO failures into messages naming the
//! path and the reason the file was needed.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::Result;

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
///
/// # Returns
/// * `Result<fs::File>` - The opened file or a detailed error
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("File not found: {} (needed for: {purpose})", path.display()),
        )
        .into());
    }

    if !path.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Path is not a file: {} (expected a file for: {purpose})", path.display()),
        )
        .into());
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "Permission denied - check file permissions",
            _ => "Failed to open file",
        };
        io::Error::new(
            e.kind(),
            format!("{context}: {} ({purpose}): {e}", path.display()),
        )
        .into()
    })
}

/// Safely read a file to string with rich error information
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    let mut file = safe_open_file(path, purpose)?;

    let mut content = String::new();
    io::Read::read_to_string(&mut file, &mut content).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::InvalidData => "File contains invalid UTF-8 data - cannot read as text",
            _ => "Failed to read file content",
        };
        io::Error::new(e.kind(), format!("{context}: {} ({purpose})", path.display()))
    })?;

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_names_path_and_purpose() {
        let err = safe_open_file(Path::new("/definitely/not/here.csv"), "dataset load")
            .expect_err("missing file must fail");
        let message = err.to_string();
        assert!(message.contains("/definitely/not/here.csv"));
        assert!(message.contains("dataset load"));
    }
}
