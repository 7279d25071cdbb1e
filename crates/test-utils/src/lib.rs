//! Shared test utilities for the spectrogram workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic audio generators
//! - Fake renderers with scripted outcomes
//! - Helpers for locating external programs and writing stand-in
//!   converter scripts
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../../crates/test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro to skip a test if a program is not installed.
///
/// # Usage
///
/// ```ignore
/// use test_utils::require_program;
///
/// #[tokio::test]
/// async fn test_real_sox() {
///     let sox = require_program!("sox");
///     // Test code using sox...
/// }
/// ```
///
/// If the program is not on `PATH`, the test prints a skip message and
/// returns early.
#[macro_export]
macro_rules! require_program {
    ($name:expr) => {{
        match $crate::find_program($name) {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: program '{}' not found on PATH.", $name);
                return;
            }
        }
    }};
}
