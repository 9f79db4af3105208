//! Core types for refbook.

mod directory;
mod element;
mod version;

pub use directory::*;
pub use element::*;
pub use version::*;

use crate::error::{RefbookError, RefbookResult};

/// Reject blank values and values longer than `max_chars` characters.
pub(crate) fn check_field(field: &str, value: &str, max_chars: usize) -> RefbookResult<()> {
    if value.trim().is_empty() {
        return Err(RefbookError::validation(format!("{} must not be blank", field)));
    }
    if value.chars().count() > max_chars {
        return Err(RefbookError::validation(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(())
}
