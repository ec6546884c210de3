//! Caption Text - caption processing for certificates
//!
//! This crate provides:
//! - Greedy word wrapping against any text-measuring function
//! - Caption templates (plain, or with a fixed prefix)
//! - Character budgets and the counter shown next to the input
//!
//! # Example
//!
//! ```
//! use caption_text::{wrap_words, CaptionTemplate, CharBudget};
//!
//! let budget = CharBudget::new(80, 5).unwrap();
//! let caption = budget.clamp("Ana Souza, for outstanding volunteer work");
//!
//! let text = CaptionTemplate::Plain.compose(caption);
//! // Pretend every character is 10px wide
//! let lines = wrap_words(&text, 200.0, |s| s.chars().count() as f32 * 10.0);
//! assert_eq!(lines, vec!["Ana Souza, for", "outstanding", "volunteer work"]);
//! ```

mod formatter;
mod wrap;

pub use formatter::{CaptionCounter, CaptionTemplate, CharBudget};
pub use wrap::wrap_words;

use thiserror::Error;

/// Errors that can occur during caption processing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptionError {
    #[error("Invalid character budget: limit {limit}, warning margin {warn_margin}")]
    InvalidBudget { limit: usize, warn_margin: usize },
}

/// Result type for caption operations
pub type Result<T> = std::result::Result<T, CaptionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_error_message() {
        let err = CharBudget::new(0, 5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid character budget: limit 0, warning margin 5"
        );
    }
}
