//! Caption templates and character budgets

use serde::{Deserialize, Serialize};

use crate::{CaptionError, Result};

/// How the raw caption becomes the rendered text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CaptionTemplate {
    /// Caption is rendered as typed
    #[default]
    Plain,
    /// Caption follows a fixed prefix, e.g. "Awarded to "
    Prefixed { prefix: String },
}

impl CaptionTemplate {
    /// Build the display text for a caption
    ///
    /// The caption is trimmed; an empty caption composes to an empty string
    /// so nothing is drawn, prefix included.
    pub fn compose(&self, caption: &str) -> String {
        let caption = caption.trim();
        if caption.is_empty() {
            return String::new();
        }
        match self {
            CaptionTemplate::Plain => caption.to_string(),
            CaptionTemplate::Prefixed { prefix } => format!("{prefix}{caption}"),
        }
    }
}

/// Character limit for a caption input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharBudget {
    limit: usize,
    #[serde(default = "default_warn_margin")]
    warn_margin: usize,
}

fn default_warn_margin() -> usize {
    5
}

/// Snapshot of caption length against its budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionCounter {
    pub length: usize,
    pub limit: usize,
    pub near_limit: bool,
}

impl CharBudget {
    /// Create a budget; the limit must be positive
    pub fn new(limit: usize, warn_margin: usize) -> Result<Self> {
        if limit == 0 {
            return Err(CaptionError::InvalidBudget { limit, warn_margin });
        }
        Ok(Self { limit, warn_margin })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn warn_margin(&self) -> usize {
        self.warn_margin
    }

    /// Truncate `text` to at most `limit` characters
    pub fn clamp<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.limit) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// Counter for `text`, counted in characters
    pub fn counter(&self, text: &str) -> CaptionCounter {
        let length = text.chars().count();
        CaptionCounter {
            length,
            limit: self.limit,
            near_limit: length > self.limit.saturating_sub(self.warn_margin),
        }
    }
}

impl Default for CharBudget {
    fn default() -> Self {
        Self {
            limit: 80,
            warn_margin: default_warn_margin(),
        }
    }
}

impl std::fmt::Display for CaptionCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.length, self.limit)
    }
}
