//! Digest entries produced by the crawl
//!
//! A [`DigestEntry`] is the unit of crawl output: one article with its title,
//! summary text, author and source URL.

use thiserror::Error;

/// Maximum title length in characters
pub const MAX_TITLE_LEN: usize = 256;

/// Maximum summary length in characters
pub const MAX_SUMMARY_LEN: usize = 5000;

/// Maximum author length in characters
pub const MAX_AUTHOR_LEN: usize = 256;

/// Maximum source URL length in characters
pub const MAX_SOURCE_URL_LEN: usize = 1000;

/// Field constraint violations reported by [`DigestEntry::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("Title must not be blank")]
    BlankTitle,

    #[error("Source URL must not be empty")]
    MissingSourceUrl,

    #[error("{field} must be at most {max} characters long, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// One extracted article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEntry {
    pub title: String,
    pub summary: String,
    /// Empty when the site does not credit an author
    pub author: String,
    pub source_url: String,
}

impl DigestEntry {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        author: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            author: author.into(),
            source_url: source_url.into(),
        }
    }

    /// Checks the length and presence limits enforced by persistence
    pub fn validate(&self) -> Result<(), EntryError> {
        if self.title.trim().is_empty() {
            return Err(EntryError::BlankTitle);
        }
        if self.source_url.is_empty() {
            return Err(EntryError::MissingSourceUrl);
        }

        check_len("title", &self.title, MAX_TITLE_LEN)?;
        check_len("summary", &self.summary, MAX_SUMMARY_LEN)?;
        check_len("author", &self.author, MAX_AUTHOR_LEN)?;
        check_len("source_url", &self.source_url, MAX_SOURCE_URL_LEN)?;

        Ok(())
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), EntryError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(EntryError::TooLong { field, max, actual });
    }
    Ok(())
}
