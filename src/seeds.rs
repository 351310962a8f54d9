//! Seed list loading
//!
//! The seed list is a plain-text file with one URL per line. Lines are
//! trimmed, blank lines are skipped, and duplicates collapse into one entry.

use crate::HarvestError;
use std::collections::BTreeSet;
use std::path::Path;

/// The fixed input batch of a crawl
///
/// Immutable once loaded. Iteration order is lexicographic, which has no
/// bearing on crawl order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSet {
    urls: BTreeSet<String>,
}

impl SeedSet {
    /// Reads a seed list from disk
    pub fn load(path: &Path) -> Result<Self, HarvestError> {
        let content = std::fs::read_to_string(path).map_err(|source| HarvestError::Seeds {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// Parses seed list text
    pub fn parse(content: &str) -> Self {
        content.lines().collect()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for SeedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let urls = iter
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self { urls }
    }
}
