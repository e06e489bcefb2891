//! Author blacklist.
//!
//! Read on every dispatch, written only by administrative calls. Backed by a
//! sharded concurrent set so admin updates never block in-flight dispatches.
//! An add racing with a message already being dispatched may or may not
//! suppress that message.

use dashmap::DashSet;
use tracing::info;

/// Set of author ids whose messages are dropped before any parsing.
#[derive(Debug, Default)]
pub struct Blacklist {
    authors: DashSet<String>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a blacklist seeded with `authors`.
    pub fn with_authors<I, S>(authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = Self::new();
        for author in authors {
            list.authors.insert(author.into());
        }
        list
    }

    #[inline]
    pub fn contains(&self, author_id: &str) -> bool {
        self.authors.contains(author_id)
    }

    /// Add an author. Returns `false` if already present.
    pub fn add(&self, author_id: impl Into<String>) -> bool {
        let author_id = author_id.into();
        info!(author = %author_id, "Author blacklisted");
        self.authors.insert(author_id)
    }

    /// Remove an author. Returns `false` if not present.
    pub fn remove(&self, author_id: &str) -> bool {
        let removed = self.authors.remove(author_id).is_some();
        if removed {
            info!(author = %author_id, "Author removed from blacklist");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// Clone the current contents, sorted (guards drop immediately).
    pub fn snapshot(&self) -> Vec<String> {
        let mut authors: Vec<String> = self.authors.iter().map(|a| a.key().clone()).collect();
        authors.sort_unstable();
        authors
    }
}
