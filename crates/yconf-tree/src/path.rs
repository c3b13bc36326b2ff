//! Colon path lookups.
//!
//! A path is `first[:second]`. `first` names a key of the root, `second` a
//! key of that node. Anything after a second colon is ignored, and an empty
//! second segment (`first:`) stands for the first-level node itself.

use crate::access::AccessError;
use crate::node::{Node, Tree};

/// A path lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// No node at this path.
    #[error("`{path}` not found")]
    NotFound { path: String },
    /// The node exists but cannot be read as requested.
    #[error("`{path}`: {source}")]
    Access {
        path: String,
        #[source]
        source: AccessError,
    },
}

impl LookupError {
    fn not_found(path: &str) -> Self {
        LookupError::NotFound {
            path: path.to_string(),
        }
    }
}

fn at_path<T>(path: &str, result: Result<T, AccessError>) -> Result<T, LookupError> {
    result.map_err(|source| LookupError::Access {
        path: path.to_string(),
        source,
    })
}

impl Tree {
    /// Resolve a colon path to a node.
    ///
    /// Only the first top-level entry with a matching key is searched; a
    /// later entry with the same key is never consulted.
    pub fn resolve(&self, path: &str) -> Option<Node<'_>> {
        let mut segments = path.split(':');
        let first = segments.next()?;
        let top = self.root().children().find(|c| c.key() == Some(first))?;
        match segments.next() {
            Some(second) if !second.is_empty() => {
                top.children().find(|c| c.key() == Some(second))
            }
            _ => Some(top),
        }
    }

    /// Resolve a colon path, failing with [`LookupError::NotFound`].
    pub fn lookup(&self, path: &str) -> Result<Node<'_>, LookupError> {
        self.resolve(path)
            .ok_or_else(|| LookupError::not_found(path))
    }

    /// Scalar text at `path`.
    pub fn lookup_str(&self, path: &str) -> Result<&str, LookupError> {
        at_path(path, self.lookup(path)?.as_str())
    }

    /// Integer value at `path`.
    pub fn lookup_int(&self, path: &str) -> Result<i64, LookupError> {
        at_path(path, self.lookup(path)?.as_int())
    }

    /// Float value at `path`.
    pub fn lookup_float(&self, path: &str) -> Result<f64, LookupError> {
        at_path(path, self.lookup(path)?.as_float())
    }

    /// Boolean value at `path`.
    pub fn lookup_bool(&self, path: &str) -> Result<bool, LookupError> {
        at_path(path, self.lookup(path)?.as_bool())
    }

    /// Number of items of the list at `path`.
    pub fn lookup_list_len(&self, path: &str) -> Result<usize, LookupError> {
        at_path(path, self.lookup(path)?.list_len())
    }

    /// Item `index` of the list at `path`. An index past the end is reported
    /// as not found, with the index in the path.
    pub fn lookup_list_elt(&self, path: &str, index: usize) -> Result<Node<'_>, LookupError> {
        at_path(path, self.lookup(path)?.list_elt(index))?
            .ok_or_else(|| LookupError::not_found(&format!("{path}[{index}]")))
    }
}
