//! Typed accessors on nodes.

use std::num::ParseIntError;

use crate::node::{Node, NodeKind};

/// A node could not be read as the requested type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("expected a scalar, found a {found}")]
    NotScalar { found: NodeKind },
    #[error("expected a list, found a {found}")]
    NotList { found: NodeKind },
    #[error("expected a list or dict, found a {found}")]
    NotContainer { found: NodeKind },
    #[error("`{text}` is not a valid integer")]
    InvalidInt {
        text: String,
        #[source]
        source: ParseIntError,
    },
    #[error("`{text}` is not a valid float")]
    InvalidFloat { text: String },
    #[error("`{text}` is not a valid boolean")]
    InvalidBool { text: String },
}

/// No boolean word is longer than this.
const MAX_BOOL_LEN: usize = 7;

const TRUE_WORDS: &[&str] = &["true", "on", "y", "1"];
const FALSE_WORDS: &[&str] = &["false", "off", "n", "0"];

impl<'t> Node<'t> {
    /// The text of a scalar.
    pub fn as_str(&self) -> Result<&'t str, AccessError> {
        self.scalar_text().ok_or(AccessError::NotScalar {
            found: self.kind(),
        })
    }

    /// A scalar as a signed base-10 integer.
    pub fn as_int(&self) -> Result<i64, AccessError> {
        let text = self.as_str()?;
        text.parse().map_err(|source| AccessError::InvalidInt {
            text: text.to_string(),
            source,
        })
    }

    /// A scalar as a float. Values that overflow to infinity are rejected.
    pub fn as_float(&self) -> Result<f64, AccessError> {
        let text = self.as_str()?;
        match text.parse::<f64>() {
            Ok(value) if !value.is_infinite() => Ok(value),
            _ => Err(AccessError::InvalidFloat {
                text: text.to_string(),
            }),
        }
    }

    /// A scalar as a boolean: `true`, `on`, `y`, `1` or `false`, `off`,
    /// `n`, `0`, in any case.
    pub fn as_bool(&self) -> Result<bool, AccessError> {
        let text = self.as_str()?;
        let invalid = || AccessError::InvalidBool {
            text: text.to_string(),
        };
        if text.len() > MAX_BOOL_LEN {
            return Err(invalid());
        }
        let is = |words: &[&str]| words.iter().any(|w| w.eq_ignore_ascii_case(text));
        if is(TRUE_WORDS) {
            Ok(true)
        } else if is(FALSE_WORDS) {
            Ok(false)
        } else {
            Err(invalid())
        }
    }

    /// Number of items in a list.
    pub fn list_len(&self) -> Result<usize, AccessError> {
        match self.kind() {
            NodeKind::List => Ok(self.child_count()),
            found => Err(AccessError::NotList { found }),
        }
    }

    /// The item of a list at `index`, or `None` when out of range.
    pub fn list_elt(&self, index: usize) -> Result<Option<Node<'t>>, AccessError> {
        self.list_len()?;
        Ok(self.children().nth(index))
    }

    /// The first child with the given key, or `None`.
    ///
    /// Keys are compared exactly. When a dict holds the same key twice, the
    /// earlier entry wins. List items have no key and never match.
    pub fn get(&self, key: &str) -> Result<Option<Node<'t>>, AccessError> {
        match self.kind() {
            NodeKind::List | NodeKind::Dict => {
                Ok(self.children().find(|child| child.key() == Some(key)))
            }
            found => Err(AccessError::NotContainer { found }),
        }
    }
}
