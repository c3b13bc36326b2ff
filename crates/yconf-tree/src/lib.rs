#![doc = include_str!("../README.md")]
//! Document tree representation for yconf configuration files.
//!
//! This crate builds trees from token streams, resolves colon paths and
//! converts scalar text into typed values.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

mod access;
mod builder;
mod diagnostic;
mod node;
mod path;

pub use access::AccessError;
pub use builder::{BuildError, MalformedKind, Progress, TreeBuilder};
pub use node::{Children, Node, NodeId, NodeKind, Tree};
pub use path::LookupError;
pub use yconf_tokenizer::{Span, Token, TokenKind, Tokenizer};

/// Parse a yconf document into a tree.
pub fn parse(source: &str) -> Result<Tree, BuildError> {
    TreeBuilder::build(Tokenizer::new(source))
}

/// Read and parse a yconf file.
pub fn read_file(path: impl AsRef<Path>) -> Result<Tree, LoadError> {
    let source = std::fs::read_to_string(path)?;
    Ok(parse(&source)?)
}

/// Error loading a document from a file or reader.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl Tree {
    /// Read and parse a document from a reader.
    pub fn read<R: Read>(mut reader: R) -> Result<Tree, LoadError> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(parse(&source)?)
    }
}

impl FromStr for Tree {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[cfg(test)]
mod tests;
