//! Tree builder from tokens.
//!
//! The builder keeps a single cursor into the tree under construction plus
//! the role the next scalar plays. There is no separate stack: closing a
//! collection moves the cursor to the parent of the current node.

use std::borrow::Cow;
use std::fmt;

use tracing::{debug, trace};
use yconf_tokenizer::{Span, Token, TokenKind};

use crate::node::{NodeId, NodeKind, Payload, Tree};

/// Error during tree building.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A token arrived that does not fit the tree built so far.
    #[error("malformed document: {reason}")]
    Malformed {
        /// What was wrong.
        reason: MalformedKind,
        /// The offending token.
        span: Span,
    },
    /// The tokens ran out before the root collection was closed.
    #[error("unexpected end of input")]
    PrematureEnd,
    /// The tokenizer rejected the input.
    #[error("{message}")]
    Scan {
        /// Tokenizer message.
        message: String,
        /// Where the tokenizer gave up.
        span: Span,
    },
}

impl BuildError {
    /// Source location of the error, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            BuildError::Malformed { span, .. } | BuildError::Scan { span, .. } => Some(*span),
            BuildError::PrematureEnd => None,
        }
    }
}

/// Why a token sequence was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// A second key scalar for the same entry.
    KeyAlreadySet,
    /// A second value scalar for the same node.
    ValueAlreadySet,
    /// A scalar with no preceding key, value or entry marker.
    ScalarWithoutRole,
    /// A scalar value for a node that is already a list or dict.
    ValueOnContainer,
    /// A scalar value for the root.
    ScalarAtRoot,
    /// A key marker where no dict is open.
    KeyOutsideMapping,
    /// A key marker directly inside a list.
    KeyInSequence,
    /// An entry marker on a node that is not (and cannot become) a list.
    EntryOutsideSequence,
    /// A collection in key position.
    CollectionAfterKey,
    /// A collection for a node that already has scalar text.
    CollectionOnScalar,
    /// A list start on a dict or a dict start on a list.
    CollectionKindConflict,
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            MalformedKind::KeyAlreadySet => "entry already has a key",
            MalformedKind::ValueAlreadySet => "node already has a value",
            MalformedKind::ScalarWithoutRole => "scalar is neither a key nor a value",
            MalformedKind::ValueOnContainer => "scalar value given to a collection",
            MalformedKind::ScalarAtRoot => "document root must be a list or a mapping",
            MalformedKind::KeyOutsideMapping => "key outside of a mapping",
            MalformedKind::KeyInSequence => "key inside a sequence",
            MalformedKind::EntryOutsideSequence => "sequence entry outside of a sequence",
            MalformedKind::CollectionAfterKey => "collections cannot be used as keys",
            MalformedKind::CollectionOnScalar => "collection given to a node that has a value",
            MalformedKind::CollectionKindConflict => "sequence and mapping mixed in one node",
        };
        f.write_str(msg)
    }
}

/// Whether the document is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// More tokens are needed.
    Continue,
    /// The root collection is closed. Further tokens are ignored.
    Done,
}

/// What the next scalar is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    None,
    Key,
    Value,
}

/// Builder that constructs a tree from tokens.
pub struct TreeBuilder {
    tree: Tree,
    cursor: NodeId,
    role: Role,
    finished: bool,
}

impl TreeBuilder {
    /// Create a new tree builder.
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            cursor: NodeId::ROOT,
            role: Role::None,
            finished: false,
        }
    }

    /// Build a tree from a complete token stream.
    ///
    /// Tokens after the root closes are drained so that a tokenizer error
    /// reported behind the root still fails the build.
    pub fn build<'src, I>(tokens: I) -> Result<Tree, BuildError>
    where
        I: IntoIterator<Item = Token<'src>>,
    {
        let mut builder = TreeBuilder::new();
        for token in tokens {
            builder
                .token(token)
                .inspect_err(|err| debug!("build failed: {err}"))?;
        }
        let tree = builder.finish()?;
        debug!(nodes = tree.node_count(), "build finished");
        Ok(tree)
    }

    /// Whether the root collection has been closed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one token.
    pub fn token(&mut self, token: Token<'_>) -> Result<Progress, BuildError> {
        trace!(
            kind = ?token.kind,
            key = ?self.tree.data(self.cursor).key,
            "token"
        );

        let Token { kind, span, text } = token;
        if kind == TokenKind::Error {
            return Err(BuildError::Scan {
                message: text.into_owned(),
                span,
            });
        }
        if self.finished {
            return Ok(Progress::Done);
        }

        match kind {
            kind if kind.is_sequence_start() => self.start_collection(NodeKind::List, span)?,
            kind if kind.is_mapping_start() => self.start_collection(NodeKind::Dict, span)?,
            kind if kind.is_collection_end() => return Ok(self.end_collection()),
            kind if kind.is_entry() => self.entry(span)?,
            TokenKind::Key => self.key(span)?,
            TokenKind::Value => self.value(),
            TokenKind::Scalar => self.scalar(text, span)?,
            _ => {}
        }
        Ok(Progress::Continue)
    }

    /// Finish building and return the tree.
    pub fn finish(self) -> Result<Tree, BuildError> {
        if !self.finished {
            return Err(BuildError::PrematureEnd);
        }
        let mut tree = self.tree;
        tree.normalize();
        Ok(tree)
    }

    fn malformed<T>(&self, reason: MalformedKind, span: Span) -> Result<T, BuildError> {
        Err(BuildError::Malformed { reason, span })
    }

    fn payload(&self) -> &Payload {
        &self.tree.data(self.cursor).payload
    }

    fn set_payload(&mut self, payload: Payload) {
        self.tree.data_mut(self.cursor).payload = payload;
    }

    fn start_collection(&mut self, kind: NodeKind, span: Span) -> Result<(), BuildError> {
        if self.role == Role::Key {
            return self.malformed(MalformedKind::CollectionAfterKey, span);
        }
        match (self.payload(), kind) {
            (Payload::Scalar(Some(_)), _) => {
                return self.malformed(MalformedKind::CollectionOnScalar, span);
            }
            (Payload::List(_), NodeKind::Dict) | (Payload::Dict(_), NodeKind::List) => {
                return self.malformed(MalformedKind::CollectionKindConflict, span);
            }
            (Payload::List(_), _) | (Payload::Dict(_), _) => {}
            (Payload::Unset | Payload::Scalar(None), NodeKind::List) => {
                self.set_payload(Payload::List(Vec::new()));
            }
            (Payload::Unset | Payload::Scalar(None), _) => {
                self.set_payload(Payload::Dict(Vec::new()));
            }
        }
        self.role = Role::None;
        Ok(())
    }

    fn end_collection(&mut self) -> Progress {
        self.role = Role::None;
        match self.tree.data(self.cursor).parent {
            Some(parent) => {
                self.cursor = parent;
                Progress::Continue
            }
            None => {
                self.finished = true;
                Progress::Done
            }
        }
    }

    fn entry(&mut self, span: Span) -> Result<(), BuildError> {
        match self.payload() {
            Payload::List(_) => {}
            Payload::Unset | Payload::Scalar(None) => self.set_payload(Payload::List(Vec::new())),
            Payload::Scalar(Some(_)) | Payload::Dict(_) => {
                return self.malformed(MalformedKind::EntryOutsideSequence, span);
            }
        }
        self.cursor = self.tree.append_child(self.cursor, span);
        self.role = Role::Value;
        Ok(())
    }

    fn key(&mut self, span: Span) -> Result<(), BuildError> {
        match self.payload() {
            Payload::Dict(_) => {}
            Payload::List(_) => return self.malformed(MalformedKind::KeyInSequence, span),
            Payload::Unset | Payload::Scalar(_) => {
                return self.malformed(MalformedKind::KeyOutsideMapping, span);
            }
        }
        self.cursor = self.tree.append_child(self.cursor, span);
        self.set_payload(Payload::Scalar(None));
        self.role = Role::Key;
        Ok(())
    }

    fn value(&mut self) {
        self.role = Role::Value;
        if *self.payload() == Payload::Unset {
            self.set_payload(Payload::Scalar(None));
        }
    }

    fn scalar(&mut self, text: Cow<'_, str>, span: Span) -> Result<(), BuildError> {
        match self.role {
            Role::Key => {
                let node = self.tree.data_mut(self.cursor);
                if node.key.is_some() {
                    return self.malformed(MalformedKind::KeyAlreadySet, span);
                }
                trace!(key = %text, "key");
                node.key = Some(text.into_owned());
                node.span = span;
                Ok(())
            }
            Role::Value => {
                let Some(parent) = self.tree.data(self.cursor).parent else {
                    return self.malformed(MalformedKind::ScalarAtRoot, span);
                };
                match self.payload() {
                    Payload::Unset | Payload::Scalar(None) => {}
                    Payload::Scalar(Some(_)) => {
                        return self.malformed(MalformedKind::ValueAlreadySet, span);
                    }
                    Payload::List(_) | Payload::Dict(_) => {
                        return self.malformed(MalformedKind::ValueOnContainer, span);
                    }
                }
                let node = self.tree.data_mut(self.cursor);
                node.payload = Payload::Scalar(Some(text.into_owned()));
                node.span = if node.key.is_some() {
                    Span::new(node.span.start, node.span.end.max(span.end))
                } else {
                    span
                };
                self.cursor = parent;
                self.role = Role::None;
                Ok(())
            }
            Role::None => self.malformed(MalformedKind::ScalarWithoutRole, span),
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn bare(kind: TokenKind) -> Token<'static> {
        Token::bare(kind)
    }

    fn scalar(text: &'static str) -> Token<'static> {
        Token::scalar(text)
    }

    fn entry(key: &'static str, value: &'static str) -> Vec<Token<'static>> {
        vec![bare(Key), scalar(key), bare(Value), scalar(value)]
    }

    fn mapping(entries: Vec<Vec<Token<'static>>>) -> Vec<Token<'static>> {
        let mut tokens = vec![bare(BlockMappingStart)];
        tokens.extend(entries.into_iter().flatten());
        tokens.push(bare(BlockEnd));
        tokens
    }

    fn stream(body: Vec<Token<'static>>) -> Vec<Token<'static>> {
        let mut tokens = vec![bare(StreamStart)];
        tokens.extend(body);
        tokens.push(bare(StreamEnd));
        tokens
    }

    fn malformed(tokens: Vec<Token<'static>>) -> MalformedKind {
        match TreeBuilder::build(tokens) {
            Err(BuildError::Malformed { reason, .. }) => reason,
            other => panic!("expected a malformed error, got {other:?}"),
        }
    }

    #[test]
    fn test_flat_mapping() {
        let tree = TreeBuilder::build(stream(mapping(vec![
            entry("a", "1"),
            entry("b", "2"),
        ])))
        .unwrap();
        let keys: Vec<_> = tree.root().children().map(|c| c.key()).collect();
        assert_eq!(keys, vec![Some("a"), Some("b")]);
    }

    #[test]
    fn test_nested_containers_return_to_parent() {
        let mut tokens = vec![bare(BlockMappingStart), bare(Key), scalar("list"), bare(Value)];
        tokens.extend([
            bare(FlowSequenceStart),
            bare(FlowEntry),
            scalar("x"),
            bare(FlowEntry),
            bare(FlowMappingStart),
        ]);
        tokens.extend(entry("k", "v"));
        tokens.extend([bare(FlowMappingEnd), bare(FlowSequenceEnd)]);
        tokens.extend(entry("after", "1"));
        tokens.push(bare(BlockEnd));

        let tree = TreeBuilder::build(stream(tokens)).unwrap();
        assert_eq!(format!("{tree:?}"), r#"{"list": ["x", {"k": "v"}], "after": "1"}"#);
    }

    #[test]
    fn test_empty_stream_is_empty_dict() {
        let tree = TreeBuilder::build(stream(vec![])).unwrap();
        assert!(tree.root().is_dict());
        assert_eq!(tree.root().child_count(), 0);
    }

    #[test]
    fn test_value_without_text_is_empty_scalar() {
        let tokens = stream(vec![
            bare(BlockMappingStart),
            bare(Key),
            scalar("a"),
            bare(Value),
            bare(BlockEnd),
        ]);
        // The block end closes the value-less entry, the stream end the root.
        let tree = TreeBuilder::build(tokens).unwrap();
        let child = tree.root().children().next().unwrap();
        assert_eq!(child.scalar_text(), Some(""));
    }

    #[test]
    fn test_premature_end() {
        let tokens = vec![bare(StreamStart), bare(BlockMappingStart), bare(Key)];
        assert_eq!(TreeBuilder::build(tokens), Err(BuildError::PrematureEnd));
        assert_eq!(TreeBuilder::build(Vec::new()), Err(BuildError::PrematureEnd));
    }

    #[test]
    fn test_tokens_after_done_are_ignored() {
        let mut builder = TreeBuilder::new();
        for token in mapping(vec![entry("a", "1")]) {
            builder.token(token).unwrap();
        }
        assert!(builder.is_finished());
        assert_eq!(builder.token(scalar("junk")), Ok(Progress::Done));
        assert!(matches!(
            builder.token(Token::new(Error, Span::new(3, 4), "bad")),
            Err(BuildError::Scan { .. })
        ));
    }

    #[test]
    fn test_scan_error_aborts() {
        let tokens = vec![
            bare(StreamStart),
            bare(BlockMappingStart),
            Token::new(Error, Span::new(2, 3), "tabs are not allowed"),
        ];
        assert_eq!(
            TreeBuilder::build(tokens),
            Err(BuildError::Scan {
                message: "tabs are not allowed".into(),
                span: Span::new(2, 3),
            })
        );
    }

    #[test]
    fn test_malformed_sequences() {
        assert_eq!(
            malformed(stream(vec![bare(BlockMappingStart), scalar("x")])),
            MalformedKind::ScalarWithoutRole
        );
        assert_eq!(
            malformed(stream(vec![bare(Key)])),
            MalformedKind::KeyOutsideMapping
        );
        assert_eq!(
            malformed(stream(vec![bare(BlockSequenceStart), bare(Key)])),
            MalformedKind::KeyInSequence
        );
        assert_eq!(
            malformed(stream(vec![bare(BlockMappingStart), bare(BlockEntry)])),
            MalformedKind::EntryOutsideSequence
        );
        assert_eq!(
            malformed(stream(vec![bare(BlockMappingStart), bare(Key), bare(FlowSequenceStart)])),
            MalformedKind::CollectionAfterKey
        );
        assert_eq!(
            malformed(stream(vec![bare(BlockMappingStart), bare(FlowSequenceStart)])),
            MalformedKind::CollectionKindConflict
        );
        assert_eq!(
            malformed(stream(vec![bare(Value), scalar("top")])),
            MalformedKind::ScalarAtRoot
        );
        assert_eq!(
            malformed(stream(vec![
                bare(BlockMappingStart),
                bare(Key),
                scalar("a"),
                scalar("b"),
            ])),
            MalformedKind::KeyAlreadySet
        );
        assert_eq!(
            malformed(stream(vec![
                bare(BlockMappingStart),
                bare(Key),
                scalar("a"),
                bare(Value),
                bare(FlowSequenceStart),
                bare(Value),
                scalar("x"),
            ])),
            MalformedKind::ValueOnContainer
        );
    }

    #[test]
    fn test_spans_cover_key_and_value() {
        let tokens = vec![
            bare(StreamStart),
            bare(BlockMappingStart),
            bare(Key),
            Token::new(Scalar, Span::new(0, 3), "key"),
            Token::new(Value, Span::new(3, 4), ":"),
            Token::new(Scalar, Span::new(5, 10), "value"),
            bare(BlockEnd),
        ];
        let tree = TreeBuilder::build(tokens).unwrap();
        let child = tree.root().children().next().unwrap();
        assert_eq!(child.span(), Span::new(0, 10));
    }
}
