//! Token types produced by the tokenizer.

use std::borrow::Cow;

use crate::Span;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Stream boundaries
    /// Start of the token stream (always the first token).
    StreamStart,
    /// End of the token stream (always the last token unless an error occurred).
    StreamEnd,
    /// Explicit `---` document marker.
    DocumentStart,

    // Block structure
    /// Start of an indented block sequence.
    BlockSequenceStart,
    /// Start of an indented block mapping.
    BlockMappingStart,
    /// End of the innermost open block collection.
    BlockEnd,
    /// `-` entry in a block sequence.
    BlockEntry,

    // Flow structure
    /// `[`
    FlowSequenceStart,
    /// `]`
    FlowSequenceEnd,
    /// `{`
    FlowMappingStart,
    /// `}`
    FlowMappingEnd,
    /// Start of an item in a flow sequence (emitted before every item).
    FlowEntry,

    // Mapping entries
    /// A mapping key follows.
    Key,
    /// `:` a mapping value follows.
    Value,

    // Content
    /// Scalar text (plain, single-quoted or double-quoted, already unescaped).
    Scalar,

    // Special tokens
    /// Tokenizer error; `text` holds the message.
    Error,
}

impl TokenKind {
    /// Whether this token opens a sequence (block or flow).
    pub fn is_sequence_start(&self) -> bool {
        matches!(
            self,
            TokenKind::BlockSequenceStart | TokenKind::FlowSequenceStart
        )
    }

    /// Whether this token opens a mapping (block or flow).
    pub fn is_mapping_start(&self) -> bool {
        matches!(
            self,
            TokenKind::BlockMappingStart | TokenKind::FlowMappingStart
        )
    }

    /// Whether this token closes the innermost collection or the stream.
    pub fn is_collection_end(&self) -> bool {
        matches!(
            self,
            TokenKind::BlockEnd
                | TokenKind::FlowSequenceEnd
                | TokenKind::FlowMappingEnd
                | TokenKind::StreamEnd
        )
    }

    /// Whether this token marks a sequence item boundary.
    pub fn is_entry(&self) -> bool {
        matches!(self, TokenKind::BlockEntry | TokenKind::FlowEntry)
    }
}

/// A token with its kind, span, and text.
///
/// For [`TokenKind::Scalar`] the text is the scalar content after quote
/// removal and escape processing; for [`TokenKind::Error`] it is the error
/// message. Structural tokens carry their source slice, or an empty string
/// when they are synthetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span in the source text.
    pub span: Span,
    /// The text of this token.
    pub text: Cow<'src, str>,
}

impl<'src> Token<'src> {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, text: impl Into<Cow<'src, str>>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }

    /// Create a token with no text, e.g. for building token streams by hand.
    pub fn bare(kind: TokenKind) -> Self {
        Self::new(kind, Span::default(), "")
    }

    /// Create a scalar token with the given content and no source position.
    pub fn scalar(text: impl Into<Cow<'src, str>>) -> Self {
        Self::new(TokenKind::Scalar, Span::default(), text)
    }
}
