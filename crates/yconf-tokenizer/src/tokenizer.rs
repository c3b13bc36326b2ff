//! Tokenizer for yconf documents.
//!
//! The tokenizer works line by line in block context, tracking the column of
//! every open block collection, and switches to a recursive scan for flow
//! collections (`[...]`, `{...}`), which may span lines. Tokens for a line are
//! queued and handed out one at a time.

use std::borrow::Cow;
use std::collections::VecDeque;

use crate::scalar::{unescape_double, unescape_single};
use crate::{Span, Token, TokenKind};
use tracing::trace;

/// Kind of an open block collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Sequence,
    Mapping,
}

/// An open block collection and the column its entries start at.
#[derive(Debug, Clone, Copy)]
struct Indent {
    column: usize,
    kind: BlockKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Running,
    Done,
}

/// Whether a scalar is being scanned inside a flow collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Block,
    Flow,
}

/// A scan failure. Turned into a single `Error` token that ends the stream.
#[derive(Debug)]
struct ScanError {
    message: Cow<'static, str>,
    span: Span,
}

type ScanResult<T> = Result<T, ScanError>;

/// A tokenizer that produces tokens from configuration text.
#[derive(Clone)]
pub struct Tokenizer<'src> {
    /// The source text being tokenized.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,
    /// Byte position where the current line starts.
    line_start: u32,

    /// Open block collections, innermost last.
    indents: Vec<Indent>,
    /// Set after a `key:` or `-` with nothing else on the line. Resolved by
    /// the next content line: either nested content follows, or the value is
    /// an empty scalar.
    pending_value: Option<Span>,
    /// Whether the top-level node has started.
    root_opened: bool,
    /// Whether a `---` marker has been seen.
    document_marker_seen: bool,

    /// Tokens scanned but not yet handed out.
    queue: VecDeque<Token<'src>>,
    state: State,
}

impl<'src> Tokenizer<'src> {
    /// Create a new tokenizer for the given source text.
    pub fn new(source: &'src str) -> Self {
        let mut tokenizer = Self {
            source,
            remaining: source,
            pos: 0,
            line_start: 0,
            indents: Vec::new(),
            pending_value: None,
            root_opened: false,
            document_marker_seen: false,
            queue: VecDeque::new(),
            state: State::Start,
        };
        if tokenizer.starts_with("\u{feff}") {
            tokenizer.advance_by('\u{feff}'.len_utf8());
            tokenizer.line_start = tokenizer.pos;
        }
        tokenizer
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Peek at the next character without consuming it.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    /// Peek at the nth character (0-indexed) without consuming.
    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining.chars().nth(n)
    }

    /// Advance by one character and return it.
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        self.remaining = &self.remaining[c.len_utf8()..];
        Some(c)
    }

    /// Advance by n bytes.
    #[inline]
    fn advance_by(&mut self, n: usize) {
        self.pos += n as u32;
        self.remaining = &self.remaining[n..];
    }

    /// Check if the remaining text starts with the given prefix.
    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    /// Column of the current position, in bytes from the line start.
    #[inline]
    fn column(&self) -> usize {
        (self.pos - self.line_start) as usize
    }

    /// Span of the character at the current position.
    fn char_span(&self) -> Span {
        let len = self.peek().map_or(0, char::len_utf8) as u32;
        Span::new(self.pos, self.pos + len)
    }

    fn emit(&mut self, kind: TokenKind, span: Span, text: impl Into<Cow<'src, str>>) {
        let token = Token::new(kind, span, text);
        trace!("Token {:?} at {:?}: {:?}", token.kind, token.span, token.text);
        self.queue.push_back(token);
    }

    fn error<T>(&self, message: impl Into<Cow<'static, str>>, span: Span) -> ScanResult<T> {
        Err(ScanError {
            message: message.into(),
            span,
        })
    }

    fn error_here<T>(&self, message: impl Into<Cow<'static, str>>) -> ScanResult<T> {
        self.error(message, self.char_span())
    }

    /// Get the next token, or `None` once the stream has ended.
    pub fn next_token(&mut self) -> Option<Token<'src>> {
        loop {
            if let Some(token) = self.queue.pop_front() {
                if matches!(token.kind, TokenKind::Error | TokenKind::StreamEnd) {
                    self.queue.clear();
                    self.state = State::Done;
                }
                return Some(token);
            }

            match self.state {
                State::Start => {
                    self.state = State::Running;
                    self.emit(TokenKind::StreamStart, Span::empty(self.pos), "");
                }
                State::Running => {
                    if let Err(err) = self.scan_next() {
                        self.emit(TokenKind::Error, err.span, err.message.into_owned());
                    }
                }
                State::Done => return None,
            }
        }
    }

    /// Scan the next content line (or finish the stream at EOF).
    fn scan_next(&mut self) -> ScanResult<()> {
        self.skip_blank_lines();
        if self.is_eof() {
            self.finish_stream();
            return Ok(());
        }

        self.line_start = self.pos;
        let column = self.skip_indentation()?;
        if column == 0 && self.at_document_marker() {
            return self.scan_document_marker();
        }

        let is_entry = self.at_entry_indicator();
        let nested = self.resolve_pending_value(column, is_entry);
        if !nested {
            self.unroll(column, is_entry);
            self.check_indentation(column, is_entry)?;
        }

        let value_position = nested || self.indents.is_empty();
        self.scan_block_node(column, value_position)?;
        self.finish_line()
    }

    /// Skip empty lines, whitespace-only lines, and comment lines.
    fn skip_blank_lines(&mut self) {
        loop {
            let (pos, remaining) = (self.pos, self.remaining);
            self.skip_spaces();
            if self.peek() == Some('#') {
                self.skip_to_line_end();
            }
            if self.is_eof() {
                return;
            }
            if !self.eat_newline() {
                self.pos = pos;
                self.remaining = remaining;
                return;
            }
        }
    }

    /// Skip spaces and tabs.
    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.advance();
        }
    }

    fn skip_to_line_end(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.advance();
        }
    }

    /// Consume a line break if one is next.
    fn eat_newline(&mut self) -> bool {
        if self.peek() == Some('\n') {
            self.advance();
        } else if self.starts_with("\r\n") {
            self.advance_by(2);
        } else {
            return false;
        }
        self.line_start = self.pos;
        true
    }

    fn skip_indentation(&mut self) -> ScanResult<usize> {
        while self.peek() == Some(' ') {
            self.advance();
        }
        if self.peek() == Some('\t') {
            return self.error_here("tabs are not allowed in indentation");
        }
        Ok(self.column())
    }

    /// Whether only whitespace or a comment remains on this line.
    fn at_line_end(&self) -> bool {
        matches!(self.peek(), None | Some('\n' | '\r' | '#'))
    }

    fn at_document_marker(&self) -> bool {
        self.starts_with("---") && is_blank_or_end(self.peek_nth(3))
    }

    /// `-` followed by whitespace or the end of the line.
    fn at_entry_indicator(&self) -> bool {
        self.peek() == Some('-') && is_blank_or_end(self.peek_nth(1))
    }

    /// `:` that separates a key from its value.
    fn at_value_indicator(&self, context: Context) -> bool {
        self.peek() == Some(':') && is_value_indicator_end(self.peek_nth(1), context)
    }

    fn scan_document_marker(&mut self) -> ScanResult<()> {
        let start = self.pos;
        if self.root_opened || self.document_marker_seen {
            return self.error(
                "multiple documents are not supported",
                Span::new(start, start + 3),
            );
        }
        self.document_marker_seen = true;
        self.advance_by(3);
        self.emit(TokenKind::DocumentStart, Span::new(start, self.pos), "---");
        self.finish_line()
    }

    /// Decide what a dangling `key:` or `-` from an earlier line holds.
    ///
    /// Returns true when this line is nested content of that value. Otherwise
    /// the value is an empty scalar, which is emitted here, before any block
    /// ends produced by this line.
    fn resolve_pending_value(&mut self, column: usize, is_entry: bool) -> bool {
        let Some(span) = self.pending_value.take() else {
            return false;
        };
        let nested = self.indents.last().is_some_and(|top| {
            column > top.column
                || (top.kind == BlockKind::Mapping && top.column == column && is_entry)
        });
        if !nested {
            self.emit(TokenKind::Scalar, span, "");
        }
        nested
    }

    /// Close every block collection this line is not part of.
    fn unroll(&mut self, column: usize, is_entry: bool) {
        while let Some(top) = self.indents.last().copied() {
            let closes = top.column > column
                || (top.column == column && top.kind == BlockKind::Sequence && !is_entry);
            if !closes {
                break;
            }
            self.indents.pop();
            self.emit(TokenKind::BlockEnd, Span::empty(self.pos), "");
        }
    }

    fn check_indentation(&self, column: usize, is_entry: bool) -> ScanResult<()> {
        match self.indents.last() {
            None if self.root_opened => {
                self.error_here("unexpected content after the document root")
            }
            None => Ok(()),
            Some(top) if top.column != column => {
                self.error_here("indentation does not match any open block")
            }
            Some(top) if top.kind == BlockKind::Mapping && is_entry => {
                self.error_here("expected a mapping key, found a sequence entry")
            }
            Some(_) => Ok(()),
        }
    }

    fn push_indent(&mut self, column: usize, kind: BlockKind) {
        self.root_opened = true;
        self.indents.push(Indent { column, kind });
        let token = match kind {
            BlockKind::Sequence => TokenKind::BlockSequenceStart,
            BlockKind::Mapping => TokenKind::BlockMappingStart,
        };
        self.emit(token, Span::empty(self.pos), "");
    }

    /// Scan a block node starting at `column`: a sequence entry, a mapping
    /// entry, or (in value position) a flow collection or scalar.
    fn scan_block_node(&mut self, column: usize, value_position: bool) -> ScanResult<()> {
        if self.at_entry_indicator() {
            return self.scan_block_entry(column);
        }

        if matches!(self.peek(), Some('[' | '{')) {
            if !value_position {
                return self.error_here("flow collections cannot be used as mapping keys");
            }
            self.root_opened = true;
            return self.scan_flow_node();
        }

        let (text, span) = self.scan_scalar(Context::Block)?;
        self.skip_spaces();
        if self.at_value_indicator(Context::Block) {
            self.scan_block_key(column, text, span)
        } else if value_position {
            self.root_opened = true;
            self.emit(TokenKind::Scalar, span, text);
            Ok(())
        } else {
            self.error("expected `key: value` or `- item`", span)
        }
    }

    fn scan_block_entry(&mut self, column: usize) -> ScanResult<()> {
        match self.indents.last().copied() {
            None => self.push_indent(column, BlockKind::Sequence),
            Some(top)
                if column > top.column
                    || (column == top.column && top.kind == BlockKind::Mapping) =>
            {
                self.push_indent(column, BlockKind::Sequence)
            }
            Some(top) if top.kind == BlockKind::Sequence && top.column == column => {}
            Some(_) => return self.error_here("inconsistent sequence indentation"),
        }

        let start = self.pos;
        self.advance();
        self.emit(TokenKind::BlockEntry, Span::new(start, self.pos), "-");

        self.skip_spaces();
        if self.at_line_end() {
            self.pending_value = Some(Span::empty(self.pos));
            return Ok(());
        }
        // Compact form: `- key: value` or `- - item`.
        let column = self.column();
        self.scan_block_node(column, true)
    }

    fn scan_block_key(
        &mut self,
        column: usize,
        key: Cow<'src, str>,
        key_span: Span,
    ) -> ScanResult<()> {
        match self.indents.last().copied() {
            None => self.push_indent(column, BlockKind::Mapping),
            Some(top) if column > top.column => self.push_indent(column, BlockKind::Mapping),
            Some(top) if top.kind == BlockKind::Mapping && top.column == column => {}
            Some(_) => return self.error("inconsistent mapping indentation", key_span),
        }

        self.emit(TokenKind::Key, Span::empty(key_span.start), "");
        self.emit(TokenKind::Scalar, key_span, key);
        let colon = self.pos;
        self.advance();
        self.emit(TokenKind::Value, Span::new(colon, self.pos), ":");

        self.skip_spaces();
        if self.at_line_end() {
            self.pending_value = Some(Span::empty(self.pos));
            return Ok(());
        }
        self.scan_inline_value()
    }

    /// Scan a value on the same line as its key.
    fn scan_inline_value(&mut self) -> ScanResult<()> {
        if matches!(self.peek(), Some('[' | '{')) {
            return self.scan_flow_node();
        }
        if self.at_entry_indicator() {
            return self.error_here("block sequence entries are not allowed here");
        }
        let (text, span) = self.scan_scalar(Context::Block)?;
        self.skip_spaces();
        if self.at_value_indicator(Context::Block) {
            return self.error_here("mapping values are not allowed here");
        }
        self.emit(TokenKind::Scalar, span, text);
        Ok(())
    }

    /// Only whitespace and a comment may follow a node on its line.
    fn finish_line(&mut self) -> ScanResult<()> {
        self.skip_spaces();
        if self.peek() == Some('#') {
            self.skip_to_line_end();
        }
        if self.is_eof() || self.eat_newline() {
            Ok(())
        } else {
            self.error_here("unexpected content at end of line")
        }
    }

    fn finish_stream(&mut self) {
        if let Some(span) = self.pending_value.take() {
            self.emit(TokenKind::Scalar, span, "");
        }
        while self.indents.pop().is_some() {
            self.emit(TokenKind::BlockEnd, Span::empty(self.pos), "");
        }
        self.emit(TokenKind::StreamEnd, Span::empty(self.pos), "");
    }

    fn scan_scalar(&mut self, context: Context) -> ScanResult<(Cow<'src, str>, Span)> {
        match self.peek() {
            Some('"') => self.scan_double_quoted(),
            Some('\'') => self.scan_single_quoted(),
            Some(c) => {
                self.check_plain_start(c)?;
                Ok(self.scan_plain(context))
            }
            None => self.error_here("expected a scalar"),
        }
    }

    fn check_plain_start(&self, c: char) -> ScanResult<()> {
        let blank_next = is_blank_or_end(self.peek_nth(1));
        match c {
            '&' | '*' => self.error_here("anchors and aliases are not supported"),
            '!' => self.error_here("tags are not supported"),
            '|' | '>' => self.error_here("block scalars are not supported"),
            '%' => self.error_here("directives are not supported"),
            '@' | '`' => self.error_here("reserved indicator cannot start a plain scalar"),
            ',' | '[' | ']' | '{' | '}' => self.error_here("unexpected flow indicator"),
            '#' | '\n' | '\r' => self.error_here("expected a scalar"),
            '?' if blank_next => self.error_here("complex keys are not supported"),
            ':' if blank_next => self.error_here("missing mapping key before `:`"),
            '-' if blank_next => {
                self.error_here("block sequence entries are not allowed in this context")
            }
            _ => Ok(()),
        }
    }

    /// Scan a plain scalar. It ends at a line break, at ` #`, at a `:` that
    /// separates a value, and in flow context at a flow indicator. Trailing
    /// whitespace is not part of the scalar.
    fn scan_plain(&mut self, context: Context) -> (Cow<'src, str>, Span) {
        let start = self.pos;
        let mut end = self.pos;
        let mut prev_blank = false;

        while let Some(c) = self.peek() {
            let stop = match c {
                '\n' | '\r' => true,
                ':' => is_value_indicator_end(self.peek_nth(1), context),
                '#' => prev_blank,
                ',' | '[' | ']' | '{' | '}' => context == Context::Flow,
                _ => false,
            };
            if stop {
                break;
            }
            self.advance();
            prev_blank = c == ' ' || c == '\t';
            if !prev_blank {
                end = self.pos;
            }
        }

        let span = Span::new(start, end);
        (Cow::Borrowed(span.slice(self.source)), span)
    }

    fn scan_double_quoted(&mut self) -> ScanResult<(Cow<'src, str>, Span)> {
        let start = self.pos;
        self.advance();
        let content_start = self.pos;

        loop {
            match self.peek() {
                None | Some('\n' | '\r') => {
                    return self.error(
                        "unterminated double-quoted scalar",
                        Span::new(start, self.pos),
                    );
                }
                Some('"') => break,
                Some('\\') => {
                    self.advance();
                    if !matches!(self.peek(), None | Some('\n' | '\r')) {
                        self.advance();
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }

        let content = &self.source[content_start as usize..self.pos as usize];
        self.advance();
        let span = Span::new(start, self.pos);
        let text = unescape_double(content).map_err(|message| ScanError {
            message: message.into(),
            span,
        })?;
        Ok((text, span))
    }

    fn scan_single_quoted(&mut self) -> ScanResult<(Cow<'src, str>, Span)> {
        let start = self.pos;
        self.advance();
        let content_start = self.pos;

        loop {
            match self.peek() {
                None | Some('\n' | '\r') => {
                    return self.error(
                        "unterminated single-quoted scalar",
                        Span::new(start, self.pos),
                    );
                }
                Some('\'') if self.peek_nth(1) == Some('\'') => self.advance_by(2),
                Some('\'') => break,
                Some(_) => {
                    self.advance();
                }
            }
        }

        let content = &self.source[content_start as usize..self.pos as usize];
        self.advance();
        Ok((unescape_single(content), Span::new(start, self.pos)))
    }

    /// Skip whitespace, line breaks, and comments between flow tokens.
    fn skip_flow_whitespace(&mut self, open: u32) -> ScanResult<()> {
        loop {
            match self.peek() {
                Some(' ' | '\t') => {
                    self.advance();
                }
                Some('#') => self.skip_to_line_end(),
                Some('\n' | '\r') => {
                    if !self.eat_newline() {
                        return self.error_here("unexpected carriage return");
                    }
                }
                Some(_) => return Ok(()),
                None => {
                    return self.error("unterminated flow collection", Span::new(open, open + 1));
                }
            }
        }
    }

    fn scan_flow_node(&mut self) -> ScanResult<()> {
        match self.peek() {
            Some('[') => self.scan_flow_sequence(),
            Some('{') => self.scan_flow_mapping(),
            _ => {
                let (text, span) = self.scan_scalar(Context::Flow)?;
                self.emit(TokenKind::Scalar, span, text);
                Ok(())
            }
        }
    }

    fn scan_flow_sequence(&mut self) -> ScanResult<()> {
        let open = self.pos;
        self.advance();
        self.emit(TokenKind::FlowSequenceStart, Span::new(open, self.pos), "[");

        loop {
            self.skip_flow_whitespace(open)?;
            if self.peek() == Some(']') {
                let start = self.pos;
                self.advance();
                self.emit(TokenKind::FlowSequenceEnd, Span::new(start, self.pos), "]");
                return Ok(());
            }

            self.emit(TokenKind::FlowEntry, Span::empty(self.pos), "");
            self.scan_flow_node()?;

            self.skip_flow_whitespace(open)?;
            match self.peek() {
                Some(',') => {
                    self.advance();
                }
                Some(']') => {}
                Some(':') => {
                    return self.error_here("flow sequence items cannot be key/value pairs");
                }
                _ => return self.error_here("expected `,` or `]` in flow sequence"),
            }
        }
    }

    fn scan_flow_mapping(&mut self) -> ScanResult<()> {
        let open = self.pos;
        self.advance();
        self.emit(TokenKind::FlowMappingStart, Span::new(open, self.pos), "{");

        loop {
            self.skip_flow_whitespace(open)?;
            if self.peek() == Some('}') {
                let start = self.pos;
                self.advance();
                self.emit(TokenKind::FlowMappingEnd, Span::new(start, self.pos), "}");
                return Ok(());
            }
            if matches!(self.peek(), Some('[' | '{')) {
                return self.error_here("flow collections cannot be used as mapping keys");
            }

            let (key, key_span) = self.scan_scalar(Context::Flow)?;
            self.emit(TokenKind::Key, Span::empty(key_span.start), "");
            self.emit(TokenKind::Scalar, key_span, key);

            self.skip_flow_whitespace(open)?;
            if self.peek() != Some(':') {
                return self.error_here("expected `:` after flow mapping key");
            }
            let colon = self.pos;
            self.advance();
            self.emit(TokenKind::Value, Span::new(colon, self.pos), ":");

            self.skip_flow_whitespace(open)?;
            if matches!(self.peek(), Some(',' | '}')) {
                self.emit(TokenKind::Scalar, Span::empty(self.pos), "");
            } else {
                self.scan_flow_node()?;
            }

            self.skip_flow_whitespace(open)?;
            match self.peek() {
                Some(',') => {
                    self.advance();
                }
                Some('}') => {}
                _ => return self.error_here("expected `,` or `}` in flow mapping"),
            }
        }
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Whitespace, a line break, or the end of input.
fn is_blank_or_end(c: Option<char>) -> bool {
    matches!(c, None | Some(' ' | '\t' | '\n' | '\r'))
}

/// What may follow a `:` for it to act as a value indicator.
fn is_value_indicator_end(next: Option<char>, context: Context) -> bool {
    is_blank_or_end(next)
        || (context == Context::Flow && matches!(next, Some(',' | '[' | ']' | '{' | '}')))
}
