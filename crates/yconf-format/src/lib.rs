#![doc = include_str!("../README.md")]
//! Serialization of yconf trees back to text.

use std::io::{self, Write};
use std::path::Path;

use tracing::debug;
use yconf_tree::Tree;

mod options;
mod scalar;
mod writer;

pub use options::FormatOptions;
pub use scalar::{can_be_plain, escape_quoted};
pub use writer::ConfigWriter;

/// Format a tree as block text.
pub fn format_tree(tree: &Tree, options: &FormatOptions) -> String {
    let mut writer = ConfigWriter::with_options(options.clone());
    writer.write_root(tree.root());
    writer.finish()
}

/// Write a tree with default options.
pub fn write_tree<W: Write>(tree: &Tree, mut writer: W) -> io::Result<()> {
    writer.write_all(format_tree(tree, &FormatOptions::default()).as_bytes())
}

/// Write a tree to a file with default options, replacing its contents.
pub fn write_file(tree: &Tree, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    let text = format_tree(tree, &FormatOptions::default());
    debug!(path = %path.display(), bytes = text.len(), "writing document");
    std::fs::write(path, text)
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use yconf_tokenizer::{Token, TokenKind};
    use yconf_tree::TreeBuilder;

    /// A document shape, independent of any text form.
    #[derive(Debug, Clone)]
    enum Sample {
        Text(String),
        List(Vec<Sample>),
        Dict(Vec<(String, Sample)>),
    }

    fn text() -> impl Strategy<Value = String> {
        "[ -~]{0,8}"
    }

    fn sample() -> impl Strategy<Value = Sample> {
        text().prop_map(Sample::Text).prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Sample::List),
                prop::collection::vec((text(), inner), 0..4).prop_map(Sample::Dict),
            ]
        })
    }

    /// The root of a document is always a collection.
    fn document() -> impl Strategy<Value = Sample> {
        sample().prop_map(|sample| match sample {
            Sample::Text(text) => Sample::List(vec![Sample::Text(text)]),
            other => other,
        })
    }

    fn push_tokens(sample: &Sample, tokens: &mut Vec<Token<'static>>) {
        match sample {
            Sample::Text(text) => tokens.push(Token::scalar(text.clone())),
            Sample::List(items) => {
                tokens.push(Token::bare(TokenKind::FlowSequenceStart));
                for item in items {
                    tokens.push(Token::bare(TokenKind::FlowEntry));
                    push_tokens(item, tokens);
                }
                tokens.push(Token::bare(TokenKind::FlowSequenceEnd));
            }
            Sample::Dict(entries) => {
                tokens.push(Token::bare(TokenKind::FlowMappingStart));
                for (key, value) in entries {
                    tokens.push(Token::bare(TokenKind::Key));
                    tokens.push(Token::scalar(key.clone()));
                    tokens.push(Token::bare(TokenKind::Value));
                    push_tokens(value, tokens);
                }
                tokens.push(Token::bare(TokenKind::FlowMappingEnd));
            }
        }
    }

    fn build(sample: &Sample) -> Tree {
        let mut tokens = vec![Token::bare(TokenKind::StreamStart)];
        push_tokens(sample, &mut tokens);
        tokens.push(Token::bare(TokenKind::StreamEnd));
        TreeBuilder::build(tokens).unwrap()
    }

    proptest! {
        /// Formatted output must parse back to the same tree
        #[test]
        fn format_round_trips(doc in document()) {
            let tree = build(&doc);
            let formatted = format_tree(&tree, &FormatOptions::default());
            let reparsed = yconf_tree::parse(&formatted);

            prop_assert!(
                reparsed.is_ok(),
                "Formatted output should parse: {:?}\nFormatted:\n{}",
                reparsed,
                formatted
            );
            prop_assert_eq!(
                &tree,
                &reparsed.unwrap(),
                "Formatting changed the document!\nFormatted:\n{}",
                formatted
            );
        }

        /// Formatting should be idempotent
        #[test]
        fn format_is_idempotent(doc in document(), width in 1usize..5) {
            let options = FormatOptions::new().indent_width(width);
            let once = format_tree(&build(&doc), &options);
            let twice = format_tree(&yconf_tree::parse(&once).unwrap(), &options);

            prop_assert_eq!(
                &once,
                &twice,
                "Formatting is not idempotent!\nOnce:\n{}\nTwice:\n{}",
                &once,
                &twice
            );
        }
    }

    #[test]
    fn test_write_tree() {
        let tree = yconf_tree::parse("a: [1]").unwrap();
        let mut out = Vec::new();
        write_tree(&tree, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a:\n  - 1\n");
    }
}
