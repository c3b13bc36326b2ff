//! Indented block output for yconf trees.

use yconf_tree::{Node, NodeKind};

use crate::options::FormatOptions;
use crate::scalar::{can_be_plain, escape_quoted};

/// Writes a tree as block text.
///
/// Every line is `key: value`, `key:` followed by a nested block, or a
/// `- ` list item. Lines are tracked by column: nested dict and list blocks
/// start one indent unit deeper than their key, the contents of a collection
/// inside a list item start right after its `- `.
pub struct ConfigWriter {
    out: String,
    options: FormatOptions,
}

impl ConfigWriter {
    /// Create a new writer with default options.
    pub fn new() -> Self {
        Self::with_options(FormatOptions::default())
    }

    /// Create a new writer with the given options.
    pub fn with_options(options: FormatOptions) -> Self {
        Self {
            out: String::new(),
            options,
        }
    }

    /// Consume the writer and return the output.
    pub fn finish(self) -> String {
        self.out
    }

    /// Write a whole document starting at its root. Any list or dict node
    /// can stand in for the root; its children are written at column 0.
    pub fn write_root(&mut self, root: Node<'_>) {
        if root.child_count() == 0 {
            self.write_empty(root.kind());
            self.out.push('\n');
        } else {
            self.write_children(root, 0, false);
        }
    }

    /// Write the children of a list or dict, one per line, at `column`.
    ///
    /// With `first_inline` the first child continues the current line (the
    /// compact form after `- `).
    fn write_children(&mut self, node: Node<'_>, column: usize, first_inline: bool) {
        let is_list = node.kind() == NodeKind::List;
        for (i, child) in node.children().enumerate() {
            if i > 0 || !first_inline {
                self.write_indent(column);
            }
            if is_list {
                self.write_item(child, column);
            } else {
                self.write_entry(child, column);
            }
        }
    }

    fn write_entry(&mut self, node: Node<'_>, column: usize) {
        self.write_scalar(node.key().unwrap_or(""));
        self.out.push(':');
        match node.kind() {
            NodeKind::List | NodeKind::Dict if node.child_count() > 0 => {
                self.out.push('\n');
                self.write_children(node, column + self.options.indent_width, false);
            }
            _ => {
                self.out.push(' ');
                self.write_value(node);
                self.out.push('\n');
            }
        }
    }

    fn write_item(&mut self, node: Node<'_>, column: usize) {
        self.out.push_str("- ");
        match node.kind() {
            NodeKind::List | NodeKind::Dict if node.child_count() > 0 => {
                self.write_children(node, column + 2, true);
            }
            _ => {
                self.write_value(node);
                self.out.push('\n');
            }
        }
    }

    /// A scalar or an empty collection.
    fn write_value(&mut self, node: Node<'_>) {
        match node.kind() {
            NodeKind::List | NodeKind::Dict => self.write_empty(node.kind()),
            NodeKind::Scalar | NodeKind::Unset => self.write_scalar(node.as_str().unwrap_or("")),
        }
    }

    fn write_empty(&mut self, kind: NodeKind) {
        self.out.push_str(if kind == NodeKind::List { "[]" } else { "{}" });
    }

    /// Write scalar text, plain when it reads back unchanged, quoted otherwise.
    pub fn write_scalar(&mut self, text: &str) {
        if can_be_plain(text) {
            self.out.push_str(text);
        } else {
            self.out.push('"');
            self.out.push_str(&escape_quoted(text));
            self.out.push('"');
        }
    }

    fn write_indent(&mut self, column: usize) {
        self.out.extend(std::iter::repeat_n(' ', column));
    }
}

impl Default for ConfigWriter {
    fn default() -> Self {
        Self::new()
    }
}
