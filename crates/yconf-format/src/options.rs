//! Formatting options for yconf serialization.

/// Options for yconf serialization.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Spaces per nesting level (default: 2, never less than 1)
    pub indent_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

impl FormatOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of spaces per nesting level.
    ///
    /// A width of zero would put nested entries on the same column as their
    /// parent key, so it is raised to one.
    pub fn indent_width(mut self, width: usize) -> Self {
        self.indent_width = width.max(1);
        self
    }
}
