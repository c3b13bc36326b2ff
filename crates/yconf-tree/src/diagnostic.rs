//! Diagnostic rendering for build errors.

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::builder::{BuildError, MalformedKind};

impl BuildError {
    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename, source.len());
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
        source_len: usize,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range = match self.span() {
            Some(span) => {
                (span.start as usize).min(source_len)..(span.end as usize).min(source_len)
            }
            None => source_len..source_len,
        };

        match self {
            BuildError::Scan { message, .. } => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(message)
                    .with_label(
                        Label::new((filename, range))
                            .with_message("here")
                            .with_color(Color::Red),
                    )
            }

            BuildError::PrematureEnd => Report::build(ReportKind::Error, (filename, range.clone()))
                .with_message("unexpected end of input")
                .with_label(
                    Label::new((filename, range))
                        .with_message("document ends before it is complete")
                        .with_color(Color::Red),
                ),

            BuildError::Malformed { reason, .. } => {
                let report = Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message("malformed document")
                    .with_label(
                        Label::new((filename, range))
                            .with_message(reason.to_string())
                            .with_color(Color::Red),
                    );
                match reason.help() {
                    Some(help) => report.with_help(help),
                    None => report,
                }
            }
        }
    }
}

impl MalformedKind {
    fn help(&self) -> Option<&'static str> {
        match self {
            MalformedKind::ScalarAtRoot => {
                Some("wrap the value in a mapping, e.g. `value: ...`")
            }
            MalformedKind::CollectionAfterKey => Some("keys must be scalars"),
            MalformedKind::KeyInSequence | MalformedKind::EntryOutsideSequence => {
                Some("a node holds either `- item` entries or `key: value` pairs, not both")
            }
            _ => None,
        }
    }
}
