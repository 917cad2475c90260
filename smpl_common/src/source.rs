//! Source text bookkeeping and caret rendering for error messages

use crate::Span;

/// A loaded source file, kept around for rendering located messages
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    lines: Vec<String>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            lines: text.lines().map(str::to_owned).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render `file(line:col)`, the offending source line, and a caret run
    /// under the spanned characters:
    ///
    /// ```text
    /// test.smpl(1:10)
    /// main var a; { ... }.
    ///          ^
    /// ```
    pub fn locate(&self, span: Span) -> String {
        let header = format!("{}({}:{})", self.name, span.line, span.column);
        match self.lines.get(span.line.saturating_sub(1) as usize) {
            Some(line) => format!("{}\n{}\n{}", header, line, span.underline()),
            // spans at end of file may point one past the last line
            None => header,
        }
    }
}
