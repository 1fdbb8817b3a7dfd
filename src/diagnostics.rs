//! Human-readable compile reports, rendered against the grammar source.

use std::sync::Arc;

use codemap::{CodeMap, File, Span};
use codemap_diagnostic::{ColorConfig, Diagnostic, Emitter, Level, SpanLabel, SpanStyle};
use pegrat_runtime::str::LineCol;

use crate::error::CompileError;
use crate::grammar::{Grammar, Warning};

/// Diagnostics collected for one grammar source.
pub struct Report {
    codemap: CodeMap,
    file: Arc<File>,
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Report {
        let mut codemap = CodeMap::new();
        let file = codemap.add_file(name.into(), source.into());
        Report {
            codemap,
            file,
            diagnostics: Vec::new(),
        }
    }

    fn span(&self, location: Option<LineCol>) -> Option<Span> {
        let offset = location?.offset as u64;
        if offset <= self.file.span.len() {
            Some(self.file.span.subspan(offset, offset))
        } else {
            None
        }
    }

    fn push(&mut self, level: Level, message: String, location: Option<LineCol>, label: Option<String>) {
        let spans = match self.span(location) {
            Some(span) => vec![SpanLabel {
                span,
                label,
                style: SpanStyle::Primary,
            }],
            None => vec![],
        };
        self.diagnostics.push(Diagnostic {
            level,
            message,
            code: None,
            spans,
        });
    }

    pub fn add_error(&mut self, error: &CompileError) {
        match error {
            CompileError::Syntax(e) => self.push(
                Level::Error,
                "error parsing grammar".to_owned(),
                error.location(),
                Some(e.message.clone()),
            ),
            CompileError::Undefined(e) => {
                for rule in &e.rules {
                    self.push(
                        Level::Error,
                        format!("undefined rule `{}`", rule.name),
                        rule.location,
                        Some(format!("used in `{}`", rule.referenced_from)),
                    );
                }
            }
            _ => self.push(Level::Error, error.to_string(), error.location(), None),
        }
    }

    pub fn add_warning(&mut self, warning: &Warning) {
        self.push(Level::Warning, warning.message.clone(), warning.location, None);
    }

    pub fn has_error(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error || d.level == Level::Bug)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Render all diagnostics as plain text.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        if !self.diagnostics.is_empty() {
            let mut emitter = Emitter::vec(&mut buf, Some(&self.codemap));
            emitter.emit(&self.diagnostics[..]);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Print all diagnostics to stderr.
    pub fn print(&self) {
        if !self.diagnostics.is_empty() {
            let mut emitter = Emitter::stderr(ColorConfig::Auto, Some(&self.codemap));
            emitter.emit(&self.diagnostics[..]);
        }
    }
}

/// Compile `source` and collect its errors and warnings into a [`Report`]
/// named `name`.
pub fn compile_with_report(name: &str, source: &str) -> (Result<Grammar, CompileError>, Report) {
    let mut report = Report::new(name, source);
    let result = crate::compiler::compile(source);
    match &result {
        Ok(grammar) => {
            for warning in grammar.warnings() {
                report.add_warning(warning);
            }
        }
        Err(e) => report.add_error(e),
    }
    (result, report)
}
