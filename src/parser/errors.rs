use std::path::{Path, PathBuf};

use thiserror::Error;

/// Reason a trace file was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("malformed {0} directive")]
    MalformedDirective(String),

    #[error("unrecognized directive {0}")]
    UnknownDirective(String),

    #[error("malformed value change")]
    MalformedValueChange,

    #[error("value change for undeclared identifier `{0}`")]
    UndeclaredSymbol(String),

    #[error("$upscope without a matching $scope")]
    UnbalancedUpscope,

    #[error("$var declared after $enddefinitions")]
    LateDeclaration,

    #[error("{0} section is never closed with $end")]
    UnterminatedSection(String),

    #[error("{0} scope(s) still open at end of trace")]
    UnclosedScope(usize),

    #[error("expected exactly one root module, found {0}")]
    RootCount(usize),
}

/// A trace file that does not follow the value change dump grammar.
///
/// The error records the line that could not be processed so that the diagnostic can point the
/// user at the offending part of the file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {kind} (`{text}`)", location(.file, .line))]
pub struct ParseError {
    file: Option<PathBuf>,
    line: usize,
    text: String,
    kind: ErrorKind,
}

fn location(file: &Option<PathBuf>, line: &usize) -> String {
    match file {
        Some(path) => format!("{}:{}", path.display(), line),
        None => format!("line {}", line),
    }
}

impl ParseError {
    pub(crate) fn new(line: usize, text: &str, kind: ErrorKind) -> Self {
        Self {
            file: None,
            line,
            text: text.trim().to_string(),
            kind,
        }
    }

    /// Attach the name of the file the trace was read from
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// One-based line number of the offending line
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}
