use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Sorry,
    Redefinition,
    TheoremFailed,
    InfixRedefinition,
    Io,
    Syntax,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::Sorry => "sorry",
            DiagnosticKind::Redefinition => "redefinition",
            DiagnosticKind::TheoremFailed => "theorem-failed",
            DiagnosticKind::InfixRedefinition => "infix-redefinition",
            DiagnosticKind::Io => "io",
            DiagnosticKind::Syntax => "syntax",
        };
        write!(f, "{s}")
    }
}

// `file` is empty if the notice was raised outside any file (e.g. by the CLI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub file: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, file: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic { kind, file: file.into(), message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "[{}] {}", self.kind, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.kind, self.file, self.message)
        }
    }
}

pub trait Sink {
    fn report(&mut self, diagnostic: Diagnostic);
}

#[derive(Debug, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        println!("{diagnostic}");
    }
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        CollectingSink { diagnostics: Vec::new() }
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

impl Sink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
