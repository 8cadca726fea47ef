use std::fmt;

// Malformed AST shape at a form boundary. Unlike VerificationError, this
// is not recoverable at the theorem boundary — it aborts the current file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    Reader(String),
    Lower(String),
    MalformedForm { form: String, detail: String },
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::Reader(msg) => write!(f, "syntax error: {msg}"),
            SyntaxError::Lower(msg) => write!(f, "syntax error: {msg}"),
            SyntaxError::MalformedForm { form, detail } => {
                write!(f, "syntax error in `{form}` form: {detail}")
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

// Caught at the theorem boundary: the theorem is not admitted, but the
// driver continues with the next form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    UnknownRule { name: String },
    ArityMismatch { rule: String, expected: usize, found: usize },
    PremiseMismatch { rule: String, index: usize, template: String, actual: String },
    ConclusionMismatch { expected: String, derived: String },
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationError::UnknownRule { name } => {
                write!(f, "unknown rule `{name}`")
            }
            VerificationError::ArityMismatch { rule, expected, found } => {
                write!(
                    f,
                    "rule `{rule}` expects {expected} argument(s), found {found}"
                )
            }
            VerificationError::PremiseMismatch { rule, index, template, actual } => {
                write!(
                    f,
                    "rule `{rule}` premise {index} mismatch: template `{template}` does not match `{actual}`"
                )
            }
            VerificationError::ConclusionMismatch { expected, derived } => {
                write!(
                    f,
                    "conclusion mismatch: expected `{expected}`, derived `{derived}`"
                )
            }
        }
    }
}

impl std::error::Error for VerificationError {}
