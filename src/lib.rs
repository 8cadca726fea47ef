pub mod context;
pub mod diag;
pub mod error;
pub mod expand;
pub mod infer;
pub mod lower;
pub mod sexpr;
pub mod subst;
pub mod term;

pub mod driver;

pub use context::{Context, InferenceRule};
pub use diag::{Diagnostic, DiagnosticKind, Sink};
pub use driver::{process_path, process_source, State};
pub use error::{SyntaxError, VerificationError};
pub use infer::{check, infer, Argument, Proof};
pub use term::{Name, Term};
