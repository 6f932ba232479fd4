//! Error handling types and utilities for the PPL toolchain.
//!
//! Every stage of the pipeline (lexing a line, resolving macro headers,
//! loading a program, executing it) reports problems through the single
//! [`Error`] type defined here. An error carries an [`ErrorKind`] that callers
//! can match on, a human-readable message, and optional location information
//! (the file and the 1-based line the problem was found on).
//!
//! # Error Philosophy
//!
//! - **Typed categories**: callers branch on [`ErrorKind`], never on message text
//! - **Precise location information**: file and line of the offending instruction
//! - **Easy propagation**: `?` everywhere, helpers for the common cases
//!
//! # Examples
//!
//! ```rust
//! use ppl_syntax::error::{error, Error, ErrorKind, Result};
//!
//! fn read_register(name: &str) -> Result<i64> {
//!     error(ErrorKind::UnboundVariable, format!("register '{}' is not initialized", name))
//! }
//!
//! let err = read_register("x1").unwrap_err();
//! assert_eq!(err.kind, ErrorKind::UnboundVariable);
//!
//! let located = Error::with_line(ErrorKind::UnresolvedLabel, "label 'L' not found", 4);
//! assert_eq!(located.to_string(), "label 'L' not found at line 4");
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

/// Category of an [`Error`].
///
/// Load-time kinds are produced while reading files; runtime kinds while an
/// execution instance dispatches instructions. [`RecursionLimit`] and
/// [`Overflow`] are fatal under every policy.
///
/// [`RecursionLimit`]: ErrorKind::RecursionLimit
/// [`Overflow`]: ErrorKind::Overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A program or macro source file could not be opened.
    FileNotFound,
    /// A header declares a macro kind other than `infix` or `function`.
    UnknownMacroKind,
    /// A header line is not of the form `name kind source`.
    MalformedHeader,
    /// A macro names the file that references it as its own source.
    SelfReferentialMacro,
    /// The same label is defined twice while duplicates are rejected.
    DuplicateLabel,
    /// A program defines a label with the reserved exit-label name.
    ReservedLabel,
    /// A register is read before it was ever assigned.
    UnboundVariable,
    /// A jump target is neither in the label table nor the exit label.
    UnresolvedLabel,
    /// A line matches none of the instruction shapes.
    MalformedInstruction,
    /// A call names a macro that is absent from the directory.
    UnknownMacro,
    /// A macro is called with a different number of arguments than it declares.
    ArityMismatch,
    /// Nested macro invocations exceeded the configured depth.
    RecursionLimit,
    /// A register value left the signed 64-bit range.
    Overflow,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::FileNotFound => "file not found",
            ErrorKind::UnknownMacroKind => "unknown macro kind",
            ErrorKind::MalformedHeader => "malformed header",
            ErrorKind::SelfReferentialMacro => "self-referential macro",
            ErrorKind::DuplicateLabel => "duplicate label",
            ErrorKind::ReservedLabel => "reserved label",
            ErrorKind::UnboundVariable => "unbound variable",
            ErrorKind::UnresolvedLabel => "unresolved label",
            ErrorKind::MalformedInstruction => "malformed instruction",
            ErrorKind::UnknownMacro => "unknown macro",
            ErrorKind::ArityMismatch => "arity mismatch",
            ErrorKind::RecursionLimit => "recursion limit exceeded",
            ErrorKind::Overflow => "integer overflow",
        }
    }

    /// Whether this kind aborts execution even under the lenient policy.
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorKind::RecursionLimit | ErrorKind::Overflow)
    }
}

/// An error that occurred while loading or running a PPL program.
///
/// # Examples
///
/// ```rust
/// use ppl_syntax::{Error, ErrorKind};
///
/// let err = Error::new(ErrorKind::FileNotFound, "cannot open 'add.ppl'");
/// assert_eq!(err.to_string(), "cannot open 'add.ppl'");
///
/// let err = Error::with_line(ErrorKind::UnboundVariable, "register 'z' is not initialized", 3)
///     .in_file("main.ppl");
/// assert_eq!(err.to_string(), "register 'z' is not initialized at main.ppl:3");
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{msg}{}", location(.path, .line))]
pub struct Error {
    /// Category used for matching and for choosing the error policy
    pub kind: ErrorKind,

    /// Human-readable error message
    pub msg: String,

    /// File the error refers to, when known
    pub path: Option<PathBuf>,

    /// Optional line number in the source file (1-based)
    pub line: Option<usize>,
}

impl Error {
    /// Creates a new error without location information.
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            path: None,
            line: None,
        }
    }

    /// Creates a new error located at the given 1-based source line.
    pub fn with_line(kind: ErrorKind, msg: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            msg: msg.into(),
            path: None,
            line: Some(line),
        }
    }

    /// Attaches the file the error refers to, unless one is already set.
    ///
    /// Errors bubbling out of nested subroutine calls keep the innermost file.
    pub fn in_file(mut self, path: impl AsRef<Path>) -> Self {
        if self.path.is_none() {
            self.path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Attaches a 1-based line number, unless one is already set.
    pub fn at_line(mut self, line: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn location(path: &Option<PathBuf>, line: &Option<usize>) -> String {
    match (path, line) {
        (Some(p), Some(l)) => format!(" at {}:{}", p.display(), l),
        (None, Some(l)) => format!(" at line {}", l),
        (Some(p), None) => format!(" in {}", p.display()),
        (None, None) => String::new(),
    }
}

/// A specialized `Result` type for PPL operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Convenience function to create an error result.
///
/// ```rust
/// use ppl_syntax::error::{error, ErrorKind, Result};
///
/// fn jump(label: &str) -> Result<usize> {
///     error(ErrorKind::UnresolvedLabel, format!("label '{}' not found", label))
/// }
/// assert!(jump("L").is_err());
/// ```
pub fn error<T>(kind: ErrorKind, msg: impl Into<String>) -> Result<T> {
    Err(Error::new(kind, msg))
}

/// Convenience function to create an error result with a source line.
pub fn error_at<T>(kind: ErrorKind, line: usize, msg: impl Into<String>) -> Result<T> {
    Err(Error::with_line(kind, msg, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_rendered_when_present() {
        let e = Error::new(ErrorKind::UnknownMacro, "macro 'mul' is not declared");
        assert_eq!(e.to_string(), "macro 'mul' is not declared");

        let e = e.in_file("lib/mul.ppl");
        assert_eq!(e.to_string(), "macro 'mul' is not declared in lib/mul.ppl");

        let e = e.at_line(7);
        assert_eq!(e.to_string(), "macro 'mul' is not declared at lib/mul.ppl:7");
    }

    #[test]
    fn innermost_location_wins() {
        let e = Error::with_line(ErrorKind::UnboundVariable, "register 'y' is not initialized", 2)
            .in_file("inner.ppl")
            .in_file("outer.ppl")
            .at_line(9);
        assert_eq!(e.path.as_deref(), Some(Path::new("inner.ppl")));
        assert_eq!(e.line, Some(2));
    }

    #[test]
    fn only_resource_limits_are_fatal() {
        assert!(ErrorKind::RecursionLimit.is_fatal());
        assert!(ErrorKind::Overflow.is_fatal());
        assert!(!ErrorKind::UnboundVariable.is_fatal());
        assert!(!ErrorKind::UnresolvedLabel.is_fatal());
        assert_eq!(ErrorKind::ArityMismatch.to_string(), "arity mismatch");
    }
}
