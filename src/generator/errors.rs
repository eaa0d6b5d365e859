use thiserror::Error;

use super::script::ValueType;

/// A definition that does not satisfy the generator contract.
///
/// Raised by a loader before any scoring is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Source text could not be parsed.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    /// No `def` header was found.
    #[error("Generator source does not define an entry point function")]
    MissingEntryPoint,
    /// More than one `def` header was found.
    #[error("line {line}: generator source must define exactly one entry point")]
    DuplicateEntryPoint { line: usize },
    /// Entry point does not take `(y_true, y_output)`.
    #[error("line {line}: entry point must take 2 parameters (y_true, y_output), found {found}")]
    EntryPointArity { line: usize, found: usize },
    /// Call to a function the loader does not provide.
    #[error("line {line}: unknown function `{name}`")]
    UnknownFunction { line: usize, name: String },
    /// Use of a name that was never bound.
    #[error("line {line}: `{name}` is not defined")]
    UndefinedVariable { line: usize, name: String },
    /// A name was bound twice.
    #[error("line {line}: `{name}` is already defined")]
    Redefinition { line: usize, name: String },
    /// Wrong number of arguments to a builtin.
    #[error("line {line}: `{function}` takes {expected} arguments, found {found}")]
    ArgumentCount {
        line: usize,
        function: String,
        expected: String,
        found: usize,
    },
    /// Argument of the wrong type.
    #[error("line {line}: argument {position} of `{function}` must be {expected}, found {found}")]
    TypeMismatch {
        line: usize,
        function: String,
        position: usize,
        expected: ValueType,
        found: ValueType,
    },
    /// Averaging literal that is not `binary`, `micro` or `macro`.
    #[error("line {line}: unknown averaging \"{value}\" (expected binary, micro or macro)")]
    UnknownAveraging { line: usize, value: String },
    /// Score matrix projected without a prior shape check against the same classes.
    #[error("line {line}: `{name}` must pass check_shape against `{classes}` before it is projected")]
    UncheckedScores {
        line: usize,
        name: String,
        classes: String,
    },
    /// Body has no `return` statement.
    #[error("Entry point never returns a score")]
    MissingReturn,
    /// Code after the `return` statement.
    #[error("line {line}: statement after return")]
    StatementAfterReturn { line: usize },
    /// Entry point returns something other than a score.
    #[error("line {line}: entry point must return a score, found {found}")]
    ReturnType { line: usize, found: ValueType },
}
