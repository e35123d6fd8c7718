//! Translation errors.
//!
//! A closed taxonomy: every rejection the transpiler performs has its own
//! discriminant, carries a human message, and points at the offending node's
//! span. Errors are fatal for the current file; nothing is caught and
//! recovered internally, and no partial output escapes.

use thiserror::Error;

use crate::ast::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    // Unsupported constructs
    NullLiteral,
    LooseEquality,
    VarKeyword,
    LabeledStatement,
    NewWithoutParentheses,
    SpreadInBindingPattern,

    // Semantic rejections
    IndexingFunctionValue,
    PrototypeAccess,
    ReservedMetamethod,
    ReturnInConstructor,
    /// `break`/`continue` that would have to cross a protected-call
    /// boundary; the target has no jump that can leave a closure.
    JumpInTry,
    InvalidExpressionStatement,
    MathMacroStatement,
    ReservedKeyword,

    // Cross-context
    ClientOnlyApi,
    ServerOnlyApi,

    // Module shape
    ExportInScript,
    ModuleWithoutExports,
    MissingModuleFile,

    // Structural
    BadBinaryOperator,
    BadPrefixOperator,
    BadPostfixOperator,
    BindingPatternInForIn,
    InitializerInForIn,
    UnsupportedConstruct,

    /// Should be unreachable.
    Internal,
}

/// A fatal translation error tied to a source node.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TranspileError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl TranspileError {
    pub fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> TranspileError {
        TranspileError {
            kind,
            message: message.into(),
            span,
        }
    }
}

pub type Result<T> = std::result::Result<T, TranspileError>;
