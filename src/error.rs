//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! Two tiers matter to the driver: [`ResolveError`] (static, produced by the
//! resolver and accumulated) and [`RuntimeError`] (produced by the
//! interpreter, aborting the current batch). Both display as
//! `line <N>: <message>`. [`LoxError`] wraps them together with lexing,
//! parsing and I/O failures so the driver can funnel everything through one
//! [`Reporter`](crate::sink::Reporter).
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::debug;

/// Static errors found by the resolver before any code runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("line {line}: Already a variable named '{name}' in this scope.")]
    DuplicateDeclaration { name: String, line: usize },

    #[error("line {line}: Can't read local variable '{name}' in its own initializer.")]
    SelfReferentialInitializer { name: String, line: usize },

    #[error("line {line}: Can't return from top-level code.")]
    ReturnOutsideFunction { line: usize },

    #[error("line {line}: Can't use 'this' outside of a class.")]
    ThisOutsideClass { line: usize },

    #[error("line {line}: Can't use 'super' outside of a class.")]
    SuperOutsideClass { line: usize },

    #[error("line {line}: Can't use 'super' in a class with no superclass.")]
    SuperWithoutSuperclass { line: usize },
}

impl ResolveError {
    pub fn line(&self) -> usize {
        match self {
            ResolveError::DuplicateDeclaration { line, .. }
            | ResolveError::SelfReferentialInitializer { line, .. }
            | ResolveError::ReturnOutsideFunction { line }
            | ResolveError::ThisOutsideClass { line }
            | ResolveError::SuperOutsideClass { line }
            | ResolveError::SuperWithoutSuperclass { line } => *line,
        }
    }
}

/// Errors raised while evaluating a program. Each one carries the line of the
/// token that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Wrong operand kinds, calling a non-callable, or property access on a
    /// non-instance.
    #[error("line {line}: {message}")]
    Type { message: String, line: usize },

    #[error("line {line}: Undefined variable '{name}'.")]
    UndefinedVariable { name: String, line: usize },

    #[error("line {line}: Undefined property '{name}'.")]
    UndefinedProperty { name: String, line: usize },

    #[error("line {line}: Expected {expected} arguments but got {got}.")]
    Arity {
        expected: usize,
        got: usize,
        line: usize,
    },

    #[error("line {line}: {reason}")]
    InvalidSuperclass { reason: &'static str, line: usize },

    /// A host-provided native function failed.
    #[error("line {line}: {message}")]
    Native { message: String, line: usize },

    /// Writing `print` output failed.
    #[error("line {line}: {message}")]
    Output { message: String, line: usize },
}

impl RuntimeError {
    pub fn type_error<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating type error: line={}, msg={}", line, message);

        RuntimeError::Type { message, line }
    }

    pub fn undefined_variable(name: &str, line: usize) -> Self {
        debug!("Creating undefined variable error: line={}, name={}", line, name);

        RuntimeError::UndefinedVariable {
            name: name.to_string(),
            line,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            RuntimeError::Type { line, .. }
            | RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::UndefinedProperty { line, .. }
            | RuntimeError::Arity { line, .. }
            | RuntimeError::InvalidSuperclass { line, .. }
            | RuntimeError::Native { line, .. }
            | RuntimeError::Output { line, .. } => *line,
        }
    }
}

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("line {line}: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("line {line}: Error{location}: {message}")]
    Parse {
        message: String,
        /// ` at 'lexeme'` or ` at end`.
        location: String,
        line: usize,
    },

    /// Static‑analysis failure reported by the resolver.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Runtime evaluation error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &crate::token::Token, msg: S) -> Self {
        let message: String = msg.into();
        let location = if token.token_type == crate::token::TokenType::EOF {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };

        debug!(
            "Creating Parse error: line={}, msg={}{}",
            token.line, message, location
        );

        LoxError::Parse {
            message,
            location,
            line: token.line,
        }
    }

    /// `true` for the tiers that must stop a run before interpretation.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            LoxError::Lex { .. } | LoxError::Parse { .. } | LoxError::Resolve(_)
        )
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
