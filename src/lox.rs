//! Driver façade: scan → parse → resolve → interpret, with every error routed
//! to the session's [`Reporter`].
//!
//! One `Lox` value is one session. Globals, the resolution table and the id
//! allocator persist between [`Lox::run`] calls, which is what a REPL needs:
//! a function declared on one line can be called on the next.

use std::io::{self, Write};

use log::{debug, info};

use crate::ast::{Expr, ExprIds, Stmt};
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::sink::{Reporter, StderrReporter};
use crate::value::Value;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Lexical, syntax or resolver errors; nothing was executed.
    StaticError,
    /// Execution started and stopped at a runtime error.
    RuntimeError,
}

impl Outcome {
    /// Conventional process exit status (sysexits `EX_DATAERR`/`EX_SOFTWARE`).
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Completed => 0,
            Outcome::StaticError => 65,
            Outcome::RuntimeError => 70,
        }
    }
}

pub struct Lox {
    interpreter: Interpreter,
    ids: ExprIds,
    reporter: Box<dyn Reporter>,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// Prints to stdout, reports to stderr.
    pub fn new() -> Self {
        Self::with_sinks(Box::new(io::stdout()), Box::new(StderrReporter))
    }

    pub fn with_sinks(output: Box<dyn Write>, reporter: Box<dyn Reporter>) -> Self {
        Self {
            interpreter: Interpreter::with_output(output),
            ids: ExprIds::new(),
            reporter,
        }
    }

    /// Access to the interpreter, e.g. to bind extra natives before running.
    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Run a whole program (or one REPL line).
    pub fn run(&mut self, source: &str) -> Outcome {
        info!("Running {} bytes of source", source.len());

        let Some(statements) = self.parse(source) else {
            return Outcome::StaticError;
        };

        if !self.resolve(&statements) {
            return Outcome::StaticError;
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => Outcome::Completed,
            Err(e) => {
                debug!("Runtime error on line {}: {}", e.line(), e);
                self.report(e.into());
                Outcome::RuntimeError
            }
        }
    }

    /// Evaluate a single expression and hand back its value.
    pub fn evaluate(&mut self, source: &str) -> Result<Value, Outcome> {
        let expr = self.parse_expression(source).ok_or(Outcome::StaticError)?;

        let errors = Resolver::new(&mut self.interpreter).resolve_expression(&expr);
        if !errors.is_empty() {
            for error in errors {
                self.report(error.into());
            }
            return Err(Outcome::StaticError);
        }

        self.interpreter.evaluate(&expr).map_err(|e| {
            self.report(e.into());
            Outcome::RuntimeError
        })
    }

    /// Scan and parse, reporting every lexical and syntax error. `None` if
    /// there was at least one.
    pub fn parse(&mut self, source: &str) -> Option<Vec<Stmt>> {
        let (tokens, lex_errors) = Scanner::new(source).scan_all();
        let had_lex_errors = !lex_errors.is_empty();

        for error in lex_errors {
            self.report(error);
        }

        match Parser::new(tokens, &mut self.ids).parse() {
            Ok(statements) if !had_lex_errors => Some(statements),
            Ok(_) => None,
            Err(errors) => {
                for error in errors {
                    self.report(error);
                }
                None
            }
        }
    }

    fn parse_expression(&mut self, source: &str) -> Option<Expr> {
        let (tokens, lex_errors) = Scanner::new(source).scan_all();

        if !lex_errors.is_empty() {
            for error in lex_errors {
                self.report(error);
            }
            return None;
        }

        match Parser::new(tokens, &mut self.ids).parse_expression() {
            Ok(expr) => Some(expr),
            Err(error) => {
                self.report(error);
                None
            }
        }
    }

    /// Run the resolver over `statements`; `false` if it found static errors.
    fn resolve(&mut self, statements: &[Stmt]) -> bool {
        let errors = Resolver::new(&mut self.interpreter).resolve(statements);
        let clean = errors.is_empty();

        for error in errors {
            self.report(error.into());
        }

        clean
    }

    fn report(&mut self, error: LoxError) {
        let tier = if error.is_static() { "static" } else { "runtime" };
        debug!("Reporting {} error", tier);

        self.reporter.report(&error);
    }
}
