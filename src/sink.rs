//! Where diagnostics and program output go.
//!
//! The driver decides: the CLI reports to stderr and prints to stdout, tests
//! collect both into shared buffers they can inspect afterwards.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::error::LoxError;

/// Receives every lexical, syntax, static and runtime error of a run.
pub trait Reporter {
    fn report(&mut self, error: &LoxError);
}

/// Prints each error on its own line to stderr.
#[derive(Debug, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&mut self, error: &LoxError) {
        eprintln!("{}", error);
    }
}

/// Keeps rendered error messages; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    messages: Rc<RefCell<Vec<String>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, error: &LoxError) {
        self.messages.borrow_mut().push(error.to_string());
    }
}

/// In‑memory `Write` target; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct SharedOutput {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl SharedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }

    /// Written text split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
