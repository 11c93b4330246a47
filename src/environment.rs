//! Runtime scope chain.
//!
//! Frames are reference counted: a closure holds an [`EnvRef`] to the frame it
//! was defined in, which keeps that frame and all of its ancestors alive for
//! as long as the closure exists. Frames nobody captured are dropped as soon
//! as the interpreter leaves them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;

/// Shared handle to a frame.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// The global frame.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap a fresh frame chained to `enclosing` in a shared handle.
    pub fn child_of(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Self::with_enclosing(Rc::clone(enclosing))))
    }

    /// Insert or overwrite `name` in this frame only.
    pub fn define(&mut self, name: &str, value: Value) {
        trace!("define '{}' = {}", name, value);
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up in this frame, then outward.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(RuntimeError::undefined_variable(&name.lexeme, name.line))
        }
    }

    /// Overwrite the nearest existing binding of `name`. Never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::undefined_variable(&name.lexeme, name.line))
        }
    }

    /// The frame `distance` hops outward from `env`; `0` is `env` itself.
    pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut frame = Rc::clone(env);

        for _ in 0..distance {
            let next = frame.borrow().enclosing.clone()?;
            frame = next;
        }

        Some(frame)
    }

    /// Read `name` directly from the frame at `distance`, with no search.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        let frame = Self::ancestor(env, distance)
            .ok_or_else(|| RuntimeError::undefined_variable(&name.lexeme, name.line))?;
        let value = frame.borrow().values.get(&name.lexeme).cloned();

        value.ok_or_else(|| RuntimeError::undefined_variable(&name.lexeme, name.line))
    }

    /// Write `name` directly into the frame at `distance`.
    pub fn assign_at(
        env: &EnvRef,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let frame = Self::ancestor(env, distance)
            .ok_or_else(|| RuntimeError::undefined_variable(&name.lexeme, name.line))?;

        frame.borrow_mut().define(&name.lexeme, value);

        Ok(())
    }
}
