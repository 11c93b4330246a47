use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::class::LoxInstance;
use crate::environment::{EnvRef, Environment};
use crate::error::RuntimeError;
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::{Callable, Value};

pub const THIS_KEYWORD: &str = "this";

/// A user-defined function or method: its declaration plus the frame that
/// was current when it was declared.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// Same body, with one extra frame defining `this` as `instance`.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance>>) -> LoxFunction {
        let environment = Environment::child_of(&self.closure);

        environment
            .borrow_mut()
            .define(THIS_KEYWORD, Value::Instance(instance));

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }
}

impl Callable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        _paren: &Token,
    ) -> Result<Value, RuntimeError> {
        debug!("Calling '{}' with {} argument(s)", self.name(), arguments.len());

        let environment = Environment::child_of(&self.closure);

        {
            let mut frame = environment.borrow_mut();
            for (param, argument) in self.declaration.params.iter().zip(arguments) {
                frame.define(&param.lexeme, argument);
            }
        }

        let flow = interpreter.execute_block(&self.declaration.body, environment)?;

        // An initializer hands back its instance, whatever it returned.
        if self.is_initializer {
            let this = Token::synthetic(THIS_KEYWORD, self.declaration.name.line);
            return Environment::get_at(&self.closure, 0, &this);
        }

        Ok(match flow {
            Flow::Return(value) => value,
            Flow::Normal => Value::Nil,
        })
    }
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}
