//! Tree‑walking evaluator.
//!
//! Scoping at runtime is a single "current environment" handle that is
//! swapped on entry to a block, call or method body and put back on exit.
//! Variable occurrences the resolver placed in its table are read at their
//! recorded distance; everything else is a global.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::class::{LoxClass, LoxInstance, INITIALIZER};
use crate::environment::{EnvRef, Environment};
use crate::error::RuntimeError;
use crate::function::{LoxFunction, THIS_KEYWORD};
use crate::natives;
use crate::token::{Token, TokenType};
use crate::value::{Callable, NativeFunction, Value};

/// Convenient alias for interpreter results.
pub type ExecResult<T> = Result<T, RuntimeError>;

/// How a statement finished. `Return` travels up through blocks and loops
/// until the enclosing call turns it into the call's value.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    // Entries are never pruned: a closure from an earlier batch may still
    // evaluate the nodes they key. Ids are unique per session.
    locals: HashMap<ExprId, usize>,
    output: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter printing to stdout, with the default natives bound.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        let mut interpreter = Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        };

        for native in natives::defaults() {
            interpreter.define_native(native);
        }

        interpreter
    }

    /// Bind `value` in the global frame. Intended for host extensions.
    pub fn define_global(&mut self, name: &str, value: Value) {
        debug!("Defining global '{}'", name);
        self.globals.borrow_mut().define(name, value);
    }

    pub fn define_native(&mut self, native: NativeFunction) {
        let name = native.name.clone();
        self.define_global(&name, Value::Native(Rc::new(native)));
    }

    /// Called by the resolver: the occurrence `id` binds `depth` frames out.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Depth recorded for `id`, `None` for globals.
    pub fn resolved_depth(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    /// Run a batch of statements, stopping at the first runtime error.
    /// Bindings made before the error stay in place.
    pub fn interpret(&mut self, statements: &[Stmt]) -> ExecResult<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        info!("Interpretation completed successfully");

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> ExecResult<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print { keyword, value } => {
                let value = self.evaluate(value)?;

                writeln!(self.output, "{}", value)
                    .and_then(|()| self.output.flush())
                    .map_err(|e| RuntimeError::Output {
                        message: e.to_string(),
                        line: keyword.line,
                    })?;

                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let environment = Environment::child_of(&self.environment);
                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let flow @ Flow::Return(_) = self.execute(body)? {
                        return Ok(flow);
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                let function =
                    LoxFunction::new(Rc::clone(declaration), Rc::clone(&self.environment), false);

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);

                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Run `statements` with `environment` as the current frame. The previous
    /// frame is put back whether the block finishes, returns or fails.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> ExecResult<Flow> {
        let previous = mem::replace(&mut self.environment, environment);

        let result = self.execute_all(statements);

        self.environment = previous;

        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> ExecResult<Flow> {
        for stmt in statements {
            if let flow @ Flow::Return(_) = self.execute(stmt)? {
                return Ok(flow);
            }
        }

        Ok(Flow::Normal)
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> ExecResult<Flow> {
        debug!("Declaring class '{}'", name.lexeme);

        let superclass = match superclass {
            Some(expr) => Some(self.evaluate_superclass(name, expr)?),
            None => None,
        };

        // Placeholder, so method closures can refer to the class.
        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        let method_env = match &superclass {
            Some(superclass) => {
                let env = Environment::child_of(&self.environment);
                env.borrow_mut()
                    .define("super", Value::Class(Rc::clone(superclass)));
                env
            }
            None => Rc::clone(&self.environment),
        };

        let methods = methods
            .iter()
            .map(|method| {
                let is_initializer = method.name.lexeme == INITIALIZER;
                let function =
                    LoxFunction::new(Rc::clone(method), Rc::clone(&method_env), is_initializer);

                (method.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class = LoxClass::new(name.lexeme.clone(), superclass, methods);

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(Rc::new(class)))?;

        Ok(Flow::Normal)
    }

    fn evaluate_superclass(&mut self, name: &Token, expr: &Expr) -> ExecResult<Rc<LoxClass>> {
        let line = match expr {
            Expr::Variable { name: super_name, .. } => {
                if super_name.lexeme == name.lexeme {
                    return Err(RuntimeError::InvalidSuperclass {
                        reason: "A class can't inherit from itself.",
                        line: super_name.line,
                    });
                }
                super_name.line
            }
            _ => name.line,
        };

        match self.evaluate(expr)? {
            Value::Class(class) => Ok(class),
            _ => Err(RuntimeError::InvalidSuperclass {
                reason: "Superclass must be a class.",
                line,
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> ExecResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;

                match (&operator.token_type, right) {
                    (TokenType::BANG, right) => Ok(Value::Bool(!right.is_truthy())),
                    (TokenType::MINUS, Value::Number(n)) => Ok(Value::Number(-n)),
                    (TokenType::MINUS, _) => Err(RuntimeError::type_error(
                        operator.line,
                        "Operand must be a number.",
                    )),
                    _ => Err(RuntimeError::type_error(
                        operator.line,
                        format!("Unknown unary operator '{}'.", operator.lexeme),
                    )),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(RuntimeError::type_error(
                    name.line,
                    "Only instances have properties.",
                )),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(RuntimeError::type_error(
                        name.line,
                        "Only instances have fields.",
                    ));
                };

                let value = self.evaluate(value)?;

                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> ExecResult<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        debug!("Binary '{}': {} and {}", operator.lexeme, left, right);

        let apply: fn(f64, f64) -> Value = match operator.token_type {
            TokenType::EQUAL_EQUAL => return Ok(Value::Bool(left == right)),
            TokenType::BANG_EQUAL => return Ok(Value::Bool(left != right)),

            TokenType::PLUS => {
                return match (left, right) {
                    (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                    (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                    _ => Err(RuntimeError::type_error(
                        operator.line,
                        "Operands must be two numbers or two strings.",
                    )),
                };
            }

            TokenType::MINUS => |a, b| Value::Number(a - b),
            TokenType::STAR => |a, b| Value::Number(a * b),
            // IEEE semantics: x / 0 is ±inf or NaN, not an error.
            TokenType::SLASH => |a, b| Value::Number(a / b),
            TokenType::GREATER => |a, b| Value::Bool(a > b),
            TokenType::GREATER_EQUAL => |a, b| Value::Bool(a >= b),
            TokenType::LESS => |a, b| Value::Bool(a < b),
            TokenType::LESS_EQUAL => |a, b| Value::Bool(a <= b),

            _ => {
                return Err(RuntimeError::type_error(
                    operator.line,
                    format!("Unknown binary operator '{}'.", operator.lexeme),
                ))
            }
        };

        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(apply(a, b)),
            _ => Err(RuntimeError::type_error(
                operator.line,
                "Operands must be numbers.",
            )),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> ExecResult<Value> {
        let callee = self.evaluate(callee)?;

        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }

        let callable: &dyn Callable = match &callee {
            Value::Function(function) => function.as_ref(),
            Value::Native(native) => native.as_ref(),
            Value::Class(class) => class,
            _ => {
                return Err(RuntimeError::type_error(
                    paren.line,
                    "Can only call functions and classes.",
                ))
            }
        };

        if values.len() != callable.arity() {
            return Err(RuntimeError::Arity {
                expected: callable.arity(),
                got: values.len(),
                line: paren.line,
            });
        }

        callable.call(self, values, paren)
    }

    /// `super.method`: the superclass sits at the recorded distance, `this`
    /// one frame closer.
    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> ExecResult<Value> {
        let distance = self
            .locals
            .get(&id)
            .copied()
            .ok_or_else(|| RuntimeError::undefined_variable(&keyword.lexeme, keyword.line))?;

        let superclass = match Environment::get_at(&self.environment, distance, keyword)? {
            Value::Class(class) => class,
            _ => {
                return Err(RuntimeError::InvalidSuperclass {
                    reason: "Superclass must be a class.",
                    line: keyword.line,
                })
            }
        };

        let this = Token::synthetic(THIS_KEYWORD, keyword.line);
        let object = match Environment::get_at(&self.environment, distance.saturating_sub(1), &this)? {
            Value::Instance(instance) => instance,
            _ => {
                return Err(RuntimeError::type_error(
                    keyword.line,
                    "'this' is not bound to an instance.",
                ))
            }
        };

        superclass
            .find_method(&method.lexeme)
            .map(|found| Value::Function(Rc::new(found.bind(object))))
            .ok_or_else(|| RuntimeError::UndefinedProperty {
                name: method.lexeme.clone(),
                line: method.line,
            })
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> ExecResult<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }
}
