//! Abstract syntax tree consumed by the resolver and the interpreter.
//!
//! Both categories are closed sum types; every pass matches on them
//! exhaustively. Nodes own their tokens so a function body can be shared
//! (through `Rc<FunctionDecl>`) by every closure created from it, long after
//! the source text is gone.

use std::rc::Rc;

use serde::Serialize;

use crate::token::Token;

/// Identity of one syntactic occurrence of a variable, assignment, `this` or
/// `super` reference. Keys the interpreter's resolution table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExprId(pub usize);

/// Hands out [`ExprId`]s. A driver keeps one allocator for its whole
/// lifetime so ids never repeat between batches.
#[derive(Debug, Default)]
pub struct ExprIds {
    next: usize,
}

impl ExprIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> ExprId {
        let id = ExprId(self.next);
        self.next += 1;
        id
    }
}

/// A literal constant that appears directly in the source code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    Number(f64),
    Str(String),
    True,
    False,
    Nil,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(LiteralValue),

    /// `!x` or `-x`
    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    /// Arithmetic, comparison and equality operators.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    Grouping(Box<Expr>),

    Variable {
        id: ExprId,
        name: Token,
    },

    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        /// The closing `)`, retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// object.property
    Get {
        object: Box<Expr>,
        name: Token,
    },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    This {
        id: ExprId,
        keyword: Token,
    },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}

/// A named function or method: shared between the AST and every closure
/// built from it.
#[derive(Debug, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Expression(Expr),

    Print {
        keyword: Token,
        value: Expr,
    },

    /// `var name = initializer;`, the initializer defaults to `nil`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword, for error locations.
        keyword: Token,
        value: Option<Expr>,
    },

    Class {
        name: Token,
        /// Always an `Expr::Variable` when present.
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
