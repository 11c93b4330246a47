pub mod ast;
pub mod ast_printer;
pub mod class;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod lox;
pub mod natives;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod sink;
pub mod token;
pub mod value;

pub use lox::{Lox, Outcome};
