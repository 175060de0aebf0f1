//! Rule parsing, combination and evaluation
//!
//! This module turns rule strings like "age > 30 AND department = 'Sales'"
//! into an AST and evaluates it against a record.

mod ast;
pub mod cache;
mod combinator;
mod evaluator;
pub mod parser;


pub use ast::*;
pub use cache::*;
pub use combinator::*;
pub use evaluator::*;
pub use parser::*;
