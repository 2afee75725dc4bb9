//! The snippet language: a small, Python-compatible statement subset.
//!
//! A snippet is a sequence of assignments and expression statements built
//! from literals, names, attribute access, calls and subscripts. It is parsed
//! up front into a [`Script`] so that the executor only ever walks typed
//! operation descriptors, never raw text.

mod ast;
mod lexer;
mod parser;

pub use ast::{Expr, Literal, Script, Statement};
pub use parser::parse;
