//! Core library for the Marmoset scripting language: lexing, Pratt parsing,
//! a reference-counted value model, lexical environments and a tree-walking
//! evaluator, plus the interactive front end.

pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runtime;
pub mod stdlib;
pub mod token;
pub mod value;

pub use diagnostics::{Diagnostic, MarmosetError, SourceSpan};
pub use parser::parse_program;
pub use repl::{Repl, ReplConfig};
pub use runtime::{Evaluator, Interpreter};
pub use stdlib::Builtins;
pub use value::{Value, ValueKind, ValueType};
