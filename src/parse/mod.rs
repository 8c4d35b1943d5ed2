//! Lexing, parsing, and cross-file merging of C++ class structure.

pub mod lexer;
pub mod parser;
pub mod registry;
pub mod types;

pub use registry::ClassRegistry;
pub use types::{
    Allocation, Class, Deallocation, Function, Leak, Member, PointerAlias, Severity, Token,
    TokenKind,
};
