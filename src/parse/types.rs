//! Token and structural-model types shared by the lexer, parser, registry,
//! and analyzer.

use std::fmt;

use serde::Serialize;

/// Lexical token category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End of input. The lexer always terminates the stream with one.
    End,
    Ident,
    Number,
    String,
    Keyword,
    Operator,
    Punctuation,
}

/// A lexical token with its source position (1-indexed line and column).
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn end(line: usize, column: usize) -> Self {
        Self {
            kind: TokenKind::End,
            text: String::new(),
            line,
            column,
        }
    }
}

/// A C++ class or struct, possibly assembled from several files.
#[derive(Debug, Clone, Default)]
pub struct Class {
    pub name: String,
    /// Origin file. After a cross-file merge this may carry extra basenames
    /// appended for display (`"a.h, a.cpp"`).
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
    pub members: Vec<Member>,
    pub constructor: Option<Function>,
    pub destructor: Option<Function>,
    pub methods: Vec<Function>,
}

/// A class member variable declaration.
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    /// Remaining identifier tokens of the declaration, space-joined.
    /// Display only; never consulted by the rules.
    pub type_text: String,
    pub is_pointer: bool,
    pub is_array: bool,
    pub line: usize,
}

/// A constructor, destructor, or regular method body with the facts the
/// analyzer needs: allocations, deallocations, invoked method names, and
/// local pointer aliases, all in source order.
#[derive(Debug, Clone, Default)]
pub struct Function {
    pub name: String,
    pub is_destructor: bool,
    pub start_line: usize,
    pub end_line: usize,
    pub allocations: Vec<Allocation>,
    pub deallocations: Vec<Deallocation>,
    /// Names of methods invoked inside the body.
    pub calls: Vec<String>,
    pub aliases: Vec<PointerAlias>,
}

/// A `new` expression assigned to a named variable.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub var: String,
    /// true for `new[]`, false for scalar `new`.
    pub is_array: bool,
    pub line: usize,
}

/// A `delete` statement naming a variable.
#[derive(Debug, Clone)]
pub struct Deallocation {
    pub var: String,
    /// true for `delete[]`, false for scalar `delete`.
    pub is_array: bool,
    pub line: usize,
}

/// An assignment of one plain identifier to another inside a function body,
/// establishing a second local name for the same heap object.
#[derive(Debug, Clone)]
pub struct PointerAlias {
    /// The left-hand side (`target = source`).
    pub target: String,
    pub source: String,
    pub line: usize,
}

/// Severity of a reported defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A detected memory defect. Field order matches the JSON report contract.
#[derive(Debug, Clone, Serialize)]
pub struct Leak {
    pub file: String,
    pub line: usize,
    #[serde(rename = "class")]
    pub class_name: String,
    pub variable: String,
    pub reason: String,
    pub severity: Severity,
}
