//! Tolerant C++ lexer.
//!
//! Produces a best-effort token stream for the skeleton parser. The lexer
//! never fails: comments, preprocessor lines, and whitespace are discarded,
//! unterminated literals are returned as-is, and bytes it does not recognize
//! are silently skipped.

use super::types::{Token, TokenKind};

/// The fixed keyword set. Everything else that scans as an identifier is
/// emitted as `Ident`.
fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "class" | "struct" | "public" | "private" | "protected"
            | "new" | "delete" | "virtual" | "const" | "static"
            | "void" | "int" | "char" | "float" | "double"
            | "bool" | "long" | "short" | "unsigned" | "signed"
            | "if" | "else" | "for" | "while" | "do"
            | "return" | "nullptr" | "NULL" | "this"
            | "template" | "typename" | "namespace" | "using"
    )
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Greedy number continuation: digits, `.`, hex markers and hex digits.
/// Numeric values are never inspected downstream, so one token class covers
/// integers, floats, and hex literals alike.
fn is_number_continue(b: u8) -> bool {
    b.is_ascii_digit()
        || b == b'.'
        || b == b'x'
        || b == b'X'
        || (b'a'..=b'f').contains(&b)
        || (b'A'..=b'F').contains(&b)
}

fn is_operator_byte(b: u8) -> bool {
    matches!(
        b,
        b'+' | b'-' | b'*' | b'/' | b'=' | b'<' | b'>' | b'!' | b'&' | b'|' | b'^' | b'%' | b'~'
    )
}

fn is_punctuation_byte(b: u8) -> bool {
    matches!(
        b,
        b'{' | b'}' | b'(' | b')' | b'[' | b']' | b';' | b',' | b':' | b'.'
    )
}

/// Two-character operators recognized greedily before single-character ones.
const TWO_CHAR_OPERATORS: &[&str] = &[
    "::", "->", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=",
];

/// Byte-walking lexer with 1-indexed line/column tracking.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Scan the entire input and return the token stream, terminated by a
    /// single `End` token.
    pub fn tokenize(mut self) -> Vec<Token> {
        while self.pos < self.input.len() {
            self.skip_whitespace_and_comments();
            if self.pos >= self.input.len() {
                break;
            }

            let b = self.input[self.pos];

            // Scope operator before ':' falls through to punctuation.
            if b == b':' && self.peek() == Some(b':') {
                self.push(TokenKind::Operator, "::");
                self.advance();
                self.advance();
                continue;
            }

            match b {
                b'"' | b'\'' => self.read_string(b),
                b'#' => self.skip_preprocessor(),
                _ if is_ident_start(b) => self.read_identifier(),
                _ if b.is_ascii_digit() => self.read_number(),
                _ if is_operator_byte(b) => self.read_operator(),
                _ if is_punctuation_byte(b) => {
                    self.push(TokenKind::Punctuation, &(b as char).to_string());
                    self.advance();
                }
                _ => self.advance(),
            }
        }

        self.tokens.push(Token::end(self.line, self.column));
        self.tokens
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            if self.input[self.pos] == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos + 1).copied()
    }

    fn push(&mut self, kind: TokenKind, text: &str) {
        self.tokens.push(Token {
            kind,
            text: text.to_string(),
            line: self.line,
            column: self.column,
        });
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.pos < self.input.len() {
            let b = self.input[self.pos];
            if b == b' ' || b == b'\t' || b == b'\r' || b == b'\n' {
                self.advance();
            } else if b == b'/' && self.peek() == Some(b'/') {
                while self.pos < self.input.len() && self.input[self.pos] != b'\n' {
                    self.advance();
                }
            } else if b == b'/' && self.peek() == Some(b'*') {
                self.advance();
                self.advance();
                // Unterminated block comments consume to end of input.
                while self.pos < self.input.len() {
                    if self.input[self.pos] == b'*' && self.peek() == Some(b'/') {
                        self.advance();
                        self.advance();
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Consume a preprocessor line, honoring backslash-newline continuation.
    fn skip_preprocessor(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos] != b'\n' {
            if self.input[self.pos] == b'\\' && self.peek() == Some(b'\n') {
                self.advance();
                self.advance();
                continue;
            }
            self.advance();
        }
    }

    fn read_string(&mut self, quote: u8) {
        let start_line = self.line;
        let start_col = self.column;
        let mut text = String::new();
        text.push(quote as char);
        self.advance();

        while self.pos < self.input.len() {
            let b = self.input[self.pos];
            if b == b'\\' && self.pos + 1 < self.input.len() {
                text.push(b as char);
                self.advance();
                if self.pos < self.input.len() {
                    text.push(self.input[self.pos] as char);
                    self.advance();
                }
            } else if b == quote {
                text.push(b as char);
                self.advance();
                break;
            } else if b == b'\n' {
                // Unterminated literal; emit what was collected.
                break;
            } else {
                text.push(b as char);
                self.advance();
            }
        }

        self.tokens.push(Token {
            kind: TokenKind::String,
            text,
            line: start_line,
            column: start_col,
        });
    }

    fn read_identifier(&mut self) {
        let start_line = self.line;
        let start_col = self.column;
        let start = self.pos;

        while self.pos < self.input.len() && is_ident_continue(self.input[self.pos]) {
            self.advance();
        }

        let text = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        let kind = if is_keyword(&text) {
            TokenKind::Keyword
        } else {
            TokenKind::Ident
        };

        self.tokens.push(Token {
            kind,
            text,
            line: start_line,
            column: start_col,
        });
    }

    fn read_number(&mut self) {
        let start_line = self.line;
        let start_col = self.column;
        let start = self.pos;

        while self.pos < self.input.len() && is_number_continue(self.input[self.pos]) {
            self.advance();
        }

        self.tokens.push(Token {
            kind: TokenKind::Number,
            text: String::from_utf8_lossy(&self.input[start..self.pos]).into_owned(),
            line: start_line,
            column: start_col,
        });
    }

    fn read_operator(&mut self) {
        let start_line = self.line;
        let start_col = self.column;

        if self.pos + 1 < self.input.len() {
            let two = &self.input[self.pos..self.pos + 2];
            if let Ok(two) = std::str::from_utf8(two) {
                if TWO_CHAR_OPERATORS.contains(&two) {
                    let text = two.to_string();
                    self.advance();
                    self.advance();
                    self.tokens.push(Token {
                        kind: TokenKind::Operator,
                        text,
                        line: start_line,
                        column: start_col,
                    });
                    return;
                }
            }
        }

        let text = (self.input[self.pos] as char).to_string();
        self.advance();
        self.tokens.push(Token {
            kind: TokenKind::Operator,
            text,
            line: start_line,
            column: start_col,
        });
    }
}

/// Tokenize a complete source text.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}
