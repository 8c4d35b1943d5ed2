//! Permissive C++ class/function skeleton parser.
//!
//! Walks the flat token stream making local decisions with small look-ahead
//! windows, and skips anything it does not recognize by advancing one token.
//! It recovers just enough structure for leak analysis: class records with
//! pointer members plus constructor/destructor/method bodies annotated with
//! allocations, deallocations, invoked method names, and pointer aliases.
//! Templates, macros, and initializer lists are deliberately not understood.

use super::lexer::tokenize;
use super::types::{
    Allocation, Class, Deallocation, Function, Member, PointerAlias, Token, TokenKind,
};

/// Parse one file's source text into class records.
///
/// `file` is the label recorded on every class (callers pass the absolute
/// path). Parsing never fails; unrecognized constructs are skipped.
pub fn parse_source(file: &str, source: &str) -> Vec<Class> {
    Parser {
        tokens: tokenize(source),
        pos: 0,
        file: file.to_string(),
        classes: Vec::new(),
    }
    .parse()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: String,
    classes: Vec<Class>,
}

impl Parser {
    fn parse(mut self) -> Vec<Class> {
        while !self.at_end() {
            if self.match_keyword("class") || self.match_keyword("struct") {
                if let Some(class) = self.parse_class() {
                    self.classes.push(class);
                }
            } else if self.is_out_of_class_method() {
                self.parse_out_of_class_method();
            } else {
                self.advance();
            }
        }
        self.classes
    }

    /// Look ahead for `Type ClassName::name(`: a `::` within 10 tokens,
    /// followed within the next 4 by a `(`, with no statement boundary first.
    fn is_out_of_class_method(&self) -> bool {
        for i in 0..10 {
            let Some(tok) = self.tokens.get(self.pos + i) else {
                break;
            };
            if tok.text == "::" {
                for j in (i + 1)..(i + 5) {
                    let Some(t) = self.tokens.get(self.pos + j) else {
                        break;
                    };
                    if t.text == "(" {
                        return true;
                    }
                    if t.text == ";" {
                        return false;
                    }
                }
            }
            if tok.text == ";" || tok.text == "{" || tok.text == "}" {
                return false;
            }
        }
        false
    }

    /// Parse `T Class::method(...) { ... }` or `Class::~Class() { ... }` and
    /// attach the function to the class record of that name, creating a
    /// placeholder record when the class was declared in another file.
    fn parse_out_of_class_method(&mut self) {
        let start_line = self.current().line;

        let mut class_name = String::new();
        while !self.at_end() && !self.check_text("::") {
            if self.check(TokenKind::Ident) {
                class_name = self.current().text.clone();
            }
            self.advance();
        }
        if class_name.is_empty() {
            // A leading `::` with no qualifier. Skip one token so the
            // top-level loop always makes progress.
            self.advance();
            return;
        }
        if !self.match_text("::") {
            return;
        }

        let is_destructor = self.check_text("~");
        if is_destructor {
            self.advance();
        }

        if !self.check(TokenKind::Ident) {
            return;
        }
        let method_name = self.current().text.clone();
        self.advance();

        if !self.match_text("(") {
            return;
        }
        let mut depth = 1usize;
        while !self.at_end() && depth > 0 {
            if self.check_text("(") {
                depth += 1;
            } else if self.check_text(")") {
                depth -= 1;
            }
            self.advance();
        }

        // Constructor initializer list.
        if self.check_text(":") && !is_destructor {
            self.advance();
            while !self.at_end() && !self.check_text("{") && !self.check_text(";") {
                self.advance();
            }
        }

        if !self.check_text("{") {
            return;
        }

        let mut func = Function {
            name: method_name.clone(),
            is_destructor,
            start_line,
            ..Default::default()
        };
        self.parse_function_body(&mut func);

        let idx = match self.classes.iter().position(|c| c.name == class_name) {
            Some(i) => i,
            None => {
                self.classes.push(Class {
                    name: class_name.clone(),
                    file: self.file.clone(),
                    ..Default::default()
                });
                self.classes.len() - 1
            }
        };

        let class = &mut self.classes[idx];
        if is_destructor {
            class.destructor = Some(func);
        } else if method_name == class_name {
            class.constructor = Some(func);
        } else {
            class.methods.push(func);
        }
    }

    /// Parse an inline class body. The `class`/`struct` keyword has already
    /// been consumed; the next identifier is the class name.
    fn parse_class(&mut self) -> Option<Class> {
        if !self.check(TokenKind::Ident) {
            return None;
        }
        let name = self.current().text.clone();
        let start_line = self.current().line;
        self.advance();

        // Inheritance list is ignored.
        while !self.at_end() && !self.check_text("{") && !self.check_text(";") {
            self.advance();
        }
        if self.check_text(";") {
            return None; // forward declaration
        }
        if !self.match_text("{") {
            return None;
        }

        let mut class = Class {
            name: name.clone(),
            file: self.file.clone(),
            start_line,
            ..Default::default()
        };

        let mut depth = 1usize;
        while !self.at_end() && depth > 0 {
            if self.check_text("{") {
                depth += 1;
                self.advance();
            } else if self.check_text("}") {
                depth -= 1;
                if depth == 0 {
                    class.end_line = self.current().line;
                }
                self.advance();
            } else if self.check_keyword("public")
                || self.check_keyword("private")
                || self.check_keyword("protected")
            {
                self.advance();
                self.match_text(":");
            } else if self.is_destructor_start(&name) {
                if let Some(func) = self.parse_destructor(&name) {
                    class.destructor = Some(func);
                }
            } else if self.is_constructor_start(&name) {
                if let Some(func) = self.parse_constructor(&name) {
                    class.constructor = Some(func);
                }
            } else if self.is_member_declaration() {
                if let Some(member) = self.parse_member() {
                    class.members.push(member);
                }
            } else if self.is_function_start() {
                if let Some(func) = self.parse_method() {
                    class.methods.push(func);
                }
            } else {
                self.advance();
            }
        }

        Some(class)
    }

    fn is_destructor_start(&self, class_name: &str) -> bool {
        if self.check_text("~") && self.peek_text(1) == Some(class_name) {
            return true;
        }
        self.check_keyword("virtual") && self.peek_text(1) == Some("~")
    }

    fn is_constructor_start(&self, class_name: &str) -> bool {
        self.check(TokenKind::Ident)
            && self.current().text == class_name
            && self.peek_text(1) == Some("(")
    }

    fn parse_destructor(&mut self, class_name: &str) -> Option<Function> {
        let start_line = self.current().line;

        if self.check_keyword("virtual") {
            self.advance();
        }
        self.match_text("~");
        self.advance(); // class name

        if !self.match_text("(") {
            return None;
        }
        while !self.at_end() && !self.check_text(")") {
            self.advance();
        }
        self.match_text(")");

        let mut func = Function {
            name: format!("~{class_name}"),
            is_destructor: true,
            start_line,
            ..Default::default()
        };

        // Declaration only; the body lives out of class.
        if self.check_text(";") {
            self.advance();
            return Some(func);
        }
        if self.check_text("{") {
            self.parse_function_body(&mut func);
        }
        Some(func)
    }

    fn parse_constructor(&mut self, class_name: &str) -> Option<Function> {
        let start_line = self.current().line;
        self.advance(); // class name

        if !self.match_text("(") {
            return None;
        }
        while !self.at_end() && !self.check_text(")") {
            self.advance();
        }
        self.match_text(")");

        let mut func = Function {
            name: class_name.to_string(),
            start_line,
            ..Default::default()
        };

        // Initializer list.
        if self.check_text(":") {
            self.advance();
            while !self.at_end() && !self.check_text("{") && !self.check_text(";") {
                self.advance();
            }
        }

        if self.check_text(";") {
            self.advance();
            return Some(func);
        }
        if self.check_text("{") {
            self.parse_function_body(&mut func);
        }
        Some(func)
    }

    /// Parse a generic method. Declarations (terminated by `;`) yield no
    /// record; only bodies contribute facts the analyzer can use.
    fn parse_method(&mut self) -> Option<Function> {
        let start_line = self.current().line;

        // Skip return type and modifiers.
        while !self.at_end()
            && !self.check_text("(")
            && !self.check_text(";")
            && !self.check_text("{")
        {
            self.advance();
        }
        if self.check_text(";") {
            self.advance();
            return None;
        }

        // The identifier just before '(' is the method name.
        let name = if self.pos > 0 {
            self.tokens[self.pos - 1].text.clone()
        } else {
            String::new()
        };

        if !self.match_text("(") {
            return None;
        }
        let mut depth = 1usize;
        while !self.at_end() && depth > 0 {
            if self.check_text("(") {
                depth += 1;
            } else if self.check_text(")") {
                depth -= 1;
            }
            self.advance();
        }

        let mut func = Function {
            name,
            start_line,
            ..Default::default()
        };

        // Trailing qualifiers: const, noexcept and friends.
        while self.check_keyword("const") || self.check(TokenKind::Ident) {
            self.advance();
        }

        if self.check_text(";") {
            self.advance();
            return None;
        }
        if self.check_text("{") {
            self.parse_function_body(&mut func);
        }
        Some(func)
    }

    /// Walk a brace-balanced body collecting allocations, deallocations,
    /// method invocations, and pointer aliases in source order.
    fn parse_function_body(&mut self, func: &mut Function) {
        if !self.match_text("{") {
            return;
        }

        let mut depth = 1usize;
        while !self.at_end() && depth > 0 {
            if self.check_text("{") {
                depth += 1;
                self.advance();
            } else if self.check_text("}") {
                depth -= 1;
                if depth == 0 {
                    func.end_line = self.current().line;
                }
                self.advance();
            } else if self.check_keyword("new") {
                if let Some(alloc) = self.parse_allocation() {
                    func.allocations.push(alloc);
                }
            } else if self.check_keyword("delete") {
                if let Some(dealloc) = self.parse_deallocation() {
                    func.deallocations.push(dealloc);
                }
            } else if self.check(TokenKind::Ident) {
                let name = self.current().text.clone();
                let line = self.current().line;

                if self.peek_text(1) == Some("(") {
                    func.calls.push(name.clone());
                }
                if let Some(alias) = self.check_pointer_alias(&name, line) {
                    func.aliases.push(alias);
                }

                self.advance();
            } else {
                self.advance();
            }
        }
    }

    /// `target = source;` with both sides plain identifiers and `source`
    /// not a fresh allocation.
    fn check_pointer_alias(&self, target: &str, line: usize) -> Option<PointerAlias> {
        let eq = self.tokens.get(self.pos + 1)?;
        if eq.text != "=" {
            return None;
        }
        let source = self.tokens.get(self.pos + 2)?;
        if source.kind != TokenKind::Ident || source.text == "new" {
            return None;
        }
        let after = self.tokens.get(self.pos + 3)?;
        if after.text == ";" || after.text == "}" || after.text == "," {
            return Some(PointerAlias {
                target: target.to_string(),
                source: source.text.clone(),
                line,
            });
        }
        None
    }

    fn parse_allocation(&mut self) -> Option<Allocation> {
        let line = self.current().line;
        self.advance(); // 'new'

        let mut is_array = self.check_text("[");

        // The assignment target sits behind us: `var = new T` or
        // `this->var = new T`.
        let var = self.find_assignment_target()?;

        while !self.at_end() && !self.check_text(";") && !self.check_text("{") {
            if self.check_text("[") {
                is_array = true;
            }
            self.advance();
        }

        Some(Allocation {
            var,
            is_array,
            line,
        })
    }

    /// Scan backwards up to 9 tokens for an `=`, then up to 4 further back
    /// for the first identifier that is not `this`.
    fn find_assignment_target(&self) -> Option<String> {
        let lo = self.pos.saturating_sub(9);
        for i in (lo..self.pos).rev() {
            if self.tokens[i].text == "=" {
                let jlo = i.saturating_sub(4);
                for j in (jlo..i).rev() {
                    let tok = &self.tokens[j];
                    if tok.kind == TokenKind::Ident && tok.text != "this" {
                        return Some(tok.text.clone());
                    }
                }
            }
        }
        None
    }

    fn parse_deallocation(&mut self) -> Option<Deallocation> {
        let line = self.current().line;
        self.advance(); // 'delete'

        let mut is_array = false;
        if self.check_text("[") {
            is_array = true;
            self.advance();
            self.match_text("]");
        }

        let mut var = String::new();
        if self.check_keyword("this") {
            self.advance();
            if self.check_text("->") {
                self.advance();
                if self.check(TokenKind::Ident) {
                    var = self.current().text.clone();
                }
            }
        } else if self.check(TokenKind::Ident) {
            var = self.current().text.clone();
        }

        if var.is_empty() {
            return None;
        }
        Some(Deallocation {
            var,
            is_array,
            line,
        })
    }

    /// A semicolon-terminated run within 10 tokens containing a `*` and an
    /// identifier, with no `(` or `{` before the `;`.
    fn is_member_declaration(&self) -> bool {
        let mut has_pointer = false;
        let mut has_ident = false;

        for i in 0..10 {
            let Some(tok) = self.tokens.get(self.pos + i) else {
                break;
            };
            if tok.text == ";" {
                break;
            }
            if tok.text == "(" || tok.text == "{" {
                return false;
            }
            if tok.text == "*" {
                has_pointer = true;
            }
            if tok.kind == TokenKind::Ident {
                has_ident = true;
            }
        }

        has_pointer && has_ident
    }

    fn parse_member(&mut self) -> Option<Member> {
        let start_line = self.current().line;

        let mut collected: Vec<Token> = Vec::new();
        while !self.at_end() && !self.check_text(";") {
            collected.push(self.current().clone());
            self.advance();
        }
        self.match_text(";");

        if collected.len() < 2 {
            return None;
        }

        let mut is_pointer = false;
        let mut is_array = false;
        let mut name = String::new();
        let mut type_tokens: Vec<&str> = Vec::new();

        for (i, tok) in collected.iter().enumerate() {
            if tok.text == "*" {
                is_pointer = true;
            } else if tok.text == "[" {
                is_array = true;
            } else if tok.kind == TokenKind::Ident {
                // The variable name is the last identifier that ends the
                // declaration or is followed by '[' or '='.
                let next = collected.get(i + 1).map(|t| t.text.as_str());
                if next.is_none() || next == Some("[") || next == Some("=") {
                    name = tok.text.clone();
                } else {
                    type_tokens.push(&tok.text);
                }
            }
        }

        if !is_pointer || name.is_empty() {
            return None;
        }
        Some(Member {
            name,
            type_text: type_tokens.join(" "),
            is_pointer,
            is_array,
            line: start_line,
        })
    }

    /// A `(` within the next 15 tokens before any statement boundary.
    fn is_function_start(&self) -> bool {
        for i in 0..15 {
            let Some(tok) = self.tokens.get(self.pos + i) else {
                break;
            };
            if tok.text == ";" {
                return false;
            }
            if tok.text == "(" {
                return true;
            }
            if tok.text == "{" || tok.text == "}" {
                return false;
            }
        }
        false
    }

    // ---- token navigation ----

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len() || self.tokens[self.pos].kind == TokenKind::End
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.at_end() && self.current().kind == kind
    }

    fn check_text(&self, text: &str) -> bool {
        !self.at_end() && self.current().text == text
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        self.check(TokenKind::Keyword) && self.current().text == keyword
    }

    fn match_text(&mut self, text: &str) -> bool {
        if self.check_text(text) {
            self.advance();
            return true;
        }
        false
    }

    fn match_keyword(&mut self, keyword: &str) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            return true;
        }
        false
    }

    fn peek_text(&self, offset: usize) -> Option<&str> {
        self.tokens.get(self.pos + offset).map(|t| t.text.as_str())
    }
}
