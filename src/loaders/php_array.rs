// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! PHP array literal loader.
//!
//! Reads config files of the form `<?php return [ 'key' => 'value', ... ];`
//! without executing any PHP. Only literal values are understood: strings,
//! numbers, booleans, `null` and nested `[...]` / `array(...)` arrays.

use crate::error::{Result, SyntaxError};
use crate::store::{Mapping, Node};
use indexmap::IndexMap;

use super::{Format, FormatLoader, LoadContext};

/// Loads PHP array literal files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpArrayLoader;

impl FormatLoader for PhpArrayLoader {
    fn format(&self) -> Format {
        Format::PhpArray
    }

    fn load(&self, ctx: &LoadContext<'_>) -> Result<Node> {
        let content = ctx.read_non_empty()?;
        tracing::debug!("Parsing PHP array source: {:?}", ctx.source);
        parse_php_array(&content)
    }
}

/// Parse a PHP source that returns an array literal.
pub fn parse_php_array(source: &str) -> Result<Node> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.document()
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    OpenTag,
    CloseTag,
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Arrow,
    Semicolon,
    Eof,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::PhpArray {
            line: self.line,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i).is_some_and(|p| p.eq_ignore_ascii_case(&c)))
    }

    fn tokenize(mut self) -> std::result::Result<Vec<(Token, usize)>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let line = self.line;
            let Some(c) = self.peek() else {
                tokens.push((Token::Eof, line));
                return Ok(tokens);
            };
            let token = match c {
                '<' if self.starts_with("<?php") => {
                    self.pos += 5;
                    Token::OpenTag
                }
                '?' if self.peek_at(1) == Some('>') => {
                    self.pos += 2;
                    Token::CloseTag
                }
                '[' => self.single(Token::LBracket),
                ']' => self.single(Token::RBracket),
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                ',' => self.single(Token::Comma),
                ';' => self.single(Token::Semicolon),
                '=' if self.peek_at(1) == Some('>') => {
                    self.pos += 2;
                    Token::Arrow
                }
                '\'' => self.single_quoted()?,
                '"' => self.double_quoted()?,
                '-' | '+' | '.' | '0'..='9' => self.number()?,
                c if c.is_alphabetic() || c == '_' => self.ident(),
                other => return Err(self.error(format!("unexpected character '{}'", other))),
            };
            tokens.push((token, line));
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn skip_trivia(&mut self) -> std::result::Result<(), SyntaxError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => self.skip_line(),
                Some('/') if self.peek_at(1) == Some('/') => self.skip_line(),
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.pos += 2;
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.pos += 1;
                                break;
                            }
                            Some(_) => {}
                            None => return Err(self.error("unterminated comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn single_quoted(&mut self) -> std::result::Result<Token, SyntaxError> {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\'') => return Ok(Token::Str(value)),
                Some('\\') => match self.peek() {
                    Some(c @ ('\'' | '\\')) => {
                        self.pos += 1;
                        value.push(c);
                    }
                    _ => value.push('\\'),
                },
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn double_quoted(&mut self) -> std::result::Result<Token, SyntaxError> {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Token::Str(value)),
                Some('\\') => {
                    let escaped = match self.peek() {
                        Some('n') => Some('\n'),
                        Some('t') => Some('\t'),
                        Some('r') => Some('\r'),
                        Some('v') => Some('\u{0B}'),
                        Some('f') => Some('\u{0C}'),
                        Some('0') => Some('\0'),
                        Some(c @ ('\\' | '"' | '$')) => Some(c),
                        _ => None,
                    };
                    match escaped {
                        Some(c) => {
                            self.bump();
                            value.push(c);
                        }
                        None => value.push('\\'),
                    }
                }
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn number(&mut self) -> std::result::Result<Token, SyntaxError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => self.pos += 1,
                '.' => {
                    is_float = true;
                    self.pos += 1;
                }
                'e' | 'E' => {
                    is_float = true;
                    self.pos += 1;
                    if matches!(self.peek(), Some('-' | '+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        let parsed = if is_float {
            text.parse::<f64>().ok().map(Token::Float)
        } else {
            text.parse::<i64>().ok().map(Token::Int)
        };
        parsed.ok_or_else(|| self.error(format!("invalid number '{}'", text)))
    }

    fn ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Token::Ident(self.chars[start..self.pos].iter().collect())
    }
}

/// Array key after PHP's key normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    fn from_node(node: Node) -> Option<Key> {
        match node {
            Node::Integer(i) => Some(Key::Int(i)),
            Node::Float(f) => Some(Key::Int(f as i64)),
            Node::Bool(b) => Some(Key::Int(i64::from(b))),
            Node::Null => Some(Key::Str(String::new())),
            Node::String(s) => Some(match canonical_int(&s) {
                Some(i) => Key::Int(i),
                None => Key::Str(s),
            }),
            _ => None,
        }
    }

    fn into_string(self) -> String {
        match self {
            Key::Int(i) => i.to_string(),
            Key::Str(s) => s,
        }
    }
}

// "5" and "-3" are integer keys in PHP, "05" and "+3" are not.
fn canonical_int(s: &str) -> Option<i64> {
    let value: i64 = s.parse().ok()?;
    (value.to_string() == s).then_some(value)
}

/// Recursive-descent parser over a token list that always ends in `Eof`.
struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    fn line(&self) -> usize {
        self.tokens[self.pos].1
    }

    // Never moves past the trailing Eof.
    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::PhpArray {
            line: self.line(),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> std::result::Result<(), SyntaxError> {
        if *self.peek() == expected {
            self.next();
            Ok(())
        } else {
            Err(self.error(format!("expected {}, found {:?}", what, self.peek())))
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Token::Ident(name) if name.eq_ignore_ascii_case(keyword))
    }

    fn document(&mut self) -> Result<Node> {
        if *self.peek() == Token::OpenTag {
            self.next();
        }
        if !self.is_keyword("return") {
            return Err(self.error("expected 'return' statement").into());
        }
        self.next();
        let value = self.value()?;
        if *self.peek() == Token::Semicolon {
            self.next();
        }
        if *self.peek() == Token::CloseTag {
            self.next();
        }
        if *self.peek() != Token::Eof {
            return Err(self.error(format!("unexpected {:?} after returned value", self.peek())).into());
        }
        if !value.is_container() {
            return Err(self.error("returned value is not an array").into());
        }
        Ok(value)
    }

    fn value(&mut self) -> std::result::Result<Node, SyntaxError> {
        match self.next() {
            Token::Str(s) => Ok(Node::String(s)),
            Token::Int(i) => Ok(Node::Integer(i)),
            Token::Float(f) => Ok(Node::Float(f)),
            Token::LBracket => self.array(Token::RBracket),
            Token::Ident(name) => match name.to_ascii_lowercase().as_str() {
                "true" => Ok(Node::Bool(true)),
                "false" => Ok(Node::Bool(false)),
                "null" => Ok(Node::Null),
                "array" => {
                    self.expect(Token::LParen, "'(' after array")?;
                    self.array(Token::RParen)
                }
                _ => Err(self.error(format!("unsupported expression '{}'", name))),
            },
            other => Err(self.error(format!("expected a value, found {:?}", other))),
        }
    }

    fn array(&mut self, close: Token) -> std::result::Result<Node, SyntaxError> {
        let mut entries: IndexMap<Key, Node> = IndexMap::new();
        let mut next_index: i64 = 0;
        loop {
            if *self.peek() == close {
                self.next();
                break;
            }
            let first = self.value()?;
            let (key, value) = if *self.peek() == Token::Arrow {
                self.next();
                let key = Key::from_node(first).ok_or_else(|| self.error("illegal array key"))?;
                (key, self.value()?)
            } else {
                (Key::Int(next_index), first)
            };
            if let Key::Int(i) = key {
                next_index = next_index.max(i.saturating_add(1));
            }
            entries.insert(key, value);

            match self.peek() {
                Token::Comma => {
                    self.next();
                }
                token if *token == close => {}
                other => return Err(self.error(format!("expected ',' or end of array, found {:?}", other))),
            }
        }
        Ok(into_node(entries))
    }
}

/// Arrays keyed exactly `0..n` in order are lists, everything else is a map.
fn into_node(entries: IndexMap<Key, Node>) -> Node {
    let is_list = entries
        .keys()
        .enumerate()
        .all(|(i, key)| *key == Key::Int(i as i64));
    if is_list {
        Node::Sequence(entries.into_values().collect())
    } else {
        Node::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (key.into_string(), value))
                .collect::<Mapping>(),
        )
    }
}
