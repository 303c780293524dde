//! Sandboxed boolean expressions over named flags.
//!
//! Content authors write predicates such as `solvedA && !(solvedB || skipped)`
//! against a fixed set of boolean variables. The language has no side
//! effects and no access to anything but the bound names.
//!
//! # Grammar
//!
//! ```text
//! program  := ["return"] or [";"]*
//! or       := and (("||" | "or") and)*
//! and      := equality (("&&" | "and") equality)*
//! equality := unary (("==" | "===" | "!=" | "!==") unary)*
//! unary    := ("!" | "not") unary | primary
//! primary  := "true" | "false" | name | "this." name | "(" or ")"
//! ```
//!
//! The `return`/`this.` forms keep predicates written for the older
//! script-based engine working unchanged.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

/// Nesting limit for parentheses and prefix operators.
pub const MAX_DEPTH: usize = 64;

/// Longest accepted expression, in tokens.
pub const MAX_TOKENS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("Empty expression")]
    Empty,
    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("Unexpected '{found}' at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: &'static str,
    },
    #[error("Unexpected end of expression, expected {0}")]
    UnexpectedEnd(&'static str),
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("Expression nests too deeply")]
    TooDeep,
    #[error("Expression is longer than {max} tokens")]
    TooLong { max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    True,
    False,
    Name(String),
    Not,
    And,
    Or,
    Eq,
    Ne,
    LParen,
    RParen,
    Return,
    Semicolon,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::True => "true".into(),
            Token::False => "false".into(),
            Token::Name(name) => name.clone(),
            Token::Not => "!".into(),
            Token::And => "&&".into(),
            Token::Or => "||".into(),
            Token::Eq => "==".into(),
            Token::Ne => "!=".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Return => "return".into(),
            Token::Semicolon => ";".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Literal(bool),
    Var(String),
    Not(Box<Node>),
    And(Vec<Node>),
    Or(Vec<Node>),
    Eq(Box<Node>, Box<Node>),
    Ne(Box<Node>, Box<Node>),
}

impl Node {
    fn eval(&self, bindings: &HashMap<String, bool>) -> bool {
        match self {
            Node::Literal(value) => *value,
            // Presence is checked before evaluation starts.
            Node::Var(name) => bindings.get(name).copied().unwrap_or(false),
            Node::Not(inner) => !inner.eval(bindings),
            Node::And(operands) => operands.iter().all(|node| node.eval(bindings)),
            Node::Or(operands) => operands.iter().any(|node| node.eval(bindings)),
            Node::Eq(lhs, rhs) => lhs.eval(bindings) == rhs.eval(bindings),
            Node::Ne(lhs, rhs) => lhs.eval(bindings) != rhs.eval(bindings),
        }
    }

    fn collect_vars<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Node::Literal(_) => {}
            Node::Var(name) => {
                out.insert(name);
            }
            Node::Not(inner) => inner.collect_vars(out),
            Node::And(operands) | Node::Or(operands) => {
                for node in operands {
                    node.collect_vars(out);
                }
            }
            Node::Eq(lhs, rhs) | Node::Ne(lhs, rhs) => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
        }
    }
}

/// A parsed predicate, ready to evaluate against bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolExpr {
    root: Node,
}

impl BoolExpr {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(ExprError::Empty);
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let root = parser.program()?;
        Ok(Self { root })
    }

    /// Names the expression reads.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.root.collect_vars(&mut out);
        out
    }

    /// Evaluate with the given bindings. Every referenced name must be bound.
    pub fn eval(&self, bindings: &HashMap<String, bool>) -> Result<bool, ExprError> {
        if let Some(missing) = self
            .variables()
            .into_iter()
            .find(|name| !bindings.contains_key(*name))
        {
            return Err(ExprError::UnknownVariable(missing.to_string()));
        }
        Ok(self.root.eval(bindings))
    }
}

/// Single operands stay as they are; chains become one n-ary node.
fn flatten(mut operands: Vec<Node>, chain: fn(Vec<Node>) -> Node) -> Node {
    match operands.len() {
        1 => operands.swap_remove(0),
        _ => chain(operands),
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ExprError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        let next = chars.get(i + 1).map(|(_, c)| *c);
        let after = chars.get(i + 2).map(|(_, c)| *c);

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let (token, width) = match (c, next, after) {
            ('(', _, _) => (Token::LParen, 1),
            (')', _, _) => (Token::RParen, 1),
            (';', _, _) => (Token::Semicolon, 1),
            ('&', Some('&'), _) => (Token::And, 2),
            ('|', Some('|'), _) => (Token::Or, 2),
            ('=', Some('='), Some('=')) => (Token::Eq, 3),
            ('=', Some('='), _) => (Token::Eq, 2),
            ('!', Some('='), Some('=')) => (Token::Ne, 3),
            ('!', Some('='), _) => (Token::Ne, 2),
            ('!', _, _) => (Token::Not, 1),
            _ if is_name_start(c) => {
                let start = i;
                let mut end = i;
                while end < chars.len() && is_name_char(chars[end].1) {
                    end += 1;
                }
                let word: String = chars[start..end].iter().map(|(_, c)| *c).collect();

                // `this.name` is sugar for `name`
                if word == "this" && chars.get(end).map(|(_, c)| *c) == Some('.') {
                    let name_start = end + 1;
                    let mut name_end = name_start;
                    while name_end < chars.len() && is_name_char(chars[name_end].1) {
                        name_end += 1;
                    }
                    let name_is_valid = chars
                        .get(name_start)
                        .is_some_and(|(_, c)| is_name_start(*c));
                    if !name_is_valid {
                        let (bad_offset, bad) = chars.get(name_start).copied().unwrap_or((
                            source.len(),
                            '.',
                        ));
                        return Err(ExprError::UnexpectedChar {
                            ch: bad,
                            offset: bad_offset,
                        });
                    }
                    let name: String =
                        chars[name_start..name_end].iter().map(|(_, c)| *c).collect();
                    if tokens.len() == MAX_TOKENS {
                        return Err(ExprError::TooLong { max: MAX_TOKENS });
                    }
                    tokens.push((Token::Name(name), offset));
                    i = name_end;
                    continue;
                }

                let token = match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "return" => Token::Return,
                    _ => Token::Name(word),
                };
                (token, end - start)
            }
            _ => return Err(ExprError::UnexpectedChar { ch: c, offset }),
        };

        if tokens.len() == MAX_TOKENS {
            return Err(ExprError::TooLong { max: MAX_TOKENS });
        }
        tokens.push((token, offset));
        i += width;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn unexpected(&self, expected: &'static str) -> ExprError {
        match self.tokens.get(self.pos) {
            Some((token, offset)) => ExprError::UnexpectedToken {
                found: token.describe(),
                offset: *offset,
                expected,
            },
            None => ExprError::UnexpectedEnd(expected),
        }
    }

    fn program(&mut self) -> Result<Node, ExprError> {
        if self.peek() == Some(&Token::Return) {
            self.pos += 1;
        }
        let node = self.or()?;
        while self.peek() == Some(&Token::Semicolon) {
            self.pos += 1;
        }
        if self.pos < self.tokens.len() {
            return Err(self.unexpected("end of expression"));
        }
        Ok(node)
    }

    fn or(&mut self) -> Result<Node, ExprError> {
        let mut operands = vec![self.and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            operands.push(self.and()?);
        }
        Ok(flatten(operands, Node::Or))
    }

    fn and(&mut self) -> Result<Node, ExprError> {
        let mut operands = vec![self.equality()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            operands.push(self.equality()?);
        }
        Ok(flatten(operands, Node::And))
    }

    fn equality(&mut self) -> Result<Node, ExprError> {
        let mut node = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Eq) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    node = Node::Eq(Box::new(node), Box::new(rhs));
                }
                Some(Token::Ne) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    node = Node::Ne(Box::new(node), Box::new(rhs));
                }
                _ => return Ok(node),
            }
        }
    }

    fn unary(&mut self) -> Result<Node, ExprError> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            self.enter()?;
            let inner = self.unary();
            self.depth -= 1;
            return Ok(Node::Not(Box::new(inner?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Node, ExprError> {
        match self.advance() {
            Some((Token::True, _)) => Ok(Node::Literal(true)),
            Some((Token::False, _)) => Ok(Node::Literal(false)),
            Some((Token::Name(name), _)) => Ok(Node::Var(name)),
            Some((Token::LParen, _)) => {
                self.enter()?;
                let inner = self.or();
                self.depth -= 1;
                let inner = inner?;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some(_) => {
                        self.pos -= 1;
                        Err(self.unexpected("')'"))
                    }
                    None => Err(ExprError::UnexpectedEnd("')'")),
                }
            }
            Some(_) => {
                self.pos -= 1;
                Err(self.unexpected("a value"))
            }
            None => Err(ExprError::UnexpectedEnd("a value")),
        }
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        self.depth += 1;
        Ok(())
    }
}
