//! Solver model parser
//!
//! Grammar (after the leading `sat` line):
//! ```text
//! model   := '(' 'model'? entry* ')'
//! entry   := '(' 'define-fun' SYMBOL '(' ')' sort value ')'
//!          | sexpr                               ; anything else is skipped
//! sort    := 'Int' | 'Real' | 'String' | sexpr   ; other sorts are skipped
//! int     := NUMERAL | '(' '-' NUMERAL ')'
//! real    := DECIMAL | NUMERAL | '(' '-' real ')' | '(' '/' real real ')'
//! string  := STRING
//! ```
//! Comments (`;` to end of line) are ignored. `|quoted|` symbols lose their bars.

use crate::features::symbolic::domain::{Model, Value};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at offset {offset}")]
pub struct ModelParseError {
    pub message: String,
    pub offset: usize,
}

type ParseResult<T> = Result<T, ModelParseError>;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Symbol(String),
    Str(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Open => f.write_str("'('"),
            Token::Close => f.write_str("')'"),
            Token::Symbol(s) => write!(f, "symbol '{}'", s),
            Token::Str(s) => write!(f, "string {:?}", s),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Lexer
// ═══════════════════════════════════════════════════════════════════════════

fn tokenize(input: &str) -> ParseResult<Vec<(Token, usize)>> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            ';' => {
                while i < chars.len() && chars[i].1 != '\n' {
                    i += 1;
                }
            }
            '(' => {
                tokens.push((Token::Open, offset));
                i += 1;
            }
            ')' => {
                tokens.push((Token::Close, offset));
                i += 1;
            }
            '"' => {
                let mut raw = String::new();
                i += 1;
                loop {
                    let Some(&(_, c)) = chars.get(i) else {
                        return Err(err("unterminated string literal", offset));
                    };
                    match c {
                        '\\' => {
                            raw.push('\\');
                            if let Some(&(_, next)) = chars.get(i + 1) {
                                raw.push(next);
                            }
                            i += 2;
                        }
                        '"' if matches!(chars.get(i + 1), Some(&(_, '"'))) => {
                            raw.push('"');
                            i += 2;
                        }
                        '"' => {
                            i += 1;
                            break;
                        }
                        other => {
                            raw.push(other);
                            i += 1;
                        }
                    }
                }
                tokens.push((Token::Str(decode_escapes(&raw)), offset));
            }
            '|' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end].1 != '|' {
                    end += 1;
                }
                if end >= chars.len() {
                    return Err(err("unterminated quoted symbol", offset));
                }
                let name: String = chars[start..end].iter().map(|(_, c)| *c).collect();
                tokens.push((Token::Symbol(name), offset));
                i = end + 1;
            }
            _ => {
                let mut name = String::new();
                while i < chars.len() {
                    let c = chars[i].1;
                    if c.is_whitespace() || matches!(c, '(' | ')' | '"' | ';') {
                        break;
                    }
                    name.push(c);
                    i += 1;
                }
                tokens.push((Token::Symbol(name), offset));
            }
        }
    }

    Ok(tokens)
}

/// Decode backslash escapes used by solvers in string models
fn decode_escapes(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' || i + 1 >= chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let esc = chars[i + 1];
        let simple = match esc {
            '\\' => Some('\\'),
            '"' => Some('"'),
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            'b' => Some('\u{8}'),
            'f' => Some('\u{c}'),
            'v' => Some('\u{b}'),
            'a' => Some('\u{7}'),
            _ => None,
        };
        if let Some(c) = simple {
            out.push(c);
            i += 2;
            continue;
        }

        let (hex, consumed) = match esc {
            'x' => take_hex(&chars[i + 2..], 2, 2),
            'u' if chars.get(i + 2) == Some(&'{') => {
                let body = &chars[i + 3..];
                match body.iter().position(|c| *c == '}') {
                    Some(close) if (1..=5).contains(&close) => (
                        u32::from_str_radix(&body[..close].iter().collect::<String>(), 16).ok(),
                        close + 2,
                    ),
                    _ => (None, 0),
                }
            }
            'u' => take_hex(&chars[i + 2..], 4, 4),
            _ => (None, 0),
        };

        match hex.and_then(char::from_u32) {
            Some(c) => {
                out.push(c);
                i += 2 + consumed;
            }
            None => {
                // unknown escape: keep verbatim
                out.push('\\');
                i += 1;
            }
        }
    }

    out
}

fn take_hex(chars: &[char], min: usize, max: usize) -> (Option<u32>, usize) {
    let digits: String = chars
        .iter()
        .take(max)
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    if digits.len() < min {
        return (None, 0);
    }
    (u32::from_str_radix(&digits, 16).ok(), digits.len())
}

fn err(message: impl Into<String>, offset: usize) -> ModelParseError {
    ModelParseError {
        message: message.into(),
        offset,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Parser
// ═══════════════════════════════════════════════════════════════════════════

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn new(input: &str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            end: input.len(),
        })
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(_, o)| *o)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead).map(|(t, _)| t)
    }

    fn next(&mut self) -> ParseResult<Token> {
        let offset = self.offset();
        let token = self
            .tokens
            .get(self.pos)
            .map(|(t, _)| t.clone())
            .ok_or_else(|| err("unexpected end of output", offset))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let offset = self.offset();
        let got = self.next()?;
        if got == expected {
            Ok(())
        } else {
            Err(err(format!("expected {}, found {}", expected, got), offset))
        }
    }

    fn symbol(&mut self) -> ParseResult<String> {
        let offset = self.offset();
        match self.next()? {
            Token::Symbol(s) => Ok(s),
            other => Err(err(format!("expected symbol, found {}", other), offset)),
        }
    }

    /// Skip one balanced s-expression
    fn skip_sexpr(&mut self) -> ParseResult<()> {
        let mut depth = 0usize;
        loop {
            match self.next()? {
                Token::Open => depth += 1,
                Token::Close => {
                    if depth == 0 {
                        return Err(err("unbalanced ')'", self.offset()));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    fn model(&mut self) -> ParseResult<Model> {
        self.expect(Token::Open)?;
        if self.peek() == Some(&Token::Symbol("model".to_string())) {
            self.pos += 1;
        }

        let mut model = Model::new();
        while self.peek() != Some(&Token::Close) {
            let is_define = self.peek() == Some(&Token::Open)
                && self.peek_at(1) == Some(&Token::Symbol("define-fun".to_string()));
            if !is_define {
                self.skip_sexpr()?;
                continue;
            }
            if let Some((name, value)) = self.define_fun()? {
                model.insert(name, value);
            }
        }
        self.expect(Token::Close)?;
        Ok(model)
    }

    /// `None` for functions with arguments or unknown sorts
    fn define_fun(&mut self) -> ParseResult<Option<(String, Value)>> {
        self.expect(Token::Open)?;
        self.expect(Token::Symbol("define-fun".to_string()))?;
        let name = self.symbol()?;

        self.expect(Token::Open)?;
        if self.peek() != Some(&Token::Close) {
            // function with parameters: skip rest of the entry
            while self.peek() != Some(&Token::Close) {
                self.skip_sexpr()?;
            }
            self.expect(Token::Close)?;
            self.skip_rest_of_list()?;
            return Ok(None);
        }
        self.expect(Token::Close)?;

        let value = match self.peek() {
            Some(Token::Symbol(sort)) if sort == "Int" => {
                self.pos += 1;
                Some(Value::Int(self.int_value()?))
            }
            Some(Token::Symbol(sort)) if sort == "Real" => {
                self.pos += 1;
                Some(Value::Real(self.real_value()?))
            }
            Some(Token::Symbol(sort)) if sort == "String" => {
                self.pos += 1;
                Some(Value::Str(self.string_value()?))
            }
            _ => {
                tracing::trace!(name = %name, "skipping model entry of unsupported sort");
                self.skip_sexpr()?; // sort
                self.skip_sexpr()?; // value
                None
            }
        };

        self.expect(Token::Close)?;
        Ok(value.map(|v| (name, v)))
    }

    fn skip_rest_of_list(&mut self) -> ParseResult<()> {
        while self.peek() != Some(&Token::Close) {
            self.skip_sexpr()?;
        }
        self.expect(Token::Close)
    }

    fn int_value(&mut self) -> ParseResult<i64> {
        let offset = self.offset();
        match self.next()? {
            Token::Symbol(digits) => parse_numeral(&digits, false, offset),
            Token::Open => {
                self.expect(Token::Symbol("-".to_string()))?;
                let offset = self.offset();
                let digits = self.symbol()?;
                let v = parse_numeral(&digits, true, offset)?;
                self.expect(Token::Close)?;
                Ok(v)
            }
            other => Err(err(format!("expected integer, found {}", other), offset)),
        }
    }

    fn real_value(&mut self) -> ParseResult<f64> {
        let offset = self.offset();
        match self.next()? {
            Token::Symbol(text) => text
                .parse::<f64>()
                .ok()
                .filter(|_| text.starts_with(|c: char| c.is_ascii_digit()))
                .ok_or_else(|| err(format!("invalid real literal '{}'", text), offset)),
            Token::Open => {
                let op_offset = self.offset();
                let v = match self.symbol()?.as_str() {
                    "-" => -self.real_value()?,
                    "/" => {
                        let numerator = self.real_value()?;
                        let denominator = self.real_value()?;
                        numerator / denominator
                    }
                    other => {
                        return Err(err(
                            format!("unexpected operator '{}' in real value", other),
                            op_offset,
                        ))
                    }
                };
                self.expect(Token::Close)?;
                Ok(v)
            }
            other => Err(err(format!("expected real, found {}", other), offset)),
        }
    }

    fn string_value(&mut self) -> ParseResult<String> {
        let offset = self.offset();
        match self.next()? {
            Token::Str(s) => Ok(s),
            other => Err(err(format!("expected string literal, found {}", other), offset)),
        }
    }
}

fn parse_numeral(digits: &str, negative: bool, offset: usize) -> ParseResult<i64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err(format!("invalid numeral '{}'", digits), offset));
    }
    let text = if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    };
    text.parse::<i64>()
        .map_err(|_| err(format!("integer '{}' out of 64-bit range", text), offset))
}

/// Parse the model that follows a `sat` answer. An empty model is an error.
pub fn parse_model(text: &str) -> ParseResult<Model> {
    let mut parser = Parser::new(text)?;
    let model = parser.model()?;
    if model.is_empty() {
        return Err(err("solver returned an empty model", 0));
    }
    Ok(model)
}

/// Message of an `(error "...")` response
pub fn parse_error_message(text: &str) -> Option<String> {
    let mut parser = Parser::new(text).ok()?;
    parser.expect(Token::Open).ok()?;
    parser.expect(Token::Symbol("error".to_string())).ok()?;
    parser.string_value().ok()
}
