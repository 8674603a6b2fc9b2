//! Lenient streaming JSON token reader
//!
//! Reads one structural token at a time without building a tree. The reader
//! accepts the loose dialect produced by the payload repair step: unquoted
//! identifier property names, single-quoted strings, the `\'` escape and raw
//! control characters inside strings. Everything else follows JSON.

use super::error::EnvelopeError;

/// A single token of a structured document
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    PropertyName(String),
    String(String),
    /// Number kept as its source text so precision is never lost
    Number(String),
    Bool(bool),
    Null,
}

impl Token {
    pub fn describe(&self) -> &'static str {
        match self {
            Token::StartObject => "object",
            Token::EndObject => "end of object",
            Token::StartArray => "array",
            Token::EndArray => "end of array",
            Token::PropertyName(_) => "property name",
            Token::String(_) => "string",
            Token::Number(_) => "number",
            Token::Bool(_) => "boolean",
            Token::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Value,
    FirstKeyOrEnd,
    Key,
    FirstValueOrEnd,
    CommaOrEnd,
    Done,
}

pub struct TokenReader<'a> {
    input: &'a str,
    pos: usize,
    stack: Vec<Frame>,
    expect: Expect,
}

impl<'a> TokenReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            stack: Vec::new(),
            expect: Expect::Value,
        }
    }

    /// Byte offset of the next unread character
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Number of containers currently open
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Reads the next token, or `None` once the root value has been closed
    /// and only whitespace remains.
    pub fn next_token(&mut self) -> Result<Option<Token>, EnvelopeError> {
        loop {
            self.skip_whitespace();

            match self.expect {
                Expect::Done => {
                    if self.pos < self.input.len() {
                        return Err(EnvelopeError::TrailingData { offset: self.pos });
                    }
                    return Ok(None);
                }
                Expect::Value => return self.read_value().map(Some),
                Expect::FirstKeyOrEnd => {
                    if self.peek() == Some('}') {
                        return Ok(Some(self.close(Frame::Object)));
                    }
                    return self.read_property_name().map(Some);
                }
                Expect::Key => return self.read_property_name().map(Some),
                Expect::FirstValueOrEnd => {
                    if self.peek() == Some(']') {
                        return Ok(Some(self.close(Frame::Array)));
                    }
                    return self.read_value().map(Some);
                }
                Expect::CommaOrEnd => {
                    let frame = self.stack.last().copied();
                    match (self.peek(), frame) {
                        (Some(','), Some(Frame::Object)) => {
                            self.pos += 1;
                            self.expect = Expect::Key;
                        }
                        (Some(','), Some(Frame::Array)) => {
                            self.pos += 1;
                            self.expect = Expect::Value;
                        }
                        (Some('}'), Some(Frame::Object)) => {
                            return Ok(Some(self.close(Frame::Object)));
                        }
                        (Some(']'), Some(Frame::Array)) => {
                            return Ok(Some(self.close(Frame::Array)));
                        }
                        (Some(found), _) => {
                            return Err(EnvelopeError::UnexpectedCharacter {
                                found,
                                offset: self.pos,
                            })
                        }
                        (None, _) => return Err(EnvelopeError::UnexpectedEnd { offset: self.pos }),
                    }
                }
            }
        }
    }

    /// Consumes the value that follows a property name, including every
    /// token nested inside it when the value is a container.
    pub fn skip_value(&mut self) -> Result<(), EnvelopeError> {
        let mut depth = 0usize;
        loop {
            let token = self
                .next_token()?
                .ok_or(EnvelopeError::UnexpectedEnd { offset: self.pos })?;
            match token {
                Token::StartObject | Token::StartArray => depth += 1,
                Token::EndObject | Token::EndArray => {
                    depth = depth.saturating_sub(1);
                }
                Token::PropertyName(_) => continue,
                _ => {}
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn close(&mut self, frame: Frame) -> Token {
        self.pos += 1;
        self.stack.pop();
        self.after_value();
        match frame {
            Frame::Object => Token::EndObject,
            Frame::Array => Token::EndArray,
        }
    }

    fn after_value(&mut self) {
        self.expect = if self.stack.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrEnd
        };
    }

    fn read_value(&mut self) -> Result<Token, EnvelopeError> {
        let start = self.pos;
        let c = self
            .peek()
            .ok_or(EnvelopeError::UnexpectedEnd { offset: start })?;

        let token = match c {
            '{' => {
                self.pos += 1;
                self.stack.push(Frame::Object);
                self.expect = Expect::FirstKeyOrEnd;
                return Ok(Token::StartObject);
            }
            '[' => {
                self.pos += 1;
                self.stack.push(Frame::Array);
                self.expect = Expect::FirstValueOrEnd;
                return Ok(Token::StartArray);
            }
            '"' | '\'' => Token::String(self.read_string(c)?),
            '-' | '0'..='9' => Token::Number(self.read_number()?),
            c if is_identifier_start(c) => {
                let word = self.read_identifier();
                match word {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    "null" => Token::Null,
                    other => {
                        return Err(EnvelopeError::UnexpectedLiteral {
                            text: other.to_string(),
                            offset: start,
                        })
                    }
                }
            }
            found => {
                return Err(EnvelopeError::UnexpectedCharacter {
                    found,
                    offset: start,
                })
            }
        };

        self.after_value();
        Ok(token)
    }

    fn read_property_name(&mut self) -> Result<Token, EnvelopeError> {
        let start = self.pos;
        let name = match self.peek() {
            Some(q @ ('"' | '\'')) => self.read_string(q)?,
            Some(c) if is_identifier_start(c) => self.read_identifier().to_string(),
            Some(found) => {
                return Err(EnvelopeError::UnexpectedCharacter {
                    found,
                    offset: start,
                })
            }
            None => return Err(EnvelopeError::UnexpectedEnd { offset: start }),
        };

        self.skip_whitespace();
        match self.peek() {
            Some(':') => self.pos += 1,
            Some(found) => {
                return Err(EnvelopeError::UnexpectedCharacter {
                    found,
                    offset: self.pos,
                })
            }
            None => return Err(EnvelopeError::UnexpectedEnd { offset: self.pos }),
        }

        self.expect = Expect::Value;
        Ok(Token::PropertyName(name))
    }

    fn read_identifier(&mut self) -> &'a str {
        let input = self.input;
        let rest = &input[self.pos..];
        let len = rest
            .char_indices()
            .find(|(_, c)| !is_identifier_part(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn read_number(&mut self) -> Result<String, EnvelopeError> {
        let start = self.pos;
        let input = self.input;
        let rest = &input[start..];
        let len = rest
            .char_indices()
            .find(|(_, c)| !matches!(c, '0'..='9' | '-' | '+' | '.' | 'e' | 'E'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let text = &rest[..len];
        self.pos += len;

        if is_json_number(text) {
            Ok(text.to_string())
        } else {
            Err(EnvelopeError::InvalidNumber {
                text: text.to_string(),
                offset: start,
            })
        }
    }

    fn read_string(&mut self, quote: char) -> Result<String, EnvelopeError> {
        let start = self.pos;
        let body_start = start + quote.len_utf8();
        let mut out = String::new();
        let input = self.input;
        let mut chars = input[body_start..].char_indices();

        while let Some((i, c)) = chars.next() {
            if c == quote {
                self.pos = body_start + i + c.len_utf8();
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }

            let escape_offset = body_start + i;
            let (_, escaped) = chars
                .next()
                .ok_or(EnvelopeError::UnterminatedString { offset: start })?;
            match escaped {
                '"' => out.push('"'),
                '\'' => out.push('\''),
                '\\' => out.push('\\'),
                '/' => out.push('/'),
                'b' => out.push('\u{0008}'),
                'f' => out.push('\u{000C}'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'u' => {
                    let high = read_hex4(&mut chars)
                        .ok_or(EnvelopeError::InvalidEscape { offset: escape_offset })?;
                    let code = if (0xD800..0xDC00).contains(&high) {
                        // Surrogate pair: the low half must follow as another \u escape
                        let low = match (chars.next(), chars.next()) {
                            (Some((_, '\\')), Some((_, 'u'))) => read_hex4(&mut chars),
                            _ => None,
                        }
                        .filter(|low| (0xDC00..0xE000).contains(low))
                        .ok_or(EnvelopeError::InvalidEscape { offset: escape_offset })?;
                        0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                    } else {
                        high
                    };
                    let ch = char::from_u32(code)
                        .ok_or(EnvelopeError::InvalidEscape { offset: escape_offset })?;
                    out.push(ch);
                }
                _ => return Err(EnvelopeError::InvalidEscape { offset: escape_offset }),
            }
        }

        Err(EnvelopeError::UnterminatedString { offset: start })
    }
}

fn read_hex4(chars: &mut std::str::CharIndices<'_>) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        let (_, c) = chars.next()?;
        value = value * 16 + c.to_digit(16)?;
    }
    Some(value)
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Strict JSON number grammar: `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
fn is_json_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let digits = i;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        if i == digits {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let digits = i;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        if i == digits {
            return false;
        }
    }
    i == bytes.len()
}
