//! Indented JSON token writer
//!
//! Mirrors [`TokenReader`](super::reader::TokenReader): callers push tokens in
//! document order and the writer takes care of separators and indentation.
//! The token stream is assumed to be well formed; the builder only forwards
//! tokens that the reader has already validated.

use super::reader::Token;

const INDENT: &str = "  ";

#[derive(Debug)]
struct Frame {
    items: usize,
}

#[derive(Debug, Default)]
pub struct TokenWriter {
    out: String,
    stack: Vec<Frame>,
    after_property: bool,
}

impl TokenWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn write_token(&mut self, token: &Token) {
        match token {
            Token::StartObject => self.start_container('{'),
            Token::StartArray => self.start_container('['),
            Token::EndObject => self.end_container('}'),
            Token::EndArray => self.end_container(']'),
            Token::PropertyName(name) => self.property_name(name),
            Token::String(value) => self.string_value(value),
            Token::Number(text) => self.raw_value(text),
            Token::Bool(value) => self.raw_value(if *value { "true" } else { "false" }),
            Token::Null => self.raw_value("null"),
        }
    }

    pub fn property_name(&mut self, name: &str) {
        let depth = self.stack.len();
        if let Some(frame) = self.stack.last_mut() {
            if frame.items > 0 {
                self.out.push(',');
            }
            frame.items += 1;
        }
        self.newline(depth);
        write_escaped(&mut self.out, name);
        self.out.push_str(": ");
        self.after_property = true;
    }

    pub fn string_value(&mut self, value: &str) {
        self.before_value();
        write_escaped(&mut self.out, value);
    }

    pub fn raw_value(&mut self, text: &str) {
        self.before_value();
        self.out.push_str(text);
    }

    /// Writes a property whose value is a string, or `null` when absent
    pub fn string_property(&mut self, name: &str, value: Option<&str>) {
        self.property_name(name);
        match value {
            Some(value) => self.string_value(value),
            None => self.raw_value("null"),
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn start_container(&mut self, open: char) {
        self.before_value();
        self.out.push(open);
        self.stack.push(Frame { items: 0 });
    }

    fn end_container(&mut self, close: char) {
        if let Some(frame) = self.stack.pop() {
            if frame.items > 0 {
                let depth = self.stack.len();
                self.newline(depth);
            }
        }
        self.out.push(close);
    }

    fn before_value(&mut self) {
        if self.after_property {
            self.after_property = false;
            return;
        }

        // Array element (or the root value when the stack is empty)
        let depth = self.stack.len();
        if let Some(frame) = self.stack.last_mut() {
            if frame.items > 0 {
                self.out.push(',');
            }
            frame.items += 1;
            self.newline(depth);
        }
    }

    fn newline(&mut self, depth: usize) {
        self.out.push('\n');
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }
}

/// Appends `value` as a quoted JSON string
pub fn write_escaped(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
