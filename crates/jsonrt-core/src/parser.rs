//! JSON parser — converts text into a [`Value`] tree.
//!
//! A recursive-descent parser over the UTF-8 bytes of the input. Every
//! structural character is ASCII, so the cursor always sits on a char
//! boundary and string contents can be sliced straight out of the input.
//!
//! # Reviver ordering
//!
//! A reviver sees every object member and array element, children first:
//!
//! - **Object members** are revived one at a time, right after the member's
//!   value has been parsed and before the next key is read.
//! - **Array elements** are revived in a second pass, after the closing `]`
//!   has been consumed, with keys `"0"`, `"1"`, ...
//!
//! The root value itself is never passed to the reviver.
//!
//! # Example
//! ```
//! use jsonrt_core::{parse, Value};
//! let value = parse(r#" { "a" : [1, 2.5, "x"] } "#).unwrap();
//! assert_eq!(value["a"][1], Value::Number(2.5));
//! ```

use crate::error::{ParseError, ParseErrorKind, Result};
use crate::value::{Map, Value};
use tracing::{debug, trace};

/// Default limit on array/object nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting of arrays and objects before `NestingTooDeep`.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// No depth limit. Deeply nested input may exhaust the stack.
    pub fn unbounded() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// The container a revived member belongs to, as built so far.
///
/// For objects this holds the members stored before the current key. For
/// arrays it holds every element; those before the current index have
/// already been revived and the current slot reads as `Null`.
#[derive(Debug, Clone, Copy)]
pub enum Holder<'a> {
    Object(&'a Map),
    Array(&'a [Value]),
}

/// A parse-time transform: `(holder, key, value) -> replacement`.
pub trait Reviver {
    fn revive(&mut self, holder: Holder<'_>, key: &str, value: Value) -> Value;
}

impl<F> Reviver for F
where
    F: FnMut(Holder<'_>, &str, Value) -> Value,
{
    fn revive(&mut self, holder: Holder<'_>, key: &str, value: Value) -> Value {
        self(holder, key, value)
    }
}

/// Parse a complete JSON text.
pub fn parse(text: &str) -> Result<Value> {
    Parser::new(text).parse()
}

/// Parse a complete JSON text, passing every member through `reviver`.
pub fn parse_with_reviver<F>(text: &str, mut reviver: F) -> Result<Value>
where
    F: FnMut(Holder<'_>, &str, Value) -> Value,
{
    Parser::new(text).parse_with_reviver(&mut reviver)
}

/// Apply a reviver to an already-built tree, with the same ordering the
/// parser uses.
pub fn revive<F>(value: Value, mut reviver: F) -> Value
where
    F: FnMut(Holder<'_>, &str, Value) -> Value,
{
    revive_tree(value, &mut reviver)
}

pub(crate) fn revive_tree(value: Value, reviver: &mut dyn Reviver) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                let child = revive_tree(child, reviver);
                let child = reviver.revive(Holder::Object(&out), &key, child);
                out.insert(key, child);
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            let mut items: Vec<Value> = items
                .into_iter()
                .map(|child| revive_tree(child, reviver))
                .collect();
            revive_elements(&mut items, reviver);
            Value::Array(items)
        }
        other => other,
    }
}

/// The second pass over a closed array.
fn revive_elements(items: &mut [Value], reviver: &mut dyn Reviver) {
    for i in 0..items.len() {
        let value = std::mem::take(&mut items[i]);
        let revived = reviver.revive(Holder::Array(items), &i.to_string(), value);
        items[i] = revived;
    }
}

/// Cursor over one JSON text.
pub struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::with_options(text, ParseOptions::default())
    }

    pub fn with_options(text: &'a str, options: ParseOptions) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            depth: 0,
            options,
        }
    }

    pub fn parse(&mut self) -> Result<Value> {
        self.run(None)
    }

    pub fn parse_with_reviver(&mut self, reviver: &mut dyn Reviver) -> Result<Value> {
        self.run(Some(reviver))
    }

    fn run(&mut self, mut reviver: Option<&mut dyn Reviver>) -> Result<Value> {
        debug!(bytes = self.text.len(), "parsing JSON text");
        self.pos = 0;
        self.depth = 0;

        let result = self.parse_value(&mut reviver).and_then(|value| {
            self.skip_whitespace();
            match self.peek_char() {
                Some(found) => Err(self.error(ParseErrorKind::UnexpectedToken { found })),
                None => Ok(value),
            }
        });

        if let Err(err) = &result {
            debug!(error = %err, "parse failed");
        }
        result
    }

    /// Dispatch on the first significant character.
    fn parse_value(&mut self, reviver: &mut Option<&mut dyn Reviver>) -> Result<Value> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error(ParseErrorKind::CursorOverrun)),
            Some(b'{') => self.parse_object(reviver),
            Some(b'[') => self.parse_array(reviver),
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            Some(b't' | b'f' | b'n') => self.parse_keyword(),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn parse_object(&mut self, reviver: &mut Option<&mut dyn Reviver>) -> Result<Value> {
        self.enter()?;
        self.pos += 1; // '{'
        let mut map = Map::new();

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Object(map));
        }

        loop {
            self.skip_whitespace();
            match self.peek_char() {
                Some('"') => {}
                Some(found) => return Err(self.error(ParseErrorKind::ExpectedString { found })),
                None => return Err(self.error(ParseErrorKind::UnterminatedObject)),
            }
            let key = self.parse_string()?;

            self.skip_whitespace();
            match self.peek_char() {
                Some(':') => self.pos += 1,
                Some(found) => return Err(self.error(ParseErrorKind::ExpectedColon { found })),
                None => return Err(self.error(ParseErrorKind::UnterminatedObject)),
            }

            self.skip_whitespace();
            if self.at_end() {
                return Err(self.error(ParseErrorKind::UnterminatedObject));
            }
            let mut value = self.parse_value(reviver)?;
            if let Some(r) = reviver.as_mut() {
                value = r.revive(Holder::Object(&map), &key, value);
            }
            map.insert(key, value);

            self.skip_whitespace();
            match self.peek_char() {
                Some(',') => self.pos += 1,
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(found) => {
                    return Err(self.error(ParseErrorKind::ExpectedCommaOrBrace { found }))
                }
                None => return Err(self.error(ParseErrorKind::UnterminatedObject)),
            }
        }

        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn parse_array(&mut self, reviver: &mut Option<&mut dyn Reviver>) -> Result<Value> {
        self.enter()?;
        self.pos += 1; // '['
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Array(items));
        }

        loop {
            self.skip_whitespace();
            if self.at_end() {
                return Err(self.error(ParseErrorKind::UnterminatedArray));
            }
            items.push(self.parse_value(reviver)?);

            self.skip_whitespace();
            match self.peek_char() {
                Some(',') => self.pos += 1,
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(found) => {
                    return Err(self.error(ParseErrorKind::ExpectedCommaOrBracket { found }))
                }
                None => return Err(self.error(ParseErrorKind::UnterminatedArray)),
            }
        }

        // Element callbacks run only once the whole array is closed.
        if let Some(r) = reviver.as_mut() {
            revive_elements(&mut items, &mut **r);
        }

        self.depth -= 1;
        Ok(Value::Array(items))
    }

    /// Scan to the closing quote and unescape the contents.
    ///
    /// A `"` closes the string only when preceded by an even number of
    /// consecutive backslashes.
    fn parse_string(&mut self) -> Result<String> {
        self.pos += 1; // '"'
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.error(ParseErrorKind::UnterminatedString)),
                Some(b'"') if self.backslashes_before(start) % 2 == 0 => break,
                Some(_) => self.pos += 1,
            }
        }
        let raw = &self.text[start..self.pos];
        self.pos += 1; // '"'
        trace!(len = raw.len(), "string token");
        Ok(unescape(raw))
    }

    /// Count the run of `\` immediately before the cursor, not looking past `floor`.
    fn backslashes_before(&self, floor: usize) -> usize {
        self.bytes[floor..self.pos]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count()
    }

    /// `-? digits (. digits)? ([eE] [+-]? digits)?`, converted as a double.
    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        self.skip_digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.skip_digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.skip_digits();
        }

        let token = &self.text[start..self.pos];
        match token.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Number(n)),
            _ => Err(self.error_at(ParseErrorKind::InvalidNumber, start)),
        }
    }

    fn parse_keyword(&mut self) -> Result<Value> {
        let (word, value) = match self.peek() {
            Some(b't') => ("true", Value::Bool(true)),
            Some(b'f') => ("false", Value::Bool(false)),
            _ => ("null", Value::Null),
        };
        if self.text[self.pos..].starts_with(word) {
            self.pos += word.len();
            Ok(value)
        } else {
            Err(self.unexpected())
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(self.error(ParseErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn unexpected(&self) -> ParseError {
        match self.peek_char() {
            Some(found) => self.error(ParseErrorKind::UnexpectedToken { found }),
            None => self.error(ParseErrorKind::CursorOverrun),
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(kind, self.pos)
    }

    fn error_at(&self, kind: ParseErrorKind, position: usize) -> ParseError {
        ParseError::at(kind, self.text, position)
    }
}

const REPLACEMENT: char = '\u{FFFD}';

/// Resolve escape sequences in the raw contents of a string literal.
///
/// `\n \r \t \" \' \\` and `\uXXXX` are decoded; any other `\X` is kept
/// as-is, backslash included.
pub(crate) fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find('\\') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        let Some(ch) = after.chars().next() else {
            out.push('\\');
            rest = after;
            break;
        };
        rest = &after[ch.len_utf8()..];
        match ch {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            'u' => match hex4(rest) {
                Some(unit) => {
                    rest = &rest[4..];
                    out.push(decode_unit(unit, &mut rest));
                }
                None => out.push_str("\\u"),
            },
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out.push_str(rest);
    out
}

/// Turn one UTF-16 code unit into a char, consuming a following `\uXXXX`
/// low surrogate from `rest` when `unit` is a high surrogate.
fn decode_unit(unit: u32, rest: &mut &str) -> char {
    if (0xD800..0xDC00).contains(&unit) {
        let low = rest
            .strip_prefix("\\u")
            .and_then(hex4)
            .filter(|low| (0xDC00..0xE000).contains(low));
        if let Some(low) = low {
            *rest = &rest[6..];
            let scalar = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(scalar).unwrap_or(REPLACEMENT);
        }
    }
    char::from_u32(unit).unwrap_or(REPLACEMENT)
}

fn hex4(s: &str) -> Option<u32> {
    let digits = s.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
