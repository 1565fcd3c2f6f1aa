//! JSON serializer — converts a [`Node`] tree into text.
//!
//! The serializer accepts a looser input model than the parser produces:
//! [`Node`] adds an `Undefined` sentinel and a `Custom` variant for values
//! that serialize themselves through [`ToJson`]. Nothing here can fail;
//! unrepresentable input degrades instead:
//!
//! - non-finite numbers → `null`
//! - `Undefined` object members → omitted
//! - `Undefined` array elements → `null`
//! - an `Undefined` root → the bare text `undefined`
//!
//! # Replacer at the root
//!
//! A function replacer is called for the root too, with key `""` and a
//! synthetic holder object `{"": root}`, then for every object member.
//! Array elements are not passed to the replacer. An allow-list only
//! filters object members.
//!
//! # Example
//! ```
//! use jsonrt_core::{stringify, Node, Space};
//! let node = Node::object([("a", Node::from(1.0)), ("b", Node::Undefined)]);
//! assert_eq!(stringify(&node, None, None), r#"{"a":1}"#);
//! assert_eq!(stringify(&node, None, Some(&Space::Count(2))), "{\n  \"a\": 1\n}");
//! ```

use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A value that knows how to turn itself into a serializable tree.
///
/// The returned node is serialized like any other input, so it may be
/// another container or even another `Custom`.
pub trait ToJson: fmt::Debug + Send + Sync {
    fn to_json(&self) -> Node;
}

/// Serializer input.
#[derive(Debug, Clone, Default)]
pub enum Node {
    /// The absent value.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Node>),
    /// Members in iteration order.
    Object(Vec<(String, Node)>),
    Custom(Arc<dyn ToJson>),
}

impl Node {
    pub fn object<K, I>(members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Object(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn custom<T: ToJson + 'static>(hook: T) -> Self {
        Node::Custom(Arc::new(hook))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Node::Undefined)
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => Node::Number(*n),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(items) => Node::Array(items.iter().map(Node::from).collect()),
            Value::Object(map) => Node::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), Node::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Number(n)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(items)
    }
}

/// `(holder, key, value) -> replacement`
pub type ReplacerFn<'r> = dyn FnMut(&Node, &str, &Node) -> Node + 'r;

/// Serialize-time transform.
pub enum Replacer<'r> {
    /// Called once per object member (and once for the root); its return
    /// value is serialized in place of the original.
    Function(Box<ReplacerFn<'r>>),
    /// Only object members whose key is listed are emitted.
    AllowList(Vec<String>),
}

impl<'r> Replacer<'r> {
    pub fn function<F>(f: F) -> Self
    where
        F: FnMut(&Node, &str, &Node) -> Node + 'r,
    {
        Replacer::Function(Box::new(f))
    }

    pub fn allow_list<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Replacer::AllowList(keys.into_iter().map(Into::into).collect())
    }
}

impl fmt::Debug for Replacer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacer::Function(_) => f.write_str("Replacer::Function(..)"),
            Replacer::AllowList(keys) => f.debug_tuple("Replacer::AllowList").field(keys).finish(),
        }
    }
}

/// Longest indentation unit, in spaces or characters.
pub const MAX_INDENT: usize = 10;

/// Indentation unit for pretty output.
///
/// Units longer than [`MAX_INDENT`] are cut down to it: counts are capped
/// and text keeps its first ten characters. Text is inserted verbatim, so
/// anything other than whitespace yields output that is not valid JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Space {
    /// This many spaces per level.
    Count(usize),
    /// A literal string per level, e.g. `"\t"`.
    Text(String),
}

impl Space {
    fn unit(&self) -> String {
        match self {
            Space::Count(n) => " ".repeat((*n).min(MAX_INDENT)),
            Space::Text(s) => s.chars().take(MAX_INDENT).collect(),
        }
    }
}

/// Serialize `value`.
pub fn stringify(value: &Node, replacer: Option<&mut Replacer<'_>>, space: Option<&Space>) -> String {
    let layout = Layout::root(space);
    trace!(pretty = !layout.unit.is_empty(), "stringify");
    let mut ser = Serializer { replacer };

    let replaced;
    let mut root = value;
    if let Some(Replacer::Function(f)) = ser.replacer.as_deref_mut() {
        let holder = Node::Object(vec![(String::new(), value.clone())]);
        replaced = f(&holder, "", value);
        root = &replaced;
    }

    ser.item(root, &layout)
        .unwrap_or_else(|| "undefined".to_string())
}

/// Compact text for a parsed value.
pub fn to_string(value: &Value) -> String {
    stringify(&Node::from(value), None, None)
}

/// Indented text for a parsed value.
pub fn to_string_pretty(value: &Value, space: Space) -> String {
    stringify(&Node::from(value), None, Some(&space))
}

/// Per-level formatting state. `newline` is empty in compact mode, else a
/// line break followed by the indentation accumulated so far.
#[derive(Clone)]
struct Layout {
    unit: String,
    newline: String,
}

impl Layout {
    fn root(space: Option<&Space>) -> Self {
        let unit = space.map(Space::unit).unwrap_or_default();
        let newline = if unit.is_empty() {
            String::new()
        } else {
            "\n".to_string()
        };
        Self { unit, newline }
    }

    fn nested(&self) -> Self {
        if self.unit.is_empty() {
            return self.clone();
        }
        Self {
            unit: self.unit.clone(),
            newline: format!("{}{}", self.newline, self.unit),
        }
    }

    fn colon(&self) -> &'static str {
        if self.unit.is_empty() {
            ":"
        } else {
            ": "
        }
    }

    fn wrap(&self, inner: &Layout, open: char, parts: &[String], close: char) -> String {
        let sep = format!(",{}", inner.newline);
        format!(
            "{open}{}{}{}{close}",
            inner.newline,
            parts.join(&sep),
            self.newline
        )
    }
}

struct Serializer<'s, 'r> {
    replacer: Option<&'s mut Replacer<'r>>,
}

impl Serializer<'_, '_> {
    /// `None` means the node is absent and the caller decides how to render that.
    fn item(&mut self, node: &Node, layout: &Layout) -> Option<String> {
        match node {
            Node::Undefined => None,
            Node::Null => Some("null".to_string()),
            Node::Bool(b) => Some(b.to_string()),
            Node::Number(n) => Some(format_number(*n)),
            Node::String(s) => Some(quote(s)),
            Node::Custom(hook) => self.item(&hook.to_json(), layout),
            Node::Array(items) => Some(self.array(items, layout)),
            Node::Object(members) => Some(self.object(node, members, layout)),
        }
    }

    fn array(&mut self, items: &[Node], layout: &Layout) -> String {
        if items.is_empty() {
            return "[]".to_string();
        }
        let inner = layout.nested();
        let parts: Vec<String> = items
            .iter()
            .map(|item| {
                self.item(item, &inner)
                    .unwrap_or_else(|| "null".to_string())
            })
            .collect();
        layout.wrap(&inner, '[', &parts, ']')
    }

    fn object(&mut self, holder: &Node, members: &[(String, Node)], layout: &Layout) -> String {
        let inner = layout.nested();
        let mut parts = Vec::with_capacity(members.len());

        for (key, child) in members {
            if child.is_undefined() {
                continue;
            }
            let replaced;
            let child = match self.replacer.as_deref_mut() {
                Some(Replacer::AllowList(keys)) => {
                    if !keys.iter().any(|k| k == key) {
                        continue;
                    }
                    child
                }
                Some(Replacer::Function(f)) => {
                    replaced = f(holder, key, child);
                    &replaced
                }
                None => child,
            };
            let Some(text) = self.item(child, &inner) else {
                continue;
            };
            parts.push(format!("{}{}{}", quote(key), layout.colon(), text));
        }

        if parts.is_empty() {
            return "{}".to_string();
        }
        layout.wrap(&inner, '{', &parts, '}')
    }
}

/// Quote and escape a string. Control characters without a short escape
/// are written as `\u00XX`.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < ' ' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a number the way ECMAScript's Number-to-String does:
/// shortest round-trip digits, plain notation for decimal exponents in
/// [-7, 21), exponent notation outside. `-0` renders as `0`.
fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    // `{:e}` yields the shortest digits, e.g. "1.2345e-7"
    let sci = format!("{:e}", n.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return n.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return n.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let point = exp + 1;

    let body = if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), digits)
    } else {
        let e = point - 1;
        let sign = if e >= 0 { '+' } else { '-' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{lead}e{sign}{}", e.abs())
        } else {
            format!("{lead}.{rest}e{sign}{}", e.abs())
        }
    };

    if n < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}
