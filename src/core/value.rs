// src/core/value.rs

//! # Build Setting Values
//!
//! A `Value` is the unexpanded right-hand side of a build setting: an ordered list of
//! literal chunks and nested references. References may themselves contain references,
//! which is how names such as `$(VALUE_$(SETTING))` are modelled.
//!
//! Values never hold resolved text. Expansion lives in [`crate::core::environment`].

use crate::models::SettingLiteral;
use serde::Deserialize;
use std::fmt;
use std::ops::Add;

/// One chunk of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueEntry {
    /// Plain text, copied through expansion unchanged.
    Literal(String),
    /// A `$(...)` reference. The inner value evaluates to the referenced name,
    /// optionally followed by `:operation` suffixes.
    Reference(Value),
}

/// Escaping context used by [`Value::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeMode {
    /// Only `$` is escaped in literal text.
    Value,
    /// Spaces are escaped as well, for whitespace separated path lists.
    PathList,
    /// Spaces and colons are escaped, for the inputs and outputs of a build edge.
    BuildPathList,
}

/// The parsed representation of a build setting value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "SettingLiteral")]
pub struct Value {
    entries: Vec<ValueEntry>,
}

// --- PUBLIC API ---

impl Value {
    /// Builds a value directly from its entries.
    pub fn from_entries(entries: Vec<ValueEntry>) -> Self {
        Self { entries }
    }

    /// The value with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A value holding `text` as a single literal. Empty text yields [`Value::empty`].
    pub fn string(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::empty();
        }
        Self {
            entries: vec![ValueEntry::Literal(text)],
        }
    }

    /// A value that is a single reference to `name`, equivalent to parsing `$(name)`.
    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            entries: vec![ValueEntry::Reference(Self {
                entries: vec![ValueEntry::Literal(name.into())],
            })],
        }
    }

    /// Parses macro text such as `-I$(SRCROOT)/include ${OTHER} $NAME`.
    ///
    /// Parsing never fails. An opener without its matching delimiter is kept as
    /// literal text, so `"$(open"` is a single literal chunk.
    pub fn parse(text: &str) -> Self {
        parse_from(text, 0, Delimiter::None).value
    }

    pub fn entries(&self) -> &[ValueEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the value back to macro text, writing every reference as `$(...)`.
    pub fn raw(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                ValueEntry::Literal(text) => out.push_str(text),
                ValueEntry::Reference(inner) => {
                    out.push_str("$(");
                    out.push_str(&inner.raw());
                    out.push(')');
                }
            }
        }
        out
    }

    /// Serializes the value for a ninja-style manifest.
    ///
    /// Literal chunks have `$` doubled so they are not read as variables. Reference
    /// chunks keep their `$(...)` text and only get the separator escaping that the
    /// mode requires.
    pub fn resolve(&self, mode: EscapeMode) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                ValueEntry::Literal(text) => out.push_str(&escape_literal(text, mode)),
                ValueEntry::Reference(inner) => {
                    let expression = format!("$({})", inner.raw());
                    out.push_str(&escape_expression(&expression, mode));
                }
            }
        }
        out
    }
}

impl Add for Value {
    type Output = Self;

    /// Concatenates two values. When the left side ends and the right side starts with
    /// a literal, the two literals are merged into one chunk.
    fn add(self, rhs: Self) -> Self {
        let mut entries = self.entries;
        let mut rest = rhs.entries.into_iter().peekable();

        if let Some(ValueEntry::Literal(last)) = entries.last_mut()
            && let Some(ValueEntry::Literal(first)) =
                rest.next_if(|entry| matches!(entry, ValueEntry::Literal(_)))
        {
            last.push_str(&first);
        }

        entries.extend(rest);
        Self { entries }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw())
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

// --- PARSER ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    None,
    Parentheses,
    Braces,
    Identifier,
}

impl Delimiter {
    fn open_len(self) -> usize {
        match self {
            Self::Parentheses | Self::Braces => 2,
            Self::Identifier => 1,
            Self::None => 0,
        }
    }

    fn close_len(self) -> usize {
        match self {
            Self::Parentheses | Self::Braces => 1,
            Self::Identifier | Self::None => 0,
        }
    }
}

struct ParseOutcome {
    found: bool,
    end: usize,
    value: Value,
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Finds where the region delimited by `delimiter` ends, searching from `search`.
fn find_close(text: &str, search: usize, delimiter: Delimiter) -> Option<usize> {
    let tail = text.get(search..)?;
    match delimiter {
        Delimiter::None => Some(text.len()),
        Delimiter::Parentheses => tail.find(')').map(|i| search + i),
        Delimiter::Braces => tail.find('}').map(|i| search + i),
        Delimiter::Identifier => {
            let end = tail
                .find(|c: char| !is_identifier_char(c))
                .map_or(text.len(), |i| search + i);
            (end > search).then_some(end)
        }
    }
}

/// Finds the nearest reference opener at or after `search`.
fn find_open(text: &str, search: usize) -> Option<(usize, Delimiter)> {
    let tail = text.get(search..)?;
    let offset = tail.find('$')?;
    let open = search + offset;
    let delimiter = match text.as_bytes().get(open + 1) {
        Some(b'(') => Delimiter::Parentheses,
        Some(b'{') => Delimiter::Braces,
        _ => Delimiter::Identifier,
    };
    Some((open, delimiter))
}

fn push_literal(entries: &mut Vec<ValueEntry>, text: &str, from: usize, to: usize) {
    if let Some(chunk) = text.get(from..to)
        && !chunk.is_empty()
    {
        entries.push(ValueEntry::Literal(chunk.to_string()));
    }
}

fn parse_from(text: &str, from: usize, delimiter: Delimiter) -> ParseOutcome {
    let mut entries = Vec::new();
    let mut search = from;
    let mut append = from;

    loop {
        let Some(to) = find_close(text, search, delimiter) else {
            return ParseOutcome {
                found: false,
                end: from,
                value: Value::from_entries(entries),
            };
        };

        let opener = find_open(text, search).filter(|(open, _)| *open < to);
        let Some((open, inner_delimiter)) = opener else {
            push_literal(&mut entries, text, append, to);
            return ParseOutcome {
                found: true,
                end: to,
                value: Value::from_entries(entries),
            };
        };

        let inner = parse_from(text, open + inner_delimiter.open_len(), inner_delimiter);
        if inner.found {
            push_literal(&mut entries, text, append, open);
            entries.push(ValueEntry::Reference(inner.value));
            append = inner.end + inner_delimiter.close_len();
            search = append;
        } else {
            search = open + inner_delimiter.open_len();
        }
    }
}

// --- ESCAPING ---

fn escape_literal(text: &str, mode: EscapeMode) -> String {
    let escaped = text.replace('$', "$$");
    match mode {
        EscapeMode::Value => escaped,
        EscapeMode::PathList => escaped.replace(' ', "$ "),
        EscapeMode::BuildPathList => escaped.replace(' ', "$ ").replace(':', "$:"),
    }
}

fn escape_expression(text: &str, mode: EscapeMode) -> String {
    match mode {
        EscapeMode::Value => text.to_string(),
        EscapeMode::PathList => text.replace("$ ", "$$ ").replace(' ', "$ "),
        EscapeMode::BuildPathList => text
            .replace("$ ", "$$ ")
            .replace(' ', "$ ")
            .replace("$:", "$$:")
            .replace(':', "$:"),
    }
}
