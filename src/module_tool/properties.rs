//! Java-style `.properties` files
//!
//! Keys keep the order they were read or inserted in, so a file that is
//! read, modified and written back stays diffable.

use std::{fmt::Write as _, str::FromStr};

use displaydoc::Display;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Display, Error, PartialEq, Eq)]
pub enum PropertiesError {
    /// malformed `\uXXXX` escape on line {0}
    MalformedUnicodeEscape(usize),
}

/// Ordered key/value pairs
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets `key`, keeping its position if it already exists.
    ///
    /// Returns the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, old)) => Some(std::mem::replace(old, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses properties text. A key that appears twice keeps its last value.
    pub fn parse(input: &str) -> Result<Self, PropertiesError> {
        let mut properties = Self::new();

        for (line_no, logical) in logical_lines(input) {
            let (key, value) = split_key_value(&logical);
            let key = unescape(key, line_no)?;
            let value = unescape(value, line_no)?;
            let _ = properties.set(key, value);
        }

        Ok(properties)
    }

    /// Serializes the properties, optionally preceded by comment lines.
    pub fn write(&self, comments: &[&str]) -> String {
        let mut out = String::new();
        for comment in comments {
            for line in comment.lines() {
                let _ = writeln!(out, "#{}", escape(line, EscapeMode::Comment));
            }
        }
        for (key, value) in &self.entries {
            let _ = writeln!(
                out,
                "{}={}",
                escape(key, EscapeMode::Key),
                escape(value, EscapeMode::Value)
            );
        }
        out
    }
}

impl FromStr for Properties {
    type Err = PropertiesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut properties = Self::new();
        for (key, value) in iter {
            let _ = properties.set(key, value);
        }
        properties
    }
}

const fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Whether `line` ends in an odd number of backslashes
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Joins continued lines, drops blanks and comments.
///
/// Yields the 1-based number of the first physical line with each
/// logical line.
fn logical_lines(input: &str) -> Vec<(usize, String)> {
    let mut result = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (index, raw) in input.lines().enumerate() {
        let line = raw.trim_start_matches(is_blank);

        let (line_no, mut logical) = match current.take() {
            Some(pending) => pending,
            None => {
                if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                    continue;
                }
                (index + 1, String::new())
            }
        };

        if continues(line) {
            logical.push_str(&line[..line.len() - 1]);
            current = Some((line_no, logical));
        } else {
            logical.push_str(line);
            result.push((line_no, logical));
        }
    }

    if let Some(pending) = current {
        result.push(pending);
    }

    result
}

/// Splits at the first unescaped `=`, `:` or blank.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            break;
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_blank);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(is_blank);
    }
    (key, rest)
}

fn unescape(s: &str, line_no: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let malformed = PropertiesError::MalformedUnicodeEscape(line_no);
                let first = utf16_unit(&mut chars).ok_or(malformed)?;
                let mut units = vec![first];
                // A high surrogate must be followed by `\uXXXX` with the low half.
                if (0xD800..0xDC00).contains(&first) {
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(malformed);
                    }
                    units.push(utf16_unit(&mut chars).ok_or(malformed)?);
                }
                for decoded in char::decode_utf16(units) {
                    out.push(decoded.map_err(|_| malformed)?);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EscapeMode {
    Key,
    Value,
    Comment,
}

fn escape(s: &str, mode: EscapeMode) -> String {
    let mut out = String::with_capacity(s.len());

    for (i, c) in s.chars().enumerate() {
        match c {
            _ if mode == EscapeMode::Comment && c.is_ascii() => out.push(c),
            ' ' if mode == EscapeMode::Key || i == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0_u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04X}");
                }
            }
        }
    }

    out
}

fn utf16_unit(chars: &mut std::str::Chars<'_>) -> Option<u16> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 {
        return None;
    }
    u16::from_str_radix(&hex, 16).ok()
}
