//! Ordered, case-insensitive, multi-valued header storage.
//!
//! # Design
//! Headers are an association list: `(name, value)` pairs in the order they
//! were read, duplicates included, each name kept with its original casing
//! so the block serializes back byte for byte. Lookups compare names
//! ASCII-case-insensitively. `as_map` derives the normalized view (upper
//! case names, values grouped in order) used for comparisons.

use std::collections::BTreeMap;
use std::fmt;

use crate::cursor::ByteCursor;
use crate::error::ParseError;

/// Header fields of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    entries: Vec<(String, String)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, never replacing an existing one.
    pub fn push(&mut self, name: &str, value: &str) {
        self.entries.push((name.to_string(), value.to_string()));
    }

    /// Builder form of `push`.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.push(name, value);
        self
    }

    /// Insert a field at `index`, clamped to the current length.
    pub fn insert(&mut self, index: usize, name: &str, value: &str) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, (name.to_string(), value.to_string()));
    }

    /// Remove every field called `name`; returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        before - self.entries.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// All values of `name`, in order.
    pub fn get(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn get_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.entries
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Distinct names, each with the casing of its first occurrence.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.entries {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                names.push(name);
            }
        }
        names
    }

    /// Fields in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upper-cased name -> values, values in stored order.
    pub fn as_map(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in &self.entries {
            map.entry(name.to_ascii_uppercase())
                .or_default()
                .push(value.clone());
        }
        map
    }

    /// Read header lines up to and including the blank line that ends the
    /// block. End of source also ends the block.
    pub fn parse<R: std::io::BufRead>(cursor: &mut ByteCursor<R>) -> Result<Self, ParseError> {
        Self::read_block(cursor).map(|(headers, _)| headers)
    }

    /// Like `parse`, also telling whether the blank line was seen (`false`
    /// when the source ran out first).
    pub(crate) fn read_block<R: std::io::BufRead>(
        cursor: &mut ByteCursor<R>,
    ) -> Result<(Self, bool), ParseError> {
        let mut headers = HttpHeaders::new();
        while let Some(line) = cursor.read_line()? {
            if line.is_empty() {
                return Ok((headers, true));
            }
            let (name, value) = parse_field(&line, cursor.lines_read())?;
            headers.entries.push((name, value));
        }
        Ok((headers, false))
    }
}

/// Split one `Name: value` line on its first colon.
fn parse_field(line: &[u8], line_number: usize) -> Result<(String, String), ParseError> {
    let malformed = || ParseError::MalformedHeaderLine {
        line: line_number,
        content: String::from_utf8_lossy(line).into_owned(),
    };
    let text = std::str::from_utf8(line).map_err(|_| malformed())?;
    let Some((name, value)) = text.split_once(':') else {
        return Err(malformed());
    };
    if name.trim().is_empty() {
        return Err(malformed());
    }
    let value = value.strip_prefix(' ').unwrap_or(value);
    Ok((name.to_string(), value.to_string()))
}

/// Fields in stored order, each written under the casing its name had the
/// first time it appeared.
impl fmt::Display for HttpHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        for (name, value) in &self.entries {
            let name = names
                .iter()
                .find(|first| first.eq_ignore_ascii_case(name))
                .copied()
                .unwrap_or(name.as_str());
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

impl<N: AsRef<str>, V: AsRef<str>> FromIterator<(N, V)> for HttpHeaders {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = HttpHeaders::new();
        for (name, value) in iter {
            headers.push(name.as_ref(), value.as_ref());
        }
        headers
    }
}

impl<'a> IntoIterator for &'a HttpHeaders {
    type Item = &'a (String, String);
    type IntoIter = std::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
