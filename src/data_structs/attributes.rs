//! Column 9 of a feature line.
//!
//! Attributes are kept in an insertion-ordered map so that a regenerated line
//! lists its keys in the order they were read. Values are stored decoded;
//! [`GffAttributes`]'s `Display` re-applies percent-encoding on the way out.
use std::fmt::{
    self,
    Write,
};

use hashbrown::HashSet;
use indexmap::map::Entry;
use indexmap::IndexMap;
use once_cell::sync::Lazy;

pub const ID: &str = "ID";
pub const NAME: &str = "Name";
pub const ALIAS: &str = "Alias";
pub const PARENT: &str = "Parent";
pub const TARGET: &str = "Target";
pub const GAP: &str = "Gap";
pub const DERIVES_FROM: &str = "Derives_from";
pub const NOTE: &str = "Note";
pub const DBXREF: &str = "Dbxref";
pub const ONTOLOGY_TERM: &str = "Ontology_term";
pub const IS_CIRCULAR: &str = "Is_circular";

static RESERVED_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from_iter([
        ID,
        NAME,
        ALIAS,
        PARENT,
        TARGET,
        GAP,
        DERIVES_FROM,
        NOTE,
        DBXREF,
        ONTOLOGY_TERM,
        IS_CIRCULAR,
    ])
});

/// Characters that must be escaped inside attribute keys and values.
const ATTRIBUTE_RESERVED: &[char] = &['\t', '\n', '\r', '%', ';', '=', '&', ','];
/// Characters that must be escaped in the free-text columns (source, type).
const COLUMN_RESERVED: &[char] = &['\t', '\n', '\r', '%'];

/// Returns `true` for the keys with predefined meaning. Case-sensitive.
pub fn is_reserved(key: &str) -> bool { RESERVED_KEYS.contains(key) }

/// Ordered attribute map of a single feature line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GffAttributes {
    inner: IndexMap<String, Vec<String>>,
}

impl GffAttributes {
    pub fn new() -> Self { Self::default() }

    /// Inserts `key` unless it is already present.
    ///
    /// Returns `false` (and leaves the map untouched) on a duplicate key.
    pub fn try_insert(
        &mut self,
        key: String,
        values: Vec<String>,
    ) -> bool {
        match self.inner.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(values);
                true
            },
        }
    }

    /// Replaces the values of `key` in place, or appends the key if absent.
    pub fn set<K: Into<String>>(
        &mut self,
        key: K,
        values: Vec<String>,
    ) {
        let key = key.into();
        match self.inner.get_mut(&key) {
            Some(existing) => *existing = values,
            None => {
                self.inner.insert(key, values);
            },
        }
    }

    /// Removes `key`, keeping the relative order of the remaining keys.
    pub fn remove(
        &mut self,
        key: &str,
    ) -> Option<Vec<String>> {
        self.inner.shift_remove(key)
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&[String]> {
        self.inner.get(key).map(|v| v.as_slice())
    }

    /// First value of `key`.
    pub fn first(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.get(key)
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }

    pub fn contains_key(
        &self,
        key: &str,
    ) -> bool {
        self.inner.contains_key(key)
    }

    pub fn id(&self) -> Option<&str> { self.first(ID) }

    pub fn name(&self) -> Option<&str> { self.first(NAME) }

    /// Values of the `Parent` attribute, empty when absent.
    pub fn parents(&self) -> &[String] { self.get(PARENT).unwrap_or(&[]) }

    pub fn alias(&self) -> &[String] { self.get(ALIAS).unwrap_or(&[]) }

    pub fn note(&self) -> &[String] { self.get(NOTE).unwrap_or(&[]) }

    pub fn dbxref(&self) -> &[String] { self.get(DBXREF).unwrap_or(&[]) }

    pub fn ontology_term(&self) -> &[String] {
        self.get(ONTOLOGY_TERM).unwrap_or(&[])
    }

    pub fn derives_from(&self) -> &[String] {
        self.get(DERIVES_FROM).unwrap_or(&[])
    }

    pub fn is_circular(&self) -> Option<bool> {
        match self.first(IS_CIRCULAR) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    /// Attributes whose key is not in the reserved set.
    pub fn other(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.inner
            .iter()
            .filter(|(k, _)| !is_reserved(k))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize { self.inner.len() }

    pub fn is_empty(&self) -> bool { self.inner.is_empty() }
}

impl fmt::Display for GffAttributes {
    /// Writes the encoded column 9 text; `.` for an empty map.
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.inner.is_empty() {
            return f.write_char('.');
        }
        for (i, (key, values)) in self.inner.iter().enumerate() {
            if i > 0 {
                f.write_char(';')?;
            }
            f.write_str(&percent_encode(key, ATTRIBUTE_RESERVED))?;
            f.write_char('=')?;
            for (j, value) in values.iter().enumerate() {
                if j > 0 {
                    f.write_char(',')?;
                }
                f.write_str(&percent_encode(value, ATTRIBUTE_RESERVED))?;
            }
        }
        Ok(())
    }
}

/// Decodes `%XX` escapes. Returns `None` on a truncated or non-hex escape, or
/// when the decoded bytes are not valid UTF-8.
pub fn percent_decode(s: &str) -> Option<String> {
    if !s.contains('%') {
        return Some(s.to_string());
    }
    let bytes = s.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        }
        else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

/// Escapes every character in `reserved` plus all control characters.
pub fn percent_encode(
    s: &str,
    reserved: &[char],
) -> String {
    let mut encoded = String::with_capacity(s.len());
    for c in s.chars() {
        if reserved.contains(&c) || c.is_ascii_control() {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(encoded, "%{:02X}", byte);
            }
        }
        else {
            encoded.push(c);
        }
    }
    encoded
}

/// Encodes a source or type column.
pub fn encode_column(s: &str) -> String { percent_encode(s, COLUMN_RESERVED) }

/// Characters allowed unescaped in a seqid.
pub fn is_seqid_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ".:^*$@!+_?-|".contains(c)
}

/// Encodes a seqid, escaping everything outside the allowed character set.
pub fn encode_seqid(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        if is_seqid_char(c) && !(i == 0 && c == '>') {
            encoded.push(c);
        }
        else {
            encoded.push_str(&percent_encode(&c.to_string(), &[c]));
        }
    }
    encoded
}
