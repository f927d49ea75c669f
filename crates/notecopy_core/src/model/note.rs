//! Note domain model.
//!
//! # Responsibility
//! - Define the content record that generates one or more cards.
//! - Provide the ordered field mapping and tag helpers used during copy.
//!
//! # Invariants
//! - Field names are unique within one note and keep notetype order.
//! - Tags are unique case-insensitively and keep insertion order.
//! - `guid` is unique across the collection.

use crate::model::notetype::NotetypeId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Millisecond timestamp id of a note row.
pub type NoteId = i64;

/// Separator between field values in the persisted `flds` column.
pub const FIELD_SEPARATOR: char = '\u{1f}';

const GUID_TABLE: &[u8; 91] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!#$%&()*+,-./:;<=>?@[]^_`{|}~";

/// Validation failures for note content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    DuplicateFieldName(String),
    FieldCountMismatch { expected: usize, actual: usize },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateFieldName(name) => write!(f, "duplicate field name `{name}`"),
            Self::FieldCountMismatch { expected, actual } => write!(
                f,
                "note has {actual} field value(s) but its notetype declares {expected}"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Ordered `name -> value` mapping of note fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFields {
    entries: Vec<(String, String)>,
}

impl NoteFields {
    /// Builds a mapping from `(name, value)` pairs, rejecting repeated names.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, NoteValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (name, value) in pairs {
            let name = name.into();
            if entries.iter().any(|(existing, _)| *existing == name) {
                return Err(NoteValidationError::DuplicateFieldName(name));
            }
            entries.push((name, value.into()));
        }
        Ok(Self { entries })
    }

    /// Zips notetype field names with persisted values.
    pub fn from_names_and_values(
        names: &[String],
        values: Vec<String>,
    ) -> Result<Self, NoteValidationError> {
        if names.len() != values.len() {
            return Err(NoteValidationError::FieldCountMismatch {
                expected: names.len(),
                actual: values.len(),
            });
        }
        Self::from_pairs(names.iter().cloned().zip(values))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    /// Replaces the value of an existing field. Unknown names are ignored and
    /// reported with `false`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, current)) => {
                *current = value.into();
                true
            }
            None => false,
        }
    }

    /// Empties every field value while keeping the names.
    pub fn clear_all(&mut self) {
        for (_, value) in &mut self.entries {
            value.clear();
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value joined with `FIELD_SEPARATOR`, as stored in `notes.flds`.
    pub fn joined(&self) -> String {
        let mut joined = String::new();
        for (idx, value) in self.values().enumerate() {
            if idx > 0 {
                joined.push(FIELD_SEPARATOR);
            }
            joined.push_str(value);
        }
        joined
    }
}

/// Content record that generates cards for study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub guid: String,
    pub notetype_id: NotetypeId,
    /// Unix epoch seconds of the last modification.
    pub mtime_secs: i64,
    pub usn: i32,
    pub fields: NoteFields,
    pub tags: Vec<String>,
}

impl Note {
    /// Creates an unsaved note (`id == 0`) with a fresh guid.
    pub fn new(notetype_id: NotetypeId, fields: NoteFields) -> Self {
        Self {
            id: 0,
            guid: new_guid(),
            notetype_id,
            mtime_secs: 0,
            usn: 0,
            fields,
            tags: Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|existing| existing.eq_ignore_ascii_case(tag))
    }

    /// Appends every whitespace-separated tag of `tag` not already present.
    ///
    /// Returns whether the tag list changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let mut changed = false;
        for piece in tag.split_whitespace() {
            if !self.has_tag(piece) {
                self.tags.push(piece.to_string());
                changed = true;
            }
        }
        changed
    }

    /// Tag list in the persisted `" tag1 tag2 "` form.
    pub fn tags_string(&self) -> String {
        if self.tags.is_empty() {
            String::new()
        } else {
            format!(" {} ", self.tags.join(" "))
        }
    }

    /// First field value, used for sorting and duplicate checks.
    pub fn sort_field(&self) -> &str {
        self.fields.values().next().unwrap_or("")
    }

    /// Duplicate-check checksum over the first field.
    pub fn checksum(&self) -> i64 {
        field_checksum(self.sort_field())
    }
}

/// Parses a persisted tag string, dropping empty pieces and duplicates.
pub fn parse_tags(value: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for piece in value.split_whitespace() {
        if !tags.iter().any(|existing| existing.eq_ignore_ascii_case(piece)) {
            tags.push(piece.to_string());
        }
    }
    tags
}

/// Splits a persisted `flds` column into values.
pub fn split_fields(value: &str) -> Vec<String> {
    value.split(FIELD_SEPARATOR).map(str::to_string).collect()
}

/// First 32 bits of the SHA-256 digest of `value`.
pub fn field_checksum(value: &str) -> i64 {
    let digest = Sha256::digest(value.as_bytes());
    i64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

/// Returns a random 64-bit guid encoded with the 91-character host alphabet.
pub fn new_guid() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    let mut value = u64::from_be_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ]);

    let mut encoded = Vec::new();
    loop {
        encoded.push(GUID_TABLE[(value % 91) as usize]);
        value /= 91;
        if value == 0 {
            break;
        }
    }
    encoded.reverse();
    encoded.into_iter().map(char::from).collect()
}
