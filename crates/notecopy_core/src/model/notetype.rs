//! Note types and host card generation.
//!
//! # Responsibility
//! - Describe the field names and template slots of a note type.
//! - Decide which card ordinals a note of that type generates.
//!
//! # Invariants
//! - Standard types generate one card per template, in template order.
//! - Cloze types generate one card per distinct cloze number (`cN` -> `N-1`).

use crate::model::note::Note;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type NotetypeId = i64;

static CLOZE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{c(\d+)::").expect("valid cloze regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotetypeKind {
    Standard,
    Cloze,
}

impl NotetypeKind {
    pub fn to_db(self) -> i64 {
        match self {
            Self::Standard => 0,
            Self::Cloze => 1,
        }
    }

    pub fn from_db(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Standard),
            1 => Some(Self::Cloze),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notetype {
    pub id: NotetypeId,
    pub name: String,
    pub kind: NotetypeKind,
    /// Field names in field order.
    pub field_names: Vec<String>,
    /// Template names in ordinal order.
    pub template_names: Vec<String>,
}

impl Notetype {
    /// Card ordinals the host generates for `note`, ascending.
    pub fn card_ordinals(&self, note: &Note) -> Vec<u16> {
        match self.kind {
            NotetypeKind::Standard => (0..self.template_names.len())
                .filter_map(|ord| u16::try_from(ord).ok())
                .collect(),
            NotetypeKind::Cloze => {
                let mut ordinals = BTreeSet::new();
                for value in note.fields.values() {
                    for caps in CLOZE_NUMBER_RE.captures_iter(value) {
                        let number = caps
                            .get(1)
                            .and_then(|m| m.as_str().parse::<u16>().ok())
                            .unwrap_or(0);
                        if number > 0 {
                            ordinals.insert(number - 1);
                        }
                    }
                }
                if ordinals.is_empty() {
                    ordinals.insert(0);
                }
                ordinals.into_iter().collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Notetype, NotetypeKind};
    use crate::model::note::{Note, NoteFields};

    fn notetype(kind: NotetypeKind, templates: &[&str]) -> Notetype {
        Notetype {
            id: 10,
            name: "test".into(),
            kind,
            field_names: vec!["Text".into(), "Extra".into()],
            template_names: templates.iter().map(|name| name.to_string()).collect(),
        }
    }

    fn note(text: &str) -> Note {
        Note::new(
            10,
            NoteFields::from_pairs([("Text", text), ("Extra", "")]).unwrap(),
        )
    }

    #[test]
    fn standard_type_generates_one_card_per_template() {
        let nt = notetype(NotetypeKind::Standard, &["Forward", "Reverse"]);
        assert_eq!(nt.card_ordinals(&note("anything")), vec![0, 1]);
    }

    #[test]
    fn cloze_type_generates_card_per_distinct_number() {
        let nt = notetype(NotetypeKind::Cloze, &["Cloze"]);
        let ords = nt.card_ordinals(&note("{{c3::a}} {{c1::b}} {{c3::c}} {{c0::d}}"));
        assert_eq!(ords, vec![0, 2]);
    }

    #[test]
    fn cloze_without_deletions_still_generates_first_card() {
        let nt = notetype(NotetypeKind::Cloze, &["Cloze"]);
        assert_eq!(nt.card_ordinals(&note("plain text")), vec![0]);
    }
}
