//! Relation tags linking a note with its copies.
//!
//! # Invariants
//! - A note carries at most one relation tag added by the copy workflow:
//!   tagging is skipped when any configured prefix already matches.

use crate::config::DEFAULT_RELATION_PREFIX;
use crate::model::note::Note;

pub struct RelationTagger<'a> {
    prefixes: &'a [String],
}

impl<'a> RelationTagger<'a> {
    pub fn new(prefixes: &'a [String]) -> Self {
        Self { prefixes }
    }

    fn primary_prefix(&self) -> &str {
        self.prefixes
            .iter()
            .map(|prefix| prefix.trim())
            .find(|prefix| !prefix.is_empty())
            .unwrap_or(DEFAULT_RELATION_PREFIX)
    }

    /// Marker shared by a note and its copies, e.g. `relation_1700000000000`.
    pub fn relation_tag(&self, now_millis: i64) -> String {
        format!("{}{now_millis}", self.primary_prefix())
    }

    /// Relation tags already present on `note`.
    pub fn relations<'n>(&self, note: &'n Note) -> Vec<&'n str> {
        note.tags
            .iter()
            .map(String::as_str)
            .filter(|tag| self.is_relation_tag(tag))
            .collect()
    }

    pub fn has_relation(&self, note: &Note) -> bool {
        note.tags.iter().any(|tag| self.is_relation_tag(tag))
    }

    fn is_relation_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        if self.prefixes.iter().all(|prefix| prefix.trim().is_empty()) {
            return tag.starts_with(DEFAULT_RELATION_PREFIX);
        }
        self.prefixes
            .iter()
            .map(|prefix| prefix.trim().to_lowercase())
            .any(|prefix| !prefix.is_empty() && tag.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::RelationTagger;
    use crate::model::note::{Note, NoteFields};

    fn note_with_tags(tags: &[&str]) -> Note {
        let mut note = Note::new(1, NoteFields::from_pairs([("Front", "q")]).unwrap());
        for tag in tags {
            note.add_tag(tag);
        }
        note
    }

    #[test]
    fn relation_tag_uses_first_non_blank_prefix() {
        let prefixes = vec![" ".to_string(), "linked::".to_string()];
        let tagger = RelationTagger::new(&prefixes);
        assert_eq!(tagger.relation_tag(42), "linked::42");
    }

    #[test]
    fn has_relation_matches_any_prefix_case_insensitively() {
        let prefixes = vec!["relation_".to_string(), "sibling_".to_string()];
        let tagger = RelationTagger::new(&prefixes);
        assert!(tagger.has_relation(&note_with_tags(&["Sibling_7"])));
        assert!(!tagger.has_relation(&note_with_tags(&["related", "geo"])));
        assert_eq!(
            tagger.relations(&note_with_tags(&["geo", "relation_1"])),
            vec!["relation_1"]
        );
    }

    #[test]
    fn empty_prefix_list_falls_back_to_default() {
        let tagger = RelationTagger::new(&[]);
        assert_eq!(tagger.relation_tag(5), "relation_5");
        assert!(tagger.has_relation(&note_with_tags(&["relation_5"])));
    }
}
