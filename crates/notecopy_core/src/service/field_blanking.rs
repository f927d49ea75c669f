//! Field blanking applied to a copy before it is persisted.

use crate::config::CopyConfig;
use crate::model::note::Note;

/// Clears the configured fields of `note` and returns how many were named.
///
/// "Leave all fields empty" wins over the per-field list. Names that the
/// note does not have are ignored.
pub fn blank_fields(note: &mut Note, config: &CopyConfig) -> usize {
    if config.blank_all_fields {
        note.fields.clear_all();
        return note.fields.len();
    }

    let mut cleared = 0;
    for name in &config.fields_to_blank {
        if note.fields.set(name, "") {
            cleared += 1;
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::blank_fields;
    use crate::config::CopyConfig;
    use crate::model::note::{Note, NoteFields};

    fn note() -> Note {
        Note::new(
            1,
            NoteFields::from_pairs([("Front", "q"), ("Back", "a"), ("Extra", "x")]).unwrap(),
        )
    }

    #[test]
    fn blank_all_overrides_field_list() {
        let mut note = note();
        let config = CopyConfig {
            blank_all_fields: true,
            fields_to_blank: vec!["Front".into()],
            ..CopyConfig::default()
        };
        assert_eq!(blank_fields(&mut note, &config), 3);
        assert!(note.fields.values().all(str::is_empty));
    }

    #[test]
    fn only_listed_existing_fields_are_cleared() {
        let mut note = note();
        let config = CopyConfig {
            fields_to_blank: vec!["Back".into(), "Missing".into()],
            ..CopyConfig::default()
        };
        assert_eq!(blank_fields(&mut note, &config), 1);
        assert_eq!(note.fields.get("Front"), Some("q"));
        assert_eq!(note.fields.get("Back"), Some(""));
        assert_eq!(note.fields.get("Extra"), Some("x"));
    }

    #[test]
    fn default_config_leaves_fields_untouched() {
        let mut note = note();
        assert_eq!(blank_fields(&mut note, &CopyConfig::default()), 0);
        assert_eq!(note.fields.get("Front"), Some("q"));
    }
}
