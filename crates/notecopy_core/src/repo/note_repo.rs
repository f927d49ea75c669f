//! Note and notetype rows.
//!
//! # Invariants
//! - `flds` is split with `FIELD_SEPARATOR` and zipped with notetype field
//!   names; a count mismatch is invalid persisted data.
//! - `sfld` and `csum` are recomputed on every write.

use crate::model::note::{parse_tags, split_fields, Note, NoteFields, NoteId};
use crate::model::notetype::{Notetype, NotetypeId, NotetypeKind};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub(crate) fn load_notetype(conn: &Connection, id: NotetypeId) -> RepoResult<Option<Notetype>> {
    let header = conn
        .query_row(
            "SELECT name, kind FROM notetypes WHERE id = ?1;",
            [id],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?;
    let Some((name, kind_value)) = header else {
        return Ok(None);
    };
    let kind = NotetypeKind::from_db(kind_value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid notetype kind `{kind_value}` for {id}"))
    })?;

    Ok(Some(Notetype {
        id,
        name,
        kind,
        field_names: load_names(conn, "fields", id)?,
        template_names: load_names(conn, "templates", id)?,
    }))
}

pub(crate) fn insert_notetype(conn: &Connection, notetype: &Notetype, usn: i32) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO notetypes (id, name, kind, mtime_secs, usn)
         VALUES (?1, ?2, ?3, strftime('%s', 'now'), ?4);",
        params![
            notetype.id,
            notetype.name.as_str(),
            notetype.kind.to_db(),
            usn
        ],
    )?;
    for (ord, name) in notetype.field_names.iter().enumerate() {
        conn.execute(
            "INSERT INTO fields (ntid, ord, name) VALUES (?1, ?2, ?3);",
            params![notetype.id, ord as i64, name.as_str()],
        )?;
    }
    for (ord, name) in notetype.template_names.iter().enumerate() {
        conn.execute(
            "INSERT INTO templates (ntid, ord, name) VALUES (?1, ?2, ?3);",
            params![notetype.id, ord as i64, name.as_str()],
        )?;
    }
    Ok(())
}

pub(crate) fn load_note(conn: &Connection, id: NoteId) -> RepoResult<Option<Note>> {
    let row = conn
        .query_row(
            "SELECT guid, mid, mod, usn, tags, flds FROM notes WHERE id = ?1;",
            [id],
            |row| {
                Ok((
                    row.get::<_, String>("guid")?,
                    row.get::<_, NotetypeId>("mid")?,
                    row.get::<_, i64>("mod")?,
                    row.get::<_, i32>("usn")?,
                    row.get::<_, String>("tags")?,
                    row.get::<_, String>("flds")?,
                ))
            },
        )
        .optional()?;
    let Some((guid, notetype_id, mtime_secs, usn, tags, flds)) = row else {
        return Ok(None);
    };

    let field_names = load_names(conn, "fields", notetype_id)?;
    if field_names.is_empty() {
        return Err(RepoError::NotetypeNotFound(notetype_id));
    }
    let fields = NoteFields::from_names_and_values(&field_names, split_fields(&flds))
        .map_err(|err| RepoError::InvalidData(format!("note {id}: {err}")))?;

    Ok(Some(Note {
        id,
        guid,
        notetype_id,
        mtime_secs,
        usn,
        fields,
        tags: parse_tags(&tags),
    }))
}

pub(crate) fn insert_note(conn: &Connection, note: &Note) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO notes (id, guid, mid, mod, usn, tags, flds, sfld, csum, flags, data)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, '');",
        params![
            note.id,
            note.guid.as_str(),
            note.notetype_id,
            note.mtime_secs,
            note.usn,
            note.tags_string(),
            note.fields.joined(),
            note.sort_field(),
            note.checksum(),
        ],
    )?;
    Ok(())
}

pub(crate) fn update_note(conn: &Connection, note: &Note) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE notes
         SET
            guid = ?2,
            mid = ?3,
            mod = ?4,
            usn = ?5,
            tags = ?6,
            flds = ?7,
            sfld = ?8,
            csum = ?9
         WHERE id = ?1;",
        params![
            note.id,
            note.guid.as_str(),
            note.notetype_id,
            note.mtime_secs,
            note.usn,
            note.tags_string(),
            note.fields.joined(),
            note.sort_field(),
            note.checksum(),
        ],
    )?;

    if changed == 0 {
        return Err(RepoError::NoteNotFound(note.id));
    }
    Ok(())
}

pub(crate) fn guid_exists(conn: &Connection, guid: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM notes WHERE guid = ?1);",
        [guid],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn load_names(conn: &Connection, table: &str, notetype_id: NotetypeId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT name FROM {table} WHERE ntid = ?1 ORDER BY ord ASC;"
    ))?;
    let mut rows = stmt.query([notetype_id])?;
    let mut names = Vec::new();
    while let Some(row) = rows.next()? {
        names.push(row.get(0)?);
    }
    Ok(names)
}
