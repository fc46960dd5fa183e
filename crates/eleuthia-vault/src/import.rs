// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV import of browser password exports.
//!
//! Column detection is fuzzy: header cells are lowercased with all
//! whitespace removed, then matched by substring. Column order is free.

use eleuthia_core::EleuthiaError;

use crate::model::{Entry, hostname_of, new_entry_id};

/// Notes attached to entries that come from a CSV without a notes column.
pub const IMPORTED_NOTE: &str = "Imported from CSV";

/// Title used when a row has neither a title nor a parsable URL.
pub const FALLBACK_TITLE: &str = "Imported";

/// Resolved column positions for one CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnMap {
    pub title: Option<usize>,
    pub url: Option<usize>,
    pub username: Option<usize>,
    pub password: Option<usize>,
    pub notes: Option<usize>,
}

fn normalize_header(cell: &str) -> String {
    cell.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl ColumnMap {
    /// Detect columns from raw header cells. The first matching cell wins.
    pub fn detect<'a>(header: impl IntoIterator<Item = &'a str>) -> Self {
        let cells: Vec<String> = header.into_iter().map(normalize_header).collect();
        let find = |needle: &str| cells.iter().position(|h| h.contains(needle));

        let username = find("user");
        // An exact `name`/`title` header beats a substring hit, so a leading
        // `username` column is never taken for the title.
        let title = cells
            .iter()
            .position(|h| h == "name" || h == "title")
            .or_else(|| {
                cells.iter().enumerate().position(|(i, h)| {
                    Some(i) != username && (h.contains("name") || h.contains("title"))
                })
            });

        Self {
            title,
            url: find("url"),
            username,
            password: find("pass"),
            notes: find("note"),
        }
    }
}

/// Parse CSV `text` into fresh entries stamped with `now`.
///
/// Fails with [`EleuthiaError::Validation`] when there is no header row or
/// the text is not CSV. Rows supplying none of username, password or URL are
/// skipped.
pub fn parse_csv(text: &str, now: i64) -> Result<Vec<Entry>, EleuthiaError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = reader
        .headers()
        .map_err(|e| EleuthiaError::Validation(format!("unreadable CSV header: {e}")))?
        .clone();
    if header.iter().all(|cell| cell.trim().is_empty()) {
        return Err(EleuthiaError::Validation(
            "CSV file has no header row".to_string(),
        ));
    }
    let columns = ColumnMap::detect(header.iter());

    let mut entries = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| EleuthiaError::Validation(format!("malformed CSV row: {e}")))?;
        if let Some(entry) = row_to_entry(&record, &columns, now) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn row_to_entry(record: &csv::StringRecord, columns: &ColumnMap, now: i64) -> Option<Entry> {
    let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

    let url = cell(columns.url).trim();
    let username = cell(columns.username).trim();
    let password = cell(columns.password);
    if url.is_empty() && username.is_empty() && password.trim().is_empty() {
        return None;
    }

    let title = match cell(columns.title).trim() {
        "" => hostname_of(url).unwrap_or_else(|| FALLBACK_TITLE.to_string()),
        t => t.to_string(),
    };
    let notes = match cell(columns.notes).trim() {
        "" => IMPORTED_NOTE.to_string(),
        n => n.to_string(),
    };
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    Some(Entry {
        id: new_entry_id(),
        title,
        username: non_empty(username),
        password: (!password.trim().is_empty()).then(|| password.to_string()),
        url: non_empty(url),
        notes: Some(notes),
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_export_header_maps_every_column() {
        let rows = parse_csv(
            "Name,URL,Username,Password\nBank,https://bank.example,me,x\n",
            5,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        let e = &rows[0];
        assert_eq!(e.title, "Bank");
        assert_eq!(e.url.as_deref(), Some("https://bank.example"));
        assert_eq!(e.username.as_deref(), Some("me"));
        assert_eq!(e.password.as_deref(), Some("x"));
        assert_eq!(e.notes.as_deref(), Some(IMPORTED_NOTE));
        assert_eq!(e.updated_at, 5);
        assert!(e.id.starts_with("e_"));
    }

    #[test]
    fn headers_are_normalized_and_order_is_free() {
        let columns = ColumnMap::detect(["  PASS word ", "User Name", "Site URL", "Title"]);
        assert_eq!(columns.password, Some(0));
        assert_eq!(columns.username, Some(1));
        assert_eq!(columns.url, Some(2));
        assert_eq!(columns.title, Some(3));
    }

    #[test]
    fn username_column_is_not_taken_for_title() {
        let columns = ColumnMap::detect(["username", "password", "url"]);
        assert_eq!(columns.username, Some(0));
        assert_eq!(columns.title, None);

        let columns = ColumnMap::detect(["username", "accountname"]);
        assert_eq!(columns.title, Some(1));
    }

    #[test]
    fn quoted_fields_with_commas_newlines_and_escapes() {
        let csv = "name,url,username,password,note\r\n\
                   \"Acme, Inc\",https://acme.example,\"a\"\"b\",\"p,w\",\"line1\nline2\"\r\n";
        let rows = parse_csv(csv, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Acme, Inc");
        assert_eq!(rows[0].username.as_deref(), Some("a\"b"));
        assert_eq!(rows[0].password.as_deref(), Some("p,w"));
        assert_eq!(rows[0].notes.as_deref(), Some("line1\nline2"));
    }

    #[test]
    fn empty_rows_are_skipped() {
        let csv = "name,url,username,password\n\
                   Only title,,,\n\
                   ,  , ,  \n\
                   \n\
                   x,,someone,\n";
        let rows = parse_csv(csv, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username.as_deref(), Some("someone"));
        assert_eq!(rows[0].password, None);
    }

    #[test]
    fn title_falls_back_to_hostname_then_literal() {
        let csv = "name,url,username,password\n\
                   ,https://mail.example/inbox,u,p\n\
                   ,not a url,u,p\n";
        let rows = parse_csv(csv, 0).unwrap();
        assert_eq!(rows[0].title, "mail.example");
        assert_eq!(rows[1].title, FALLBACK_TITLE);
    }

    #[test]
    fn short_rows_are_tolerated() {
        let rows = parse_csv("url,username,password\nhttps://a.example\n", 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "a.example");
    }

    #[test]
    fn missing_header_is_a_validation_error() {
        let err = parse_csv("", 0).unwrap_err();
        assert!(matches!(err, EleuthiaError::Validation(_)));
    }

    #[test]
    fn ids_are_fresh_per_row() {
        let rows = parse_csv("url,password\nhttps://a.example,1\nhttps://a.example,1\n", 0).unwrap();
        assert_ne!(rows[0].id, rows[1].id);
    }
}
