//! CSV export.
//!
//! Every value is double-quoted with `"` doubled. Embedded `\n`/`\r` become
//! one space each so one record always occupies exactly one line.

use crate::model::item::Item;

/// Returned instead of a header-only file when there is nothing to export.
pub const EMPTY_EXPORT_SENTINEL: &str = "No items to export";

/// Fixed column order of the CSV export.
pub const CSV_HEADERS: [&str; 10] = [
    "Title",
    "Type",
    "Author",
    "Director",
    "Season",
    "Published Year",
    "Year Logged",
    "Re-read/Re-watched",
    "Created At",
    "Updated At",
];

/// Serializes items to CSV, one row per item, `\n`-separated.
pub fn items_to_csv(items: &[Item]) -> String {
    if items.is_empty() {
        return EMPTY_EXPORT_SENTINEL.to_string();
    }

    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(CSV_HEADERS.join(","));
    lines.extend(items.iter().map(item_row));
    lines.join("\n")
}

fn item_row(item: &Item) -> String {
    let season = item.kind.season().map(|value| value.to_string());
    let published_year = item.published_year.to_string();
    let belongs_to_year = item.belongs_to_year.to_string();
    let fields: [&str; 10] = [
        item.title.as_str(),
        item.item_type().as_str(),
        item.kind.author().unwrap_or_default(),
        item.kind.director().unwrap_or_default(),
        season.as_deref().unwrap_or_default(),
        published_year.as_str(),
        belongs_to_year.as_str(),
        if item.redo { "Yes" } else { "No" },
        item.created_at.as_deref().unwrap_or_default(),
        item.updated_at.as_deref().unwrap_or_default(),
    ];

    fields
        .iter()
        .map(|field| quote_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quotes one CSV value, doubling quotes and flattening line breaks.
pub fn quote_field(value: &str) -> String {
    let escaped = value.replace('"', "\"\"").replace(['\n', '\r'], " ");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::quote_field;

    #[test]
    fn quote_field_doubles_quotes() {
        assert_eq!(quote_field(r#"say "hi""#), r#""say ""hi""""#);
    }

    #[test]
    fn quote_field_flattens_each_line_break_to_one_space() {
        assert_eq!(quote_field("a\r\nb"), "\"a  b\"");
        assert_eq!(quote_field("a\nb"), "\"a b\"");
    }
}
