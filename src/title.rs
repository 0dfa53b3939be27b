use crate::dom::Document;
use crate::metadata::Metadata;

pub const UNTITLED: &str = "Untitled Page";

pub fn page_title(doc: &Document) -> String {
    doc.find("title")
        .map(|el| el.text())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// File-safe form: spaces become hyphens, `|` and `/` are dropped.
pub fn sanitize(title: &str) -> String {
    title
        .chars()
        .filter(|ch| *ch != '|' && *ch != '/')
        .map(|ch| if ch == ' ' { '-' } else { ch })
        .collect()
}

pub fn header(title: &str, meta: &Metadata) -> String {
    format!(
        "Title: {}\nPublished on: {}\nAuthor: {}",
        sanitize(title),
        meta.published,
        meta.author.as_deref().unwrap_or("Unknown"),
    )
}
