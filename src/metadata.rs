use chrono::NaiveDate;

use crate::dom::{Document, Element};

#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub author: Option<String>,
    pub published: String,
}

/// Reads author and publish date from the unfiltered document. `today` is the
/// processing date used when no date signal is present; injected so batches
/// are deterministic under test.
pub fn extract(doc: &Document, today: NaiveDate) -> Metadata {
    let author = meta_content(doc, "name", "author")
        .or_else(|| meta_content(doc, "property", "article:author"))
        .or_else(|| meta_content(doc, "name", "byl"))
        .map(str::to_string);

    let published = meta_content(doc, "property", "article:published_time")
        .map(str::to_string)
        .or_else(|| meta_content(doc, "name", "date").map(str::to_string))
        .or_else(|| meta_content(doc, "name", "DC.date.issued").map(str::to_string))
        .or_else(|| published_time_text(doc))
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

    Metadata { author, published }
}

// First meta element whose `key` attribute equals `value`, taking its content
// attribute. A meta tag without content falls through to the next rule.
fn meta_content<'a>(doc: &'a Document, key: &str, value: &str) -> Option<&'a str> {
    doc.elements()
        .filter(|el| el.tag == "meta")
        .filter(|el| el.attr(key) == Some(value))
        .find_map(|el| el.attr("content"))
}

fn published_time_text(doc: &Document) -> Option<String> {
    doc.elements()
        .find(|el| el.tag == "time" && el.attr("itemprop") == Some("datePublished"))
        .map(Element::text)
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn author_meta_name_wins_over_property() {
        let doc = parse(
            r#"<head>
                <meta property="article:author" content="Property Person">
                <meta name="author" content="Jane">
            </head>"#,
        );
        assert_eq!(extract(&doc, today()).author.as_deref(), Some("Jane"));
    }

    #[test]
    fn author_falls_back_to_byl() {
        let doc = parse(r#"<meta name="byl" content="By Sam">"#);
        assert_eq!(extract(&doc, today()).author.as_deref(), Some("By Sam"));
    }

    #[test]
    fn missing_author_is_none() {
        let doc = parse("<p>no meta here</p>");
        assert_eq!(extract(&doc, today()).author, None);
    }

    #[test]
    fn published_time_property_wins_over_all_other_date_tags() {
        let doc = parse(
            r#"<head>
                <meta name="date" content="2001-01-01">
                <meta property="article:published_time" content="2023-05-01">
                <meta name="DC.date.issued" content="2002-02-02">
            </head>
            <time itemprop="datePublished">2003-03-03</time>"#,
        );
        assert_eq!(extract(&doc, today()).published, "2023-05-01");
    }

    #[test]
    fn dc_date_issued_is_case_sensitive() {
        let doc = parse(r#"<meta name="DC.date.issued" content="2010-10-10">"#);
        assert_eq!(extract(&doc, today()).published, "2010-10-10");

        let wrong_case = parse(r#"<meta name="dc.date.issued" content="2010-10-10">"#);
        assert_eq!(extract(&wrong_case, today()).published, "2024-06-01");
    }

    #[test]
    fn time_element_text_is_last_date_signal() {
        let doc = parse(r#"<time itemprop="datePublished">  2015-09-09  </time>"#);
        assert_eq!(extract(&doc, today()).published, "2015-09-09");
    }

    #[test]
    fn no_date_signal_uses_processing_date() {
        let doc = parse("<p>nothing</p>");
        assert_eq!(extract(&doc, today()).published, "2024-06-01");
    }

    #[test]
    fn meta_without_content_falls_through() {
        let doc = parse(
            r#"<meta name="author">
               <meta property="article:author" content="Fallback Person">"#,
        );
        assert_eq!(
            extract(&doc, today()).author.as_deref(),
            Some("Fallback Person")
        );
    }
}
