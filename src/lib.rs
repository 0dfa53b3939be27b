pub mod content;
pub mod dom;
pub mod entities;
pub mod fetcher;
pub mod filter;
pub mod markdown;
pub mod metadata;
pub mod parser;
pub mod pipeline;
pub mod serialize;
pub mod title;

use chrono::NaiveDate;

use crate::pipeline::ConversionRecord;

/// Converts one HTML document into a record. `today` is the processing date
/// used when the document carries no publish-date signal.
pub fn convert_page(html: &str, url: &str, today: NaiveDate) -> ConversionRecord {
    let mut doc = parser::parse(html);
    // meta and title tags sit outside the body; read them before filtering
    let meta = metadata::extract(&doc, today);
    let page_title = title::page_title(&doc);
    filter::strip_noise(&mut doc);
    let markdown = doc
        .body()
        .map(|body| markdown::from_html(&content::body_fragment(body)))
        .unwrap_or_default();

    ConversionRecord {
        header: title::header(&page_title, &meta),
        markdown,
        source_url: url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn filtered_sections_never_reach_the_output() {
        let html = r#"<html><body>
            <nav><p>menu</p></nav>
            <h1>Post</h1>
            <div class="testimonials"><p>praise</p></div>
            <p>body text</p>
            <div class="comments"><p>flame</p></div>
            <footer><p>copyright</p></footer>
        </body></html>"#;
        let record = convert_page(html, "http://x.test/", today());
        assert!(record.markdown.contains("# Post"));
        assert!(record.markdown.contains("body text"));
        for gone in ["menu", "praise", "flame", "copyright"] {
            assert!(!record.markdown.contains(gone), "{gone} leaked");
        }
    }

    #[test]
    fn nested_block_text_appears_once() {
        let html = "<body><div><p>once only</p></div></body>";
        let record = convert_page(html, "http://x.test/", today());
        assert_eq!(record.markdown.matches("once only").count(), 1);
    }

    #[test]
    fn header_uses_fallbacks_when_document_is_bare() {
        let record = convert_page("<body><p>x</p></body>", "http://x.test/", today());
        assert_eq!(
            record.header,
            "Title: Untitled-Page\nPublished on: 2024-06-01\nAuthor: Unknown"
        );
    }
}
