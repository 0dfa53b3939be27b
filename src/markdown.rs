use std::mem;

use crate::dom::{Element, Node};
use crate::parser;

/// Converts an HTML fragment to ATX-style Markdown in one pass.
pub fn from_html(fragment: &str) -> String {
    let doc = parser::parse(fragment);
    let mut writer = MarkdownWriter::default();
    writer.walk_all(&doc.nodes);
    tidy(&writer.out)
}

#[derive(Debug, Clone)]
enum ListKind {
    Bullet,
    Numbered(usize),
}

#[derive(Default)]
struct MarkdownWriter {
    out: String,
    lists: Vec<ListKind>,
    pre_depth: usize,
    table_depth: usize,
}

impl MarkdownWriter {
    fn walk_all(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.walk(node);
        }
    }

    fn walk(&mut self, node: &Node) {
        match node {
            Node::Text(text) => self.text(text),
            Node::Element(el) => self.element(el),
        }
    }

    fn element(&mut self, el: &Element) {
        match el.tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.heading(el),
            "p" => self.paragraph(el),
            "br" => self.out.push_str("  \n"),
            "hr" => {
                self.break_block();
                self.out.push_str("---\n\n");
            }
            "strong" | "b" => self.wrapped(el, "**"),
            "em" | "i" => self.wrapped(el, "*"),
            "del" | "s" | "strike" => self.wrapped(el, "~~"),
            "code" => self.code(el),
            "pre" => self.pre(el),
            "a" => self.link(el),
            "img" => self.image(el),
            "ul" => self.list(el, ListKind::Bullet),
            "ol" => self.list(el, ListKind::Numbered(1)),
            "li" => self.list_item(el),
            "blockquote" => self.blockquote(el),
            "table" => self.table(el),
            "tr" | "td" | "th" => self.walk_all(&el.children),
            "script" | "style" | "head" | "noscript" => {}
            _ => self.walk_all(&el.children),
        }
    }

    // Renders children into a detached buffer.
    fn collect(&mut self, el: &Element) -> String {
        let saved = mem::take(&mut self.out);
        self.walk_all(&el.children);
        mem::replace(&mut self.out, saved)
    }

    fn heading(&mut self, el: &Element) {
        let level: usize = el.tag[1..].parse().unwrap_or(1);
        let inline = self.collect(el).trim().to_string();
        if inline.is_empty() {
            return;
        }
        self.break_block();
        for _ in 0..level {
            self.out.push('#');
        }
        self.out.push(' ');
        self.out.push_str(&inline);
        self.out.push_str("\n\n");
    }

    fn paragraph(&mut self, el: &Element) {
        let inline = self.collect(el).trim().to_string();
        if inline.is_empty() {
            return;
        }
        self.break_block();
        self.out.push_str(&inline);
        self.out.push_str("\n\n");
    }

    fn wrapped(&mut self, el: &Element, mark: &str) {
        let inline = self.collect(el);
        let inline = inline.trim();
        if inline.is_empty() {
            return;
        }
        self.out.push_str(mark);
        self.out.push_str(inline);
        self.out.push_str(mark);
    }

    fn code(&mut self, el: &Element) {
        if self.pre_depth > 0 {
            self.walk_all(&el.children);
            return;
        }
        let inline = self.collect(el);
        if inline.is_empty() {
            return;
        }
        self.out.push('`');
        self.out.push_str(&inline);
        self.out.push('`');
    }

    fn pre(&mut self, el: &Element) {
        self.pre_depth += 1;
        let body = self.collect(el);
        self.pre_depth -= 1;
        self.break_block();
        self.out.push_str("```\n");
        self.out.push_str(body.trim_end());
        self.out.push_str("\n```\n\n");
    }

    fn link(&mut self, el: &Element) {
        let inline = self.collect(el).trim().to_string();
        match el.attr("href").map(str::trim).filter(|href| !href.is_empty()) {
            Some(href) => {
                let label = if inline.is_empty() { href } else { inline.as_str() };
                self.out.push('[');
                self.out.push_str(label);
                self.out.push_str("](");
                self.out.push_str(href);
                self.out.push(')');
            }
            None => self.out.push_str(&inline),
        }
    }

    fn image(&mut self, el: &Element) {
        if let Some(src) = el.attr("src").map(str::trim).filter(|src| !src.is_empty()) {
            let alt = el.attr("alt").unwrap_or("").trim();
            self.out.push_str("![");
            self.out.push_str(alt);
            self.out.push_str("](");
            self.out.push_str(src);
            self.out.push(')');
        }
    }

    fn list(&mut self, el: &Element, kind: ListKind) {
        self.lists.push(kind);
        self.walk_all(&el.children);
        self.lists.pop();
        if self.lists.is_empty() {
            self.out.push('\n');
        }
    }

    fn list_item(&mut self, el: &Element) {
        let indent = "  ".repeat(self.lists.len().saturating_sub(1));
        let marker = match self.lists.last_mut() {
            Some(ListKind::Numbered(next)) => {
                let current = *next;
                *next += 1;
                format!("{current}. ")
            }
            _ => "- ".to_string(),
        };
        let inline = self.collect(el).trim().to_string();
        self.out.push_str(&indent);
        self.out.push_str(&marker);
        self.out.push_str(&inline);
        self.out.push('\n');
    }

    fn blockquote(&mut self, el: &Element) {
        let body = self.collect(el);
        let body = body.trim();
        if body.is_empty() {
            return;
        }
        self.break_block();
        for line in body.lines() {
            self.out.push_str("> ");
            self.out.push_str(line);
            self.out.push('\n');
        }
        self.out.push('\n');
    }

    fn table(&mut self, el: &Element) {
        self.table_depth += 1;
        let mut rows = Vec::new();
        self.gather_rows(el, &mut rows);
        self.table_depth -= 1;
        if rows.is_empty() {
            return;
        }

        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
        self.break_block();
        for (idx, row) in rows.iter().enumerate() {
            self.out.push('|');
            for col in 0..width {
                self.out.push(' ');
                self.out.push_str(row.get(col).map(String::as_str).unwrap_or(""));
                self.out.push_str(" |");
            }
            self.out.push('\n');
            if idx == 0 {
                self.out.push('|');
                for _ in 0..width {
                    self.out.push_str(" --- |");
                }
                self.out.push('\n');
            }
        }
        self.out.push('\n');
    }

    fn gather_rows(&mut self, el: &Element, rows: &mut Vec<Vec<String>>) {
        for child in &el.children {
            let Node::Element(inner) = child else { continue };
            match inner.tag.as_str() {
                "tr" => {
                    let mut cells = Vec::new();
                    for cell in &inner.children {
                        if let Node::Element(cell_el) = cell
                            && (cell_el.tag == "td" || cell_el.tag == "th")
                        {
                            cells.push(self.collect(cell_el).trim().to_string());
                        }
                    }
                    if !cells.is_empty() {
                        rows.push(cells);
                    }
                }
                "thead" | "tbody" | "tfoot" => self.gather_rows(inner, rows),
                _ => {}
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.pre_depth > 0 {
            self.out.push_str(text);
            return;
        }
        if text.trim().is_empty() {
            // whitespace between elements collapses to one space mid-line
            let needs_space = self
                .out
                .chars()
                .last()
                .map(|ch| !ch.is_whitespace())
                .unwrap_or(false);
            if needs_space {
                self.out.push(' ');
            }
            return;
        }
        let mut flat = String::with_capacity(text.len());
        let mut last_space = false;
        for ch in text.chars() {
            if ch.is_whitespace() {
                if !last_space {
                    flat.push(' ');
                    last_space = true;
                }
            } else {
                flat.push(ch);
                last_space = false;
            }
        }
        if self.table_depth > 0 {
            flat = flat.replace('|', "\\|");
        }
        self.out.push_str(&flat);
    }

    fn break_block(&mut self) {
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }
}

fn tidy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut newlines = 0;
    for ch in raw.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push('\n');
            }
        } else {
            newlines = 0;
            out.push(ch);
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atx_headings() {
        assert_eq!(from_html("<h1>One</h1><h3>Three</h3>"), "# One\n\n### Three");
    }

    #[test]
    fn paragraphs_separated_by_blank_line() {
        assert_eq!(from_html("<p>a</p><p>b</p>"), "a\n\nb");
    }

    #[test]
    fn inline_emphasis() {
        assert_eq!(
            from_html("<p>a <strong>b</strong> <em>c</em> <del>d</del></p>"),
            "a **b** *c* ~~d~~"
        );
    }

    #[test]
    fn links_and_images() {
        assert_eq!(
            from_html(r#"<p><a href="https://x.test/a">go</a> <img src="i.png" alt="pic"></p>"#),
            "[go](https://x.test/a) ![pic](i.png)"
        );
        assert_eq!(from_html(r#"<p><a href="https://x.test/a"></a></p>"#), "[https://x.test/a](https://x.test/a)");
        assert_eq!(from_html("<p><a>no href</a></p>"), "no href");
    }

    #[test]
    fn unordered_and_nested_lists() {
        assert_eq!(
            from_html("<ul><li>a</li><li>b</li></ul>"),
            "- a\n- b"
        );
        assert_eq!(
            from_html("<ol><li>x</li><li>y</li></ol>"),
            "1. x\n2. y"
        );
    }

    #[test]
    fn blockquote_prefixes_lines() {
        assert_eq!(from_html("<blockquote><p>a</p><p>b</p></blockquote>"), "> a\n> \n> b");
    }

    #[test]
    fn inline_code_and_pre_block() {
        assert_eq!(from_html("<p>use <code>x</code></p>"), "use `x`");
        assert_eq!(
            from_html("<pre><code>let a = 1;\nlet b = 2;</code></pre>"),
            "```\nlet a = 1;\nlet b = 2;\n```"
        );
    }

    #[test]
    fn table_with_header_row() {
        assert_eq!(
            from_html("<table><tr><th>k</th><th>v</th></tr><tr><td>a</td><td>1</td></tr></table>"),
            "| k | v |\n| --- | --- |\n| a | 1 |"
        );
    }

    #[test]
    fn thead_and_tbody_rows_found() {
        let md = from_html(
            "<table><thead><tr><th>h</th></tr></thead><tbody><tr><td>c</td></tr></tbody></table>",
        );
        assert_eq!(md, "| h |\n| --- |\n| c |");
    }

    #[test]
    fn containers_pass_through() {
        assert_eq!(from_html("<div><section><p>x</p></section></div>"), "x");
    }

    #[test]
    fn text_whitespace_collapsed() {
        assert_eq!(from_html("<p>a\n   b</p>"), "a b");
    }

    #[test]
    fn empty_fragment_is_empty() {
        assert_eq!(from_html(""), "");
        assert_eq!(from_html("<p>   </p>"), "");
    }

    #[test]
    fn heading_inside_captured_div() {
        assert_eq!(
            from_html("<div><h2>Title</h2><p>body</p></div>"),
            "## Title\n\nbody"
        );
    }
}
