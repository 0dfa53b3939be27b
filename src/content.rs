use crate::dom::{Element, Node};
use crate::serialize;

const BLOCK_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "p", "div"];
const SKIPPED_CLASSES: [&str; 4] = ["testimonials", "comments", "nav", "footer"];

/// Serializes every retained block under the body into one HTML fragment,
/// in document order.
pub fn body_fragment(body: &Element) -> String {
    let mut fragment = String::new();
    for block in retained_blocks(body) {
        fragment.push_str(&serialize::element_to_html(block));
    }
    fragment
}

pub fn retained_blocks(body: &Element) -> RetainedBlocks<'_> {
    RetainedBlocks {
        stack: body.children.iter().rev().collect(),
    }
}

/// Lazy depth-first walk yielding retained block elements. A retained
/// element is serialized with its whole subtree, so the walk does not
/// descend into it; matching descendants would otherwise be emitted once
/// per matching ancestor.
pub struct RetainedBlocks<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for RetainedBlocks<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            let Node::Element(el) = node else { continue };
            if is_retained(el) {
                return Some(el);
            }
            for child in el.children.iter().rev() {
                self.stack.push(child);
            }
        }
        None
    }
}

fn is_retained(el: &Element) -> bool {
    BLOCK_TAGS.contains(&el.tag.as_str())
        && el
            .attr("class")
            .map(|class| !SKIPPED_CLASSES.contains(&class.trim()))
            .unwrap_or(true)
}
