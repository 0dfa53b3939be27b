use crate::dom::{Document, Node};

const NOISE_TAGS: [&str; 2] = ["nav", "footer"];
const NOISE_CLASSES: [&str; 2] = ["testimonials", "comments"];

/// Removes every noise subtree from the document, in place. Runs before
/// conversion so removed content never reaches the output.
pub fn strip_noise(doc: &mut Document) {
    prune(&mut doc.nodes);
}

fn prune(nodes: &mut Vec<Node>) {
    nodes.retain(|node| !is_noise(node));
    for node in nodes {
        if let Node::Element(el) = node {
            prune(&mut el.children);
        }
    }
}

fn is_noise(node: &Node) -> bool {
    match node {
        Node::Text(_) => false,
        Node::Element(el) => {
            NOISE_TAGS.contains(&el.tag.as_str())
                || NOISE_CLASSES.iter().any(|class| el.has_class(class))
        }
    }
}
