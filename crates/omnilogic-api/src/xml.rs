// Small shared helpers over `xmltree` for the response parsers.

use std::borrow::Cow;

use xmltree::{Element, XMLNode};

/// Direct child elements with the given name, in document order.
///
/// Wire order is load-bearing for telemetry (positional correlation
/// across equipment kinds), so callers must never sort or dedupe.
pub(crate) fn child_elements<'a>(parent: &'a Element, name: &str) -> Vec<&'a Element> {
    parent
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .filter(|el| el.name == name)
        .collect()
}

/// Concatenated text content of an element; empty when there is none.
pub(crate) fn text_of(el: &Element) -> String {
    el.get_text().map_or_else(String::new, Cow::into_owned)
}
