//! Lenient HTML tree builder.
//!
//! `quick-xml` does the tokenizing with end-name checks switched off; this
//! module adds the handful of HTML rules needed to build a sensible tree:
//!
//! - void elements (`<meta>`, `<br>`, ...) never take children;
//! - `<script>` and `<style>` bodies are raw text and are not tokenized;
//! - an end tag closes the nearest open element with the same name, along with
//!   anything left open inside it;
//! - an end tag that matches nothing is kept as verbatim markup;
//! - a `&` that does not start a reference is plain text, in content and in
//!   attribute values alike.
//!
//! Every node records the exact source text it came from, so the tree
//! serializes back to its input byte for byte.

use super::dom::{Attribute, Document, Element, NodeId};
use quick_xml::events::attributes::AttrError;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed HTML at byte {position}: {source}")]
    Syntax {
        position: usize,
        source: quick_xml::Error,
    },
    #[error("malformed attribute in <{tag}> at byte {position}: {source}")]
    Attribute {
        tag: String,
        position: usize,
        source: AttrError,
    },
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parse a complete document.
pub fn parse_document(source: &str) -> Result<Document, ParseError> {
    let mut doc = Document::new();
    let root = doc.root();
    build_into(&mut doc, root, source)?;
    Ok(doc)
}

/// Parse `source` as a sequence of fragments owned by `doc`.
///
/// The returned nodes are detached, in source order, ready to be inserted
/// anywhere in `doc`. Leading and trailing text are fragments like any other.
pub fn parse_fragments(doc: &mut Document, source: &str) -> Result<Vec<NodeId>, ParseError> {
    let holder = doc.create_holder();
    build_into(doc, holder, source)?;
    let fragments: Vec<NodeId> = doc.children(holder).collect();
    for &id in &fragments {
        doc.detach(id);
    }
    Ok(fragments)
}

fn build_into(doc: &mut Document, container: NodeId, source: &str) -> Result<(), ParseError> {
    // Byte offset of the reader's input within `source`. Raw-text bodies are
    // skipped by hand, after which a fresh reader resumes at the new base.
    let mut base = 0;
    let mut reader = new_reader(source);

    // Open elements; the container sits at the bottom and is never popped.
    let mut open: Vec<NodeId> = vec![container];

    loop {
        let start = base + reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|source| ParseError::Syntax {
            position: start,
            source,
        })?;
        let end = base + reader.buffer_position() as usize;
        let raw = slice(source, start, end);
        let current = open.last().copied().unwrap_or(container);

        match event {
            Event::Start(tag) => {
                let mut element = start_element(&tag, raw, start)?;
                if RAW_TEXT_ELEMENTS.contains(&element.name.as_str()) {
                    let (body_end, after) = raw_text_end(source, end, &element.name);
                    if body_end < after {
                        element.close_tag = Some(slice(source, body_end, after).to_string());
                    }
                    let id = doc.create_element(element);
                    doc.append(current, id);
                    let body = slice(source, end, body_end);
                    if !body.is_empty() {
                        doc.append_text(id, body);
                    }
                    base = after;
                    reader = new_reader(slice(source, after, source.len()));
                } else if VOID_ELEMENTS.contains(&element.name.as_str()) {
                    let id = doc.create_element(element);
                    doc.append(current, id);
                } else {
                    let id = doc.create_element(element);
                    doc.append(current, id);
                    open.push(id);
                }
            }
            Event::Empty(tag) => {
                let element = start_element(&tag, raw, start)?;
                let id = doc.create_element(element);
                doc.append(current, id);
            }
            Event::End(tag) => {
                let name = tag_name(tag.name().as_ref());
                let matching = open
                    .iter()
                    .skip(1)
                    .rposition(|&id| doc.element(id).is_some_and(|e| e.name == name));
                match matching {
                    Some(pos) => {
                        // `pos` counts from after the container.
                        let pos = pos + 1;
                        if let Some(element) = doc.element_mut(open[pos]) {
                            element.close_tag = Some(raw.to_string());
                        }
                        open.truncate(pos);
                    }
                    None => {
                        tracing::debug!(tag = %name, position = start, "stray end tag kept as-is");
                        let id = doc.create_markup(raw);
                        doc.append(current, id);
                    }
                }
            }
            Event::Text(_) | Event::GeneralRef(_) => doc.append_text(current, raw),
            Event::Eof => break,
            _ => {
                let id = doc.create_markup(raw);
                doc.append(current, id);
            }
        }
    }

    Ok(())
}

fn new_reader(input: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(input);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;
    reader
}

/// Locate the end of a raw-text body starting at `from`.
///
/// Returns `(body_end, after)`: the offset of the closing `</name` and the
/// offset just past its `>`. Both are `source.len()` when the element is
/// never closed.
fn raw_text_end(source: &str, from: usize, name: &str) -> (usize, usize) {
    let rest = slice(source, from, source.len()).to_ascii_lowercase();
    let needle = format!("</{name}");
    match rest.find(&needle) {
        Some(idx) => {
            let body_end = from + idx;
            let after = rest[idx..]
                .find('>')
                .map(|gt| body_end + gt + 1)
                .unwrap_or(source.len());
            (body_end, after)
        }
        None => (source.len(), source.len()),
    }
}

fn start_element(tag: &BytesStart<'_>, raw: &str, position: usize) -> Result<Element, ParseError> {
    let name = tag_name(tag.name().as_ref());
    let mut attrs = Vec::new();
    let mut iter = tag.html_attributes();
    iter.with_checks(false);
    for attr in iter {
        let attr = attr.map_err(|source| ParseError::Attribute {
            tag: name.clone(),
            position,
            source,
        })?;
        attrs.push(Attribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase(),
            value: unescape_attr(&String::from_utf8_lossy(&attr.value)),
        });
    }
    Ok(Element {
        name,
        attrs,
        open_tag: raw.to_string(),
        close_tag: None,
    })
}

/// Decode the character references in an attribute value. Anything that does
/// not resolve, such as the `&b` in `?a=1&b=2`, is left as written.
fn unescape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let reference = rest[1..]
            .find(|c: char| c == ';' || c == '&' || c.is_whitespace())
            .map(|i| i + 1)
            .filter(|&end| rest.as_bytes()[end] == b';')
            .map(|end| &rest[..=end]);
        let decoded = reference.and_then(|r| Some((r, unescape_with(r, resolve_html5_entity).ok()?)));
        match decoded {
            Some((reference, decoded)) => {
                out.push_str(&decoded);
                rest = &rest[reference.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn tag_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_ascii_lowercase()
}

/// Source text between two reader offsets. Offsets always fall on ASCII
/// delimiters, so they are valid char boundaries.
fn slice(source: &str, start: usize, end: usize) -> &str {
    source.get(start..end).unwrap_or_default()
}
