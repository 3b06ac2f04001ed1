//! Tree → HTML text.

use super::dom::{Document, NodeData, NodeId};

impl Document {
    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root(), &mut out);
        out
    }

    /// Serialize a single node and its subtree.
    pub fn node_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            Some(NodeData::Root) => self.write_children(id, out),
            Some(NodeData::Element(element)) => {
                out.push_str(&element.open_tag);
                self.write_children(id, out);
                if let Some(close) = &element.close_tag {
                    out.push_str(close);
                }
            }
            Some(NodeData::Text(text)) | Some(NodeData::Markup(text)) => out.push_str(text),
            None => {}
        }
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        for child in self.children(id) {
            self.write_node(child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::html::{parse_document, parse_fragments};

    #[test]
    fn unmodified_document_serializes_to_its_source() {
        let source = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset=utf-8>
  <!-- shared head -->
  <embed-file src='head.html'></embed-file>
  <style>p > a { color: red }</style>
</head>
<BODY class=page>
  <p>Fish &amp; chips<br>
  <p>Unclosed paragraph
  <img src="a.png" alt="">
  <script>if (a < b) { go(); }</script>
</BODY>
</html>
"#;
        let doc = parse_document(source).unwrap();
        assert_eq!(doc.to_html(), source);
    }

    #[test]
    fn node_html_covers_subtree_only() {
        let doc = parse_document("<ul><li>one</li><li>two</li></ul><p>after</p>").unwrap();
        let items = doc.elements_named("li");
        assert_eq!(doc.node_html(items[1]), "<li>two</li>");
        let list = doc.elements_named("ul")[0];
        assert_eq!(doc.node_html(list), "<ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn spliced_fragments_serialize_in_place() {
        let mut doc = parse_document("<div>a<embed-file src=x></embed-file>b</div>").unwrap();
        let tag = doc.elements_named("embed-file")[0];
        for fragment in parse_fragments(&mut doc, "<em>x</em>!").unwrap() {
            doc.insert_before(tag, fragment);
        }
        doc.detach(tag);
        assert_eq!(doc.to_html(), "<div>a<em>x</em>!b</div>");
    }
}
