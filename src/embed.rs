//! Recursive `<embed-file>` resolution.
//!
//! A template pulls in other files with a placeholder element:
//!
//! ```html
//! <body>
//!   <embed-file src="nav.html"></embed-file>
//!   <main>...</main>
//! </body>
//! ```
//!
//! [`expand`] replaces every placeholder with the parsed content of the file
//! it names, in rounds:
//!
//! ```text
//! find tags → rename → locate + read → splice before tag → drop tag → re-scan
//! ```
//!
//! A round reads every file it needs before touching the tree, so a missing
//! file aborts the build with the document untouched. Embedded files may
//! contain further placeholders; they are picked up by the next round's
//! re-scan. The loop runs until a scan finds no placeholders, which means a
//! file that (directly or indirectly) embeds itself never terminates.
//!
//! [`list_dependencies`] reports the names a template embeds directly,
//! without reading anything.

use crate::html::{self, Document, NodeId, ParseError};
use crate::rename::RenameTable;
use crate::search::SearchPath;
use std::collections::HashMap;
use thiserror::Error;

/// Tag name of the placeholder element.
pub const EMBED_TAG: &str = "embed-file";

/// Attribute naming the file to embed.
pub const SRC_ATTR: &str = "src";

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("File {name} not found")]
    MissingFile { name: String },
    #[error("<embed-file> without a src attribute: {tag}")]
    MissingSource { tag: String },
    #[error("failed to read {name}: {source}")]
    Io {
        name: String,
        source: std::io::Error,
    },
    #[error("failed to parse {name}: {source}")]
    Parse { name: String, source: ParseError },
}

/// A placeholder paired with the name of the file it will load.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedTag {
    pub node: NodeId,
    pub name: String,
}

/// Every placeholder in document order, with its `src` passed through the
/// rename table. Tags naming the same file stay separate entries.
pub fn resolve_names(doc: &Document, renames: &RenameTable) -> Result<Vec<EmbedTag>, EmbedError> {
    doc.elements_named(EMBED_TAG)
        .into_iter()
        .map(|node| {
            let src = doc
                .attr(node, SRC_ATTR)
                .ok_or_else(|| EmbedError::MissingSource {
                    tag: doc.element(node).map(|e| e.open_tag.clone()).unwrap_or_default(),
                })?;
            Ok(EmbedTag {
                node,
                name: renames.resolve(src).to_string(),
            })
        })
        .collect()
}

/// Resolve placeholders until none remain and serialize the result.
///
/// Fails with [`EmbedError::MissingFile`] on the first name no search-path
/// directory holds.
pub fn expand(
    doc: &mut Document,
    search: &SearchPath,
    renames: &RenameTable,
) -> Result<String, EmbedError> {
    let mut round = 0usize;
    loop {
        let tags = resolve_names(doc, renames)?;
        if tags.is_empty() {
            break;
        }
        round += 1;
        tracing::debug!(round, tags = tags.len(), "resolving embeds");

        let contents = read_round(&tags, search)?;
        for tag in &tags {
            let Some(content) = contents.get(tag.name.as_str()) else {
                continue;
            };
            let fragments =
                html::parse_fragments(doc, content).map_err(|source| EmbedError::Parse {
                    name: tag.name.clone(),
                    source,
                })?;
            for fragment in fragments {
                doc.insert_before(tag.node, fragment);
            }
            doc.detach(tag.node);
        }
    }
    Ok(doc.to_html())
}

/// Read each distinct file a round needs, failing on the first missing one
/// in document order.
fn read_round(tags: &[EmbedTag], search: &SearchPath) -> Result<HashMap<String, String>, EmbedError> {
    let mut contents = HashMap::new();
    for tag in tags {
        if contents.contains_key(&tag.name) {
            continue;
        }
        let content = search
            .read(&tag.name)
            .map_err(|source| EmbedError::Io {
                name: tag.name.clone(),
                source,
            })?
            .ok_or_else(|| EmbedError::MissingFile {
                name: tag.name.clone(),
            })?;
        contents.insert(tag.name.clone(), content);
    }
    Ok(contents)
}

/// Names the template embeds directly, newline-separated in document order.
///
/// Placeholders inside embedded files are not followed, and no file is read.
pub fn list_dependencies(doc: &Document, renames: &RenameTable) -> Result<String, EmbedError> {
    let names: Vec<String> = resolve_names(doc, renames)?
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    Ok(names.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_document;
    use crate::test_helpers::site;

    fn expand_in(dirs: &[std::path::PathBuf], template: &str, renames: &RenameTable) -> String {
        let mut doc = parse_document(template).unwrap();
        expand(&mut doc, &SearchPath::new(dirs), renames).unwrap()
    }

    #[test]
    fn template_without_embeds_is_unchanged() {
        let template = "<!DOCTYPE html>\n<html><body><p class=x>Hi &amp; bye</p></body></html>\n";
        let out = expand_in(&[], template, &RenameTable::new());
        assert_eq!(out, template);
    }

    #[test]
    fn tag_is_replaced_in_place() {
        let tmp = site(&[("a.html", "hello")]);
        let out = expand_in(
            &[tmp.path().to_path_buf()],
            "<p>before <embed-file src=\"a.html\"></embed-file> after</p>",
            &RenameTable::new(),
        );
        assert_eq!(out, "<p>before hello after</p>");
    }

    #[test]
    fn element_fragments_are_spliced() {
        let tmp = site(&[("nav.html", "<nav><a href=\"/\">Home</a></nav>\n<hr>")]);
        let out = expand_in(
            &[tmp.path().to_path_buf()],
            "<body><embed-file src=nav.html></embed-file><main></main></body>",
            &RenameTable::new(),
        );
        assert_eq!(
            out,
            "<body><nav><a href=\"/\">Home</a></nav>\n<hr><main></main></body>"
        );
    }

    #[test]
    fn rename_loads_the_substitute() {
        let tmp = site(&[("a.html", "from a"), ("b.html", "from b")]);
        let renames: RenameTable = [("a.html", "b.html")].into_iter().collect();
        let out = expand_in(
            &[tmp.path().to_path_buf()],
            "<embed-file src=\"a.html\"></embed-file>",
            &renames,
        );
        assert_eq!(out, "from b");
    }

    #[test]
    fn search_path_order_decides() {
        let tmp = site(&[("dir1/x.html", "first"), ("dir2/x.html", "second")]);
        let out = expand_in(
            &[tmp.path().join("dir1"), tmp.path().join("dir2")],
            "<embed-file src=\"x.html\"></embed-file>",
            &RenameTable::new(),
        );
        assert_eq!(out, "first");
    }

    #[test]
    fn nested_embeds_are_resolved() {
        let tmp = site(&[
            ("a.html", "<div><embed-file src=\"b.html\"></embed-file></div>"),
            ("b.html", "<span>b</span>"),
        ]);
        let mut doc = parse_document("<body><embed-file src=\"a.html\"></embed-file></body>").unwrap();
        let out = expand(
            &mut doc,
            &SearchPath::new([tmp.path()]),
            &RenameTable::new(),
        )
        .unwrap();
        assert_eq!(out, "<body><div><span>b</span></div></body>");
        assert!(doc.elements_named(EMBED_TAG).is_empty());
    }

    #[test]
    fn renames_apply_inside_embedded_files() {
        let tmp = site(&[
            ("page.html", "<embed-file src=\"footer.html\"></embed-file>"),
            ("footer.html", "plain footer"),
            ("footer-print.html", "print footer"),
        ]);
        let renames: RenameTable = [("footer.html", "footer-print.html")].into_iter().collect();
        let out = expand_in(
            &[tmp.path().to_path_buf()],
            "<embed-file src=\"page.html\"></embed-file>",
            &renames,
        );
        assert_eq!(out, "print footer");
    }

    #[test]
    fn same_file_embedded_twice() {
        let tmp = site(&[("sep.html", "<hr>")]);
        let out = expand_in(
            &[tmp.path().to_path_buf()],
            "a<embed-file src=sep.html></embed-file>b<embed-file src=sep.html></embed-file>c",
            &RenameTable::new(),
        );
        assert_eq!(out, "a<hr>b<hr>c");
    }

    #[test]
    fn embed_in_head_stays_in_head() {
        let tmp = site(&[("titles/index.html", "<title>Home</title>")]);
        let out = expand_in(
            &[tmp.path().join("titles")],
            "<html><head><embed-file src=\"index.html\"></embed-file></head><body></body></html>",
            &RenameTable::new(),
        );
        assert_eq!(
            out,
            "<html><head><title>Home</title></head><body></body></html>"
        );
    }

    #[test]
    fn self_closing_tag_is_replaced() {
        let tmp = site(&[("a.html", "A")]);
        let out = expand_in(
            &[tmp.path().to_path_buf()],
            "<p><embed-file src=\"a.html\"/></p>",
            &RenameTable::new(),
        );
        assert_eq!(out, "<p>A</p>");
    }

    #[test]
    fn missing_file_is_reported_by_name() {
        let tmp = site(&[("present.html", "here")]);
        let mut doc = parse_document(
            "<embed-file src=\"present.html\"></embed-file><embed-file src=\"missing.html\"></embed-file>",
        )
        .unwrap();
        let before = doc.to_html();
        let err = expand(
            &mut doc,
            &SearchPath::new([tmp.path()]),
            &RenameTable::new(),
        )
        .unwrap_err();
        assert!(matches!(&err, EmbedError::MissingFile { name } if name == "missing.html"));
        assert_eq!(err.to_string(), "File missing.html not found");
        // Nothing was spliced in the failing round.
        assert_eq!(doc.to_html(), before);
    }

    #[test]
    fn bare_ampersands_survive_expansion() {
        let tmp = site(&[("footer.html", "<p>Fish & Chips Ltd</p>")]);
        let out = expand_in(
            &[tmp.path().to_path_buf()],
            "<h1>Salt & Vinegar</h1><embed-file src=\"footer.html\"></embed-file>",
            &RenameTable::new(),
        );
        assert_eq!(out, "<h1>Salt & Vinegar</h1><p>Fish & Chips Ltd</p>");
    }

    #[test]
    fn src_references_are_decoded() {
        let tmp = site(&[("a&b.html", "joined")]);
        let template = "<embed-file src=\"a&amp;b.html\"></embed-file>";
        let doc = parse_document(template).unwrap();
        assert_eq!(list_dependencies(&doc, &RenameTable::new()).unwrap(), "a&b.html");
        let out = expand_in(&[tmp.path().to_path_buf()], template, &RenameTable::new());
        assert_eq!(out, "joined");
    }

    #[test]
    fn missing_src_is_an_error() {
        let mut doc = parse_document("<embed-file></embed-file>").unwrap();
        let err = expand(&mut doc, &SearchPath::default(), &RenameTable::new()).unwrap_err();
        assert!(matches!(err, EmbedError::MissingSource { .. }));
    }

    #[test]
    fn resolve_names_pairs_each_tag() {
        let doc = parse_document(
            "<embed-file src=a.html></embed-file><p><embed-file src=a.html></embed-file></p>",
        )
        .unwrap();
        let renames: RenameTable = [("a.html", "z.html")].into_iter().collect();
        let tags = resolve_names(&doc, &renames).unwrap();
        assert_eq!(tags.len(), 2);
        assert_ne!(tags[0].node, tags[1].node);
        assert!(tags.iter().all(|t| t.name == "z.html"));
    }

    #[test]
    fn dependencies_in_document_order() {
        let doc = parse_document(
            "<head><embed-file src=\"x.html\"></embed-file></head><body><embed-file src=\"y.html\"></embed-file></body>",
        )
        .unwrap();
        // Neither file exists: listing never reads them.
        assert_eq!(
            list_dependencies(&doc, &RenameTable::new()).unwrap(),
            "x.html\ny.html"
        );
    }

    #[test]
    fn dependencies_apply_renames() {
        let doc = parse_document("<embed-file src=\"x.html\"></embed-file>").unwrap();
        let renames: RenameTable = [("x.html", "x-dark.html")].into_iter().collect();
        assert_eq!(list_dependencies(&doc, &renames).unwrap(), "x-dark.html");
    }

    #[test]
    fn dependencies_of_template_without_embeds() {
        let doc = parse_document("<p>static</p>").unwrap();
        assert_eq!(list_dependencies(&doc, &RenameTable::new()).unwrap(), "");
    }
}
