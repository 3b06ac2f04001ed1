//! # buildpage
//!
//! Builds static HTML pages by embedding shared fragments into templates.
//! A template marks each inclusion with a custom element:
//!
//! ```html
//! <head>
//!   <embed-file src="title.html"></embed-file>
//!   <embed-file src="head.html"></embed-file>
//! </head>
//! <body>
//!   <embed-file src="nav.html"></embed-file>
//!   ...
//! ```
//!
//! Each tag is replaced by the content of the file it names. Names are looked
//! up along an ordered search path, optionally after being swapped for another
//! name by a define (`--define title.html about-title.html`), so one template
//! can serve every page of a site.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`embed`] | The resolver: expands tags to a fixed point, or lists them |
//! | [`html`] | Arena document tree, lenient parser, source-preserving serializer |
//! | [`search`] | Ordered directory lookup for embedded files |
//! | [`rename`] | Name → substitute table built from defines |
//! | [`config`] | `buildpage.toml` loading, merging over stock defaults, validation |
//! | [`title`] | `<title>` snippets generated from `[titles.pages]` |
//! | [`output`] | Writing results to stdout or a file |
//!
//! # Design Decisions
//!
//! ## Source-Preserving Tree
//!
//! Pages are not normalized. Every node keeps the exact text it was parsed
//! from, so everything outside the replaced tags comes out byte-for-byte as it
//! went in: attribute quoting, entity references, whitespace, and unclosed
//! `<p>`s alike. The tree exists to find tags and splice fragments, not to
//! rewrite markup.
//!
//! ## Tags Stay Where They Are
//!
//! The tree builder applies only the HTML rules it needs (void elements,
//! raw-text `<script>`/`<style>`, implied end tags) and never relocates
//! elements. An `<embed-file>` in `<head>` stays in `<head>`, which is what
//! makes embedding `<title>` snippets work.
//!
//! ## Fixed-Point Expansion
//!
//! After every round of splicing the whole tree is scanned again, so embedded
//! files may embed further files to any depth. There is no cycle
//! detection: a file that embeds itself keeps the build running.

pub mod config;
pub mod embed;
pub mod html;
pub mod output;
pub mod rename;
pub mod search;
pub mod title;

#[cfg(test)]
pub(crate) mod test_helpers;
