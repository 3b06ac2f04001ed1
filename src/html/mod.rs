//! HTML document tree: parsing, editing and serialization.
//!
//! | Piece | Role |
//! |---|---|
//! | [`dom`] | Arena tree with stable [`NodeId`]s, sibling insertion and detaching |
//! | [`parser`] | Lenient tree builder on top of the `quick-xml` tokenizer |
//! | `serialize` | Source-preserving serializer ([`Document::to_html`]) |

pub mod dom;
pub mod parser;
mod serialize;

pub use dom::{Attribute, Document, Element, NodeData, NodeId};
pub use parser::{ParseError, parse_document, parse_fragments};
