//! The markup side: an owned Document Tree for vault notes.
//!
//! The tree is produced once per parse and treated as immutable input by the
//! forward mapper. Parsing itself is delegated to `comrak`; this module only
//! adapts its arena AST into owned, closed node types so the mapper can
//! match exhaustively.

pub mod frontmatter;
pub mod nodes;
pub mod parser;
pub mod wikilink;

pub use frontmatter::render_note;
pub use nodes::{Document, Frontmatter, Note};
pub use parser::{parse_markup, parse_note};
