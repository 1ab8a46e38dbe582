//! Bidirectional transformer between vault notes and document-service pages
//!
//!     This crate converts Obsidian-flavoured Markdown notes into the block and property model of
//!     a Notion-style document service, and converts such pages back into markup. It is a pure
//!     lib: no file system walking, no HTTP, no shell concerns. Callers hand in note sources and
//!     get page values back, or the other way around.
//!
//! Architecture
//!
//!     Both sides of the conversion have their own owned tree, and the mappers sit between them:
//!
//!     .
//!     ├── error.rs                # TransformError
//!     ├── options.rs              # TransformOptions: icons, link style, mappings
//!     ├── resolver.rs             # CrossRefResolver: note name <-> page id
//!     ├── markup                  # Document Tree (comrak adapter, front matter, wiki links)
//!     ├── target                  # Page model (blocks, rich text, properties, JSON wire codec)
//!     ├── forward                 # markup -> target (Composer, BlockMapper)
//!     ├── reverse                 # target -> markup (RunRenderer, ReverseMapper, escaping)
//!     ├── properties.rs           # front matter <-> property set
//!     └── sync.rs                 # PageClient seam and PageSync sequencer
//!
//!     Parsing is never done by hand: comrak produces an arena AST which is adapted into the
//!     closed node types of ./markup/nodes.rs. The mappers match those exhaustively, so a new
//!     node kind is a compile error in every place that has to handle it.
//!
//! Lossiness
//!
//!     The two models do not line up. Forward, raw HTML is dropped, headings below level three
//!     flatten, local images and live queries turn into placeholder callouts. Reverse, toggles
//!     become plain bullets, colors other than the highlight color vanish and block kinds this
//!     crate does not know render as a marker comment. Placeholders are recognised on the way
//!     back, so queries and local images survive a full round trip.
//!
//! Testing
//!
//!     tests
//!     ├── lib.rs              # aggregates the per-area modules
//!     ├── common/mod.rs       # fixtures and an in-memory PageClient
//!     ├── forward/            # blocks, inline runs, whole notes
//!     ├── reverse/            # block rendering, round trips
//!     ├── properties/mod.rs
//!     └── sync/mod.rs
//!
//!     Rust does not discover tests in subdirectories, so every area is declared in tests/lib.rs.
//!
pub mod error;
pub mod forward;
pub mod markup;
pub mod options;
pub mod properties;
pub mod resolver;
pub mod reverse;
pub mod sync;
pub mod target;

pub use error::{Result, TransformError};
pub use markup::{parse_markup, parse_note, Document, Note};
pub use options::{CalloutIcons, CalloutType, PropertyMapping, TransformOptions, UnresolvedLinkStyle};
pub use properties::{PropertyMapper, RecordParts};
pub use resolver::{CrossRefResolver, MapResolver, NoopResolver};
pub use reverse::PulledNote;
pub use sync::{PageClient, PageParent, PageSync, SyncError};
pub use target::{Block, BlockKind, PropertySet, PropertyValue, RichText, TargetPage};

use forward::BlockMapper;
use reverse::ReverseMapper;

/// Converts notes to pages and pages back to notes.
///
/// Holds read-only options and borrows the resolver; one transformer can
/// serve any number of documents, from any number of threads.
pub struct Transformer<'r> {
    options: TransformOptions,
    resolver: &'r dyn CrossRefResolver,
}

impl<'r> Transformer<'r> {
    pub fn new(options: TransformOptions, resolver: &'r dyn CrossRefResolver) -> Self {
        Self { options, resolver }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Full forward conversion: properties from front matter and tags,
    /// blocks from the body.
    pub fn to_target(&self, note: &Note) -> Result<TargetPage> {
        let properties =
            PropertyMapper::new(&self.options).to_target(&note.frontmatter, &note.tags, &note.title);
        let children = self.to_blocks(&note.document)?;
        Ok(TargetPage {
            properties,
            children,
        })
    }

    /// Body-only forward conversion.
    pub fn to_blocks(&self, document: &Document) -> Result<Vec<Block>> {
        BlockMapper::new(self.resolver, &self.options).map_document(document)
    }

    /// Body-only reverse conversion.
    pub fn to_markup(&self, blocks: &[Block]) -> Result<String> {
        ReverseMapper::new(self.resolver, &self.options).render(blocks)
    }

    /// Full reverse conversion of a page.
    pub fn to_note(&self, page: &TargetPage) -> Result<PulledNote> {
        let parts = PropertyMapper::new(&self.options).to_record(&page.properties);
        Ok(PulledNote {
            title: parts.title,
            frontmatter: parts.record,
            tags: parts.tags,
            body: self.to_markup(&page.children)?,
        })
    }
}
