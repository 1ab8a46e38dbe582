//! The target side: the document service's page model.
//!
//! A page is a [`PropertySet`] plus an ordered forest of [`Block`]s whose
//! inline content is a flat sequence of [`RichText`] runs. The [`wire`]
//! module converts this model to and from the service's JSON shapes.

pub mod block;
pub mod property;
pub mod rich_text;
pub mod wire;

pub use block::{validate_blocks, Block, BlockKind, PLAIN_TEXT_LANGUAGE};
pub use property::{DateValue, PropertySet, PropertyType, PropertyValue};
pub use rich_text::{Annotations, Color, RichText, RunKind, MAX_RUN_LEN};

/// A complete page: typed properties plus top-level blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TargetPage {
    pub properties: PropertySet,
    pub children: Vec<Block>,
}
