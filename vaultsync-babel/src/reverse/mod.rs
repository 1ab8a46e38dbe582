//! Reverse direction: target page → markup note.

pub mod blocks;
pub mod escape;
pub mod rich_text;

pub use blocks::ReverseMapper;
pub use rich_text::RunRenderer;

use crate::error::Result;
use crate::markup::{render_note, Frontmatter};

/// A note rebuilt from a target page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PulledNote {
    /// Plain text of the page's title property.
    pub title: Option<String>,
    pub frontmatter: Frontmatter,
    pub tags: Vec<String>,
    pub body: String,
}

impl PulledNote {
    /// The full note source: YAML front matter (when any) followed by the body.
    pub fn to_markup(&self) -> Result<String> {
        render_note(&self.frontmatter, &self.body)
    }
}
