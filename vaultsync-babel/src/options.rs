//! Transform options.
//!
//! Everything the mappers treat as configurable lives here as one explicit
//! value handed to [`crate::Transformer::new`]. `vaultsync-config` builds it
//! from layered TOML; `TransformOptions::default()` matches the embedded
//! defaults file.

use crate::target::{Color, PropertyType};
use serde::{Deserialize, Serialize};

/// How a cross-reference that the resolver cannot resolve is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedLinkStyle {
    /// Red `[[display]]` text.
    #[default]
    Placeholder,
    /// Plain display text.
    Text,
    /// Nothing.
    Skip,
}

/// One icon shared by a group of synonymous callout types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalloutType {
    pub names: Vec<String>,
    pub icon: String,
}

impl CalloutType {
    fn new(names: &[&str], icon: &str) -> Self {
        Self {
            names: names.iter().map(|name| name.to_string()).collect(),
            icon: icon.to_string(),
        }
    }
}

/// Ordered callout type → icon table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalloutIcons {
    /// Icon for types missing from the table.
    pub fallback_icon: String,
    /// Icon of the placeholder callout that stands in for query blocks.
    pub dataview_icon: String,
    pub types: Vec<CalloutType>,
}

impl CalloutIcons {
    /// Icon for a callout type, case-insensitively.
    pub fn icon_for(&self, callout_type: &str) -> &str {
        self.types
            .iter()
            .find(|group| {
                group
                    .names
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(callout_type))
            })
            .map(|group| group.icon.as_str())
            .unwrap_or(&self.fallback_icon)
    }

    /// First configured type name for an icon, `note` when the icon is the
    /// fallback or unknown.
    pub fn type_for(&self, icon: &str) -> &str {
        if icon == self.fallback_icon {
            return "note";
        }
        self.types
            .iter()
            .find(|group| group.icon == icon)
            .and_then(|group| group.names.first())
            .map(String::as_str)
            .unwrap_or("note")
    }
}

impl Default for CalloutIcons {
    fn default() -> Self {
        Self {
            fallback_icon: "💡".to_string(),
            dataview_icon: "🔍".to_string(),
            types: vec![
                CalloutType::new(&["note"], "📝"),
                CalloutType::new(&["abstract", "summary", "tldr"], "📋"),
                CalloutType::new(&["info"], "ℹ️"),
                CalloutType::new(&["todo"], "☑️"),
                CalloutType::new(&["tip", "hint", "important"], "🔥"),
                CalloutType::new(&["success", "check", "done"], "✅"),
                CalloutType::new(&["question", "help", "faq"], "❓"),
                CalloutType::new(&["warning", "caution", "attention"], "⚠️"),
                CalloutType::new(&["failure", "fail", "missing"], "❌"),
                CalloutType::new(&["danger", "error"], "⚡"),
                CalloutType::new(&["bug"], "🐛"),
                CalloutType::new(&["example"], "📌"),
                CalloutType::new(&["quote", "cite"], "💬"),
            ],
        }
    }
}

/// Maps one front matter field to one page property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMapping {
    pub field: String,
    pub property: String,
    #[serde(rename = "type")]
    pub kind: PropertyType,
}

impl PropertyMapping {
    pub fn new(field: impl Into<String>, property: impl Into<String>, kind: PropertyType) -> Self {
        Self {
            field: field.into(),
            property: property.into(),
            kind,
        }
    }
}

/// Nesting limit for block trees, in either direction and when pulling.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Options for both transform directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Rendering of cross-references the resolver does not know
    pub unresolved_links: UnresolvedLinkStyle,

    /// Maximum nesting of lists, quotes and callouts
    pub max_depth: usize,

    /// Color given to `==highlighted==` text
    pub highlight_color: Color,

    pub callouts: CalloutIcons,

    /// Property receiving the note title when no mapping produced one
    pub title_property: String,

    /// Multi-select property receiving the tag list
    pub tags_property: String,

    /// Ordered field mappings; earlier entries win on the reverse path
    pub mappings: Vec<PropertyMapping>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            unresolved_links: UnresolvedLinkStyle::Placeholder,
            max_depth: DEFAULT_MAX_DEPTH,
            highlight_color: Color::YellowBackground,
            callouts: CalloutIcons::default(),
            title_property: "Name".to_string(),
            tags_property: "Tags".to_string(),
            mappings: Vec::new(),
        }
    }
}
