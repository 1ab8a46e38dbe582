//! Typed page properties.

use super::rich_text::{plain_text, RichText};
use crate::error::{Result, TransformError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name a title property must carry when the page lives under another page.
pub const PAGE_PARENT_TITLE: &str = "title";

/// Property types a mapping can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Date,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
}

/// Start and optional end of a date property, as ISO 8601 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title(Vec<RichText>),
    RichText(Vec<RichText>),
    Number(Option<f64>),
    Select(Option<String>),
    MultiSelect(Vec<String>),
    Date(Option<DateValue>),
    Checkbox(bool),
    Url(Option<String>),
    Email(Option<String>),
    PhoneNumber(Option<String>),
    /// Service-computed or otherwise unmapped kinds, by wire type name.
    Unsupported(String),
}

impl PropertyValue {
    pub fn property_type(&self) -> Option<PropertyType> {
        match self {
            PropertyValue::Title(_) => Some(PropertyType::Title),
            PropertyValue::RichText(_) => Some(PropertyType::RichText),
            PropertyValue::Number(_) => Some(PropertyType::Number),
            PropertyValue::Select(_) => Some(PropertyType::Select),
            PropertyValue::MultiSelect(_) => Some(PropertyType::MultiSelect),
            PropertyValue::Date(_) => Some(PropertyType::Date),
            PropertyValue::Checkbox(_) => Some(PropertyType::Checkbox),
            PropertyValue::Url(_) => Some(PropertyType::Url),
            PropertyValue::Email(_) => Some(PropertyType::Email),
            PropertyValue::PhoneNumber(_) => Some(PropertyType::PhoneNumber),
            PropertyValue::Unsupported(_) => None,
        }
    }

    /// Wire type name.
    pub fn type_name(&self) -> &str {
        match self {
            PropertyValue::Title(_) => "title",
            PropertyValue::RichText(_) => "rich_text",
            PropertyValue::Number(_) => "number",
            PropertyValue::Select(_) => "select",
            PropertyValue::MultiSelect(_) => "multi_select",
            PropertyValue::Date(_) => "date",
            PropertyValue::Checkbox(_) => "checkbox",
            PropertyValue::Url(_) => "url",
            PropertyValue::Email(_) => "email",
            PropertyValue::PhoneNumber(_) => "phone_number",
            PropertyValue::Unsupported(name) => name,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, PropertyValue::Title(_))
    }

    /// Plain text of a title or rich-text value.
    pub fn as_plain_text(&self) -> Option<String> {
        match self {
            PropertyValue::Title(runs) | PropertyValue::RichText(runs) => Some(plain_text(runs)),
            _ => None,
        }
    }
}

/// Property name → value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertySet {
    entries: BTreeMap<String, PropertyValue>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The title-typed entry, if any.
    pub fn title(&self) -> Option<(&str, &PropertyValue)> {
        self.iter().find(|(_, value)| value.is_title())
    }

    /// Reduce to what a page created under another page accepts: at most one
    /// title, keyed `"title"`. Every other property is dropped.
    pub fn for_page_parent(self) -> Result<Self> {
        let mut titles: Vec<PropertyValue> = self
            .entries
            .into_values()
            .filter(PropertyValue::is_title)
            .collect();
        if titles.len() > 1 {
            return Err(TransformError::MultipleTitles {
                count: titles.len(),
            });
        }

        let mut reduced = PropertySet::new();
        if let Some(title) = titles.pop() {
            reduced.insert(PAGE_PARENT_TITLE, title);
        }
        Ok(reduced)
    }
}

impl FromIterator<(String, PropertyValue)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
