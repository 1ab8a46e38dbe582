//! Front matter record ⇄ typed page properties.
//!
//! Forward, only fields named by a mapping are sent; coercions that fail drop
//! the property rather than the page. Reverse, mapped properties come back
//! under their field names and everything else is auto-typed under its
//! lower-cased property name.

use crate::markup::Frontmatter;
use crate::options::{PropertyMapping, TransformOptions};
use crate::target::rich_text::enforce_run_limit;
use crate::target::{DateValue, PropertySet, PropertyType, PropertyValue, RichText};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};
use std::collections::BTreeSet;
use tracing::debug;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%B %d, %Y", "%b %d, %Y"];

/// Record plus tags recovered from a property set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordParts {
    /// Plain text of the title-typed property.
    pub title: Option<String>,
    pub record: Frontmatter,
    pub tags: Vec<String>,
}

/// Converts between front matter records and property sets.
pub struct PropertyMapper<'a> {
    options: &'a TransformOptions,
}

impl<'a> PropertyMapper<'a> {
    pub fn new(options: &'a TransformOptions) -> Self {
        Self { options }
    }

    /// Build the property set for a note.
    pub fn to_target(&self, record: &Frontmatter, tags: &[String], title: &str) -> PropertySet {
        let mut properties = PropertySet::new();

        for mapping in &self.options.mappings {
            if properties.contains(&mapping.property) {
                continue;
            }
            let Some(value) = lookup(record, &mapping.field) else {
                continue;
            };
            match coerce(value, mapping.kind) {
                Some(property) => properties.insert(mapping.property.as_str(), property),
                None => debug!(
                    field = %mapping.field,
                    kind = ?mapping.kind,
                    "front matter value could not be coerced, property omitted"
                ),
            }
        }

        if !tags.is_empty() && !properties.contains(&self.options.tags_property) {
            properties.insert(
                self.options.tags_property.as_str(),
                PropertyValue::MultiSelect(tags.to_vec()),
            );
        }

        if properties.title().is_none() && !title.is_empty() {
            properties.insert(
                self.options.title_property.as_str(),
                PropertyValue::Title(enforce_run_limit(vec![RichText::text(title)])),
            );
        }
        properties
    }

    /// Recover the record, tags and title from a property set.
    pub fn to_record(&self, properties: &PropertySet) -> RecordParts {
        let mut parts = RecordParts {
            title: properties
                .title()
                .and_then(|(_, value)| value.as_plain_text()),
            ..RecordParts::default()
        };
        let mut consumed: BTreeSet<&str> = BTreeSet::new();

        for PropertyMapping { field, property, .. } in &self.options.mappings {
            let Some(value) = properties.get(property) else {
                continue;
            };
            consumed.insert(property.as_str());
            if parts.record.contains_key(field) {
                continue;
            }
            if let Some(json) = property_to_json(value) {
                parts.record.insert(field.clone(), json);
            }
        }

        if let Some(PropertyValue::MultiSelect(tags)) = properties.get(&self.options.tags_property)
        {
            parts.tags = tags.clone();
            consumed.insert(self.options.tags_property.as_str());
        }

        for (name, value) in properties.iter() {
            if consumed.contains(name) || value.is_title() {
                continue;
            }
            let key = name.to_lowercase();
            if parts.record.contains_key(&key) {
                continue;
            }
            match property_to_json(value) {
                Some(json) => {
                    parts.record.insert(key, json);
                }
                None => debug!(property = name, kind = value.type_name(), "property not carried back"),
            }
        }

        if !parts.tags.is_empty() {
            merge_tags(&mut parts.record, &parts.tags);
        }
        parts
    }
}

/// Exact key first, then a case-insensitive match.
fn lookup<'r>(record: &'r Frontmatter, field: &str) -> Option<&'r Value> {
    record.get(field).or_else(|| {
        record
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(field))
            .map(|(_, value)| value)
    })
}

fn merge_tags(record: &mut Frontmatter, tags: &[String]) {
    let mut merged: Vec<Value> = match record.remove("tags") {
        Some(Value::Array(existing)) => existing,
        Some(Value::String(existing)) => existing
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(|tag| Value::String(tag.to_string()))
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    };
    for tag in tags {
        let tag = Value::String(tag.clone());
        if !merged.contains(&tag) {
            merged.push(tag);
        }
    }
    record.insert("tags".to_string(), Value::Array(merged));
}

/// Coerce a front matter value into a property of `kind`.
pub fn coerce(value: &Value, kind: PropertyType) -> Option<PropertyValue> {
    if value.is_null() {
        return None;
    }
    let property = match kind {
        PropertyType::Title => PropertyValue::Title(text_runs(value)?),
        PropertyType::RichText => PropertyValue::RichText(text_runs(value)?),
        PropertyType::Number => PropertyValue::Number(Some(match value {
            Value::Number(number) => number.as_f64()?,
            Value::String(text) => text.trim().parse().ok()?,
            _ => return None,
        })),
        PropertyType::Checkbox => PropertyValue::Checkbox(match value {
            Value::Bool(checked) => *checked,
            Value::String(text) => matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes"
            ),
            Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
            _ => return None,
        }),
        PropertyType::Select => PropertyValue::Select(Some(scalar_text(value)?)),
        PropertyType::MultiSelect => PropertyValue::MultiSelect(match value {
            Value::Array(items) => items
                .iter()
                .filter_map(scalar_text)
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            Value::String(text) => text
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            _ => vec![scalar_text(value)?],
        }),
        PropertyType::Date => PropertyValue::Date(Some(DateValue {
            start: parse_date(value.as_str()?)?,
            end: None,
        })),
        PropertyType::Url => PropertyValue::Url(Some(non_empty_str(value)?)),
        PropertyType::Email => PropertyValue::Email(Some(non_empty_str(value)?)),
        PropertyType::PhoneNumber => PropertyValue::PhoneNumber(Some(non_empty_str(value)?)),
    };
    Some(property)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => (!text.is_empty()).then(|| text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn text_runs(value: &Value) -> Option<Vec<RichText>> {
    let text = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other)?,
    };
    Some(enforce_run_limit(vec![RichText::text(text)]))
}

/// Normalize a textual date to ISO 8601; the first matching format wins.
pub fn parse_date(text: &str) -> Option<String> {
    let text = text.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.to_rfc3339());
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    debug!(text, "unrecognised date format");
    None
}

/// A property's value as front matter, `None` for empty or unsupported ones.
pub fn property_to_json(value: &PropertyValue) -> Option<Value> {
    match value {
        PropertyValue::Title(runs) | PropertyValue::RichText(runs) => {
            Some(Value::String(crate::target::rich_text::plain_text(runs)))
        }
        PropertyValue::Number(number) => number.map(number_to_json),
        PropertyValue::Select(name) => name.clone().map(Value::String),
        PropertyValue::MultiSelect(names) => Some(Value::Array(
            names.iter().cloned().map(Value::String).collect(),
        )),
        PropertyValue::Date(date) => date.as_ref().map(|date| Value::String(date.start.clone())),
        PropertyValue::Checkbox(checked) => Some(Value::Bool(*checked)),
        PropertyValue::Url(text) | PropertyValue::Email(text) | PropertyValue::PhoneNumber(text) => {
            text.clone().map(Value::String)
        }
        PropertyValue::Unsupported(_) => None,
    }
}

fn number_to_json(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::Number(Number::from(number as i64))
    } else {
        Number::from_f64(number).map_or(Value::Null, Value::Number)
    }
}
