//! JSON wire codec for the target model.
//!
//! Produces the request shapes the document service accepts and decodes the
//! response shapes it returns. Read-only response fields (`plain_text`,
//! `href`, timestamps) are ignored on decode except where they carry the
//! only copy of a value.

use super::block::{
    Block, BlockKind, Callout, ChildPage, Code, Equation, Media, Table, TableRow, TextBlock, ToDo,
};
use super::property::{DateValue, PropertySet, PropertyValue};
use super::rich_text::{Annotations, Color, RichText, RunKind};
use crate::error::{Result, TransformError};
use serde_json::{json, Map, Value};

fn invalid(msg: impl Into<String>) -> TransformError {
    TransformError::InvalidWire(msg.into())
}

fn str_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value.get(key).and_then(Value::as_str)
}

fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn color_field(value: &Value) -> Color {
    value
        .get("color")
        .cloned()
        .and_then(|color| serde_json::from_value(color).ok())
        .unwrap_or_default()
}

impl RichText {
    pub fn to_json(&self) -> Value {
        let annotations = serde_json::to_value(self.annotations).unwrap_or_else(|_| json!({}));
        match &self.kind {
            RunKind::Text { link } => json!({
                "type": "text",
                "text": {
                    "content": self.content,
                    "link": link.as_ref().map(|url| json!({ "url": url })),
                },
                "annotations": annotations,
            }),
            RunKind::Mention { page_id } => json!({
                "type": "mention",
                "mention": { "type": "page", "page": { "id": page_id } },
                "annotations": annotations,
                "plain_text": self.content,
            }),
            RunKind::Equation => json!({
                "type": "equation",
                "equation": { "expression": self.content },
                "annotations": annotations,
            }),
        }
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let annotations: Annotations = match value.get("annotations") {
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|e| invalid(format!("bad annotations: {e}")))?,
            None => Annotations::default(),
        };
        let plain = str_field(value, "plain_text");

        let run = match str_field(value, "type").unwrap_or("text") {
            "text" => {
                let text = value
                    .get("text")
                    .ok_or_else(|| invalid("text run without 'text' body"))?;
                let content = str_field(text, "content").or(plain).unwrap_or_default();
                let link = text
                    .get("link")
                    .and_then(|link| str_field(link, "url"))
                    .map(str::to_string);
                RichText {
                    content: content.to_string(),
                    annotations,
                    kind: RunKind::Text { link },
                }
            }
            "mention" => {
                let mention = value
                    .get("mention")
                    .ok_or_else(|| invalid("mention run without 'mention' body"))?;
                let kind = str_field(mention, "type").unwrap_or_default();
                let page_id = mention
                    .get(kind)
                    .and_then(|target| str_field(target, "id"))
                    .filter(|_| kind == "page" || kind == "database");
                match page_id {
                    Some(id) => RichText {
                        content: plain.unwrap_or(id).to_string(),
                        annotations,
                        kind: RunKind::Mention {
                            page_id: id.to_string(),
                        },
                    },
                    None => RichText {
                        content: plain.unwrap_or_default().to_string(),
                        annotations,
                        kind: RunKind::Text {
                            link: str_field(value, "href").map(str::to_string),
                        },
                    },
                }
            }
            "equation" => {
                let expression = value
                    .get("equation")
                    .and_then(|eq| str_field(eq, "expression"))
                    .ok_or_else(|| invalid("equation run without expression"))?;
                RichText {
                    content: expression.to_string(),
                    annotations,
                    kind: RunKind::Equation,
                }
            }
            other => return Err(invalid(format!("unknown rich text type '{other}'"))),
        };
        Ok(run)
    }
}

fn runs_to_json(runs: &[RichText]) -> Value {
    Value::Array(runs.iter().map(RichText::to_json).collect())
}

fn runs_from_json(value: Option<&Value>) -> Result<Vec<RichText>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(RichText::from_json).collect(),
        Some(other) => Err(invalid(format!("expected rich text array, got {other}"))),
    }
}

fn text_body(block: &TextBlock) -> Value {
    json!({ "rich_text": runs_to_json(&block.rich_text), "color": block.color })
}

fn media_file_body(media: &Media) -> Value {
    json!({
        "type": "external",
        "external": { "url": media.url },
        "caption": runs_to_json(&media.caption),
    })
}

fn media_link_body(media: &Media) -> Value {
    json!({ "url": media.url, "caption": runs_to_json(&media.caption) })
}

impl Block {
    /// Encode as a block object, children nested in the type body.
    pub fn to_json(&self) -> Value {
        let mut body = match &self.kind {
            BlockKind::Paragraph(text)
            | BlockKind::Heading1(text)
            | BlockKind::Heading2(text)
            | BlockKind::Heading3(text)
            | BlockKind::BulletedListItem(text)
            | BlockKind::NumberedListItem(text)
            | BlockKind::Toggle(text)
            | BlockKind::Quote(text) => text_body(text),
            BlockKind::ToDo(todo) => json!({
                "rich_text": runs_to_json(&todo.rich_text),
                "checked": todo.checked,
            }),
            BlockKind::Callout(callout) => json!({
                "rich_text": runs_to_json(&callout.rich_text),
                "icon": { "type": "emoji", "emoji": callout.icon },
                "color": callout.color,
            }),
            BlockKind::Code(code) => json!({
                "rich_text": runs_to_json(&code.rich_text),
                "language": code.language,
                "caption": runs_to_json(&code.caption),
            }),
            BlockKind::Divider | BlockKind::ColumnList | BlockKind::Column => json!({}),
            BlockKind::SyncedBlock => json!({ "synced_from": null }),
            BlockKind::Equation(eq) => json!({ "expression": eq.expression }),
            BlockKind::Image(media)
            | BlockKind::Video(media)
            | BlockKind::File(media)
            | BlockKind::Pdf(media) => media_file_body(media),
            BlockKind::Bookmark(media) | BlockKind::Embed(media) => media_link_body(media),
            BlockKind::Table(table) => json!({
                "table_width": table.width,
                "has_column_header": table.has_column_header,
                "has_row_header": table.has_row_header,
            }),
            BlockKind::TableRow(row) => json!({
                "cells": row.cells.iter().map(|cell| runs_to_json(cell)).collect::<Vec<_>>(),
            }),
            BlockKind::ChildPage(page) => json!({ "title": page.title }),
            BlockKind::Unsupported(_) => json!({}),
        };

        if !self.children.is_empty() {
            if let Value::Object(map) = &mut body {
                map.insert(
                    "children".to_string(),
                    Value::Array(self.children.iter().map(Block::to_json).collect()),
                );
            }
        }

        let type_name = self.kind.type_name();
        let mut object = Map::new();
        object.insert("object".to_string(), json!("block"));
        if let Some(id) = &self.id {
            object.insert("id".to_string(), json!(id));
        }
        object.insert("type".to_string(), json!(type_name));
        object.insert(type_name.to_string(), body);
        Value::Object(object)
    }

    /// Decode a block object. Unknown types become [`BlockKind::Unsupported`].
    pub fn from_json(value: &Value) -> Result<Self> {
        let type_name = str_field(value, "type").ok_or_else(|| invalid("block without type"))?;
        let empty = json!({});
        let body = value.get(type_name).unwrap_or(&empty);
        let text = || -> Result<TextBlock> {
            Ok(TextBlock {
                rich_text: runs_from_json(body.get("rich_text"))?,
                color: color_field(body),
            })
        };
        let media_url = || -> String {
            let hosted = str_field(body, "type").unwrap_or("external");
            body.get(hosted)
                .and_then(|source| str_field(source, "url"))
                .or_else(|| str_field(body, "url"))
                .unwrap_or_default()
                .to_string()
        };
        let media = || -> Result<Media> {
            Ok(Media {
                url: media_url(),
                caption: runs_from_json(body.get("caption"))?,
            })
        };

        let kind = match type_name {
            "paragraph" => BlockKind::Paragraph(text()?),
            "heading_1" => BlockKind::Heading1(text()?),
            "heading_2" => BlockKind::Heading2(text()?),
            "heading_3" => BlockKind::Heading3(text()?),
            "bulleted_list_item" => BlockKind::BulletedListItem(text()?),
            "numbered_list_item" => BlockKind::NumberedListItem(text()?),
            "toggle" => BlockKind::Toggle(text()?),
            "quote" => BlockKind::Quote(text()?),
            "to_do" => BlockKind::ToDo(ToDo {
                rich_text: runs_from_json(body.get("rich_text"))?,
                checked: bool_field(body, "checked"),
            }),
            "callout" => BlockKind::Callout(Callout {
                rich_text: runs_from_json(body.get("rich_text"))?,
                icon: body
                    .get("icon")
                    .and_then(|icon| str_field(icon, "emoji"))
                    .unwrap_or_default()
                    .to_string(),
                color: color_field(body),
            }),
            "code" => BlockKind::Code(Code {
                rich_text: runs_from_json(body.get("rich_text"))?,
                language: str_field(body, "language")
                    .unwrap_or(super::block::PLAIN_TEXT_LANGUAGE)
                    .to_string(),
                caption: runs_from_json(body.get("caption"))?,
            }),
            "divider" => BlockKind::Divider,
            "equation" => BlockKind::Equation(Equation {
                expression: str_field(body, "expression").unwrap_or_default().to_string(),
            }),
            "image" => BlockKind::Image(media()?),
            "video" => BlockKind::Video(media()?),
            "file" => BlockKind::File(media()?),
            "pdf" => BlockKind::Pdf(media()?),
            "bookmark" => BlockKind::Bookmark(media()?),
            "embed" => BlockKind::Embed(media()?),
            "table" => BlockKind::Table(Table {
                width: body
                    .get("table_width")
                    .and_then(Value::as_u64)
                    .unwrap_or(1) as usize,
                has_column_header: bool_field(body, "has_column_header"),
                has_row_header: bool_field(body, "has_row_header"),
            }),
            "table_row" => {
                let cells = match body.get("cells") {
                    Some(Value::Array(cells)) => cells
                        .iter()
                        .map(|cell| runs_from_json(Some(cell)))
                        .collect::<Result<Vec<_>>>()?,
                    _ => Vec::new(),
                };
                BlockKind::TableRow(TableRow { cells })
            }
            "column_list" => BlockKind::ColumnList,
            "column" => BlockKind::Column,
            "synced_block" => BlockKind::SyncedBlock,
            "child_page" => BlockKind::ChildPage(ChildPage {
                title: str_field(body, "title").unwrap_or_default().to_string(),
            }),
            other => BlockKind::Unsupported(other.to_string()),
        };

        let children = match body.get("children") {
            Some(Value::Array(items)) => items
                .iter()
                .map(Block::from_json)
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        Ok(Block {
            id: str_field(value, "id").map(str::to_string),
            kind,
            children,
        })
    }
}

const PROPERTY_KEYS: [&str; 10] = [
    "title",
    "rich_text",
    "number",
    "select",
    "multi_select",
    "date",
    "checkbox",
    "url",
    "email",
    "phone_number",
];

fn option_name(name: &str) -> Value {
    json!({ "name": name })
}

impl PropertyValue {
    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Title(runs) => json!({ "title": runs_to_json(runs) }),
            PropertyValue::RichText(runs) => json!({ "rich_text": runs_to_json(runs) }),
            PropertyValue::Number(n) => json!({ "number": n }),
            PropertyValue::Select(name) => {
                json!({ "select": name.as_deref().map(option_name) })
            }
            PropertyValue::MultiSelect(names) => json!({
                "multi_select": names.iter().map(|n| option_name(n)).collect::<Vec<_>>(),
            }),
            PropertyValue::Date(date) => json!({ "date": date }),
            PropertyValue::Checkbox(checked) => json!({ "checkbox": checked }),
            PropertyValue::Url(url) => json!({ "url": url }),
            PropertyValue::Email(email) => json!({ "email": email }),
            PropertyValue::PhoneNumber(phone) => json!({ "phone_number": phone }),
            PropertyValue::Unsupported(name) => json!({ "type": name }),
        }
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let type_name = str_field(value, "type")
            .or_else(|| {
                PROPERTY_KEYS
                    .iter()
                    .copied()
                    .find(|key| value.get(*key).is_some())
            })
            .ok_or_else(|| invalid("property without a recognisable type"))?;
        let body = value.get(type_name).unwrap_or(&Value::Null);
        let opt_string = || body.as_str().map(str::to_string);

        let property = match type_name {
            "title" => PropertyValue::Title(runs_from_json(Some(body))?),
            "rich_text" => PropertyValue::RichText(runs_from_json(Some(body))?),
            "number" => PropertyValue::Number(body.as_f64()),
            "select" => PropertyValue::Select(str_field(body, "name").map(str::to_string)),
            "multi_select" => PropertyValue::MultiSelect(
                body.as_array()
                    .map(|options| {
                        options
                            .iter()
                            .filter_map(|option| str_field(option, "name"))
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            "date" => PropertyValue::Date(if body.is_null() {
                None
            } else {
                Some(
                    serde_json::from_value::<DateValue>(body.clone())
                        .map_err(|e| invalid(format!("bad date: {e}")))?,
                )
            }),
            "checkbox" => PropertyValue::Checkbox(body.as_bool().unwrap_or(false)),
            "url" => PropertyValue::Url(opt_string()),
            "email" => PropertyValue::Email(opt_string()),
            "phone_number" => PropertyValue::PhoneNumber(opt_string()),
            other => PropertyValue::Unsupported(other.to_string()),
        };
        Ok(property)
    }
}

impl PropertySet {
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
        )
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| invalid("properties must be an object"))?;
        object
            .iter()
            .map(|(name, raw)| Ok((name.clone(), PropertyValue::from_json(raw)?)))
            .collect()
    }
}
