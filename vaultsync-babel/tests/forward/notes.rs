//! Whole-note forward conversion: properties and body together.

use serde_json::json;
use vaultsync_babel::target::{DateValue, PropertyType};
use vaultsync_babel::{
    parse_note, BlockKind, NoopResolver, PropertyMapping, PropertyValue, TransformOptions,
    Transformer,
};

const NOTE: &str = "---
status: In Progress
due: 2024-05-01
priority: \"2\"
tags: [work, planning]
---
# Roadmap

Next steps for #q3 are below.

- [ ] draft
- [x] review
";

fn options() -> TransformOptions {
    TransformOptions {
        mappings: vec![
            PropertyMapping::new("status", "Status", PropertyType::Select),
            PropertyMapping::new("due", "Due", PropertyType::Date),
            PropertyMapping::new("priority", "Priority", PropertyType::Number),
        ],
        ..TransformOptions::default()
    }
}

#[test]
fn test_note_to_page() {
    let note = parse_note(NOTE, "Roadmap");
    assert_eq!(note.tags, vec!["work", "planning", "q3"]);

    let page = Transformer::new(options(), &NoopResolver)
        .to_target(&note)
        .unwrap();

    let properties = &page.properties;
    assert_eq!(
        properties.get("Status"),
        Some(&PropertyValue::Select(Some("In Progress".to_string())))
    );
    assert_eq!(
        properties.get("Due"),
        Some(&PropertyValue::Date(Some(DateValue {
            start: "2024-05-01".to_string(),
            end: None,
        })))
    );
    assert_eq!(properties.get("Priority"), Some(&PropertyValue::Number(Some(2.0))));
    assert_eq!(
        properties.get("Tags"),
        Some(&PropertyValue::MultiSelect(vec![
            "work".to_string(),
            "planning".to_string(),
            "q3".to_string()
        ]))
    );
    assert_eq!(
        properties.get("Name").and_then(PropertyValue::as_plain_text),
        Some("Roadmap".to_string())
    );

    assert_eq!(page.children.len(), 4);
    assert!(matches!(page.children[0].kind, BlockKind::Heading1(_)));
    assert!(matches!(page.children[2].kind, BlockKind::ToDo(_)));
}

#[test]
fn test_unmapped_fields_are_not_sent() {
    let note = parse_note("---\nmood: sunny\n---\nBody\n", "Diary");
    let page = Transformer::new(TransformOptions::default(), &NoopResolver)
        .to_target(&note)
        .unwrap();
    assert_eq!(page.properties.len(), 1);
    assert!(page.properties.contains("Name"));
}

#[test]
fn test_page_wire_shape() {
    let note = parse_note("---\nstatus: Done\n---\nHello\n", "Greeting");
    let page = Transformer::new(options(), &NoopResolver)
        .to_target(&note)
        .unwrap();

    let properties = page.properties.to_json();
    assert_eq!(properties["Status"], json!({ "select": { "name": "Done" } }));
    assert_eq!(properties["Name"]["title"][0]["text"]["content"], "Greeting");

    let block = page.children[0].to_json();
    assert_eq!(block["object"], "block");
    assert_eq!(block["type"], "paragraph");
    assert_eq!(block["paragraph"]["rich_text"][0]["text"]["content"], "Hello");
}
