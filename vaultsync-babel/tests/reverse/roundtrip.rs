//! Markup → page → markup.

use crate::common::{forward, reverse};
use serde_json::json;
use vaultsync_babel::target::PropertyType;
use vaultsync_babel::{
    parse_markup, parse_note, Block, MapResolver, NoopResolver, PropertyMapping, TransformOptions,
    Transformer,
};

const CANONICAL: &str = "# Heading

Paragraph with **bold**, *italic* and `code`.

- a
  - b
- c
1. one
2. two

> [!tip] Remember
> Body line

```rust
fn main() {}
```

| A | B |
| --- | --- |
| 1 | 2 |
";

#[test]
fn test_canonical_markup_round_trips() {
    assert_eq!(reverse(&forward(CANONICAL)), CANONICAL);
}

#[test]
fn test_placeholders_are_restored() {
    let source = "```dataview\nTABLE file.mtime FROM \"notes\"\n```\n\n![[diagram.png]]\n";
    assert_eq!(reverse(&forward(source)), source);
}

#[test]
fn test_wire_round_trip_preserves_rendering() {
    let blocks = forward(CANONICAL);
    let decoded: Vec<Block> = blocks
        .iter()
        .map(|block| Block::from_json(&block.to_json()).unwrap())
        .collect();
    assert_eq!(decoded, blocks);
    assert_eq!(reverse(&decoded), CANONICAL);
}

#[test]
fn test_note_round_trip_with_front_matter() {
    let options = TransformOptions {
        mappings: vec![PropertyMapping::new("status", "Status", PropertyType::Select)],
        ..TransformOptions::default()
    };
    let transformer = Transformer::new(options, &NoopResolver);

    let note = parse_note("---\nstatus: Draft\ntags: [idea]\n---\nBody text\n", "Idea");
    let page = transformer.to_target(&note).unwrap();
    let pulled = transformer.to_note(&page).unwrap();

    assert_eq!(pulled.title.as_deref(), Some("Idea"));
    assert_eq!(pulled.tags, vec!["idea"]);
    assert_eq!(pulled.frontmatter.get("status"), Some(&json!("Draft")));
    assert_eq!(pulled.frontmatter.get("tags"), Some(&json!(["idea"])));
    assert_eq!(pulled.body, "Body text\n");

    let markup = pulled.to_markup().unwrap();
    let reparsed = parse_note(&markup, "Idea");
    assert_eq!(reparsed.frontmatter, note.frontmatter);
    assert_eq!(reparsed.tags, note.tags);
}

#[test]
fn test_literal_markup_characters_survive() {
    for source in [
        "a \\*b\\* c\n",
        "\\# not a heading\n",
        "1\\. not a list\n",
        "snake\\_case costs \\$5 \\<b\\>\n",
        "> \\- quoted dash\n",
    ] {
        let blocks = forward(source);
        let markup = reverse(&blocks);
        assert_eq!(markup, source);
        assert_eq!(forward(&markup), blocks);
    }
}

#[test]
fn test_mention_alias_round_trips() {
    let resolver: MapResolver = [("Project Plan", "page-9")].into_iter().collect();
    let transformer = Transformer::new(TransformOptions::default(), &resolver);
    let source = "See [[Project Plan|the plan]] and [[Project Plan]].\n";

    let blocks = transformer.to_blocks(&parse_markup(source)).unwrap();
    assert_eq!(transformer.to_markup(&blocks).unwrap(), source);
}
