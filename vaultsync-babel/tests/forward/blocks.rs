//! Block-level forward mapping.

use crate::common::{forward, forward_with, text_of};
use vaultsync_babel::forward::blocks::LOCAL_IMAGE_ICON;
use vaultsync_babel::target::block::PLAIN_TEXT_LANGUAGE;
use vaultsync_babel::target::{Color, MAX_RUN_LEN};
use vaultsync_babel::{
    parse_markup, BlockKind, NoopResolver, TransformError, TransformOptions, Transformer,
};

#[test]
fn test_flat_bullet_list() {
    let blocks = forward("- Item 1\n- Item 2\n- Item 3\n");
    assert_eq!(blocks.len(), 3);
    for (index, block) in blocks.iter().enumerate() {
        assert!(matches!(block.kind, BlockKind::BulletedListItem(_)));
        assert_eq!(text_of(block), format!("Item {}", index + 1));
        assert!(block.children.is_empty());
    }
}

#[test]
fn test_nested_list_becomes_children() {
    let blocks = forward("- parent\n  - child\n    - grandchild\n");
    assert_eq!(blocks.len(), 1);
    let child = &blocks[0].children[0];
    assert_eq!(text_of(child), "child");
    assert_eq!(text_of(&child.children[0]), "grandchild");
}

#[test]
fn test_ordered_list_is_numbered() {
    let blocks = forward("1. one\n2. two\n");
    assert!(blocks
        .iter()
        .all(|block| matches!(block.kind, BlockKind::NumberedListItem(_))));
}

#[test]
fn test_task_items_become_todos() {
    let blocks = forward("- [ ] open\n- [x] done\n");
    let states: Vec<(String, bool)> = blocks
        .iter()
        .map(|block| match &block.kind {
            BlockKind::ToDo(todo) => (text_of(block).trim().to_string(), todo.checked),
            other => panic!("expected to_do, got {other:?}"),
        })
        .collect();
    assert_eq!(
        states,
        vec![("open".to_string(), false), ("done".to_string(), true)]
    );
}

#[test]
fn test_heading_levels() {
    let blocks = forward("# One\n\n## Two\n\n### Three\n\n#### Four\n\n##### Five\n\n###### Six\n");
    assert!(matches!(blocks[0].kind, BlockKind::Heading1(_)));
    assert!(matches!(blocks[1].kind, BlockKind::Heading2(_)));
    for block in &blocks[2..] {
        assert!(matches!(block.kind, BlockKind::Heading3(_)));
    }
    assert_eq!(text_of(&blocks[5]), "Six");
}

#[test]
fn test_warning_callout() {
    let blocks = forward("> [!warning] Title\n> Body\n");
    assert_eq!(blocks.len(), 1);
    let BlockKind::Callout(callout) = &blocks[0].kind else {
        panic!("expected callout, got {:?}", blocks[0].kind);
    };

    let icons = TransformOptions::default().callouts;
    assert_eq!(callout.icon, icons.icon_for("caution"));
    assert_eq!(callout.rich_text[0].content, "Title");
    assert!(callout.rich_text[0].annotations.bold);
    assert_eq!(text_of(&blocks[0]), "Title\nBody");
}

#[test]
fn test_callout_without_title_and_unknown_type() {
    let blocks = forward("> [!mystery]\n> Just body\n");
    let BlockKind::Callout(callout) = &blocks[0].kind else {
        panic!("expected callout");
    };
    assert_eq!(callout.icon, TransformOptions::default().callouts.fallback_icon);
    assert_eq!(text_of(&blocks[0]), "Just body");
    assert!(!callout.rich_text[0].annotations.bold);
}

#[test]
fn test_callout_block_children() {
    let blocks = forward("> [!note] Steps\n> Intro\n>\n> - first\n> - second\n");
    assert!(matches!(blocks[0].kind, BlockKind::Callout(_)));
    assert_eq!(blocks[0].children.len(), 2);
    assert!(matches!(
        blocks[0].children[0].kind,
        BlockKind::BulletedListItem(_)
    ));
}

#[test]
fn test_plain_quote() {
    let blocks = forward("> just a quote\n");
    assert!(matches!(blocks[0].kind, BlockKind::Quote(_)));
    assert_eq!(text_of(&blocks[0]), "just a quote");
}

#[test]
fn test_code_block_language_normalised() {
    let blocks = forward("```JS\nconsole.log(1)\n```\n\n```\nplain\n```\n");
    let languages: Vec<&str> = blocks
        .iter()
        .map(|block| match &block.kind {
            BlockKind::Code(code) => code.language.as_str(),
            other => panic!("expected code, got {other:?}"),
        })
        .collect();
    assert_eq!(languages, vec!["javascript", PLAIN_TEXT_LANGUAGE]);
    assert_eq!(text_of(&blocks[0]), "console.log(1)");
}

#[test]
fn test_long_code_is_segmented() {
    let line = "x".repeat(99);
    let content = vec![line; 30].join("\n");
    let source = format!("```rust\n{content}\n```\n");

    let blocks = forward(&source);
    let BlockKind::Code(code) = &blocks[0].kind else {
        panic!("expected code");
    };
    assert!(code.rich_text.len() > 1);
    assert!(code
        .rich_text
        .iter()
        .all(|run| run.content.chars().count() <= MAX_RUN_LEN));
    assert_eq!(text_of(&blocks[0]), content);
}

#[test]
fn test_math_fence_is_equation() {
    let blocks = forward("```math\n  E = mc^2  \n```\n");
    let BlockKind::Equation(equation) = &blocks[0].kind else {
        panic!("expected equation");
    };
    assert_eq!(equation.expression, "E = mc^2");
}

#[test]
fn test_dollar_math_paragraph_is_equation() {
    let blocks = forward("$$\nx^2 + y^2\n$$\n");
    assert_eq!(blocks.len(), 1);
    let BlockKind::Equation(equation) = &blocks[0].kind else {
        panic!("expected equation, got {:?}", blocks[0].kind);
    };
    assert_eq!(equation.expression, "x^2 + y^2");
}

#[test]
fn test_dataview_placeholder() {
    let blocks = forward("```dataview\nLIST FROM \"projects\"\n```\n");
    let BlockKind::Callout(callout) = &blocks[0].kind else {
        panic!("expected callout");
    };
    let options = TransformOptions::default();
    assert_eq!(callout.icon, options.callouts.dataview_icon);
    assert_eq!(callout.color, Color::BlueBackground);
    assert!(callout.rich_text[0].annotations.bold);
    let query = callout.rich_text.last().unwrap();
    assert!(query.annotations.code);
    assert_eq!(query.content, "LIST FROM \"projects\"");
}

#[test]
fn test_table_padding_and_header() {
    let blocks = forward("| a | b | c |\n| - | - | - |\n| 1 | 2 | 3 |\n| 4 |\n");
    let BlockKind::Table(table) = &blocks[0].kind else {
        panic!("expected table");
    };
    assert_eq!(table.width, 3);
    assert!(table.has_column_header);
    assert_eq!(blocks[0].children.len(), 3);
    for row in &blocks[0].children {
        let BlockKind::TableRow(row) = &row.kind else {
            panic!("expected table row");
        };
        assert_eq!(row.cells.len(), 3);
    }
}

#[test]
fn test_divider() {
    let blocks = forward("above\n\n---\n\nbelow\n");
    assert_eq!(blocks.len(), 3);
    assert!(matches!(blocks[1].kind, BlockKind::Divider));
}

#[test]
fn test_remote_image_block() {
    let blocks = forward("![A chart](https://example.com/chart.png)\n");
    let BlockKind::Image(media) = &blocks[0].kind else {
        panic!("expected image, got {:?}", blocks[0].kind);
    };
    assert_eq!(media.url, "https://example.com/chart.png");
    assert_eq!(media.caption[0].content, "A chart");
}

#[test]
fn test_local_images_become_placeholders() {
    for source in ["![scan](attachments/scan.png)\n", "![[diagram.png]]\n"] {
        let blocks = forward(source);
        let BlockKind::Callout(callout) = &blocks[0].kind else {
            panic!("expected placeholder callout for {source:?}");
        };
        assert_eq!(callout.icon, LOCAL_IMAGE_ICON);
        assert!(callout.rich_text.iter().any(|run| run.annotations.code));
    }
}

#[test]
fn test_inline_image_stays_in_paragraph() {
    let blocks = forward("See ![logo](https://example.com/logo.png) here\n");
    assert!(matches!(blocks[0].kind, BlockKind::Paragraph(_)));
    assert_eq!(text_of(&blocks[0]), "See logo here");
}

#[test]
fn test_html_block_is_dropped() {
    let blocks = forward("<details>\n<summary>x</summary>\n</details>\n\ntext\n");
    assert_eq!(blocks.len(), 1);
    assert_eq!(text_of(&blocks[0]), "text");
}

#[test]
fn test_depth_limit_is_hard_failure() {
    let options = TransformOptions {
        max_depth: 1,
        ..TransformOptions::default()
    };
    let document = parse_markup("> outer\n>\n> > inner\n> >\n> > > innermost\n");
    let result = Transformer::new(options, &NoopResolver).to_blocks(&document);
    assert!(matches!(result, Err(TransformError::DepthExceeded { limit: 1 })));
}

#[test]
fn test_depth_within_limit() {
    let options = TransformOptions {
        max_depth: 3,
        ..TransformOptions::default()
    };
    let blocks = forward_with("- a\n  - b\n    - c\n", &NoopResolver, options);
    assert_eq!(blocks[0].children[0].children.len(), 1);
}
