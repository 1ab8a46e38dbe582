//! Page sync sequencing against the in-memory client.

use crate::common::{forward, Call, FailOn, MemoryClient};
use serde_json::json;
use vaultsync_babel::sync::{RemoteBlock, SyncStage};
use vaultsync_babel::target::block::ChildPage;
use vaultsync_babel::{
    Block, BlockKind, NoopResolver, PageParent, PageSync, PropertySet, PropertyValue, RichText,
    SyncError, TargetPage, TransformError, TransformOptions, Transformer,
};

fn paragraphs(count: usize) -> Vec<Block> {
    (0..count)
        .map(|index| Block::paragraph(vec![RichText::text(format!("p{index}"))]))
        .collect()
}

fn page(children: Vec<Block>) -> TargetPage {
    let mut properties = PropertySet::new();
    properties.insert("Name", PropertyValue::Title(vec![RichText::text("Doc")]));
    properties.insert("Status", PropertyValue::Select(Some("Open".to_string())));
    TargetPage {
        properties,
        children,
    }
}

fn without_ids(block: &Block) -> Block {
    Block {
        id: None,
        kind: block.kind.clone(),
        children: block.children.iter().map(without_ids).collect(),
    }
}

#[test]
fn test_create_batches_children() {
    let mut sync = PageSync::new(MemoryClient::new()).with_batch_size(2);
    let page_id = sync
        .create(&PageParent::Database("db".to_string()), &page(paragraphs(5)))
        .unwrap();

    let client = sync.into_client();
    assert_eq!(
        client.calls,
        vec![
            Call::Create { blocks: 2 },
            Call::Append {
                parent: page_id.clone(),
                blocks: 2
            },
            Call::Append {
                parent: page_id.clone(),
                blocks: 1
            },
        ]
    );
    assert_eq!(client.tree(&page_id).len(), 5);
    assert_eq!(client.properties[&page_id].len(), 2);
}

#[test]
fn test_create_under_page_keeps_only_title() {
    let mut sync = PageSync::new(MemoryClient::new());
    let page_id = sync
        .create(&PageParent::Page("parent".to_string()), &page(paragraphs(1)))
        .unwrap();
    let properties = &sync.client().properties[&page_id];
    assert_eq!(properties.len(), 1);
    assert!(properties.contains("title"));
}

#[test]
fn test_create_failure_is_client_error() {
    let mut sync = PageSync::new(MemoryClient::failing(FailOn::Create));
    let result = sync.create(&PageParent::Database("db".to_string()), &page(paragraphs(1)));
    assert!(matches!(result, Err(SyncError::Client(_))));
}

#[test]
fn test_append_failure_reports_progress() {
    let mut sync = PageSync::new(MemoryClient::failing(FailOn::Append(1))).with_batch_size(2);
    let result = sync.create(&PageParent::Database("db".to_string()), &page(paragraphs(7)));
    match result {
        Err(SyncError::Partial {
            stage, completed, ..
        }) => {
            assert_eq!(stage, SyncStage::AppendChildren);
            assert_eq!(completed, 4);
        }
        other => panic!("expected partial failure, got {other:?}"),
    }
}

#[test]
fn test_replace_orders_operations() {
    let mut client = MemoryClient::new();
    client.seed("page-1", paragraphs(3));
    let mut sync = PageSync::new(client);

    sync.replace("page-1", &page(paragraphs(2))).unwrap();

    let client = sync.into_client();
    let first_delete = client
        .calls
        .iter()
        .position(|call| matches!(call, Call::Delete(_)))
        .unwrap();
    let first_append = client
        .calls
        .iter()
        .position(|call| matches!(call, Call::Append { .. }))
        .unwrap();
    let last_delete = client
        .calls
        .iter()
        .rposition(|call| matches!(call, Call::Delete(_)))
        .unwrap();

    assert_eq!(client.calls[0], Call::UpdateProperties);
    assert!(first_delete < first_append);
    assert!(last_delete < first_append);
    assert_eq!(
        client
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Delete(_)))
            .count(),
        3
    );

    let texts: Vec<String> = client
        .tree("page-1")
        .iter()
        .map(|block| crate::common::text_of(block))
        .collect();
    assert_eq!(texts, vec!["p0", "p1"]);
}

#[test]
fn test_replace_delete_failure() {
    let mut client = MemoryClient::failing(FailOn::Delete(1));
    client.seed("page-1", paragraphs(3));
    let mut sync = PageSync::new(client);

    let result = sync.replace("page-1", &page(paragraphs(1)));
    assert!(matches!(
        result,
        Err(SyncError::Partial {
            stage: SyncStage::DeleteChildren,
            completed: 1,
            ..
        })
    ));
    assert!(!sync
        .client()
        .calls
        .iter()
        .any(|call| matches!(call, Call::Append { .. })));
}

#[test]
fn test_pull_follows_pagination_and_nesting() {
    let blocks = forward("- one\n  - nested\n- two\n- three\n\nclosing\n");
    let mut client = MemoryClient::new();
    client.seed("page-1", blocks.clone());
    let mut sync = PageSync::new(client);

    let pulled = sync.pull("page-1").unwrap();
    let pulled: Vec<Block> = pulled.iter().map(without_ids).collect();
    assert_eq!(pulled, blocks);

    let listed_with_cursor = sync
        .client()
        .calls
        .iter()
        .any(|call| matches!(call, Call::List { cursor: Some(_), .. }));
    assert!(listed_with_cursor);
}

#[test]
fn test_pull_skips_sub_pages_and_unknown_kinds() {
    let mut client = MemoryClient::new();
    client.seed(
        "page-1",
        vec![
            Block::with_children(
                BlockKind::ChildPage(ChildPage {
                    title: "Sub".to_string(),
                }),
                paragraphs(2),
            ),
            Block::with_children(BlockKind::Unsupported("tab".to_string()), paragraphs(1)),
            Block::paragraph(vec![RichText::text("after")]),
        ],
    );
    let mut sync = PageSync::new(client);

    let pulled = sync.pull("page-1").unwrap();
    assert!(pulled.iter().all(|block| block.children.is_empty()));

    let nested_ids: Vec<&str> = pulled[..2]
        .iter()
        .filter_map(|block| block.id.as_deref())
        .collect();
    let listed_nested = sync.client().calls.iter().any(|call| {
        matches!(call, Call::List { parent, .. } if nested_ids.contains(&parent.as_str()))
    });
    assert!(!listed_nested);

    let markup = Transformer::new(TransformOptions::default(), &NoopResolver)
        .to_markup(&pulled)
        .unwrap();
    assert_eq!(
        markup,
        "[[Sub]]\n\n<!-- unsupported block: tab -->\n\nafter\n"
    );
}

#[test]
fn test_pull_depth_follows_options() {
    let mut client = MemoryClient::new();
    client.seed("page-1", forward("- a\n  - b\n    - c\n"));
    let options = TransformOptions {
        max_depth: 1,
        ..TransformOptions::default()
    };
    let mut sync = PageSync::new(client).with_options(&options);
    assert_eq!(sync.max_depth(), 1);

    let result = sync.pull("page-1");
    assert!(matches!(
        result,
        Err(SyncError::Transform(TransformError::DepthExceeded { limit: 1 }))
    ));

    let mut sync = sync.with_options(&TransformOptions::default());
    assert_eq!(sync.pull("page-1").unwrap().len(), 1);
}

#[test]
fn test_invalid_tree_is_rejected_before_any_call() {
    let invalid = Block::with_children(
        vaultsync_babel::BlockKind::Divider,
        vec![Block::paragraph(vec![])],
    );
    let mut sync = PageSync::new(MemoryClient::new());
    let result = sync.create(&PageParent::Database("db".to_string()), &page(vec![invalid]));
    assert!(matches!(
        result,
        Err(SyncError::Transform(TransformError::ChildrenNotAllowed { .. }))
    ));
    assert!(sync.client().calls.is_empty());
}

#[test]
fn test_remote_block_decoding() {
    let value = json!({
        "object": "block",
        "id": "b-1",
        "has_children": true,
        "type": "toggle",
        "toggle": { "rich_text": [], "color": "default" }
    });
    let remote = RemoteBlock::from_json(&value).unwrap();
    assert!(remote.has_children);
    assert_eq!(remote.block.id.as_deref(), Some("b-1"));
}
