//! Shared fixtures: transform helpers and an in-memory page service.

#![allow(dead_code)]

use std::collections::HashMap;
use vaultsync_babel::sync::{ChildrenPage, ClientError, PageClient, PageParent, RemoteBlock};
use vaultsync_babel::target::rich_text::plain_text;
use vaultsync_babel::{
    parse_markup, Block, BlockKind, CrossRefResolver, NoopResolver, PropertySet,
    TransformOptions, Transformer,
};

/// Forward-map a markup body with default options and no resolvable links.
pub fn forward(source: &str) -> Vec<Block> {
    forward_with(source, &NoopResolver, TransformOptions::default())
}

pub fn forward_with(
    source: &str,
    resolver: &dyn CrossRefResolver,
    options: TransformOptions,
) -> Vec<Block> {
    Transformer::new(options, resolver)
        .to_blocks(&parse_markup(source))
        .expect("forward mapping failed")
}

/// Reverse-map blocks with default options and no resolvable ids.
pub fn reverse(blocks: &[Block]) -> String {
    Transformer::new(TransformOptions::default(), &NoopResolver)
        .to_markup(blocks)
        .expect("reverse mapping failed")
}

/// Plain text of a block's own rich text, empty for kinds without any.
pub fn text_of(block: &Block) -> String {
    match &block.kind {
        BlockKind::Paragraph(text)
        | BlockKind::Heading1(text)
        | BlockKind::Heading2(text)
        | BlockKind::Heading3(text)
        | BlockKind::BulletedListItem(text)
        | BlockKind::NumberedListItem(text)
        | BlockKind::Toggle(text)
        | BlockKind::Quote(text) => plain_text(&text.rich_text),
        BlockKind::ToDo(todo) => plain_text(&todo.rich_text),
        BlockKind::Callout(callout) => plain_text(&callout.rich_text),
        BlockKind::Code(code) => plain_text(&code.rich_text),
        BlockKind::Equation(equation) => equation.expression.clone(),
        _ => String::new(),
    }
}

/// Remote calls recorded by [`MemoryClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { blocks: usize },
    UpdateProperties,
    Append { parent: String, blocks: usize },
    Delete(String),
    List { parent: String, cursor: Option<String> },
}

/// Which call kinds fail, and after how many successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Create,
    UpdateProperties,
    Append(usize),
    Delete(usize),
    List,
}

/// A page service held in memory.
///
/// Blocks are stored flat by parent id, the way the service lists them:
/// children are stripped and reported through `has_children`.
#[derive(Default)]
pub struct MemoryClient {
    pub calls: Vec<Call>,
    pub properties: HashMap<String, PropertySet>,
    children: HashMap<String, Vec<Block>>,
    next_id: usize,
    page_size: usize,
    fail_on: Option<FailOn>,
    appends: usize,
    deletes: usize,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self {
            page_size: 2,
            ..Self::default()
        }
    }

    pub fn failing(fail_on: FailOn) -> Self {
        Self {
            fail_on: Some(fail_on),
            ..Self::new()
        }
    }

    /// Seed a page with existing content.
    pub fn seed(&mut self, page_id: &str, blocks: Vec<Block>) {
        self.properties.entry(page_id.to_string()).or_default();
        self.store(page_id, &blocks);
    }

    /// Top-level blocks of a page or block, children re-attached.
    pub fn tree(&self, parent: &str) -> Vec<Block> {
        self.children
            .get(parent)
            .map(|blocks| {
                blocks
                    .iter()
                    .map(|block| {
                        let mut block = block.clone();
                        if let Some(id) = &block.id {
                            block.children = self.tree(id);
                        }
                        block
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("blk-{}", self.next_id)
    }

    fn store(&mut self, parent: &str, blocks: &[Block]) {
        for block in blocks {
            let id = self.allocate_id();
            let mut stored = block.clone();
            stored.id = Some(id.clone());
            stored.children = Vec::new();
            self.children
                .entry(parent.to_string())
                .or_default()
                .push(stored);
            self.store(&id, &block.children);
        }
    }

    fn fail(&self, what: &str) -> ClientError {
        format!("simulated {what} failure").into()
    }
}

impl PageClient for MemoryClient {
    fn create_page(
        &mut self,
        _parent: &PageParent,
        properties: &PropertySet,
        children: &[Block],
    ) -> Result<String, ClientError> {
        self.calls.push(Call::Create {
            blocks: children.len(),
        });
        if self.fail_on == Some(FailOn::Create) {
            return Err(self.fail("create"));
        }
        let page_id = format!("page-{}", self.properties.len() + 1);
        self.properties.insert(page_id.clone(), properties.clone());
        self.children.entry(page_id.clone()).or_default();
        self.store(&page_id, children);
        Ok(page_id)
    }

    fn update_page_properties(
        &mut self,
        page_id: &str,
        properties: &PropertySet,
    ) -> Result<(), ClientError> {
        self.calls.push(Call::UpdateProperties);
        if self.fail_on == Some(FailOn::UpdateProperties) {
            return Err(self.fail("update"));
        }
        self.properties
            .insert(page_id.to_string(), properties.clone());
        Ok(())
    }

    fn append_children(&mut self, block_id: &str, children: &[Block]) -> Result<(), ClientError> {
        self.calls.push(Call::Append {
            parent: block_id.to_string(),
            blocks: children.len(),
        });
        if self.fail_on == Some(FailOn::Append(self.appends)) {
            return Err(self.fail("append"));
        }
        self.appends += 1;
        self.store(block_id, children);
        Ok(())
    }

    fn delete_block(&mut self, block_id: &str) -> Result<(), ClientError> {
        self.calls.push(Call::Delete(block_id.to_string()));
        if self.fail_on == Some(FailOn::Delete(self.deletes)) {
            return Err(self.fail("delete"));
        }
        self.deletes += 1;
        for siblings in self.children.values_mut() {
            siblings.retain(|block| block.id.as_deref() != Some(block_id));
        }
        Ok(())
    }

    fn list_children(
        &mut self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, ClientError> {
        self.calls.push(Call::List {
            parent: block_id.to_string(),
            cursor: cursor.map(str::to_string),
        });
        if self.fail_on == Some(FailOn::List) {
            return Err(self.fail("list"));
        }

        let all = self.children.get(block_id).cloned().unwrap_or_default();
        let start: usize = match cursor {
            Some(cursor) => cursor.parse()?,
            None => 0,
        };
        let end = (start + self.page_size).min(all.len());
        let results = all[start..end]
            .iter()
            .map(|block| RemoteBlock {
                has_children: block
                    .id
                    .as_ref()
                    .and_then(|id| self.children.get(id))
                    .is_some_and(|children| !children.is_empty()),
                block: block.clone(),
            })
            .collect();

        Ok(ChildrenPage {
            results,
            next_cursor: (end < all.len()).then(|| end.to_string()),
        })
    }
}
