//! Page synchronisation against a remote document service.
//!
//! [`PageClient`] is the seam to whatever HTTP client the caller uses.
//! [`PageSync`] sequences its calls so that properties are written before
//! blocks, old blocks are gone before new ones arrive, and appends respect
//! the service's per-request block limit. Nothing is retried or rolled back:
//! a failure part-way through reports how far the sequence got.

use crate::error::TransformError;
use crate::options::{TransformOptions, DEFAULT_MAX_DEPTH};
use crate::target::{validate_blocks, Block, PropertySet, TargetPage};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Blocks the service accepts per create or append request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Error type returned by client implementations.
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

/// Where a new page is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageParent {
    /// Under another page; only a `title` property is accepted.
    Page(String),
    /// As a database entry; properties must match the database schema.
    Database(String),
}

/// A block read back from the service.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteBlock {
    pub block: Block,
    /// Whether the service holds children for this block that were not
    /// included in the listing.
    pub has_children: bool,
}

impl RemoteBlock {
    /// Decode a listed block object, reading its `has_children` flag.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TransformError> {
        Ok(Self {
            block: Block::from_json(value)?,
            has_children: value
                .get("has_children")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
        })
    }
}

/// One page of a paginated child listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChildrenPage {
    pub results: Vec<RemoteBlock>,
    pub next_cursor: Option<String>,
}

/// Remote operations the sync sequencer needs.
pub trait PageClient {
    /// Create a page with its first batch of children; returns the page id.
    fn create_page(
        &mut self,
        parent: &PageParent,
        properties: &PropertySet,
        children: &[Block],
    ) -> Result<String, ClientError>;

    fn update_page_properties(
        &mut self,
        page_id: &str,
        properties: &PropertySet,
    ) -> Result<(), ClientError>;

    fn append_children(&mut self, block_id: &str, children: &[Block]) -> Result<(), ClientError>;

    fn delete_block(&mut self, block_id: &str) -> Result<(), ClientError>;

    fn list_children(
        &mut self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, ClientError>;
}

/// Step of a sync sequence, reported on partial failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Create,
    UpdateProperties,
    ListChildren,
    DeleteChildren,
    AppendChildren,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::Create => "create page",
            SyncStage::UpdateProperties => "update properties",
            SyncStage::ListChildren => "list children",
            SyncStage::DeleteChildren => "delete children",
            SyncStage::AppendChildren => "append children",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// The first request of a sequence failed; nothing was changed.
    #[error("client request failed: {0}")]
    Client(String),

    /// A later request failed after `completed` items of `stage` succeeded.
    #[error("sync stopped during {stage} after {completed} item(s)")]
    Partial {
        stage: SyncStage,
        completed: usize,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Sequences [`PageClient`] calls for whole-page operations.
pub struct PageSync<C> {
    client: C,
    batch_size: usize,
    max_depth: usize,
}

impl<C: PageClient> PageSync<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            batch_size: DEFAULT_BATCH_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Blocks per request; clamped to at least one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Nesting limit when pulling child blocks.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Pull with the same nesting limit the transformer renders with.
    pub fn with_options(self, options: &TransformOptions) -> Self {
        self.with_max_depth(options.max_depth)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_client(self) -> C {
        self.client
    }

    /// Create a page. The first batch of blocks travels with the page, the
    /// rest is appended in order.
    pub fn create(&mut self, parent: &PageParent, page: &TargetPage) -> Result<String, SyncError> {
        validate_blocks(&page.children)?;
        let properties = match parent {
            PageParent::Page(_) => page.properties.clone().for_page_parent()?,
            PageParent::Database(_) => page.properties.clone(),
        };

        let split = page.children.len().min(self.batch_size);
        let (first, rest) = page.children.split_at(split);
        let page_id = self
            .client
            .create_page(parent, &properties, first)
            .map_err(|e| SyncError::Client(e.to_string()))?;
        info!(page_id = %page_id, blocks = page.children.len(), "page created");

        self.append_batches(&page_id, rest, first.len())?;
        Ok(page_id)
    }

    /// Overwrite a page: properties first, then every existing top-level
    /// block is deleted, then the new blocks are appended.
    pub fn replace(&mut self, page_id: &str, page: &TargetPage) -> Result<(), SyncError> {
        validate_blocks(&page.children)?;
        self.client
            .update_page_properties(page_id, &page.properties)
            .map_err(|e| SyncError::Client(e.to_string()))?;

        let existing = self
            .list_all(page_id)
            .map_err(|source| partial(SyncStage::ListChildren, 0, source))?;

        let mut deleted = 0;
        for remote in &existing {
            let Some(id) = remote.block.id.as_deref() else {
                warn!("listed block without id, cannot delete");
                continue;
            };
            self.client
                .delete_block(id)
                .map_err(|source| partial(SyncStage::DeleteChildren, deleted, source))?;
            deleted += 1;
        }
        debug!(page_id, deleted, "old blocks removed");

        self.append_batches(page_id, &page.children, 0)?;
        info!(page_id, blocks = page.children.len(), "page replaced");
        Ok(())
    }

    /// Fetch the full block tree of a page, descending into blocks whose
    /// children were not included in the listing.
    pub fn pull(&mut self, page_id: &str) -> Result<Vec<Block>, SyncError> {
        let blocks = self.pull_level(page_id, 0)?;
        info!(page_id, blocks = blocks.len(), "page pulled");
        Ok(blocks)
    }

    fn pull_level(&mut self, block_id: &str, depth: usize) -> Result<Vec<Block>, SyncError> {
        if depth > self.max_depth {
            return Err(TransformError::DepthExceeded {
                limit: self.max_depth,
            }
            .into());
        }
        let listed = self
            .list_all(block_id)
            .map_err(|e| SyncError::Client(e.to_string()))?;

        let mut blocks = Vec::with_capacity(listed.len());
        for RemoteBlock {
            mut block,
            has_children,
        } in listed
        {
            if !block.kind.supports_children() {
                // Sub-pages are separate documents; other kinds cannot nest.
                if has_children || !block.children.is_empty() {
                    debug!(kind = block.kind.type_name(), "children not pulled");
                }
                block.children.clear();
            } else if has_children && block.children.is_empty() {
                if let Some(id) = block.id.clone() {
                    block.children = self.pull_level(&id, depth + 1)?;
                }
            }
            blocks.push(block);
        }
        Ok(blocks)
    }

    fn list_all(&mut self, block_id: &str) -> Result<Vec<RemoteBlock>, ClientError> {
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.client.list_children(block_id, cursor.as_deref())?;
            results.extend(page.results);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(results)
    }

    fn append_batches(
        &mut self,
        block_id: &str,
        blocks: &[Block],
        already_sent: usize,
    ) -> Result<(), SyncError> {
        let mut completed = already_sent;
        for batch in blocks.chunks(self.batch_size) {
            self.client
                .append_children(block_id, batch)
                .map_err(|source| partial(SyncStage::AppendChildren, completed, source))?;
            completed += batch.len();
            debug!(block_id, completed, "batch appended");
        }
        Ok(())
    }
}

fn partial(stage: SyncStage, completed: usize, source: ClientError) -> SyncError {
    warn!(%stage, completed, error = %source, "sync sequence interrupted");
    SyncError::Partial {
        stage,
        completed,
        source,
    }
}
