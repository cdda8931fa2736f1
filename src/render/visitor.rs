//! Visitor pattern for customizing block rendering.
//!
//! A visitor is consulted once per block, in render order, before the
//! built-in fragment is produced. It can keep the built-in fragment,
//! replace it, or drop the block.
//!
//! # Example
//!
//! ```
//! use blockmail::model::Block;
//! use blockmail::render::visitor::{BlockVisitor, VisitorAction};
//!
//! struct BannerTitles;
//!
//! impl BlockVisitor for BannerTitles {
//!     fn visit_title(&mut self, block: &Block) -> VisitorAction {
//!         VisitorAction::Replace(format!("<h1 class=\"banner\">{}</h1>", block.text()))
//!     }
//! }
//! ```

use crate::model::{Block, BlockKind};

/// Action returned by visitor methods to control rendering behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VisitorAction {
    /// Continue with default rendering.
    #[default]
    Continue,

    /// Replace the fragment with custom output.
    Replace(String),

    /// Render this block as an empty fragment.
    Skip,
}

/// Trait for visiting blocks during rendering.
///
/// All methods return `VisitorAction::Continue` by default.
pub trait BlockVisitor: Send + Sync {
    /// Called before rendering a title block.
    fn visit_title(&mut self, block: &Block) -> VisitorAction {
        let _ = block;
        VisitorAction::Continue
    }

    /// Called before rendering a rich-text block.
    fn visit_content(&mut self, block: &Block) -> VisitorAction {
        let _ = block;
        VisitorAction::Continue
    }

    /// Called before rendering an image block, including ones without a reference.
    fn visit_image(&mut self, block: &Block) -> VisitorAction {
        let _ = block;
        VisitorAction::Continue
    }

    /// Dispatch on the block kind.
    fn visit_block(&mut self, block: &Block) -> VisitorAction {
        match block.kind {
            BlockKind::Title => self.visit_title(block),
            BlockKind::Content => self.visit_content(block),
            BlockKind::Image => self.visit_image(block),
        }
    }
}

/// Default visitor that performs no customization.
#[derive(Debug, Clone, Default)]
pub struct DefaultVisitor;

impl DefaultVisitor {
    /// Create a new default visitor.
    pub fn new() -> Self {
        Self
    }
}

impl BlockVisitor for DefaultVisitor {}

/// Visitor that drops all image blocks (plain-text previews).
#[derive(Debug, Clone, Default)]
pub struct SkipImagesVisitor;

impl BlockVisitor for SkipImagesVisitor {
    fn visit_image(&mut self, _block: &Block) -> VisitorAction {
        VisitorAction::Skip
    }
}

/// Visitor that drops title and content blocks whose text is empty.
#[derive(Debug, Clone, Default)]
pub struct SkipEmptyTextVisitor;

impl BlockVisitor for SkipEmptyTextVisitor {
    fn visit_title(&mut self, block: &Block) -> VisitorAction {
        skip_if_blank(block)
    }

    fn visit_content(&mut self, block: &Block) -> VisitorAction {
        skip_if_blank(block)
    }
}

fn skip_if_blank(block: &Block) -> VisitorAction {
    if block.text().trim().is_empty() {
        VisitorAction::Skip
    } else {
        VisitorAction::Continue
    }
}

/// Composite visitor that chains multiple visitors.
///
/// Visitors are called in order. The first visitor that returns
/// a non-Continue action determines the result.
pub struct CompositeVisitor {
    visitors: Vec<Box<dyn BlockVisitor>>,
}

impl CompositeVisitor {
    /// Create a new composite visitor.
    pub fn new() -> Self {
        Self {
            visitors: Vec::new(),
        }
    }

    /// Add a visitor to the chain.
    pub fn with_visitor<V: BlockVisitor + 'static>(mut self, visitor: V) -> Self {
        self.visitors.push(Box::new(visitor));
        self
    }
}

impl Default for CompositeVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockVisitor for CompositeVisitor {
    fn visit_block(&mut self, block: &Block) -> VisitorAction {
        for visitor in &mut self.visitors {
            let action = visitor.visit_block(block);
            if !matches!(action, VisitorAction::Continue) {
                return action;
            }
        }
        VisitorAction::Continue
    }
}
