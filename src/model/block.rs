//! Block-level types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of content a block carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Plain-text heading
    Title,
    /// Rich-text fragment (trusted HTML)
    Content,
    /// Uploaded asset reference
    Image,
}

impl BlockKind {
    /// All kinds, in seed order.
    pub const ALL: [BlockKind; 3] = [BlockKind::Title, BlockKind::Content, BlockKind::Image];

    /// Get the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Title => "title",
            BlockKind::Content => "content",
            BlockKind::Image => "image",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(BlockKind::Title),
            "content" => Ok(BlockKind::Content),
            "image" => Ok(BlockKind::Image),
            other => Err(format!("unknown block kind: {}", other)),
        }
    }
}

/// A single content unit of a composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Identifier, unique within the composition and stable across reorders
    pub id: u32,

    /// Block kind
    #[serde(rename = "type", alias = "kind")]
    pub kind: BlockKind,

    /// Text, HTML fragment, or asset reference depending on `kind`
    #[serde(default)]
    pub content: Option<String>,

    /// Position in render order
    #[serde(default)]
    pub order: u32,
}

impl Block {
    /// Create a new block.
    pub fn new(id: u32, kind: BlockKind, content: Option<String>, order: u32) -> Self {
        Self {
            id,
            kind,
            content,
            order,
        }
    }

    /// Create a title block.
    pub fn title(id: u32, text: impl Into<String>, order: u32) -> Self {
        Self::new(id, BlockKind::Title, Some(text.into()), order)
    }

    /// Create a rich-text block.
    pub fn content(id: u32, html: impl Into<String>, order: u32) -> Self {
        Self::new(id, BlockKind::Content, Some(html.into()), order)
    }

    /// Create an image block, optionally pointing at an uploaded asset.
    pub fn image(id: u32, reference: Option<String>, order: u32) -> Self {
        Self::new(id, BlockKind::Image, reference, order)
    }

    /// Content as a string slice, empty when absent.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Check if the block carries any content.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }
}
