//! Composition-level types and editing operations.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{Block, BlockKind, StyleConfig, StyleField};
use crate::error::{Error, Result};

const SEED_TITLE: &str = "Email has never been easier";
const SEED_CONTENT: &str =
    "Create beautiful and sophisticated emails in minutes. No code required, and minimal setup.";

/// An email template: ordered blocks plus a shared style.
///
/// Structural operations keep `order` equal to list position, so after any
/// `move_block`, `push_block` or `remove_block` the order values are exactly
/// `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawComposition")]
pub struct Composition {
    /// Blocks in list (editor) order
    blocks: Vec<Block>,

    /// Style applied to every block
    pub style: StyleConfig,
}

/// Persisted shape before order normalization.
#[derive(Deserialize)]
struct RawComposition {
    #[serde(alias = "sections")]
    blocks: Vec<Block>,

    #[serde(default, alias = "styles")]
    style: StyleConfig,
}

impl From<RawComposition> for Composition {
    fn from(raw: RawComposition) -> Self {
        Composition::from_parts(raw.blocks, raw.style)
    }
}

/// Direction of a single-step block move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

impl Composition {
    /// Create an empty composition with the default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the three-block starter composition (title, content, empty image).
    pub fn create_default() -> Self {
        Self {
            blocks: vec![
                Block::title(1, SEED_TITLE, 0),
                Block::content(2, SEED_CONTENT, 1),
                Block::image(3, None, 2),
            ],
            style: StyleConfig::default(),
        }
    }

    /// Build a composition from decoded parts, normalizing block order.
    pub fn from_parts(blocks: Vec<Block>, style: StyleConfig) -> Self {
        let mut composition = Self { blocks, style };
        composition.normalize_order();
        composition
    }

    /// Blocks in list order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the composition has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get a block by id.
    pub fn block(&self, id: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Get a mutable block by id.
    ///
    /// Only content is meant to be edited through this handle; changing
    /// `order` here bypasses renumbering.
    pub fn block_mut(&mut self, id: u32) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    /// Blocks sorted by `order` ascending. Ties keep list position.
    pub fn sorted_blocks(&self) -> Vec<&Block> {
        let mut sorted: Vec<&Block> = self.blocks.iter().collect();
        sorted.sort_by_key(|b| b.order);
        sorted
    }

    /// Replace the content of the block with the given id.
    pub fn set_block_content(&mut self, id: u32, content: Option<String>) -> Result<()> {
        let block = self.block_mut(id).ok_or(Error::BlockNotFound(id))?;
        block.content = content;
        Ok(())
    }

    /// Set one named style field.
    ///
    /// Unknown names fail with [`Error::InvalidField`] and leave the style untouched.
    pub fn set_style(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        let field = StyleField::from_str(field)?;
        self.style.set(field, value);
        Ok(())
    }

    /// Swap the block at render position `index` with its neighbour in `direction`.
    ///
    /// Order values that have drifted from list position are normalized
    /// first. Returns `false` when the move would leave the list; that is a
    /// valid outcome, not an error.
    pub fn move_block(&mut self, index: usize, direction: Direction) -> bool {
        if !self.is_normalized() {
            self.normalize_order();
        }

        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        };
        let target = match target {
            Some(t) if index < self.blocks.len() && t < self.blocks.len() => t,
            _ => {
                debug!("move_block: {} {:?} is out of bounds, ignoring", index, direction);
                return false;
            }
        };

        self.blocks.swap(index, target);
        self.renumber();
        true
    }

    /// Append a new block and return its id.
    pub fn push_block(&mut self, kind: BlockKind, content: Option<String>) -> u32 {
        let id = self.next_id();
        let order = self.blocks.len() as u32;
        self.blocks.push(Block::new(id, kind, content, order));
        self.renumber();
        id
    }

    /// Remove the block with the given id.
    pub fn remove_block(&mut self, id: u32) -> Result<Block> {
        let index = self
            .blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or(Error::BlockNotFound(id))?;
        let removed = self.blocks.remove(index);
        self.renumber();
        Ok(removed)
    }

    /// Point every image block at `reference`. Returns how many were updated.
    pub fn set_image(&mut self, reference: impl Into<String>) -> usize {
        let reference = reference.into();
        let mut updated = 0;
        for block in self.blocks.iter_mut().filter(|b| b.kind == BlockKind::Image) {
            block.content = Some(reference.clone());
            updated += 1;
        }
        updated
    }

    /// Sort blocks by `order` (stable) and renumber them `0..len`.
    pub fn normalize_order(&mut self) {
        self.blocks.sort_by_key(|b| b.order);
        self.renumber();
    }

    /// Check that `order` matches list position.
    pub fn is_normalized(&self) -> bool {
        self.blocks
            .iter()
            .enumerate()
            .all(|(idx, block)| block.order as usize == idx)
    }

    /// One past the highest id, or the lowest unused id once that would overflow.
    fn next_id(&self) -> u32 {
        match self.blocks.iter().map(|b| b.id).max() {
            None => 1,
            Some(max) => max.checked_add(1).unwrap_or_else(|| self.first_free_id()),
        }
    }

    fn first_free_id(&self) -> u32 {
        let used: HashSet<u32> = self.blocks.iter().map(|b| b.id).collect();
        (1..u32::MAX).find(|id| !used.contains(id)).unwrap_or_default()
    }

    fn renumber(&mut self) {
        for (idx, block) in self.blocks.iter_mut().enumerate() {
            block.order = idx as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders(c: &Composition) -> Vec<u32> {
        c.blocks().iter().map(|b| b.order).collect()
    }

    fn ids(c: &Composition) -> Vec<u32> {
        c.blocks().iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_create_default() {
        let c = Composition::create_default();
        assert_eq!(c.len(), 3);
        assert_eq!(ids(&c), vec![1, 2, 3]);
        assert_eq!(orders(&c), vec![0, 1, 2]);
        assert_eq!(c.blocks()[0].kind, BlockKind::Title);
        assert_eq!(c.blocks()[1].kind, BlockKind::Content);
        assert_eq!(c.blocks()[2].kind, BlockKind::Image);
        assert!(c.blocks()[2].content.is_none());
    }

    #[test]
    fn test_set_block_content() {
        let mut c = Composition::create_default();
        c.set_block_content(1, Some("Welcome".into())).unwrap();
        let block = c.block(1).unwrap();
        assert_eq!(block.text(), "Welcome");
        assert_eq!(block.order, 0);
        assert_eq!(block.kind, BlockKind::Title);
    }

    #[test]
    fn test_set_block_content_missing_id() {
        let mut c = Composition::create_default();
        let before = c.clone();
        let err = c.set_block_content(42, Some("x".into())).unwrap_err();
        assert!(matches!(err, Error::BlockNotFound(42)));
        assert_eq!(c, before);
    }

    #[test]
    fn test_set_style() {
        let mut c = Composition::create_default();
        c.set_style("alignment", "text-right").unwrap();
        c.set_style("backgroundColor", "#fafafa").unwrap();
        assert_eq!(c.style.alignment, "text-right");
        assert_eq!(c.style.background_color.as_deref(), Some("#fafafa"));
    }

    #[test]
    fn test_set_style_unknown_field() {
        let mut c = Composition::create_default();
        let before = c.style.clone();
        let err = c.set_style("fontFamily", "serif").unwrap_err();
        assert!(matches!(err, Error::InvalidField(_)));
        assert_eq!(c.style, before);
    }

    #[test]
    fn test_move_block_down_and_up() {
        let mut c = Composition::create_default();
        assert!(c.move_block(0, Direction::Down));
        assert_eq!(ids(&c), vec![2, 1, 3]);
        assert_eq!(orders(&c), vec![0, 1, 2]);

        assert!(c.move_block(2, Direction::Up));
        assert_eq!(ids(&c), vec![2, 3, 1]);
        assert_eq!(orders(&c), vec![0, 1, 2]);
    }

    #[test]
    fn test_move_block_boundaries_are_noops() {
        let mut c = Composition::create_default();
        let before = c.clone();

        assert!(!c.move_block(0, Direction::Up));
        assert!(!c.move_block(2, Direction::Down));
        assert!(!c.move_block(17, Direction::Up));
        assert_eq!(c, before);

        let mut empty = Composition::new();
        assert!(!empty.move_block(0, Direction::Down));
    }

    #[test]
    fn test_order_invariant_after_move_sequence() {
        let mut c = Composition::create_default();
        c.push_block(BlockKind::Content, Some("<p>more</p>".into()));
        c.push_block(BlockKind::Title, Some("Footer".into()));

        let moves = [
            (0, Direction::Down),
            (4, Direction::Up),
            (3, Direction::Down),
            (1, Direction::Up),
            (0, Direction::Up),
            (2, Direction::Down),
            (4, Direction::Down),
        ];
        for (index, direction) in moves {
            c.move_block(index, direction);
            let mut seen = orders(&c);
            seen.sort();
            assert_eq!(seen, (0..c.len() as u32).collect::<Vec<_>>());
            assert!(c.is_normalized());
        }
    }

    #[test]
    fn test_sorted_blocks_is_stable() {
        let c = Composition {
            blocks: vec![
                Block::title(10, "b", 1),
                Block::title(11, "a", 0),
                Block::title(12, "c", 1),
            ],
            style: StyleConfig::default(),
        };
        let sorted: Vec<u32> = c.sorted_blocks().iter().map(|b| b.id).collect();
        assert_eq!(sorted, vec![11, 10, 12]);
    }

    #[test]
    fn test_push_and_remove_renumber() {
        let mut c = Composition::create_default();
        let id = c.push_block(BlockKind::Image, Some("/images/a.png".into()));
        assert_eq!(id, 4);
        assert_eq!(orders(&c), vec![0, 1, 2, 3]);

        let removed = c.remove_block(2).unwrap();
        assert_eq!(removed.kind, BlockKind::Content);
        assert_eq!(ids(&c), vec![1, 3, 4]);
        assert_eq!(orders(&c), vec![0, 1, 2]);

        assert!(matches!(c.remove_block(2), Err(Error::BlockNotFound(2))));
    }

    #[test]
    fn test_push_into_empty_starts_at_one() {
        let mut c = Composition::new();
        assert_eq!(c.push_block(BlockKind::Title, None), 1);
        assert_eq!(c.blocks()[0].order, 0);
    }

    #[test]
    fn test_set_image() {
        let mut c = Composition::create_default();
        assert_eq!(c.set_image("/images/hero.png"), 1);
        assert_eq!(c.block(3).unwrap().text(), "/images/hero.png");
    }

    #[test]
    fn test_from_parts_normalizes() {
        let c = Composition::from_parts(
            vec![
                Block::title(1, "a", 5),
                Block::content(2, "b", 2),
                Block::image(3, None, 9),
            ],
            StyleConfig::default(),
        );
        assert_eq!(ids(&c), vec![2, 1, 3]);
        assert_eq!(orders(&c), vec![0, 1, 2]);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("DOWN".parse::<Direction>().unwrap(), Direction::Down);
        assert!("left".parse::<Direction>().is_err());
    }

    #[test]
    fn test_move_block_uses_render_position() {
        let mut c = Composition {
            blocks: vec![
                Block::title(1, "a", 2),
                Block::content(2, "b", 0),
                Block::content(3, "c", 1),
            ],
            style: StyleConfig::default(),
        };
        let rendered = |c: &Composition| -> Vec<u32> {
            c.sorted_blocks().iter().map(|b| b.id).collect()
        };
        assert_eq!(rendered(&c), vec![2, 3, 1]);

        assert!(c.move_block(0, Direction::Down));
        assert_eq!(rendered(&c), vec![3, 2, 1]);
        assert_eq!(ids(&c), vec![3, 2, 1]);
        assert!(c.is_normalized());
    }

    #[test]
    fn test_move_block_after_order_edit() {
        let mut c = Composition::create_default();
        c.block_mut(1).unwrap().order = 7;
        assert!(!c.move_block(2, Direction::Down));
        assert_eq!(ids(&c), vec![2, 3, 1]);
        assert_eq!(orders(&c), vec![0, 1, 2]);
    }

    #[test]
    fn test_push_after_max_id() {
        let mut c = Composition::from_parts(
            vec![Block::title(u32::MAX, "last", 0), Block::title(1, "first", 1)],
            StyleConfig::default(),
        );
        let id = c.push_block(BlockKind::Title, None);
        assert_eq!(id, 2);
        assert_eq!(ids(&c), vec![u32::MAX, 1, 2]);
        assert_eq!(orders(&c), vec![0, 1, 2]);
    }

    #[test]
    fn test_deserialize_normalizes_order() {
        let json = r#"{"blocks": [
            {"id": 1, "type": "title", "content": "a", "order": 2},
            {"id": 2, "type": "content", "content": "b", "order": 0},
            {"id": 3, "type": "content", "content": "c", "order": 1}
        ]}"#;
        let c: Composition = serde_json::from_str(json).unwrap();
        assert!(c.is_normalized());
        assert_eq!(ids(&c), vec![2, 3, 1]);
    }

    #[test]
    fn test_deserialize_legacy_keys() {
        let json = r#"{
            "sections": [{"id": 1, "type": "title", "content": "Hi", "order": 0}],
            "styles": {"alignment": "text-center"}
        }"#;
        let c: Composition = serde_json::from_str(json).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.style.alignment, "text-center");
    }
}
