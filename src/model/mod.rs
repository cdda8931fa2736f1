//! Composition model types.
//!
//! This module defines the in-memory representation of an email template:
//! an ordered list of typed blocks plus a style configuration. It has no
//! dependencies on rendering or storage.

mod block;
mod composition;
mod style;

pub use block::{Block, BlockKind};
pub use composition::{Composition, Direction};
pub use style::{Alignment, SizeLevel, StyleConfig, StyleField};
