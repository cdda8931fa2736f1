//! Composition parsing module.

mod composition_parser;
mod options;

pub use composition_parser::CompositionParser;
pub use options::{ErrorMode, ParseOptions};
