//! Rendering module for turning compositions into HTML and JSON.

mod html;
mod json;
mod layout;
mod options;
mod result;
pub mod visitor;

pub use html::{render, render_document, HtmlRenderer};
pub use json::{to_json, JsonFormat};
pub use layout::{
    inspect_layout, FileLayout, LayoutReport, LayoutSource, Placeholder, StaticLayout,
    DEFAULT_LAYOUT,
};
pub use options::RenderOptions;
pub use result::{RenderStats, RenderedDocument};
pub use visitor::{
    BlockVisitor, CompositeVisitor, DefaultVisitor, SkipEmptyTextVisitor, SkipImagesVisitor,
    VisitorAction,
};
