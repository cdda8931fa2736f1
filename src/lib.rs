//! # blockmail
//!
//! Block-based email composition and deterministic HTML rendering.
//!
//! An email is a [`Composition`]: an ordered list of title, rich-text and
//! image blocks plus one [`StyleConfig`]. Compositions are edited in place,
//! persisted through a [`CompositionStore`], and rendered into an HTML
//! layout containing four placeholder tokens.
//!
//! ## Quick Start
//!
//! ```
//! use blockmail::{render, Composition, Direction};
//!
//! fn main() -> blockmail::Result<()> {
//!     let mut email = Composition::create_default();
//!     email.set_block_content(1, Some("Spring launch".to_string()))?;
//!     email.set_style("alignment", "text-center")?;
//!     email.move_block(2, Direction::Up);
//!
//!     let html = render::render("<body>{{content}}</body>", &email)?;
//!     assert!(html.contains("Spring launch"));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Stable ordering**: block `order` is always `0..n-1` after edits
//! - **Deterministic output**: identical input renders to identical bytes
//! - **Literal substitution**: no template language, no escaping of trusted content
//! - **Pluggable storage**: in-memory and directory-backed stores included

pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{Alignment, Block, BlockKind, Composition, Direction, SizeLevel, StyleConfig, StyleField};
pub use parser::{CompositionParser, ErrorMode, ParseOptions};
pub use render::{
    FileLayout, HtmlRenderer, JsonFormat, LayoutSource, RenderOptions, RenderStats,
    RenderedDocument, StaticLayout, DEFAULT_LAYOUT,
};
pub use store::{CompositionStore, FileStore, MemoryStore, StoredComposition, StoredSummary};

use std::io::Read;
use std::path::Path;

/// Parse a composition JSON file.
///
/// # Example
///
/// ```no_run
/// use blockmail::parse_file;
///
/// let email = parse_file("welcome.json").unwrap();
/// println!("Blocks: {}", email.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Composition> {
    CompositionParser::open(path)?.parse()
}

/// Parse a composition JSON file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<Composition> {
    CompositionParser::open_with_options(path, options)?.parse()
}

/// Parse a composition from a JSON string.
///
/// # Example
///
/// ```
/// use blockmail::parse_str;
///
/// let email = parse_str(r#"{"blocks":[{"id":1,"type":"title","content":"Hi","order":0}]}"#)?;
/// assert_eq!(email.len(), 1);
/// # Ok::<(), blockmail::Error>(())
/// ```
pub fn parse_str(json: &str) -> Result<Composition> {
    CompositionParser::from_bytes(json.as_bytes())?.parse()
}

/// Parse a composition from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Composition> {
    CompositionParser::from_reader(reader)?.parse()
}

/// Render a composition with a layout obtained from `source`.
pub fn render_with_source(source: &dyn LayoutSource, composition: &Composition) -> Result<String> {
    let layout = source.load()?;
    render::render(&layout, composition)
}

/// Parse composition JSON and render it into `layout`.
///
/// Malformed JSON is reported as [`Error::InvalidComposition`].
pub fn render_json(layout: &str, json: &str) -> Result<String> {
    let composition = parse_str(json)?;
    render::render(layout, &composition)
}

/// Builder tying together parsing, storage lookup and rendering.
///
/// # Example
///
/// ```no_run
/// use blockmail::{Blockmail, FileStore};
///
/// let store = FileStore::new("./templates");
/// let doc = Blockmail::new()
///     .with_layout_file("layout.html")
///     .with_asset_base_url("https://cdn.example.com")
///     .load(&store, "welcome")?
///     .render()?;
/// std::fs::write(doc.attachment_name(), doc.html)?;
/// # Ok::<(), blockmail::Error>(())
/// ```
pub struct Blockmail {
    parse_options: ParseOptions,
    render_options: RenderOptions,
    layout: Box<dyn LayoutSource>,
}

impl Blockmail {
    /// Create a new builder using the built-in layout.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
            layout: Box::new(StaticLayout::default()),
        }
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Reject layouts unless each placeholder appears exactly once.
    pub fn strict_layout(mut self) -> Self {
        self.render_options = self.render_options.with_strict_layout(true);
        self
    }

    /// Set render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Prefix root-relative asset references with `base`.
    pub fn with_asset_base_url(mut self, base: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_asset_base_url(base);
        self
    }

    /// Use layout text held in memory.
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Box::new(StaticLayout::new(layout));
        self
    }

    /// Read the layout from a file at render time.
    pub fn with_layout_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.layout = Box::new(FileLayout::new(path));
        self
    }

    /// Use a custom layout source.
    pub fn with_layout_source<S: LayoutSource + 'static>(mut self, source: S) -> Self {
        self.layout = Box::new(source);
        self
    }

    /// Parse a composition file.
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<BlockmailResult> {
        let composition = parse_file_with_options(path, self.parse_options.clone())?;
        Ok(self.finish(composition, None))
    }

    /// Parse composition JSON from a string.
    pub fn parse_str(self, json: &str) -> Result<BlockmailResult> {
        let composition =
            CompositionParser::from_bytes_with_options(json.as_bytes(), self.parse_options.clone())?
                .parse()?;
        Ok(self.finish(composition, None))
    }

    /// Load a stored composition.
    pub fn load(self, store: &dyn CompositionStore, id: &str) -> Result<BlockmailResult> {
        let composition = store.load(id)?;
        Ok(self.finish(composition, Some(id.to_string())))
    }

    /// Wrap a composition the caller already holds.
    pub fn with_composition(self, composition: Composition) -> BlockmailResult {
        self.finish(composition, None)
    }

    fn finish(self, composition: Composition, id: Option<String>) -> BlockmailResult {
        BlockmailResult {
            composition,
            id,
            render_options: self.render_options,
            layout: self.layout,
        }
    }
}

impl Default for Blockmail {
    fn default() -> Self {
        Self::new()
    }
}

/// A composition ready to render.
pub struct BlockmailResult {
    /// The composition
    pub composition: Composition,
    /// Store identifier, when loaded from a store
    id: Option<String>,
    render_options: RenderOptions,
    layout: Box<dyn LayoutSource>,
}

impl BlockmailResult {
    /// Render into the configured layout.
    pub fn render(&self) -> Result<RenderedDocument> {
        let layout = self.layout.load()?;
        HtmlRenderer::new(self.render_options.clone()).render_document(
            &layout,
            &self.composition,
            self.id.as_deref(),
        )
    }

    /// Render to an HTML string.
    pub fn to_html(&self) -> Result<String> {
        Ok(self.render()?.html)
    }

    /// Serialize the composition to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.composition, format)
    }

    /// Save into `store`, reusing the loaded id when there is one.
    pub fn save(&mut self, store: &dyn CompositionStore) -> Result<String> {
        self.composition.normalize_order();
        let id = store.save(&self.composition, self.id.as_deref())?;
        self.id = Some(id.clone());
        Ok(id)
    }

    /// Store identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HI: &str = r#"{
        "blocks": [{"id": 1, "type": "title", "content": "Hi", "order": 0}],
        "style": {"alignment": "text-center", "titleSize": "text-lg"}
    }"#;

    #[test]
    fn test_render_json() {
        let html = render_json("<body>{{content}}</body>", HI).unwrap();
        assert!(html.contains(r#"<h1 class="title text-lg text-center">Hi</h1>"#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_render_json_invalid_shape() {
        let err = render_json("{{content}}", r#"{"blocks": 3}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidComposition(_)));
    }

    #[test]
    fn test_render_with_source() {
        let source = StaticLayout::new("<main>{{content}}</main>");
        let html = render_with_source(&source, &Composition::new()).unwrap();
        assert_eq!(html, "<main></main>");

        let missing = FileLayout::new("/nonexistent/layout.html");
        let err = render_with_source(&missing, &Composition::new()).unwrap_err();
        assert!(matches!(err, Error::LayoutUnavailable(_)));
    }

    #[test]
    fn test_builder_default_layout() {
        let doc = Blockmail::new()
            .with_composition(Composition::create_default())
            .render()
            .unwrap();
        assert!(doc.html.starts_with("<!DOCTYPE html>"));
        assert!(doc.html.contains("background-color: #ffffff"));
        assert!(doc.html.contains("background-image: none"));
        assert!(!doc.html.contains("{{"));
        assert_eq!(doc.attachment_name(), "email-template.html");
    }

    #[test]
    fn test_builder_lenient_parse() {
        let json = r#"{"blocks": [
            {"id": 1, "type": "title", "content": "Hi", "order": 0},
            {"id": 2, "type": "divider", "order": 1}
        ]}"#;
        assert!(Blockmail::new().parse_str(json).is_err());

        let result = Blockmail::new().lenient().parse_str(json).unwrap();
        assert_eq!(result.composition.len(), 1);
    }

    #[test]
    fn test_builder_store_round_trip() {
        let store = MemoryStore::new();
        let mut result = Blockmail::new()
            .with_layout("{{content}}")
            .parse_str(HI)
            .unwrap();
        assert!(result.id().is_none());

        let id = result.save(&store).unwrap();
        let doc = Blockmail::new()
            .with_layout("{{content}}")
            .load(&store, &id)
            .unwrap()
            .render()
            .unwrap();

        assert_eq!(doc.composition_id.as_deref(), Some(id.as_str()));
        assert_eq!(doc.html, r#"<h1 class="title text-lg text-center">Hi</h1>"#);
    }

    #[test]
    fn test_builder_strict_layout() {
        let err = Blockmail::new()
            .with_layout("{{content}}")
            .strict_layout()
            .with_composition(Composition::new())
            .render()
            .unwrap_err();
        assert!(matches!(err, Error::LayoutUnavailable(_)));
    }
}
