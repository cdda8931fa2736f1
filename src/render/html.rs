//! HTML rendering of compositions into layout templates.

use log::{debug, warn};

use crate::error::Result;
use crate::model::{Block, BlockKind, Composition, StyleConfig};

use super::layout::{inspect_layout, require_complete, Placeholder};
use super::visitor::{BlockVisitor, VisitorAction};
use super::{RenderOptions, RenderStats, RenderedDocument};

/// Render a composition into a layout with default options.
pub fn render(layout: &str, composition: &Composition) -> Result<String> {
    HtmlRenderer::new(RenderOptions::default()).render(layout, composition)
}

/// Render a composition into a layout, returning the HTML with statistics.
pub fn render_document(
    layout: &str,
    composition: &Composition,
    composition_id: Option<&str>,
    options: &RenderOptions,
) -> Result<RenderedDocument> {
    HtmlRenderer::new(options.clone()).render_document(layout, composition, composition_id)
}

/// HTML renderer.
///
/// Output depends only on the layout text, the composition and the
/// options, so identical input always renders to identical bytes.
pub struct HtmlRenderer {
    options: RenderOptions,
    visitor: Option<Box<dyn BlockVisitor>>,
    stats: RenderStats,
}

impl HtmlRenderer {
    /// Create a new HTML renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            visitor: None,
            stats: RenderStats::new(),
        }
    }

    /// Attach a block visitor.
    pub fn with_visitor<V: BlockVisitor + 'static>(mut self, visitor: V) -> Self {
        self.visitor = Some(Box::new(visitor));
        self
    }

    /// Render to an HTML string.
    pub fn render(mut self, layout: &str, composition: &Composition) -> Result<String> {
        self.render_internal(layout, composition)
    }

    /// Render to a [`RenderedDocument`] carrying statistics and the source id.
    pub fn render_document(
        mut self,
        layout: &str,
        composition: &Composition,
        composition_id: Option<&str>,
    ) -> Result<RenderedDocument> {
        let html = self.render_internal(layout, composition)?;
        Ok(RenderedDocument::new(
            html,
            composition_id.map(str::to_string),
            self.stats,
        ))
    }

    /// Build the joined content section without a layout.
    pub fn render_content(mut self, composition: &Composition) -> String {
        self.content_html(composition)
    }

    fn render_internal(&mut self, layout: &str, composition: &Composition) -> Result<String> {
        if self.options.strict_layout {
            require_complete(layout)?;
        } else {
            let report = inspect_layout(layout);
            if !report.missing().is_empty() {
                debug!("layout lacks placeholders: {:?}", report.missing());
            }
            if !report.repeated().is_empty() {
                warn!(
                    "layout repeats placeholders {:?}; only the first occurrence is substituted",
                    report.repeated()
                );
            }
        }

        let content = self.content_html(composition);
        let style = &composition.style;

        let background_color = non_empty(style.background_color.as_deref())
            .unwrap_or(&self.options.default_background_color)
            .to_string();
        let background_image = match non_empty(style.background_image.as_deref()) {
            Some(reference) => format!("url({})", self.options.resolve_asset(reference)),
            None => self.options.no_background_image.clone(),
        };
        let alignment = self.alignment(style).to_string();

        let html = substitute(
            layout,
            &[
                (Placeholder::Content, content.as_str()),
                (Placeholder::BackgroundColor, background_color.as_str()),
                (Placeholder::BackgroundImage, background_image.as_str()),
                (Placeholder::Alignment, alignment.as_str()),
            ],
        );

        debug!(
            "rendered {} blocks into {} bytes",
            composition.len(),
            html.len()
        );
        Ok(html)
    }

    fn content_html(&mut self, composition: &Composition) -> String {
        let fragments: Vec<String> = composition
            .sorted_blocks()
            .into_iter()
            .map(|block| self.block_fragment(block, &composition.style))
            .collect();
        fragments.join(&self.options.separator)
    }

    fn block_fragment(&mut self, block: &Block, style: &StyleConfig) -> String {
        if let Some(visitor) = self.visitor.as_mut() {
            match visitor.visit_block(block) {
                VisitorAction::Continue => {}
                VisitorAction::Replace(fragment) => {
                    self.count(|s| s.replaced_count += 1);
                    return fragment;
                }
                VisitorAction::Skip => {
                    self.count(|s| s.skipped_count += 1);
                    return String::new();
                }
            }
        }

        let alignment = self.alignment(style);
        match block.kind {
            BlockKind::Title => {
                let fragment = format!(
                    r#"<h1 class="title {} {}">{}</h1>"#,
                    style.title_size,
                    alignment,
                    block.text()
                );
                self.count(|s| s.title_count += 1);
                fragment
            }
            BlockKind::Content => {
                let fragment = format!(
                    r#"<div class="content-section {} {}">{}</div>"#,
                    style.content_size,
                    alignment,
                    block.text()
                );
                self.count(|s| s.content_count += 1);
                fragment
            }
            BlockKind::Image => match non_empty(block.content.as_deref()) {
                Some(reference) => {
                    let fragment = format!(
                        r#"<div class="image-section {}"><img src="{}" alt="{}"></div>"#,
                        alignment,
                        self.options.resolve_asset(reference),
                        self.options.image_alt
                    );
                    self.count(|s| s.image_count += 1);
                    fragment
                }
                None => {
                    self.count(|s| s.empty_image_count += 1);
                    String::new()
                }
            },
        }
    }

    fn alignment<'a>(&'a self, style: &'a StyleConfig) -> &'a str {
        non_empty(Some(style.alignment.as_str())).unwrap_or(&self.options.default_alignment)
    }

    fn count(&mut self, update: impl FnOnce(&mut RenderStats)) {
        if self.options.collect_stats {
            update(&mut self.stats);
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Replace the first occurrence of each placeholder in `layout`.
///
/// Positions are located in the layout text itself, so tokens that show up
/// inside substituted values are left alone.
fn substitute(layout: &str, values: &[(Placeholder, &str)]) -> String {
    let mut hits: Vec<(usize, &str, &str)> = values
        .iter()
        .filter_map(|(placeholder, value)| {
            let token = placeholder.token();
            layout.find(token).map(|pos| (pos, token, *value))
        })
        .collect();
    hits.sort_by_key(|(pos, _, _)| *pos);

    let extra: usize = hits.iter().map(|(_, _, value)| value.len()).sum();
    let mut output = String::with_capacity(layout.len() + extra);
    let mut cursor = 0;
    for (pos, token, value) in hits {
        output.push_str(&layout[cursor..pos]);
        output.push_str(value);
        cursor = pos + token.len();
    }
    output.push_str(&layout[cursor..]);
    output
}
