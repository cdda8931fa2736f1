//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

/// A rendered email: final HTML plus the id of the composition it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// The rendered HTML
    pub html: String,

    /// Identifier of the source composition, if it was stored
    pub composition_id: Option<String>,

    /// Render statistics
    pub stats: RenderStats,
}

impl RenderedDocument {
    /// Create a new rendered document.
    pub fn new(html: String, composition_id: Option<String>, stats: RenderStats) -> Self {
        Self {
            html,
            composition_id,
            stats,
        }
    }

    /// File name for a download attachment.
    pub fn attachment_name(&self) -> String {
        match &self.composition_id {
            Some(id) => format!("email-template-{}.html", id),
            None => "email-template.html".to_string(),
        }
    }
}

/// Statistics collected while building the content section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Title fragments emitted
    pub title_count: u32,

    /// Content fragments emitted
    pub content_count: u32,

    /// Image fragments emitted
    pub image_count: u32,

    /// Image blocks without a reference
    pub empty_image_count: u32,

    /// Fragments replaced by a visitor
    pub replaced_count: u32,

    /// Blocks dropped by a visitor
    pub skipped_count: u32,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total fragments that produced output.
    pub fn fragment_count(&self) -> u32 {
        self.title_count + self.content_count + self.image_count + self.replaced_count
    }
}
