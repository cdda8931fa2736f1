//! Rendering options and configuration.

/// Options for rendering a composition into a layout.
///
/// These replace what would otherwise be process-wide constants: the
/// fallbacks used when a style field is empty, and the fixed markup bits
/// the renderer emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Substituted for `{{backgroundColor}}` when the style has no color
    pub default_background_color: String,

    /// Used for class tokens and `{{alignment}}` when the style alignment is empty
    pub default_alignment: String,

    /// Substituted for `{{backgroundImage}}` when the style has no image
    pub no_background_image: String,

    /// Joins block fragments
    pub separator: String,

    /// `alt` attribute of image blocks
    pub image_alt: String,

    /// Prefix for root-relative asset references (e.g. `https://cdn.example.com`)
    pub asset_base_url: Option<String>,

    /// Reject layouts unless each of the four placeholders appears exactly once
    pub strict_layout: bool,

    /// Collect render statistics
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback background color.
    pub fn with_default_background_color(mut self, color: impl Into<String>) -> Self {
        self.default_background_color = color.into();
        self
    }

    /// Set the fallback alignment token.
    pub fn with_default_alignment(mut self, alignment: impl Into<String>) -> Self {
        self.default_alignment = alignment.into();
        self
    }

    /// Set the fragment separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Set the image alt text.
    pub fn with_image_alt(mut self, alt: impl Into<String>) -> Self {
        self.image_alt = alt.into();
        self
    }

    /// Set the base URL for root-relative asset references.
    pub fn with_asset_base_url(mut self, base: impl Into<String>) -> Self {
        self.asset_base_url = Some(base.into());
        self
    }

    /// Enable or disable strict layout checking.
    pub fn with_strict_layout(mut self, strict: bool) -> Self {
        self.strict_layout = strict;
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    /// Resolve an asset reference against `asset_base_url`.
    ///
    /// Only root-relative references (`/uploads/...`) are rewritten.
    pub fn resolve_asset<'a>(&self, reference: &'a str) -> std::borrow::Cow<'a, str> {
        match &self.asset_base_url {
            Some(base) if reference.starts_with('/') && !reference.starts_with("//") => {
                format!("{}{}", base.trim_end_matches('/'), reference).into()
            }
            _ => reference.into(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_background_color: "#ffffff".to_string(),
            default_alignment: "text-left".to_string(),
            no_background_image: "none".to_string(),
            separator: "\n".to_string(),
            image_alt: "Email content".to_string(),
            asset_base_url: None,
            strict_layout: false,
            collect_stats: true,
        }
    }
}
