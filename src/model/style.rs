//! Style configuration shared by every block of a composition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Presentation settings applied uniformly to the whole composition.
///
/// Every field has a default so rendering never fails on a sparse style.
/// Values are opaque tokens; they are written into class attributes and
/// CSS verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawStyle")]
pub struct StyleConfig {
    /// Size token for title blocks
    pub title_size: String,

    /// Size token for content blocks
    pub content_size: String,

    /// Alignment token (`text-left`, `text-center`, `text-right`)
    pub alignment: String,

    /// Theme token, passed through unmodified
    pub theme: String,

    /// Background color; the renderer falls back to white
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    /// Background image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            title_size: "text-3xl".to_string(),
            content_size: SizeLevel::Medium.token().to_string(),
            alignment: Alignment::Left.token().to_string(),
            theme: "light".to_string(),
            background_color: None,
            background_image: None,
        }
    }
}

/// Stored style where any field may be missing or `null`.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawStyle {
    title_size: Option<String>,
    content_size: Option<String>,
    alignment: Option<String>,
    theme: Option<String>,
    background_color: Option<String>,
    background_image: Option<String>,
}

impl From<RawStyle> for StyleConfig {
    fn from(raw: RawStyle) -> Self {
        let defaults = StyleConfig::default();
        Self {
            title_size: raw.title_size.unwrap_or(defaults.title_size),
            content_size: raw.content_size.unwrap_or(defaults.content_size),
            alignment: raw.alignment.unwrap_or(defaults.alignment),
            theme: raw.theme.unwrap_or(defaults.theme),
            background_color: raw.background_color,
            background_image: raw.background_image,
        }
    }
}

impl StyleConfig {
    /// Create a style with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title size.
    pub fn with_title_size(mut self, size: SizeLevel) -> Self {
        self.title_size = size.token().to_string();
        self
    }

    /// Set the content size.
    pub fn with_content_size(mut self, size: SizeLevel) -> Self {
        self.content_size = size.token().to_string();
        self
    }

    /// Set the alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment.token().to_string();
        self
    }

    /// Set the background color.
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Set the background image reference.
    pub fn with_background_image(mut self, reference: impl Into<String>) -> Self {
        self.background_image = Some(reference.into());
        self
    }

    /// Set one field. An empty value clears the optional fields.
    pub fn set(&mut self, field: StyleField, value: impl Into<String>) {
        let value = value.into();
        match field {
            StyleField::TitleSize => self.title_size = value,
            StyleField::ContentSize => self.content_size = value,
            StyleField::Alignment => self.alignment = value,
            StyleField::Theme => self.theme = value,
            StyleField::BackgroundColor => self.background_color = non_empty(value),
            StyleField::BackgroundImage => self.background_image = non_empty(value),
        }
    }

    /// Read one field.
    pub fn get(&self, field: StyleField) -> Option<&str> {
        match field {
            StyleField::TitleSize => Some(&self.title_size),
            StyleField::ContentSize => Some(&self.content_size),
            StyleField::Alignment => Some(&self.alignment),
            StyleField::Theme => Some(&self.theme),
            StyleField::BackgroundColor => self.background_color.as_deref(),
            StyleField::BackgroundImage => self.background_image.as_deref(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Names of the settable style fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleField {
    TitleSize,
    ContentSize,
    Alignment,
    Theme,
    BackgroundColor,
    BackgroundImage,
}

impl StyleField {
    pub const ALL: [StyleField; 6] = [
        StyleField::TitleSize,
        StyleField::ContentSize,
        StyleField::Alignment,
        StyleField::Theme,
        StyleField::BackgroundColor,
        StyleField::BackgroundImage,
    ];

    /// Wire (camelCase) name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            StyleField::TitleSize => "titleSize",
            StyleField::ContentSize => "contentSize",
            StyleField::Alignment => "alignment",
            StyleField::Theme => "theme",
            StyleField::BackgroundColor => "backgroundColor",
            StyleField::BackgroundImage => "backgroundImage",
        }
    }
}

impl fmt::Display for StyleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StyleField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "titleSize" | "title_size" => Ok(StyleField::TitleSize),
            "contentSize" | "content_size" => Ok(StyleField::ContentSize),
            "alignment" => Ok(StyleField::Alignment),
            "theme" => Ok(StyleField::Theme),
            "backgroundColor" | "background_color" => Ok(StyleField::BackgroundColor),
            "backgroundImage" | "background_image" => Ok(StyleField::BackgroundImage),
            other => Err(Error::InvalidField(other.to_string())),
        }
    }
}

/// The four text size levels offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeLevel {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

impl SizeLevel {
    /// Class token for this level.
    pub fn token(&self) -> &'static str {
        match self {
            SizeLevel::Small => "text-sm",
            SizeLevel::Medium => "text-base",
            SizeLevel::Large => "text-lg",
            SizeLevel::ExtraLarge => "text-xl",
        }
    }
}

impl FromStr for SizeLevel {
    type Err = String;

    /// Accepts level names (`small`, `extra-large`, ...) and class tokens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" | "sm" | "text-sm" => Ok(SizeLevel::Small),
            "medium" | "base" | "text-base" => Ok(SizeLevel::Medium),
            "large" | "lg" | "text-lg" => Ok(SizeLevel::Large),
            "extra-large" | "xl" | "text-xl" => Ok(SizeLevel::ExtraLarge),
            other => Err(format!("unknown size level: {}", other)),
        }
    }
}

/// Horizontal alignment of block content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Class token for this alignment.
    pub fn token(&self) -> &'static str {
        match self {
            Alignment::Left => "text-left",
            Alignment::Center => "text-center",
            Alignment::Right => "text-right",
        }
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "text-left" => Ok(Alignment::Left),
            "center" | "text-center" => Ok(Alignment::Center),
            "right" | "text-right" => Ok(Alignment::Right),
            other => Err(format!("unknown alignment: {}", other)),
        }
    }
}
