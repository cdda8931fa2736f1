//! Layout templates and the sources that supply them.
//!
//! A layout is opaque HTML text containing four placeholder tokens. The
//! renderer never interprets anything else in it.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::error::{Error, Result};

/// A placeholder token recognized in layout templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Content,
    BackgroundColor,
    BackgroundImage,
    Alignment,
}

impl Placeholder {
    /// All placeholders, in substitution order.
    pub const ALL: [Placeholder; 4] = [
        Placeholder::Content,
        Placeholder::BackgroundColor,
        Placeholder::BackgroundImage,
        Placeholder::Alignment,
    ];

    /// Literal token as it appears in a layout.
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Content => "{{content}}",
            Placeholder::BackgroundColor => "{{backgroundColor}}",
            Placeholder::BackgroundImage => "{{backgroundImage}}",
            Placeholder::Alignment => "{{alignment}}",
        }
    }

    fn name(&self) -> &'static str {
        let token = self.token();
        &token[2..token.len() - 2]
    }
}

/// Built-in email skeleton used when no layout file is supplied.
pub const DEFAULT_LAYOUT: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Email</title>
<style>
body { margin: 0; padding: 0; }
.email-wrapper { background-color: {{backgroundColor}}; background-image: {{backgroundImage}}; background-size: cover; padding: 32px 0; }
.email-body { max-width: 600px; margin: 0 auto; padding: 24px; font-family: Helvetica, Arial, sans-serif; }
.text-left { text-align: left; }
.text-center { text-align: center; }
.text-right { text-align: right; }
.text-sm { font-size: 14px; }
.text-base { font-size: 16px; }
.text-lg { font-size: 18px; }
.text-xl { font-size: 20px; }
.text-3xl { font-size: 30px; }
.title { font-weight: bold; margin: 0 0 16px; }
.content-section { margin: 0 0 16px; }
.image-section img { max-width: 100%; }
</style>
</head>
<body>
<div class="email-wrapper">
<div class="email-body {{alignment}}">
{{content}}
</div>
</div>
</body>
</html>
"#;

/// Supplier of layout template text.
pub trait LayoutSource {
    /// Load the layout. Failures are reported as [`Error::LayoutUnavailable`].
    fn load(&self) -> Result<String>;
}

/// Layout held in memory.
#[derive(Debug, Clone)]
pub struct StaticLayout {
    text: String,
}

impl StaticLayout {
    /// Wrap layout text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for StaticLayout {
    fn default() -> Self {
        Self::new(DEFAULT_LAYOUT)
    }
}

impl LayoutSource for StaticLayout {
    fn load(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Layout read from a file on every load.
#[derive(Debug, Clone)]
pub struct FileLayout {
    path: PathBuf,
}

impl FileLayout {
    /// Create a source for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the layout file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LayoutSource for FileLayout {
    fn load(&self) -> Result<String> {
        debug!("reading layout from {}", self.path.display());
        std::fs::read_to_string(&self.path).map_err(|e| {
            Error::LayoutUnavailable(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// Placeholder usage in a layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutReport {
    /// Occurrences of each placeholder, indexed like [`Placeholder::ALL`]
    pub counts: [usize; 4],

    /// `{{name}}` tokens that are not recognized placeholders, in order of appearance
    pub unknown: Vec<String>,
}

impl LayoutReport {
    /// Occurrences of one placeholder.
    pub fn count(&self, placeholder: Placeholder) -> usize {
        let idx = Placeholder::ALL
            .iter()
            .position(|p| *p == placeholder)
            .unwrap_or_default();
        self.counts[idx]
    }

    /// Placeholders that do not appear at all.
    pub fn missing(&self) -> Vec<Placeholder> {
        Placeholder::ALL
            .into_iter()
            .filter(|p| self.count(*p) == 0)
            .collect()
    }

    /// Placeholders that appear more than once; only the first is substituted.
    pub fn repeated(&self) -> Vec<Placeholder> {
        Placeholder::ALL
            .into_iter()
            .filter(|p| self.count(*p) > 1)
            .collect()
    }

    /// Each placeholder appears exactly once.
    pub fn is_complete(&self) -> bool {
        self.counts.iter().all(|c| *c == 1)
    }
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap())
}

/// Scan a layout for placeholder tokens.
pub fn inspect_layout(layout: &str) -> LayoutReport {
    let mut report = LayoutReport::default();
    for caps in token_regex().captures_iter(layout) {
        let whole = &caps[0];
        match Placeholder::ALL.iter().position(|p| p.token() == whole) {
            Some(idx) => report.counts[idx] += 1,
            None => report.unknown.push(whole.to_string()),
        }
    }
    report
}

/// Fail with [`Error::LayoutUnavailable`] unless each placeholder appears exactly once.
pub(crate) fn require_complete(layout: &str) -> Result<()> {
    let report = inspect_layout(layout);
    if report.is_complete() {
        return Ok(());
    }
    let mut problems = Vec::new();
    let missing: Vec<&str> = report.missing().iter().map(|p| p.name()).collect();
    if !missing.is_empty() {
        problems.push(format!("missing placeholders: {}", missing.join(", ")));
    }
    let repeated: Vec<&str> = report.repeated().iter().map(|p| p.name()).collect();
    if !repeated.is_empty() {
        problems.push(format!("repeated placeholders: {}", repeated.join(", ")));
    }
    Err(Error::LayoutUnavailable(format!(
        "layout has {}",
        problems.join("; ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_complete() {
        let report = inspect_layout(DEFAULT_LAYOUT);
        assert!(report.is_complete());
        assert!(report.unknown.is_empty());
    }

    #[test]
    fn test_inspect_layout_counts() {
        let report = inspect_layout("<p>{{content}}</p>{{content}}{{ title }}{{alignment}}");
        assert_eq!(report.count(Placeholder::Content), 2);
        assert_eq!(report.count(Placeholder::Alignment), 1);
        assert_eq!(
            report.missing(),
            vec![Placeholder::BackgroundColor, Placeholder::BackgroundImage]
        );
        assert_eq!(report.repeated(), vec![Placeholder::Content]);
        assert_eq!(report.unknown, vec!["{{ title }}".to_string()]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_require_complete() {
        assert!(require_complete(DEFAULT_LAYOUT).is_ok());
        let err = require_complete("<body>{{content}}</body>").unwrap_err();
        assert!(matches!(err, Error::LayoutUnavailable(msg) if msg.contains("backgroundColor")));

        let doubled = DEFAULT_LAYOUT.replace("{{content}}", "{{content}}{{content}}");
        let err = require_complete(&doubled).unwrap_err();
        assert!(matches!(err, Error::LayoutUnavailable(msg) if msg.contains("repeated placeholders: content")));
    }

    #[test]
    fn test_static_layout() {
        let layout = StaticLayout::new("<body>{{content}}</body>");
        assert_eq!(layout.load().unwrap(), "<body>{{content}}</body>");
        assert!(StaticLayout::default().load().unwrap().contains("{{content}}"));
    }

    #[test]
    fn test_file_layout_missing_path() {
        let layout = FileLayout::new("/nonexistent/blockmail/layout.html");
        let err = layout.load().unwrap_err();
        assert!(matches!(err, Error::LayoutUnavailable(_)));
    }

    #[test]
    fn test_file_layout_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.html");
        std::fs::write(&path, "<html>{{content}}</html>").unwrap();

        let layout = FileLayout::new(&path);
        assert_eq!(layout.path(), path.as_path());
        assert_eq!(layout.load().unwrap(), "<html>{{content}}</html>");
    }
}
