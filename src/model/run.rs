//! Run-level types.

use serde::{Deserialize, Serialize};

/// A run of text sharing one style record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,

    /// Run styling
    pub style: RunStyle,
}

impl Run {
    /// Create a new run with default (inherited) style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    /// Create a run with an explicit style.
    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::styled(text, RunStyle::new().with_bold(true))
    }

    /// Create an italic run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::styled(text, RunStyle::new().with_italic(true))
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Character formatting of a run.
///
/// Every field is tri-state: `None` means the value is inherited from the
/// paragraph or document defaults rather than set on the run itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    /// Bold text
    pub bold: Option<bool>,

    /// Italic text
    pub italic: Option<bool>,

    /// Underline kind
    pub underline: Option<Underline>,

    /// Font family name
    pub font_name: Option<String>,

    /// Font size in points
    pub font_size: Option<f32>,

    /// Named character style (style id)
    pub style_id: Option<String>,

    /// Text color (hex, e.g. "FF0000")
    pub color: Option<String>,
}

impl RunStyle {
    /// Create an empty (fully inherited) style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bold.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Set italic.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    /// Set underline.
    pub fn with_underline(mut self, underline: Underline) -> Self {
        self.underline = Some(underline);
        self
    }

    /// Set font family and size.
    pub fn with_font(mut self, name: impl Into<String>, size_pt: f32) -> Self {
        self.font_name = Some(name.into());
        self.font_size = Some(size_pt);
        self
    }

    /// Set named character style.
    pub fn with_style_id(mut self, style_id: impl Into<String>) -> Self {
        self.style_id = Some(style_id.into());
        self
    }

    /// Set text color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Check if any formatting is set directly on the run.
    pub fn has_styling(&self) -> bool {
        self.bold.is_some()
            || self.italic.is_some()
            || self.underline.is_some()
            || self.font_name.is_some()
            || self.font_size.is_some()
            || self.style_id.is_some()
            || self.color.is_some()
    }
}

/// Underline kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Underline {
    /// Explicitly no underline
    None,
    /// Single line
    Single,
    /// Double line
    Double,
    /// Any other WordprocessingML underline value (`dotted`, `wave`, ...)
    Other(String),
}

impl Underline {
    /// Parse a WordprocessingML `w:u/@w:val` value.
    pub fn from_wml(value: &str) -> Self {
        match value {
            "none" => Underline::None,
            "single" => Underline::Single,
            "double" => Underline::Double,
            other => Underline::Other(other.to_string()),
        }
    }

    /// WordprocessingML value for this underline.
    pub fn as_wml(&self) -> &str {
        match self {
            Underline::None => "none",
            Underline::Single => "single",
            Underline::Double => "double",
            Underline::Other(value) => value,
        }
    }
}
