//! Render request value types, validation and wire payload
//!
//! `RenderOptions` is the accumulated option set. `RenderRequest` is the
//! frozen, validated snapshot that actually goes over the wire; it can only be
//! produced through [`RenderRequest::new`], which runs every check before any
//! network activity happens.

use base64::Engine as _;
use serde::Serialize;

use crate::types::{
    is_hex_color, DitherMethod, EmbedRelationship, Flow, Margins, Orientation, OutputFormat,
    Palette, Paper, PdfStandard, WatermarkLayer,
};
use crate::{Error, Result};

/// Smallest accepted quantization color count.
pub const MIN_COLORS: u16 = 2;
/// Largest accepted quantization color count.
pub const MAX_COLORS: u16 = 256;

/// What to render: inline markup or a page address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderSource {
    Html(String),
    Url(String),
}

impl RenderSource {
    fn validate(&self) -> Result<()> {
        match self {
            RenderSource::Html(html) if html.trim().is_empty() => {
                Err(Error::validation("source.html", "non-empty markup"))
            }
            RenderSource::Html(_) => Ok(()),
            RenderSource::Url(raw) => {
                let parsed = url::Url::parse(raw).map_err(|e| {
                    Error::validation("source.url", format!("an absolute http(s) URL ({})", e))
                })?;
                match parsed.scheme() {
                    "http" | "https" => Ok(()),
                    other => Err(Error::validation(
                        "source.url",
                        format!("an http or https URL, got scheme {:?}", other),
                    )),
                }
            }
        }
    }
}

/// Watermark drawn on every PDF page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Watermark {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64 encoded PNG/JPEG
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// PDF points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<WatermarkLayer>,
}

impl Watermark {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn validate(&self) -> Result<()> {
        if let Some(o) = self.opacity {
            check_unit_interval("pdf_watermark.opacity", o, true)?;
        }
        if let Some(s) = self.scale {
            check_unit_interval("pdf_watermark.scale", s, false)?;
        }
        if let Some(r) = self.rotation {
            if !r.is_finite() {
                return Err(Error::validation("pdf_watermark.rotation", "a finite angle in degrees"));
            }
        }
        if let Some(size) = self.font_size {
            if !(size.is_finite() && size > 0.0) {
                return Err(Error::validation("pdf_watermark.font_size", "a positive size in points"));
            }
        }
        if let Some(color) = &self.color {
            if !is_hex_color(color) {
                return Err(Error::validation("pdf_watermark.color", "a hex color like \"#888888\""));
            }
        }
        Ok(())
    }
}

/// A file embedded in the produced PDF
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedFile {
    /// Name of the attachment inside the PDF
    pub path: String,
    /// Base64 encoded file contents
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<EmbedRelationship>,
}

impl EmbeddedFile {
    /// Attaches raw bytes; they are base64 encoded for transport.
    pub fn new(path: impl Into<String>, contents: impl AsRef<[u8]>) -> Self {
        Self {
            path: path.into(),
            data: base64::engine::general_purpose::STANDARD.encode(contents),
            mime_type: None,
            description: None,
            relationship: None,
        }
    }

    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn relationship(mut self, rel: EmbedRelationship) -> Self {
        self.relationship = Some(rel);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(Error::validation("pdf_embedded_files.path", "a non-empty file name"));
        }
        Ok(())
    }
}

/// Accumulated rendering options.
///
/// Every field is optional; `None` leaves the choice to the service. The
/// output format always has a value and defaults to PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Viewport width in CSS pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Viewport height in CSS pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper: Option<Paper>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<Margins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<Flow>,
    /// Output DPI; the service assumes 96 when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    /// CSS color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Page load timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Palette>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dither: Option<DitherMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_subject: Option<String>,
    /// Comma separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_bookmarks: Option<bool>,
    #[serde(skip_serializing_if = "watermark_unset")]
    pub pdf_watermark: Option<Watermark>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_standard: Option<PdfStandard>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pdf_embedded_files: Vec<EmbeddedFile>,
}

fn watermark_unset(wm: &Option<Watermark>) -> bool {
    wm.as_ref().map_or(true, Watermark::is_empty)
}

impl RenderOptions {
    /// Checks every set value against its domain.
    pub fn validate(&self) -> Result<()> {
        if let Some(w) = self.width {
            check_positive_px("width", w)?;
        }
        if let Some(h) = self.height {
            check_positive_px("height", h)?;
        }
        if let Some(m) = &self.margins {
            m.validate()?;
        }
        if let Some(d) = self.density {
            check_density(d)?;
        }
        if let Some(bg) = &self.background {
            check_background(bg)?;
        }
        if let Some(t) = self.timeout {
            check_timeout(t)?;
        }
        if let Some(n) = self.colors {
            check_colors(n)?;
        }
        if let Some(p) = &self.palette {
            p.validate()?;
        }
        if let Some(wm) = &self.pdf_watermark {
            wm.validate()?;
        }
        for file in &self.pdf_embedded_files {
            file.validate()?;
        }
        Ok(())
    }
}

pub(crate) fn check_positive_px(key: &'static str, px: u32) -> Result<()> {
    if px == 0 {
        return Err(Error::validation(key, "a positive number of CSS pixels"));
    }
    Ok(())
}

pub(crate) fn check_density(dpi: f64) -> Result<()> {
    if !(dpi.is_finite() && dpi > 0.0) {
        return Err(Error::validation("density", "a positive, finite DPI value"));
    }
    Ok(())
}

pub(crate) fn check_background(color: &str) -> Result<()> {
    if color.trim().is_empty() {
        return Err(Error::validation("background", "a CSS color"));
    }
    Ok(())
}

pub(crate) fn check_timeout(secs: u32) -> Result<()> {
    if secs == 0 {
        return Err(Error::validation("timeout", "a positive number of seconds"));
    }
    Ok(())
}

pub(crate) fn check_colors(n: u16) -> Result<()> {
    if !(MIN_COLORS..=MAX_COLORS).contains(&n) {
        return Err(Error::validation(
            "colors",
            format!("an integer in {}..={}, got {}", MIN_COLORS, MAX_COLORS, n),
        ));
    }
    Ok(())
}

pub(crate) fn check_unit_interval(key: &'static str, v: f32, allow_zero: bool) -> Result<()> {
    let lower_ok = if allow_zero { v >= 0.0 } else { v > 0.0 };
    if !(v.is_finite() && lower_ok && v <= 1.0) {
        let range = if allow_zero { "0.0..=1.0" } else { "a value in (0.0, 1.0]" };
        return Err(Error::validation(key, range));
    }
    Ok(())
}

/// Immutable, validated render request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRequest {
    source: RenderSource,
    options: RenderOptions,
}

impl RenderRequest {
    /// Freezes a source and option set, validating both.
    ///
    /// Order of checks: the source first, then every option value.
    pub fn new(source: RenderSource, options: RenderOptions) -> Result<Self> {
        source.validate()?;
        options.validate()?;
        Ok(Self { source, options })
    }

    pub fn source(&self) -> &RenderSource {
        &self.source
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn format(&self) -> OutputFormat {
        self.options.format
    }

    /// JSON payload sent to the render endpoint.
    pub fn to_payload(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| Error::validation("options", format!("serializable values ({})", e)))
    }
}
