//! Fluent option accumulator for render requests.
//!
//! Setters consume and return the builder so calls chain. Setters whose
//! value can be out of domain return `Result<Self>` and fail on the spot, so
//! chains read `client.render_html(h).format(f).colors(16)?.send().await`.
//! Repeated calls for the same key overwrite the earlier value.

use base64::Engine as _;

use crate::client::ForgeClient;
use crate::request::{
    check_background, check_colors, check_density, check_positive_px, check_timeout,
    check_unit_interval, EmbeddedFile, RenderOptions, RenderRequest, RenderSource, Watermark,
};
use crate::types::{
    is_hex_color, DitherMethod, Flow, MarginPreset, Margins, Orientation, OutputFormat, Palette,
    PalettePreset, Paper, PdfStandard, WatermarkLayer,
};
use crate::{Error, Result};

/// Builder for a render request.
///
/// Created via [`ForgeClient::render_html`] or [`ForgeClient::render_url`].
/// Call [`send`](Self::send) (async) or [`send_blocking`](Self::send_blocking)
/// to execute; both freeze the current state first and leave the builder
/// untouched, so the same builder can be sent again.
#[derive(Debug, Clone)]
pub struct RenderRequestBuilder {
    client: ForgeClient,
    source: RenderSource,
    options: RenderOptions,
}

impl RenderRequestBuilder {
    pub(crate) fn new(client: ForgeClient, source: RenderSource) -> Self {
        Self {
            client,
            source,
            options: RenderOptions::default(),
        }
    }

    pub(crate) fn client(&self) -> &ForgeClient {
        &self.client
    }

    /// The HTML or URL this request renders.
    pub fn source(&self) -> &RenderSource {
        &self.source
    }

    /// Options accumulated so far.
    pub fn current_options(&self) -> &RenderOptions {
        &self.options
    }

    /// Replace every accumulated option at once.
    ///
    /// The values are checked when the request is frozen.
    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Output format (default: PDF).
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.options.format = format;
        self
    }

    /// Viewport width in CSS pixels.
    pub fn width(mut self, px: u32) -> Result<Self> {
        check_positive_px("width", px)?;
        self.options.width = Some(px);
        Ok(self)
    }

    /// Viewport height in CSS pixels.
    pub fn height(mut self, px: u32) -> Result<Self> {
        check_positive_px("height", px)?;
        self.options.height = Some(px);
        Ok(self)
    }

    /// Paper size (PDF only).
    pub fn paper(mut self, size: Paper) -> Self {
        self.options.paper = Some(size);
        self
    }

    /// Page orientation (PDF only).
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.options.orientation = Some(orientation);
        self
    }

    /// Margins as a preset name or `"T,R,B,L"` in millimeters.
    pub fn margins(mut self, margins: &str) -> Result<Self> {
        self.options.margins = Some(margins.parse()?);
        Ok(self)
    }

    /// Margins from a named preset.
    pub fn margin_preset(mut self, preset: MarginPreset) -> Self {
        self.options.margins = Some(Margins::Preset(preset));
        self
    }

    /// Margins in millimeters.
    pub fn margins_mm(mut self, top: f64, right: f64, bottom: f64, left: f64) -> Result<Self> {
        self.options.margins = Some(Margins::mm(top, right, bottom, left)?);
        Ok(self)
    }

    /// Paginated or continuous page flow.
    pub fn flow(mut self, flow: Flow) -> Self {
        self.options.flow = Some(flow);
        self
    }

    /// Output DPI (service default: 96).
    pub fn density(mut self, dpi: f64) -> Result<Self> {
        check_density(dpi)?;
        self.options.density = Some(dpi);
        Ok(self)
    }

    /// Background CSS color.
    pub fn background(mut self, color: impl Into<String>) -> Result<Self> {
        let color = color.into();
        check_background(&color)?;
        self.options.background = Some(color);
        Ok(self)
    }

    /// Page load timeout in seconds. Also bounds the HTTP round trip for this
    /// request in place of the client default.
    pub fn timeout(mut self, seconds: u32) -> Result<Self> {
        check_timeout(seconds)?;
        self.options.timeout = Some(seconds);
        Ok(self)
    }

    /// Number of colors for quantization (2-256).
    pub fn colors(mut self, n: u16) -> Result<Self> {
        check_colors(n)?;
        self.options.colors = Some(n);
        Ok(self)
    }

    /// Palette preset; replaces any custom palette.
    pub fn palette(mut self, preset: PalettePreset) -> Self {
        self.options.palette = Some(Palette::Preset(preset));
        self
    }

    /// Explicit list of hex colors; replaces any palette preset.
    pub fn custom_palette<I, S>(mut self, colors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.palette = Some(Palette::custom(colors)?);
        Ok(self)
    }

    /// Dithering applied during color quantization.
    pub fn dither(mut self, method: DitherMethod) -> Self {
        self.options.dither = Some(method);
        self
    }

    /// PDF document title.
    pub fn pdf_title(mut self, title: impl Into<String>) -> Self {
        self.options.pdf_title = Some(title.into());
        self
    }

    /// PDF author.
    pub fn pdf_author(mut self, author: impl Into<String>) -> Self {
        self.options.pdf_author = Some(author.into());
        self
    }

    /// PDF subject.
    pub fn pdf_subject(mut self, subject: impl Into<String>) -> Self {
        self.options.pdf_subject = Some(subject.into());
        self
    }

    /// Comma separated keywords.
    pub fn pdf_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.options.pdf_keywords = Some(keywords.into());
        self
    }

    /// PDF creator application.
    pub fn pdf_creator(mut self, creator: impl Into<String>) -> Self {
        self.options.pdf_creator = Some(creator.into());
        self
    }

    /// Enable or disable the PDF outline.
    pub fn pdf_bookmarks(mut self, enabled: bool) -> Self {
        self.options.pdf_bookmarks = Some(enabled);
        self
    }

    /// Watermark text drawn on every page.
    pub fn pdf_watermark_text(mut self, text: impl Into<String>) -> Self {
        self.watermark().text = Some(text.into());
        self
    }

    /// Watermark image from raw PNG/JPEG bytes.
    pub fn pdf_watermark_image(mut self, image: impl AsRef<[u8]>) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        self.watermark().image_data = Some(encoded);
        self
    }

    /// Watermark opacity, 0.0-1.0 (service default 0.15).
    pub fn pdf_watermark_opacity(mut self, opacity: f32) -> Result<Self> {
        check_unit_interval("pdf_watermark.opacity", opacity, true)?;
        self.watermark().opacity = Some(opacity);
        Ok(self)
    }

    /// Rotation in degrees (service default -45).
    pub fn pdf_watermark_rotation(mut self, degrees: f32) -> Result<Self> {
        if !degrees.is_finite() {
            return Err(Error::validation("pdf_watermark.rotation", "a finite angle in degrees"));
        }
        self.watermark().rotation = Some(degrees);
        Ok(self)
    }

    /// Text color as hex (service default `#888888`).
    pub fn pdf_watermark_color(mut self, color: &str) -> Result<Self> {
        if !is_hex_color(color) {
            return Err(Error::validation("pdf_watermark.color", "a hex color like \"#888888\""));
        }
        self.watermark().color = Some(color.to_string());
        Ok(self)
    }

    /// Font size in PDF points.
    pub fn pdf_watermark_font_size(mut self, points: f32) -> Result<Self> {
        if !(points.is_finite() && points > 0.0) {
            return Err(Error::validation("pdf_watermark.font_size", "a positive size in points"));
        }
        self.watermark().font_size = Some(points);
        Ok(self)
    }

    /// Image scale, (0.0-1.0] (service default 0.5).
    pub fn pdf_watermark_scale(mut self, scale: f32) -> Result<Self> {
        check_unit_interval("pdf_watermark.scale", scale, false)?;
        self.watermark().scale = Some(scale);
        Ok(self)
    }

    /// Draw the watermark over or under the page content.
    pub fn pdf_watermark_layer(mut self, layer: WatermarkLayer) -> Self {
        self.watermark().layer = Some(layer);
        self
    }

    /// PDF/A conformance level.
    pub fn pdf_standard(mut self, standard: PdfStandard) -> Self {
        self.options.pdf_standard = Some(standard);
        self
    }

    /// Attach a file to the PDF. Attachments accumulate in call order.
    pub fn pdf_attach(mut self, file: EmbeddedFile) -> Result<Self> {
        if file.path.trim().is_empty() {
            return Err(Error::validation("pdf_embedded_files.path", "a non-empty file name"));
        }
        self.options.pdf_embedded_files.push(file);
        Ok(self)
    }

    /// Freeze the current state into a validated, immutable request.
    pub fn build(&self) -> Result<RenderRequest> {
        RenderRequest::new(self.source.clone(), self.options.clone())
    }

    /// Freeze and send, blocking the current thread.
    pub fn send_blocking(&self) -> Result<Vec<u8>> {
        let request = self.build()?;
        self.client.render_blocking(&request)
    }

    fn watermark(&mut self) -> &mut Watermark {
        self.options.pdf_watermark.get_or_insert_with(Watermark::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ForgeClient {
        ForgeClient::new("http://localhost:3000").unwrap()
    }

    #[test]
    fn chained_options_land_in_payload() -> Result<()> {
        let payload = client()
            .render_url("https://example.com")
            .format(OutputFormat::Png)
            .width(1280)?
            .height(800)?
            .paper(Paper::Letter)
            .orientation(Orientation::Landscape)
            .margins("10,20,10,20")?
            .flow(Flow::Paginate)
            .density(300.0)?
            .background("#ffffff")?
            .timeout(60)?
            .build()?
            .to_payload()?;

        assert_eq!(payload["source"], json!({"url": "https://example.com"}));
        let o = &payload["options"];
        assert_eq!(o["format"], "png");
        assert_eq!(o["width"], 1280);
        assert_eq!(o["margins"], "10,20,10,20");
        assert_eq!(o["density"], 300.0);
        assert!(o.get("colors").is_none());
        Ok(())
    }

    #[test]
    fn out_of_domain_values_fail_immediately() {
        let b = client().render_html("<p>x</p>");
        assert!(matches!(b.clone().colors(1), Err(Error::Validation { key: "colors", .. })));
        assert!(matches!(b.clone().colors(257), Err(Error::Validation { key: "colors", .. })));
        assert!(b.clone().width(0).is_err());
        assert!(b.clone().density(-1.0).is_err());
        assert!(b.clone().margins("1,2,3").is_err());
        assert!(b.clone().custom_palette(Vec::<String>::new()).is_err());
        assert!(b.clone().pdf_watermark_opacity(2.0).is_err());
        assert!(b.clone().pdf_watermark_scale(0.0).is_err());
        assert!(b.clone().pdf_watermark_color("gray").is_err());
        assert!(b.pdf_attach(EmbeddedFile::new("", b"x")).is_err());
    }

    #[test]
    fn last_palette_wins() -> Result<()> {
        let preset_last = client()
            .render_html("<p>x</p>")
            .custom_palette(["#000000", "#ffffff"])?
            .palette(PalettePreset::Eink)
            .build()?
            .to_payload()?;
        assert_eq!(preset_last["options"]["palette"], "eink");

        let custom_last = client()
            .render_html("<p>x</p>")
            .palette(PalettePreset::Auto)
            .custom_palette(["#000000", "#ff0000"])?
            .build()?
            .to_payload()?;
        assert_eq!(custom_last["options"]["palette"], json!(["#000000", "#ff0000"]));
        Ok(())
    }

    #[test]
    fn repeated_setters_overwrite() -> Result<()> {
        let b = client()
            .render_html("<p>x</p>")
            .format(OutputFormat::Png)
            .format(OutputFormat::Svg)
            .colors(8)?
            .colors(64)?;
        assert_eq!(b.current_options().format, OutputFormat::Svg);
        assert_eq!(b.current_options().colors, Some(64));
        Ok(())
    }

    #[test]
    fn build_leaves_builder_untouched() -> Result<()> {
        let b = client().render_html("<p>x</p>").pdf_title("Report");
        let first = b.build()?;
        let second = b.build()?;
        assert_eq!(first, second);
        assert_eq!(b.current_options().pdf_title.as_deref(), Some("Report"));
        Ok(())
    }

    #[test]
    fn watermark_fields_group_together() -> Result<()> {
        let payload = client()
            .render_html("<h1>Invoice</h1>")
            .pdf_watermark_text("DRAFT")
            .pdf_watermark_opacity(0.25)?
            .pdf_watermark_layer(WatermarkLayer::Over)
            .pdf_watermark_image([1u8, 2, 3])
            .build()?
            .to_payload()?;
        assert_eq!(
            payload["options"]["pdf_watermark"],
            json!({"text": "DRAFT", "image_data": "AQID", "opacity": 0.25, "layer": "over"})
        );
        Ok(())
    }

    #[test]
    fn pdf_metadata_is_partial() -> Result<()> {
        let payload = client()
            .render_html("<h1>Report</h1>")
            .pdf_title("Report")
            .pdf_bookmarks(false)
            .build()?
            .to_payload()?;
        let o = payload["options"].as_object().unwrap();
        assert_eq!(o["pdf_title"], "Report");
        assert_eq!(o["pdf_bookmarks"], false);
        assert!(!o.contains_key("pdf_author"));
        assert!(!o.contains_key("pdf_watermark"));
        assert!(!o.contains_key("pdf_embedded_files"));
        Ok(())
    }

    #[test]
    fn invalid_options_surface_at_build() {
        let opts = RenderOptions {
            colors: Some(300),
            ..Default::default()
        };
        let err = client().render_html("<p>x</p>").options(opts).build().unwrap_err();
        assert!(matches!(err, Error::Validation { key: "colors", .. }));
    }
}
