//! Option value types accepted by the rendering service
//!
//! Every enum serializes to (and parses from) the exact name the service
//! expects on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// Declares a closed set of wire names with `Display`, `FromStr` and `Serialize`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $key:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// All accepted values, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name used on the wire.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $( $wire => Ok($name::$variant), )+
                    _ => Err(Error::validation(
                        $key,
                        format!("one of: {}", [$($wire),+].join(", ")),
                    )),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Output format for rendered content
    OutputFormat, "format" {
        Pdf => "pdf",
        Png => "png",
        Jpeg => "jpeg",
        Bmp => "bmp",
        Tga => "tga",
        Qoi => "qoi",
        Svg => "svg",
    }
}

impl OutputFormat {
    /// Content type the service answers with for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Tga => "image/x-tga",
            OutputFormat::Qoi => "image/qoi",
            OutputFormat::Svg => "image/svg+xml",
        }
    }

    /// Conventional file extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            other => other.as_str(),
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Pdf
    }
}

wire_enum! {
    /// Page orientation
    Orientation, "orientation" {
        Portrait => "portrait",
        Landscape => "landscape",
    }
}

wire_enum! {
    /// Document flow mode
    Flow, "flow" {
        Auto => "auto",
        Paginate => "paginate",
        Continuous => "continuous",
    }
}

wire_enum! {
    /// Dithering algorithm used during color quantization
    DitherMethod, "dither" {
        None => "none",
        FloydSteinberg => "floyd_steinberg",
        Atkinson => "atkinson",
        Ordered => "ordered",
    }
}

wire_enum! {
    /// Built-in color palette presets
    PalettePreset, "palette" {
        Auto => "auto",
        BlackWhite => "bw",
        Grayscale => "grayscale",
        Eink => "eink",
    }
}

wire_enum! {
    /// Named paper sizes
    Paper, "paper" {
        A3 => "a3",
        A4 => "a4",
        A5 => "a5",
        B4 => "b4",
        B5 => "b5",
        Letter => "letter",
        Legal => "legal",
        Ledger => "ledger",
    }
}

wire_enum! {
    /// Named margin presets
    MarginPreset, "margins" {
        None => "none",
        Narrow => "narrow",
        Normal => "normal",
        Wide => "wide",
    }
}

wire_enum! {
    /// Whether the watermark is drawn above or below page content
    WatermarkLayer, "pdf_watermark.layer" {
        Over => "over",
        Under => "under",
    }
}

wire_enum! {
    /// PDF standard compliance level
    PdfStandard, "pdf_standard" {
        None => "none",
        PdfA2b => "pdf_a_2b",
        PdfA3b => "pdf_a_3b",
    }
}

wire_enum! {
    /// Relationship of an embedded file to the document (PDF/A-3 `AFRelationship`)
    EmbedRelationship, "pdf_embedded_files.relationship" {
        Source => "source",
        Data => "data",
        Alternative => "alternative",
        Supplement => "supplement",
        Unspecified => "unspecified",
    }
}

/// Quantization palette: a preset or an explicit ordered list of hex colors.
///
/// The two forms are mutually exclusive; whichever is set last wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Palette {
    Preset(PalettePreset),
    Custom(Vec<String>),
}

impl Palette {
    /// Builds a custom palette, checking every entry is a hex color.
    pub fn custom<I, S>(colors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let palette = Palette::Custom(colors.into_iter().map(Into::into).collect());
        palette.validate()?;
        Ok(palette)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Palette::Preset(_) => Ok(()),
            Palette::Custom(colors) if colors.is_empty() => Err(Error::validation(
                "palette",
                "a preset name or a non-empty list of hex colors",
            )),
            Palette::Custom(colors) if colors.len() > 256 => {
                Err(Error::validation("palette", "at most 256 colors"))
            }
            Palette::Custom(colors) => match colors.iter().find(|c| !is_hex_color(c)) {
                Some(bad) => Err(Error::validation(
                    "palette",
                    format!("hex colors like \"#1a2b3c\", got {:?}", bad),
                )),
                None => Ok(()),
            },
        }
    }
}

impl From<PalettePreset> for Palette {
    fn from(preset: PalettePreset) -> Self {
        Palette::Preset(preset)
    }
}

impl FromStr for Palette {
    type Err = Error;

    /// Parses a preset name, or a comma separated list of hex colors.
    fn from_str(s: &str) -> Result<Self> {
        if let Ok(preset) = s.parse::<PalettePreset>() {
            return Ok(Palette::Preset(preset));
        }
        Palette::custom(s.split(',').map(str::trim).filter(|c| !c.is_empty()))
    }
}

/// Page margins: a named preset, or explicit top/right/bottom/left in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Margins {
    Preset(MarginPreset),
    Millimeters {
        top: f64,
        right: f64,
        bottom: f64,
        left: f64,
    },
}

const MARGINS_EXPECTED: &str =
    "a preset (none, narrow, normal, wide) or \"T,R,B,L\" with four non-negative millimeter values";

impl Margins {
    /// Explicit margins in millimeters.
    pub fn mm(top: f64, right: f64, bottom: f64, left: f64) -> Result<Self> {
        let margins = Margins::Millimeters {
            top,
            right,
            bottom,
            left,
        };
        margins.validate()?;
        Ok(margins)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            Margins::Preset(_) => Ok(()),
            Margins::Millimeters {
                top,
                right,
                bottom,
                left,
            } => {
                if [top, right, bottom, left]
                    .iter()
                    .all(|v| v.is_finite() && *v >= 0.0)
                {
                    Ok(())
                } else {
                    Err(Error::validation("margins", MARGINS_EXPECTED))
                }
            }
        }
    }
}

impl FromStr for Margins {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(preset) = s.parse::<MarginPreset>() {
            return Ok(Margins::Preset(preset));
        }
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::validation("margins", MARGINS_EXPECTED))?;
        match values.as_slice() {
            [top, right, bottom, left] => Margins::mm(*top, *right, *bottom, *left),
            _ => Err(Error::validation("margins", MARGINS_EXPECTED)),
        }
    }
}

impl fmt::Display for Margins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Margins::Preset(p) => f.write_str(p.as_str()),
            Margins::Millimeters {
                top,
                right,
                bottom,
                left,
            } => write!(f, "{},{},{},{}", top, right, bottom, left),
        }
    }
}

impl Serialize for Margins {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `#rgb` or `#rrggbb`.
pub(crate) fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
