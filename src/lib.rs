//! Forge SDK
//!
//! Rust client for a Forge rendering server: turn HTML or a URL into PDF,
//! PNG, JPEG, BMP, TGA, QOI or SVG. Rendering happens on the server; this
//! crate builds and validates requests, sends them, and maps the answer onto
//! bytes or a typed [`Error`].
//!
//! # Features
//!
//! - **Fluent builder**: chain options, freeze into an immutable [`RenderRequest`]
//! - **Two execution modes**: `send().await` and `send_blocking()` on the same client
//! - **Pooled connections**: one keep-alive pool per mode, released on `close()` or drop
//! - **Local validation**: malformed requests never reach the network
//!
//! # Example
//!
//! ```no_run
//! use forge_sdk::{DitherMethod, ForgeClient, OutputFormat, PalettePreset};
//!
//! # async fn run() -> forge_sdk::Result<()> {
//! let client = ForgeClient::new("http://localhost:3000")?;
//! let png = client
//!     .render_url("https://example.com")
//!     .format(OutputFormat::Png)
//!     .width(1280)?
//!     .colors(16)?
//!     .palette(PalettePreset::Eink)
//!     .dither(DitherMethod::Atkinson)
//!     .send()
//!     .await?;
//! println!("{} bytes", png.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod types;
pub use types::{
    DitherMethod, EmbedRelationship, Flow, MarginPreset, Margins, Orientation, OutputFormat,
    Palette, PalettePreset, Paper, PdfStandard, WatermarkLayer,
};

pub mod request;
pub use request::{EmbeddedFile, RenderOptions, RenderRequest, RenderSource, Watermark};

mod builder;
pub use builder::RenderRequestBuilder;

mod client;
pub use client::{ClientConfig, ForgeClient, DEFAULT_TIMEOUT};

// Async entry points (`send`, `render`, `health`) for the same client
mod async_api;

mod pool;
mod response;
