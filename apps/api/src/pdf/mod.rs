//! PDF → image conversion for uploaded resumes.
//!
//! Only the first page is rasterised. The result is re-encoded as JPEG and
//! base64'd into an [`ImagePayload`] that the model gateway can embed
//! directly in its request body.
//!
//! `AppState` holds an `Arc<dyn Converter>` so tests can swap in a fake
//! without needing the pdfium library.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use image::DynamicImage;
use pdfium_render::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

pub mod encode;

pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// pdfium accepts the `%PDF` marker anywhere in the leading kilobyte.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Transport-ready first page of a resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub media_type: String,
    /// Standard base64 of the encoded image bytes.
    pub data: String,
}

impl ImagePayload {
    pub fn jpeg(data: String) -> Self {
        Self {
            media_type: JPEG_MEDIA_TYPE.to_string(),
            data,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("No file uploaded")]
    Empty,

    #[error("file is not a PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    #[error("failed to bind to pdfium library: {0}")]
    Binding(String),

    #[error("unable to read PDF: {0}")]
    Corrupt(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("failed to render first page: {0}")]
    Render(String),

    #[error("failed to encode page image: {0}")]
    Encode(String),

    #[error("conversion task failed: {0}")]
    Task(String),
}

/// Turns uploaded PDF bytes into an image of the first page.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, pdf: Bytes) -> Result<ImagePayload, ConversionError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PdfiumConverter — default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Rasterises with pdfium. The library is bound per conversion, on a
/// blocking-pool thread.
pub struct PdfiumConverter {
    library_dir: Option<PathBuf>,
    target_width: i32,
    max_height: i32,
}

impl PdfiumConverter {
    pub fn new(library_dir: Option<PathBuf>, target_width: i32, max_height: i32) -> Self {
        Self {
            library_dir,
            target_width,
            max_height,
        }
    }
}

#[async_trait]
impl Converter for PdfiumConverter {
    async fn convert(&self, pdf: Bytes) -> Result<ImagePayload, ConversionError> {
        check_pdf_header(&pdf)?;

        let library_dir = self.library_dir.clone();
        let target_width = self.target_width;
        let max_height = self.max_height;

        tokio::task::spawn_blocking(move || {
            let page =
                render_first_page(&pdf, library_dir.as_deref(), target_width, max_height)?;
            encode::encode_jpeg(&page)
        })
        .await
        .map_err(|e| ConversionError::Task(e.to_string()))?
    }
}

/// Cheap checks that need no pdfium: content present and a `%PDF` marker
/// within the leading kilobyte.
pub fn check_pdf_header(pdf: &[u8]) -> Result<(), ConversionError> {
    if pdf.is_empty() {
        return Err(ConversionError::Empty);
    }
    let window = &pdf[..pdf.len().min(HEADER_SEARCH_WINDOW)];
    if !window.windows(4).any(|w| w == b"%PDF") {
        return Err(ConversionError::NotAPdf {
            magic: pdf.iter().take(4).copied().collect(),
        });
    }
    Ok(())
}

fn bind_pdfium(library_dir: Option<&Path>) -> Result<Pdfium, ConversionError> {
    let bindings = match library_dir {
        Some(dir) => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ConversionError::Binding(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

fn render_first_page(
    pdf: &[u8],
    library_dir: Option<&Path>,
    target_width: i32,
    max_height: i32,
) -> Result<DynamicImage, ConversionError> {
    let pdfium = bind_pdfium(library_dir)?;

    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| ConversionError::Corrupt(format!("{e:?}")))?;

    let pages = document.pages();
    let total_pages = pages.len();
    if total_pages == 0 {
        return Err(ConversionError::NoPages);
    }
    info!("PDF loaded: {} pages, rendering page 1", total_pages);

    let page = pages
        .first()
        .map_err(|e| ConversionError::Render(format!("{e:?}")))?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(target_width)
        .set_maximum_height(max_height);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| ConversionError::Render(format!("{e:?}")))?;

    let image = bitmap.as_image();
    debug!("Rendered page 1 → {}x{} px", image.width(), image.height());

    Ok(image)
}
