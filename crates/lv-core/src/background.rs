//! Background floor-plan source.
//!
//! The logical coordinate space is fixed by the background's 1× size. A
//! PDF page rasterized at a higher render scale keeps the same logical size,
//! so entity coordinates stay put regardless of raster resolution.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Render scale used when rasterizing PDF pages.
pub const PDF_RENDER_SCALE: f64 = 2.0;

#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("PDF renderer is not available")]
    RendererUnavailable,
    #[error("PDF has no pages")]
    EmptyDocument,
    #[error("PDF rendering failed: {0}")]
    Render(String),
    #[error("unsupported background file type: {0}")]
    UnsupportedType(String),
}

/// A raster produced by an external decoder or renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

/// External PDF rasterizer. Only the first page is ever requested.
pub trait PdfRasterizer {
    fn render_first_page(&self, pdf: &[u8], scale: f64) -> Result<Raster, BackgroundError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    pub data_uri: String,
    pub logical_size: Size,
    pub render_scale: f64,
}

impl Background {
    /// An image decoded at its natural size: logical size equals raster size.
    pub fn from_raster(raster: Raster) -> Self {
        Self {
            logical_size: Size::new(raster.width as f64, raster.height as f64),
            data_uri: raster.data_uri,
            render_scale: 1.0,
        }
    }

    /// Rasterize page one of a PDF at [`PDF_RENDER_SCALE`]. The logical size
    /// is the raster size divided by the render scale.
    pub fn from_pdf_page(
        renderer: Option<&dyn PdfRasterizer>,
        pdf: &[u8],
    ) -> Result<Self, BackgroundError> {
        let renderer = renderer.ok_or(BackgroundError::RendererUnavailable)?;
        let raster = renderer.render_first_page(pdf, PDF_RENDER_SCALE)?;
        log::info!(
            "rasterized PDF page at {}x{} (scale {PDF_RENDER_SCALE})",
            raster.width,
            raster.height
        );
        Ok(Self {
            logical_size: Size::new(
                raster.width as f64 / PDF_RENDER_SCALE,
                raster.height as f64 / PDF_RENDER_SCALE,
            ),
            data_uri: raster.data_uri,
            render_scale: PDF_RENDER_SCALE,
        })
    }
}

/// Kind of background file, judged by extension or MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Image,
    Pdf,
}

impl SourceKind {
    pub fn detect(file_name: &str, mime: &str) -> Result<Self, BackgroundError> {
        let lower = file_name.to_ascii_lowercase();
        if mime == "application/pdf" || lower.ends_with(".pdf") {
            Ok(SourceKind::Pdf)
        } else if mime.starts_with("image/")
            || [".png", ".jpg", ".jpeg", ".gif", ".webp", ".bmp", ".svg"]
                .iter()
                .any(|ext| lower.ends_with(ext))
        {
            Ok(SourceKind::Image)
        } else {
            Err(BackgroundError::UnsupportedType(file_name.to_string()))
        }
    }
}

/// Default project name for a background file: the name minus extension.
pub fn project_name_from_file(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}
