//! PNG/JPG/PDF export orchestration.
//!
//! Rasterizing the live composition and writing PDFs belong to the host; the
//! editor only sequences the steps. Vector icons are swapped for raster
//! stand-ins before capture and always restored afterwards, whether or not
//! the capture succeeded.

use lv_core::Raster;
use thiserror::Error;

/// Render scale for exported rasters.
pub const EXPORT_RENDER_SCALE: f64 = 2.0;

/// Page background behind transparent regions.
pub const EXPORT_BACKGROUND: &str = "#ffffff";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("canvas capture failed: {0}")]
    Capture(String),
    #[error("PDF writer is not available")]
    PdfUnavailable,
    #[error("PDF generation failed: {0}")]
    Pdf(String),
    #[error("unknown export format: {0}")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpg,
    Pdf,
}

impl ExportFormat {
    pub fn from_name(name: &str) -> Result<Self, ExportError> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpg),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// MIME type the raster is captured as. PDFs embed a PNG.
    pub fn raster_mime(self) -> &'static str {
        match self {
            ExportFormat::Jpg => "image/jpeg",
            ExportFormat::Png | ExportFormat::Pdf => "image/png",
        }
    }
}

/// The host's live canvas composition.
pub trait CaptureSurface {
    /// Replace vector icons with raster equivalents. Returns how many were swapped.
    fn swap_vectors(&mut self) -> Result<usize, ExportError>;
    /// Put the original vector icons back. Must be safe after a partial swap.
    fn restore_vectors(&mut self);
    fn capture(&mut self, mime: &str, scale: f64, background: &str) -> Result<Raster, ExportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Single PDF page sized to the raster, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfPage {
    pub orientation: Orientation,
    pub width: f64,
    pub height: f64,
}

pub trait PdfWriter {
    fn write_single_page(&self, page: PdfPage, raster: &Raster) -> Result<Vec<u8>, ExportError>;
}

pub fn pdf_page_for(raster: &Raster) -> PdfPage {
    PdfPage {
        orientation: if raster.width > raster.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        },
        width: raster.width as f64,
        height: raster.height as f64,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutput {
    Image { file_name: String, data_uri: String },
    Pdf { file_name: String, bytes: Vec<u8> },
}

impl ExportOutput {
    pub fn file_name(&self) -> &str {
        match self {
            ExportOutput::Image { file_name, .. } | ExportOutput::Pdf { file_name, .. } => {
                file_name
            }
        }
    }
}

pub fn export_file_name(project_name: &str, format: ExportFormat) -> String {
    let stem = project_name.trim();
    let stem = if stem.is_empty() { "floor-plan" } else { stem };
    format!("{stem}.{}", format.extension())
}

pub fn export(
    surface: &mut dyn CaptureSurface,
    pdf: Option<&dyn PdfWriter>,
    format: ExportFormat,
    project_name: &str,
) -> Result<ExportOutput, ExportError> {
    if format == ExportFormat::Pdf && pdf.is_none() {
        return Err(ExportError::PdfUnavailable);
    }

    let captured = surface.swap_vectors().and_then(|_| {
        surface.capture(format.raster_mime(), EXPORT_RENDER_SCALE, EXPORT_BACKGROUND)
    });
    surface.restore_vectors();
    let raster = captured?;
    log::info!("captured {}x{} for {} export", raster.width, raster.height, format.extension());

    let file_name = export_file_name(project_name, format);
    match (format, pdf) {
        (ExportFormat::Pdf, Some(writer)) => {
            let bytes = writer.write_single_page(pdf_page_for(&raster), &raster)?;
            Ok(ExportOutput::Pdf { file_name, bytes })
        }
        (ExportFormat::Pdf, None) => Err(ExportError::PdfUnavailable),
        _ => Ok(ExportOutput::Image {
            file_name,
            data_uri: raster.data_uri,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct FakeSurface {
        swapped: bool,
        restores: usize,
        fail_capture: bool,
    }

    impl CaptureSurface for FakeSurface {
        fn swap_vectors(&mut self) -> Result<usize, ExportError> {
            self.swapped = true;
            Ok(3)
        }

        fn restore_vectors(&mut self) {
            self.swapped = false;
            self.restores += 1;
        }

        fn capture(
            &mut self,
            mime: &str,
            scale: f64,
            _background: &str,
        ) -> Result<Raster, ExportError> {
            assert!(self.swapped, "capture must run with vectors swapped");
            if self.fail_capture {
                return Err(ExportError::Capture("tainted canvas".into()));
            }
            Ok(Raster {
                data_uri: format!("data:{mime};base64,AAAA"),
                width: (600.0 * scale) as u32,
                height: (400.0 * scale) as u32,
            })
        }
    }

    struct FakePdf;

    impl PdfWriter for FakePdf {
        fn write_single_page(
            &self,
            page: PdfPage,
            _raster: &Raster,
        ) -> Result<Vec<u8>, ExportError> {
            assert_eq!(page.orientation, Orientation::Landscape);
            assert_eq!((page.width, page.height), (1200.0, 800.0));
            Ok(b"%PDF-1.4".to_vec())
        }
    }

    #[test]
    fn png_export_restores_vectors() {
        let mut surface = FakeSurface::default();
        let out = export(&mut surface, None, ExportFormat::Png, "Office").unwrap();
        assert_eq!(out.file_name(), "Office.png");
        assert!(matches!(
            out,
            ExportOutput::Image { ref data_uri, .. } if data_uri.starts_with("data:image/png")
        ));
        assert_eq!(surface.restores, 1);
        assert!(!surface.swapped);
    }

    #[test]
    fn failed_capture_still_restores() {
        let mut surface = FakeSurface {
            fail_capture: true,
            ..Default::default()
        };
        let err = export(&mut surface, None, ExportFormat::Jpg, "Office").unwrap_err();
        assert!(matches!(err, ExportError::Capture(_)));
        assert_eq!(surface.restores, 1);
    }

    #[test]
    fn pdf_page_matches_raster() {
        let mut surface = FakeSurface::default();
        let out = export(&mut surface, Some(&FakePdf), ExportFormat::Pdf, "").unwrap();
        assert_eq!(out.file_name(), "floor-plan.pdf");

        let portrait = pdf_page_for(&Raster {
            data_uri: String::new(),
            width: 400,
            height: 400,
        });
        assert_eq!(portrait.orientation, Orientation::Portrait);
    }

    #[test]
    fn pdf_without_writer_fails_before_capture() {
        let mut surface = FakeSurface::default();
        let err = export(&mut surface, None, ExportFormat::Pdf, "x").unwrap_err();
        assert!(matches!(err, ExportError::PdfUnavailable));
        assert_eq!(surface.restores, 0);
        assert!(matches!(ExportFormat::from_name("JPEG"), Ok(ExportFormat::Jpg)));
        assert!(ExportFormat::from_name("tiff").is_err());
    }
}
