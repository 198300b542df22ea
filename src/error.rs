use pdfium_render::prelude::PdfiumError;
use thiserror::Error;

/// Errores del visor.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// No se encontró la librería dinámica de PDFium.
    #[error("no se pudo cargar PDFium: {0}")]
    PdfiumUnavailable(String),

    /// Error devuelto por PDFium al abrir o rasterizar.
    #[error("error de PDFium: {0}")]
    Pdf(String),

    #[error("error de E/S: {0}")]
    Io(#[from] std::io::Error),

    /// Archivo de fuente ilegible.
    #[error("fuente inválida: {0}")]
    Font(String),

    /// Fallo al crear superficie, adaptador o dispositivo.
    #[error("error de GPU: {0}")]
    Gpu(String),
}

pub type ViewerResult<T> = Result<T, ViewerError>;

impl From<PdfiumError> for ViewerError {
    fn from(e: PdfiumError) -> Self {
        ViewerError::Pdf(format!("{:?}", e))
    }
}
