pub mod loader;
pub mod render;

use crate::error::{ViewerError, ViewerResult};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};

/// Mantiene viva la instancia de PDFium mientras haya documentos abiertos.
pub struct PdfSystem {
    library: Pdfium,
}

impl PdfSystem {
    /// Enlaza dinámicamente con la DLL que descargó build.rs.
    /// Buscamos junto al ejecutable, luego en el directorio actual y por
    /// último en las rutas del sistema.
    pub fn new() -> ViewerResult<Self> {
        for dir in Self::search_dirs() {
            let path = Pdfium::pdfium_platform_library_name_at_path(&dir);
            if !path.exists() {
                continue;
            }
            match Pdfium::bind_to_library(&path) {
                Ok(bindings) => {
                    log::debug!("PDFium enlazado desde {:?}", path);
                    return Ok(Self { library: Pdfium::new(bindings) });
                }
                Err(e) => log::warn!("No se pudo enlazar {:?}: {:?}", path, e),
            }
        }

        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| ViewerError::PdfiumUnavailable(format!("{:?}", e)))?;
        Ok(Self { library: Pdfium::new(bindings) })
    }

    fn search_dirs() -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            dirs.push(dir);
        }
        if let Ok(cwd) = std::env::current_dir() {
            dirs.push(cwd);
        }
        dirs
    }

    /// Abre un archivo PDF desde el disco.
    /// El documento libera su memoria al salir de ámbito.
    pub fn open_file(&self, path: &Path) -> ViewerResult<PdfDocument<'_>> {
        Ok(self.library.load_pdf_from_file(path, None)?)
    }
}
