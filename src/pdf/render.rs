use crate::error::ViewerResult;
use crate::load::PageRequest;
use pdfium_render::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBitmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // Bytes crudos BGRA listos para la GPU
}

impl PageBitmap {
    /// Alto / ancho. Lo usa el layout para ajustar la página al ancho del visor.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 {
            return 0.0;
        }
        self.height as f32 / self.width as f32
    }
}

/// Tamaño en píxeles de una página de `width` x `height` puntos a la escala dada,
/// reducido si hace falta para que ningún lado supere `max_side`.
pub fn target_size(width: f32, height: f32, scale_factor: f32, max_side: u32) -> (u32, u32) {
    let mut w = (width * scale_factor).max(1.0);
    let mut h = (height * scale_factor).max(1.0);

    let longest = w.max(h);
    if longest > max_side as f32 {
        let shrink = max_side as f32 / longest;
        w *= shrink;
        h *= shrink;
    }

    (
        (w.floor() as u32).clamp(1, max_side),
        (h.floor() as u32).clamp(1, max_side),
    )
}

/// Rasteriza la página pedida.
/// scale_factor: 1.0 = tamaño original (72 DPI).
pub fn render_page_to_memory(
    document: &PdfDocument,
    request: PageRequest,
    scale_factor: f32,
    max_side: u32,
) -> ViewerResult<PageBitmap> {
    let page = document.pages().get(request.index())?;
    let (width, height) = target_size(page.width().value, page.height().value, scale_factor, max_side);

    // BGRA coincide con wgpu::TextureFormat::Bgra8UnormSrgb, sin conversión.
    // PDFium no genera capa de texto al rasterizar; las anotaciones y los
    // formularios se apagan según la petición.
    let render_config = PdfRenderConfig::new()
        .set_target_width(width as i32)
        .set_target_height(height as i32)
        .set_format(PdfBitmapFormat::BGRA)
        .render_annotations(request.render_annotations)
        .render_form_data(request.render_annotations);

    let bitmap = page.render_with_config(&render_config)?;
    let data = bitmap.as_bytes().to_vec();

    Ok(PageBitmap { width, height, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_a4_page() {
        // A4 = 595 x 842 pt
        assert_eq!(target_size(595.0, 842.0, 3.0, 8192), (1785, 2526));
    }

    #[test]
    fn clamps_to_max_side_keeping_ratio() {
        let (w, h) = target_size(2000.0, 1000.0, 3.0, 4096);
        assert_eq!(w, 4096);
        assert_eq!(h, 2048);
    }

    #[test]
    fn never_returns_zero() {
        assert_eq!(target_size(0.0, 0.0, 3.0, 8192), (1, 1));
    }

    #[test]
    fn aspect_of_bitmap() {
        let bitmap = PageBitmap { width: 100, height: 150, data: vec![] };
        assert!((bitmap.aspect() - 1.5).abs() < f32::EPSILON);
        let empty = PageBitmap { width: 0, height: 0, data: vec![] };
        assert_eq!(empty.aspect(), 0.0);
    }
}
