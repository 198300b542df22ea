//! Texto de la interfaz.
//!
//! El modelo solo pide líneas (`TextRun`); la capa GPU las rasteriza con
//! `ab_glyph` a máscaras blancas que se tiñen al dibujar, igual que los iconos.

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, Glyph, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::error::{ViewerError, ViewerResult};
use crate::layout::Rect;

pub const STATUS_FONT_SIZE: f32 = 16.0;
pub const BUTTON_FONT_SIZE: f32 = 14.0;

/// Se comprueba la cobertura de Hangul con este carácter.
const HANGUL_SAMPLE: char = '포';

/// Primero fuentes con Hangul, luego genéricas (el texto latino al menos se ve).
const FONT_CANDIDATES: &[&str] = &[
    "assets/fonts/NotoSansKR-Regular.ttf",
    "C:\\Windows\\Fonts\\malgun.ttf",
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
    "/usr/share/fonts/nanum/NanumGothic.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
];

/// Una línea de texto centrada en `bounds`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub bounds: Rect,
    /// Tamaño en píxeles lógicos.
    pub size: f32,
    pub color: u32,
    pub clip: Option<Rect>,
}

impl TextRun {
    /// Dónde cae una línea ya rasterizada de `width`x`height` (lógicos).
    pub fn placed(&self, width: f32, height: f32) -> Rect {
        Rect::new(
            (self.bounds.x + (self.bounds.w - width) / 2.0).round(),
            (self.bounds.y + (self.bounds.h - height) / 2.0).round(),
            width,
            height,
        )
    }
}

pub struct TextRasterizer {
    // En orden de preferencia; cada carácter usa la primera que lo tenga.
    fonts: Vec<FontVec>,
}

impl TextRasterizer {
    pub fn discover() -> Self {
        Self::from_candidates(FONT_CANDIDATES.iter().map(PathBuf::from))
    }

    /// Carga fuentes en orden hasta encontrar una con Hangul.
    pub fn from_candidates(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut fonts = Vec::new();
        for path in paths {
            if !path.is_file() {
                continue;
            }
            match load_font(&path) {
                Ok(font) => {
                    let hangul = font.glyph_id(HANGUL_SAMPLE).0 != 0;
                    log::debug!("Fuente {:?} cargada (Hangul: {})", path, hangul);
                    fonts.push(font);
                    if hangul {
                        break;
                    }
                }
                Err(e) => log::warn!("{}", e),
            }
        }

        if fonts.is_empty() {
            log::warn!("No se encontró ninguna fuente; los textos del visor no se dibujarán");
        }
        Self { fonts }
    }

    pub fn has_font(&self) -> bool {
        !self.fonts.is_empty()
    }

    /// Máscara blanca con la cobertura en alfa. `px`: tamaño en píxeles físicos.
    pub fn rasterize(&self, text: &str, px: f32) -> Option<RgbaImage> {
        if self.fonts.is_empty() || text.is_empty() || px <= 0.0 {
            return None;
        }

        let scale = PxScale::from(px);
        let ascent = self
            .fonts
            .iter()
            .map(|f| f.as_scaled(scale).ascent())
            .fold(0.0f32, f32::max);
        let descent = self
            .fonts
            .iter()
            .map(|f| f.as_scaled(scale).descent())
            .fold(0.0f32, f32::min);

        // 1. Posicionar
        let mut placed: Vec<(usize, Glyph)> = Vec::new();
        let mut caret = 0.0f32;
        let mut previous: Option<(usize, ab_glyph::GlyphId)> = None;
        for c in text.chars() {
            let index = self.font_for(c);
            let font = self.fonts[index].as_scaled(scale);
            let id = font.glyph_id(c);
            if let Some((prev_index, prev_id)) = previous {
                if prev_index == index {
                    caret += font.kern(prev_id, id);
                }
            }
            placed.push((index, id.with_scale_and_position(scale, point(caret, ascent))));
            caret += font.h_advance(id);
            previous = Some((index, id));
        }

        let width = caret.ceil() as u32;
        let height = (ascent - descent).ceil() as u32;
        if width == 0 || height == 0 {
            return None;
        }

        // 2. Rasterizar
        // Blanco transparente: el filtrado bilineal no oscurece los bordes.
        let mut image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
        for (index, glyph) in placed {
            let Some(outlined) = self.fonts[index].outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, coverage| {
                let px = bounds.min.x as i32 + x as i32;
                let py = bounds.min.y as i32 + y as i32;
                if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                let pixel = image.get_pixel_mut(px as u32, py as u32);
                pixel.0 = [255, 255, 255, pixel.0[3].max(alpha)];
            });
        }
        Some(image)
    }

    fn font_for(&self, c: char) -> usize {
        self.fonts
            .iter()
            .position(|f| f.glyph_id(c).0 != 0)
            .unwrap_or(0)
    }
}

fn load_font(path: &Path) -> ViewerResult<FontVec> {
    let data = std::fs::read(path)?;
    FontVec::try_from_vec_and_index(data, 0).map_err(|e| ViewerError::Font(format!("{:?}: {}", path, e)))
}
