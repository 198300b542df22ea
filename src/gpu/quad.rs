//! Lote de quads texturizados para un frame.
//!
//! Todo se dibuja como rectángulos: las páginas con su textura, y los paneles
//! lisos con una textura blanca de 1x1 teñida por el color del vértice.
//! Las posiciones llegan en píxeles lógicos y se convierten a NDC aquí.
//! El texto se encola aparte: su tamaño depende de la fuente, y la capa GPU
//! lo coloca y lo añade como quads al final del lote.

use crate::layout::Rect;
use crate::ui::text::TextRun;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Color en espacio lineal, listo para una superficie sRGB.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Color = Color([1.0, 1.0, 1.0, 1.0]);

    /// `0xRRGGBB` en sRGB, como en CSS.
    pub fn hex(rgb: u32) -> Color {
        Self::hex_alpha(rgb, 1.0)
    }

    pub fn hex_alpha(rgb: u32, alpha: f32) -> Color {
        let channel = |shift: u32| srgb_to_linear(((rgb >> shift) & 0xff) as f32 / 255.0);
        Color([channel(16), channel(8), channel(0), alpha])
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.0;
        wgpu::Color { r: r as f64, g: g as f64, b: b as f64, a: a as f64 }
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Qué textura usa una llamada de dibujo.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    White,
    Page(usize),
    DownloadIcon,
    LoadingIcon,
    ErrorIcon,
    /// Línea de texto rasterizada; índice en `QuadBatch::texts`.
    Text(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub texture: TextureSlot,
    pub clip: Option<Rect>,
    pub first_index: u32,
    pub index_count: u32,
}

#[derive(Debug, Default)]
pub struct QuadBatch {
    viewport: (f32, f32),
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub calls: Vec<DrawCall>,
    pub texts: Vec<TextRun>,
}

impl QuadBatch {
    /// `width` y `height`: tamaño lógico de la ventana.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: (width.max(1.0), height.max(1.0)),
            ..Default::default()
        }
    }

    pub fn fill(&mut self, rect: Rect, color: Color, clip: Option<Rect>) {
        self.push(rect, TextureSlot::White, color, clip);
    }

    pub fn textured(&mut self, rect: Rect, texture: TextureSlot, tint: Color, clip: Option<Rect>) {
        self.push(rect, texture, tint, clip);
    }

    pub fn text(&mut self, run: TextRun) {
        if run.text.is_empty() {
            return;
        }
        if let Some(clip) = run.clip {
            if !run.bounds.intersects(&clip) {
                return;
            }
        }
        self.texts.push(run);
    }

    fn push(&mut self, rect: Rect, texture: TextureSlot, color: Color, clip: Option<Rect>) {
        if rect.w <= 0.0 || rect.h <= 0.0 {
            return;
        }
        if let Some(clip) = clip {
            if !rect.intersects(&clip) {
                return;
            }
        }

        let base = self.vertices.len() as u32;
        let (l, t) = self.to_ndc(rect.x, rect.y);
        let (r, b) = self.to_ndc(rect.right(), rect.bottom());
        let color = color.0;
        self.vertices.extend_from_slice(&[
            Vertex { position: [l, t], tex_coords: [0.0, 0.0], color },
            Vertex { position: [l, b], tex_coords: [0.0, 1.0], color },
            Vertex { position: [r, b], tex_coords: [1.0, 1.0], color },
            Vertex { position: [r, t], tex_coords: [1.0, 0.0], color },
        ]);

        let first_index = self.indices.len() as u32;
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);

        // Quads consecutivos con la misma textura y recorte comparten llamada.
        match self.calls.last_mut() {
            Some(last) if last.texture == texture && last.clip == clip => last.index_count += 6,
            _ => self.calls.push(DrawCall { texture, clip, first_index, index_count: 6 }),
        }
    }

    fn to_ndc(&self, x: f32, y: f32) -> (f32, f32) {
        let (w, h) = self.viewport;
        (x / w * 2.0 - 1.0, 1.0 - y / h * 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn text_runs(&self) -> impl Iterator<Item = &str> {
        self.texts.iter().map(|run| run.text.as_str())
    }
}

/// Rectángulo de recorte en píxeles físicos, dentro del render target.
/// `None` si queda vacío.
pub fn scissor_rect(clip: Rect, scale_factor: f32, target: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    let x0 = (clip.x * scale_factor).floor().max(0.0) as u32;
    let y0 = (clip.y * scale_factor).floor().max(0.0) as u32;
    let x1 = ((clip.right() * scale_factor).ceil().max(0.0) as u32).min(target.0);
    let y1 = ((clip.bottom() * scale_factor).ceil().max(0.0) as u32).min(target.1);
    (x1 > x0 && y1 > y0).then(|| (x0, y0, x1 - x0, y1 - y0))
}
