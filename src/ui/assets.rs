use image::{Rgba, RgbaImage};

const OPAQUE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Iconos procedurales en blanco; se tiñen con el color del vértice al dibujar.
pub struct IconGenerator;

impl IconGenerator {
    /// Flecha hacia abajo sobre una bandeja.
    pub fn generate_download_icon(size: u32) -> RgbaImage {
        let s = size as f32;
        let center = s / 2.0;
        let stroke = (s * 0.06).max(1.5);

        RgbaImage::from_fn(size, size, |x, y| {
            let (x, y) = (x as f32 + 0.5, y as f32 + 0.5);

            // Astil
            let shaft = (x - center).abs() < stroke && y > s * 0.15 && y < s * 0.62;
            // Punta en V
            let head = y > s * 0.35 && y < s * 0.68 && ((x - center).abs() - (s * 0.66 - y)).abs() < stroke;
            // Bandeja
            let tray_base = (y - s * 0.82).abs() < stroke && x > s * 0.18 && x < s * 0.82;
            let tray_sides = y > s * 0.66 && y < s * 0.82 && ((x - s * 0.18).abs() < stroke || (x - s * 0.82).abs() < stroke);

            if shaft || head || tray_base || tray_sides {
                OPAQUE
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    /// Tres puntos: "cargando".
    pub fn generate_loading_icon(size: u32) -> RgbaImage {
        let s = size as f32;
        let radius = s * 0.09;
        let centers = [s * 0.25, s * 0.5, s * 0.75];

        RgbaImage::from_fn(size, size, |x, y| {
            let (x, y) = (x as f32 + 0.5, y as f32 + 0.5);
            let hit = centers.iter().any(|cx| {
                let dx = x - cx;
                let dy = y - s * 0.5;
                dx * dx + dy * dy <= radius * radius
            });
            if hit {
                OPAQUE
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    /// Círculo con una X: error de carga.
    pub fn generate_error_icon(size: u32) -> RgbaImage {
        let s = size as f32;
        let center = s / 2.0;
        let radius = s * 0.4;
        let stroke = (s * 0.05).max(1.5);

        RgbaImage::from_fn(size, size, |x, y| {
            let (x, y) = (x as f32 + 0.5, y as f32 + 0.5);
            let dx = x - center;
            let dy = y - center;
            let ring = ((dx * dx + dy * dy).sqrt() - radius).abs() < stroke;
            let inside = dx.abs() < radius * 0.5 && dy.abs() < radius * 0.5;
            let cross = inside && ((dx - dy).abs() < stroke || (dx + dy).abs() < stroke);
            if ring || cross {
                OPAQUE
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    /// Textura blanca de 1x1 para paneles lisos.
    pub fn white_pixel() -> RgbaImage {
        RgbaImage::from_pixel(1, 1, OPAQUE)
    }
}
