//! Geometría de la página del visor, en píxeles lógicos.
//!
//! Columna centrada: barra superior con el botón de descarga (solo con el
//! documento cargado) y debajo el contenedor con scroll vertical que apila
//! las páginas ajustadas a su ancho.

pub const BODY_PADDING_TOP: f32 = 30.0;
pub const BODY_PADDING_X: f32 = 20.0;
pub const COLUMN_GAP: f32 = 20.0;
pub const COLUMN_WIDTH_RATIO: f32 = 0.9;
pub const COLUMN_MAX_WIDTH: f32 = 900.0;
pub const VIEWER_MAX_HEIGHT_RATIO: f32 = 0.85;
pub const VIEWER_BORDER: f32 = 1.0;
pub const TOP_BAR_HEIGHT: f32 = 40.0;
pub const TOP_BAR_MARGIN_BOTTOM: f32 = -10.0;
pub const BUTTON_WIDTH: f32 = 190.0;
pub const PAGE_MARGIN_BOTTOM: f32 = 20.0;
pub const SCROLLBAR_WIDTH: f32 = 10.0;
pub const SCROLLBAR_MIN_THUMB: f32 = 24.0;
pub const STATUS_PADDING: f32 = 40.0;
pub const STATUS_LINE_HEIGHT: f32 = 24.0;
pub const STATUS_ICON_SIZE: f32 = 24.0;
pub const STATUS_ICON_GAP: f32 = 8.0;

/// Proporción A4 para páginas aún sin rasterizar.
pub const PLACEHOLDER_ASPECT: f32 = std::f32::consts::SQRT_2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn inset(&self, amount: f32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            (self.w - 2.0 * amount).max(0.0),
            (self.h - 2.0 * amount).max(0.0),
        )
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Escala desde el centro.
    pub fn scaled(&self, factor: f32) -> Rect {
        let w = self.w * factor;
        let h = self.h * factor;
        Rect::new(self.x - (w - self.w) / 2.0, self.y - (h - self.h) / 2.0, w, h)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }
}

/// Contenido del contenedor del visor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerBody<'a> {
    /// Mensaje de estado (cargando o error) en lugar de las páginas.
    Status,
    /// Proporciones alto/ancho de cada página, en orden.
    Pages(&'a [f32]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scrollbar {
    pub track: Rect,
    pub thumb: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerLayout {
    /// Alineado a la derecha de la barra superior; solo con el documento cargado.
    pub download_button: Option<Rect>,
    pub viewer: Rect,
    /// Zona visible dentro del borde; recorta las páginas.
    pub viewport: Rect,
    /// Contenedores de página en coordenadas de ventana, ya desplazados.
    pub pages: Vec<Rect>,
    /// Icono arriba y una línea de mensaje abajo.
    pub status: Option<Rect>,
    pub scrollbar: Option<Scrollbar>,
    pub scroll: f32,
    pub max_scroll: f32,
}

pub fn column_width(window_width: f32) -> f32 {
    (window_width * COLUMN_WIDTH_RATIO)
        .min(COLUMN_MAX_WIDTH)
        .min(window_width - 2.0 * BODY_PADDING_X)
        .max(0.0)
}

/// Calcula el layout completo. `scroll` se recorta al rango válido.
pub fn compute(window_width: f32, window_height: f32, show_download: bool, body: ViewerBody<'_>, scroll: f32) -> ViewerLayout {
    let width = column_width(window_width);
    let x = (window_width - width) / 2.0;
    let mut y = BODY_PADDING_TOP;

    // 1. Barra superior: transparente, solo ocupa espacio y alinea el botón
    let download_button = show_download.then(|| {
        let button_w = BUTTON_WIDTH.min(width);
        let button = Rect::new(x + width - button_w, y, button_w, TOP_BAR_HEIGHT);
        y += TOP_BAR_HEIGHT + TOP_BAR_MARGIN_BOTTOM + COLUMN_GAP;
        button
    });

    // 2. Altura del contenido
    let inner_width = (width - 2.0 * VIEWER_BORDER).max(0.0);
    let content_height = match body {
        ViewerBody::Status => 2.0 * STATUS_PADDING + STATUS_ICON_SIZE + STATUS_ICON_GAP + STATUS_LINE_HEIGHT,
        ViewerBody::Pages(aspects) => aspects
            .iter()
            .map(|aspect| inner_width * aspect + PAGE_MARGIN_BOTTOM)
            .sum(),
    };

    // 3. Contenedor: crece con el contenido hasta el 85% de la ventana
    let max_height = (window_height * VIEWER_MAX_HEIGHT_RATIO).max(0.0);
    let viewport_height = content_height.min(max_height);
    let viewer = Rect::new(x, y, width, viewport_height + 2.0 * VIEWER_BORDER);
    let viewport = viewer.inset(VIEWER_BORDER);

    let max_scroll = (content_height - viewport_height).max(0.0);
    let scroll = scroll.clamp(0.0, max_scroll);

    // 4. Páginas apiladas y desplazadas
    let mut pages = Vec::new();
    let mut status = None;
    match body {
        ViewerBody::Status => {
            status = Some(viewport.inset(STATUS_PADDING.min(viewport.h / 2.0)));
        }
        ViewerBody::Pages(aspects) => {
            let mut cursor = viewport.y - scroll;
            for aspect in aspects {
                let h = inner_width * aspect;
                pages.push(Rect::new(viewport.x, cursor, inner_width, h));
                cursor += h + PAGE_MARGIN_BOTTOM;
            }
        }
    }

    // 5. Scrollbar, solo si hay desbordamiento
    let scrollbar = (max_scroll > 0.0).then(|| {
        let track = Rect::new(viewport.right() - SCROLLBAR_WIDTH, viewport.y, SCROLLBAR_WIDTH, viewport.h);
        let thumb_h = (track.h * viewport.h / content_height).max(SCROLLBAR_MIN_THUMB).min(track.h);
        let thumb_y = track.y + (track.h - thumb_h) * (scroll / max_scroll);
        Scrollbar {
            track,
            thumb: Rect::new(track.x, thumb_y, SCROLLBAR_WIDTH, thumb_h),
        }
    });

    ViewerLayout {
        download_button,
        viewer,
        viewport,
        pages,
        status,
        scrollbar,
        scroll,
        max_scroll,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_layout_has_no_pages_or_button() {
        let layout = compute(1200.0, 800.0, false, ViewerBody::Status, 0.0);
        assert!(layout.download_button.is_none());
        assert!(layout.pages.is_empty());
        assert!(layout.status.is_some());
        assert_eq!(layout.max_scroll, 0.0);
        assert!(layout.scrollbar.is_none());
    }

    #[test]
    fn status_fits_icon_and_message_line() {
        let layout = compute(1200.0, 800.0, false, ViewerBody::Status, 0.0);
        let status = layout.status.unwrap();
        assert_eq!(status.h, STATUS_ICON_SIZE + STATUS_ICON_GAP + STATUS_LINE_HEIGHT);
        assert_eq!(status.y, layout.viewport.y + STATUS_PADDING);
    }

    #[test]
    fn top_bar_pushes_viewer_down_only_when_loaded() {
        let aspects = [1.4];
        let without = compute(1200.0, 800.0, false, ViewerBody::Pages(&aspects), 0.0);
        let with = compute(1200.0, 800.0, true, ViewerBody::Pages(&aspects), 0.0);
        assert_eq!(without.viewer.y, BODY_PADDING_TOP);
        assert_eq!(
            with.viewer.y,
            BODY_PADDING_TOP + TOP_BAR_HEIGHT + TOP_BAR_MARGIN_BOTTOM + COLUMN_GAP
        );
        assert_eq!(with.download_button.unwrap().y, BODY_PADDING_TOP);
    }

    #[test]
    fn column_is_capped_and_centered() {
        let layout = compute(1200.0, 800.0, false, ViewerBody::Status, 0.0);
        assert_eq!(layout.viewer.w, 900.0);
        assert_eq!(layout.viewer.x, 150.0);

        let narrow = compute(500.0, 800.0, false, ViewerBody::Status, 0.0);
        assert_eq!(narrow.viewer.w, 450.0);
    }

    #[test]
    fn three_pages_stack_in_order() {
        let aspects = [1.0, 1.0, 1.0];
        let layout = compute(1200.0, 800.0, true, ViewerBody::Pages(&aspects), 0.0);

        assert_eq!(layout.pages.len(), 3);
        assert!(layout.download_button.is_some());
        for pair in layout.pages.windows(2) {
            assert!(pair[0].y < pair[1].y);
            assert_eq!(pair[1].y - pair[0].bottom(), PAGE_MARGIN_BOTTOM);
        }
        assert_eq!(layout.pages[0].y, layout.viewport.y);
    }

    #[test]
    fn download_button_sits_above_viewer_right_aligned() {
        let aspects = [1.4];
        let layout = compute(1200.0, 800.0, true, ViewerBody::Pages(&aspects), 0.0);
        let button = layout.download_button.unwrap();
        assert_eq!(button.right(), layout.viewer.right());
        assert!(button.bottom() < layout.viewer.y);
    }

    #[test]
    fn viewer_height_is_capped_and_scroll_clamped() {
        let aspects = [1.4; 4];
        let layout = compute(1200.0, 800.0, true, ViewerBody::Pages(&aspects), 1.0e9);
        assert!(layout.viewport.h <= 800.0 * VIEWER_MAX_HEIGHT_RATIO + 0.01);
        assert!(layout.max_scroll > 0.0);
        assert_eq!(layout.scroll, layout.max_scroll);

        let bar = layout.scrollbar.unwrap();
        assert!((bar.thumb.bottom() - bar.track.bottom()).abs() < 0.01);

        let top = compute(1200.0, 800.0, true, ViewerBody::Pages(&aspects), -50.0);
        assert_eq!(top.scroll, 0.0);
    }

    #[test]
    fn short_content_shrinks_viewer() {
        let aspects = [0.1];
        let layout = compute(1200.0, 800.0, true, ViewerBody::Pages(&aspects), 0.0);
        let expected = (900.0 - 2.0) * 0.1 + PAGE_MARGIN_BOTTOM;
        assert!((layout.viewport.h - expected).abs() < 0.01);
        assert!(layout.scrollbar.is_none());
    }

    #[test]
    fn rect_helpers() {
        let r = Rect::new(10.0, 10.0, 100.0, 40.0);
        assert!(r.contains(50.0, 30.0));
        assert!(!r.contains(5.0, 30.0));
        let s = r.scaled(1.1);
        assert!((s.w - 110.0).abs() < 1e-4);
        assert!((s.x - 5.0).abs() < 1e-4);
        assert!(r.intersects(&Rect::new(100.0, 40.0, 10.0, 10.0)));
        assert!(!r.intersects(&Rect::new(200.0, 40.0, 10.0, 10.0)));
    }
}
