//! Modelo del visor, independiente de la GPU.
//!
//! Guarda el estado de carga, un slot por página pedida, el scroll y el botón
//! de descarga. Produce el layout y el lote de quads de cada frame.

use crate::config::ViewerConfig;
use crate::gpu::quad::{Color, QuadBatch, TextureSlot};
use crate::layout::{self, Rect, ViewerBody, ViewerLayout, PLACEHOLDER_ASPECT, STATUS_ICON_SIZE, STATUS_LINE_HEIGHT};
use crate::load::{LoadOutcome, LoadState, PageRequest};
use crate::ui::text::{TextRun, BUTTON_FONT_SIZE, STATUS_FONT_SIZE};
use crate::ui::UiState;

pub const BODY_BACKGROUND: u32 = 0xf0f2f5;
pub const VIEWER_BACKGROUND: u32 = 0xe9e9e9;
pub const VIEWER_BORDER_COLOR: u32 = 0xd1d1d1;
pub const SCROLLBAR_TRACK: u32 = 0xf1f1f1;
pub const SCROLLBAR_THUMB: u32 = 0x888888;
pub const STATUS_COLOR: u32 = 0x555555;
pub const ERROR_COLOR: u32 = 0xd93025;

pub const LINE_SCROLL: f32 = 40.0;
const SHADOW_SPREAD: f32 = 2.0;
const BUTTON_ICON_SIZE: f32 = 18.0;
const BUTTON_PADDING_X: f32 = 14.0;
const BUTTON_ICON_GAP: f32 = 8.0;
const BUTTON_TEXT_COLOR: u32 = 0xffffff;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageSlot {
    Pending,
    Rendered { width: u32, height: u32 },
    Failed,
}

impl PageSlot {
    pub fn aspect(&self) -> f32 {
        match *self {
            PageSlot::Rendered { width, height } if width > 0 => height as f32 / width as f32,
            _ => PLACEHOLDER_ASPECT,
        }
    }
}

pub struct ViewerModel {
    pub config: ViewerConfig,
    pub load: LoadState,
    pub ui: UiState,
    pages: Vec<PageSlot>,
    scroll: f32,
}

impl ViewerModel {
    pub fn new(config: ViewerConfig) -> Self {
        let ui = UiState::new(config.download_label.clone());
        Self {
            config,
            load: LoadState::Idle,
            ui,
            pages: Vec::new(),
            scroll: 0.0,
        }
    }

    /// Resultado terminal de la carga. Con éxito se crea un slot por página.
    pub fn on_document(&mut self, outcome: LoadOutcome) -> bool {
        let changed = self.load.apply(outcome);
        if changed {
            self.pages = vec![PageSlot::Pending; self.load.page_requests().len()];
        }
        changed
    }

    /// Marca la página como rasterizada. Devuelve el índice del slot,
    /// o `None` si la petición no corresponde a ninguno.
    pub fn on_page_rendered(&mut self, request: PageRequest, width: u32, height: u32) -> Option<usize> {
        let slot = self.slot_mut(request)?;
        *slot = PageSlot::Rendered { width, height };
        Some(request.index() as usize)
    }

    /// Los fallos por página solo se registran; el contenedor mantiene el placeholder.
    pub fn on_page_failed(&mut self, request: PageRequest, message: &str) {
        log::warn!("No se pudo renderizar la página {}: {}", request.page_number, message);
        if let Some(slot) = self.slot_mut(request) {
            *slot = PageSlot::Failed;
        }
    }

    fn slot_mut(&mut self, request: PageRequest) -> Option<&mut PageSlot> {
        if request.page_number == 0 {
            return None;
        }
        self.pages.get_mut(request.index() as usize)
    }

    pub fn pages(&self) -> &[PageSlot] {
        &self.pages
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Mensaje del contenedor mientras no hay páginas.
    pub fn status_message(&self) -> Option<(&str, u32)> {
        match self.load {
            LoadState::Idle => Some((self.config.loading_message.as_str(), STATUS_COLOR)),
            LoadState::Failed { .. } => Some((self.config.error_message.as_str(), ERROR_COLOR)),
            LoadState::Loaded { .. } => None,
        }
    }

    pub fn title(&self) -> &str {
        match self.load {
            LoadState::Idle => &self.config.loading_message,
            LoadState::Loaded { .. } => &self.config.window_title,
            LoadState::Failed { .. } => &self.config.error_message,
        }
    }

    pub fn layout(&self, width: f32, height: f32) -> ViewerLayout {
        let aspects: Vec<f32> = self.pages.iter().map(PageSlot::aspect).collect();
        let body = if self.load.is_loaded() {
            ViewerBody::Pages(&aspects)
        } else {
            ViewerBody::Status
        };
        layout::compute(width, height, self.load.is_loaded(), body, self.scroll)
    }

    /// Desplaza y recorta al rango válido del layout actual.
    pub fn scroll_by(&mut self, delta: f32, width: f32, height: f32) {
        self.scroll += delta;
        self.clamp_scroll(width, height);
    }

    pub fn scroll_to(&mut self, offset: f32, width: f32, height: f32) {
        self.scroll = offset;
        self.clamp_scroll(width, height);
    }

    pub fn clamp_scroll(&mut self, width: f32, height: f32) {
        self.scroll = self.layout(width, height).scroll;
    }

    /// Construye el frame completo en un lote de quads.
    pub fn draw(&self, layout: &ViewerLayout, batch: &mut QuadBatch) {
        // 1. Barra superior con el botón de descarga
        if let Some(button) = layout.download_button {
            let (rect, color) = self.ui.button_appearance(button);
            batch.fill(rect.offset(0.0, 2.0), Color::hex_alpha(0x000000, 0.2), None);
            batch.fill(rect, Color::hex(color), None);
            let icon = Rect::new(
                rect.x + BUTTON_PADDING_X,
                rect.y + (rect.h - BUTTON_ICON_SIZE) / 2.0,
                BUTTON_ICON_SIZE,
                BUTTON_ICON_SIZE,
            );
            batch.textured(icon, TextureSlot::DownloadIcon, Color::WHITE, None);

            let label_x = icon.right() + BUTTON_ICON_GAP;
            batch.text(TextRun {
                text: self.ui.download_label.clone(),
                bounds: Rect::new(label_x, rect.y, (rect.right() - BUTTON_PADDING_X - label_x).max(0.0), rect.h),
                size: BUTTON_FONT_SIZE,
                color: BUTTON_TEXT_COLOR,
                clip: Some(rect),
            });
        }

        // 2. Contenedor
        batch.fill(layout.viewer, Color::hex(VIEWER_BORDER_COLOR), None);
        batch.fill(layout.viewport, Color::hex(VIEWER_BACKGROUND), None);

        // 3. Mensaje de estado o páginas
        if let (Some(status), Some((message, color))) = (layout.status, self.status_message()) {
            let slot = if self.load.is_failed() {
                TextureSlot::ErrorIcon
            } else {
                TextureSlot::LoadingIcon
            };
            let side = STATUS_ICON_SIZE.min(status.w).min(status.h);
            let icon = Rect::new(status.x + (status.w - side) / 2.0, status.y, side, side);
            batch.textured(icon, slot, Color::hex(color), Some(layout.viewport));

            batch.text(TextRun {
                text: message.to_string(),
                bounds: Rect::new(status.x, status.bottom() - STATUS_LINE_HEIGHT, status.w, STATUS_LINE_HEIGHT),
                size: STATUS_FONT_SIZE,
                color,
                clip: Some(layout.viewport),
            });
        }

        let clip = Some(layout.viewport);
        for (index, (rect, slot)) in layout.pages.iter().zip(&self.pages).enumerate() {
            let shadow = Rect::new(rect.x, rect.y + SHADOW_SPREAD, rect.w, rect.h);
            batch.fill(shadow, Color::hex_alpha(0x000000, 0.1), clip);
            match slot {
                PageSlot::Rendered { .. } => batch.textured(*rect, TextureSlot::Page(index), Color::WHITE, clip),
                PageSlot::Pending | PageSlot::Failed => batch.fill(*rect, Color::WHITE, clip),
            }
        }

        // 4. Scrollbar
        if let Some(bar) = &layout.scrollbar {
            batch.fill(bar.track, Color::hex(SCROLLBAR_TRACK), clip);
            batch.fill(bar.thumb, Color::hex(SCROLLBAR_THUMB), clip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(pages: u16) -> ViewerModel {
        let mut model = ViewerModel::new(ViewerConfig::default());
        model.on_document(LoadOutcome::Success { page_count: pages });
        model
    }

    #[test]
    fn slots_follow_page_count() {
        let model = loaded(4);
        assert_eq!(model.pages().len(), 4);
        assert!(model.pages().iter().all(|s| *s == PageSlot::Pending));
    }

    #[test]
    fn rendered_page_updates_aspect() {
        let mut model = loaded(2);
        assert_eq!(model.on_page_rendered(PageRequest::new(2), 100, 200), Some(1));
        assert_eq!(model.pages()[1].aspect(), 2.0);
        assert_eq!(model.pages()[0].aspect(), PLACEHOLDER_ASPECT);
    }

    #[test]
    fn out_of_range_pages_are_ignored() {
        let mut model = loaded(1);
        assert_eq!(model.on_page_rendered(PageRequest::new(5), 10, 10), None);
        assert_eq!(model.on_page_rendered(PageRequest::new(0), 10, 10), None);
        model.on_page_failed(PageRequest::new(9), "nope");
        assert_eq!(model.pages(), &[PageSlot::Pending]);
    }

    #[test]
    fn failed_page_keeps_placeholder() {
        let mut model = loaded(1);
        model.on_page_failed(PageRequest::new(1), "corrupt");
        assert_eq!(model.pages()[0], PageSlot::Failed);
        assert_eq!(model.pages()[0].aspect(), PLACEHOLDER_ASPECT);
    }

    #[test]
    fn title_tracks_state() {
        let mut model = ViewerModel::new(ViewerConfig::default());
        assert_eq!(model.title(), crate::config::LOADING_MESSAGE);
        model.on_document(LoadOutcome::Error { message: "x".into() });
        assert_eq!(model.title(), crate::config::ERROR_MESSAGE);
    }

    #[test]
    fn scroll_is_clamped() {
        let mut model = loaded(5);
        model.scroll_by(-100.0, 1200.0, 800.0);
        assert_eq!(model.scroll(), 0.0);
        model.scroll_by(1.0e9, 1200.0, 800.0);
        let max = model.layout(1200.0, 800.0).max_scroll;
        assert!(max > 0.0);
        assert_eq!(model.scroll(), max);
        model.scroll_to(LINE_SCROLL, 1200.0, 800.0);
        assert_eq!(model.scroll(), LINE_SCROLL);
    }

    #[test]
    fn draw_uses_page_textures_only_when_rendered() {
        let mut model = loaded(3);
        model.on_page_rendered(PageRequest::new(1), 100, 141);

        let layout = model.layout(1200.0, 800.0);
        let mut batch = QuadBatch::new(1200.0, 800.0);
        model.draw(&layout, &mut batch);

        let page_calls: Vec<_> = batch
            .calls
            .iter()
            .filter(|c| matches!(c.texture, TextureSlot::Page(_)))
            .collect();
        assert_eq!(page_calls.len(), 1);
        assert_eq!(page_calls[0].texture, TextureSlot::Page(0));
        assert!(batch.calls.iter().any(|c| c.texture == TextureSlot::DownloadIcon));
    }

    #[test]
    fn failed_load_draws_error_icon_without_button() {
        let mut model = ViewerModel::new(ViewerConfig::default());
        model.on_document(LoadOutcome::Error { message: "missing".into() });

        let layout = model.layout(1200.0, 800.0);
        let mut batch = QuadBatch::new(1200.0, 800.0);
        model.draw(&layout, &mut batch);

        assert!(batch.calls.iter().any(|c| c.texture == TextureSlot::ErrorIcon));
        assert!(!batch.calls.iter().any(|c| c.texture == TextureSlot::DownloadIcon));
        assert!(layout.pages.is_empty());

        // El mensaje localizado va dentro del contenedor, en rojo, y nada más.
        assert_eq!(batch.texts.len(), 1);
        let run = &batch.texts[0];
        assert_eq!(run.text, crate::config::ERROR_MESSAGE);
        assert_eq!(run.color, ERROR_COLOR);
        let status = layout.status.unwrap();
        assert!(run.bounds.y >= status.y && run.bounds.bottom() <= status.bottom());
        assert!(!batch.text_runs().any(|t| t == crate::config::DOWNLOAD_LABEL));
    }

    #[test]
    fn loading_message_shown_while_idle() {
        let model = ViewerModel::new(ViewerConfig::default());
        let layout = model.layout(1200.0, 800.0);
        let mut batch = QuadBatch::new(1200.0, 800.0);
        model.draw(&layout, &mut batch);

        assert_eq!(batch.text_runs().collect::<Vec<_>>(), vec![crate::config::LOADING_MESSAGE]);
        assert_eq!(batch.texts[0].color, STATUS_COLOR);
    }

    #[test]
    fn download_button_carries_its_label() {
        let model = loaded(1);
        let layout = model.layout(1200.0, 800.0);
        let mut batch = QuadBatch::new(1200.0, 800.0);
        model.draw(&layout, &mut batch);

        let button = layout.download_button.unwrap();
        assert_eq!(batch.texts.len(), 1);
        let run = &batch.texts[0];
        assert_eq!(run.text, crate::config::DOWNLOAD_LABEL);
        assert!(run.bounds.x > button.x && run.bounds.right() <= button.right());
        assert_eq!(run.bounds.y, button.y);
        assert!(model.status_message().is_none());
    }
}
