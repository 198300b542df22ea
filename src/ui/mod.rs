pub mod assets;
pub mod text;

use crate::layout::Rect;

pub const BUTTON_COLOR: u32 = 0x222222;
pub const BUTTON_HOVER_COLOR: u32 = 0x777777;
pub const BUTTON_HOVER_SCALE: f32 = 1.05;

/// Acción resultante de un click en la UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Download,
}

/// Estado del botón de descarga. Solo existe en pantalla con el documento cargado;
/// el layout decide dónde va y aquí se guarda el hover.
#[derive(Debug, Default)]
pub struct UiState {
    pub download_label: String,
    pub button_hovered: bool,
    cursor: Option<(f32, f32)>,
}

impl UiState {
    pub fn new(download_label: impl Into<String>) -> Self {
        Self {
            download_label: download_label.into(),
            ..Default::default()
        }
    }

    /// Actualiza el cursor (píxeles lógicos). Devuelve `true` si cambió el hover.
    pub fn cursor_moved(&mut self, x: f32, y: f32, button: Option<Rect>) -> bool {
        self.cursor = Some((x, y));
        self.refresh_hover(button)
    }

    pub fn cursor_left(&mut self) -> bool {
        self.cursor = None;
        self.refresh_hover(None)
    }

    /// Recalcula el hover tras un cambio de layout (p. ej. aparece el botón).
    pub fn refresh_hover(&mut self, button: Option<Rect>) -> bool {
        let hovered = match (self.cursor, button) {
            (Some((x, y)), Some(rect)) => rect.contains(x, y),
            _ => false,
        };
        let changed = hovered != self.button_hovered;
        self.button_hovered = hovered;
        changed
    }

    // Detectar clicks en la UI
    // Retorna la acción si el click fue sobre el botón
    pub fn hit_test(&self, button: Option<Rect>) -> Option<UiAction> {
        let (x, y) = self.cursor?;
        let rect = button?;
        if rect.contains(x, y) {
            log::info!("UI: {}", self.download_label);
            Some(UiAction::Download)
        } else {
            None
        }
    }

    /// Rectángulo y color del botón tal como se dibuja este frame.
    pub fn button_appearance(&self, button: Rect) -> (Rect, u32) {
        if self.button_hovered {
            (button.scaled(BUTTON_HOVER_SCALE), BUTTON_HOVER_COLOR)
        } else {
            (button, BUTTON_COLOR)
        }
    }
}
