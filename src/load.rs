//! Máquina de estados de carga del documento y derivación de la lista de páginas.
//!
//! `Idle` es el estado inicial. `Loaded` y `Failed` son terminales: el
//! documento es fijo, así que nunca se vuelve a pedir.

/// Resultado terminal de la carga del documento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Success { page_count: u16 },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loaded {
        page_count: u16,
    },
    Failed {
        message: String,
    },
}

impl LoadState {
    /// Aplica un resultado. Devuelve `true` si hubo transición.
    /// Desde un estado terminal el resultado se ignora.
    pub fn apply(&mut self, outcome: LoadOutcome) -> bool {
        match self {
            LoadState::Idle => {
                *self = match outcome {
                    LoadOutcome::Success { page_count } => {
                        log::info!("Documento cargado: {} páginas", page_count);
                        LoadState::Loaded { page_count }
                    }
                    LoadOutcome::Error { message } => {
                        log::error!("PDF 문서를 불러오는 데 실패했습니다: {}", message);
                        LoadState::Failed { message }
                    }
                };
                true
            }
            _ => {
                log::warn!("Resultado de carga ignorado en estado terminal: {:?}", outcome);
                false
            }
        }
    }

    pub fn page_count(&self) -> Option<u16> {
        match self {
            LoadState::Loaded { page_count } => Some(*page_count),
            _ => None,
        }
    }

    /// La descarga solo se ofrece con el documento cargado.
    pub fn is_loaded(&self) -> bool {
        self.page_count().is_some()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed { .. })
    }

    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.page_count().map(page_requests).unwrap_or_default()
    }
}

/// Petición declarativa para rasterizar una página (numerada desde 1).
/// Anotaciones y capa de texto van siempre desactivadas: solo queremos la imagen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u16,
    pub render_annotations: bool,
    pub render_text_layer: bool,
}

impl PageRequest {
    pub fn new(page_number: u16) -> Self {
        Self {
            page_number,
            render_annotations: false,
            render_text_layer: false,
        }
    }

    /// Índice base 0 que espera PDFium.
    pub fn index(&self) -> u16 {
        self.page_number.saturating_sub(1)
    }
}

/// Páginas 1..=n en orden ascendente.
pub fn page_requests(page_count: u16) -> Vec<PageRequest> {
    (1..=page_count).map(PageRequest::new).collect()
}
