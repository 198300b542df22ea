//! Visor nativo de un portafolio PDF.
//!
//! Carga un documento fijo con PDFium en segundo plano, rasteriza todas sus
//! páginas y las apila en un contenedor con scroll. Con el documento cargado
//! aparece el botón de descarga.

pub mod config;
pub mod download;
pub mod error;
pub mod gpu;
pub mod layout;
pub mod load;
pub mod pdf;
pub mod state;
pub mod ui;
pub mod viewer;
