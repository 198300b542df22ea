//! Carga del documento en segundo plano.
//!
//! El hilo de carga envía primero un resultado terminal (éxito con número de
//! páginas, o error) y, tras un éxito, una página rasterizada por petición.
//! El hilo de UI drena el canal una vez por frame.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use super::render::{render_page_to_memory, PageBitmap};
use super::PdfSystem;
use crate::load::{page_requests, LoadOutcome, PageRequest};

#[derive(Debug)]
pub enum LoaderEvent {
    Document(LoadOutcome),
    PageRendered { request: PageRequest, bitmap: PageBitmap },
    PageFailed { request: PageRequest, message: String },
}

#[derive(Debug, Clone)]
pub struct LoadJob {
    pub path: PathBuf,
    pub scale_factor: f32,
    pub max_texture_side: u32,
}

pub struct DocumentLoader {
    events: Receiver<LoaderEvent>,
    handle: Option<JoinHandle<()>>,
}

impl DocumentLoader {
    pub fn spawn(job: LoadJob) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("pdf-loader".into())
            .spawn(move || run(job, tx))?;

        Ok(Self {
            events: rx,
            handle: Some(handle),
        })
    }

    /// Eventos disponibles ahora mismo, sin bloquear.
    pub fn drain(&self) -> Vec<LoaderEvent> {
        self.events.try_iter().collect()
    }

    /// Drena el canal e indica si el hilo ya no enviará nada más.
    /// El estado del hilo se lee antes de drenar: si ya había terminado,
    /// todo lo que envió está en el canal y sale en este mismo drenado.
    pub fn poll(&self) -> (Vec<LoaderEvent>, bool) {
        let finished = self.is_finished();
        (self.drain(), finished)
    }

    /// Espera el siguiente evento. Devuelve `None` si el hilo terminó.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<LoaderEvent> {
        self.events.recv_timeout(timeout).ok()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

fn run(job: LoadJob, tx: Sender<LoaderEvent>) {
    log::info!("Cargando {:?}", job.path);

    let fail = |message: String| {
        let _ = tx.send(LoaderEvent::Document(LoadOutcome::Error { message }));
    };

    // Sin archivo no hace falta enlazar PDFium.
    if !job.path.is_file() {
        fail(format!("{} no existe", job.path.display()));
        return;
    }

    let system = match PdfSystem::new() {
        Ok(system) => system,
        Err(e) => {
            fail(e.to_string());
            return;
        }
    };

    let document = match system.open_file(&job.path) {
        Ok(doc) => doc,
        Err(e) => {
            fail(e.to_string());
            return;
        }
    };

    let page_count = document.pages().len();
    if tx
        .send(LoaderEvent::Document(LoadOutcome::Success { page_count }))
        .is_err()
    {
        return;
    }

    // Renderizado anticipado de todas las páginas, en orden.
    for request in page_requests(page_count) {
        let event = match render_page_to_memory(&document, request, job.scale_factor, job.max_texture_side) {
            Ok(bitmap) => {
                log::debug!(
                    "Página {} rasterizada ({}x{})",
                    request.page_number,
                    bitmap.width,
                    bitmap.height
                );
                LoaderEvent::PageRendered { request, bitmap }
            }
            Err(e) => LoaderEvent::PageFailed {
                request,
                message: e.to_string(),
            },
        };

        // Receptor cerrado: la ventana ya no existe.
        if tx.send(event).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn missing_document_reports_failure() {
        let loader = DocumentLoader::spawn(LoadJob {
            path: PathBuf::from("/definitely/not/here/portfolio.pdf"),
            scale_factor: 3.0,
            max_texture_side: 8192,
        })
        .unwrap();

        match loader.recv_timeout(Duration::from_secs(10)) {
            Some(LoaderEvent::Document(LoadOutcome::Error { message })) => {
                assert!(!message.is_empty());
            }
            other => panic!("expected load failure, got {:?}", other),
        }

        // No llegan páginas después de un fallo.
        assert!(loader.recv_timeout(Duration::from_secs(2)).is_none());
    }

    #[test]
    fn poll_never_reports_done_with_outcome_pending() {
        for _ in 0..500 {
            let loader = DocumentLoader::spawn(LoadJob {
                path: PathBuf::from("/definitely/not/here/portfolio.pdf"),
                scale_factor: 1.0,
                max_texture_side: 1024,
            })
            .unwrap();

            let mut received = Vec::new();
            loop {
                let (events, done) = loader.poll();
                received.extend(events);
                if done {
                    break;
                }
            }

            assert_eq!(received.len(), 1);
            assert!(matches!(
                received[0],
                LoaderEvent::Document(LoadOutcome::Error { .. })
            ));
            // Tras `done` el canal queda vacío y desconectado.
            assert!(loader.recv_timeout(Duration::from_millis(10)).is_none());
        }
    }

    #[test]
    fn bundled_document_reports_outcome_first() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/portfolio.pdf");
        let loader = DocumentLoader::spawn(LoadJob {
            path,
            scale_factor: 1.0,
            max_texture_side: 2048,
        })
        .unwrap();

        // Con o sin PDFium en la máquina, lo primero es siempre un resultado terminal.
        match loader.recv_timeout(Duration::from_secs(30)) {
            Some(LoaderEvent::Document(LoadOutcome::Success { page_count })) => assert_eq!(page_count, 3),
            Some(LoaderEvent::Document(LoadOutcome::Error { message })) => assert!(!message.is_empty()),
            other => panic!("expected a document outcome first, got {:?}", other),
        }
    }

    /// Requiere la librería PDFium (junto al ejecutable, en el directorio
    /// actual o en el sistema). Ejecutar con `cargo test -- --ignored`.
    #[test]
    #[ignore = "requires the PDFium shared library"]
    fn bundled_document_renders_every_page_in_order() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/portfolio.pdf");
        let loader = DocumentLoader::spawn(LoadJob {
            path,
            scale_factor: 1.0,
            max_texture_side: 2048,
        })
        .unwrap();

        match loader.recv_timeout(Duration::from_secs(30)) {
            Some(LoaderEvent::Document(LoadOutcome::Success { page_count })) => assert_eq!(page_count, 3),
            other => panic!("expected the document to load, got {:?}", other),
        }

        let mut rendered = Vec::new();
        while let Some(event) = loader.recv_timeout(Duration::from_secs(30)) {
            match event {
                LoaderEvent::PageRendered { request, bitmap } => {
                    assert!(!request.render_annotations);
                    assert_eq!(bitmap.width, 595);
                    assert_eq!(bitmap.height, 842);
                    assert_eq!(bitmap.data.len(), (bitmap.width * bitmap.height * 4) as usize);
                    rendered.push(request.page_number);
                }
                LoaderEvent::PageFailed { request, message } => {
                    panic!("page {} failed: {}", request.page_number, message)
                }
                LoaderEvent::Document(outcome) => panic!("second outcome {:?}", outcome),
            }
        }
        assert_eq!(rendered, vec![1, 2, 3]);
    }
}
