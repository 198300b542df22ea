//! Descarga del documento: copia el PDF a la carpeta de descargas del usuario
//! sin sobrescribir nada, como hace un navegador con `<a download>`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ViewerResult;

/// Carpeta de descargas del usuario, o el directorio actual si no hay ninguna.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Nombres candidatos en orden: `a.pdf`, `a (1).pdf`, `a (2).pdf`...
pub fn candidate_names(dir: &Path, file_name: &str) -> impl Iterator<Item = PathBuf> {
    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let extension = name.extension().map(|e| e.to_string_lossy().into_owned());
    let dir = dir.to_path_buf();

    std::iter::once(dir.join(file_name)).chain((1u32..).map(move |n| match &extension {
        Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
        None => dir.join(format!("{} ({})", stem, n)),
    }))
}

/// Crea el primer candidato que no exista. La creación es atómica
/// (`create_new`): si otro proceso gana la carrera se pasa al siguiente nombre.
fn create_unique(dir: &Path, file_name: &str) -> io::Result<(PathBuf, File)> {
    for path in candidate_names(dir, file_name) {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(io::ErrorKind::AlreadyExists, "sin nombres libres"))
}

/// Copia `source` dentro de `target_dir` y devuelve la ruta creada.
/// Nunca sobrescribe un archivo existente.
pub fn save_copy(source: &Path, target_dir: &Path) -> ViewerResult<PathBuf> {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "portfolio.pdf".to_string());

    // Abrir la fuente antes de crear nada en destino.
    let mut input = File::open(source)?;
    fs::create_dir_all(target_dir)?;
    let (destination, mut output) = create_unique(target_dir, &file_name)?;

    if let Err(e) = io::copy(&mut input, &mut output).and_then(|_| output.sync_all()) {
        drop(output);
        let _ = fs::remove_file(&destination);
        return Err(e.into());
    }

    log::info!("Documento guardado en {:?}", destination);
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_into_target_dir() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("portfolio.pdf");
        fs::write(&source, b"%PDF-1.7 test").unwrap();

        let saved = save_copy(&source, out_dir.path()).unwrap();
        assert_eq!(saved, out_dir.path().join("portfolio.pdf"));
        assert_eq!(fs::read(&saved).unwrap(), b"%PDF-1.7 test");
    }

    #[test]
    fn never_overwrites_existing_files() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("portfolio.pdf");
        fs::write(&source, b"new").unwrap();
        fs::write(out_dir.path().join("portfolio.pdf"), b"old").unwrap();
        fs::write(out_dir.path().join("portfolio (1).pdf"), b"older").unwrap();

        let saved = save_copy(&source, out_dir.path()).unwrap();
        assert_eq!(saved, out_dir.path().join("portfolio (2).pdf"));
        assert_eq!(fs::read(out_dir.path().join("portfolio.pdf")).unwrap(), b"old");
    }

    #[test]
    fn candidates_without_extension() {
        let dir = Path::new("/tmp/out");
        let names: Vec<PathBuf> = candidate_names(dir, "notes").take(3).collect();
        assert_eq!(names, vec![dir.join("notes"), dir.join("notes (1)"), dir.join("notes (2)")]);
    }

    #[test]
    fn existing_first_name_is_left_untouched() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("portfolio.pdf");
        fs::write(&source, b"fresh copy").unwrap();
        let existing = out_dir.path().join("portfolio.pdf");
        fs::write(&existing, b"user's own file").unwrap();

        let first = save_copy(&source, out_dir.path()).unwrap();
        let second = save_copy(&source, out_dir.path()).unwrap();

        assert_eq!(first, out_dir.path().join("portfolio (1).pdf"));
        assert_eq!(second, out_dir.path().join("portfolio (2).pdf"));
        assert_eq!(fs::read(&existing).unwrap(), b"user's own file");
        assert_eq!(fs::read(&first).unwrap(), b"fresh copy");
        assert_eq!(fs::read(&second).unwrap(), b"fresh copy");
    }

    #[test]
    fn concurrent_saves_never_share_a_destination() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("portfolio.pdf");
        fs::write(&source, b"%PDF").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let source = source.clone();
                let out = out_dir.path().to_path_buf();
                std::thread::spawn(move || save_copy(&source, &out).unwrap())
            })
            .collect();
        let mut saved: Vec<PathBuf> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        saved.sort();
        saved.dedup();

        assert_eq!(saved.len(), 8);
        assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 8);
    }

    #[test]
    fn missing_source_creates_nothing() {
        let out_dir = tempfile::tempdir().unwrap();
        assert!(save_copy(Path::new("/no/such/portfolio.pdf"), out_dir.path()).is_err());
        assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_source_is_an_error() {
        let out_dir = tempfile::tempdir().unwrap();
        let result = save_copy(Path::new("/no/such/portfolio.pdf"), out_dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn creates_missing_target_dir() {
        let src_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("a.pdf");
        fs::write(&source, b"x").unwrap();
        let nested = src_dir.path().join("downloads").join("inner");

        let saved = save_copy(&source, &nested).unwrap();
        assert!(saved.starts_with(&nested));
    }
}
