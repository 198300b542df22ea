use anyhow::Context;
use std::env;
use std::path::PathBuf;

const SKIP_ENV: &str = "PORTFOLIO_VIEWER_SKIP_PDFIUM_DOWNLOAD";

fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={}", SKIP_ENV);

    let manifest_dir = PathBuf::from(
        env::var("CARGO_MANIFEST_DIR").context("CARGO_MANIFEST_DIR no definido")?,
    );

    // Builds sin red (CI, empaquetado): la librería la aporta el sistema.
    if env::var_os(SKIP_ENV).is_some() {
        println!("cargo:warning=Descarga de PDFium omitida ({})", SKIP_ENV);
    } else if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("windows") {
        setup_pdfium(&manifest_dir)?;
    }

    // PDFium se carga en tiempo de ejecución; esto solo ayuda al linker a encontrarla.
    println!("cargo:rustc-link-search=native={}", manifest_dir.display());

    Ok(())
}

fn setup_pdfium(root_dir: &std::path::Path) -> anyhow::Result<()> {
    use std::fs;
    use std::io::Cursor;

    const PDFIUM_URL: &str =
        "https://github.com/bblanchon/pdfium-binaries/releases/latest/download/pdfium-win-x64.zip";
    const DLL_NAME: &str = "pdfium.dll";

    // Junto al manifiesto, para que `cargo run` la encuentre en el directorio actual.
    let dll_path = root_dir.join(DLL_NAME);
    if dll_path.exists() {
        return Ok(());
    }

    println!("cargo:warning=Descargando PDFium desde {}...", PDFIUM_URL);

    let response = reqwest::blocking::get(PDFIUM_URL)
        .and_then(|r| r.error_for_status())
        .context("Fallo al descargar PDFium")?
        .bytes()
        .context("Fallo al leer bytes del ZIP")?;

    let mut zip = zip::ZipArchive::new(Cursor::new(response)).context("Fallo al abrir el ZIP")?;

    // La DLL suele estar en bin/pdfium.dll
    let entry = (0..zip.len())
        .find(|&i| {
            zip.by_index(i)
                .map(|f| f.name().ends_with("bin/pdfium.dll") || f.name() == DLL_NAME)
                .unwrap_or(false)
        })
        .context("No se encontró pdfium.dll dentro del ZIP descargado")?;
    let mut dll_file = zip.by_index(entry).context("Entrada del ZIP ilegible")?;

    let mut out_file = fs::File::create(&dll_path)
        .with_context(|| format!("Fallo al crear el archivo {:?}", dll_path))?;
    std::io::copy(&mut dll_file, &mut out_file).context("Fallo al extraer pdfium.dll")?;

    println!("cargo:warning=PDFium instalado en: {:?}", dll_path);
    Ok(())
}
