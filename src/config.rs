use std::path::PathBuf;

/// Ruta fija del documento servido por el visor.
pub const DEFAULT_DOCUMENT_PATH: &str = "assets/portfolio.pdf";

/// Escala de renderizado respecto a puntos PDF (72 DPI).
pub const DEFAULT_RENDER_SCALE: f32 = 3.0;

pub const DOWNLOAD_LABEL: &str = "포트폴리오 다운로드";
pub const LOADING_MESSAGE: &str = "포트폴리오를 불러오는 중입니다...";
pub const ERROR_MESSAGE: &str = "PDF를 불러오지 못했습니다. 파일 경로를 확인해주세요.";
pub const WINDOW_TITLE: &str = "Portfolio";

/// Configuración del visor. Todo es fijo salvo la ruta, que puede venir
/// como primer argumento ("Abrir con...").
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub document_path: PathBuf,
    pub render_scale: f32,
    pub window_title: String,
    pub download_label: String,
    pub loading_message: String,
    pub error_message: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            document_path: PathBuf::from(DEFAULT_DOCUMENT_PATH),
            render_scale: DEFAULT_RENDER_SCALE,
            window_title: WINDOW_TITLE.to_string(),
            download_label: DOWNLOAD_LABEL.to_string(),
            loading_message: LOADING_MESSAGE.to_string(),
            error_message: ERROR_MESSAGE.to_string(),
            window_width: 1200,
            window_height: 800,
        }
    }
}

impl ViewerConfig {
    /// Construye la configuración a partir de los argumentos de lanzamiento.
    /// `args[0]` es el ejecutable; `args[1]`, si existe, reemplaza la ruta.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        if let Some(path) = args.into_iter().nth(1).filter(|p| !p.trim().is_empty()) {
            config.document_path = PathBuf::from(path);
        }
        config
    }

    /// Nombre del archivo tal como se ofrece en la descarga.
    pub fn document_file_name(&self) -> String {
        self.document_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "portfolio.pdf".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_to_fixed_document() {
        let config = ViewerConfig::default();
        assert_eq!(config.document_path, PathBuf::from(DEFAULT_DOCUMENT_PATH));
        assert_eq!(config.render_scale, 3.0);
        assert_eq!(config.download_label, DOWNLOAD_LABEL);
    }

    #[test]
    fn first_argument_overrides_path() {
        let args = vec!["viewer".to_string(), "/tmp/other.pdf".to_string()];
        let config = ViewerConfig::from_args(args);
        assert_eq!(config.document_path, PathBuf::from("/tmp/other.pdf"));
        assert_eq!(config.document_file_name(), "other.pdf");
    }

    #[test]
    fn missing_or_blank_argument_keeps_default() {
        assert_eq!(
            ViewerConfig::from_args(vec!["viewer".to_string()]),
            ViewerConfig::default()
        );
        assert_eq!(
            ViewerConfig::from_args(vec!["viewer".to_string(), "  ".to_string()]),
            ViewerConfig::default()
        );
    }
}
