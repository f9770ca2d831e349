//! Server configuration from command line arguments and environment variables.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "wordpack-server", about = "Vocabulary learning package service")]
pub struct ServerArgs {
    /// Address the HTTP server listens on
    #[arg(long, default_value = "0.0.0.0:9988", env = "WORDPACK_BIND")]
    pub bind: String,

    /// Directory uploaded images are written to
    #[arg(long, default_value = "uploads", env = "WORDPACK_UPLOADS_DIR")]
    pub uploads_dir: PathBuf,

    /// Tesseract executable used for image text recognition
    #[arg(long, default_value = "tesseract", env = "TESSERACT_BIN")]
    pub tesseract_bin: PathBuf,

    /// Tesseract language pack
    #[arg(long, default_value = "eng", env = "OCR_LANG")]
    pub ocr_lang: String,

    /// TOML file with provider settings (environment variables override it)
    #[arg(long, env = "WORDPACK_CONFIG")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = ServerArgs::try_parse_from(["wordpack-server"]).unwrap();
        assert_eq!(args.bind, "0.0.0.0:9988");
        assert_eq!(args.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(args.tesseract_bin, PathBuf::from("tesseract"));
        assert_eq!(args.ocr_lang, "eng");
        assert!(args.config.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let args = ServerArgs::try_parse_from([
            "wordpack-server",
            "--bind",
            "127.0.0.1:8000",
            "--uploads-dir",
            "/data/uploads",
            "--ocr-lang",
            "eng+chi_sim",
            "--config",
            "wordpack.toml",
        ])
        .unwrap();
        assert_eq!(args.bind, "127.0.0.1:8000");
        assert_eq!(args.uploads_dir, PathBuf::from("/data/uploads"));
        assert_eq!(args.ocr_lang, "eng+chi_sim");
        assert_eq!(args.config, Some(PathBuf::from("wordpack.toml")));
    }
}
