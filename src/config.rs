// ⚙️ Configuration - command-line flags with environment fallbacks
// Shared by the terminal app and the web server

use crate::advice::AdviceBook;
use crate::catalogue::CatalogueSource;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_CATALOGUE: &str = "items.json";

/// Where to find the catalogue and (optionally) a custom advice table
#[derive(Debug, Clone, Args)]
pub struct CatalogueArgs {
    /// Catalogue JSON: a file path or an http(s) URL
    #[arg(long, global = true, env = "WASTEWISE_CATALOGUE", default_value = DEFAULT_CATALOGUE)]
    pub catalogue: String,

    /// Advice table JSON replacing the built-in one
    #[arg(long, global = true, env = "WASTEWISE_ADVICE")]
    pub advice: Option<PathBuf>,
}

impl CatalogueArgs {
    pub fn source(&self) -> CatalogueSource {
        CatalogueSource::parse(&self.catalogue)
    }

    pub fn advice_book(&self) -> Result<AdviceBook> {
        match &self.advice {
            Some(path) => AdviceBook::from_file(path)
                .with_context(|| format!("Failed to load advice table: {:?}", path)),
            None => Ok(AdviceBook::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        catalogue: CatalogueArgs,
    }

    #[test]
    fn test_flags() {
        let cli = TestCli::parse_from([
            "test",
            "--catalogue",
            "https://example.org/items.json",
        ]);

        assert_eq!(
            cli.catalogue.source(),
            CatalogueSource::Url("https://example.org/items.json".to_string())
        );
        assert!(cli.catalogue.advice.is_none());
    }

    #[test]
    fn test_missing_advice_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = CatalogueArgs {
            catalogue: DEFAULT_CATALOGUE.to_string(),
            advice: Some(dir.path().join("advice.json")),
        };

        let err = args.advice_book().unwrap_err();
        assert!(err.to_string().contains("Failed to load advice table"));
    }

    #[test]
    fn test_advice_file_is_used() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();

        let args = CatalogueArgs {
            catalogue: DEFAULT_CATALOGUE.to_string(),
            advice: Some(file.path().to_path_buf()),
        };

        assert!(args.advice_book().unwrap().entries().is_empty());
    }

    #[test]
    fn test_builtin_advice_without_flag() {
        let args = CatalogueArgs {
            catalogue: DEFAULT_CATALOGUE.to_string(),
            advice: None,
        };

        assert_eq!(args.advice_book().unwrap(), AdviceBook::default());
    }
}
