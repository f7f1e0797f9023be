use std::path::PathBuf;

/// Errors from the fallible edges of chatmark: reading files, loading
/// config and compiling documents. Parsing and rendering never fail.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has mistyped keys.
    #[error("invalid config in {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Typst rejected the generated markup.
    #[error("Typst compilation failed: {0}")]
    Compile(String),

    /// PDF export of a compiled document failed.
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
