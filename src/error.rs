use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to create PDF: {0}")]
    PdfError(String),
    #[error("Failed to read attendee file: {0}")]
    RosterError(String),
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
    #[error("Invalid color: {0}")]
    ColorError(String),
    #[error("Failed to load font: {0}")]
    FontError(String),
    #[error("Unknown palette: {0}")]
    PaletteError(String),
    #[error("Failed to write JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
