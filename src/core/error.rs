use thiserror::Error;

/// Errors raised while building a grid. Per-move boundary conditions are never
/// errors; they are absorbed by the bounds checks in the hot path.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cells-per-area must be non-zero on both axes (got {width}x{height})")]
    ZeroAreaSize { width: u32, height: u32 },

    #[error("Cell grid must be non-empty (got {width}x{height})")]
    EmptyGrid { width: u32, height: u32 },

    #[error("Cell grid {width}x{height} exceeds the per-map cell limit")]
    GridTooLarge { width: u32, height: u32 },

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
