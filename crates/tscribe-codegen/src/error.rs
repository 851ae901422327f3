//! Error types for code generation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Unresolved symbol: {0}")]
    UnresolvedSymbol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}
