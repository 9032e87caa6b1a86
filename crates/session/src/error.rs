use cleanfi_core::{ConfigError, TransactionKey};
use cleanfi_import::import::ImportError;
use cleanfi_import::ExportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No file has been uploaded")]
    NoUpload,
    #[error("No transaction matches {0}")]
    UnknownTransaction(TransactionKey),
    #[error("Category must not be empty")]
    EmptyCategory,
}
