//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid compatibility type: {0} (must be a positive integer)")]
    InvalidCompatibilityType(i64),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("Record not found: id={0}")]
    RecordNotFound(u64),

    #[error("Compatibility type not found: id={0}")]
    TypeNotFound(u32),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
