use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompatError {
    #[error(transparent)]
    Common(#[from] element_compat_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ワークブックを開けません: {path}: {message}")]
    WorkbookOpen { path: String, message: String },

    #[error("シートが見つかりません: {0}")]
    SheetNotFound(String),

    #[error("セル範囲の取得に失敗: {range}: {message}")]
    GridFetch { range: String, message: String },

    #[error("取り込み定義が不正: {0}")]
    ManifestInvalid(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("入力エラー: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, CompatError>;
