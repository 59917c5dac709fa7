//! Excel出力（CLI版）
//!
//! 共通ライブラリでバッファを生成し、ファイルに書き出す。

use crate::error::{CompatError, Result};
use element_compat_common::export::excel_core::generate_records_buffer;
use element_compat_common::{CompatibilityType, StoredRecord};
use std::path::Path;

pub fn generate_excel(
    records: &[StoredRecord],
    types: &[CompatibilityType],
    output_path: &Path,
) -> Result<()> {
    let buffer = generate_records_buffer(records, types).map_err(CompatError::ExcelGeneration)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, buffer)?;

    tracing::debug!(path = %output_path.display(), records = records.len(), "Excel出力");
    Ok(())
}
