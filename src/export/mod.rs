pub mod excel;

use crate::error::Result;
use element_compat_common::RecordStore;
use std::path::{Path, PathBuf};

/// 出力先がディレクトリ・拡張子なしなら既定のファイル名を付ける
fn output_path_for(output: &Path, compatibility_type: Option<u32>) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        let name = match compatibility_type {
            Some(t) => format!("records-type{}.xlsx", t),
            None => "records.xlsx".to_string(),
        };
        output.join(name)
    } else {
        output.to_path_buf()
    }
}

/// ストアのレコードをExcelに書き出し、出力先と件数を返す
pub fn export_records<S>(
    store: &S,
    output: &Path,
    compatibility_type: Option<u32>,
) -> Result<(PathBuf, usize)>
where
    S: RecordStore + ?Sized,
{
    let records = match compatibility_type {
        Some(t) => store.records_for(t)?,
        None => store.records()?,
    };
    let types = store.compatibility_types()?;

    let output_path = output_path_for(output, compatibility_type);
    excel::generate_excel(&records, &types, &output_path)?;

    Ok((output_path, records.len()))
}
