//! Excel/ODSファイルからの取得（calamine）

use super::GridSource;
use crate::error::{CompatError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use element_compat_common::{Grid, RangeDescriptor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// ワークブック全シートを読み込んだ取得元
///
/// 開いた時点で全シートを読み込むので、取得は読み取りのみで並列に呼べる。
pub struct XlsxGridSource {
    path: PathBuf,
    sheets: HashMap<String, Range<Data>>,
}

impl XlsxGridSource {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CompatError::FileNotFound(path.display().to_string()));
        }

        let workbook_error = |message: String| CompatError::WorkbookOpen {
            path: path.display().to_string(),
            message,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;

        let mut sheets = HashMap::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| workbook_error(format!("{}: {}", name, e)))?;
            sheets.insert(name, range);
        }

        tracing::debug!(path = %path.display(), sheets = sheets.len(), "ワークブック読み込み");
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sheets.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

/// セル値を文字列化（空セルは空文字）
fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

impl GridSource for XlsxGridSource {
    fn fetch(&self, range: &RangeDescriptor) -> Result<Grid> {
        let sheet = self
            .sheets
            .get(&range.sheet_name)
            .ok_or_else(|| CompatError::SheetNotFound(range.sheet_name.clone()))?;

        // 使用範囲の終端より先は読まない
        let Some((last_row, last_col)) = sheet.end() else {
            return Ok(Vec::new());
        };
        let end_row = range.end_row.min(last_row);
        let end_col = range.end_col.min(last_col);

        // get_value は絶対位置で引く
        let grid = (range.start_row..=end_row)
            .map(|r| {
                (range.start_col..=end_col)
                    .map(|c| sheet.get_value((r, c)).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(grid)
    }
}
