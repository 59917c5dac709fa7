//! セル範囲の取得元
//!
//! デコーダに渡す2次元配列を、シート名と矩形範囲を指定して取り出す。

mod xlsx;

pub use xlsx::XlsxGridSource;

use crate::error::{CompatError, Result};
use element_compat_common::{Grid, RangeDescriptor};
use std::collections::HashMap;
use std::path::Path;

/// グリッド取得元
pub trait GridSource {
    /// 範囲の左上を (0,0) としたセル値を返す
    fn fetch(&self, range: &RangeDescriptor) -> Result<Grid>;
}

/// シート全体のグリッドから矩形を切り出す
///
/// シートの実データより外側は含めない（短い行はデコーダ側で空として扱う）。
pub fn slice_grid(sheet: &[Vec<String>], range: &RangeDescriptor) -> Grid {
    let height = range.height() as usize;
    let width = range.width() as usize;

    sheet
        .iter()
        .skip(range.start_row as usize)
        .take(height)
        .map(|cells| {
            cells
                .iter()
                .skip(range.start_col as usize)
                .take(width)
                .cloned()
                .collect()
        })
        .collect()
}

/// メモリ上のシート群（シート名 → シート全体のグリッド）
#[derive(Debug, Clone, Default)]
pub struct MemoryGridSource {
    sheets: HashMap<String, Grid>,
}

impl MemoryGridSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, grid: Grid) -> Self {
        self.sheets.insert(name.into(), grid);
        self
    }

    /// `{"シート名": [["A1", "B1"], ["A2"]]}` 形式のJSONから読み込み
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CompatError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let sheets: HashMap<String, Grid> = serde_json::from_str(&content)?;
        Ok(Self { sheets })
    }
}

impl GridSource for MemoryGridSource {
    fn fetch(&self, range: &RangeDescriptor) -> Result<Grid> {
        let sheet = self
            .sheets
            .get(&range.sheet_name)
            .ok_or_else(|| CompatError::SheetNotFound(range.sheet_name.clone()))?;
        Ok(slice_grid(sheet, range))
    }
}
