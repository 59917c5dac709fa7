//! セル範囲の表記変換
//!
//! 外部表記は1始まりの行番号と26進（A=0, Z=25, AA=26, ...）の列記号。
//! 内部では0始まりのインデックスで扱う。
//!
//! 受け付ける表記:
//! - `A1:C2`
//! - `シート1!A1:C2`
//! - `'My Sheet'!$A$1:$C$2`

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 列インデックス（0始まり）を列記号に変換
pub fn index_to_column(col: u32) -> String {
    let mut col_index = col;
    let mut label = String::new();

    loop {
        let rem = (col_index % 26) as u8;
        label.push((b'A' + rem) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }

    label.chars().rev().collect()
}

/// 列記号を列インデックス（0始まり）に変換
///
/// 小文字も受け付ける。英字以外を含む場合や桁あふれは `None`。
pub fn column_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let upper = ch.to_ascii_uppercase() as u8;
        col = col.checked_mul(26)?.checked_add((upper - b'A' + 1) as u32)?;
    }

    Some(col - 1)
}

/// (行, 列) をA1形式に変換
pub fn index_to_address(row: u32, col: u32) -> String {
    format!("{}{}", index_to_column(col), row as u64 + 1)
}

/// A1形式を (行, 列) に変換。`$` 付きの絶対参照も可。
pub fn address_to_index(a1: &str) -> Option<(u32, u32)> {
    lazy_static::lazy_static! {
        static ref CELL_RE: Regex = Regex::new(r"^\$?([A-Za-z]+)\$?([0-9]+)$").unwrap();
    }

    let caps = CELL_RE.captures(a1.trim())?;
    let col = column_to_index(&caps[1])?;
    let row: u32 = caps[2].parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, col))
}

/// 矩形範囲の記述子（すべて0始まり・両端含む）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeDescriptor {
    pub sheet_name: String,
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl RangeDescriptor {
    /// 検証付きで生成
    pub fn new(
        sheet_name: impl Into<String>,
        start_row: u32,
        start_col: u32,
        end_row: u32,
        end_col: u32,
    ) -> Result<Self> {
        let range = Self {
            sheet_name: sheet_name.into(),
            start_row,
            start_col,
            end_row,
            end_col,
        };
        range.validate()?;
        Ok(range)
    }

    /// 範囲表記をパースする
    ///
    /// # Arguments
    /// * `notation` - `Sheet!A1:C2` または `A1:C2`
    /// * `default_sheet` - 表記にシート名がない場合に使うシート名
    pub fn parse(notation: &str, default_sheet: Option<&str>) -> Result<Self> {
        lazy_static::lazy_static! {
            static ref RANGE_RE: Regex = Regex::new(
                r"^(?:(?:'((?:[^']|'')+)'|([^!']+))!)?([$A-Za-z0-9]+)(?::([$A-Za-z0-9]+))?$"
            ).unwrap();
        }

        let trimmed = notation.trim();
        let caps = RANGE_RE
            .captures(trimmed)
            .ok_or_else(|| Error::InvalidRange(format!("表記が不正です: {}", notation)))?;

        let sheet_name = match (caps.get(1), caps.get(2)) {
            (Some(quoted), _) => quoted.as_str().replace("''", "'"),
            (None, Some(bare)) => bare.as_str().trim().to_string(),
            (None, None) => default_sheet
                .map(|s| s.to_string())
                .ok_or_else(|| Error::InvalidRange(format!("シート名がありません: {}", notation)))?,
        };

        let start = &caps[3];
        let (start_row, start_col) = address_to_index(start)
            .ok_or_else(|| Error::InvalidRange(format!("セル番地が不正です: {}", start)))?;

        let (end_row, end_col) = match caps.get(4) {
            Some(end) => address_to_index(end.as_str())
                .ok_or_else(|| Error::InvalidRange(format!("セル番地が不正です: {}", end.as_str())))?,
            None => (start_row, start_col),
        };

        Self::new(sheet_name, start_row, start_col, end_row, end_col)
    }

    /// 走査前の入力検証
    pub fn validate(&self) -> Result<()> {
        if self.sheet_name.trim().is_empty() {
            return Err(Error::InvalidRange("シート名が空です".into()));
        }
        if self.start_row > self.end_row || self.start_col > self.end_col {
            return Err(Error::InvalidRange(format!(
                "{} (開始セルが終了セルより後ろ)",
                self.a1_notation()
            )));
        }
        Ok(())
    }

    /// シート名なしのA1表記（例: `A1:C2`）
    pub fn a1_notation(&self) -> String {
        format!(
            "{}:{}",
            index_to_address(self.start_row, self.start_col),
            index_to_address(self.end_row, self.end_col)
        )
    }

    pub fn height(&self) -> u32 {
        self.end_row.saturating_sub(self.start_row) + 1
    }

    pub fn width(&self) -> u32 {
        self.end_col.saturating_sub(self.start_col) + 1
    }
}

impl fmt::Display for RangeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let needs_quote = !self
            .sheet_name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_');

        if needs_quote {
            write!(f, "'{}'!{}", self.sheet_name.replace('\'', "''"), self.a1_notation())
        } else {
            write!(f, "{}!{}", self.sheet_name, self.a1_notation())
        }
    }
}
