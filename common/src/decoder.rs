//! 相性表ブロックデコーダ
//!
//! シート上に不規則な間隔で並ぶ2×3のブロックを拾い出す。
//!
//! ```text
//!   | c           | c+1    | c+2    |
//! r | PeachCore   | aPeach | bPeach |
//! r+1 | HardCore  | aHard  | bHard  |
//! ```
//!
//! ## 処理フロー
//! 1. `PeachCore` を含む行を列挙
//! 2. `PeachCore` / `HardCore` を含む列を列挙
//! 3. 行×列の各交点でアンカー（上下2セルの完全一致）を検証
//! 4. アンカー右側の2×2を読み取り、全部空なら捨てる

use crate::error::{Error, Result};
use crate::range::RangeDescriptor;
use crate::types::CompatibilityRecord;
use std::collections::BTreeSet;

/// アンカー上段のマーカー
pub const PEACH_MARKER: &str = "PeachCore";
/// アンカー下段のマーカー
pub const HARD_MARKER: &str = "HardCore";

/// セル値の2次元配列（行ごとに長さが違ってよい）
pub type Grid = Vec<Vec<String>>;

/// トリム済みセル値。範囲外は空文字。
fn cell(grid: &[Vec<String>], row: usize, col: usize) -> &str {
    grid.get(row)
        .and_then(|r| r.get(col))
        .map(|v| v.trim())
        .unwrap_or("")
}

fn payload_value(grid: &[Vec<String>], row: usize, col: usize) -> Option<String> {
    let value = cell(grid, row, col);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// 検証済みアンカーの位置（グリッド内の相対位置）を行優先で返す
pub fn find_anchors(grid: &[Vec<String>]) -> Vec<(usize, usize)> {
    let peach_rows: BTreeSet<usize> = grid
        .iter()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|v| v.trim() == PEACH_MARKER))
        .map(|(r, _)| r)
        .collect();

    let marker_cols: BTreeSet<usize> = grid
        .iter()
        .flat_map(|row| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| {
                    let v = v.trim();
                    v == PEACH_MARKER || v == HARD_MARKER
                })
                .map(|(c, _)| c)
        })
        .collect();

    let mut anchors = Vec::new();
    for &r in &peach_rows {
        for &c in &marker_cols {
            if cell(grid, r, c) == PEACH_MARKER && cell(grid, r + 1, c) == HARD_MARKER {
                anchors.push((r, c));
            }
        }
    }

    anchors
}

/// グリッドから相性レコードを復元する
///
/// # Arguments
/// * `grid` - 取得したセル値（`range` の左上を (0,0) とする）
/// * `range` - グリッドの取得元範囲。絶対位置の算出に使う
/// * `compatibility_type` - 付与するスキームID（正の整数）
///
/// # Returns
/// アンカーごとのレコード（行優先順）。全スロット空のブロックは含まない。
pub fn decode_blocks(
    grid: &[Vec<String>],
    range: &RangeDescriptor,
    compatibility_type: i64,
) -> Result<Vec<CompatibilityRecord>> {
    range.validate()?;
    let compatibility_type = checked_type(compatibility_type)?;

    let provenance = range.a1_notation();
    let mut records = Vec::new();

    for (r, c) in find_anchors(grid) {
        let (row_index, col_index) = absolute_position(range, r, c)?;
        let record = CompatibilityRecord {
            compatibility_type,
            sheet_name: range.sheet_name.clone(),
            range: provenance.clone(),
            a_peach: payload_value(grid, r, c + 1),
            b_peach: payload_value(grid, r, c + 2),
            a_hard: payload_value(grid, r + 1, c + 1),
            b_hard: payload_value(grid, r + 1, c + 2),
            row_index,
            col_index,
        };

        if record.is_payload_empty() {
            tracing::debug!(row = record.row_index, col = record.col_index, "空ブロックをスキップ");
            continue;
        }

        records.push(record);
    }

    tracing::debug!(range = %range, count = records.len(), "ブロック復元");
    Ok(records)
}

/// グリッド内の位置を範囲の左上からの絶対位置に直す
fn absolute_position(range: &RangeDescriptor, r: usize, c: usize) -> Result<(u32, u32)> {
    let offset = |start: u32, delta: usize| {
        u32::try_from(delta)
            .ok()
            .and_then(|d| start.checked_add(d))
    };

    match (offset(range.start_row, r), offset(range.start_col, c)) {
        (Some(row), Some(col)) => Ok((row, col)),
        _ => Err(Error::InvalidRange(format!(
            "{}: アンカー位置 (+{}, +{}) がシートの上限を超えています",
            range.a1_notation(),
            r,
            c
        ))),
    }
}

/// スキームIDの検証
pub fn checked_type(compatibility_type: i64) -> Result<u32> {
    u32::try_from(compatibility_type)
        .ok()
        .filter(|&t| t > 0)
        .ok_or(Error::InvalidCompatibilityType(compatibility_type))
}
