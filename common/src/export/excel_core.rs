//! Excel生成（共通ライブラリ）
//!
//! ストア上のレコードを監査用のExcelに書き出す。
//! スキームごとに1シート。

use crate::range::index_to_address;
use crate::types::{CompatibilityType, StoredRecord};
use rust_xlsxwriter::*;
use std::collections::BTreeMap;

/// 見出し行
const HEADERS: [&str; 8] = ["ID", "セル", "aPeach", "aHard", "bPeach", "bHard", "シート", "範囲"];

/// 列幅（文字数換算）
const COLUMN_WIDTHS: [f64; 8] = [8.0, 10.0, 10.0, 10.0, 10.0, 10.0, 16.0, 14.0];

/// シート名（Excelの31文字制限・禁止文字を避ける）
fn sheet_name_for(compatibility_type: u32) -> String {
    format!("type{}", compatibility_type)
}

/// レコード一覧のExcelをバッファに生成
///
/// # Arguments
/// * `records` - 出力するレコード
/// * `types` - スキーム名の解決に使うメタデータ
pub fn generate_records_buffer(
    records: &[StoredRecord],
    types: &[CompatibilityType],
) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let title_format = Format::new().set_bold().set_font_size(12.0);
    let header_format = Format::new()
        .set_bold()
        .set_font_size(9.0)
        .set_font_color(Color::RGB(0x555555))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xAAAAAA));
    let value_format = Format::new()
        .set_font_size(11.0)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let mut by_type: BTreeMap<u32, Vec<&StoredRecord>> = BTreeMap::new();
    for stored in records {
        by_type.entry(stored.record.compatibility_type).or_default().push(stored);
    }

    // 空のブックは開けないため、レコードがなくても1シートは作る
    if by_type.is_empty() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("records")
            .map_err(|e| format!("シート名設定エラー: {}", e))?;
        worksheet.write_string_with_format(0, 0, "レコードがありません", &title_format)
            .map_err(|e| format!("書き込みエラー: {}", e))?;
    }

    for (compatibility_type, rows) in by_type {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name_for(compatibility_type))
            .map_err(|e| format!("シート名設定エラー: {}", e))?;

        let title = types
            .iter()
            .find(|t| t.id == compatibility_type)
            .map(|t| format!("{} (type {})", t.name, compatibility_type))
            .unwrap_or_else(|| format!("type {}", compatibility_type));
        worksheet.write_string_with_format(0, 0, &title, &title_format)
            .map_err(|e| format!("タイトル書き込みエラー: {}", e))?;

        for (col, (header, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
            let col = col as u16;
            worksheet.set_column_width(col, width)
                .map_err(|e| format!("列幅設定エラー: {}", e))?;
            worksheet.write_string_with_format(1, col, *header, &header_format)
                .map_err(|e| format!("見出し書き込みエラー: {}", e))?;
        }

        for (i, stored) in rows.iter().enumerate() {
            let row = i as u32 + 2;
            let record = &stored.record;
            let cells = [
                stored.id.to_string(),
                index_to_address(record.row_index, record.col_index),
                record.a_peach.clone().unwrap_or_default(),
                record.a_hard.clone().unwrap_or_default(),
                record.b_peach.clone().unwrap_or_default(),
                record.b_hard.clone().unwrap_or_default(),
                record.sheet_name.clone(),
                record.range.clone(),
            ];

            for (col, value) in cells.iter().enumerate() {
                worksheet.write_string_with_format(row, col as u16, value, &value_format)
                    .map_err(|e| format!("値書き込みエラー: {}", e))?;
            }
        }
    }

    workbook.save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
