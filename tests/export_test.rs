//! Excel出力の統合テスト
//!
//! 書き出したファイルをcalamineで読み戻して中身を確認する。

use calamine::{open_workbook_auto, Data, Reader};
use element_compat::export;
use element_compat_common::{CompatibilityRecord, CompatibilityType, MemoryRecordStore, RecordStore};
use tempfile::tempdir;

fn seeded_store() -> MemoryRecordStore {
    let mut store = MemoryRecordStore::new();
    let record = |a_peach: &str, row: u32, col: u32| CompatibilityRecord {
        compatibility_type: 1,
        sheet_name: "恋愛".into(),
        range: "A1:Z80".into(),
        a_peach: Some(a_peach.to_string()),
        b_hard: Some("W".into()),
        row_index: row,
        col_index: col,
        ..Default::default()
    };
    store.replace_scheme(1, vec![record("F+", 0, 1), record("T", 12, 27)]).unwrap();
    store
        .replace_scheme(
            3,
            vec![CompatibilityRecord {
                compatibility_type: 3,
                a_hard: Some("E-".into()),
                ..Default::default()
            }],
        )
        .unwrap();
    store
        .upsert_type(CompatibilityType { id: 1, name: "恋愛".into(), description: String::new() })
        .unwrap();
    store
}

fn text(data: Option<&Data>) -> String {
    data.map(|d| d.to_string()).unwrap_or_default()
}

#[test]
fn test_export_one_sheet_per_type() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("audit.xlsx");

    let (path, count) = export::export_records(&seeded_store(), &output, None).unwrap();
    assert_eq!(path, output);
    assert_eq!(count, 3);

    let mut workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["type1".to_string(), "type3".to_string()]);

    let sheet = workbook.worksheet_range("type1").unwrap();
    assert_eq!(text(sheet.get_value((0, 0))), "恋愛 (type 1)");
    assert_eq!(text(sheet.get_value((1, 1))), "セル");
    // データ行: ID, セル番地, aPeach
    assert_eq!(text(sheet.get_value((2, 1))), "B1");
    assert_eq!(text(sheet.get_value((2, 2))), "F+");
    assert_eq!(text(sheet.get_value((3, 1))), "AB13");
    assert_eq!(text(sheet.get_value((3, 5))), "W");
}

#[test]
fn test_export_single_type() {
    let dir = tempdir().expect("Failed to create temp dir");

    let (path, count) = export::export_records(&seeded_store(), dir.path(), Some(3)).unwrap();
    assert_eq!(path, dir.path().join("records-type3.xlsx"));
    assert_eq!(count, 1);

    let mut workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["type3".to_string()]);
    let sheet = workbook.worksheet_range("type3").unwrap();
    assert_eq!(text(sheet.get_value((0, 0))), "type 3");
    assert_eq!(text(sheet.get_value((2, 3))), "E-");
}

#[test]
fn test_export_empty_store() {
    let dir = tempdir().expect("Failed to create temp dir");

    let (path, count) = export::export_records(&MemoryRecordStore::new(), dir.path(), None).unwrap();
    assert_eq!(count, 0);

    let workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["records".to_string()]);
}
