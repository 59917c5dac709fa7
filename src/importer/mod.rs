//! 相性表の一括取り込み
//!
//! ## 処理フロー
//! 1. 範囲ごとに表記を検証し、取得・デコード（範囲単位で並列）
//! 2. スキームごとに結果をまとめる
//! 3. 全範囲が成功したスキームだけをストア上で丸ごと置き換える
//!
//! 1範囲でも失敗したスキームは置き換えず、既存のレコードを残す。

pub mod manifest;

pub use manifest::{ImportManifest, SchemeEntry};

use crate::error::{CompatError, Result};
use crate::grid::GridSource;
use element_compat_common::decoder::checked_type;
use element_compat_common::{decode_blocks, CompatibilityRecord, CompatibilityType, RangeDescriptor, RecordStore};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// ストア書き込みに失敗したときの `RangeFailure::range`
pub const STORE_FAILURE: &str = "(store)";

/// 取り込みオプション
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// デコードのみ行い、ストアに書き込まない
    pub dry_run: bool,
    /// 進捗バーを表示する
    pub show_progress: bool,
}

/// 失敗した範囲
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFailure {
    pub range: String,
    pub message: String,
}

/// スキーム単位の取り込み結果
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeReport {
    pub compatibility_type: u32,
    /// 処理した範囲数
    pub ranges: usize,
    /// デコードしたレコード数
    pub records: usize,
    /// デコード結果のSHA-256（全範囲成功時のみ）
    pub digest: Option<String>,
    /// ストアを置き換えたか
    pub replaced: bool,
    pub failures: Vec<RangeFailure>,
}

/// 取り込み結果全体
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub schemes: Vec<SchemeReport>,
}

impl ImportReport {
    pub fn has_failures(&self) -> bool {
        self.schemes.iter().any(|s| !s.failures.is_empty())
    }

    pub fn total_records(&self) -> usize {
        self.schemes.iter().map(|s| s.records).sum()
    }

    pub fn failed_ranges(&self) -> Vec<&RangeFailure> {
        self.schemes.iter().flat_map(|s| s.failures.iter()).collect()
    }
}

/// 1範囲分の処理結果
struct RangeOutcome {
    scheme_index: usize,
    notation: String,
    result: Result<Vec<CompatibilityRecord>>,
}

/// 1範囲を検証・取得・デコードする
///
/// 表記の不正は取得前に弾く。取得に失敗した範囲は部分的な結果を返さない。
pub fn decode_range<S>(
    source: &S,
    notation: &str,
    default_sheet: Option<&str>,
    compatibility_type: i64,
) -> Result<Vec<CompatibilityRecord>>
where
    S: GridSource + ?Sized,
{
    let range = RangeDescriptor::parse(notation, default_sheet)?;
    let grid = source.fetch(&range).map_err(|e| match e {
        CompatError::SheetNotFound(_) => e,
        other => CompatError::GridFetch {
            range: range.to_string(),
            message: other.to_string(),
        },
    })?;
    let records = decode_blocks(&grid, &range, compatibility_type)?;
    Ok(records)
}

/// デコード結果のSHA-256（同じ入力なら同じ値）
pub fn record_digest(records: &[CompatibilityRecord]) -> Result<String> {
    let canonical = serde_json::to_vec(records)?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

/// ストア書き込みの失敗（範囲ではなくストア側）
fn store_failure(error: &element_compat_common::Error) -> RangeFailure {
    RangeFailure {
        range: STORE_FAILURE.to_string(),
        message: error.to_string(),
    }
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("  [{bar:30}] {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// 取り込み定義に従って一括取り込みする
///
/// # Arguments
/// * `source` - セル範囲の取得元
/// * `store` - 書き込み先
/// * `manifest` - 取り込み定義（検証済みであること）
/// * `options` - ドライラン・進捗表示
pub fn run_import<S, T>(
    source: &S,
    store: &mut T,
    manifest: &ImportManifest,
    options: &ImportOptions,
) -> Result<ImportReport>
where
    S: GridSource + Sync + ?Sized,
    T: RecordStore + ?Sized,
{
    manifest.validate()?;

    let jobs: Vec<(usize, &str)> = manifest
        .schemes
        .iter()
        .enumerate()
        .flat_map(|(i, scheme)| scheme.ranges.iter().map(move |r| (i, r.as_str())))
        .collect();

    let bar = progress_bar(jobs.len(), options.show_progress);
    let default_sheet = manifest.default_sheet.as_deref();

    let outcomes: Vec<RangeOutcome> = jobs
        .par_iter()
        .map(|&(scheme_index, notation)| {
            let compatibility_type = manifest.schemes[scheme_index].compatibility_type;
            bar.set_message(notation.to_string());
            let result = decode_range(source, notation, default_sheet, compatibility_type);
            bar.inc(1);
            RangeOutcome {
                scheme_index,
                notation: notation.to_string(),
                result,
            }
        })
        .collect();
    bar.finish_and_clear();

    let mut report = ImportReport::default();

    for (index, scheme) in manifest.schemes.iter().enumerate() {
        let compatibility_type = checked_type(scheme.compatibility_type)?;
        let mut scheme_report = SchemeReport {
            compatibility_type,
            ranges: scheme.ranges.len(),
            ..Default::default()
        };

        let mut records = Vec::new();
        for outcome in outcomes.iter().filter(|o| o.scheme_index == index) {
            match &outcome.result {
                Ok(decoded) => records.extend(decoded.iter().cloned()),
                Err(e) => {
                    tracing::warn!(range = %outcome.notation, error = %e, "範囲の取り込みに失敗");
                    scheme_report.failures.push(RangeFailure {
                        range: outcome.notation.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
        scheme_report.records = records.len();

        if !scheme_report.failures.is_empty() {
            tracing::warn!(compatibility_type, "失敗した範囲があるためスキームを置き換えません");
            report.schemes.push(scheme_report);
            continue;
        }

        scheme_report.digest = Some(record_digest(&records)?);

        if !options.dry_run {
            match store.replace_scheme(compatibility_type, records) {
                Ok(_) => scheme_report.replaced = true,
                Err(e) => {
                    tracing::warn!(compatibility_type, error = %e, "ストアへの書き込みに失敗");
                    scheme_report.failures.push(store_failure(&e));
                    report.schemes.push(scheme_report);
                    continue;
                }
            }

            // レコードは置き換え済み。メタデータの失敗は報告して次へ
            if let Some(name) = &scheme.name {
                let metadata = CompatibilityType {
                    id: compatibility_type,
                    name: name.clone(),
                    description: scheme.description.clone().unwrap_or_default(),
                };
                if let Err(e) = store.upsert_type(metadata) {
                    tracing::warn!(compatibility_type, error = %e, "スキーム名の書き込みに失敗");
                    scheme_report.failures.push(store_failure(&e));
                    report.schemes.push(scheme_report);
                    continue;
                }
            }
        }

        tracing::info!(
            compatibility_type,
            records = scheme_report.records,
            replaced = scheme_report.replaced,
            "スキーム取り込み"
        );
        report.schemes.push(scheme_report);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MemoryGridSource;
    use element_compat_common::{Grid, MemoryRecordStore};

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    fn source() -> MemoryGridSource {
        MemoryGridSource::new()
            .with_sheet(
                "恋愛",
                grid(&[
                    &["", "PeachCore", "F+", "T-"],
                    &["", "HardCore", "W+", "E-"],
                    &[],
                    &["PeachCore", "F", "", "", "PeachCore", "T"],
                    &["HardCore", "", "W", "", "HardCore", "", "E+"],
                ]),
            )
            .with_sheet(
                "仕事",
                grid(&[
                    &["PeachCore", "E", "E"],
                    &["HardCore", "W-", "W+"],
                ]),
            )
    }

    fn manifest() -> ImportManifest {
        ImportManifest {
            workbook: None,
            default_sheet: None,
            schemes: vec![
                SchemeEntry {
                    compatibility_type: 1,
                    name: Some("恋愛".into()),
                    description: Some("恋人同士".into()),
                    ranges: vec!["恋愛!A1:D2".into(), "恋愛!A4:G5".into()],
                },
                SchemeEntry {
                    compatibility_type: 2,
                    name: None,
                    description: None,
                    ranges: vec!["仕事!A1:C2".into()],
                },
            ],
        }
    }

    #[test]
    fn test_run_import_replaces_schemes() {
        let mut store = MemoryRecordStore::new();
        let report = run_import(&source(), &mut store, &manifest(), &ImportOptions::default()).unwrap();

        assert!(!report.has_failures());
        assert_eq!(report.total_records(), 4);
        assert_eq!(store.records_for(1).unwrap().len(), 3);
        assert_eq!(store.records_for(2).unwrap().len(), 1);

        let types = store.compatibility_types().unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "恋愛");
        assert_eq!(types[0].description, "恋人同士");
    }

    #[test]
    fn test_absolute_positions_follow_range() {
        let mut store = MemoryRecordStore::new();
        run_import(&source(), &mut store, &manifest(), &ImportOptions::default()).unwrap();

        let positions: Vec<(u32, u32)> = store
            .records_for(1)
            .unwrap()
            .iter()
            .map(|r| (r.record.row_index, r.record.col_index))
            .collect();
        assert_eq!(positions, vec![(0, 1), (3, 0), (3, 4)]);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut store = MemoryRecordStore::new();
        let first = run_import(&source(), &mut store, &manifest(), &ImportOptions::default()).unwrap();
        let second = run_import(&source(), &mut store, &manifest(), &ImportOptions::default()).unwrap();

        assert_eq!(first.schemes[0].digest, second.schemes[0].digest);
        assert_eq!(first.schemes[1].digest, second.schemes[1].digest);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_failed_range_keeps_previous_records() {
        let mut store = MemoryRecordStore::new();
        run_import(&source(), &mut store, &manifest(), &ImportOptions::default()).unwrap();

        let mut broken = manifest();
        broken.schemes[0].ranges.push("存在しない!A1:B2".into());
        broken.schemes[1].ranges = vec!["仕事!A1:C2".into()];

        let report = run_import(&source(), &mut store, &broken, &ImportOptions::default()).unwrap();
        assert!(report.has_failures());
        assert!(!report.schemes[0].replaced);
        assert_eq!(report.schemes[0].failures.len(), 1);
        assert_eq!(report.schemes[0].failures[0].range, "存在しない!A1:B2");
        // 他のスキームは続行
        assert!(report.schemes[1].replaced);
        // 既存のレコードは残る
        assert_eq!(store.records_for(1).unwrap().len(), 3);
    }

    #[test]
    fn test_malformed_range_is_reported() {
        let mut store = MemoryRecordStore::new();
        let manifest = ImportManifest::single(3, "仕事!C2:A1");

        let report = run_import(&source(), &mut store, &manifest, &ImportOptions::default()).unwrap();
        assert_eq!(report.failed_ranges().len(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let mut store = MemoryRecordStore::new();
        let options = ImportOptions { dry_run: true, show_progress: false };

        let report = run_import(&source(), &mut store, &manifest(), &options).unwrap();
        assert_eq!(report.total_records(), 4);
        assert!(report.schemes.iter().all(|s| !s.replaced && s.digest.is_some()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_default_sheet_is_used() {
        let mut store = MemoryRecordStore::new();
        let mut manifest = ImportManifest::single(2, "A1:C2");
        manifest.default_sheet = Some("仕事".into());

        let report = run_import(&source(), &mut store, &manifest, &ImportOptions::default()).unwrap();
        assert!(!report.has_failures());
        assert_eq!(store.records_for(2).unwrap()[0].record.sheet_name, "仕事");
    }

    /// スキーム名の書き込みだけが失敗するストア
    struct ReadOnlyTypes(MemoryRecordStore);

    impl RecordStore for ReadOnlyTypes {
        fn replace_scheme(
            &mut self,
            compatibility_type: u32,
            records: Vec<CompatibilityRecord>,
        ) -> element_compat_common::Result<usize> {
            self.0.replace_scheme(compatibility_type, records)
        }

        fn records(&self) -> element_compat_common::Result<Vec<element_compat_common::StoredRecord>> {
            self.0.records()
        }

        fn update_record(
            &mut self,
            id: u64,
            edit: &element_compat_common::RecordEdit,
        ) -> element_compat_common::Result<element_compat_common::StoredRecord> {
            self.0.update_record(id, edit)
        }

        fn delete_record(&mut self, id: u64) -> element_compat_common::Result<element_compat_common::StoredRecord> {
            self.0.delete_record(id)
        }

        fn compatibility_types(&self) -> element_compat_common::Result<Vec<CompatibilityType>> {
            self.0.compatibility_types()
        }

        fn upsert_type(&mut self, _compatibility_type: CompatibilityType) -> element_compat_common::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }

        fn remove_type(&mut self, id: u32) -> element_compat_common::Result<CompatibilityType> {
            self.0.remove_type(id)
        }
    }

    #[test]
    fn test_type_metadata_failure_does_not_stop_batch() {
        let mut store = ReadOnlyTypes(MemoryRecordStore::new());
        let mut manifest = manifest();
        manifest.schemes[1].name = Some("仕事".into());

        let report = run_import(&source(), &mut store, &manifest, &ImportOptions::default()).unwrap();

        assert_eq!(report.schemes.len(), 2);
        assert!(report.has_failures());
        for scheme in &report.schemes {
            // レコードは置き換わり、メタデータの失敗だけが残る
            assert!(scheme.replaced);
            assert_eq!(scheme.failures.len(), 1);
            assert_eq!(scheme.failures[0].range, STORE_FAILURE);
            assert!(scheme.failures[0].message.contains("read-only"));
        }
        assert_eq!(store.0.records_for(1).unwrap().len(), 3);
        assert_eq!(store.0.records_for(2).unwrap().len(), 1);
    }

    #[test]
    fn test_record_digest_is_stable() {
        let records = vec![CompatibilityRecord {
            compatibility_type: 1,
            a_peach: Some("F".into()),
            ..Default::default()
        }];
        let a = record_digest(&records).unwrap();
        let b = record_digest(&records).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, record_digest(&[]).unwrap());
    }
}
