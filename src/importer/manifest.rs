//! 取り込み定義（どのワークブックのどの範囲を、どのスキームとして読むか）

use crate::error::{CompatError, Result};
use element_compat_common::decoder::checked_type;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 取り込み定義ファイル
///
/// ```json
/// {
///   "workbook": "相性表.xlsx",
///   "schemes": [
///     { "compatibilityType": 1, "name": "恋愛", "ranges": ["恋愛!A1:Z80"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportManifest {
    /// 取り込み元（省略時は設定・引数のワークブック）
    #[serde(default)]
    pub workbook: Option<PathBuf>,
    /// 範囲表記にシート名がない場合のシート名
    #[serde(default)]
    pub default_sheet: Option<String>,
    pub schemes: Vec<SchemeEntry>,
}

/// 1スキーム分の取り込み範囲
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeEntry {
    pub compatibility_type: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub ranges: Vec<String>,
}

impl ImportManifest {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CompatError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let mut manifest: ImportManifest = serde_json::from_str(&content)?;

        // 相対パスは定義ファイルの場所を基準に解決
        if let Some(workbook) = &manifest.workbook {
            if workbook.is_relative() {
                let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
                manifest.workbook = Some(base_dir.join(workbook));
            }
        }

        manifest.validate()?;
        Ok(manifest)
    }

    /// 1範囲だけの定義
    pub fn single(compatibility_type: i64, range: impl Into<String>) -> Self {
        Self {
            workbook: None,
            default_sheet: None,
            schemes: vec![SchemeEntry {
                compatibility_type,
                name: None,
                description: None,
                ranges: vec![range.into()],
            }],
        }
    }

    /// スキームIDの重複・範囲なしを検出（範囲表記そのものの検証は取り込み時）
    pub fn validate(&self) -> Result<()> {
        if self.schemes.is_empty() {
            return Err(CompatError::ManifestInvalid("schemes が空です".into()));
        }

        let mut seen = HashSet::new();
        for scheme in &self.schemes {
            let id = checked_type(scheme.compatibility_type)?;
            if !seen.insert(id) {
                return Err(CompatError::ManifestInvalid(format!(
                    "compatibilityType {} が重複しています",
                    id
                )));
            }
            if scheme.ranges.is_empty() {
                return Err(CompatError::ManifestInvalid(format!(
                    "compatibilityType {} に範囲がありません",
                    id
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_resolves_relative_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(
            &path,
            r#"{"workbook": "book.xlsx", "schemes": [{"compatibilityType": 1, "ranges": ["S!A1:C2"]}]}"#,
        )
        .unwrap();

        let manifest = ImportManifest::load(&path).unwrap();
        assert_eq!(manifest.workbook, Some(dir.path().join("book.xlsx")));
        assert_eq!(manifest.schemes[0].ranges, vec!["S!A1:C2"]);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut manifest = ImportManifest::single(2, "S!A1:B2");
        manifest.schemes.push(SchemeEntry {
            compatibility_type: 2,
            ranges: vec!["S!C1:D2".into()],
            ..Default::default()
        });
        assert!(matches!(manifest.validate(), Err(CompatError::ManifestInvalid(_))));
    }

    #[test]
    fn test_validate_rejects_bad_type() {
        let manifest = ImportManifest::single(0, "S!A1:B2");
        assert!(matches!(manifest.validate(), Err(CompatError::Common(_))));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(ImportManifest::default().validate().is_err());

        let mut manifest = ImportManifest::single(1, "S!A1:B2");
        manifest.schemes[0].ranges.clear();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = ImportManifest::load(Path::new("/nonexistent/manifest.json"));
        assert!(matches!(result, Err(CompatError::FileNotFound(_))));
    }
}
