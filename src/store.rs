//! JSONファイルのレコードストア
//!
//! 変更のたびに同じディレクトリへ一時ファイルを書き、リネームで置き換える。
//! 書き込みに失敗しても直前の状態が残る。

use crate::error::Result;
use element_compat_common::store::{MemoryRecordStore, RecordEdit, RecordStore};
use element_compat_common::{CompatibilityRecord, CompatibilityType, PatternQuery, StoredRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// ストアファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// 最終更新日時（RFC3339）
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(flatten)]
    data: MemoryRecordStore,
}

/// バージョンだけを先に読むための見出し
#[derive(Deserialize)]
struct StoreHeader {
    version: u32,
}

pub struct JsonRecordStore {
    path: PathBuf,
    state: MemoryRecordStore,
    updated_at: Option<String>,
}

impl JsonRecordStore {
    const CURRENT_VERSION: u32 = 1;

    /// ストアファイルを開く（存在しなければ空のストア）
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                state: MemoryRecordStore::new(),
                updated_at: None,
            });
        }

        let content = std::fs::read_to_string(path)?;
        let header: StoreHeader = serde_json::from_str(&content)?;

        // 旧形式は本体の構造が違うので、中身を読む前に判定する
        if header.version != Self::CURRENT_VERSION {
            tracing::warn!(
                found = header.version,
                expected = Self::CURRENT_VERSION,
                "ストアのバージョン不一致、空のストアとして扱います"
            );
            return Ok(Self {
                path: path.to_path_buf(),
                state: MemoryRecordStore::new(),
                updated_at: None,
            });
        }

        let file: StoreFile = serde_json::from_str(&content)?;
        Ok(Self {
            path: path.to_path_buf(),
            state: file.data,
            updated_at: file.updated_at,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// 一時ファイルに書いてからリネームで置き換える
    fn persist(&self, data: &MemoryRecordStore, updated_at: &str) -> element_compat_common::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "records.json".to_string());
        let temp_path = dir.join(format!(".{}.tmp-{}", file_name, std::process::id()));

        let file = StoreFile {
            version: Self::CURRENT_VERSION,
            updated_at: Some(updated_at.to_string()),
            data: data.clone(),
        };

        let write_result = (|| -> element_compat_common::Result<()> {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            serde_json::to_writer_pretty(&mut writer, &file)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            Ok(())
        })();

        if let Err(e) = write_result {
            std::fs::remove_file(&temp_path).ok();
            return Err(e);
        }

        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            std::fs::remove_file(&temp_path).ok();
            return Err(e.into());
        }

        Ok(())
    }

    /// 複製に変更を適用し、保存に成功したときだけ反映する
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut MemoryRecordStore) -> element_compat_common::Result<T>,
    ) -> element_compat_common::Result<T> {
        let mut next = self.state.clone();
        let output = change(&mut next)?;

        let now = chrono::Utc::now().to_rfc3339();
        self.persist(&next, &now)?;

        self.state = next;
        self.updated_at = Some(now);
        Ok(output)
    }
}

impl RecordStore for JsonRecordStore {
    fn replace_scheme(
        &mut self,
        compatibility_type: u32,
        records: Vec<CompatibilityRecord>,
    ) -> element_compat_common::Result<usize> {
        let count = self.commit(|data| data.replace_scheme(compatibility_type, records))?;
        tracing::info!(compatibility_type, count, path = %self.path.display(), "スキームを置き換え");
        Ok(count)
    }

    fn records(&self) -> element_compat_common::Result<Vec<StoredRecord>> {
        self.state.records()
    }

    fn find_matching(&self, query: &PatternQuery) -> element_compat_common::Result<Vec<CompatibilityRecord>> {
        self.state.find_matching(query)
    }

    fn update_record(&mut self, id: u64, edit: &RecordEdit) -> element_compat_common::Result<StoredRecord> {
        self.commit(|data| data.update_record(id, edit))
    }

    fn delete_record(&mut self, id: u64) -> element_compat_common::Result<StoredRecord> {
        self.commit(|data| data.delete_record(id))
    }

    fn compatibility_types(&self) -> element_compat_common::Result<Vec<CompatibilityType>> {
        self.state.compatibility_types()
    }

    fn upsert_type(&mut self, compatibility_type: CompatibilityType) -> element_compat_common::Result<()> {
        self.commit(|data| data.upsert_type(compatibility_type))
    }

    fn remove_type(&mut self, id: u32) -> element_compat_common::Result<CompatibilityType> {
        self.commit(|data| data.remove_type(id))
    }
}
