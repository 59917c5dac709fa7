//! レコードストア
//!
//! デコード結果の書き込み先であり、照合時の読み出し元。
//! スキーム単位の置き換え（全削除→一括投入）は全か無か。

use crate::error::{Error, Result};
use crate::matcher::PatternQuery;
use crate::types::{CompatibilityRecord, CompatibilityType, StoredRecord};
use serde::{Deserialize, Serialize};

/// スロット1つ分の編集内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotEdit {
    #[default]
    Keep,
    Clear,
    Set(String),
}

impl SlotEdit {
    fn apply(&self, slot: &mut Option<String>) {
        match self {
            SlotEdit::Keep => {}
            SlotEdit::Clear => *slot = None,
            SlotEdit::Set(value) => {
                let value = value.trim();
                *slot = if value.is_empty() { None } else { Some(value.to_string()) };
            }
        }
    }
}

/// 管理者によるレコード修正
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordEdit {
    pub a_peach: SlotEdit,
    pub a_hard: SlotEdit,
    pub b_peach: SlotEdit,
    pub b_hard: SlotEdit,
}

impl RecordEdit {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }

    /// 修正後のレコードを返す。4スロットすべて空になる修正は拒否。
    pub fn applied_to(&self, record: &CompatibilityRecord) -> Result<CompatibilityRecord> {
        let mut updated = record.clone();
        self.a_peach.apply(&mut updated.a_peach);
        self.a_hard.apply(&mut updated.a_hard);
        self.b_peach.apply(&mut updated.b_peach);
        self.b_hard.apply(&mut updated.b_hard);

        if updated.is_payload_empty() {
            return Err(Error::InvalidEdit("4つのスロットすべてを空にはできません".into()));
        }
        Ok(updated)
    }
}

/// レコードストアの共通インターフェース
pub trait RecordStore {
    /// スキームのレコードを丸ごと置き換え、投入件数を返す
    fn replace_scheme(&mut self, compatibility_type: u32, records: Vec<CompatibilityRecord>) -> Result<usize>;

    /// 全レコード（ID順）
    fn records(&self) -> Result<Vec<StoredRecord>>;

    fn records_for(&self, compatibility_type: u32) -> Result<Vec<StoredRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.record.compatibility_type == compatibility_type)
            .collect())
    }

    /// 照合条件を満たすレコード（読み取りのみ）
    fn find_matching(&self, query: &PatternQuery) -> Result<Vec<CompatibilityRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| query.matches(&r.record))
            .map(|r| r.record)
            .collect())
    }

    fn get_record(&self, id: u64) -> Result<StoredRecord> {
        self.records()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(Error::RecordNotFound(id))
    }

    fn update_record(&mut self, id: u64, edit: &RecordEdit) -> Result<StoredRecord>;

    fn delete_record(&mut self, id: u64) -> Result<StoredRecord>;

    fn compatibility_types(&self) -> Result<Vec<CompatibilityType>>;

    /// 同じIDがあれば上書き
    fn upsert_type(&mut self, compatibility_type: CompatibilityType) -> Result<()>;

    fn remove_type(&mut self, id: u32) -> Result<CompatibilityType>;
}

/// メモリ上のストア。JSONストアの中身としても使う。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecordStore {
    next_id: u64,
    #[serde(default)]
    records: Vec<StoredRecord>,
    #[serde(default)]
    types: Vec<CompatibilityType>,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
            types: Vec::new(),
        }
    }
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn replace_scheme(&mut self, compatibility_type: u32, records: Vec<CompatibilityRecord>) -> Result<usize> {
        // 新しい一覧を組み立ててから差し替える
        let mut next_id = self.next_id;
        let mut replaced: Vec<StoredRecord> = self
            .records
            .iter()
            .filter(|r| r.record.compatibility_type != compatibility_type)
            .cloned()
            .collect();

        let count = records.len();
        for mut record in records {
            record.compatibility_type = compatibility_type;
            replaced.push(StoredRecord { id: next_id, record });
            next_id += 1;
        }

        self.records = replaced;
        self.next_id = next_id;
        Ok(count)
    }

    fn records(&self) -> Result<Vec<StoredRecord>> {
        Ok(self.records.clone())
    }

    fn find_matching(&self, query: &PatternQuery) -> Result<Vec<CompatibilityRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| query.matches(&r.record))
            .map(|r| r.record.clone())
            .collect())
    }

    fn update_record(&mut self, id: u64, edit: &RecordEdit) -> Result<StoredRecord> {
        let stored = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::RecordNotFound(id))?;

        stored.record = edit.applied_to(&stored.record)?;
        Ok(stored.clone())
    }

    fn delete_record(&mut self, id: u64) -> Result<StoredRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::RecordNotFound(id))?;
        Ok(self.records.remove(index))
    }

    fn compatibility_types(&self) -> Result<Vec<CompatibilityType>> {
        let mut types = self.types.clone();
        types.sort_by_key(|t| t.id);
        Ok(types)
    }

    fn upsert_type(&mut self, compatibility_type: CompatibilityType) -> Result<()> {
        if compatibility_type.id == 0 {
            return Err(Error::InvalidCompatibilityType(0));
        }
        match self.types.iter_mut().find(|t| t.id == compatibility_type.id) {
            Some(existing) => *existing = compatibility_type,
            None => self.types.push(compatibility_type),
        }
        Ok(())
    }

    fn remove_type(&mut self, id: u32) -> Result<CompatibilityType> {
        let index = self
            .types
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::TypeNotFound(id))?;
        Ok(self.types.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(t: u32, a_peach: &str) -> CompatibilityRecord {
        CompatibilityRecord {
            compatibility_type: t,
            sheet_name: "S".into(),
            range: "A1:C2".into(),
            a_peach: Some(a_peach.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_replace_scheme_replaces_only_that_scheme() {
        let mut store = MemoryRecordStore::new();
        store.replace_scheme(1, vec![draft(1, "F"), draft(1, "T")]).unwrap();
        store.replace_scheme(2, vec![draft(2, "W")]).unwrap();

        let count = store.replace_scheme(1, vec![draft(1, "E")]).unwrap();
        assert_eq!(count, 1);

        let scheme1 = store.records_for(1).unwrap();
        assert_eq!(scheme1.len(), 1);
        assert_eq!(scheme1[0].record.a_peach.as_deref(), Some("E"));
        assert_eq!(store.records_for(2).unwrap().len(), 1);
    }

    #[test]
    fn test_replace_with_empty_clears_scheme() {
        let mut store = MemoryRecordStore::new();
        store.replace_scheme(3, vec![draft(3, "F")]).unwrap();
        store.replace_scheme(3, vec![]).unwrap();
        assert!(store.records_for(3).unwrap().is_empty());
    }

    #[test]
    fn test_ids_are_unique_across_replacements() {
        let mut store = MemoryRecordStore::new();
        store.replace_scheme(1, vec![draft(1, "F"), draft(1, "T")]).unwrap();
        store.replace_scheme(1, vec![draft(1, "W")]).unwrap();

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 3);
    }

    #[test]
    fn test_replace_forces_scheme_id() {
        let mut store = MemoryRecordStore::new();
        store.replace_scheme(4, vec![draft(99, "F")]).unwrap();
        assert_eq!(store.records_for(4).unwrap().len(), 1);
        assert!(store.records_for(99).unwrap().is_empty());
    }

    #[test]
    fn test_update_record() {
        let mut store = MemoryRecordStore::new();
        store.replace_scheme(1, vec![draft(1, "F")]).unwrap();

        let edit = RecordEdit {
            a_hard: SlotEdit::Set(" T- ".into()),
            ..Default::default()
        };
        let updated = store.update_record(1, &edit).unwrap();
        assert_eq!(updated.record.a_peach.as_deref(), Some("F"));
        assert_eq!(updated.record.a_hard.as_deref(), Some("T-"));
    }

    #[test]
    fn test_update_rejects_all_empty() {
        let mut store = MemoryRecordStore::new();
        store.replace_scheme(1, vec![draft(1, "F")]).unwrap();

        let edit = RecordEdit {
            a_peach: SlotEdit::Clear,
            ..Default::default()
        };
        assert!(matches!(store.update_record(1, &edit), Err(Error::InvalidEdit(_))));
        // 元のまま
        assert_eq!(store.get_record(1).unwrap().record.a_peach.as_deref(), Some("F"));
    }

    #[test]
    fn test_delete_record() {
        let mut store = MemoryRecordStore::new();
        store.replace_scheme(1, vec![draft(1, "F"), draft(1, "T")]).unwrap();

        let removed = store.delete_record(1).unwrap();
        assert_eq!(removed.record.a_peach.as_deref(), Some("F"));
        assert_eq!(store.len(), 1);
        assert!(matches!(store.delete_record(1), Err(Error::RecordNotFound(1))));
    }

    #[test]
    fn test_type_upsert_and_remove() {
        let mut store = MemoryRecordStore::new();
        store
            .upsert_type(CompatibilityType { id: 2, name: "恋愛".into(), description: String::new() })
            .unwrap();
        store
            .upsert_type(CompatibilityType { id: 1, name: "友人".into(), description: String::new() })
            .unwrap();
        store
            .upsert_type(CompatibilityType { id: 2, name: "恋人".into(), description: "更新".into() })
            .unwrap();

        let types = store.compatibility_types().unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].id, 1);
        assert_eq!(types[1].name, "恋人");

        assert_eq!(store.remove_type(2).unwrap().name, "恋人");
        assert!(matches!(store.remove_type(2), Err(Error::TypeNotFound(2))));
        assert!(store.upsert_type(CompatibilityType::default()).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut store = MemoryRecordStore::new();
        store.replace_scheme(1, vec![draft(1, "F")]).unwrap();

        let json = serde_json::to_string(&store).unwrap();
        assert!(json.contains("\"nextId\":2"));
        let restored: MemoryRecordStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.records().unwrap(), store.records().unwrap());
    }
}
