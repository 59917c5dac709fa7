//! レコード・スキームの管理操作
//!
//! 一覧表示、個別修正（引数または対話入力）、削除、スキームのメタデータ編集。

use crate::error::{CompatError, Result};
use dialoguer::Input;
use element_compat_common::{index_to_address, CompatibilityType, RecordEdit, RecordStore, SlotEdit, StoredRecord};

/// スロット入力のうち「空にする」を表す値
pub const CLEAR_TOKEN: &str = "-";

/// 引数1つ分をスロット編集に変換
///
/// 未指定は据え置き、`-` は空にする、それ以外は上書き。
pub fn slot_edit_from_arg(value: Option<&str>) -> SlotEdit {
    match value.map(str::trim) {
        None => SlotEdit::Keep,
        Some(CLEAR_TOKEN) => SlotEdit::Clear,
        Some(v) if v.is_empty() => SlotEdit::Keep,
        Some(v) => SlotEdit::Set(v.to_string()),
    }
}

/// 対話入力1つ分をスロット編集に変換（空入力は据え置き）
fn slot_edit_from_input(input: &str) -> SlotEdit {
    slot_edit_from_arg(Some(input))
}

/// 1行分の表示
pub fn format_record(stored: &StoredRecord) -> String {
    let r = &stored.record;
    let slot = |v: &Option<String>| v.clone().unwrap_or_else(|| "·".to_string());
    format!(
        "#{:<5} type{:<3} {}!{:<6} aPeach={:<4} aHard={:<4} bPeach={:<4} bHard={:<4}",
        stored.id,
        r.compatibility_type,
        r.sheet_name,
        index_to_address(r.row_index, r.col_index),
        slot(&r.a_peach),
        slot(&r.a_hard),
        slot(&r.b_peach),
        slot(&r.b_hard),
    )
}

/// レコード一覧（スキーム指定時はそのスキームのみ）
pub fn list_records<S>(store: &S, compatibility_type: Option<u32>) -> Result<Vec<StoredRecord>>
where
    S: RecordStore + ?Sized,
{
    let records = match compatibility_type {
        Some(t) => store.records_for(t)?,
        None => store.records()?,
    };
    Ok(records)
}

/// レコードを修正する
///
/// 修正内容が空（すべて据え置き）なら何もしない。
pub fn edit_record<S>(store: &mut S, id: u64, edit: &RecordEdit) -> Result<StoredRecord>
where
    S: RecordStore + ?Sized,
{
    if edit.is_noop() {
        return Ok(store.get_record(id)?);
    }

    let updated = store.update_record(id, edit)?;
    tracing::info!(id, "レコードを修正");
    Ok(updated)
}

/// 現在値を見せながら4スロット分の修正を対話入力
pub fn prompt_record_edit(current: &StoredRecord) -> Result<RecordEdit> {
    println!("{}", format_record(current));
    println!("操作: [Enter]据え置き [{}]空にする それ以外は上書き", CLEAR_TOKEN);
    println!("---");

    let r = &current.record;
    Ok(RecordEdit {
        a_peach: prompt_slot("aPeach", r.a_peach.as_deref())?,
        a_hard: prompt_slot("aHard", r.a_hard.as_deref())?,
        b_peach: prompt_slot("bPeach", r.b_peach.as_deref())?,
        b_hard: prompt_slot("bHard", r.b_hard.as_deref())?,
    })
}

fn prompt_slot(label: &str, current: Option<&str>) -> Result<SlotEdit> {
    let input: String = Input::new()
        .with_prompt(format!("{} [{}]", label, current.unwrap_or("")))
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CompatError::Prompt(e.to_string()))?;

    Ok(slot_edit_from_input(&input))
}

pub fn delete_record<S>(store: &mut S, id: u64) -> Result<StoredRecord>
where
    S: RecordStore + ?Sized,
{
    let removed = store.delete_record(id)?;
    tracing::info!(id, "レコードを削除");
    Ok(removed)
}

/// スキームのメタデータを登録・更新する
///
/// 説明を省略した場合は既存の説明を残す。
pub fn set_type<S>(store: &mut S, id: u32, name: &str, description: Option<&str>) -> Result<CompatibilityType>
where
    S: RecordStore + ?Sized,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(CompatError::Config("スキーム名が空です".into()));
    }

    let existing = store
        .compatibility_types()?
        .into_iter()
        .find(|t| t.id == id);

    let description = match description {
        Some(d) => d.trim().to_string(),
        None => existing.map(|t| t.description).unwrap_or_default(),
    };

    let compatibility_type = CompatibilityType {
        id,
        name: name.to_string(),
        description,
    };
    store.upsert_type(compatibility_type.clone())?;
    tracing::info!(id, "スキームを登録");
    Ok(compatibility_type)
}

/// スキームのメタデータを削除する（レコードは残る）
pub fn remove_type<S>(store: &mut S, id: u32) -> Result<CompatibilityType>
where
    S: RecordStore + ?Sized,
{
    let removed = store.remove_type(id)?;
    tracing::info!(id, "スキームを削除");
    Ok(removed)
}
